// Model exports
pub mod relationship;
pub mod requests;
pub mod responses;
pub mod standout;
pub mod user;

pub use relationship::{
    EndReason, Match, MatchState, Report, SelfPairError, Swipe, SwipeDirection, UndoEntry,
};
pub use requests::{
    FindCandidatesRequest, QualityRequest, ReportRequest, StandoutInteractionRequest,
    SwipeRequest, TransitionRequest, UndoSwipeRequest,
};
pub use responses::{
    CandidateView, DimensionView, ErrorResponse, FindCandidatesResponse, HealthResponse,
    MatchView, QualityResponse, ReportResponse, StandoutView, StandoutsResponse, SwipeResponse,
    UndoSwipeResponse,
};
pub use standout::Standout;
pub use user::{
    AccountStatus, ChildrenStance, CommunicationStyle, ConversationDepth, Coordinates,
    Dealbreakers, Education, FirstDateTiming, Gender, Habit, Lifestyle, MessagingCadence,
    PacePreferences, RelationshipGoal, UserProfile,
};

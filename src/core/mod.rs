// Core algorithm exports
pub mod distance;
pub mod engine;
pub mod filters;
pub mod finder;
pub mod guard;
pub mod lifecycle;
pub mod quality;
pub mod ranker;
pub mod scoring;
pub mod standout;

pub use distance::{calculate_bounding_box, distance_between, haversine_distance, BoundingBox};
pub use engine::{
    EngineError, EngineParams, MatchingEngine, ReportOutcome, SwipeLimit, SwipeOutcome,
};
pub use filters::{mutual_age_ok, mutual_gender_ok, passes_dealbreakers, within_distance};
pub use finder::{Candidate, CandidateFinder};
pub use guard::{StripeState, UserLocks};
pub use lifecycle::{transition, LifecycleError, LifecycleEvent, TransitionError};
pub use quality::{QualityReport, QualityScorer};
pub use ranker::{RankerParams, StandoutFeed, StandoutRanker};
pub use scoring::{
    composite_score, validate_weights, Dimension, QualityWeights, ResponseBands, StandoutWeights,
    WeightSumError,
};
pub use standout::{StandoutScore, StandoutScorer};

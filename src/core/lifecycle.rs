use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{EndReason, Match, MatchState};

/// Lifecycle events a relationship can receive.
///
/// `Block` is an always-legal event: the transition table admits it from any
/// state so a block can never be refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Friendzone,
    Unmatch,
    GracefulExit,
    Block,
}

#[derive(Debug, Clone, Copy, Error)]
#[error("cannot apply {event:?} to a {from:?} relationship")]
pub struct TransitionError {
    pub from: MatchState,
    pub event: LifecycleEvent,
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("{user_id} is not a participant in match {match_id}")]
    NotParticipant { user_id: String, match_id: String },
}

/// The transition table - single source of truth for the state machine.
pub fn transition(current: MatchState, event: LifecycleEvent) -> Result<MatchState, TransitionError> {
    use LifecycleEvent::*;
    use MatchState::*;

    match (current, event) {
        (_, Block) => Ok(Blocked),
        (Active, Friendzone) => Ok(Friends),
        (Active | Friends, Unmatch) => Ok(Unmatched),
        (Active | Friends, LifecycleEvent::GracefulExit) => Ok(MatchState::GracefulExit),
        (from, event) => Err(TransitionError { from, event }),
    }
}

fn end_reason_for(event: LifecycleEvent) -> Option<EndReason> {
    match event {
        LifecycleEvent::Unmatch => Some(EndReason::Unmatched),
        LifecycleEvent::GracefulExit => Some(EndReason::GracefulExit),
        LifecycleEvent::Block => Some(EndReason::Blocked),
        LifecycleEvent::Friendzone => None,
    }
}

impl Match {
    /// Apply a lifecycle event on behalf of a participant.
    ///
    /// Validates participation and the transition table, then records end
    /// metadata for terminal transitions. Friendzone leaves the relationship
    /// live and sets no end metadata.
    pub fn apply(
        &mut self,
        event: LifecycleEvent,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        if !self.contains(actor) {
            return Err(LifecycleError::NotParticipant {
                user_id: actor.to_string(),
                match_id: self.id().to_string(),
            });
        }

        let next = transition(self.state(), event)?;
        self.set_state(next);

        if next.is_terminal() {
            if let Some(reason) = end_reason_for(event) {
                self.set_end_metadata(now, actor, reason);
            }
        }
        Ok(())
    }
}

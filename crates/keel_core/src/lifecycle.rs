//! Lifecycle operations and the per-application state machine.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Operation requested for an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Install,
    Run,
    Stop,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Install => "install",
            Operation::Run => "run",
            Operation::Stop => "stop",
        }
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "install" => Ok(Operation::Install),
            "run" => Ok(Operation::Run),
            "stop" => Ok(Operation::Stop),
            other => Err(format!("unknown operation: {}", other)),
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Final result of an application-level operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failed,
}

/// State of one application operation.
///
/// `Init → Resolving → Rendering → Invoking → Done`; with several components
/// `Invoking` loops back to `Resolving` for the next one, and any state may
/// end in `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Init,
    Resolving,
    Rendering,
    Invoking,
    Done(Outcome),
}

impl Default for LifecycleState {
    fn default() -> Self {
        Self::Init
    }
}

impl LifecycleState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LifecycleState::Done(_))
    }

    pub fn can_advance_to(&self, next: LifecycleState) -> bool {
        use LifecycleState::*;

        match (self, next) {
            (Done(_), _) => false,
            (_, Done(_)) => true,
            (Init, Resolving) | (Resolving, Rendering) | (Rendering, Invoking) => true,
            (Invoking, Resolving) | (Rendering, Resolving) | (Resolving, Resolving) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Init => write!(f, "init"),
            LifecycleState::Resolving => write!(f, "resolving"),
            LifecycleState::Rendering => write!(f, "rendering"),
            LifecycleState::Invoking => write!(f, "invoking"),
            LifecycleState::Done(Outcome::Success) => write!(f, "done(success)"),
            LifecycleState::Done(Outcome::Failed) => write!(f, "done(failed)"),
        }
    }
}

/// Tracks the state of one operation and the path it took.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    state: LifecycleState,
    history: Vec<LifecycleState>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Init,
            history: vec![LifecycleState::Init],
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn history(&self) -> &[LifecycleState] {
        &self.history
    }

    /// Move to `next`; an illegal transition is ignored and logged.
    pub fn advance(&mut self, next: LifecycleState) -> bool {
        if !self.state.can_advance_to(next) {
            warn!("Ignoring lifecycle transition {} -> {}", self.state, next);
            return false;
        }
        debug!("Lifecycle {} -> {}", self.state, next);
        self.state = next;
        self.history.push(next);
        true
    }

    pub fn finish(&mut self, outcome: Outcome) {
        self.advance(LifecycleState::Done(outcome));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_parsing() {
        assert_eq!("run".parse::<Operation>().unwrap(), Operation::Run);
        assert_eq!("STOP".parse::<Operation>().unwrap(), Operation::Stop);
        assert!("deploy".parse::<Operation>().is_err());
    }

    #[test]
    fn test_transitions() {
        use LifecycleState::*;

        assert!(Init.can_advance_to(Resolving));
        assert!(Invoking.can_advance_to(Resolving));
        assert!(Init.can_advance_to(Done(Outcome::Success)));
        assert!(!Init.can_advance_to(Invoking));
        assert!(!Done(Outcome::Failed).can_advance_to(Resolving));
    }

    #[test]
    fn test_lifecycle_ignores_illegal_steps() {
        let mut lifecycle = Lifecycle::new();
        assert!(lifecycle.advance(LifecycleState::Resolving));
        assert!(!lifecycle.advance(LifecycleState::Invoking));
        lifecycle.finish(Outcome::Failed);

        assert_eq!(lifecycle.state(), LifecycleState::Done(Outcome::Failed));
        assert_eq!(
            lifecycle.history(),
            &[
                LifecycleState::Init,
                LifecycleState::Resolving,
                LifecycleState::Done(Outcome::Failed)
            ]
        );
        assert!(!lifecycle.advance(LifecycleState::Resolving));
    }
}

//! Request lifecycle trace.
//!
//! One trace per generation request. Stages advance on real completion
//! signals (retrieval done, first chunk received, stream end), never on
//! timers, and the ordinal never decreases within a request.

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    Ingest,
    Retrieval,
    Inference,
    Streaming,
    Complete,
    Error,
}

impl Stage {
    pub fn ordinal(&self) -> u8 {
        match self {
            Stage::Idle => 0,
            Stage::Ingest => 1,
            Stage::Retrieval => 2,
            Stage::Inference => 3,
            Stage::Streaming => 4,
            Stage::Complete => 5,
            Stage::Error => 6,
        }
    }

    /// Terminal stages end a request.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Complete | Stage::Error)
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(&self, next: Stage) -> bool {
        use Stage::*;
        match (self, next) {
            (Idle, Ingest)
            | (Ingest, Retrieval)
            | (Retrieval, Inference)
            | (Inference, Streaming)
            | (Streaming, Streaming)
            | (Streaming, Complete)
            // An empty stream completes without a chunk.
            | (Inference, Complete) => true,
            (from, Error) => !matches!(from, Idle) && !from.is_terminal(),
            _ => false,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Idle => "Idle",
            Stage::Ingest => "Ingest",
            Stage::Retrieval => "Retrieval",
            Stage::Inference => "Inference",
            Stage::Streaming => "Streaming",
            Stage::Complete => "Complete",
            Stage::Error => "Error",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Rejected stage transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal stage transition {from} -> {to}")]
pub struct InvalidTransition {
    pub from: Stage,
    pub to: Stage,
}

/// The stages one request has passed through, starting at `Idle`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestTrace {
    history: Vec<Stage>,
}

impl RequestTrace {
    pub fn new() -> Self {
        Self {
            history: vec![Stage::Idle],
        }
    }

    pub fn current(&self) -> Stage {
        self.history.last().copied().unwrap_or(Stage::Idle)
    }

    /// Move to `next`, recording it. Illegal moves leave the trace untouched.
    pub fn advance(&mut self, next: Stage) -> Result<(), InvalidTransition> {
        let from = self.current();
        if !from.can_advance_to(next) {
            return Err(InvalidTransition { from, to: next });
        }
        debug!(from = %from, to = %next, "Trace advanced");
        self.history.push(next);
        Ok(())
    }

    /// Start over at `Idle` for a new request.
    pub fn reset(&mut self) {
        self.history.clear();
        self.history.push(Stage::Idle);
    }

    pub fn history(&self) -> &[Stage] {
        &self.history
    }
}

impl Default for RequestTrace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Stage::*;

    #[test]
    fn successful_path_with_three_chunks() {
        let mut trace = RequestTrace::new();
        for stage in [Ingest, Retrieval, Inference, Streaming, Streaming, Streaming, Complete] {
            trace.advance(stage).unwrap();
        }
        assert_eq!(
            trace.history(),
            &[Idle, Ingest, Retrieval, Inference, Streaming, Streaming, Streaming, Complete]
        );
        assert!(trace.history().windows(2).all(|w| w[0].ordinal() <= w[1].ordinal()));
    }

    #[test]
    fn regression_is_rejected() {
        let mut trace = RequestTrace::new();
        trace.advance(Ingest).unwrap();
        trace.advance(Retrieval).unwrap();
        let err = trace.advance(Ingest).unwrap_err();
        assert_eq!(err, InvalidTransition { from: Retrieval, to: Ingest });
        assert_eq!(trace.current(), Retrieval);
    }

    #[test]
    fn skipping_stages_is_rejected() {
        let mut trace = RequestTrace::new();
        assert!(trace.advance(Inference).is_err());
        trace.advance(Ingest).unwrap();
        assert!(trace.advance(Streaming).is_err());
    }

    #[test]
    fn error_reachable_from_any_active_stage() {
        for path in [
            &[Ingest][..],
            &[Ingest, Retrieval],
            &[Ingest, Retrieval, Inference],
            &[Ingest, Retrieval, Inference, Streaming],
        ] {
            let mut trace = RequestTrace::new();
            for s in path {
                trace.advance(*s).unwrap();
            }
            trace.advance(Error).unwrap();
            assert_eq!(trace.current(), Error);
        }
    }

    #[test]
    fn error_not_reachable_from_idle_or_terminal() {
        let mut trace = RequestTrace::new();
        assert!(trace.advance(Error).is_err());

        for s in [Ingest, Retrieval, Inference, Complete] {
            trace.advance(s).unwrap();
        }
        assert!(trace.advance(Error).is_err());
        assert!(trace.advance(Streaming).is_err());
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut trace = RequestTrace::new();
        trace.advance(Ingest).unwrap();
        trace.reset();
        assert_eq!(trace.history(), &[Idle]);
    }

    #[test]
    fn ordinals() {
        assert_eq!(Idle.ordinal(), 0);
        assert_eq!(Streaming.ordinal(), 4);
        assert_eq!(Complete.ordinal(), 5);
        assert_eq!(Error.ordinal(), 6);
    }
}

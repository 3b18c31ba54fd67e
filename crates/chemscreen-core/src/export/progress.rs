//! Export progress reporting and cancellation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Stage of an export run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Collecting,
    Building,
    Writing,
    Done,
}

impl ExportStage {
    /// Completed fraction when the stage starts
    pub fn fraction(&self) -> f64 {
        match self {
            ExportStage::Collecting => 0.2,
            ExportStage::Building => 0.4,
            ExportStage::Writing => 0.7,
            ExportStage::Done => 1.0,
        }
    }

    /// Message shown to the user
    pub fn message(&self) -> &'static str {
        match self {
            ExportStage::Collecting => "Collecting search results",
            ExportStage::Building => "Building export records",
            ExportStage::Writing => "Writing export file",
            ExportStage::Done => "Export complete",
        }
    }
}

/// Receives stage updates from the export manager
pub trait ExportProgress {
    fn report(&self, stage: ExportStage);
}

impl<F> ExportProgress for F
where
    F: Fn(ExportStage),
{
    fn report(&self, stage: ExportStage) {
        self(stage)
    }
}

/// Progress sink that ignores every update
pub struct NoProgress;

impl ExportProgress for NoProgress {
    fn report(&self, _stage: ExportStage) {}
}

/// Cooperative cancellation flag, cheap to clone across threads
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_stage_fractions_increase() {
        let stages = [
            ExportStage::Collecting,
            ExportStage::Building,
            ExportStage::Writing,
            ExportStage::Done,
        ];
        assert!(stages.windows(2).all(|w| w[0].fraction() < w[1].fraction()));
        assert_eq!(ExportStage::Done.fraction(), 1.0);
    }

    #[test]
    fn test_closure_progress() {
        let seen = RefCell::new(Vec::new());
        let progress = |stage: ExportStage| seen.borrow_mut().push(stage);
        progress.report(ExportStage::Building);
        assert_eq!(seen.into_inner(), vec![ExportStage::Building]);
    }

    #[test]
    fn test_cancel_token_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
    }
}

use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use crate::batch::FetchOutcome;

#[derive(Debug, Default, PartialEq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: Vec<PathBuf>,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: &[FetchOutcome]) -> RunSummary {
        let failed: Vec<PathBuf> = outcomes
            .iter()
            .filter(|o| !o.is_success())
            .map(|o| o.destination().to_path_buf())
            .collect();
        RunSummary {
            succeeded: outcomes.len() - failed.len(),
            failed,
        }
    }

    /// A run with failures still completed; it only fails the process when
    /// asked to.
    pub fn exit_code(&self, fail_on_error: bool) -> i32 {
        if !self.failed.is_empty() && fail_on_error {
            1
        } else {
            0
        }
    }
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} downloaded, {} failed", self.succeeded, self.failed.len())
    }
}

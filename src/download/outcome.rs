//! Per-file outcomes and their aggregation into a strategy verdict.

use std::fmt;
use std::path::PathBuf;

/// What happened to one leaf file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// Written to `path`.
    Downloaded,
    /// Intentionally not downloaded (e.g. videos disabled). Counts as success.
    Skipped,
    /// No usable source could be resolved.
    Unavailable,
    /// The fetch failed.
    Failed,
}

/// Result of one leaf download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub label: String,
    pub status: OutcomeStatus,
    pub path: Option<PathBuf>,
    pub error: Option<String>,
}

impl DownloadOutcome {
    pub fn downloaded(label: impl Into<String>, path: PathBuf) -> Self {
        Self {
            label: label.into(),
            status: OutcomeStatus::Downloaded,
            path: Some(path),
            error: None,
        }
    }

    pub fn skipped(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            status: OutcomeStatus::Skipped,
            path: None,
            error: None,
        }
    }

    pub fn unavailable(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            status: OutcomeStatus::Unavailable,
            path: None,
            error: Some(reason.into()),
        }
    }

    pub fn failed(label: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            label: label.into(),
            status: OutcomeStatus::Failed,
            path: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Downloaded | OutcomeStatus::Skipped)
    }
}

/// Aggregate result of one strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Succeeded,
    Partial { succeeded: usize, total: usize },
    Failed,
}

impl Verdict {
    /// Aggregate leaf outcomes. An empty set is a success: there was nothing to fetch.
    pub fn from_outcomes(outcomes: &[DownloadOutcome]) -> Self {
        let total = outcomes.len();
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();

        match succeeded {
            _ if total == 0 => Verdict::Succeeded,
            n if n == total => Verdict::Succeeded,
            0 => Verdict::Failed,
            n => Verdict::Partial {
                succeeded: n,
                total,
            },
        }
    }

    /// Whether anything usable came out of the strategy.
    pub fn is_success(&self) -> bool {
        !matches!(self, Verdict::Failed)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Succeeded => write!(f, "succeeded"),
            Verdict::Partial { succeeded, total } => {
                write!(f, "partially succeeded ({}/{})", succeeded, total)
            }
            Verdict::Failed => write!(f, "failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_aggregation() {
        let ok = DownloadOutcome::downloaded("a", PathBuf::from("a"));
        let skipped = DownloadOutcome::skipped("b");
        let missing = DownloadOutcome::unavailable("c", "no url");
        let failed = DownloadOutcome::failed("d", "HTTP 404");

        assert_eq!(Verdict::from_outcomes(&[]), Verdict::Succeeded);
        assert_eq!(
            Verdict::from_outcomes(&[ok.clone(), skipped.clone()]),
            Verdict::Succeeded
        );
        assert_eq!(
            Verdict::from_outcomes(&[ok, missing.clone(), skipped]),
            Verdict::Partial {
                succeeded: 2,
                total: 3
            }
        );
        assert_eq!(Verdict::from_outcomes(&[missing, failed]), Verdict::Failed);
    }

    #[test]
    fn test_partial_counts_as_success() {
        assert!(Verdict::Partial {
            succeeded: 1,
            total: 2
        }
        .is_success());
        assert!(!Verdict::Failed.is_success());
    }
}

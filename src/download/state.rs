//! Run statistics.

use crate::download::submission::SubmissionReport;

/// Counters across all sources of one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub processed: u64,
    /// Already archived by an earlier run.
    pub skipped: u64,
    pub media_failures: u64,
    /// Metadata or comment export failed.
    pub export_failures: u64,
    /// Submissions that could not be processed at all.
    pub errored: u64,
    pub sources_processed: u64,
    pub sources_failed: u64,
}

impl RunStats {
    /// Count the outcome of one submission.
    pub fn record(&mut self, report: &SubmissionReport) {
        match *report {
            SubmissionReport::Skipped => self.skipped += 1,
            SubmissionReport::Archived {
                media_ok,
                meta_ok,
                comments_ok,
            } => {
                self.processed += 1;
                if !media_ok {
                    self.media_failures += 1;
                }
                if !(meta_ok && comments_ok) {
                    self.export_failures += 1;
                }
            }
        }
    }

    /// Count a submission that failed before it could be processed.
    pub fn record_error(&mut self) {
        self.errored += 1;
    }

    pub fn source_done(&mut self) {
        self.sources_processed += 1;
    }

    pub fn source_failed(&mut self) {
        self.sources_failed += 1;
    }

    /// Total submissions seen.
    pub fn total(&self) -> u64 {
        self.processed + self.skipped + self.errored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record() {
        let mut stats = RunStats::default();
        stats.record(&SubmissionReport::Skipped);
        stats.record(&SubmissionReport::Archived {
            media_ok: true,
            meta_ok: true,
            comments_ok: true,
        });
        stats.record(&SubmissionReport::Archived {
            media_ok: false,
            meta_ok: true,
            comments_ok: false,
        });
        stats.record_error();

        assert_eq!(stats.processed, 2);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.media_failures, 1);
        assert_eq!(stats.export_failures, 1);
        assert_eq!(stats.errored, 1);
        assert_eq!(stats.total(), 4);
    }
}

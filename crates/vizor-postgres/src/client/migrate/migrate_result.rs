//! Outcome types for migration operations.

use std::time::Duration;

/// Applied and pending migration versions for a database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct MigrationStatus {
    /// Applied versions, oldest first.
    pub applied_versions: Vec<String>,
    /// Embedded versions not yet applied, oldest first.
    pub pending_versions: Vec<String>,
}

impl MigrationStatus {
    /// Creates a status from applied and pending versions.
    pub fn new(
        applied_versions: impl Into<Vec<String>>,
        pending_versions: impl Into<Vec<String>>,
    ) -> Self {
        Self {
            applied_versions: applied_versions.into(),
            pending_versions: pending_versions.into(),
        }
    }

    #[inline]
    pub fn applied_migrations(&self) -> usize {
        self.applied_versions.len()
    }

    #[inline]
    pub fn pending_migrations(&self) -> usize {
        self.pending_versions.len()
    }

    /// Returns the version that the next run would apply first.
    pub fn next_pending_version(&self) -> Option<&str> {
        self.pending_versions.first().map(String::as_str)
    }

    #[inline]
    pub fn is_up_to_date(&self) -> bool {
        self.pending_versions.is_empty()
    }
}

/// Result of a [`run_pending_migrations`] call.
///
/// [`run_pending_migrations`]: super::run_pending_migrations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationResult {
    /// Wall time spent, including the status check.
    pub duration: Duration,
    /// Versions applied by this run, oldest first.
    pub processed_versions: Vec<String>,
}

impl MigrationResult {
    /// Creates a result for a completed run.
    pub fn success(duration: Duration, processed_versions: Vec<String>) -> Self {
        Self {
            duration,
            processed_versions,
        }
    }

    /// Returns whether the run found nothing to apply.
    #[inline]
    pub fn is_no_op(&self) -> bool {
        self.processed_versions.is_empty()
    }

    pub fn last_processed_version(&self) -> Option<&str> {
        self.processed_versions.last().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_versions_are_reported_in_order() {
        let status = MigrationStatus::new(
            vec!["20240101000000".to_owned()],
            vec!["20240601000000".to_owned(), "20240701000000".to_owned()],
        );

        assert!(!status.is_up_to_date());
        assert_eq!(status.next_pending_version(), Some("20240601000000"));
        assert_eq!(status.pending_migrations(), 2);
    }

    #[test]
    fn empty_run_is_no_op() {
        let result = MigrationResult::success(Duration::from_millis(5), Vec::new());
        assert!(result.is_no_op());
        assert_eq!(result.last_processed_version(), None);
    }
}

// src/batch.rs
//! Batch driver — sequential folder sync with aggregation.
//!
//! One file at a time, strictly in order: file N+1's extraction does not
//! begin until file N's full attempt (including extra-chunk appends) has
//! resolved. Sequencing keeps error attribution unambiguous and holds
//! the request rate under the API's limits without a rate limiter; a
//! fixed pause between files does the rest.
//!
//! A failing file never aborts the run. Every failure is recorded and
//! the loop moves on.

use crate::config::DatabaseTarget;
use crate::constants::{BATCH_PROGRESS_INTERVAL, SUMMARY_ERROR_PREVIEW};
use crate::sync::{FileOutcome, NoteSyncer};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One file's recorded failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileError {
    pub file: String,
    pub error: String,
}

/// Aggregated outcome of one batch run. Counters only grow during the
/// run and the struct is never mutated after it returns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchResult {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors: Vec<FileError>,
}

impl BatchResult {
    fn record_failure(&mut self, file: &Path, error: String) {
        self.failed += 1;
        self.errors.push(FileError {
            file: file.display().to_string(),
            error,
        });
    }
}

/// Runs one batch: every file is attempted exactly once, sequentially.
///
/// Precondition: a target without credential or database id yields a
/// zero-totals result before any file is touched, so the caller can tell
/// "misconfigured" apart from "nothing to do".
pub async fn run_batch(
    target: &DatabaseTarget,
    files: &[PathBuf],
    syncer: &dyn NoteSyncer,
    delay: Duration,
) -> BatchResult {
    if !target.is_configured() {
        log::error!(
            "Target '{}' has no API token or database id configured; nothing attempted",
            target.ab_name
        );
        return BatchResult::default();
    }

    let mut result = BatchResult {
        total: files.len(),
        ..Default::default()
    };

    for (index, file) in files.iter().enumerate() {
        let progress = format!("[{}/{}]", index + 1, files.len());
        log::info!("{} Processing {}", progress, file.display());

        match syncer.sync_file(file).await {
            Ok(FileOutcome::Skipped) => {
                result.skipped += 1;
                log::warn!("{} Skipped {}: no content", progress, file.display());
            }
            Ok(FileOutcome::Completed(response)) if response.is_success() => {
                result.success += 1;
                log::info!("{} ✓ {}", progress, file.display());
            }
            Ok(FileOutcome::Completed(response)) => {
                let message = format!("Status {}", response.status);
                log::error!("{} ✗ {}: {}", progress, file.display(), message);
                result.record_failure(file, message);
            }
            Err(error) => {
                log::error!("{} ✗ {}: {}", progress, file.display(), error);
                result.record_failure(file, error.to_string());
            }
        }

        if (index + 1) % BATCH_PROGRESS_INTERVAL == 0 || index + 1 == files.len() {
            log::info!(
                "Batch progress: {}/{} ({} success, {} failed)",
                index + 1,
                files.len(),
                result.success,
                result.failed
            );
        }

        if !delay.is_zero() && index + 1 < files.len() {
            tokio::time::sleep(delay).await;
        }
    }

    result
}

/// Renders the final summary shown after a batch run: one totals line,
/// the first few failures inline, the rest as a count.
pub fn format_summary(result: &BatchResult, folder: &Path) -> String {
    let mut message = format!(
        "Batch upload completed for {}\nTotal: {} | Success: {} | Failed: {} | Skipped: {}",
        folder.display(),
        result.total,
        result.success,
        result.failed,
        result.skipped
    );

    if !result.errors.is_empty() {
        message.push_str("\n\nFailed files:\n");
        for error in result.errors.iter().take(SUMMARY_ERROR_PREVIEW) {
            let name = error.file.rsplit('/').next().unwrap_or(&error.file);
            message.push_str(&format!("- {}: {}\n", name, error.error));
        }
        if result.errors.len() > SUMMARY_ERROR_PREVIEW {
            message.push_str(&format!(
                "... and {} more errors (check the log file)",
                result.errors.len() - SUMMARY_ERROR_PREVIEW
            ));
        }
    }

    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::PageResponse;
    use crate::config::TargetFormat;
    use crate::error::AppError;
    use crate::sync::NoteSyncer;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// Scripted per-file outcomes keyed by file name, recording call order.
    struct ScriptedSyncer {
        outcomes: Vec<(&'static str, Script)>,
        calls: Mutex<Vec<String>>,
    }

    enum Script {
        Ok(u16),
        Skip,
        Fail(&'static str),
    }

    #[async_trait::async_trait]
    impl NoteSyncer for ScriptedSyncer {
        async fn sync_file(&self, file: &Path) -> Result<FileOutcome, AppError> {
            let name = file.file_name().unwrap().to_string_lossy().to_string();
            self.calls.lock().unwrap().push(name.clone());
            let script = self
                .outcomes
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, s)| s)
                .expect("unscripted file");
            match script {
                Script::Ok(status) => Ok(FileOutcome::Completed(PageResponse {
                    status: *status,
                    data: serde_json::json!({}),
                })),
                Script::Skip => Ok(FileOutcome::Skipped),
                Script::Fail(message) => Err(AppError::Conversion(message.to_string())),
            }
        }
    }

    fn target(configured: bool) -> DatabaseTarget {
        DatabaseTarget {
            format: TargetFormat::General,
            full_name: "Blog".to_string(),
            ab_name: "blog".to_string(),
            api_token: if configured {
                "secret_abcdefghijklmnop".to_string()
            } else {
                String::new()
            },
            database_id: if configured { "a".repeat(32) } else { String::new() },
            enable_tags: false,
            custom_title: false,
            custom_title_name: String::new(),
            custom_properties: Vec::new(),
        }
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[tokio::test]
    async fn aggregates_mixed_outcomes_without_early_abort() {
        let syncer = ScriptedSyncer {
            outcomes: vec![
                ("f1.md", Script::Ok(200)),
                ("f2.md", Script::Ok(200)),
                ("f3.md", Script::Fail("boom")),
                ("f4.md", Script::Ok(200)),
                ("f5.md", Script::Fail("bust")),
                ("f6.md", Script::Ok(200)),
                ("f7.md", Script::Ok(200)),
            ],
            calls: Mutex::new(Vec::new()),
        };
        let files = paths(&["f1.md", "f2.md", "f3.md", "f4.md", "f5.md", "f6.md", "f7.md"]);

        let result = run_batch(&target(true), &files, &syncer, Duration::ZERO).await;

        assert_eq!(result.total, 7);
        assert_eq!(result.success, 5);
        assert_eq!(result.failed, 2);
        assert_eq!(result.skipped, 0);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[0].file, "f3.md");
        assert_eq!(result.errors[1].file, "f5.md");
        // Files after the failures were still attempted, in order.
        let calls = syncer.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec!["f1.md", "f2.md", "f3.md", "f4.md", "f5.md", "f6.md", "f7.md"]
        );
    }

    #[tokio::test]
    async fn non_success_status_counts_as_failure_with_status_message() {
        let syncer = ScriptedSyncer {
            outcomes: vec![("f1.md", Script::Ok(429))],
            calls: Mutex::new(Vec::new()),
        };
        let result = run_batch(&target(true), &paths(&["f1.md"]), &syncer, Duration::ZERO).await;

        assert_eq!(result.failed, 1);
        assert_eq!(result.errors[0].error, "Status 429");
    }

    #[tokio::test]
    async fn skipped_files_are_not_errors() {
        let syncer = ScriptedSyncer {
            outcomes: vec![("f1.md", Script::Skip), ("f2.md", Script::Ok(200))],
            calls: Mutex::new(Vec::new()),
        };
        let result = run_batch(
            &target(true),
            &paths(&["f1.md", "f2.md"]),
            &syncer,
            Duration::ZERO,
        )
        .await;

        assert_eq!(result.skipped, 1);
        assert_eq!(result.success, 1);
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn misconfigured_target_short_circuits_before_any_file() {
        let syncer = ScriptedSyncer {
            outcomes: vec![("f1.md", Script::Ok(200))],
            calls: Mutex::new(Vec::new()),
        };
        let result = run_batch(&target(false), &paths(&["f1.md"]), &syncer, Duration::ZERO).await;

        assert_eq!(result, BatchResult::default());
        assert!(syncer.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn summary_previews_first_errors_and_counts_the_rest() {
        let result = BatchResult {
            total: 10,
            success: 3,
            failed: 7,
            skipped: 0,
            errors: (1..=7)
                .map(|i| FileError {
                    file: format!("notes/f{}.md", i),
                    error: "Status 500".to_string(),
                })
                .collect(),
        };
        let summary = format_summary(&result, Path::new("notes"));

        assert!(summary.contains("Total: 10 | Success: 3 | Failed: 7 | Skipped: 0"));
        assert!(summary.contains("- f1.md: Status 500"));
        assert!(summary.contains("- f5.md: Status 500"));
        assert!(!summary.contains("- f6.md"));
        assert!(summary.contains("... and 2 more errors"));
    }
}

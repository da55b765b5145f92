use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{info, instrument, warn};

use crate::error::{ContentUnderstandingError, Result};
use crate::impl_prebuilt_analyzer;
use crate::models::AnalyzeResult;
use crate::models::analysis_client::{ContentUnderstandingClient, PollOptions, validate_analyzer_id};

impl_prebuilt_analyzer!(
    "document",
    PREBUILT_DOCUMENT_ANALYZER = "prebuilt-documentAnalyzer",
    analyze_document_from_url,
    analyze_document_from_file
);
impl_prebuilt_analyzer!(
    "image",
    PREBUILT_IMAGE_ANALYZER = "prebuilt-imageAnalyzer",
    analyze_image_from_url,
    analyze_image_from_file
);
impl_prebuilt_analyzer!(
    "audio",
    PREBUILT_AUDIO_ANALYZER = "prebuilt-audioAnalyzer",
    analyze_audio_from_url,
    analyze_audio_from_file
);
impl_prebuilt_analyzer!(
    "video",
    PREBUILT_VIDEO_ANALYZER = "prebuilt-videoAnalyzer",
    analyze_video_from_url,
    analyze_video_from_file
);

/// What a directory batch does when one file fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first failure and return its error; no partial results.
    #[default]
    AbortOnFirst,
    /// Record the failure under its path and keep going. Cancellation still
    /// stops the whole batch.
    CollectErrors,
}

#[derive(Clone, Debug)]
pub struct BatchOptions {
    /// Glob matched against file names, e.g. `*.pdf`.
    pub pattern: String,
    pub recursive: bool,
    pub failure_policy: FailurePolicy,
    /// Files in flight at once. `1` analyzes strictly one after another.
    pub concurrency: usize,
    pub poll: PollOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            pattern: "*".to_string(),
            recursive: false,
            failure_policy: FailurePolicy::default(),
            concurrency: 1,
            poll: PollOptions::default(),
        }
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: BTreeMap<PathBuf, AnalyzeResult>,
    pub failures: BTreeMap<PathBuf, ContentUnderstandingError>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn into_results(self) -> BTreeMap<PathBuf, AnalyzeResult> {
        self.results
    }
}

impl ContentUnderstandingClient {
    /// Analyzes every file in `directory` matching `options.pattern` and
    /// keys each result by its path.
    #[instrument(skip(self, directory, options), fields(directory = %directory.as_ref().display()))]
    pub async fn analyze_directory(
        &self,
        analyzer_id: &str,
        directory: impl AsRef<Path>,
        options: &BatchOptions,
    ) -> Result<BatchReport> {
        validate_analyzer_id(analyzer_id)?;
        if options.concurrency == 0 {
            return Err(ContentUnderstandingError::validation(
                "batch concurrency must be at least 1",
            ));
        }
        let files = list_files(directory.as_ref(), &options.pattern, options.recursive)?;

        info!(
            analyzer_id = analyzer_id,
            file_count = files.len(),
            concurrency = options.concurrency,
            "Starting directory batch"
        );

        let report = if options.concurrency == 1 {
            self.analyze_sequentially(analyzer_id, files, options).await?
        } else {
            self.analyze_concurrently(analyzer_id, files, options).await?
        };

        info!(
            succeeded = report.results.len(),
            failed = report.failures.len(),
            "Directory batch finished"
        );
        Ok(report)
    }

    async fn analyze_sequentially(
        &self,
        analyzer_id: &str,
        files: Vec<PathBuf>,
        options: &BatchOptions,
    ) -> Result<BatchReport> {
        let mut report = BatchReport::default();
        for path in files {
            match self.analyze_file(analyzer_id, &path, &options.poll).await {
                Ok(result) => {
                    report.results.insert(path, result);
                }
                Err(err) => record_failure(&mut report, path, err, options.failure_policy)?,
            }
        }
        Ok(report)
    }

    async fn analyze_concurrently(
        &self,
        analyzer_id: &str,
        files: Vec<PathBuf>,
        options: &BatchOptions,
    ) -> Result<BatchReport> {
        let semaphore = Semaphore::new(options.concurrency);
        let batch_cancel = options.poll.cancellation.child_token();
        let poll = options
            .poll
            .clone()
            .with_cancellation(batch_cancel.clone());

        let tasks = files.into_iter().map(|path| {
            let semaphore = &semaphore;
            let batch_cancel = &batch_cancel;
            let poll = &poll;
            async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    return (path, Err(ContentUnderstandingError::Cancelled));
                };
                let result = self.analyze_file(analyzer_id, &path, poll).await;
                if result.is_err() && options.failure_policy == FailurePolicy::AbortOnFirst {
                    batch_cancel.cancel();
                }
                (path, result)
            }
        });
        let outcomes = join_all(tasks).await;

        let mut report = BatchReport::default();
        let mut first_error = None;
        for (path, outcome) in outcomes {
            match outcome {
                Ok(result) => {
                    report.results.insert(path, result);
                }
                Err(ContentUnderstandingError::Cancelled)
                    if !options.poll.cancellation.is_cancelled() =>
                {
                    // Sibling of a failed file, stopped by the abort.
                    continue;
                }
                Err(err) => {
                    if let Err(err) = record_failure(&mut report, path, err, options.failure_policy)
                    {
                        first_error.get_or_insert(err);
                    }
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(report),
        }
    }
}

fn record_failure(
    report: &mut BatchReport,
    path: PathBuf,
    err: ContentUnderstandingError,
    policy: FailurePolicy,
) -> Result<()> {
    if policy == FailurePolicy::AbortOnFirst || matches!(err, ContentUnderstandingError::Cancelled) {
        return Err(err);
    }
    warn!(file_name = %path.display(), error = %err, "File analysis failed");
    report.failures.insert(path, err);
    Ok(())
}

/// Files in `directory` whose names match `pattern`, sorted by path.
pub fn list_files(directory: &Path, pattern: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    if !directory.is_dir() {
        return Err(ContentUnderstandingError::DirectoryNotFound(
            directory.to_path_buf(),
        ));
    }
    if pattern.trim().is_empty() {
        return Err(ContentUnderstandingError::validation(
            "file pattern must not be blank",
        ));
    }
    let root = directory.to_str().ok_or_else(|| {
        ContentUnderstandingError::validation(format!(
            "directory path is not valid UTF-8: {}",
            directory.display()
        ))
    })?;

    let full_pattern = format!(
        "{}/{}{}",
        glob::Pattern::escape(root.trim_end_matches('/')),
        if recursive { "**/" } else { "" },
        pattern
    );
    let entries = glob::glob(&full_pattern).map_err(|err| {
        ContentUnderstandingError::validation(format!("invalid file pattern '{pattern}': {err}"))
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

//! Job runner: one request per category, then one sync.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::Instrument;

use vgen_api_client::{VideoApiClient, VideoGenerator};
use vgen_models::{Category, CategoryOutcome, GenerateVideoRequest, RunId, RunReport};
use vgen_sync::{FileSyncer, RsyncSyncer};

use crate::config::WorkerConfig;
use crate::error::WorkerResult;
use crate::logging::RunLogger;

/// Runs the daily job.
///
/// Categories are processed strictly in order. A failed category never stops
/// the run, and the sync always runs exactly once afterwards.
pub struct JobRunner {
    config: Arc<WorkerConfig>,
    generator: Arc<dyn VideoGenerator>,
    syncer: Arc<dyn FileSyncer>,
}

impl JobRunner {
    /// Create a runner from explicit capabilities.
    pub fn new(
        config: Arc<WorkerConfig>,
        generator: Arc<dyn VideoGenerator>,
        syncer: Arc<dyn FileSyncer>,
    ) -> Self {
        Self {
            config,
            generator,
            syncer,
        }
    }

    /// Create a runner backed by the HTTP client and rsync.
    pub fn from_config(config: Arc<WorkerConfig>) -> WorkerResult<Self> {
        let generator = VideoApiClient::new(config.api_config())?;
        let syncer = RsyncSyncer::new(config.rsync_timeout).with_program(config.rsync_bin.clone());

        Ok(Self::new(config, Arc::new(generator), Arc::new(syncer)))
    }

    /// Run the job for today's local date.
    pub async fn run_once(&self) -> RunReport {
        self.run_for_date(Local::now().date_naive()).await
    }

    /// Run the job for the given date.
    pub async fn run_for_date(&self, date: NaiveDate) -> RunReport {
        let run_id = RunId::new();
        let logger = RunLogger::new(&run_id, date);
        let span = logger.create_span();

        async move {
            logger.log_start();

            let mut categories = Vec::with_capacity(Category::ALL.len());
            for &category in Category::ALL {
                let success = self.generate(&logger, category, date).await;
                categories.push(CategoryOutcome { category, success });
            }

            let succeeded = categories.iter().filter(|c| c.success).count();
            let failed: Vec<Category> = categories
                .iter()
                .filter(|c| !c.success)
                .map(|c| c.category)
                .collect();
            logger.log_generation_summary(succeeded, categories.len(), &failed);

            let sync = self.sync(&logger).await.into();

            let report = RunReport {
                run_id,
                date,
                categories,
                sync,
            };
            logger.log_completion(&report);
            report
        }
        .instrument(span)
        .await
    }

    /// Request the video for one category. Never fails the run.
    async fn generate(&self, logger: &RunLogger, category: Category, date: NaiveDate) -> bool {
        logger.log_category_start(category);

        let request = GenerateVideoRequest::new(&self.config.region, category, date);
        match self.generator.generate(&request).await {
            Ok(()) => {
                logger.log_category_success(category);
                true
            }
            Err(e) => {
                logger.log_category_failure(category, &e);
                false
            }
        }
    }

    /// Mirror the output directory to the remote host.
    pub async fn sync(&self, logger: &RunLogger) -> bool {
        logger.log_sync_start();

        let credentials = self.config.credentials();
        match self
            .syncer
            .mirror(&self.config.rsync_source, &self.config.rsync_dest, &credentials)
            .await
        {
            Ok(output) => {
                logger.log_sync_success(&output);
                true
            }
            Err(e) => {
                logger.log_sync_failure(&e);
                false
            }
        }
    }
}

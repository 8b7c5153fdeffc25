use std::time::Duration;

use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::PollConfig;
use crate::errors::IngestError;
use crate::ingest::{ingest_answer, ingest_question, Outcome};
use crate::models::answer::ANSWER_KEY_PATTERN;
use crate::models::question::QUESTION_KEY_PATTERN;
use crate::store::{SourceStore, Warehouse};

/// Tally of one scan cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub questions_seen: usize,
    pub answers_seen: usize,
    pub inserted: usize,
    pub already_present: usize,
    pub skipped: usize,
    pub deferred: usize,
    pub failed: usize,
}

impl CycleReport {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Inserted => self.inserted += 1,
            Outcome::AlreadyPresent => self.already_present += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Deferred => self.deferred += 1,
            Outcome::Failed => self.failed += 1,
        }
    }

    pub fn wrote_anything(&self) -> bool {
        self.inserted > 0
    }
}

/// Sequential scan-and-reconcile loop over one source and one warehouse.
pub struct Poller<S, W> {
    source: S,
    warehouse: W,
    config: PollConfig,
}

impl<S: SourceStore, W: Warehouse> Poller<S, W> {
    pub fn new(source: S, warehouse: W, config: PollConfig) -> Self {
        Self {
            source,
            warehouse,
            config,
        }
    }

    /// Scans questions, then answers, one key at a time.
    ///
    /// Questions go first so that answers to questions created in the same
    /// cycle are not deferred. Listing failures and connection-level errors
    /// abort the cycle.
    pub async fn run_cycle(&self) -> Result<CycleReport, IngestError> {
        let mut report = CycleReport::default();

        let question_keys = self.source.list_keys(QUESTION_KEY_PATTERN).await?;
        report.questions_seen = question_keys.len();
        for key in &question_keys {
            report.record(ingest_question(&self.source, &self.warehouse, key).await?);
        }

        let answer_keys = self.source.list_keys(ANSWER_KEY_PATTERN).await?;
        report.answers_seen = answer_keys.len();
        for key in &answer_keys {
            report.record(ingest_answer(&self.source, &self.warehouse, key).await?);
        }

        Ok(report)
    }

    /// Short wait after productive cycles, long wait after idle ones.
    pub fn wait_after(&self, report: &CycleReport) -> Duration {
        if report.wrote_anything() {
            self.config.active_wait
        } else {
            self.config.idle_wait
        }
    }

    /// Runs cycles forever. Returns only when a cycle escalates an error.
    pub async fn run(&self) -> Result<(), IngestError> {
        info!(
            "Starting main processing loop (active wait {:?}, idle wait {:?})",
            self.config.active_wait, self.config.idle_wait
        );

        loop {
            let report = self.run_cycle().await?;
            let wait = self.wait_after(&report);

            if report.wrote_anything() {
                info!(
                    "Cycle wrote {} new rows ({} questions, {} answers scanned, {} deferred, {} failed)",
                    report.inserted,
                    report.questions_seen,
                    report.answers_seen,
                    report.deferred,
                    report.failed
                );
            } else {
                info!("No new data to process, waiting {wait:?}");
                debug!("Idle cycle report: {report:?}");
            }

            sleep(wait).await;
        }
    }

    /// Like [`Poller::run`], but returns `Ok(())` once `shutdown` flips to
    /// `true`. An in-flight cycle is dropped; its open transaction rolls back.
    pub async fn run_until_shutdown(
        &self,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), IngestError> {
        tokio::select! {
            biased;
            _ = wait_for_shutdown(&mut shutdown) => {
                info!("Shutdown requested, leaving processing loop");
                Ok(())
            }
            result = self.run() => result,
        }
    }
}

async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        // Sender dropped without a request: nothing can stop us any more.
        std::future::pending::<()>().await;
    }
}

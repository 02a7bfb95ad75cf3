//! Async job poller
//!
//! Waits for a topic job to leave the pending state by querying its status
//! on a fixed interval. The loop is bounded: after `max_attempts` status
//! checks without a terminal status it reports a timeout.

use crate::config::SdkConfig;
use crate::error::{SdkError, SdkResult};
use crate::resources::topics::{JobHandle, JobStatus};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Anything that can report the status of a topic job.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Query the current status of the job behind `handle`
    async fn job_status(&self, handle: &JobHandle) -> SdkResult<JobStatus>;
}

/// Budget of a poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Maximum number of status checks
    pub max_attempts: u32,
    /// Delay between two status checks
    pub interval: Duration,
}

impl PollConfig {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    pub fn from_config(config: &SdkConfig) -> Self {
        Self::new(config.poll_max_attempts, config.poll_interval)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::new(10, Duration::from_millis(5000))
    }
}

/// How a poll loop ended. Callers must handle all four cases.
#[derive(Debug)]
pub enum PollOutcome {
    /// The job completed
    Completed { attempts: u32 },
    /// A status query itself failed; the loop stopped right there
    QueryFailed { attempts: u32, error: SdkError },
    /// The backend reported that processing failed
    ProcessingFailed { attempts: u32 },
    /// The budget ran out while the job was still pending
    TimedOut { attempts: u32 },
}

impl PollOutcome {
    /// Number of status queries issued
    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Completed { attempts }
            | PollOutcome::QueryFailed { attempts, .. }
            | PollOutcome::ProcessingFailed { attempts }
            | PollOutcome::TimedOut { attempts } => *attempts,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, PollOutcome::Completed { .. })
    }

    /// Collapse the outcome into a result for `?`-style callers
    pub fn into_result(self, handle: &JobHandle) -> SdkResult<()> {
        match self {
            PollOutcome::Completed { .. } => Ok(()),
            PollOutcome::QueryFailed { error, .. } => Err(error),
            PollOutcome::ProcessingFailed { .. } => Err(SdkError::JobProcessingFailed {
                topic_id: handle.topic_id.clone(),
            }),
            PollOutcome::TimedOut { attempts } => Err(SdkError::JobTimedOut {
                topic_id: handle.topic_id.clone(),
                attempts,
            }),
        }
    }
}

/// Bounded status poller
#[derive(Debug, Clone, Copy, Default)]
pub struct JobPoller {
    config: PollConfig,
}

impl JobPoller {
    pub fn new(config: PollConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> PollConfig {
        self.config
    }

    /// Poll `source` until the job behind `handle` is terminal or the budget
    /// is spent. No sleep follows the final status check.
    pub async fn poll<S>(&self, source: &S, handle: &JobHandle) -> PollOutcome
    where
        S: StatusSource + ?Sized,
    {
        let max_attempts = self.config.max_attempts;
        let mut attempts = 0u32;

        while attempts < max_attempts {
            let status = source.job_status(handle).await;
            attempts += 1;

            match status {
                Err(error) => {
                    warn!(topic_id = %handle.topic_id, attempts, error = %error, "Status query failed");
                    return PollOutcome::QueryFailed { attempts, error };
                }
                Ok(JobStatus::Completed) => {
                    info!(topic_id = %handle.topic_id, attempts, "Topic processing completed");
                    return PollOutcome::Completed { attempts };
                }
                Ok(JobStatus::Error) => {
                    warn!(topic_id = %handle.topic_id, attempts, "Topic processing failed");
                    return PollOutcome::ProcessingFailed { attempts };
                }
                Ok(status) => {
                    debug!(topic_id = %handle.topic_id, attempts, max_attempts, status = ?status, "Topic still processing");
                    if attempts < max_attempts {
                        tokio::time::sleep(self.config.interval).await;
                    }
                }
            }
        }

        warn!(topic_id = %handle.topic_id, attempts, "Gave up waiting for topic processing");
        PollOutcome::TimedOut { attempts }
    }
}

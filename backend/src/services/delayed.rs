//! Delayed post creation.
//!
//! A submission hands a validated post to a background task that sleeps for
//! the requested countdown and then inserts it. The caller gets an id and the
//! planned run time back; nothing tracks the job after that, and failures only
//! show up in the logs.

use chrono::{DateTime, Utc};
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::db::repository::FullRepository;
use crate::models::{PostDraft, UserId};

/// A post waiting to be created.
#[derive(Debug, Clone)]
pub struct DelayedPost {
    pub author: UserId,
    pub draft: PostDraft,
    pub delay: Duration,
}

/// Receipt for a submitted job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledPost {
    pub job_id: String,
    pub run_at: DateTime<Utc>,
}

/// Submission point for delayed posts.
pub trait PostQueue: Send + Sync {
    /// Enqueue the job and return immediately.
    fn submit(&self, job: DelayedPost) -> ScheduledPost;
}

/// Runs each job on its own tokio task.
#[derive(Clone)]
pub struct TokioPostQueue {
    repository: Arc<dyn FullRepository>,
}

impl TokioPostQueue {
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self { repository }
    }
}

impl PostQueue for TokioPostQueue {
    fn submit(&self, job: DelayedPost) -> ScheduledPost {
        let job_id = Uuid::new_v4().to_string();
        let run_at = Utc::now()
            + chrono::Duration::from_std(job.delay).unwrap_or_else(|_| chrono::Duration::zero());

        let repo = self.repository.clone();
        let task_id = job_id.clone();
        tokio::spawn(async move {
            tokio::time::sleep(job.delay).await;
            match repo.create_post(job.author, &job.draft).await {
                Ok(post) => info!(
                    "Delayed job {} created post {} for user {}",
                    task_id, post.id, job.author
                ),
                Err(e) => warn!("Delayed job {} failed: {}", task_id, e),
            }
        });

        info!(
            "Scheduled delayed post {} for user {} in {}s",
            job_id,
            job.author,
            job.delay.as_secs()
        );
        ScheduledPost { job_id, run_at }
    }
}

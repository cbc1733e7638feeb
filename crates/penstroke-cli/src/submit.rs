//! Submission client: sends a validated draft to the creation endpoint.
//!
//! At most one submission is in flight per client. The in-flight flag is held
//! by a guard that moves into the request task, so it drops back to idle when
//! the task ends for any reason: success, failure, timeout or cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use penstroke_api_types::{CreatePostRequest, CreatePostResponse};
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::composer::Composer;
use crate::notify::Notification;

pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server rejected submission with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("submission timed out after {0:?}")]
    TimedOut(Duration),
    #[error("submission was cancelled")]
    Cancelled,
}

/// Anything that can deliver a creation request to the server.
#[async_trait]
pub trait PostTransport: Send + Sync + 'static {
    async fn create_post(
        &self,
        request: &CreatePostRequest,
    ) -> Result<CreatePostResponse, TransportError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
}

#[derive(Debug)]
pub enum SubmissionOutcome {
    Succeeded(CreatePostResponse),
    Failed(TransportError),
}

impl SubmissionOutcome {
    /// User-facing notice for this outcome. Failures are always summarized.
    pub fn notification(&self) -> Notification {
        match self {
            SubmissionOutcome::Succeeded(post) => Notification::post_created(&post.slug),
            SubmissionOutcome::Failed(_) => Notification::submission_failed(),
        }
    }
}

struct InFlightGuard(Arc<AtomicBool>);

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag.clone()))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Join handle that aborts its task when dropped.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// A submission that has been sent and not yet resolved.
///
/// Dropping it, or dropping the [`outcome`](Self::outcome) future before it
/// resolves, cancels the request.
pub struct PendingSubmission {
    handle: AbortOnDrop<Result<CreatePostResponse, TransportError>>,
}

impl PendingSubmission {
    pub async fn outcome(mut self) -> SubmissionOutcome {
        match (&mut self.handle.0).await {
            Ok(Ok(post)) => SubmissionOutcome::Succeeded(post),
            Ok(Err(err)) => SubmissionOutcome::Failed(err),
            Err(_) => SubmissionOutcome::Failed(TransportError::Cancelled),
        }
    }

    /// Abandon the request. The client becomes idle once the task unwinds.
    pub fn cancel(&self) {
        self.handle.0.abort();
    }
}

pub struct SubmissionClient<T> {
    transport: Arc<T>,
    in_flight: Arc<AtomicBool>,
    timeout: Duration,
}

impl<T: PostTransport> SubmissionClient<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self::with_timeout(transport, DEFAULT_SUBMIT_TIMEOUT)
    }

    pub fn with_timeout(transport: Arc<T>, timeout: Duration) -> Self {
        Self {
            transport,
            in_flight: Arc::new(AtomicBool::new(false)),
            timeout,
        }
    }

    pub fn state(&self) -> SubmissionState {
        if self.in_flight.load(Ordering::Acquire) {
            SubmissionState::Submitting
        } else {
            SubmissionState::Idle
        }
    }

    /// Whether the submit control should accept a click right now.
    pub fn submit_enabled(&self, composer: &Composer) -> bool {
        composer.is_valid() && self.state() == SubmissionState::Idle
    }

    /// Start a submission of the composer's draft.
    ///
    /// Returns `None` without sending anything when a submission is already
    /// in flight or the draft does not validate. Must be called from within a
    /// tokio runtime.
    pub fn try_submit(&self, composer: &Composer) -> Option<PendingSubmission> {
        let request = composer.request()?;
        let guard = InFlightGuard::acquire(&self.in_flight)?;

        let transport = self.transport.clone();
        let timeout = self.timeout;
        let handle = tokio::spawn(async move {
            let _guard = guard;
            match tokio::time::timeout(timeout, transport.create_post(&request)).await {
                Ok(result) => result,
                Err(_) => Err(TransportError::TimedOut(timeout)),
            }
        });

        Some(PendingSubmission {
            handle: AbortOnDrop(handle),
        })
    }
}

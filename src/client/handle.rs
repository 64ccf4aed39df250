//! Caller-facing handle to an in-flight request.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::RestError;

/// Handle to the eventual result of a dispatch operation.
///
/// Returned immediately by every client operation; the request itself runs
/// on a spawned task. Await the handle to obtain the response.
///
/// Cancelling (explicitly via [`cancel`](Self::cancel), or by dropping an
/// unfinished handle) aborts the underlying task, which drops the in-flight
/// transport future. Once cancellation is observed the handle resolves to
/// [`RestError::Cancelled`], never to a response.
#[must_use = "dropping a ResponseHandle cancels the request"]
pub struct ResponseHandle<T> {
    url: String,
    state: HandleState<T>,
}

enum HandleState<T> {
    Ready(Option<Result<T, RestError>>),
    Running {
        task: JoinHandle<Result<T, RestError>>,
        token: CancellationToken,
    },
    Done,
}

// No field is structurally pinned; the join handle is itself `Unpin`.
impl<T> Unpin for ResponseHandle<T> {}

impl<T> std::fmt::Debug for ResponseHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.state {
            HandleState::Ready(_) => "ready",
            HandleState::Running { .. } => "running",
            HandleState::Done => "done",
        };
        f.debug_struct("ResponseHandle")
            .field("url", &self.url)
            .field("state", &state)
            .finish()
    }
}

impl<T> ResponseHandle<T> {
    pub(crate) fn spawned(
        url: String,
        task: JoinHandle<Result<T, RestError>>,
        token: CancellationToken,
    ) -> Self {
        Self {
            url,
            state: HandleState::Running { task, token },
        }
    }

    /// Creates a handle that is already resolved with `result`.
    pub(crate) fn ready(url: String, result: Result<T, RestError>) -> Self {
        Self {
            url,
            state: HandleState::Ready(Some(result)),
        }
    }

    /// URL of the request behind this handle.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Cancels the request.
    ///
    /// Has no effect on a handle that already resolved.
    pub fn cancel(&self) {
        if let HandleState::Running { task, token } = &self.state {
            token.cancel();
            task.abort();
        }
    }

    /// Returns true once the request has finished (successfully or not).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        match &self.state {
            HandleState::Ready(_) | HandleState::Done => true,
            HandleState::Running { task, .. } => task.is_finished(),
        }
    }
}

impl<T> Future for ResponseHandle<T> {
    type Output = Result<T, RestError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let output = match &mut this.state {
            HandleState::Ready(result) => match result.take() {
                Some(result) => result,
                None => panic!("ResponseHandle polled after completion"),
            },
            HandleState::Running { task, token } => {
                if token.is_cancelled() {
                    task.abort();
                    Err(RestError::cancelled(this.url.as_str()))
                } else {
                    match Pin::new(task).poll(cx) {
                        Poll::Pending => return Poll::Pending,
                        Poll::Ready(Ok(_)) if token.is_cancelled() => {
                            Err(RestError::cancelled(this.url.as_str()))
                        }
                        Poll::Ready(Ok(result)) => result,
                        Poll::Ready(Err(join_error)) if join_error.is_panic() => {
                            std::panic::resume_unwind(join_error.into_panic())
                        }
                        Poll::Ready(Err(_)) => Err(RestError::cancelled(this.url.as_str())),
                    }
                }
            }
            HandleState::Done => panic!("ResponseHandle polled after completion"),
        };
        this.state = HandleState::Done;
        Poll::Ready(output)
    }
}

impl<T> Drop for ResponseHandle<T> {
    fn drop(&mut self) {
        if let HandleState::Running { task, token } = &self.state
            && !task.is_finished()
        {
            token.cancel();
            task.abort();
        }
    }
}

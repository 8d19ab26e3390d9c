//! Awaitable handles for work moved onto the blocking pool

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::task::JoinHandle;

use crate::error::{ConvertError, LoadError};

use super::HtmlConverter;

/// A conversion running on a blocking thread.
///
/// Implements `Future` so callers can simply `.await` it; a panicked or
/// cancelled task surfaces as [`ConvertError::Conversion`].
pub struct PendingConversion {
    handle: JoinHandle<String>,
}

impl PendingConversion {
    /// Move `html` onto the blocking pool and convert it there
    pub fn spawn(converter: Arc<dyn HtmlConverter>, html: Arc<str>) -> Self {
        Self {
            handle: tokio::task::spawn_blocking(move || converter.convert(&html)),
        }
    }
}

impl Future for PendingConversion {
    type Output = Result<String, ConvertError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.handle).poll(cx) {
            Poll::Ready(Ok(markdown)) => Poll::Ready(Ok(markdown)),
            Poll::Ready(Err(e)) => Poll::Ready(Err(ConvertError::Conversion(e.to_string()))),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// A converter being built on a blocking thread
pub struct PendingLoad {
    handle: JoinHandle<Result<Arc<dyn HtmlConverter>, LoadError>>,
}

impl PendingLoad {
    pub fn spawn<F>(build: F) -> Self
    where
        F: FnOnce() -> Result<Arc<dyn HtmlConverter>, LoadError> + Send + 'static,
    {
        Self {
            handle: tokio::task::spawn_blocking(build),
        }
    }
}

impl Future for PendingLoad {
    type Output = Result<Arc<dyn HtmlConverter>, LoadError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.handle).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(e)) => Poll::Ready(Err(LoadError::TaskFailed(e.to_string()))),
            Poll::Pending => Poll::Pending,
        }
    }
}

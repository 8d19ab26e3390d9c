//! Single-flight cache over the asynchronous converter load

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::config::ConversionOptions;
use crate::error::{ConvertResult, LoadError};
use crate::markdown_converter::MarkdownConverter;

use super::HtmlConverter;
use super::pending::{PendingConversion, PendingLoad};

/// Future resolving to a loaded converter
pub type LoadFuture = BoxFuture<'static, Result<Arc<dyn HtmlConverter>, LoadError>>;

/// Source of a converter implementation.
///
/// Each call to [`load`](ConverterLoader::load) is one load attempt;
/// [`LazyConverter`] guarantees it is not called again while an attempt is
/// in flight or after one has succeeded.
pub trait ConverterLoader: Send + Sync + 'static {
    fn load(&self) -> LoadFuture;
}

/// Builds the bundled [`MarkdownConverter`] on the blocking pool
#[derive(Debug, Clone, Default)]
pub struct BuiltinLoader {
    options: ConversionOptions,
}

impl BuiltinLoader {
    #[must_use]
    pub fn new(options: ConversionOptions) -> Self {
        Self { options }
    }
}

impl ConverterLoader for BuiltinLoader {
    fn load(&self) -> LoadFuture {
        let options = self.options.clone();
        PendingLoad::spawn(move || Ok(Arc::new(MarkdownConverter::new(options)) as Arc<dyn HtmlConverter>))
            .boxed()
    }
}

enum LoadState {
    Idle,
    Loading {
        attempt: usize,
        future: Shared<LoadFuture>,
    },
    Ready(Arc<dyn HtmlConverter>),
}

/// Converter that is loaded on first use and shared afterwards.
///
/// Calls made while the load is in flight wait on the same shared future, so
/// none of them can finish before the load does. A failed load is reported to
/// every waiter and clears the slot; the next call starts a fresh attempt.
pub struct LazyConverter {
    loader: Box<dyn ConverterLoader>,
    state: Mutex<LoadState>,
    loads_started: AtomicUsize,
}

impl Default for LazyConverter {
    fn default() -> Self {
        Self::new(BuiltinLoader::default())
    }
}

impl LazyConverter {
    pub fn new(loader: impl ConverterLoader) -> Self {
        Self {
            loader: Box::new(loader),
            state: Mutex::new(LoadState::Idle),
            loads_started: AtomicUsize::new(0),
        }
    }

    /// Lazy converter over the bundled implementation with `options`
    #[must_use]
    pub fn with_options(options: ConversionOptions) -> Self {
        Self::new(BuiltinLoader::new(options))
    }

    /// Number of load attempts started so far
    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads_started.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(*self.state.lock(), LoadState::Ready(_))
    }

    /// The loaded converter, starting or joining a load if needed
    pub async fn converter(&self) -> Result<Arc<dyn HtmlConverter>, LoadError> {
        let (attempt, future) = {
            let mut state = self.state.lock();
            match &*state {
                LoadState::Ready(converter) => return Ok(Arc::clone(converter)),
                LoadState::Loading { attempt, future } => (*attempt, future.clone()),
                LoadState::Idle => {
                    let attempt = self.loads_started.fetch_add(1, Ordering::AcqRel) + 1;
                    debug!(target: "markdown_bridge::runtime", attempt, "loading converter");
                    let future = self.loader.load().shared();
                    *state = LoadState::Loading {
                        attempt,
                        future: future.clone(),
                    };
                    (attempt, future)
                }
            }
        };

        let outcome = future.await;

        let mut state = self.state.lock();
        let current = matches!(&*state, LoadState::Loading { attempt: a, .. } if *a == attempt);
        if current {
            *state = match &outcome {
                Ok(converter) => LoadState::Ready(Arc::clone(converter)),
                Err(e) => {
                    warn!(target: "markdown_bridge::runtime", attempt, error = %e, "converter load failed");
                    LoadState::Idle
                }
            };
        }
        outcome
    }

    /// Convert `html` once the converter is available.
    ///
    /// The conversion itself runs on the blocking pool.
    pub async fn convert(&self, html: &str) -> ConvertResult<String> {
        let converter = self.converter().await?;
        PendingConversion::spawn(converter, Arc::from(html)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertError;

    struct FailingLoader;

    impl ConverterLoader for FailingLoader {
        fn load(&self) -> LoadFuture {
            async { Err(LoadError::Unavailable("no converter".into())) }.boxed()
        }
    }

    struct PanickingConverter;

    impl HtmlConverter for PanickingConverter {
        fn convert(&self, _html: &str) -> String {
            panic!("converter exploded")
        }
    }

    struct PanickingLoader;

    impl ConverterLoader for PanickingLoader {
        fn load(&self) -> LoadFuture {
            async { Ok(Arc::new(PanickingConverter) as Arc<dyn HtmlConverter>) }.boxed()
        }
    }

    #[tokio::test]
    async fn loads_once_and_reuses() {
        let lazy = LazyConverter::default();
        assert!(!lazy.is_loaded());

        let first = lazy.convert("<p>one</p>").await.expect("conversion succeeds");
        let second = lazy.convert("<p>two</p>").await.expect("conversion succeeds");

        assert_eq!(first, "one");
        assert_eq!(second, "two");
        assert!(lazy.is_loaded());
        assert_eq!(lazy.load_count(), 1);
    }

    #[tokio::test]
    async fn load_failure_is_a_load_error() {
        let lazy = LazyConverter::new(FailingLoader);
        let err = lazy.convert("<p>x</p>").await.expect_err("load fails");

        assert!(err.is_load_error());
        assert!(!lazy.is_loaded());
    }

    #[tokio::test]
    async fn conversion_panic_is_a_conversion_error() {
        let lazy = LazyConverter::new(PanickingLoader);
        let err = lazy.convert("<p>x</p>").await.expect_err("conversion fails");

        assert!(matches!(err, ConvertError::Conversion(_)));
    }
}

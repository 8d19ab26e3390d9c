use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::FutureExt;
use futures::future::join_all;
use markdown_bridge::runtime::{ConverterLoader, HtmlConverter, LazyConverter, LoadFuture};
use markdown_bridge::{ConversionOptions, LoadError, MarkdownConverter, convert_html_to_markdown};
use tracing_subscriber::EnvFilter;

fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Loader that counts invocations and takes a while to finish
struct SlowCountingLoader {
    calls: Arc<AtomicUsize>,
}

impl ConverterLoader for SlowCountingLoader {
    fn load(&self) -> LoadFuture {
        let calls = Arc::clone(&self.calls);
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            let converter: Arc<dyn HtmlConverter> =
                Arc::new(MarkdownConverter::new(ConversionOptions::default()));
            Ok(converter)
        }
        .boxed()
    }
}

/// Fails the first attempt, succeeds afterwards
struct FlakyLoader {
    calls: Arc<AtomicUsize>,
}

impl ConverterLoader for FlakyLoader {
    fn load(&self) -> LoadFuture {
        let attempt = self.calls.fetch_add(1, Ordering::SeqCst);
        async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            if attempt == 0 {
                return Err(LoadError::Unavailable("module not reachable".into()));
            }
            let converter: Arc<dyn HtmlConverter> = Arc::new(MarkdownConverter::default());
            Ok(converter)
        }
        .boxed()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_calls_share_one_load() {
    init_test_logging();
    let calls = Arc::new(AtomicUsize::new(0));
    let converter = Arc::new(LazyConverter::new(SlowCountingLoader {
        calls: Arc::clone(&calls),
    }));

    let tasks = (0..16).map(|i| {
        let converter = Arc::clone(&converter);
        tokio::spawn(async move { converter.convert(&format!("<p>call {i}</p>")).await })
    });
    let results = join_all(tasks).await;

    for (i, result) in results.into_iter().enumerate() {
        let markdown = result.expect("task joined").expect("conversion succeeded");
        assert_eq!(markdown, format!("call {i}"));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(converter.load_count(), 1);
    assert!(converter.is_loaded());

    converter.convert("<p>later</p>").await.expect("cached converter");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn concurrent_waiters_all_see_the_load_error() {
    init_test_logging();
    let calls = Arc::new(AtomicUsize::new(0));
    let converter = LazyConverter::new(FlakyLoader {
        calls: Arc::clone(&calls),
    });

    let (a, b) = tokio::join!(converter.convert("<p>a</p>"), converter.convert("<p>b</p>"));
    for result in [a, b] {
        let err = result.expect_err("load fails on first attempt");
        assert!(err.is_load_error(), "expected a load error, got {err}");
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!converter.is_loaded());
}

#[tokio::test]
async fn failed_load_is_retried_by_a_later_call() {
    let calls = Arc::new(AtomicUsize::new(0));
    let converter = LazyConverter::new(FlakyLoader {
        calls: Arc::clone(&calls),
    });

    assert!(converter.convert("<p>x</p>").await.is_err());
    let markdown = converter
        .convert("<h2>Retry</h2>")
        .await
        .expect("second load succeeds");
    assert_eq!(markdown, "## Retry");
    assert_eq!(converter.load_count(), 2);
}

#[tokio::test]
async fn default_facade_converts() {
    let markdown = convert_html_to_markdown("<h1>Title</h1><p>Hello <strong>world</strong></p>")
        .await
        .expect("builtin converter loads");
    assert_eq!(markdown, "# Title\n\nHello **world**");
}

#[tokio::test]
async fn with_options_applies_options() {
    let converter = LazyConverter::with_options(ConversionOptions::minimal());
    let markdown = converter
        .convert(r#"<p><a href="https://example.com">site</a></p>"#)
        .await
        .expect("conversion succeeds");
    assert_eq!(markdown, "site");
}

//! End-to-end pipeline tests.
//!
//! Most scenarios run the real `Converter` with an in-memory fetcher and
//! decoder. The `http_*` tests drive the real `HttpFetcher` against a local
//! wiremock server; none of them need network access or a pdfium library.
//! Tests that decode real PDFs live in `tests/pdfium.rs`.

use async_trait::async_trait;
use doc2md::pipeline::extract::DEGRADED_PLACEHOLDER;
use doc2md::{
    convert, convert_sync, convert_to_file, ByteFetcher, ConversionConfig, ConversionError,
    ConversionObserver, ConversionRequest, Converter, Doc2MdError, FileType, HttpFetcher,
    PdfDecoder,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("doc2md=debug"))
        .with_test_writer()
        .try_init();
}

// ── Test doubles ─────────────────────────────────────────────────────────

/// Serves a fixed body (or a fixed failure) and remembers every URL asked for.
struct StubFetcher {
    body: Result<Vec<u8>, ()>,
    requested: Mutex<Vec<String>>,
}

impl StubFetcher {
    fn ok(body: &str) -> Arc<Self> {
        Arc::new(Self {
            body: Ok(body.as_bytes().to_vec()),
            requested: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            body: Err(()),
            requested: Mutex::new(Vec::new()),
        })
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl ByteFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, Doc2MdError> {
        self.requested.lock().unwrap().push(url.to_string());
        self.body.clone().map_err(|_| Doc2MdError::DownloadFailed {
            url: url.to_string(),
            reason: "connection reset by peer".into(),
        })
    }
}

/// Treats the fetched bytes as the document's text.
struct Utf8Decoder;

#[async_trait]
impl PdfDecoder for Utf8Decoder {
    async fn decode(&self, bytes: Vec<u8>) -> Result<String, Doc2MdError> {
        String::from_utf8(bytes).map_err(|e| Doc2MdError::Internal(e.to_string()))
    }
}

struct BrokenDecoder;

#[async_trait]
impl PdfDecoder for BrokenDecoder {
    async fn decode(&self, _bytes: Vec<u8>) -> Result<String, Doc2MdError> {
        Err(Doc2MdError::Internal("trailer not found".into()))
    }
}

#[derive(Default)]
struct CollectingObserver {
    errors: Mutex<Vec<ConversionError>>,
}

impl ConversionObserver for CollectingObserver {
    fn on_conversion_error(&self, error: &ConversionError) {
        self.errors.lock().unwrap().push(error.clone());
    }
}

fn converter(fetcher: Arc<StubFetcher>) -> Converter {
    Converter::with_components(ConversionConfig::default(), fetcher, Arc::new(Utf8Decoder))
}

// ── Scenarios ────────────────────────────────────────────────────────────

#[tokio::test]
async fn scenario_a_plain_pdf() {
    init_tracing();
    let fetcher = StubFetcher::ok("HELLO\n\nThis is body text.");
    let result = converter(fetcher.clone())
        .convert(&ConversionRequest::new("https://example.com/doc.pdf"))
        .await
        .unwrap();

    assert_eq!(result.file_type, FileType::Pdf);
    assert_eq!(result.markdown, "## HELLO\n\nThis is body text.");
    assert!(result.conversion_errors.is_empty());
    assert_eq!(fetcher.requested(), vec!["https://example.com/doc.pdf"]);
}

#[tokio::test]
async fn scenario_b_google_doc_fetches_export_url() {
    let fetcher = StubFetcher::ok("HELLO\n\nThis is body text.");
    let result = converter(fetcher.clone())
        .convert(&ConversionRequest::new(
            "https://docs.google.com/document/d/ABC123/edit",
        ))
        .await
        .unwrap();

    assert_eq!(result.file_type, FileType::GoogleDoc);
    assert_eq!(result.markdown, "## HELLO\n\nThis is body text.");
    assert_eq!(
        fetcher.requested(),
        vec!["https://docs.google.com/document/d/ABC123/export?format=pdf"]
    );
}

#[tokio::test]
async fn google_slides_fetch_presentation_export() {
    let fetcher = StubFetcher::ok("Agenda");
    let result = converter(fetcher.clone())
        .convert(&ConversionRequest::new(
            "https://docs.google.com/presentation/d/1x-Y_z/edit#slide=id.p",
        ))
        .await
        .unwrap();

    assert_eq!(result.file_type, FileType::GoogleSlide);
    assert_eq!(
        fetcher.requested(),
        vec!["https://docs.google.com/presentation/d/1x-Y_z/export/pdf"]
    );
}

#[tokio::test]
async fn scenario_c_unknown_extension_is_rejected_without_fetching() {
    let fetcher = StubFetcher::ok("never read");
    let err = converter(fetcher.clone())
        .convert(&ConversionRequest::new("https://example.com/file.xyz"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "unsupported file type: unknown");
    assert!(err.is_client_error());
    assert!(fetcher.requested().is_empty());
}

#[tokio::test]
async fn scenario_d_fetch_failure_returns_no_markdown() {
    let fetcher = StubFetcher::failing();
    let err = converter(fetcher)
        .convert(&ConversionRequest::new("https://example.com/doc.pdf"))
        .await
        .unwrap_err();

    assert!(matches!(err, Doc2MdError::DownloadFailed { .. }));
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn google_link_without_document_id_is_rejected_before_fetch() {
    let fetcher = StubFetcher::ok("");
    let err = converter(fetcher.clone())
        .convert(&ConversionRequest::new(
            "https://docs.google.com/document/u/0/",
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, Doc2MdError::InvalidSourceUrl { .. }));
    assert!(fetcher.requested().is_empty());
}

#[tokio::test]
async fn figure_markers_are_reported_once() {
    let observer = Arc::new(CollectingObserver::default());
    let config = ConversionConfig::builder()
        .observer(observer.clone())
        .build()
        .unwrap();
    let fetcher = StubFetcher::ok("RESULTS\n\nSee Figure 2 and Table 1.\n\n図3 は省略");
    let converter = Converter::with_components(config, fetcher, Arc::new(Utf8Decoder));

    let result = converter
        .convert(&ConversionRequest::new("https://example.com/paper.pdf"))
        .await
        .unwrap();

    assert_eq!(
        result.conversion_errors,
        vec![ConversionError::new("図表", "may not convert accurately")]
    );
    assert_eq!(*observer.errors.lock().unwrap(), result.conversion_errors);
}

#[tokio::test]
async fn custom_markers_replace_defaults() {
    let config = ConversionConfig::builder()
        .figure_table_markers(["Abbildung"])
        .build()
        .unwrap();
    let converter = Converter::with_components(
        config,
        StubFetcher::ok("See Table 1.\n\nAbbildung 4"),
        Arc::new(Utf8Decoder),
    );

    let result = converter
        .convert(&ConversionRequest::new("https://example.com/a.pdf"))
        .await
        .unwrap();
    assert_eq!(result.conversion_errors.len(), 1);
}

#[tokio::test]
async fn undecodable_pdf_degrades_to_placeholder() {
    let converter = Converter::with_components(
        ConversionConfig::default(),
        StubFetcher::ok("Table of garbage"),
        Arc::new(BrokenDecoder),
    );

    let result = converter
        .convert(&ConversionRequest::new("https://example.com/broken.pdf"))
        .await
        .unwrap();

    assert_eq!(result.markdown, DEGRADED_PLACEHOLDER);
    assert_eq!(
        result.conversion_errors,
        vec![ConversionError::new("PDF解析相当", "document parse failure")]
    );
}

#[tokio::test]
async fn markdown_source_is_returned_verbatim() {
    let src = "# Title\n\nSHOUTING PARAGRAPH\n\nSee Figure 1.\n";
    let result = converter(StubFetcher::ok(src))
        .convert(&ConversionRequest::new("https://example.com/README.md"))
        .await
        .unwrap();

    assert_eq!(result.file_type, FileType::Markdown);
    assert_eq!(result.markdown, src);
    assert!(result.is_clean());
}

#[test]
fn converter_runs_under_tokio_test_block_on() {
    let fetcher = StubFetcher::ok("1. Introduction\n\nbody");
    let result = tokio_test::block_on(
        converter(fetcher).convert(&ConversionRequest::new("https://example.com/x.PDF")),
    )
    .unwrap();
    assert_eq!(result.markdown, "## 1. Introduction\n\nbody");
}

#[test]
fn convert_sync_rejects_bad_input_without_network() {
    let config = ConversionConfig::default();
    assert!(matches!(
        convert_sync("", &config),
        Err(Doc2MdError::MissingInput)
    ));
    assert!(matches!(
        convert_sync("https://example.com/sheet.xlsx", &config),
        Err(Doc2MdError::UnsupportedType {
            file_type: FileType::Excel
        })
    ));
}

// ── HttpFetcher against wiremock ─────────────────────────────────────────

#[tokio::test]
async fn http_fetcher_returns_body_and_sends_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doc.pdf"))
        .and(header("user-agent", "viewer-test/2.0"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.7 fake".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let config = ConversionConfig::builder()
        .user_agent("viewer-test/2.0")
        .build()
        .unwrap();
    let fetcher = HttpFetcher::new(&config).unwrap();
    let bytes = fetcher
        .fetch(&format!("{}/doc.pdf", server.uri()))
        .await
        .unwrap();

    assert_eq!(bytes, b"%PDF-1.7 fake");
}

#[tokio::test]
async fn http_fetcher_maps_error_status_to_download_failed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(&ConversionConfig::default()).unwrap();
    let err = fetcher
        .fetch(&format!("{}/missing.pdf", server.uri()))
        .await
        .unwrap_err();

    match err {
        Doc2MdError::DownloadFailed { reason, .. } => assert!(reason.contains("404"), "{reason}"),
        other => panic!("expected DownloadFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn http_fetcher_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow.pdf"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let config = ConversionConfig::builder()
        .download_timeout_secs(1)
        .build()
        .unwrap();
    let fetcher = HttpFetcher::new(&config).unwrap();
    let err = fetcher
        .fetch(&format!("{}/slow.pdf", server.uri()))
        .await
        .unwrap_err();

    assert!(
        matches!(err, Doc2MdError::DownloadTimeout { secs: 1, .. }),
        "{err:?}"
    );
}

#[tokio::test]
async fn http_markdown_end_to_end() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notes.md"))
        .respond_with(ResponseTemplate::new(200).set_body_string("# Notes\n\n- one\n"))
        .mount(&server)
        .await;

    let result = convert(
        format!("{}/notes.md", server.uri()),
        &ConversionConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(result.file_type, FileType::Markdown);
    assert_eq!(result.markdown, "# Notes\n\n- one\n");
}

#[tokio::test]
async fn http_pdf_with_unbindable_engine_fails_the_conversion() {
    // No other test in this binary binds pdfium, so the bad path is tried.
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doc.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4\n".to_vec()))
        .mount(&server)
        .await;

    let config = ConversionConfig::builder()
        .pdfium_lib_path("/nonexistent/libpdfium.so")
        .build()
        .unwrap();
    let err = convert(format!("{}/doc.pdf", server.uri()), &config)
        .await
        .unwrap_err();

    assert!(matches!(err, Doc2MdError::PdfiumBindingFailed(_)), "{err:?}");
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn http_convert_to_file_writes_markdown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/guide.markdown"))
        .respond_with(ResponseTemplate::new(200).set_body_string("## Guide"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out/guide.md");
    let result = convert_to_file(
        format!("{}/guide.markdown", server.uri()),
        &out,
        &ConversionConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(std::fs::read_to_string(&out).unwrap(), result.markdown);
    assert_eq!(result.markdown, "## Guide");
}

#[tokio::test]
async fn http_server_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky.pdf"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let err = convert(
        format!("{}/flaky.pdf", server.uri()),
        &ConversionConfig::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Doc2MdError::DownloadFailed { .. }));
}

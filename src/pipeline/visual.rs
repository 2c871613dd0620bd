//! Poster generation: submit a prompt to the image queue, wait, download,
//! persist.
//!
//! Two seams keep the network out of the core flow:
//!
//! * [`ImageGenerator`] — submit a request and wait for the terminal result.
//!   [`FalQueueClient`] implements it against the fal.ai queue REST API
//!   (submit → poll status with logs → fetch result).
//! * [`AssetFetcher`] — download the bytes behind an image URL.
//!   [`HttpFetcher`] implements it with `reqwest`.
//!
//! [`create_visual`] ties them together: empty result list →
//! [`JobAdError::NoImageProduced`] (no download attempted); non-success
//! download → [`JobAdError::ImageDownload`]; otherwise the bytes are written
//! to `output_dir/job_ad_visual_{YYYYmmdd_HHMMSS}.{ext}`. Two runs finishing
//! in the same second overwrite each other.

use crate::config::GenerationConfig;
use crate::error::JobAdError;
use crate::output::VisualAsset;
use crate::progress::PipelineProgressCallback;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// File name assumed when the service omits one.
pub const DEFAULT_IMAGE_FILE_NAME: &str = "image.webp";

/// Prefix of persisted poster files.
pub const VISUAL_FILE_PREFIX: &str = "job_ad_visual";

/// Arguments sent to the image model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRequest {
    pub prompt: String,
    pub image_size: String,
    pub style: String,
    /// Explicit palette; always empty (let the model choose).
    pub colors: Vec<String>,
}

impl ImageRequest {
    pub fn new(prompt: impl Into<String>, config: &GenerationConfig) -> Self {
        Self {
            prompt: prompt.into(),
            image_size: config.image_size.clone(),
            style: config.image_style.clone(),
            colors: Vec::new(),
        }
    }
}

/// One generated image as described by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub url: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
}

impl ImageDescriptor {
    /// Extension derived from the suggested file name: the text after the
    /// last `.`, or the whole name if it has none.
    pub fn extension(&self) -> String {
        let name = self
            .file_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_IMAGE_FILE_NAME);
        name.rsplit('.').next().unwrap_or(name).to_string()
    }
}

/// Terminal result of a generation job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    #[serde(default)]
    pub images: Vec<ImageDescriptor>,
}

/// Submit-and-wait image generation.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Submit `request` and wait for the job to finish. Progress log lines
    /// may be reported to `progress` while waiting.
    async fn generate(
        &self,
        request: &ImageRequest,
        progress: Option<&dyn PipelineProgressCallback>,
    ) -> Result<GenerationResult, JobAdError>;
}

/// Fetch the bytes behind a URL.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, JobAdError>;
}

// ── Orchestration ────────────────────────────────────────────────────────

/// Generate, download and persist a poster for `title`/`summary`.
pub async fn create_visual(
    generator: &dyn ImageGenerator,
    fetcher: &dyn AssetFetcher,
    title: &str,
    summary: &str,
    config: &GenerationConfig,
) -> Result<VisualAsset, JobAdError> {
    let prompt = crate::prompts::poster_prompt(title, summary);
    let request = ImageRequest::new(prompt, config);

    let result = generator
        .generate(&request, config.progress_callback.as_deref())
        .await?;

    let image = result
        .images
        .into_iter()
        .next()
        .ok_or(JobAdError::NoImageProduced)?;
    let extension = image.extension();

    info!("Downloading generated image from {}", image.url);
    let bytes = fetcher.fetch(&image.url).await?;

    let path = visual_path(&config.output_dir, &timestamp_now(), &extension);
    persist(&path, &bytes).await?;
    info!("Saved {} bytes to {}", bytes.len(), path.display());

    Ok(VisualAsset {
        bytes,
        extension,
        path,
    })
}

/// `dir/job_ad_visual_{timestamp}.{extension}`.
pub fn visual_path(dir: &Path, timestamp: &str, extension: &str) -> PathBuf {
    dir.join(format!("{VISUAL_FILE_PREFIX}_{timestamp}.{extension}"))
}

/// Local wall-clock time at second granularity, `YYYYmmdd_HHMMSS`.
pub fn timestamp_now() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

async fn persist(path: &Path, bytes: &[u8]) -> Result<(), JobAdError> {
    let write_err = |source| JobAdError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }
    tokio::fs::write(path, bytes).await.map_err(write_err)
}

// ── fal.ai queue client ──────────────────────────────────────────────────

/// Response to a queue submission.
#[derive(Debug, Clone, Deserialize)]
struct QueueSubmission {
    request_id: String,
    #[serde(default)]
    status_url: Option<String>,
    #[serde(default)]
    response_url: Option<String>,
}

/// One status poll.
#[derive(Debug, Clone, Deserialize)]
struct QueueStatus {
    status: String,
    #[serde(default)]
    logs: Option<Vec<QueueLog>>,
    #[serde(default)]
    queue_position: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
struct QueueLog {
    message: String,
}

/// Client for the fal.ai queue API.
///
/// `POST {base}/{model}` submits; `GET .../requests/{id}/status?logs=1` is
/// polled until `COMPLETED`; `GET .../requests/{id}` returns the result.
pub struct FalQueueClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    poll_interval: Duration,
}

impl FalQueueClient {
    pub fn new(api_key: impl Into<String>, config: &GenerationConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.fal_queue_url.trim_end_matches('/').to_string(),
            model: config.image_model.trim_matches('/').to_string(),
            api_key: api_key.into(),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        }
    }

    /// Build a client from config, falling back to the `FAL_KEY` env var.
    pub fn from_config(config: &GenerationConfig) -> Result<Self, JobAdError> {
        let key = config
            .fal_key
            .clone()
            .or_else(|| std::env::var("FAL_KEY").ok())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| JobAdError::ImageServiceNotConfigured {
                hint: "Set FAL_KEY or pass --fal-key.".to_string(),
            })?;
        Ok(Self::new(key, config))
    }

    fn submit_url(&self) -> String {
        format!("{}/{}", self.base_url, self.model)
    }

    fn request_url(&self, request_id: &str) -> String {
        format!("{}/{}/requests/{}", self.base_url, self.model, request_id)
    }

    async fn submit(&self, request: &ImageRequest) -> Result<QueueSubmission, JobAdError> {
        let resp = self
            .client
            .post(self.submit_url())
            .header("Authorization", format!("Key {}", self.api_key))
            .json(request)
            .send()
            .await
            .map_err(transport_err)?;
        read_json(resp).await
    }

    async fn status(&self, status_url: &str) -> Result<QueueStatus, JobAdError> {
        let resp = self
            .client
            .get(status_url)
            .query(&[("logs", "1")])
            .header("Authorization", format!("Key {}", self.api_key))
            .send()
            .await
            .map_err(transport_err)?;
        read_json(resp).await
    }

    async fn result(&self, response_url: &str) -> Result<GenerationResult, JobAdError> {
        let resp = self
            .client
            .get(response_url)
            .header("Authorization", format!("Key {}", self.api_key))
            .send()
            .await
            .map_err(transport_err)?;
        read_json(resp).await
    }
}

#[async_trait]
impl ImageGenerator for FalQueueClient {
    async fn generate(
        &self,
        request: &ImageRequest,
        progress: Option<&dyn PipelineProgressCallback>,
    ) -> Result<GenerationResult, JobAdError> {
        let submission = self.submit(request).await?;
        info!(request_id = %submission.request_id, "Image job queued on {}", self.model);

        let status_url = submission
            .status_url
            .clone()
            .unwrap_or_else(|| format!("{}/status", self.request_url(&submission.request_id)));
        let response_url = submission
            .response_url
            .clone()
            .unwrap_or_else(|| self.request_url(&submission.request_id));

        // The status endpoint returns the full log so far on every poll.
        let mut logs_seen = 0usize;
        loop {
            let status = self.status(&status_url).await?;

            let logs = status.logs.unwrap_or_default();
            for log in logs.iter().skip(logs_seen) {
                debug!("image job: {}", log.message);
                if let Some(cb) = progress {
                    cb.on_generation_log(&log.message);
                }
            }
            logs_seen = logs_seen.max(logs.len());

            match status.status.as_str() {
                "COMPLETED" => break,
                "IN_QUEUE" | "IN_PROGRESS" => {
                    debug!(
                        status = %status.status,
                        queue_position = ?status.queue_position,
                        "Image job still running"
                    );
                    tokio::time::sleep(self.poll_interval).await;
                }
                other => {
                    return Err(JobAdError::ImageJobFailed {
                        status: other.to_string(),
                    })
                }
            }
        }

        self.result(&response_url).await
    }
}

fn transport_err(e: reqwest::Error) -> JobAdError {
    JobAdError::ImageTransport {
        reason: e.to_string(),
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T, JobAdError> {
    let status = resp.status();
    let body = resp.text().await.map_err(transport_err)?;
    if !status.is_success() {
        return Err(JobAdError::ImageServiceRejected {
            status: status.as_u16(),
            message: body,
        });
    }
    serde_json::from_str(&body).map_err(|e| JobAdError::MalformedImageResponse {
        detail: e.to_string(),
    })
}

// ── HTTP asset download ──────────────────────────────────────────────────

/// [`AssetFetcher`] over plain HTTP(S).
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssetFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, JobAdError> {
        let download_err = |reason: String| JobAdError::ImageDownload {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| download_err(e.to_string()))?;

        if !response.status().is_success() {
            return Err(download_err(format!("HTTP {}", response.status())));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| download_err(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct FixedGenerator {
        result: GenerationResult,
        requests: Mutex<Vec<ImageRequest>>,
    }

    #[async_trait]
    impl ImageGenerator for FixedGenerator {
        async fn generate(
            &self,
            request: &ImageRequest,
            _progress: Option<&dyn PipelineProgressCallback>,
        ) -> Result<GenerationResult, JobAdError> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(self.result.clone())
        }
    }

    struct CountingFetcher {
        payload: Vec<u8>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AssetFetcher for CountingFetcher {
        async fn fetch(&self, _url: &str) -> Result<Vec<u8>, JobAdError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.payload.clone())
        }
    }

    fn descriptor(file_name: Option<&str>) -> ImageDescriptor {
        ImageDescriptor {
            url: "https://v3.fal.media/files/lion/abc_image.webp".into(),
            file_name: file_name.map(str::to_string),
            content_type: None,
            file_size: None,
        }
    }

    #[test]
    fn extension_from_file_name() {
        assert_eq!(descriptor(Some("image.webp")).extension(), "webp");
        assert_eq!(descriptor(Some("poster.final.PNG")).extension(), "PNG");
        assert_eq!(descriptor(Some("noext")).extension(), "noext");
        assert_eq!(descriptor(None).extension(), "webp");
        assert_eq!(descriptor(Some("")).extension(), "webp");
    }

    #[test]
    fn visual_path_embeds_timestamp() {
        let p = visual_path(Path::new("out"), "20250101_120000", "webp");
        assert_eq!(p, PathBuf::from("out/job_ad_visual_20250101_120000.webp"));
    }

    #[test]
    fn timestamp_has_second_granularity() {
        let ts = timestamp_now();
        assert_eq!(ts.len(), 15);
        assert_eq!(&ts[8..9], "_");
        assert!(ts.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn request_uses_configured_poster_settings() {
        let config = GenerationConfig::default();
        let req = ImageRequest::new("a poster", &config);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["image_size"], "square_hd");
        assert_eq!(json["style"], "realistic_image");
        assert_eq!(json["colors"], serde_json::json!([]));
    }

    #[test]
    fn result_deserialises_service_shape() {
        let body = r#"{"images":[{"url":"https://x/y.webp","file_name":"image.webp","file_size":280156,"content_type":"image/webp"}]}"#;
        let result: GenerationResult = serde_json::from_str(body).unwrap();
        assert_eq!(result.images.len(), 1);
        assert_eq!(result.images[0].file_size, Some(280156));

        let empty: GenerationResult = serde_json::from_str("{}").unwrap();
        assert!(empty.images.is_empty());
    }

    #[tokio::test]
    async fn create_visual_persists_downloaded_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let config = GenerationConfig::builder()
            .output_dir(dir.path())
            .build()
            .unwrap();
        let generator = FixedGenerator {
            result: GenerationResult {
                images: vec![descriptor(Some("image.webp"))],
            },
            requests: Mutex::new(Vec::new()),
        };
        let fetcher = CountingFetcher {
            payload: b"fake_image_data".to_vec(),
            calls: AtomicUsize::new(0),
        };

        let asset = create_visual(&generator, &fetcher, "Senior Data Analyst", "Analyse data.", &config)
            .await
            .unwrap();

        assert_eq!(asset.extension, "webp");
        assert!(asset.path.to_string_lossy().ends_with(".webp"));
        assert!(asset.path.starts_with(dir.path()));
        assert_eq!(std::fs::read(&asset.path).unwrap(), b"fake_image_data");
        assert_eq!(asset.bytes, b"fake_image_data");

        let requests = generator.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].prompt.contains("Senior Data Analyst"));
        assert!(requests[0].colors.is_empty());
    }

    #[tokio::test]
    async fn empty_image_list_fails_without_download() {
        let dir = tempfile::tempdir().unwrap();
        let config = GenerationConfig::builder()
            .output_dir(dir.path())
            .build()
            .unwrap();
        let generator = FixedGenerator {
            result: GenerationResult::default(),
            requests: Mutex::new(Vec::new()),
        };
        let fetcher = CountingFetcher {
            payload: Vec::new(),
            calls: AtomicUsize::new(0),
        };

        let err = create_visual(&generator, &fetcher, "T", "S", &config)
            .await
            .unwrap_err();

        assert!(matches!(err, JobAdError::NoImageProduced));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn from_config_prefers_explicit_key() {
        let config = GenerationConfig::builder()
            .fal_key("k-123")
            .image_model("/fal-ai/recraft-v3/")
            .fal_queue_url("https://queue.example/")
            .build()
            .unwrap();
        let client = FalQueueClient::from_config(&config).unwrap();
        assert_eq!(client.api_key, "k-123");
        assert_eq!(client.submit_url(), "https://queue.example/fal-ai/recraft-v3");
        assert_eq!(
            client.request_url("req-1"),
            "https://queue.example/fal-ai/recraft-v3/requests/req-1"
        );
    }

    // ── Queue client against a local HTTP stub ───────────────────────────

    /// Serve `responses` in order, one per connection, on a local port.
    /// Returns the base URL and the request lines received.
    async fn serve(responses: Vec<(u16, &'static str)>) -> (String, Arc<Mutex<Vec<String>>>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&seen);

        tokio::spawn(async move {
            for (code, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();

                let mut request = Vec::new();
                let mut buf = [0u8; 4096];
                let header_end = loop {
                    let n = socket.read(&mut buf).await.unwrap();
                    request.extend_from_slice(&buf[..n]);
                    if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                        break pos + 4;
                    }
                    if n == 0 {
                        break request.len();
                    }
                };
                let head = String::from_utf8_lossy(&request[..header_end]).to_string();
                let content_length = head
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())?
                    })
                    .unwrap_or(0);
                while request.len() < header_end + content_length {
                    let n = socket.read(&mut buf).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }
                recorded
                    .lock()
                    .unwrap()
                    .push(head.lines().next().unwrap_or_default().to_string());

                let response = format!(
                    "HTTP/1.1 {code} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.unwrap();
            }
        });

        (base, seen)
    }

    fn queue_client(base: &str) -> FalQueueClient {
        let config = GenerationConfig::builder()
            .fal_queue_url(base)
            .image_model("fal-ai/recraft-v3")
            .poll_interval_ms(50)
            .build()
            .unwrap();
        FalQueueClient::new("k-test", &config)
    }

    fn poster_request() -> ImageRequest {
        ImageRequest::new("a poster", &GenerationConfig::default())
    }

    #[derive(Default)]
    struct LogRecorder {
        logs: Mutex<Vec<String>>,
    }

    impl PipelineProgressCallback for LogRecorder {
        fn on_generation_log(&self, message: &str) {
            self.logs.lock().unwrap().push(message.to_string());
        }
    }

    const SUBMITTED: &str = r#"{"request_id":"req-1"}"#;

    #[tokio::test]
    async fn rejected_submission_keeps_status_and_body() {
        let (base, _) = serve(vec![(401, r#"{"detail":"bad key"}"#)]).await;

        let err = queue_client(&base)
            .generate(&poster_request(), None)
            .await
            .unwrap_err();

        match err {
            JobAdError::ImageServiceRejected { status, message } => {
                assert_eq!(status, 401);
                assert!(message.contains("bad key"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn submission_without_request_id_is_malformed() {
        let (base, _) = serve(vec![(200, r#"{"queued":true}"#)]).await;

        let err = queue_client(&base)
            .generate(&poster_request(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, JobAdError::MalformedImageResponse { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn unknown_terminal_status_fails_the_job() {
        let (base, seen) = serve(vec![
            (200, SUBMITTED),
            (200, r#"{"status":"IN_QUEUE","queue_position":2}"#),
            (200, r#"{"status":"FAILED"}"#),
        ])
        .await;

        let err = queue_client(&base)
            .generate(&poster_request(), None)
            .await
            .unwrap_err();

        match err {
            JobAdError::ImageJobFailed { status } => assert_eq!(status, "FAILED"),
            other => panic!("unexpected error: {other:?}"),
        }
        let seen = seen.lock().unwrap();
        assert_eq!(seen[0], "POST /fal-ai/recraft-v3 HTTP/1.1");
        assert_eq!(
            seen[1],
            "GET /fal-ai/recraft-v3/requests/req-1/status?logs=1 HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn each_log_line_is_reported_once() {
        let (base, seen) = serve(vec![
            (200, SUBMITTED),
            (
                200,
                r#"{"status":"IN_PROGRESS","logs":[{"message":"Loading model"}]}"#,
            ),
            (
                200,
                r#"{"status":"IN_PROGRESS","logs":[{"message":"Loading model"},{"message":"Generating"}]}"#,
            ),
            (
                200,
                r#"{"status":"COMPLETED","logs":[{"message":"Loading model"},{"message":"Generating"}]}"#,
            ),
            (200, r#"{"images":[{"url":"https://cdn.example/poster.webp","file_name":"poster.webp"}]}"#),
        ])
        .await;
        let recorder = LogRecorder::default();

        let result = queue_client(&base)
            .generate(&poster_request(), Some(&recorder))
            .await
            .unwrap();

        assert_eq!(*recorder.logs.lock().unwrap(), vec!["Loading model", "Generating"]);
        assert_eq!(result.images.len(), 1);
        assert_eq!(result.images[0].extension(), "webp");
        assert_eq!(
            seen.lock().unwrap().last().unwrap(),
            "GET /fal-ai/recraft-v3/requests/req-1 HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn fetch_of_missing_asset_is_a_download_error() {
        let (base, _) = serve(vec![(404, r#"{"detail":"not found"}"#)]).await;
        let url = format!("{base}/files/poster.webp");

        let err = HttpFetcher::new().fetch(&url).await.unwrap_err();

        match err {
            JobAdError::ImageDownload { url: failed, reason } => {
                assert_eq!(failed, url);
                assert!(reason.contains("404"), "reason: {reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_returns_body_bytes() {
        let (base, _) = serve(vec![(200, "RIFFdata")]).await;

        let bytes = HttpFetcher::new().fetch(&format!("{base}/poster.webp")).await.unwrap();

        assert_eq!(bytes, b"RIFFdata");
    }
}

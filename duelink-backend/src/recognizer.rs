use crate::config::BackendConfig;
use crate::error::BackendError;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::debug;
use url::Url;

/// The original scanner samples the camera every 1.5 s.
pub const SCAN_INTERVAL: Duration = Duration::from_millis(1500);

/// What the recognition service said about one frame.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IdentifyOutcome {
    #[serde(rename = "match")]
    pub matched: bool,
    #[serde(default)]
    pub card: Option<String>,
}

/// Recognition seam; mocked in tests.
#[async_trait]
pub trait Recognize: Send + Sync {
    async fn identify(&self, image: Vec<u8>) -> Result<IdentifyOutcome, BackendError>;
}

/// `Recognize` over the hosted service's `POST /identify`.
pub struct CardRecognizer {
    http: Client,
    base: String,
}

impl CardRecognizer {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        Url::parse(&config.recognizer_url)?;
        Ok(Self {
            http: Client::new(),
            base: config.recognizer_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Recognize for CardRecognizer {
    async fn identify(&self, image: Vec<u8>) -> Result<IdentifyOutcome, BackendError> {
        let part = Part::bytes(image)
            .file_name("frame.jpg")
            .mime_str("image/jpeg")?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(format!("{}/identify", self.base))
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                status,
                context: "identify",
            });
        }
        Ok(response.json().await?)
    }
}

/// Dedupe layer over a recognizer: a frame only produces a report when the
/// recognized card name differs from the previous one, so holding a card in
/// front of the camera announces it once.
pub struct Scanner<R> {
    recognizer: R,
    last: Option<String>,
}

impl<R: Recognize> Scanner<R> {
    pub fn new(recognizer: R) -> Self {
        Self {
            recognizer,
            last: None,
        }
    }

    pub async fn scan(&mut self, frame: Vec<u8>) -> Result<Option<String>, BackendError> {
        let outcome = self.recognizer.identify(frame).await?;
        match outcome.card.filter(|_| outcome.matched) {
            Some(card) if self.last.as_deref() != Some(card.as_str()) => {
                self.last = Some(card.clone());
                Ok(Some(card))
            }
            _ => Ok(None),
        }
    }
}

/// Periodic scan loop: `capture` yields the current camera frame (or `None`
/// when the camera has nothing), newly recognized names go to `reports`.
/// Recognizer outages are logged and skipped; the loop ends when the report
/// receiver is dropped.
pub fn spawn_scan_loop<R, F>(
    recognizer: R,
    mut capture: F,
    reports: mpsc::Sender<String>,
) -> JoinHandle<()>
where
    R: Recognize + 'static,
    F: FnMut() -> Option<Vec<u8>> + Send + 'static,
{
    tokio::spawn(async move {
        let mut scanner = Scanner::new(recognizer);
        let mut ticker = interval(SCAN_INTERVAL);
        loop {
            ticker.tick().await;
            let Some(frame) = capture() else { continue };
            match scanner.scan(frame).await {
                Ok(Some(card)) => {
                    if reports.send(card).await.is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => debug!("recognizer unavailable, frame skipped: {e}"),
            }
        }
    })
}

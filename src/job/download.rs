//! # PDF Retrieval
//!
//! Fetches the source document for a print job, either by id from the print
//! service (`<base>/getPDF/<id>`) or from a literal URL.
//!
//! All requests carry a 10 second connect and read timeout; a slow or dead
//! endpoint fails the job rather than wedging the worker.

use std::time::Duration;

use crate::error::PrintError;

/// Default print-service host for id-based retrieval.
pub const DEFAULT_SERVICE_BASE: &str = "https://pos.therestsuites.com";

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Blocking PDF fetcher.
#[derive(Debug)]
pub struct PdfDownloader {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl PdfDownloader {
    /// Build a downloader against the given service base URL.
    pub fn new(base_url: &str) -> Result<Self, PrintError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("puente/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(HTTP_TIMEOUT)
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| PrintError::Download(format!("HTTP client error: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch a PDF by its service token.
    pub fn fetch_document(&self, pdf_id: &str) -> Result<Vec<u8>, PrintError> {
        self.fetch_url(&format!("{}/getPDF/{pdf_id}", self.base_url))
    }

    /// Fetch a PDF from a literal URL.
    ///
    /// Non-2xx responses and empty bodies are fatal for the job.
    pub fn fetch_url(&self, url: &str) -> Result<Vec<u8>, PrintError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| PrintError::Download(format!("Failed to download PDF: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PrintError::Download(format!(
                "Failed to download PDF ({})",
                status.as_u16()
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| PrintError::Download(format!("Failed to read PDF body: {e}")))?;
        if bytes.is_empty() {
            return Err(PrintError::Download("Empty PDF response body".to_string()));
        }
        Ok(bytes.to_vec())
    }
}

// ============================================================================
// TESTS
// ============================================================================

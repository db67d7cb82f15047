//! Configuration for the upload client.
//!
//! All client behaviour is controlled through [`ClientConfig`], built via its
//! [`ClientConfigBuilder`]. The builder sets only what the caller cares about
//! and relies on documented defaults for the rest.

use crate::error::UploadError;
use crate::model::ModelId;

/// Endpoint used when none is configured: the local development server.
pub const DEFAULT_ENDPOINT_URL: &str = "http://localhost:5328/api/process";

/// Suggested filename for the downloaded archive.
pub const DEFAULT_DOWNLOAD_FILENAME: &str = "results.zip";

/// Configuration for an upload session.
///
/// # Example
/// ```rust
/// use pdf2xlsx::{ClientConfig, ModelId};
///
/// let config = ClientConfig::builder()
///     .endpoint_url("https://example.com/api/process")
///     .default_model(ModelId::Gemini25Pro)
///     .request_timeout_secs(300)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Full URL of the processing endpoint. Default: [`DEFAULT_ENDPOINT_URL`].
    pub endpoint_url: String,

    /// Model selected when the controller is created. Default: `gemini-2.5-flash`.
    pub default_model: ModelId,

    /// Whole-request timeout in seconds. Default: `None`.
    ///
    /// `None` leaves the transport default in place. Extraction of a long
    /// document can take minutes, so there is no built-in cap.
    pub request_timeout_secs: Option<u64>,

    /// Filename suggested for the downloaded archive. Default: `results.zip`.
    pub download_filename: String,

    /// `User-Agent` header sent with each request.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            default_model: ModelId::DEFAULT,
            request_timeout_secs: None,
            download_filename: DEFAULT_DOWNLOAD_FILENAME.to_string(),
            user_agent: concat!("pdf2xlsx/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint_url = url.into();
        self
    }

    pub fn default_model(mut self, model: ModelId) -> Self {
        self.config.default_model = model;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs.max(1));
        self
    }

    pub fn download_filename(mut self, name: impl Into<String>) -> Self {
        self.config.download_filename = name.into();
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, UploadError> {
        let c = &self.config;
        let url = reqwest::Url::parse(&c.endpoint_url).map_err(|e| {
            UploadError::InvalidConfig(format!("endpoint URL '{}': {e}", c.endpoint_url))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UploadError::InvalidConfig(format!(
                "endpoint URL must be http or https, got '{}'",
                url.scheme()
            )));
        }
        let name = c.download_filename.trim();
        if name.is_empty() || name.contains('/') || name.contains('\\') {
            return Err(UploadError::InvalidConfig(format!(
                "download filename must be a bare file name, got '{}'",
                c.download_filename
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ClientConfig::default();
        assert_eq!(c.endpoint_url, "http://localhost:5328/api/process");
        assert_eq!(c.default_model, ModelId::Gemini25Flash);
        assert_eq!(c.request_timeout_secs, None);
        assert_eq!(c.download_filename, "results.zip");
        assert!(c.user_agent.starts_with("pdf2xlsx/"));
    }

    #[test]
    fn builder_sets_fields() {
        let c = ClientConfig::builder()
            .endpoint_url("https://convert.example.com/api/process")
            .default_model(ModelId::Gemini3Pro)
            .request_timeout_secs(0)
            .download_filename("out.zip")
            .build()
            .unwrap();
        assert_eq!(c.default_model, ModelId::Gemini3Pro);
        // zero is clamped so the client never gets an instant timeout
        assert_eq!(c.request_timeout_secs, Some(1));
        assert_eq!(c.download_filename, "out.zip");
    }

    #[test]
    fn rejects_non_http_scheme() {
        let err = ClientConfig::builder()
            .endpoint_url("ftp://example.com/api")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("http or https"), "got: {err}");
    }

    #[test]
    fn rejects_unparsable_url() {
        assert!(ClientConfig::builder()
            .endpoint_url("not a url")
            .build()
            .is_err());
    }

    #[test]
    fn rejects_path_like_download_name() {
        assert!(ClientConfig::builder()
            .download_filename("../results.zip")
            .build()
            .is_err());
        assert!(ClientConfig::builder()
            .download_filename("  ")
            .build()
            .is_err());
    }
}

//! The processing endpoint: one multipart POST per submission.
//!
//! [`ProcessingEndpoint`] is the seam between the controller and the
//! network. An implementation only reports what came back — status,
//! content type, body — or a transport failure. Deciding whether a reply is
//! an archive or an error payload is the controller's job, so a simulated
//! endpoint exercises exactly the same interpretation code as the real one.

use crate::config::ClientConfig;
use crate::error::UploadError;
use crate::model::ModelId;
use crate::pipeline::input::UploadFile;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Multipart field carrying the PDF.
pub const FILE_FIELD: &str = "file";

/// Multipart field carrying the model identifier.
pub const MODEL_FIELD: &str = "model";

/// What the endpoint sent back.
#[derive(Debug, Clone)]
pub struct EndpointReply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl EndpointReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can turn a PDF plus a model identifier into a reply.
#[async_trait]
pub trait ProcessingEndpoint: Send + Sync {
    async fn process(
        &self,
        file: &UploadFile,
        model: ModelId,
    ) -> Result<EndpointReply, UploadError>;
}

/// The production endpoint: `multipart/form-data` over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpEndpoint {
    client: reqwest::Client,
    url: reqwest::Url,
}

impl HttpEndpoint {
    /// Build a client from the config's URL, timeout and user agent.
    pub fn new(config: &ClientConfig) -> Result<Self, UploadError> {
        let url = reqwest::Url::parse(&config.endpoint_url)
            .map_err(|e| UploadError::InvalidConfig(format!("endpoint URL: {e}")))?;

        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| UploadError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &reqwest::Url {
        &self.url
    }

    fn form(file: &UploadFile, model: ModelId) -> Result<Form, UploadError> {
        let part = Part::stream_with_length(file.body(), file.len() as u64)
            .file_name(escape_filename(file.file_name()))
            .mime_str(file.media_type())
            .map_err(|e| {
                UploadError::Internal(format!("media type '{}': {e}", file.media_type()))
            })?;

        Ok(Form::new()
            .percent_encode_noop()
            .part(FILE_FIELD, part)
            .text(MODEL_FIELD, model.as_str()))
    }
}

/// Escape a filename for the quoted `filename=` parameter the way browsers
/// do: `"` and line breaks become percent escapes, everything else is sent
/// as is.
fn escape_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '"' => out.push_str("%22"),
            '\r' => out.push_str("%0D"),
            '\n' => out.push_str("%0A"),
            c => out.push(c),
        }
    }
    out
}

#[async_trait]
impl ProcessingEndpoint for HttpEndpoint {
    async fn process(
        &self,
        file: &UploadFile,
        model: ModelId,
    ) -> Result<EndpointReply, UploadError> {
        let start = Instant::now();
        info!(
            "POST {} ({}, {} bytes, model {})",
            self.url,
            file.file_name(),
            file.len(),
            model
        );

        let response = self
            .client
            .post(self.url.clone())
            .multipart(Self::form(file, model)?)
            .send()
            .await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        debug!(
            "Endpoint replied {} ({} bytes, {:?}) in {:?}",
            status,
            body.len(),
            content_type,
            start.elapsed()
        );

        Ok(EndpointReply {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range() {
        let reply = |status| EndpointReply {
            status,
            content_type: None,
            body: vec![],
        };
        assert!(reply(200).is_success());
        assert!(reply(204).is_success());
        assert!(!reply(302).is_success());
        assert!(!reply(400).is_success());
        assert!(!reply(500).is_success());
    }

    #[test]
    fn new_uses_configured_url() {
        let config = ClientConfig::builder()
            .endpoint_url("https://convert.example.com/api/process")
            .request_timeout_secs(30)
            .build()
            .unwrap();
        let endpoint = HttpEndpoint::new(&config).unwrap();
        assert_eq!(endpoint.url().as_str(), "https://convert.example.com/api/process");
    }

    #[test]
    fn filename_escaping_matches_browsers() {
        assert_eq!(escape_filename("june orders.pdf"), "june orders.pdf");
        assert_eq!(escape_filename("献立.pdf"), "献立.pdf");
        assert_eq!(escape_filename(r#"say "hi".pdf"#), "say %22hi%22.pdf");
        assert_eq!(escape_filename("a\r\nb.pdf"), "a%0D%0Ab.pdf");
    }

    #[test]
    fn form_rejects_malformed_media_type() {
        let file = UploadFile::new("a.pdf", "not a mime", b"%PDF".to_vec());
        assert!(HttpEndpoint::form(&file, ModelId::DEFAULT).is_err());
    }
}

//! Cloudflare API executor
//!
//! Sends one [`UpstreamCall`] to the Cloudflare v4 API using the
//! `X-Auth-Email` / `X-Auth-Key` header pair. No retries.

use async_trait::async_trait;
use flaregate_cloud::{
    CallBody, Credentials, FormPart, GatewayError, HttpMethod, RawResponse, Result, UpstreamCall,
    UpstreamExecutor,
};
use reqwest::multipart::{Form, Part};

pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

pub const AUTH_EMAIL_HEADER: &str = "X-Auth-Email";
pub const AUTH_KEY_HEADER: &str = "X-Auth-Key";

/// reqwest-backed executor
#[derive(Debug, Clone)]
pub struct ApiExecutor {
    client: reqwest::Client,
    base_url: String,
}

impl Default for ApiExecutor {
    fn default() -> Self {
        Self::new(CLOUDFLARE_API_BASE)
    }
}

impl ApiExecutor {
    /// Create an executor against `base_url` (no trailing slash needed)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn transport(err: reqwest::Error) -> GatewayError {
    GatewayError::Transport(err.to_string())
}

fn build_form(parts: &[FormPart]) -> Result<Form> {
    let mut form = Form::new();
    for part in parts {
        let mut body = Part::bytes(part.data.to_vec());
        if let Some(file_name) = &part.file_name {
            body = body.file_name(file_name.clone());
        }
        if let Some(content_type) = &part.content_type {
            body = body.mime_str(content_type).map_err(transport)?;
        }
        form = form.part(part.name.clone(), body);
    }
    Ok(form)
}

#[async_trait]
impl UpstreamExecutor for ApiExecutor {
    async fn execute(&self, credentials: &Credentials, call: &UpstreamCall) -> Result<RawResponse> {
        let url = self.url(&call.path);
        tracing::debug!(method = %call.method, url = %url, "Calling Cloudflare API");

        let mut request = match call.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Put => self.client.put(&url),
            HttpMethod::Delete => self.client.delete(&url),
        }
        .header(AUTH_EMAIL_HEADER, credentials.identity())
        .header(AUTH_KEY_HEADER, credentials.secret());

        if !call.query.is_empty() {
            request = request.query(&call.query);
        }

        request = match &call.body {
            CallBody::Empty => request,
            CallBody::Json(value) => request.json(value),
            CallBody::Raw {
                bytes,
                content_type,
            } => request
                .header(reqwest::header::CONTENT_TYPE, *content_type)
                .body(bytes.clone()),
            CallBody::Multipart(parts) => request.multipart(build_form(parts)?),
        };

        let response = request.send().await.map_err(transport)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport)?;

        tracing::debug!(status, "Cloudflare API responded");
        Ok(RawResponse::new(status, body))
    }
}

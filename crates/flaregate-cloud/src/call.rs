//! Upstream call model
//!
//! An [`UpstreamCall`] is built once per inbound request and handed to an
//! executor. It is never stored.

use bytes::Bytes;
use serde_json::Value;

/// HTTP method of an upstream call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Put => write!(f, "PUT"),
            HttpMethod::Delete => write!(f, "DELETE"),
        }
    }
}

/// How the body of a call is encoded on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    None,
    Json,
    RawBytes,
    Multipart,
}

/// Body of an upstream call
#[derive(Debug, Clone, PartialEq)]
pub enum CallBody {
    Empty,
    Json(Value),
    /// Sent verbatim with a fixed content-type
    Raw {
        bytes: Bytes,
        content_type: &'static str,
    },
    Multipart(Vec<FormPart>),
}

impl CallBody {
    pub fn encoding(&self) -> Encoding {
        match self {
            CallBody::Empty => Encoding::None,
            CallBody::Json(_) => Encoding::Json,
            CallBody::Raw { .. } => Encoding::RawBytes,
            CallBody::Multipart(_) => Encoding::Multipart,
        }
    }
}

/// One named part of a multipart form
#[derive(Debug, Clone, PartialEq)]
pub struct FormPart {
    pub name: String,
    pub data: Bytes,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

impl FormPart {
    /// A plain text field
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: Bytes::from(value.into()),
            file_name: None,
            content_type: None,
        }
    }

    /// A file field with its own file name and content-type
    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            file_name: Some(file_name.into()),
            content_type: Some(content_type.into()),
        }
    }
}

/// A fully formed call against the provider API
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamCall {
    pub method: HttpMethod,
    /// Path relative to the API base, always starting with `/`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: CallBody,
}

impl UpstreamCall {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: CallBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = CallBody::Json(body);
        self
    }

    pub fn with_raw(mut self, bytes: impl Into<Bytes>, content_type: &'static str) -> Self {
        self.body = CallBody::Raw {
            bytes: bytes.into(),
            content_type,
        };
        self
    }

    pub fn with_multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = CallBody::Multipart(parts);
        self
    }

    /// Add a query parameter, skipping it when the value is absent
    pub fn with_query(mut self, key: &str, value: Option<impl Into<String>>) -> Self {
        if let Some(value) = value {
            self.query.push((key.to_string(), value.into()));
        }
        self
    }

    pub fn encoding(&self) -> Encoding {
        self.body.encoding()
    }
}

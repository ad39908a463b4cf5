//! Inbound resource shapes
//!
//! These are pass-through values: beyond required fields and the DNS record
//! type check nothing is validated locally. Each one only lives long enough to
//! become the body of one upstream call.

use bytes::Bytes;
use flaregate_cloud::FormPart;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Priority sent for MX/SRV records when the caller gives none
pub const DEFAULT_PRIORITY: u16 = 10;

/// TTL of 1 means "automatic" for the provider
pub const DEFAULT_TTL: u32 = 1;

/// R2 location used when the caller gives none
pub const DEFAULT_LOCATION: &str = "auto";

pub const DEFAULT_BRANCH: &str = "main";

/// Content-type of a deployed Worker script
pub const SCRIPT_CONTENT_TYPE: &str = "application/javascript";

/// Content-type of a stored KV value
pub const KV_VALUE_CONTENT_TYPE: &str = "text/plain";

/// Name and file name of the script part in a Pages deployment upload
pub const PAGES_WORKER_PART: &str = "_worker.js";

// ========== DNS ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DnsRecordType {
    A,
    Aaaa,
    Cname,
    Mx,
    Txt,
    Ns,
    Srv,
    Caa,
    Ptr,
}

impl DnsRecordType {
    pub fn as_str(self) -> &'static str {
        match self {
            DnsRecordType::A => "A",
            DnsRecordType::Aaaa => "AAAA",
            DnsRecordType::Cname => "CNAME",
            DnsRecordType::Mx => "MX",
            DnsRecordType::Txt => "TXT",
            DnsRecordType::Ns => "NS",
            DnsRecordType::Srv => "SRV",
            DnsRecordType::Caa => "CAA",
            DnsRecordType::Ptr => "PTR",
        }
    }

    /// Only MX and SRV records carry a priority
    pub fn takes_priority(self) -> bool {
        matches!(self, DnsRecordType::Mx | DnsRecordType::Srv)
    }
}

impl std::fmt::Display for DnsRecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DnsRecordInput {
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
    pub name: String,
    pub content: String,
    #[serde(default = "default_ttl")]
    pub ttl: u32,
    #[serde(default)]
    pub proxied: bool,
    #[serde(default)]
    pub priority: Option<u16>,
}

impl DnsRecordInput {
    /// Priority to forward: the caller's (or the default) for MX/SRV, nothing
    /// for every other type even when one was supplied
    pub fn effective_priority(&self) -> Option<u16> {
        self.record_type
            .takes_priority()
            .then(|| self.priority.unwrap_or(DEFAULT_PRIORITY))
    }

    pub fn to_payload(&self) -> Value {
        let mut body = json!({
            "type": self.record_type.as_str(),
            "name": self.name,
            "content": self.content,
            "ttl": self.ttl,
            "proxied": self.proxied,
        });
        if let Some(priority) = self.effective_priority() {
            body["priority"] = json!(priority);
        }
        body
    }
}

// ========== Zones ==========

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ZoneInput {
    #[serde(alias = "domain")]
    pub name: String,
    #[serde(default = "default_true")]
    pub jump_start: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PurgeInput {
    #[serde(default)]
    pub files: Vec<String>,
}

impl PurgeInput {
    pub fn everything() -> Self {
        Self::default()
    }

    pub fn purges_everything(&self) -> bool {
        self.files.is_empty()
    }

    pub fn to_payload(&self) -> Value {
        if self.purges_everything() {
            json!({ "purge_everything": true })
        } else {
            json!({ "files": self.files })
        }
    }
}

// ========== Workers ==========

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorkerScript {
    pub name: String,
    pub script: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorkerRouteInput {
    pub pattern: String,
    pub worker_name: String,
}

impl WorkerRouteInput {
    pub fn to_payload(&self) -> Value {
        json!({ "pattern": self.pattern, "script": self.worker_name })
    }
}

// ========== Pages ==========

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PagesProjectInput {
    pub name: String,
    #[serde(default = "default_branch")]
    pub production_branch: String,
}

impl PagesProjectInput {
    pub fn to_payload(&self) -> Value {
        json!({ "name": self.name, "production_branch": self.production_branch })
    }
}

/// A single-script Pages deployment
#[derive(Debug, Clone, PartialEq)]
pub struct PagesDeploymentUpload {
    pub branch: String,
    /// Name the file had on the caller's side; never forwarded
    pub file_name: Option<String>,
    pub content: Bytes,
}

impl PagesDeploymentUpload {
    pub fn new(branch: Option<String>, file_name: Option<String>, content: impl Into<Bytes>) -> Self {
        Self {
            branch: branch
                .filter(|b| !b.trim().is_empty())
                .unwrap_or_else(default_branch),
            file_name,
            content: content.into(),
        }
    }

    /// The three upload parts: an empty manifest, the branch, and the script
    /// under a fixed name and content-type
    pub fn form_parts(&self) -> Vec<FormPart> {
        vec![
            FormPart::text("manifest", "{}"),
            FormPart::text("branch", self.branch.clone()),
            FormPart::file(
                PAGES_WORKER_PART,
                PAGES_WORKER_PART,
                SCRIPT_CONTENT_TYPE,
                self.content.clone(),
            ),
        ]
    }
}

// ========== KV ==========

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KvNamespaceInput {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KvPair {
    pub key: String,
    pub value: String,
}

// ========== R2 ==========

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BucketInput {
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
}

impl BucketInput {
    pub fn location(&self) -> &str {
        self.location
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LOCATION)
    }

    pub fn to_payload(&self) -> Value {
        json!({ "name": self.name, "locationHint": self.location() })
    }
}

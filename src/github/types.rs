// GitHub API response types.
// Defines the upstream outcome values and the records the analyzer reads.

use indexmap::IndexMap;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Successful upstream response.
#[derive(Debug, Clone)]
pub struct Success {
    pub status: u16,
    pub body: Value,
}

/// Failed upstream call.
#[derive(Debug, Clone)]
pub enum Failure {
    /// The upstream could not be reached or returned something unreadable.
    Transport { message: String },
    /// The upstream answered with a non-2xx status.
    Status {
        status: u16,
        message: String,
        headers: HeaderMap,
    },
}

impl Failure {
    pub fn transport(message: impl Into<String>) -> Self {
        Failure::Transport {
            message: message.into(),
        }
    }

    /// Upstream status code, if the upstream answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Failure::Transport { .. } => None,
            Failure::Status { status, .. } => Some(*status),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Failure::Transport { message } | Failure::Status { message, .. } => message,
        }
    }
}

/// Result of a single upstream GET.
pub type Outcome = Result<Success, Failure>;

/// The parts of a `/users/{handle}` record the analyzer needs.
#[derive(Debug, Clone, Deserialize)]
pub struct Identity {
    pub login: String,
    #[serde(default)]
    pub public_repos: u64,
    pub repos_url: String,
}

/// The parts of a repository listing entry the analyzer needs.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoRef {
    pub name: String,
    pub languages_url: String,
}

/// Bytes of code per language for one repository, in upstream order.
pub type LanguageBreakdown = IndexMap<String, u64>;

/// One entry of the top-languages list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageBytes {
    pub lang: String,
    pub bytes: u64,
}

/// Cacheable payload of the analysis endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub login: String,
    pub public_repos: u64,
    pub top_languages: Vec<LanguageBytes>,
}

//! Store configuration and backend selection.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Values shipped in sample environment files; treated the same as "not set".
pub const PLACEHOLDER_VALUES: &[&str] = &[
    "https://placeholder.supabase.co",
    "your-project-url",
    "your-anon-key",
    "placeholder",
];

/// Which backend serves all record kinds for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Remote,
    Local,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Remote => write!(f, "remote"),
            BackendKind::Local => write!(f, "local"),
        }
    }
}

/// Store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Hosted store endpoint.
    #[serde(default)]
    pub remote_url: String,

    /// Hosted store access key.
    #[serde(default)]
    pub remote_key: String,

    /// Owner tag written on remote inserts.
    #[serde(default)]
    pub owner_id: Option<String>,

    /// Directory holding the local slot files.
    #[serde(default = "default_local_dir")]
    pub local_dir: PathBuf,

    /// Remote request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Whether to listen for remote change notifications.
    #[serde(default = "default_realtime")]
    pub realtime: bool,
}

fn default_local_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_request_timeout() -> u64 {
    10
}
fn default_realtime() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            remote_url: String::new(),
            remote_key: String::new(),
            owner_id: None,
            local_dir: default_local_dir(),
            request_timeout_secs: default_request_timeout(),
            realtime: default_realtime(),
        }
    }
}

impl StoreConfig {
    /// Configuration for a local store rooted at `dir`.
    pub fn local(dir: impl Into<PathBuf>) -> Self {
        Self {
            local_dir: dir.into(),
            ..Self::default()
        }
    }

    /// Configuration for a remote store.
    pub fn remote(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            remote_url: url.into(),
            remote_key: key.into(),
            ..Self::default()
        }
    }

    /// The backend-selection flag: true only when both endpoint and key are
    /// present and neither is a known placeholder.
    pub fn remote_enabled(&self) -> bool {
        is_usable(&self.remote_url) && is_usable(&self.remote_key)
    }

    pub fn backend_kind(&self) -> BackendKind {
        if self.remote_enabled() {
            BackendKind::Remote
        } else {
            BackendKind::Local
        }
    }

    /// Owner tag, ignoring blank values.
    pub fn owner(&self) -> Option<&str> {
        self.owner_id
            .as_deref()
            .map(str::trim)
            .filter(|o| !o.is_empty())
    }
}

fn is_usable(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty()
        && !PLACEHOLDER_VALUES
            .iter()
            .any(|p| value.eq_ignore_ascii_case(p))
}

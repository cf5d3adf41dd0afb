//! Data source boundary: one read-only retrieval of every person.
//!
//! The store only sees [`DataSource::fetch_all`]. [`HttpSource`] talks to the
//! remote users endpoint, [`FileSource`] reads the same payload from disk, and
//! [`StaticSource`] hands back canned records or a canned failure.

use crate::error::DataAccessError;
use crate::model::person::PersonRecord;
use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Default remote users endpoint.
pub const DEFAULT_SOURCE_URL: &str = "https://dummyjson.com/users";

/// Default request timeout for [`HttpSource`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on a users payload read from the network.
const MAX_PAYLOAD_BYTES: u64 = 32 * 1024 * 1024;

/// A single read-only retrieval of the full person list.
pub trait DataSource: Send {
    /// Fetch every person.
    ///
    /// # Errors
    ///
    /// Returns [`DataAccessError`] on network failure, non-success status, or
    /// a payload that is not a users list.
    fn fetch_all(&self) -> Result<Vec<PersonRecord>, DataAccessError>;

    /// Short description used in logs.
    fn describe(&self) -> String;
}

/// Decode a users payload: `{"users": [...]}` (extra envelope fields such as
/// `total`/`skip`/`limit` are ignored) or a bare array.
///
/// # Errors
///
/// Returns [`DataAccessError::Payload`] if the bytes are not a users payload
/// or if two records share an id.
pub fn parse_users_payload(bytes: &[u8]) -> Result<Vec<PersonRecord>, DataAccessError> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|err| DataAccessError::Payload(err.to_string()))?;

    let users = match value {
        serde_json::Value::Object(mut envelope) => envelope.remove("users").ok_or_else(|| {
            DataAccessError::Payload("missing \"users\" field in payload".to_string())
        })?,
        array @ serde_json::Value::Array(_) => array,
        _ => {
            return Err(DataAccessError::Payload(
                "expected {\"users\": [...]} or an array of users".to_string(),
            ));
        }
    };

    let records: Vec<PersonRecord> =
        serde_json::from_value(users).map_err(|err| DataAccessError::Payload(err.to_string()))?;

    let mut seen = HashSet::with_capacity(records.len());
    for record in &records {
        if !seen.insert(record.id) {
            return Err(DataAccessError::Payload(format!(
                "duplicate person id {}",
                record.id
            )));
        }
    }

    Ok(records)
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

/// Fetches the users payload over HTTP with a blocking `ureq` agent.
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE_URL)
    }
}

impl DataSource for HttpSource {
    fn fetch_all(&self) -> Result<Vec<PersonRecord>, DataAccessError> {
        let agent = ureq::AgentBuilder::new().timeout(self.timeout).build();

        debug!(url = %self.url, "fetching users");
        let response = agent
            .get(&self.url)
            .set("Accept", "application/json")
            .set("User-Agent", "roster")
            .call()
            .map_err(|err| match err {
                ureq::Error::Status(status, _) => DataAccessError::Status { status },
                ureq::Error::Transport(transport) => {
                    DataAccessError::Transport(transport.to_string())
                }
            })?;

        let body = read_capped(response.into_reader(), MAX_PAYLOAD_BYTES)?;
        parse_users_payload(&body)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Read at most `limit` bytes; a longer body is rejected rather than cut.
fn read_capped(reader: impl Read, limit: u64) -> Result<Vec<u8>, DataAccessError> {
    let mut body = Vec::new();
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut body)
        .map_err(|err| DataAccessError::Transport(err.to_string()))?;
    if body.len() as u64 > limit {
        return Err(DataAccessError::Payload(format!(
            "payload exceeds {limit} bytes"
        )));
    }
    Ok(body)
}

// ---------------------------------------------------------------------------
// File
// ---------------------------------------------------------------------------

/// Reads a users payload from a local JSON file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataSource for FileSource {
    fn fetch_all(&self) -> Result<Vec<PersonRecord>, DataAccessError> {
        let bytes = std::fs::read(&self.path).map_err(|err| DataAccessError::Io {
            path: self.path.display().to_string(),
            reason: err.to_string(),
        })?;
        parse_users_payload(&bytes)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// ---------------------------------------------------------------------------
// Static
// ---------------------------------------------------------------------------

/// In-memory source returning fixed records or a fixed failure.
#[derive(Debug, Clone)]
pub struct StaticSource {
    outcome: Result<Vec<PersonRecord>, DataAccessError>,
}

impl StaticSource {
    #[must_use]
    pub const fn new(records: Vec<PersonRecord>) -> Self {
        Self {
            outcome: Ok(records),
        }
    }

    #[must_use]
    pub const fn failing(error: DataAccessError) -> Self {
        Self {
            outcome: Err(error),
        }
    }
}

impl DataSource for StaticSource {
    fn fetch_all(&self) -> Result<Vec<PersonRecord>, DataAccessError> {
        self.outcome.clone()
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

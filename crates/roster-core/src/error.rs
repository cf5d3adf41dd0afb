use std::fmt;

/// Machine-readable error codes surfaced by the CLI and JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    SourceUnreachable,
    SourceStatus,
    MalformedPayload,
    SourceFileUnreadable,
    SourceFailed,
    AlreadyLoaded,
    ConfigParseError,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::SourceUnreachable => "E1001",
            Self::SourceStatus => "E1002",
            Self::MalformedPayload => "E1003",
            Self::SourceFileUnreadable => "E1004",
            Self::SourceFailed => "E1005",
            Self::AlreadyLoaded => "E2001",
            Self::ConfigParseError => "E3001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::SourceUnreachable => "Data source unreachable",
            Self::SourceStatus => "Data source returned a non-success status",
            Self::MalformedPayload => "Malformed users payload",
            Self::SourceFileUnreadable => "Users file could not be read",
            Self::SourceFailed => "Data source failed",
            Self::AlreadyLoaded => "Directory already loaded",
            Self::ConfigParseError => "Config file parse error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::SourceUnreachable => {
                Some("Check network access, or pass --input <file.json> to work offline.")
            }
            Self::SourceStatus => Some("Verify the --source URL or ROSTER_SOURCE_URL."),
            Self::MalformedPayload => {
                Some("The payload must be {\"users\": [...]} or a bare array of users.")
            }
            Self::SourceFileUnreadable => Some("Check the --input path and its permissions."),
            Self::SourceFailed => None,
            Self::AlreadyLoaded => Some("Construct a new store for every session."),
            Self::ConfigParseError => Some("Fix syntax in ~/.config/roster/config.toml and retry."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The single failure kind of a directory load.
///
/// Network-level and application-level failures both normalize to a
/// human-readable message via `Display`; that message is what the store keeps
/// in [`crate::store::LoadState::Error`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataAccessError {
    /// Connection refused, DNS failure, timeout.
    #[error("Failed to fetch users: {0}")]
    Transport(String),

    /// The source answered with a non-2xx status.
    #[error("Failed to fetch users (HTTP {status})")]
    Status { status: u16 },

    /// The body was not a users payload.
    #[error("Malformed users payload: {0}")]
    Payload(String),

    /// A local users file could not be read.
    #[error("Failed to read {path}: {reason}")]
    Io { path: String, reason: String },

    /// Any other failure, with its message kept verbatim.
    #[error("{0}")]
    Other(String),
}

impl DataAccessError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Transport(_) => ErrorCode::SourceUnreachable,
            Self::Status { .. } => ErrorCode::SourceStatus,
            Self::Payload(_) => ErrorCode::MalformedPayload,
            Self::Io { .. } => ErrorCode::SourceFileUnreadable,
            Self::Other(_) => ErrorCode::SourceFailed,
        }
    }
}

/// Usage errors of [`crate::store::DirectoryStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A session performs exactly one load.
    #[error("directory already loaded; one load per session")]
    AlreadyLoaded,
}

impl StoreError {
    #[must_use]
    pub const fn code(self) -> ErrorCode {
        match self {
            Self::AlreadyLoaded => ErrorCode::AlreadyLoaded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            ErrorCode::SourceUnreachable,
            ErrorCode::SourceStatus,
            ErrorCode::MalformedPayload,
            ErrorCode::SourceFileUnreadable,
            ErrorCode::SourceFailed,
            ErrorCode::AlreadyLoaded,
            ErrorCode::ConfigParseError,
        ];

        let mut seen = HashSet::new();
        for code in all {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        let code = ErrorCode::SourceStatus.code();
        assert_eq!(code.len(), 5);
        assert!(code.starts_with('E'));
        assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn status_error_message_is_human_readable() {
        let err = DataAccessError::Status { status: 503 };
        assert_eq!(err.to_string(), "Failed to fetch users (HTTP 503)");
        assert_eq!(err.code(), ErrorCode::SourceStatus);
    }

    #[test]
    fn other_error_keeps_message_verbatim() {
        let err = DataAccessError::Other("socket hang up".into());
        assert_eq!(err.to_string(), "socket hang up");
    }
}

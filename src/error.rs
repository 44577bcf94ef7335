//! Error taxonomy for the fetch and transfer layers.
//!
//! Library layers return these typed errors; the application layer wraps them
//! in `anyhow` with context, the same way every other command does.

use reqwest::StatusCode;

/// A path template was rendered with the wrong number of arguments, or the
/// template itself is malformed. Always a programming error.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TemplateArityError {
    #[error("template {template:?} expects {expected} argument(s), got {actual}")]
    Count {
        template: String,
        expected: usize,
        actual: usize,
    },

    /// Unterminated `{`, stray `}`, non-numeric placeholder, or an index gap.
    #[error("template {template:?} is malformed at byte {position}")]
    Malformed { template: String, position: usize },
}

/// A REST fetch failed. Any page failing aborts the whole fetch.
#[derive(Debug, thiserror::Error)]
pub enum ApiFetchError {
    /// The server answered with a non-2xx status.
    #[error("GET {path} failed with HTTP {status}")]
    Status { path: String, status: StatusCode },

    /// The request never produced a response (connect, TLS, timeout...).
    #[error("GET {path} could not be completed")]
    Request {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// The body could not be decoded into the expected resource type.
    #[error("GET {path} returned a body that could not be decoded (HTTP {status})")]
    Decode {
        path: String,
        status: StatusCode,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiFetchError {
    pub fn path(&self) -> &str {
        match self {
            ApiFetchError::Status { path, .. }
            | ApiFetchError::Request { path, .. }
            | ApiFetchError::Decode { path, .. } => path,
        }
    }

    /// HTTP status of the failing response, when one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiFetchError::Status { status, .. } | ApiFetchError::Decode { status, .. } => {
                Some(*status)
            }
            ApiFetchError::Request { source, .. } => source.status(),
        }
    }
}

/// Which side of a stream copy failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferSide {
    Read,
    Write,
}

impl std::fmt::Display for TransferSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferSide::Read => write!(f, "read"),
            TransferSide::Write => write!(f, "write"),
        }
    }
}

/// An I/O failure while copying a byte stream. The destination keeps whatever
/// was written before the failure.
#[derive(Debug, thiserror::Error)]
#[error("transfer {side} failed after {bytes_copied} byte(s)")]
pub struct TransferError {
    pub side: TransferSide,
    pub bytes_copied: u64,
    #[source]
    pub source: std::io::Error,
}

/// A download tried to claim the progress slot while another one was active.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("cannot start {requested:?}: {active:?} has not completed")]
pub struct SlotBusy {
    pub active: String,
    pub requested: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_arity_display() {
        let err = TemplateArityError::Count {
            template: "repos/{0}/{1}".to_string(),
            expected: 2,
            actual: 1,
        };
        assert_eq!(
            err.to_string(),
            r#"template "repos/{0}/{1}" expects 2 argument(s), got 1"#
        );

        let err = TemplateArityError::Malformed {
            template: "repos/{0".to_string(),
            position: 6,
        };
        assert_eq!(err.to_string(), r#"template "repos/{0" is malformed at byte 6"#);
    }

    #[test]
    fn test_api_fetch_error_accessors() {
        let err = ApiFetchError::Status {
            path: "repos/o/r/releases".to_string(),
            status: StatusCode::NOT_FOUND,
        };
        assert_eq!(err.path(), "repos/o/r/releases");
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_decode_error_keeps_status() {
        let source = serde_json::from_str::<Vec<u32>>("{").unwrap_err();
        let err = ApiFetchError::Decode {
            path: "p".to_string(),
            status: StatusCode::OK,
            source,
        };
        assert_eq!(err.status(), Some(StatusCode::OK));
    }

    #[test]
    fn test_transfer_error_display() {
        let err = TransferError {
            side: TransferSide::Write,
            bytes_copied: 10,
            source: std::io::Error::other("disk full"),
        };
        assert_eq!(err.to_string(), "transfer write failed after 10 byte(s)");
    }
}

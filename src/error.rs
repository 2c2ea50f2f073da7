//! Error types
//!
//! Every failure surfaced by the client is an [`Error`]: an [`ErrorKind`]
//! describing what went wrong, tagged with the [`CallSite`] (resource and
//! operation) that issued the request. The tag is attached by the shared
//! pipeline, so a failure detected deep inside a page fetch or a token
//! refresh still names the resource operation the caller invoked.

use std::fmt;

/// Result alias used across the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Static descriptor of a logical API call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallSite {
    pub resource: &'static str,
    pub operation: &'static str,
}

impl CallSite {
    pub const fn new(resource: &'static str, operation: &'static str) -> Self {
        Self { resource, operation }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource, self.operation)
    }
}

/// Structured error returned by the platform for a non-2xx response
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{status} {error_code}: {description} (code {code})")]
pub struct ApiError {
    /// HTTP status of the response
    pub status: u16,
    /// Numeric platform error code
    pub code: i64,
    /// Symbolic platform error code, e.g. `CF-ResourceNotFound`
    pub error_code: String,
    pub description: String,
}

/// What went wrong
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Malformed or incomplete request, detected before any I/O
    #[error("invalid request: {field} {reason}")]
    Validation { field: &'static str, reason: String },

    /// Token acquisition or refresh failed
    #[error("authentication failed: {message}")]
    Authentication { message: String, status: Option<u16> },

    /// Structured error response from the platform
    #[error(transparent)]
    Api(ApiError),

    /// Network failure, timeout, or a response that could not be understood
    #[error("transport error: {message}")]
    Transport {
        message: String,
        status: Option<u16>,
        body: Option<String>,
        #[source]
        source: Option<reqwest::Error>,
    },
}

/// Error returned by every client operation
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    site: Option<CallSite>,
}

impl Error {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        ErrorKind::Validation {
            field,
            reason: reason.into(),
        }
        .into()
    }

    pub fn authentication(message: impl Into<String>, status: Option<u16>) -> Self {
        ErrorKind::Authentication {
            message: message.into(),
            status,
        }
        .into()
    }

    pub fn transport(message: impl Into<String>, source: reqwest::Error) -> Self {
        ErrorKind::Transport {
            message: message.into(),
            status: source.status().map(|s| s.as_u16()),
            body: None,
            source: Some(source),
        }
        .into()
    }

    /// Tag the error with its originating call site, keeping an existing tag
    pub(crate) fn at(mut self, site: CallSite) -> Self {
        if self.site.is_none() {
            self.site = Some(site);
        }
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }

    /// The logical call that failed, if the error came out of the pipeline
    pub fn site(&self) -> Option<CallSite> {
        self.site
    }

    pub fn api_error(&self) -> Option<&ApiError> {
        match &self.kind {
            ErrorKind::Api(err) => Some(err),
            _ => None,
        }
    }

    /// HTTP status associated with the failure, when there was a response
    pub fn status(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::Api(err) => Some(err.status),
            ErrorKind::Authentication { status, .. } | ErrorKind::Transport { status, .. } => {
                *status
            }
            ErrorKind::Validation { .. } => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self.kind, ErrorKind::Validation { .. })
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self.kind, ErrorKind::Authentication { .. })
    }

    pub fn is_api(&self) -> bool {
        matches!(self.kind, ErrorKind::Api(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self.kind, ErrorKind::Transport { .. })
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self { kind, site: None }
    }
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        ErrorKind::Api(err).into()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.site {
            Some(site) => write!(f, "{}: {}", site, self.kind),
            None => self.kind.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.kind)
    }
}

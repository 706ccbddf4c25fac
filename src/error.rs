use crate::transport::TransportError;
use serde_json::Value;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "APP_API_URL", "path.id")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "path_template", "credential_storage")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Crate-level error type.
///
/// This is the "raw" side of the error model: whatever the transport, the
/// configuration layer or the credential storage produced. Calls made through
/// [`crate::ApiClient`] never surface it directly; they surface the
/// normalized [`ApiError`] instead (see [`normalize`]).
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("Credential storage error: {message}{}", format_context(.context))]
    Storage {
        message: String,
        context: ErrorContext,
    },

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Request canceled")]
    Cancelled,

    #[error(transparent)]
    Api(#[from] ApiError),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a new validation error with structured context
    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Create a new storage error with structured context
    pub fn storage_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Storage {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. }
            | Error::Validation { context, .. }
            | Error::Storage { context, .. } => Some(context),
            _ => None,
        }
    }
}

/// Classification of a normalized API failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 401
    Unauthorized,
    /// 403
    Forbidden,
    /// 404
    NotFound,
    /// 422
    Validation,
    /// 429
    RateLimited,
    /// Any other 4xx.
    Client,
    /// 5xx
    Server,
    /// No response was received.
    Network,
    /// The caller canceled the exchange.
    Cancelled,
    /// Raised by the auth coordinator once token refresh is exhausted.
    SessionExpired,
}

impl ErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ErrorKind::Unauthorized,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            422 => ErrorKind::Validation,
            429 => ErrorKind::RateLimited,
            s if s >= 500 => ErrorKind::Server,
            _ => ErrorKind::Client,
        }
    }
}

/// The normalized error every API call resolves to on failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (HTTP {status_code})")]
pub struct ApiError {
    message: String,
    status_code: u16,
    kind: ErrorKind,
}

impl ApiError {
    /// Build an error classified by its status code.
    pub fn new(message: impl Into<String>, status_code: u16) -> Self {
        Self::with_kind(message, status_code, ErrorKind::from_status(status_code))
    }

    pub(crate) fn with_kind(message: impl Into<String>, status_code: u16, kind: ErrorKind) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            "Unknown error".to_string()
        } else {
            message
        };
        Self {
            message,
            status_code,
            kind,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::with_kind(message, 500, ErrorKind::Network)
    }

    pub fn cancelled() -> Self {
        Self::with_kind("canceled", 500, ErrorKind::Cancelled)
    }

    pub fn session_expired() -> Self {
        Self::with_kind("Session expired", 401, ErrorKind::SessionExpired)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status_code == 401
    }

    pub fn is_forbidden(&self) -> bool {
        self.status_code == 403
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code == 404
    }

    pub fn is_validation_error(&self) -> bool {
        self.status_code == 422
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status_code == 429
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code >= 500 && self.kind != ErrorKind::Cancelled
    }

    pub fn is_network_error(&self) -> bool {
        self.kind == ErrorKind::Network
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind == ErrorKind::Cancelled
    }

    pub fn is_session_expired(&self) -> bool {
        self.kind == ErrorKind::SessionExpired
    }

    /// User-facing message for the status code, when one is defined.
    pub fn default_message(&self) -> Option<&'static str> {
        let msg = match self.status_code {
            400 => "The request was invalid.",
            401 => "Please sign in to continue.",
            403 => "You do not have permission to access this resource.",
            404 => "The requested resource could not be found.",
            422 => "Please check the values you entered.",
            429 => "Too many requests. Please try again shortly.",
            500 => "A server error occurred.",
            502 => "Unable to reach the server.",
            503 => "The service is temporarily unavailable.",
            _ => return None,
        };
        Some(msg)
    }
}

/// Convert any raw failure into an [`ApiError`].
///
/// Message precedence: `message` field of a JSON error body, then its `error`
/// field, then the transport's own message, then `"Unknown error"`. A failure
/// without a response is reported with status 500. Already-normalized errors
/// pass through unchanged.
pub fn normalize(err: Error) -> ApiError {
    match err {
        Error::Api(api) => api,
        Error::Cancelled => ApiError::cancelled(),
        Error::Transport(TransportError::Status { status, body }) => {
            let message = body_message(&body)
                .unwrap_or_else(|| format!("Request failed with status code {}", status));
            ApiError::new(message, status)
        }
        Error::Transport(TransportError::Http(e)) => match e.status() {
            Some(status) => ApiError::new(e.to_string(), status.as_u16()),
            None => ApiError::network(e.to_string()),
        },
        Error::Transport(TransportError::Other(message)) => ApiError::network(message),
        other => ApiError::new(other.to_string(), 500),
    }
}

/// Shorthand for `normalize(err).message`.
pub fn error_message(err: Error) -> String {
    normalize(err).message
}

fn body_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    ["message", "error"].iter().find_map(|field| {
        json.get(field)
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.to_string())
    })
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        normalize(err)
    }
}

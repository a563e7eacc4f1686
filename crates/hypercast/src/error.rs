use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Error raised by an accessor function supplied at representor-build time.
pub type AccessorError = Box<dyn std::error::Error + Send + Sync>;

/// Errors produced while registering resources, resolving paths, or rendering.
///
/// Variants fall into four classes (see [`ErrorKind`]): developer
/// misconfiguration, client input, missing resources, and upstream failures
/// raised by accessor functions. The HTTP layer uses [`Error::status_code`]
/// or [`ApiError::from`](crate::v1::ApiError) to turn them into responses.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Media type {media_type} and model type {model_type} does not have a message mapper")]
    MustHaveMessageMapper {
        media_type: String,
        model_type: String,
    },

    #[error("Media type application/problem+json does not have a message mapper")]
    MustHaveProblemJsonMapper,

    #[error("Identifier {0} does not have a path mapper")]
    MustHavePathIdentifierMapper(String),

    #[error("Representor built for {declared} cannot be registered for {registered}")]
    MustHaveValidModelType { declared: String, registered: String },

    #[error("Model type {0} already has a representor")]
    AlreadyRegistered(String),

    #[error("Resource name {name} is already bound to {model_type}")]
    NameTaken { name: String, model_type: String },

    #[error("Unable to resolve URI for model type {0}")]
    UnresolvableUri(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Accessor error: {0}")]
    Accessor(#[source] AccessorError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Process-level misconfiguration; never recovered.
    Developer,
    /// Malformed client input.
    Client,
    /// The addressed resource does not exist.
    NotFound,
    /// Raised by an injected accessor or by I/O underneath it.
    Upstream,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::BadRequest(_) => ErrorKind::Client,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Accessor(_) | Error::Io(_) => ErrorKind::Upstream,
            Error::MustHaveMessageMapper { .. }
            | Error::MustHaveProblemJsonMapper
            | Error::MustHavePathIdentifierMapper(_)
            | Error::MustHaveValidModelType { .. }
            | Error::AlreadyRegistered(_)
            | Error::NameTaken { .. }
            | Error::UnresolvableUri(_)
            | Error::Json(_)
            | Error::Config(_) => ErrorKind::Developer,
        }
    }

    /// Whether this error was caused by the client's request.
    pub fn is_client_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::Client | ErrorKind::NotFound)
    }

    /// HTTP status an outer layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Client => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Developer | ErrorKind::Upstream => 500,
        }
    }

    /// Wrap an accessor failure, keeping it reachable through `source()`.
    pub fn accessor(err: impl Into<AccessorError>) -> Self {
        Error::Accessor(err.into())
    }
}

use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{message}")]
    Conflict { message: String, details: Option<String> },
    /// Store failure; the cause is logged, only the operation name is exposed.
    #[error("failed to {operation}")]
    StorageUnavailable { operation: &'static str },
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self { Self::Validation(message.into()) }

    pub fn not_found(message: impl Into<String>) -> Self { Self::NotFound(message.into()) }

    pub fn conflict(message: impl Into<String>) -> Self { Self::Conflict { message: message.into(), details: None } }

    pub fn details(&self) -> Option<&str> {
        match self {
            Self::Conflict { details, .. } => details.as_deref(),
            _ => None,
        }
    }
}

/// Maps store failures to `StorageUnavailable`, logging the underlying chain.
pub(crate) trait StorageContext<T> {
    fn storage(self, operation: &'static str) -> ServiceResult<T>;
}

impl<T> StorageContext<T> for anyhow::Result<T> {
    fn storage(self, operation: &'static str) -> ServiceResult<T> {
        self.map_err(|e| {
            tracing::error!(error = ?e, operation, "store operation failed");
            ServiceError::StorageUnavailable { operation }
        })
    }
}

pub(crate) fn require(field: &str, value: &str) -> ServiceResult<()> {
    if value.trim().is_empty() { Err(ServiceError::validation(format!("{field} is required"))) } else { Ok(()) }
}

pub(crate) fn require_if_present(field: &str, value: Option<&str>) -> ServiceResult<()> {
    match value { Some(v) => require(field, v), None => Ok(()) }
}

//! Error types for the `domain` layer.
use service::directory::DirectoryError;
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field is used to hold the original error that caused
/// the domain error. `web` uses the `error_kind`s to pick HTTP status codes and never
/// depends on the lower layers' error types directly.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Entity(EntityErrorKind),
}

/// Errors about the entities the domain layer works on.
#[derive(Debug, PartialEq)]
pub enum EntityErrorKind {
    /// A referenced entity (e.g. a role) does not exist
    NotFound,
    /// An entity failed validation
    Invalid,
}

impl Error {
    /// An entity failed validation; `reason` is kept as the error source.
    pub fn invalid(reason: impl Into<String>) -> Self {
        let reason: String = reason.into();
        Error {
            source: Some(reason.into()),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::Invalid,
            )),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the recipient directory to the `domain` layer.
impl From<DirectoryError> for Error {
    fn from(err: DirectoryError) -> Self {
        let entity_error_kind = match err {
            DirectoryError::UnknownRole(_) => EntityErrorKind::NotFound,
        };

        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(entity_error_kind)),
        }
    }
}

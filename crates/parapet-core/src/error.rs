//! Error types for Parapet

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // Decode Errors
    #[error("input exceeds 1MB limit")]
    InputTooLarge,

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("{field}: expected {expected}, got {found}")]
    InvalidShape {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    // Validation Errors
    #[error("missing Version field")]
    MissingVersion,

    #[error("unsupported version: {0:?}")]
    UnsupportedVersion(String),

    #[error("missing or empty Statement array")]
    MissingStatement,

    #[error("statement {0} has Effect {1:?}, must be Allow or Deny")]
    InvalidEffect(usize, String),

    #[error("statement {0} must have Action or NotAction")]
    MissingActionOrNotAction(usize),

    #[error("statement {0} must have Resource, NotResource or Principal")]
    MissingTarget(usize),

    // Apply Errors
    #[error("missing policy")]
    MissingPolicy,

    #[error("patch {0} no longer applies to the policy")]
    PatchInapplicable(String),

    // Internal Errors
    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn http_status(&self) -> u16 {
        match self {
            Error::InputTooLarge
            | Error::InvalidJson(_)
            | Error::InvalidShape { .. }
            | Error::MissingVersion
            | Error::UnsupportedVersion(_)
            | Error::MissingStatement
            | Error::InvalidEffect(_, _)
            | Error::MissingActionOrNotAction(_)
            | Error::MissingTarget(_)
            | Error::MissingPolicy
            | Error::PatchInapplicable(_) => 400,

            Error::Internal(_) | Error::Io(_) | Error::Other(_) => 500,
        }
    }
}

//! Error taxonomy and HTTP status mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Address string does not match the expected 0x-prefixed hex format.
    #[error("invalid address '{0}': expected 0x-prefixed hex, at most 40 digits")]
    InvalidAddress(String),

    /// Malformed request payload (empty list, mismatched amounts, missing field).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No campaign stored under the requested id.
    #[error("campaign '{0}' not found")]
    CampaignNotFound(String),

    /// A Merkle tree cannot be built over zero leaves.
    #[error("cannot build a Merkle tree from an empty leaf set")]
    EmptyTree,

    /// The requested leaf is not part of the tree.
    #[error("leaf is not present in the tree")]
    LeafNotFound,

    /// A freshly generated proof did not verify against the stored root.
    /// Generation and verification have diverged; never downgraded to
    /// "not eligible".
    #[error("generated proof failed verification against the stored root")]
    ProofVerificationFailed,
}

impl Error {
    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidAddress(_) | Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::CampaignNotFound(_) => StatusCode::NOT_FOUND,
            Self::EmptyTree | Self::LeafNotFound | Self::ProofVerificationFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed with internal error");
        }
        let body = Json(serde_json::json!({
            "success": false,
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_4xx() {
        assert_eq!(
            Error::InvalidAddress("zzz".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::InvalidInput("empty list".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::CampaignNotFound("drop2".into()).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn logic_defects_map_to_500() {
        assert_eq!(Error::EmptyTree.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            Error::LeafNotFound.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::ProofVerificationFailed.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

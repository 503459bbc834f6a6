//! Context broker error responses.
//!
//! Brokers report failures as RFC 7807 problem details whose `type` is one
//! of the NGSI-LD error URIs. Batch operations may instead answer with a
//! mixed result listing the entities that succeeded and those that failed.

use serde::{Deserialize, Serialize};

/// Problem type of a malformed request.
pub const INVALID_REQUEST: &str = "https://uri.etsi.org/ngsi-ld/errors/InvalidRequest";
/// Problem type of a request whose data is not acceptable.
pub const BAD_REQUEST_DATA: &str = "https://uri.etsi.org/ngsi-ld/errors/BadRequestData";
/// Problem type of a create request for an existing entity.
pub const ALREADY_EXISTS: &str = "https://uri.etsi.org/ngsi-ld/errors/AlreadyExists";

/// RFC 7807 problem details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// Problem type URI
    #[serde(rename = "type")]
    pub problem_type: String,
    /// Short summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Explanation specific to this occurrence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Failure of one entity inside a batch operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntityError {
    /// Entity that failed
    pub entity_id: String,
    /// Why it failed
    pub error: ProblemDetails,
}

/// Outcome of a batch operation that partially failed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchOperationResult {
    /// Entities written
    #[serde(default)]
    pub success: Vec<String>,
    /// Entities rejected
    #[serde(default)]
    pub errors: Vec<BatchEntityError>,
}

/// A classified broker error response.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BrokerError {
    /// The entity to create already exists
    #[error("entity already exists: {0}")]
    AlreadyExists(String),
    /// The request was malformed
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// The request data was rejected
    #[error("bad request data: {0}")]
    BadData(String),
    /// Some entities of a batch failed
    #[error("mixed result: {} succeeded, {} failed", .0.success.len(), .0.errors.len())]
    MixedResult(BatchOperationResult),
    /// Any other response
    #[error("unexpected status {status}: {body}")]
    Unexpected {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },
}

impl BrokerError {
    /// Classify a non-success response from its status code and body.
    #[must_use]
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        if let Ok(problem) = serde_json::from_slice::<ProblemDetails>(body) {
            let detail = problem.detail.clone().unwrap_or_default();
            match problem.problem_type.as_str() {
                ALREADY_EXISTS => return BrokerError::AlreadyExists(detail),
                INVALID_REQUEST => return BrokerError::InvalidRequest(detail),
                BAD_REQUEST_DATA => return BrokerError::BadData(detail),
                other => {
                    tracing::debug!(status, problem_type = other, "Unrecognized problem type");
                }
            }
        }

        if let Ok(result) = serde_json::from_slice::<BatchOperationResult>(body) {
            if !result.success.is_empty() || !result.errors.is_empty() {
                return BrokerError::MixedResult(result);
            }
        }

        BrokerError::Unexpected {
            status,
            body: String::from_utf8_lossy(body).into_owned(),
        }
    }
}

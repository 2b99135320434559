//! Remote-call errors and translation into the booking taxonomy.

use thiserror::Error;

use crate::error::BookingError;

/// Failure of a call to a remote collaborator.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The remote service answered that the entity does not exist.
    #[error("not found")]
    NotFound,

    /// The remote service is unreachable, timed out, or returned an
    /// unexpected error.
    #[error("unavailable: {reason}")]
    Unavailable { reason: String },
}

impl RemoteError {
    /// Creates an `Unavailable` error from any displayable cause.
    pub fn unavailable(reason: impl std::fmt::Display) -> Self {
        RemoteError::Unavailable {
            reason: reason.to_string(),
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        RemoteError::unavailable(err)
    }
}

/// Translates a lookup failure for a referenced entity.
///
/// An upstream 404 means the request pointed at something that does not
/// exist (a client error); anything else means the collaborator itself is
/// in trouble (a server-side failure).
pub fn reference_error(
    entity: &'static str,
    id: i64,
    service: &'static str,
    err: RemoteError,
) -> BookingError {
    match err {
        RemoteError::NotFound => BookingError::ReferenceNotFound { entity, id },
        RemoteError::Unavailable { reason } => {
            BookingError::UpstreamUnavailable { service, reason }
        }
    }
}

/// Maps an HTTP response status to the remote error taxonomy, passing
/// successful responses through.
pub(crate) fn check_status(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else if status == reqwest::StatusCode::NOT_FOUND {
        Err(RemoteError::NotFound)
    } else {
        Err(RemoteError::Unavailable {
            reason: format!("unexpected status {status}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_becomes_reference_not_found() {
        let err = reference_error("user", 5, "identity", RemoteError::NotFound);
        assert!(matches!(
            err,
            BookingError::ReferenceNotFound { entity: "user", id: 5 }
        ));
    }

    #[test]
    fn test_unavailable_becomes_upstream_unavailable() {
        let err = reference_error(
            "room",
            101,
            "inventory",
            RemoteError::unavailable("connection refused"),
        );
        match err {
            BookingError::UpstreamUnavailable { service, reason } => {
                assert_eq!(service, "inventory");
                assert!(reason.contains("connection refused"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

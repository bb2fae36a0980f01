use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use domain::error::{
    DomainErrorKind, EntityErrorKind, Error as DomainError, ExternalErrorKind, InternalErrorKind,
};
use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(DomainError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self.0.error_kind {
            DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
                InternalErrorKind::Entity(entity_error_kind) => match entity_error_kind {
                    EntityErrorKind::NotFound => {
                        (StatusCode::NOT_FOUND, "NOT FOUND").into_response()
                    }
                    EntityErrorKind::DbTransaction | EntityErrorKind::Other(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
                    }
                },
                // The message of a Validation error is safe to return to the client.
                InternalErrorKind::Validation(message) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, message).into_response()
                }
                InternalErrorKind::Report(message) => {
                    warn!("Report generation failed: {message}");
                    (StatusCode::INTERNAL_SERVER_ERROR, "REPORT GENERATION FAILED")
                        .into_response()
                }
                InternalErrorKind::Config | InternalErrorKind::Other(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
                }
            },
            DomainErrorKind::External(external_error_kind) => match external_error_kind {
                ExternalErrorKind::Network => {
                    (StatusCode::BAD_GATEWAY, "BAD GATEWAY").into_response()
                }
                ExternalErrorKind::Timeout => {
                    (StatusCode::GATEWAY_TIMEOUT, "GATEWAY TIMEOUT").into_response()
                }
                ExternalErrorKind::ExtractionParse { .. } => (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM MODEL RETURNED AN UNPARSABLE REPLY",
                )
                    .into_response(),
                ExternalErrorKind::Other(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
                }
            },
        }
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_for(error_kind: DomainErrorKind) -> StatusCode {
        Error(DomainError {
            source: None,
            error_kind,
        })
        .into_response()
        .status()
    }

    #[test]
    fn upstream_failures_map_to_gateway_status_codes() {
        assert_eq!(
            status_for(DomainErrorKind::External(ExternalErrorKind::Network)),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(DomainErrorKind::External(ExternalErrorKind::Timeout)),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_for(DomainErrorKind::External(ExternalErrorKind::ExtractionParse {
                raw: "не json".to_owned()
            })),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn caller_facing_failures_map_to_client_status_codes() {
        assert_eq!(
            status_for(DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::NotFound
            ))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(DomainErrorKind::Internal(InternalErrorKind::Validation(
                "gap index 7 is out of range".to_owned()
            ))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}

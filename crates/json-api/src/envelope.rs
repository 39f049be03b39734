//! Response envelopes
//!
//! Successes render as `{"success": true, "message": ..., "data": ...}` and
//! failures as `{"success": false, "message": ..., "reason": ...}`.

use martina_app::domain::placement::PlacementError;
use salvo::{
    http::StatusCode,
    oapi::{
        Components, Content, EndpointOutRegister, Operation, Response as OapiResponse, ToSchema,
    },
    prelude::{Json, Response},
    writing::Scribe,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const INTERNAL_MESSAGE: &str = "Something went wrong!";

/// Error body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ErrorBody {
    /// Always `false`
    pub success: bool,

    /// Human readable message
    pub message: String,

    /// Stable machine readable reason
    pub reason: String,
}

/// A failed request, rendered as an [`ErrorBody`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub(crate) struct ApiError {
    status: StatusCode,
    message: String,
    reason: String,
}

impl ApiError {
    pub(crate) fn new(status: StatusCode, message: &str, reason: &str) -> Self {
        Self {
            status,
            message: message.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn bad_request(message: &str, reason: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, reason)
    }

    pub(crate) fn unauthorized(message: &str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message, "unauthorized")
    }

    pub(crate) fn internal(reason: &str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE, reason)
    }

    #[cfg(test)]
    pub(crate) fn status(&self) -> StatusCode {
        self.status
    }

    #[cfg(test)]
    pub(crate) fn reason(&self) -> &str {
        &self.reason
    }
}

impl From<PlacementError> for ApiError {
    fn from(error: PlacementError) -> Self {
        let status = match &error {
            PlacementError::Validation { .. } => StatusCode::BAD_REQUEST,
            PlacementError::NotFound { .. } => StatusCode::NOT_FOUND,
            PlacementError::Authorization { .. } => StatusCode::FORBIDDEN,
            PlacementError::Conflict { .. } => StatusCode::CONFLICT,
            PlacementError::ExternalService { .. } => StatusCode::BAD_GATEWAY,
            PlacementError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        Self {
            status,
            reason: error.reason().to_string(),
            message: error.to_string(),
        }
    }
}

impl Scribe for ApiError {
    fn render(self, res: &mut Response) {
        res.status_code(self.status);
        res.render(Json(ErrorBody {
            success: false,
            message: self.message,
            reason: self.reason,
        }));
    }
}

impl EndpointOutRegister for ApiError {
    fn register(components: &mut Components, operation: &mut Operation) {
        let documented = [
            (StatusCode::BAD_REQUEST, "Invalid request"),
            (StatusCode::UNAUTHORIZED, "Missing or invalid API token"),
            (StatusCode::FORBIDDEN, "Caller may not do this"),
            (StatusCode::NOT_FOUND, "Referenced record not found"),
            (StatusCode::CONFLICT, "Stock or coupon conflict"),
            (StatusCode::BAD_GATEWAY, "Payment gateway failure"),
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
        ];

        for (status, description) in documented {
            operation.responses.insert(
                status.as_str(),
                OapiResponse::new(description).add_content(
                    "application/json",
                    Content::new(ErrorBody::to_schema(components)),
                ),
            );
        }
    }
}

/// A successful request carrying `data`.
#[derive(Debug)]
pub(crate) struct ApiResponse<T> {
    status: StatusCode,
    message: &'static str,
    data: T,
}

impl<T> ApiResponse<T> {
    pub(crate) fn ok(message: &'static str, data: T) -> Self {
        Self {
            status: StatusCode::OK,
            message,
            data,
        }
    }

    pub(crate) fn created(message: &'static str, data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            message,
            data,
        }
    }
}

#[derive(Serialize)]
struct SuccessBody<'a, T> {
    success: bool,
    message: &'a str,
    data: T,
}

impl<T> Scribe for ApiResponse<T>
where
    T: Serialize + Send,
{
    fn render(self, res: &mut Response) {
        res.status_code(self.status);
        res.render(Json(SuccessBody {
            success: true,
            message: self.message,
            data: self.data,
        }));
    }
}

impl<T> EndpointOutRegister for ApiResponse<T>
where
    T: ToSchema,
{
    fn register(components: &mut Components, operation: &mut Operation) {
        operation.responses.insert(
            StatusCode::OK.as_str(),
            OapiResponse::new("Success, `data` holds the payload").add_content(
                "application/json",
                Content::new(T::to_schema(components)),
            ),
        );
    }
}

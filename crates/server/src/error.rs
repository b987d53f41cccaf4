use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use intent_relay_core::InterfaceError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub correlation_id: String,
}

/// HTTP rendering of an [`InterfaceError`]; only the user-safe message leaves the process.
#[derive(Debug)]
pub struct ApiError(pub InterfaceError);

impl From<InterfaceError> for ApiError {
    fn from(value: InterfaceError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorBody {
            error: self.0.user_message(),
            correlation_id: self.0.correlation_id().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use intent_relay_core::ApplicationError;

    use super::ApiError;

    #[test]
    fn remote_failure_renders_as_bad_gateway() {
        let error = ApplicationError::RemoteUnavailable("dns failure".to_string())
            .into_interface("req-9");

        let response = ApiError(error).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn invalid_input_renders_as_bad_request() {
        let error = ApplicationError::InvalidInput("message is required".to_string())
            .into_interface("req-10");

        let response = ApiError(error).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

use application::ApplicationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::{DomainError, RepositoryError};
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// 校验失败时返回违规描述数组，其余错误返回 `{code, message}`。
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ErrorPayload {
    Violations(Vec<String>),
    Detail(ErrorBody),
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorPayload,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorPayload::Detail(ErrorBody {
                code,
                message: message.into(),
            }),
        }
    }

    pub fn validation(violations: Vec<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: ErrorPayload::Violations(violations),
        }
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        use application::ApplicationError as AppErr;

        match error {
            AppErr::Domain(DomainError::InvalidArgument { field, reason }) => {
                ApiError::validation(vec![format!("\"{field}\" {reason}")])
            }
            AppErr::Domain(DomainError::InvalidMessage { violations }) => {
                ApiError::validation(violations)
            }
            AppErr::Domain(DomainError::ParticipantAlreadyExists { name }) => ApiError::new(
                StatusCode::CONFLICT,
                "PARTICIPANT_EXISTS",
                format!("participant {name} already exists"),
            ),
            AppErr::Domain(DomainError::UnknownSender { name }) => ApiError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNKNOWN_SENDER",
                format!("sender {name:?} is not a registered participant"),
            ),
            AppErr::Repository(RepositoryError::Conflict) => {
                ApiError::new(StatusCode::CONFLICT, "CONFLICT", "resource already exists")
            }
            AppErr::Repository(RepositoryError::Storage { message }) => {
                tracing::error!(error = %message, "storage failure");
                ApiError::internal_server_error("storage unavailable")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

//! HTTP 边界错误类型
//!
//! 服务层统一返回 `ProfileError`，在这里映射为状态码和响应信封。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use profile_shared::error::ProfileError;
use serde_json::json;

const GENERIC_MESSAGE: &str = "服务内部错误，请稍后重试";

/// API 错误
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("参数验证失败: {0}")]
    Validation(String),

    #[error(transparent)]
    Profile(#[from] ProfileError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Profile(e) => match e {
                ProfileError::NotFound { .. } => StatusCode::NOT_FOUND,
                ProfileError::Validation(_) => StatusCode::BAD_REQUEST,
                ProfileError::Unauthorized => StatusCode::UNAUTHORIZED,
                ProfileError::Forbidden { .. } => StatusCode::FORBIDDEN,
                ProfileError::AlreadyExists { .. } => StatusCode::CONFLICT,
                ProfileError::ExternalServiceTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                ProfileError::Database(_)
                | ProfileError::Kafka(_)
                | ProfileError::ExternalService { .. }
                | ProfileError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Profile(e) => e.code(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 5xx 只返回通用提示，详细信息记录日志
        let message = if status.is_server_error() && status != StatusCode::GATEWAY_TIMEOUT {
            tracing::error!(error = %self, code = self.error_code(), "请求处理失败");
            GENERIC_MESSAGE.to_string()
        } else {
            self.to_string()
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ProfileError::not_found("Profile", "u-1"), StatusCode::NOT_FOUND),
            (ProfileError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ProfileError::Unauthorized, StatusCode::UNAUTHORIZED),
            (ProfileError::forbidden("update_points"), StatusCode::FORBIDDEN),
            (
                ProfileError::AlreadyExists {
                    entity: "Profile".into(),
                    field: "user_id".into(),
                    value: "u-1".into(),
                },
                StatusCode::CONFLICT,
            ),
            (
                ProfileError::ExternalServiceTimeout {
                    service: "identity".into(),
                },
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (ProfileError::Kafka("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status_code(), expected);
        }
    }

    #[tokio::test]
    async fn test_system_error_hides_details() {
        let (status, body) =
            body_json(ProfileError::Database(sqlx::Error::PoolTimedOut).into()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "DATABASE_ERROR");
        assert_eq!(body["message"], GENERIC_MESSAGE);
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn test_client_error_keeps_message() {
        let (status, body) = body_json(ProfileError::not_found("Profile", "u-1").into()).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["message"], "记录未找到: Profile id=u-1");
    }
}

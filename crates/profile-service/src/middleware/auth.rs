//! Bearer Token 认证中间件
//!
//! Token 交给身份服务校验，校验通过后把 `AuthUser` 注入请求扩展。

use axum::{
    RequestPartsExt,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use profile_shared::error::ProfileError;
use serde_json::json;
use tracing::{debug, warn};

use crate::auth::AuthUser;
use crate::state::AppState;

pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    let token = match parts.extract::<TypedHeader<Authorization<Bearer>>>().await {
        Ok(TypedHeader(Authorization(bearer))) => bearer.token().to_string(),
        Err(_) => return unauthorized_response("缺少认证 Token"),
    };

    let user_id = match state.identity.current_user(&token).await {
        Ok(id) => id,
        Err(ProfileError::Unauthorized) => {
            debug!("Token 校验未通过");
            return unauthorized_response("认证 Token 无效");
        }
        Err(e) => {
            // 身份服务不可用时同样拒绝请求
            warn!(error = %e, "调用身份服务失败");
            return unauthorized_response("认证 Token 无效");
        }
    };

    parts.extensions.insert(AuthUser::new(user_id));
    next.run(Request::from_parts(parts, body)).await
}

fn unauthorized_response(message: &str) -> Response {
    let body = json!({
        "success": false,
        "code": "UNAUTHORIZED",
        "message": message,
        "data": null
    });

    (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
}

//! 路由配置
//!
//! 所有业务路由挂在 `/api` 下并经过认证中间件。

use axum::{
    Json, Router, middleware,
    routing::{get, post, put},
};

use crate::{handlers, middleware::auth_middleware, state::AppState};

fn profile_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/profiles/{userId}",
            get(handlers::profile::get_profile).delete(handlers::profile::delete_profile),
        )
        .route(
            "/profiles/{userId}/create",
            post(handlers::profile::create_profile),
        )
        .route(
            "/profiles/{userId}/updateProfile",
            post(handlers::profile::update_profile),
        )
        .route(
            "/profiles/{userId}/updateFiscalData",
            post(handlers::profile::update_fiscal_data),
        )
        .route(
            "/profiles/{userId}/updateImage",
            post(handlers::profile::update_image),
        )
        .route(
            "/profiles/{userId}/updateProfilePoints",
            post(handlers::profile::update_points),
        )
        .route(
            "/profiles/{userId}/updateProfileLevel",
            post(handlers::profile::update_level),
        )
}

fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/address/{id}", get(handlers::address::list_addresses))
        .route(
            "/address/{id}/createAddress",
            post(handlers::address::create_address),
        )
        .route("/address/{id}/getAddress", get(handlers::address::get_address))
        .route(
            "/address/{id}/updateAddress",
            post(handlers::address::update_address),
        )
        .route(
            "/address/{id}/deleteAddress",
            put(handlers::address::delete_address),
        )
}

/// 构建需要认证的 API 路由
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(profile_routes())
        .merge(address_routes())
        .layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// 组装应用：`/api` 业务路由 + 存活检查
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes(state.clone()))
        .route("/health", get(health_check))
        .with_state(state)
}

/// 存活探针：服务进程正常即返回 ok
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "profile-service"
    }))
}

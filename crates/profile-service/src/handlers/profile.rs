//! 档案 API 处理器

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use tracing::debug;
use validator::Validate;

use crate::{
    auth::AuthUser,
    dto::{
        ApiResponse, CreateProfileRequest, UpdateFiscalDataRequest, UpdateImageRequest,
        UpdateLevelRequest, UpdatePointsRequest, UpdateProfileRequest,
    },
    error::{ApiError, Result},
    models::Profile,
    state::AppState,
};

/// 创建档案
///
/// POST /api/profiles/{userId}/create
pub async fn create_profile(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Json(req): Json<CreateProfileRequest>,
) -> Result<Json<ApiResponse<Profile>>> {
    req.validate()?;
    let (contact, image) = req.into_parts();

    let profile = state
        .profiles
        .create_profile(&caller, &user_id, contact, image)
        .await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// GET /api/profiles/{userId}
pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Profile>>> {
    let profile = state.profiles.get_profile(&user_id).await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// POST /api/profiles/{userId}/updateProfile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<Profile>>> {
    req.validate()?;
    let profile = state
        .profiles
        .update_profile(&caller, &user_id, req.into())
        .await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// POST /api/profiles/{userId}/updateFiscalData
pub async fn update_fiscal_data(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Json(req): Json<UpdateFiscalDataRequest>,
) -> Result<Json<ApiResponse<Profile>>> {
    req.validate()?;
    let profile = state
        .profiles
        .update_fiscal_data(&caller, &user_id, req.into())
        .await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// POST /api/profiles/{userId}/updateImage
pub async fn update_image(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Json(req): Json<UpdateImageRequest>,
) -> Result<Json<ApiResponse<Profile>>> {
    req.validate()?;
    let profile = state
        .profiles
        .update_image(&caller, &user_id, &req.profile_image)
        .await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// 累加积分并发布积分事件，等级由 Worker 异步更新
///
/// POST /api/profiles/{userId}/updateProfilePoints
pub async fn update_points(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Json(req): Json<UpdatePointsRequest>,
) -> Result<Json<ApiResponse<Profile>>> {
    let delta = req.profile_points.parse().map_err(ApiError::Validation)?;
    if let Some(profile_id) = &req.profile_id {
        debug!(%user_id, %profile_id, delta, "收到积分累加请求");
    }

    let profile = state.points.update_points(&caller, &user_id, delta).await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// POST /api/profiles/{userId}/updateProfileLevel
pub async fn update_level(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Json(req): Json<UpdateLevelRequest>,
) -> Result<Json<ApiResponse<Profile>>> {
    req.validate()?;
    let profile = state
        .profiles
        .update_level(&caller, &user_id, req.profile_level, req.profile_points)
        .await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// DELETE /api/profiles/{userId}
pub async fn delete_profile(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    state.profiles.delete_profile(&caller, &user_id).await?;
    Ok(Json(ApiResponse::success_empty()))
}

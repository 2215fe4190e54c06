//! 地址 API 处理器
//!
//! 路径参数统一命名为 `{id}`：列表接口是档案 id，其余是用户 id。

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::AuthUser,
    dto::{AddressRequest, ApiResponse, DeleteAddressRequest},
    error::{ApiError, Result},
    models::Address,
    state::AppState,
};

/// POST /api/address/{userId}/createAddress
pub async fn create_address(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Json(req): Json<AddressRequest>,
) -> Result<Json<ApiResponse<Address>>> {
    req.validate()?;
    let address = state
        .addresses
        .create_address(&caller, &user_id, req.into())
        .await?;
    Ok(Json(ApiResponse::success(address)))
}

/// GET /api/address/{userId}/getAddress
pub async fn get_address(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Address>>> {
    let address = state.addresses.get_active_address(&user_id).await?;
    Ok(Json(ApiResponse::success(address)))
}

/// POST /api/address/{userId}/updateAddress
pub async fn update_address(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Json(req): Json<AddressRequest>,
) -> Result<Json<ApiResponse<Address>>> {
    req.validate()?;
    let address = state
        .addresses
        .update_address(&caller, &user_id, req.into())
        .await?;
    Ok(Json(ApiResponse::success(address)))
}

/// PUT /api/address/{userId}/deleteAddress
pub async fn delete_address(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Json(req): Json<DeleteAddressRequest>,
) -> Result<Json<ApiResponse<()>>> {
    state
        .addresses
        .delete_address(&caller, &user_id, req.address_id, req.active_address)
        .await?;
    Ok(Json(ApiResponse::success_empty()))
}

/// GET /api/address/{profileId}
pub async fn list_addresses(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Address>>>> {
    let profile_id = Uuid::parse_str(&profile_id)
        .map_err(|_| ApiError::Validation(format!("profileId 不是有效的 UUID: {profile_id}")))?;

    let addresses = state.addresses.list_addresses(profile_id).await?;
    Ok(Json(ApiResponse::success(addresses)))
}

//! 用户档案服务
//!
//! 档案的创建、查询、资料/税务信息/头像更新、直接设置等级以及删除。
//! 所有写操作都要求调用方是档案本人。

use std::sync::Arc;

use profile_shared::error::{ProfileError, Result};
use tracing::{info, instrument};

use crate::auth::AuthUser;
use crate::models::{ContactInfo, FiscalData, Profile};
use crate::repository::ProfileRepositoryTrait;
use crate::service::validation;

/// 用户档案服务
pub struct ProfileService {
    profiles: Arc<dyn ProfileRepositoryTrait>,
    /// 直接设置等级时，积分超过该值会被清零
    level_threshold: i32,
}

impl ProfileService {
    pub fn new(profiles: Arc<dyn ProfileRepositoryTrait>, level_threshold: i32) -> Self {
        Self {
            profiles,
            level_threshold,
        }
    }

    fn not_found(user_id: &str) -> ProfileError {
        ProfileError::not_found("Profile", user_id)
    }

    /// 为用户创建档案，每个用户只能有一个
    #[instrument(skip(self, caller, contact, image))]
    pub async fn create_profile(
        &self,
        caller: &AuthUser,
        user_id: &str,
        contact: ContactInfo,
        image: Option<String>,
    ) -> Result<Profile> {
        caller.ensure_owner(user_id, "create_profile")?;
        validation::validate_contact(&contact)?;

        if self.profiles.find_by_user_id(user_id).await?.is_some() {
            return Err(ProfileError::AlreadyExists {
                entity: "Profile".to_string(),
                field: "user_id".to_string(),
                value: user_id.to_string(),
            });
        }

        let image = image.filter(|i| !i.trim().is_empty());
        let created = self
            .profiles
            .create(&Profile::new(user_id, contact, image))
            .await?;

        info!(user_id, profile_id = %created.profile_id, "档案已创建");
        Ok(created)
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<Profile> {
        self.profiles
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| Self::not_found(user_id))
    }

    #[instrument(skip(self, caller, contact))]
    pub async fn update_profile(
        &self,
        caller: &AuthUser,
        user_id: &str,
        contact: ContactInfo,
    ) -> Result<Profile> {
        caller.ensure_owner(user_id, "update_profile")?;
        validation::validate_contact(&contact)?;

        let updated = self
            .profiles
            .update_contact(user_id, &contact)
            .await?
            .ok_or_else(|| Self::not_found(user_id))?;

        info!(user_id, "档案资料已更新");
        Ok(updated)
    }

    #[instrument(skip(self, caller, data))]
    pub async fn update_fiscal_data(
        &self,
        caller: &AuthUser,
        user_id: &str,
        data: FiscalData,
    ) -> Result<Profile> {
        caller.ensure_owner(user_id, "update_fiscal_data")?;
        validation::validate_fiscal_data(&data)?;

        let updated = self
            .profiles
            .update_fiscal_data(user_id, &data)
            .await?
            .ok_or_else(|| Self::not_found(user_id))?;

        info!(user_id, "税务信息已更新");
        Ok(updated)
    }

    #[instrument(skip(self, caller, image))]
    pub async fn update_image(
        &self,
        caller: &AuthUser,
        user_id: &str,
        image: &str,
    ) -> Result<Profile> {
        caller.ensure_owner(user_id, "update_image")?;
        validation::validate_image(image)?;

        self.profiles
            .update_image(user_id, image)
            .await?
            .ok_or_else(|| Self::not_found(user_id))
    }

    /// 直接设置等级与积分
    ///
    /// 与异步升级不同，这里传入的积分超过阈值时会被清零后再写入。
    #[instrument(skip(self, caller))]
    pub async fn update_level(
        &self,
        caller: &AuthUser,
        user_id: &str,
        level: i32,
        points: i32,
    ) -> Result<Profile> {
        caller.ensure_owner(user_id, "update_level")?;

        if level < 0 {
            return Err(ProfileError::Validation(format!(
                "profileLevel 不能为负数，实际为 {level}"
            )));
        }
        if points < 0 {
            return Err(ProfileError::Validation(format!(
                "profilePoints 不能为负数，实际为 {points}"
            )));
        }

        let points = if points > self.level_threshold { 0 } else { points };

        let updated = self
            .profiles
            .set_level_and_points(user_id, level, points)
            .await?
            .ok_or_else(|| Self::not_found(user_id))?;

        info!(user_id, level, points, "等级已直接设置");
        Ok(updated)
    }

    #[instrument(skip(self, caller))]
    pub async fn delete_profile(&self, caller: &AuthUser, user_id: &str) -> Result<()> {
        caller.ensure_owner(user_id, "delete_profile")?;

        if !self.profiles.delete(user_id).await? {
            return Err(Self::not_found(user_id));
        }

        info!(user_id, "档案已删除");
        Ok(())
    }
}

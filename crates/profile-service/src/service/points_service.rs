//! 积分服务
//!
//! 累加积分并发布积分变更事件，等级不在这里同步修改。
//!
//! ## 流程
//!
//! 1. 按 user_id 读取档案 -> 2. 校验调用方是档案本人 -> 3. 校验增量
//!    -> 4. 原子累加 -> 5. 发布事件（失败返回错误，已写入的积分不回滚）

use std::sync::Arc;

use profile_shared::error::{ProfileError, Result};
use profile_shared::events::{PointsEvent, PointsPublisher};
use profile_shared::observability::metrics;
use tracing::{error, info, instrument};

use crate::auth::AuthUser;
use crate::models::Profile;
use crate::repository::ProfileRepositoryTrait;
use crate::service::validation;

/// 积分服务
///
/// 发布器是必需的构造参数，不存在"未配置发布器"的运行时分支。
pub struct PointsService {
    profiles: Arc<dyn ProfileRepositoryTrait>,
    publisher: Arc<dyn PointsPublisher>,
}

impl PointsService {
    pub fn new(
        profiles: Arc<dyn ProfileRepositoryTrait>,
        publisher: Arc<dyn PointsPublisher>,
    ) -> Self {
        Self {
            profiles,
            publisher,
        }
    }

    /// 给用户积分加上 `delta`，返回累加后的档案
    #[instrument(skip(self, caller), fields(caller = %caller.user_id))]
    pub async fn update_points(
        &self,
        caller: &AuthUser,
        user_id: &str,
        delta: i32,
    ) -> Result<Profile> {
        let profile = self
            .profiles
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| ProfileError::not_found("Profile", user_id))?;

        caller.ensure_owner(&profile.user_id, "update_points")?;
        validation::validate_points_delta(delta)?;

        // 读取与写入之间档案可能被删除，此时同样视为不存在
        let updated = self
            .profiles
            .increment_points(user_id, delta)
            .await?
            .ok_or_else(|| ProfileError::not_found("Profile", user_id))?;

        metrics::record_points_update("success");
        info!(
            user_id,
            delta,
            points = updated.points,
            "积分已累加"
        );

        let event = PointsEvent::new(
            &updated.user_id,
            updated.profile_id.to_string(),
            updated.points,
        );

        if let Err(e) = self.publisher.publish(&event).await {
            metrics::record_points_event_published("failed");
            error!(
                user_id,
                points = updated.points,
                error = %e,
                "积分事件发布失败，已写入的积分不会回滚"
            );
            return Err(e);
        }
        metrics::record_points_event_published("success");

        Ok(updated)
    }
}

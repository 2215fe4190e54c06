//! 等级事件处理器
//!
//! 事件里的积分只用于日志，判定一律基于重新读取的档案。

use std::sync::Arc;

use profile_shared::events::PointsEvent;
use profile_shared::observability::metrics;
use tracing::{debug, info, instrument, warn};

use super::error::LevelWorkerError;
use super::evaluator::{LevelDecision, LevelEvaluator};
use crate::repository::ProfileRepositoryTrait;

pub struct LevelProcessor {
    profiles: Arc<dyn ProfileRepositoryTrait>,
    evaluator: LevelEvaluator,
}

impl LevelProcessor {
    pub fn new(profiles: Arc<dyn ProfileRepositoryTrait>, evaluator: LevelEvaluator) -> Self {
        Self {
            profiles,
            evaluator,
        }
    }

    pub fn evaluator(&self) -> &LevelEvaluator {
        &self.evaluator
    }

    /// 处理一条积分事件
    ///
    /// 条件写入未命中时返回 `ConcurrentUpdate`，不会在本次处理内重试。
    #[instrument(skip(self, event), fields(user_id = %event.user_id))]
    pub async fn process(&self, event: &PointsEvent) -> Result<LevelDecision, LevelWorkerError> {
        let profile = self
            .profiles
            .find_by_user_id(&event.user_id)
            .await?
            .ok_or_else(|| LevelWorkerError::ProfileNotFound {
                user_id: event.user_id.clone(),
            })?;

        if profile.profile_id.to_string() != event.profile_id {
            warn!(
                event_profile_id = %event.profile_id,
                current_profile_id = %profile.profile_id,
                "事件中的 profileId 与当前档案不一致，按当前档案评估"
            );
        }

        let decision = self.evaluator.evaluate(&profile);
        let LevelDecision::LevelUp { from, to } = decision else {
            debug!(
                points = profile.points,
                event_points = event.profile_points,
                level = profile.level,
                "未达到升级条件"
            );
            return Ok(decision);
        };

        let applied = self
            .profiles
            .set_level_if_unchanged(&profile.user_id, from, to, profile.points)
            .await?;

        if !applied {
            return Err(LevelWorkerError::ConcurrentUpdate {
                user_id: profile.user_id,
                expected_level: from,
            });
        }

        metrics::record_level_up(to);
        info!(
            from,
            to,
            points = profile.points,
            "用户等级已提升"
        );
        Ok(decision)
    }
}

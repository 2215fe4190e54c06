//! 等级判定
//!
//! 纯函数，不访问存储。

use profile_shared::config::{LevelConfig, LevelPolicy};

use crate::models::Profile;

/// 一次评估的结论
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelDecision {
    Unchanged,
    LevelUp { from: i32, to: i32 },
}

/// 等级评估器
#[derive(Debug, Clone, Copy)]
pub struct LevelEvaluator {
    threshold: i32,
    policy: LevelPolicy,
}

impl LevelEvaluator {
    pub fn new(threshold: i32, policy: LevelPolicy) -> Self {
        Self { threshold, policy }
    }

    pub fn from_config(config: &LevelConfig) -> Self {
        Self::new(config.threshold, config.policy)
    }

    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    pub fn policy(&self) -> LevelPolicy {
        self.policy
    }

    /// 根据档案的当前状态判断是否升一级
    ///
    /// - `Legacy`：积分严格大于阈值即升级
    /// - `Crossing`：另外要求上次升级后新增的积分也严格大于阈值
    pub fn evaluate(&self, profile: &Profile) -> LevelDecision {
        if profile.points <= self.threshold {
            return LevelDecision::Unchanged;
        }

        let crossed = match self.policy {
            LevelPolicy::Legacy => true,
            LevelPolicy::Crossing => profile.points_since_last_level_up() > self.threshold,
        };

        if !crossed {
            return LevelDecision::Unchanged;
        }

        LevelDecision::LevelUp {
            from: profile.level,
            to: profile.level.saturating_add(1),
        }
    }
}

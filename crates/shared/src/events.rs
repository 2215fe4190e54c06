//! 事件模型与发布抽象
//!
//! 定义积分变更事件的消息格式，以及 `PointsPublisher` trait。
//! 积分写入方只依赖该 trait，具体走 Kafka 还是测试用的内存记录由构造方决定。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProfileError;

/// 积分变更事件
///
/// 积分累加成功后发布，等级评估 Worker 消费后重新读取 profile 判定是否升级。
/// 消息体只是一个提示，Worker 不信任其中的积分值。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsEvent {
    pub user_id: String,
    pub profile_id: String,
    /// 累加后的积分总数
    pub profile_points: i32,
}

impl PointsEvent {
    pub fn new(user_id: impl Into<String>, profile_id: impl Into<String>, points: i32) -> Self {
        Self {
            user_id: user_id.into(),
            profile_id: profile_id.into(),
            profile_points: points,
        }
    }

    /// 以 user_id 作为消息 key，保证同一用户的事件落在同一分区内有序
    pub fn key(&self) -> &str {
        &self.user_id
    }
}

/// 积分事件发布接口
#[async_trait]
pub trait PointsPublisher: Send + Sync {
    async fn publish(&self, event: &PointsEvent) -> Result<(), ProfileError>;
}

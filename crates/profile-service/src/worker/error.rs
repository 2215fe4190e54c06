//! 等级 Worker 专用错误类型

use profile_shared::error::ProfileError;

/// 等级评估错误
///
/// 所有错误都只记录日志，消息不会重投。
#[derive(Debug, thiserror::Error)]
pub enum LevelWorkerError {
    #[error("积分事件格式错误: {0}")]
    MalformedEvent(String),

    /// 事件发出后档案已被删除
    #[error("档案不存在: {user_id}")]
    ProfileNotFound { user_id: String },

    /// 读取与条件写入之间等级已被其他写入修改
    #[error("等级并发修改: user_id={user_id} expected_level={expected_level}")]
    ConcurrentUpdate { user_id: String, expected_level: i32 },

    #[error("等级评估超时: {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error(transparent)]
    Shared(#[from] ProfileError),
}

impl LevelWorkerError {
    /// 指标中使用的结果标签
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::MalformedEvent(_) => "malformed",
            Self::ProfileNotFound { .. } => "skipped",
            Self::ConcurrentUpdate { .. } => "conflict",
            Self::Timeout { .. } => "timeout",
            Self::Shared(_) => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LevelWorkerError::ProfileNotFound {
            user_id: "u-1".to_string(),
        };
        assert_eq!(err.to_string(), "档案不存在: u-1");

        let err = LevelWorkerError::ConcurrentUpdate {
            user_id: "u-1".to_string(),
            expected_level: 3,
        };
        assert_eq!(err.to_string(), "等级并发修改: user_id=u-1 expected_level=3");

        let err = LevelWorkerError::Shared(ProfileError::Kafka("broker 不可达".to_string()));
        assert_eq!(err.to_string(), "Kafka 错误: broker 不可达");
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(
            LevelWorkerError::MalformedEvent("x".to_string()).outcome(),
            "malformed"
        );
        assert_eq!(
            LevelWorkerError::Timeout { timeout_ms: 10 }.outcome(),
            "timeout"
        );
        assert_eq!(
            LevelWorkerError::Shared(ProfileError::Internal("x".to_string())).outcome(),
            "failed"
        );
    }
}

//! 积分事件消费者
//!
//! 订阅积分 topic，每条消息在独立的 span 内处理并受超时限制。
//! 消费者开启自动提交，处理失败的消息只记录日志。

use std::time::{Duration, Instant};

use profile_shared::config::AppConfig;
use profile_shared::events::PointsEvent;
use profile_shared::kafka::{ConsumerMessage, KafkaConsumer};
use profile_shared::observability::{metrics, tracing::set_parent_from_headers};
use tokio::sync::watch;
use tracing::{Instrument, error, info, info_span, warn};

use super::error::LevelWorkerError;
use super::evaluator::LevelDecision;
use super::processor::LevelProcessor;

/// 等级评估消费者
pub struct LevelConsumer {
    consumer: KafkaConsumer,
    processor: LevelProcessor,
    topic: String,
    event_timeout: Duration,
}

impl LevelConsumer {
    pub fn new(config: &AppConfig, processor: LevelProcessor) -> Result<Self, LevelWorkerError> {
        let consumer = KafkaConsumer::new(&config.kafka, Some("level"))?;
        Ok(Self {
            consumer,
            processor,
            topic: config.kafka.points_topic.clone(),
            event_timeout: Duration::from_millis(config.worker.event_timeout_ms),
        })
    }

    /// 启动消费循环，直到收到 shutdown 信号
    pub async fn run(self, shutdown: watch::Receiver<bool>) -> Result<(), LevelWorkerError> {
        self.consumer.subscribe(&[self.topic.as_str()])?;

        info!(
            topic = %self.topic,
            threshold = self.processor.evaluator().threshold(),
            policy = ?self.processor.evaluator().policy(),
            "等级评估消费者已启动"
        );

        let processor = self.processor;
        let timeout = self.event_timeout;

        self.consumer
            .start(shutdown, |msg| {
                let processor = &processor;
                async move {
                    if let Err(e) = handle_message(processor, &msg, timeout).await {
                        error!(
                            error = %e,
                            topic = %msg.topic,
                            partition = msg.partition,
                            offset = msg.offset,
                            "处理积分事件失败"
                        );
                    }
                    Ok(())
                }
            })
            .await;

        info!("等级评估消费者已停止");
        Ok(())
    }
}

/// 处理单条消息：反序列化 -> 限时评估 -> 记录指标
pub async fn handle_message(
    processor: &LevelProcessor,
    msg: &ConsumerMessage,
    timeout: Duration,
) -> Result<LevelDecision, LevelWorkerError> {
    let span = info_span!(
        "level_event",
        topic = %msg.topic,
        partition = msg.partition,
        offset = msg.offset,
    );
    set_parent_from_headers(&span, &msg.headers);

    let started = Instant::now();
    let result: Result<LevelDecision, LevelWorkerError> = async {
        let event: PointsEvent = msg.deserialize_payload().map_err(|e| {
            warn!(error = %e, "积分事件无法解析，丢弃");
            LevelWorkerError::MalformedEvent(e.to_string())
        })?;

        tokio::time::timeout(timeout, processor.process(&event))
            .await
            .map_err(|_| LevelWorkerError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            })?
    }
    .instrument(span)
    .await;

    let outcome = match &result {
        Ok(LevelDecision::LevelUp { .. }) => "leveled_up",
        Ok(LevelDecision::Unchanged) => "unchanged",
        Err(e) => e.outcome(),
    };
    metrics::record_level_event(outcome, started.elapsed().as_secs_f64());

    result
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::{ContactInfo, Profile};
    use crate::repository::MemoryStore;
    use crate::worker::LevelEvaluator;
    use profile_shared::config::LevelPolicy;
    use profile_shared::kafka::topics;

    fn setup(points: i32) -> (MemoryStore, LevelProcessor, Profile) {
        let store = MemoryStore::new();
        let mut profile = Profile::new(
            "u-1",
            ContactInfo {
                profile_name: "Ana".to_string(),
                profile_mail: "ana@example.com".to_string(),
                phone: "1155667788".to_string(),
            },
            None,
        );
        profile.points = points;
        store.insert_profile(profile.clone());
        let processor = LevelProcessor::new(
            Arc::new(store.clone()),
            LevelEvaluator::new(1000, LevelPolicy::Crossing),
        );
        (store, processor, profile)
    }

    fn message(event: &PointsEvent) -> ConsumerMessage {
        ConsumerMessage::from_payload(
            topics::POINTS_EVENTS,
            serde_json::to_vec(event).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_handle_message_levels_up() {
        let (store, processor, profile) = setup(1200);
        let event = PointsEvent::new("u-1", profile.profile_id.to_string(), 1200);

        let decision = handle_message(&processor, &message(&event), Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(decision, LevelDecision::LevelUp { from: 0, to: 1 });
        assert_eq!(store.profile("u-1").unwrap().level, 1);
    }

    #[tokio::test]
    async fn test_redelivery_is_noop() {
        let (store, processor, profile) = setup(1200);
        let msg = message(&PointsEvent::new("u-1", profile.profile_id.to_string(), 1200));

        handle_message(&processor, &msg, Duration::from_secs(1))
            .await
            .unwrap();
        let decision = handle_message(&processor, &msg, Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(decision, LevelDecision::Unchanged);
        assert_eq!(store.profile("u-1").unwrap().level, 1);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_dropped() {
        let (store, processor, _) = setup(1200);
        let msg = ConsumerMessage::from_payload(topics::POINTS_EVENTS, b"not json".to_vec());

        let err = handle_message(&processor, &msg, Duration::from_secs(1))
            .await
            .unwrap_err();

        assert!(matches!(err, LevelWorkerError::MalformedEvent(_)));
        assert_eq!(store.profile("u-1").unwrap().level, 0);
    }

    #[tokio::test]
    async fn test_event_without_profile_points_is_malformed() {
        let (_, processor, _) = setup(1200);
        let msg = ConsumerMessage::from_payload(
            topics::POINTS_EVENTS,
            br#"{"userId":"u-1","profileId":"p-1"}"#.to_vec(),
        );

        let err = handle_message(&processor, &msg, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(err.outcome(), "malformed");
    }
}

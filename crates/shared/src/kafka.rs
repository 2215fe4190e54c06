//! Kafka 基础设施封装
//!
//! 将 rdkafka 的底层 API 封装为 Producer/Consumer 抽象，
//! 统一消息序列化、错误映射和优雅关闭语义。

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::{BorrowedMessage, Header, Headers, Message, OwnedHeaders};
use rdkafka::producer::{FutureProducer, FutureRecord};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::KafkaConfig;
use crate::error::ProfileError;
use crate::events::{PointsEvent, PointsPublisher};
use crate::observability::tracing as tracing_ctx;

/// topic 名称常量
pub mod topics {
    /// 积分变更事件，与旧的队列名保持一致
    pub const POINTS_EVENTS: &str = "direct_profile";
}

// ---------------------------------------------------------------------------
// ConsumerMessage
// ---------------------------------------------------------------------------

/// 消费到的 Kafka 消息
///
/// `BorrowedMessage` 带生命周期约束，这里转换为拥有所有权的结构体，
/// 以便跨 await 点传给异步处理函数。
#[derive(Debug, Clone)]
pub struct ConsumerMessage {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub key: Option<String>,
    pub payload: Vec<u8>,
    pub timestamp: Option<i64>,
    pub headers: HashMap<String, String>,
}

impl ConsumerMessage {
    fn from_borrowed(msg: &BorrowedMessage<'_>) -> Self {
        let key = msg
            .key()
            .and_then(|k| std::str::from_utf8(k).ok())
            .map(String::from);

        let payload = msg.payload().map(|p| p.to_vec()).unwrap_or_default();

        let mut headers = HashMap::new();
        if let Some(h) = msg.headers() {
            for idx in 0..h.count() {
                let header = h.get(idx);
                if let Some(raw) = header.value
                    && let Ok(value) = std::str::from_utf8(raw)
                {
                    headers.insert(header.key.to_string(), value.to_string());
                }
            }
        }

        Self {
            topic: msg.topic().to_string(),
            partition: msg.partition(),
            offset: msg.offset(),
            key,
            payload,
            timestamp: msg.timestamp().to_millis(),
            headers,
        }
    }

    /// 直接由 topic 和负载构造，主要用于测试
    pub fn from_payload(topic: &str, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.to_string(),
            partition: 0,
            offset: 0,
            key: None,
            payload: payload.into(),
            timestamp: None,
            headers: HashMap::new(),
        }
    }

    /// 将负载视为 UTF-8 字符串返回
    pub fn payload_str(&self) -> Result<&str, ProfileError> {
        std::str::from_utf8(&self.payload)
            .map_err(|e| ProfileError::Kafka(format!("负载非 UTF-8 编码: {e}")))
    }

    /// 将 JSON 格式负载反序列化为目标类型
    pub fn deserialize_payload<T: DeserializeOwned>(&self) -> Result<T, ProfileError> {
        serde_json::from_slice(&self.payload)
            .map_err(|e| ProfileError::Kafka(format!("负载反序列化失败: {e}")))
    }
}

// ---------------------------------------------------------------------------
// KafkaProducer
// ---------------------------------------------------------------------------

/// Kafka 生产者
///
/// `FutureProducer` 内部是 Arc 包装的，可以直接 Clone。
#[derive(Clone)]
pub struct KafkaProducer {
    producer: FutureProducer,
}

impl KafkaProducer {
    /// 根据配置创建生产者
    ///
    /// `message.timeout.ms` 为 5 秒，超时即返回错误给调用方。
    pub fn new(config: &KafkaConfig) -> Result<Self, ProfileError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("message.timeout.ms", "5000")
            .create()
            .map_err(|e| ProfileError::Kafka(format!("创建生产者失败: {e}")))?;

        info!(brokers = %config.brokers, "Kafka 生产者已初始化");
        Ok(Self { producer })
    }

    /// 发送原始字节消息
    pub async fn send(
        &self,
        topic: &str,
        key: &str,
        payload: &[u8],
    ) -> Result<(i32, i64), ProfileError> {
        self.send_with_headers(topic, key, payload, &HashMap::new())
            .await
    }

    /// 发送带消息头的原始字节消息
    pub async fn send_with_headers(
        &self,
        topic: &str,
        key: &str,
        payload: &[u8],
        headers: &HashMap<String, String>,
    ) -> Result<(i32, i64), ProfileError> {
        let mut owned = OwnedHeaders::new_with_capacity(headers.len());
        for (name, value) in headers {
            owned = owned.insert(Header {
                key: name.as_str(),
                value: Some(value.as_bytes()),
            });
        }

        let record = FutureRecord::to(topic)
            .key(key)
            .payload(payload)
            .headers(owned);

        let delivery = self
            .producer
            .send(record, Duration::from_secs(5))
            .await
            .map_err(|(e, _)| ProfileError::Kafka(format!("发送消息失败: {e}")))?;

        debug!(
            topic,
            key,
            partition = delivery.partition,
            offset = delivery.offset,
            "消息已发送"
        );
        Ok((delivery.partition, delivery.offset))
    }

    /// 将值序列化为 JSON 后发送，并附带当前 span 的追踪上下文
    pub async fn send_json<T: Serialize>(
        &self,
        topic: &str,
        key: &str,
        value: &T,
    ) -> Result<(i32, i64), ProfileError> {
        let payload = serde_json::to_vec(value)
            .map_err(|e| ProfileError::Kafka(format!("序列化失败: {e}")))?;

        let mut headers = HashMap::new();
        tracing_ctx::inject_to_headers(&mut headers);

        self.send_with_headers(topic, key, &payload, &headers).await
    }
}

/// 把积分事件发到指定 topic 的发布器
#[derive(Clone)]
pub struct KafkaPointsPublisher {
    producer: KafkaProducer,
    topic: String,
}

impl KafkaPointsPublisher {
    pub fn new(producer: KafkaProducer, topic: impl Into<String>) -> Self {
        Self {
            producer,
            topic: topic.into(),
        }
    }
}

#[async_trait]
impl PointsPublisher for KafkaPointsPublisher {
    async fn publish(&self, event: &PointsEvent) -> Result<(), ProfileError> {
        let (partition, offset) = self
            .producer
            .send_json(&self.topic, event.key(), event)
            .await?;

        info!(
            user_id = %event.user_id,
            points = event.profile_points,
            partition,
            offset,
            "积分事件已发布"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// KafkaConsumer
// ---------------------------------------------------------------------------

/// Kafka 消费者
///
/// 开启自动提交：消息拉取后即视为已确认，处理失败不会重投（至多一次）。
pub struct KafkaConsumer {
    consumer: StreamConsumer,
}

impl KafkaConsumer {
    /// 创建消费者
    ///
    /// `group_id_suffix` 用于同一服务内的不同消费逻辑，例如 "profile-service.level"。
    pub fn new(config: &KafkaConfig, group_id_suffix: Option<&str>) -> Result<Self, ProfileError> {
        let group_id = match group_id_suffix {
            Some(suffix) => format!("{}.{}", config.consumer_group, suffix),
            None => config.consumer_group.clone(),
        };

        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &group_id)
            .set("auto.offset.reset", &config.auto_offset_reset)
            .set("enable.auto.commit", "true")
            .create()
            .map_err(|e| ProfileError::Kafka(format!("创建消费者失败: {e}")))?;

        info!(brokers = %config.brokers, group_id, "Kafka 消费者已初始化");
        Ok(Self { consumer })
    }

    /// 订阅指定的 topic 列表
    pub fn subscribe(&self, topics: &[&str]) -> Result<(), ProfileError> {
        self.consumer
            .subscribe(topics)
            .map_err(|e| ProfileError::Kafka(format!("订阅 topic 失败: {e}")))?;

        info!(?topics, "已订阅 Kafka topics");
        Ok(())
    }

    /// 启动消费循环
    ///
    /// handler 返回错误只记录日志，不中断循环。
    /// 关闭信号变为 `true` 时退出；正在处理的消息会先处理完，再检查关闭信号。
    pub async fn start<F, Fut>(self, mut shutdown: watch::Receiver<bool>, handler: F)
    where
        F: Fn(ConsumerMessage) -> Fut,
        Fut: std::future::Future<Output = Result<(), ProfileError>>,
    {
        use futures::StreamExt;

        let stream = self.consumer.stream();
        futures::pin_mut!(stream);

        info!("Kafka 消费循环已启动");

        loop {
            tokio::select! {
                biased;

                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("收到关闭信号，Kafka 消费循环退出");
                        break;
                    }
                }

                msg_result = stream.next() => {
                    let Some(msg_result) = msg_result else {
                        warn!("Kafka 消息流意外结束");
                        break;
                    };

                    match msg_result {
                        Ok(borrowed_msg) => {
                            let msg = ConsumerMessage::from_borrowed(&borrowed_msg);
                            debug!(
                                topic = %msg.topic,
                                partition = msg.partition,
                                offset = msg.offset,
                                "收到 Kafka 消息"
                            );

                            if let Err(e) = handler(msg).await {
                                error!(error = %e, "处理 Kafka 消息失败");
                            }
                        }
                        Err(e) => {
                            error!(error = %e, "接收 Kafka 消息出错");
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_constants() {
        assert_eq!(topics::POINTS_EVENTS, "direct_profile");
    }

    #[test]
    fn test_deserialize_points_event() {
        let msg = ConsumerMessage::from_payload(
            topics::POINTS_EVENTS,
            r#"{"userId":"u-001","profileId":"p-001","profilePoints":1050}"#,
        );

        let event: PointsEvent = msg.deserialize_payload().unwrap();
        assert_eq!(event, PointsEvent::new("u-001", "p-001", 1050));
    }

    #[test]
    fn test_deserialize_invalid_json() {
        let msg = ConsumerMessage::from_payload("events", "not json");

        let result: Result<PointsEvent, _> = msg.deserialize_payload();
        let err = result.unwrap_err();
        assert_eq!(err.code(), "KAFKA_ERROR");
    }

    #[test]
    fn test_payload_str() {
        let msg = ConsumerMessage::from_payload("test", "hello world");
        assert_eq!(msg.payload_str().unwrap(), "hello world");

        let msg = ConsumerMessage::from_payload("test", vec![0xFF, 0xFE]);
        assert!(msg.payload_str().is_err());
    }

    #[test]
    fn test_consumer_message_fields() {
        let msg = ConsumerMessage {
            topic: "direct_profile".to_string(),
            partition: 2,
            offset: 42,
            key: Some("user-1".to_string()),
            payload: b"{}".to_vec(),
            timestamp: Some(1_700_000_000_000),
            headers: HashMap::from([("x-request-id".to_string(), "abc-123".to_string())]),
        };

        assert_eq!(msg.key.as_deref(), Some("user-1"));
        assert_eq!(msg.headers.get("x-request-id").map(String::as_str), Some("abc-123"));
    }
}

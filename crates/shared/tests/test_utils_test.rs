//! test_utils 模块的集成测试

use profile_shared::events::{PointsEvent, PointsPublisher};
use profile_shared::test_utils::*;

#[test]
fn test_database_config_defaults() {
    let config = test_database_config();
    assert!(config.url.starts_with("postgres://"));
    assert_eq!(config.max_connections, 5);
    assert!(config.run_migrations);
}

#[test]
fn test_user_ids_are_unique() {
    let a = test_user_id();
    let b = test_user_id();
    assert!(a.starts_with("test-user-"));
    assert_ne!(a, b);
}

#[tokio::test]
async fn test_recording_publisher_keeps_order() {
    let publisher = RecordingPublisher::new();

    publisher
        .publish(&PointsEvent::new("u-1", "p-1", 10))
        .await
        .unwrap();
    publisher
        .publish(&PointsEvent::new("u-1", "p-1", 30))
        .await
        .unwrap();

    let points: Vec<i32> = publisher
        .events()
        .await
        .iter()
        .map(|e| e.profile_points)
        .collect();
    assert_eq!(points, vec![10, 30]);
}

#[tokio::test]
async fn test_recording_publisher_clones_share_events() {
    let publisher = RecordingPublisher::new();
    let handle = publisher.clone();

    publisher
        .publish(&PointsEvent::new("u-2", "p-2", 5))
        .await
        .unwrap();

    assert_eq!(handle.drain().await.len(), 1);
    assert!(publisher.events().await.is_empty());
}

#[tokio::test]
async fn test_failing_publisher() {
    let publisher = RecordingPublisher::failing();

    let err = publisher
        .publish(&PointsEvent::new("u-3", "p-3", 1))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "KAFKA_ERROR");
    assert!(publisher.events().await.is_empty());

    publisher.set_failing(false);
    publisher
        .publish(&PointsEvent::new("u-3", "p-3", 2))
        .await
        .unwrap();
    assert_eq!(publisher.events().await.len(), 1);
}

//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取。

use anyhow::Result;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::OnceLock;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::ObservabilityConfig;

/// 全局 Prometheus handle，用于渲染指标
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics 资源守卫
pub struct MetricsHandle {
    _server_handle: tokio::task::JoinHandle<()>,
}

/// 初始化 Prometheus 指标导出
///
/// 在 `metrics_port` 上启动独立的 HTTP 服务器暴露 `/metrics`。
pub async fn init(config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    let _ = PROMETHEUS_HANDLE.set(handle.clone());

    register_common_metrics(&config.service_name);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let server_handle = start_metrics_server(addr, handle).await?;

    Ok(MetricsHandle {
        _server_handle: server_handle,
    })
}

fn register_common_metrics(service_name: &str) {
    metrics::describe_counter!("http_requests_total", "Total number of HTTP requests");
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );

    metrics::describe_counter!("points_updates_total", "Total number of point increments");
    metrics::describe_counter!(
        "points_events_published_total",
        "Total number of published points events"
    );
    metrics::describe_counter!(
        "level_events_total",
        "Total number of consumed points events by outcome"
    );
    metrics::describe_histogram!(
        "level_event_duration_seconds",
        "Level evaluation duration in seconds"
    );
    metrics::describe_counter!("level_ups_total", "Total number of applied level-ups");

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

async fn start_metrics_server(
    addr: SocketAddr,
    handle: PrometheusHandle,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = Router::new()
        .route("/metrics", get(move || std::future::ready(handle.render())))
        .route("/health", get(|| async { "OK" }));

    let listener = TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(server_handle)
}

/// 获取全局 Prometheus handle
pub fn get_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

// ============================================================================
// 指标记录函数
// ============================================================================

/// 记录 HTTP 请求
#[inline]
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let status_str = status.to_string();
    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str.clone()
    )
    .increment(1);

    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str
    )
    .record(duration_secs);
}

/// 记录积分累加
#[inline]
pub fn record_points_update(status: &str) {
    metrics::counter!("points_updates_total", "status" => status.to_string()).increment(1);
}

/// 记录积分事件发布
#[inline]
pub fn record_points_event_published(status: &str) {
    metrics::counter!("points_events_published_total", "status" => status.to_string())
        .increment(1);
}

/// 记录一次等级评估，outcome 如 leveled_up / unchanged / skipped / conflict / failed
#[inline]
pub fn record_level_event(outcome: &str, duration_secs: f64) {
    metrics::counter!("level_events_total", "outcome" => outcome.to_string()).increment(1);
    metrics::histogram!("level_event_duration_seconds", "outcome" => outcome.to_string())
        .record(duration_secs);
}

/// 记录升级
#[inline]
pub fn record_level_up(new_level: i32) {
    metrics::counter!("level_ups_total", "level" => new_level.to_string()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_functions_do_not_panic() {
        // 未安装 recorder 时也不应 panic
        record_http_request("GET", "/api/profiles/u-1", 200, 0.1);
        record_points_update("success");
        record_points_event_published("failed");
        record_level_event("leveled_up", 0.01);
        record_level_up(2);
        assert!(get_handle().is_none());
    }
}

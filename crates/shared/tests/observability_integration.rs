//! 可观测性模块集成测试
//!
//! 覆盖指标记录、追踪上下文传播、请求 ID 与配置。

use std::collections::HashMap;

// ============================================================================
// 指标记录测试
// ============================================================================

mod metrics_tests {
    use profile_shared::observability::metrics::{
        record_http_request, record_level_event, record_level_up, record_points_event_published,
        record_points_update,
    };

    #[test]
    fn test_record_http_request() {
        record_http_request("GET", "/api/profiles/{userId}", 200, 0.05);
        record_http_request("POST", "/api/profiles/{userId}/updateProfilePoints", 200, 0.12);
        record_http_request("DELETE", "/api/profiles/{userId}", 404, 0.01);
        record_http_request("POST", "/api/address/{id}/createAddress", 500, 0.25);
    }

    #[test]
    fn test_record_points_metrics() {
        record_points_update("success");
        record_points_event_published("success");
        record_points_event_published("failed");
    }

    #[test]
    fn test_record_level_metrics() {
        for outcome in ["leveled_up", "unchanged", "skipped", "conflict", "malformed", "timeout"] {
            record_level_event(outcome, 0.002);
        }
        record_level_up(1);
        record_level_up(i32::MAX);
    }
}

// ============================================================================
// 追踪上下文传播测试
// ============================================================================

mod tracing_tests {
    use super::*;
    use opentelemetry::trace::TraceContextExt;
    use profile_shared::observability::tracing::{
        current_trace_id, extract_from_headers, inject_to_headers, set_parent_from_headers,
    };

    #[test]
    fn test_extract_from_valid_traceparent() {
        let mut headers = HashMap::new();
        headers.insert(
            "traceparent".to_string(),
            "00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01".to_string(),
        );

        let context = extract_from_headers(&headers);
        let span_context = context.span().span_context().clone();

        assert!(span_context.is_valid());
        assert_eq!(
            span_context.trace_id().to_string(),
            "0af7651916cd43dd8448eb211c80319c"
        );
        assert_eq!(span_context.span_id().to_string(), "b7ad6b7169203331");
    }

    #[test]
    fn test_extract_from_malformed_traceparent() {
        let cases = [
            "",
            "00-",
            "00-0af7651916cd43dd8448eb211c80319c",
            "00-invalid-b7ad6b7169203331-01",
        ];

        for invalid in cases {
            let mut headers = HashMap::new();
            headers.insert("traceparent".to_string(), invalid.to_string());
            let context = extract_from_headers(&headers);
            assert!(!context.span().span_context().is_valid());
        }
    }

    #[test]
    fn test_inject_without_active_span_adds_nothing() {
        let mut headers = HashMap::new();
        inject_to_headers(&mut headers);
        assert!(!headers.contains_key("traceparent"));
    }

    #[test]
    fn test_set_parent_on_consumer_span() {
        let mut headers = HashMap::new();
        headers.insert(
            "traceparent".to_string(),
            "00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01".to_string(),
        );

        let span = tracing::info_span!("level_event");
        set_parent_from_headers(&span, &headers);
        set_parent_from_headers(&span, &HashMap::new());
    }

    #[test]
    fn test_current_trace_id_without_init() {
        assert!(current_trace_id().is_none());
    }
}

// ============================================================================
// 中间件测试
// ============================================================================

mod middleware_tests {
    use profile_shared::observability::middleware::RequestId;

    #[test]
    fn test_request_id() {
        let id = RequestId("req-123".to_string());
        assert_eq!(id.as_str(), "req-123");
        assert!(format!("{id:?}").contains("req-123"));
    }
}

// ============================================================================
// 配置测试
// ============================================================================

mod config_tests {
    use profile_shared::observability::ObservabilityConfig;

    #[test]
    fn test_default_config() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.service_name, "profile-service");
        assert_eq!(config.log_level, "info");
        assert!(!config.json_logs());
        assert!(config.otlp_endpoint().is_none());
    }

    #[test]
    fn test_otlp_endpoint_requires_tracing_enabled() {
        let mut config = ObservabilityConfig {
            tracing_endpoint: Some("http://localhost:4317".to_string()),
            ..Default::default()
        };
        assert!(config.otlp_endpoint().is_none());

        config.tracing_enabled = true;
        assert_eq!(config.otlp_endpoint(), Some("http://localhost:4317"));
    }

    #[test]
    fn test_with_service_name() {
        let config = ObservabilityConfig {
            log_format: "JSON".to_string(),
            ..Default::default()
        }
        .with_service_name("profile-worker");

        assert_eq!(config.service_name, "profile-worker");
        assert!(config.json_logs());
    }
}

// ============================================================================
// Guard 测试
// ============================================================================

mod guard_tests {
    use profile_shared::observability::ObservabilityGuard;

    #[test]
    fn test_empty_guard_drop() {
        for _ in 0..3 {
            drop(ObservabilityGuard::empty());
        }
    }
}

//! 用户档案服务
//!
//! 档案与地址的 REST API，同时在后台消费积分事件提升用户等级。

use std::sync::Arc;
use std::time::Duration;

use axum::{Json, http::HeaderValue, middleware, routing::get};
use profile_service::{
    AppState, build_router,
    auth::AuthClient,
    repository::{AddressRepository, ProfileRepository},
    service::{AddressService, PointsService, ProfileService},
    worker::{LevelConsumer, LevelEvaluator, LevelProcessor},
};
use profile_shared::{
    config::AppConfig,
    database::Database,
    kafka::{KafkaPointsPublisher, KafkaProducer},
    observability::{self, middleware as obs_middleware},
};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        eprintln!("读取 .env 失败: {e}");
    }

    let config = AppConfig::load("profile-service")?;

    let obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    let _guard = observability::init(&obs_config).await?;

    info!(
        environment = %config.environment,
        "Starting profile-service on {}",
        config.server_addr()
    );

    // 启动阶段连不上数据库直接退出
    let db = Database::connect(&config.database).await?;
    if config.database.run_migrations {
        db.run_migrations().await?;
    }

    let profile_repo = Arc::new(ProfileRepository::new(db.pool().clone()));
    let address_repo = Arc::new(AddressRepository::new(db.pool().clone()));

    let producer = KafkaProducer::new(&config.kafka)?;
    let publisher = Arc::new(KafkaPointsPublisher::new(
        producer,
        config.kafka.points_topic.clone(),
    ));

    let identity = Arc::new(AuthClient::new(&config.identity)?);

    let state = AppState::new(
        ProfileService::new(profile_repo.clone(), config.level.threshold),
        PointsService::new(profile_repo.clone(), publisher),
        AddressService::new(address_repo, profile_repo.clone()),
        identity,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let worker_handle = if config.worker.enabled {
        let processor = LevelProcessor::new(
            profile_repo,
            LevelEvaluator::from_config(&config.level),
        );
        let consumer = LevelConsumer::new(&config, processor)?;
        Some(tokio::spawn(async move {
            if let Err(e) = consumer.run(shutdown_rx).await {
                error!(error = %e, "等级评估消费者异常退出");
            }
        }))
    } else {
        warn!("等级评估 Worker 已禁用，积分事件不会被消费");
        None
    };

    // 生产环境应通过 PROFILE_CORS_ORIGINS 限定来源
    let cors = match std::env::var("PROFILE_CORS_ORIGINS") {
        Ok(origins) if origins != "*" => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        _ => {
            if config.is_production() {
                warn!("生产环境未限定 CORS 来源");
            }
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    };

    let app = build_router(state)
        .route(
            "/ready",
            get({
                let db_for_ready = db.clone();
                move || readiness_check(db_for_ready.clone())
            }),
        )
        .layer(TimeoutLayer::new(Duration::from_millis(
            config.server.request_timeout_ms,
        )))
        .layer(cors)
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id));

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // HTTP 停止后再通知消费者退出
    let _ = shutdown_tx.send(true);
    if let Some(handle) = worker_handle
        && let Err(e) = handle.await
    {
        error!(error = %e, "等待等级评估消费者退出失败");
    }

    db.close().await;
    info!("Server shutdown complete");

    Ok(())
}

/// 监听 SIGTERM 或 Ctrl+C
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "注册 Ctrl+C 处理器失败");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "注册 SIGTERM 处理器失败");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}

/// 就绪探针：数据库可用才接流量
async fn readiness_check(db: Database) -> Json<serde_json::Value> {
    let db_ok = db.health_check().await.is_ok();

    Json(serde_json::json!({
        "status": if db_ok { "ok" } else { "degraded" },
        "service": "profile-service",
        "checks": {
            "database": if db_ok { "ok" } else { "fail" }
        }
    }))
}

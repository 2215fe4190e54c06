//! 用户档案服务
//!
//! 提供档案与地址的 REST API，积分累加后通过 Kafka 异步触发等级评估。
//!
//! ## 模块结构
//!
//! - `models`: 档案与地址实体
//! - `repository`: PostgreSQL / 内存仓储
//! - `service`: 业务规则
//! - `worker`: 积分事件消费与等级提升
//! - `handlers` / `routes`: HTTP 接口

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;
pub mod worker;

pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;

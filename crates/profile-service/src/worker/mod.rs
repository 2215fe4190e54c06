//! 等级评估 Worker
//!
//! 消费积分变更事件，重新读取档案并按等级策略判断是否升级。
//! 升级通过条件更新写入，等级只会逐级加一。

pub mod consumer;
pub mod error;
pub mod evaluator;
pub mod processor;

pub use consumer::{LevelConsumer, handle_message};
pub use error::LevelWorkerError;
pub use evaluator::{LevelDecision, LevelEvaluator};
pub use processor::LevelProcessor;

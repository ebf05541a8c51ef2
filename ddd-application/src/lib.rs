//! DDD 应用层（ddd-application）
//!
//! 进程内的命令/事件调度核心：
//! - 处理器契约：`CommandHandler`、`EventHandler` 与共享的 `HandlerLifecycle`
//! - 处理器工厂注册表：命令一对一、事件一对多，注册完成后冻结只读
//! - 调度器：事务化生命周期（handle → commit/rollback）与深度优先的事件传播
//! - 启动器：组合注册表与调度器，提供强类型的 `handle_command` 入口
//!
pub mod bootstrapper;
pub mod command;
pub mod command_bus;
pub mod command_handler;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod event_handler;
pub mod lifecycle;
pub mod outcome;
pub mod registry;

pub use bootstrapper::Bootstrapper;
pub use command::Command;
pub use command_handler::CommandHandler;
pub use event_handler::EventHandler;
pub use lifecycle::HandlerLifecycle;

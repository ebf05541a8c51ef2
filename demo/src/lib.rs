//! 邮箱变更示例：命令处理器修改用户邮箱，事件处理器发送通知并继续发出 Slack 事件。

pub mod adapters;
pub mod bootstrap;
pub mod handlers;
pub mod model;

pub use bootstrap::{App, init_tracing};

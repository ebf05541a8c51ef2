use crate::{context::AppContext, error::AppError};
use async_trait::async_trait;
use ddd_domain::domain_event::EventEnvelope;

/// 处理器生命周期（事务钩子）
///
/// 命令处理器与事件处理器共享的收尾协议，由调度器驱动，处理器自身不应调用：
/// - `handle` 成功后调用 `commit`，落地暂存的副作用（提交事务、发送待发通知等）；
/// - `handle` 或 `commit` 失败后调用 `rollback`，丢弃暂存的副作用；
/// - `commit` 与 `rollback` 互斥，且各自至多调用一次；
/// - `take_events` 仅在 `commit` 成功后调用一次，按记录顺序取走事件。
#[async_trait]
pub trait HandlerLifecycle: Send {
    /// 提交暂存的副作用。失败时不得部分生效。
    async fn commit(&mut self, ctx: &AppContext) -> Result<(), AppError>;

    /// 丢弃暂存的副作用。即使没有暂存任何内容、或提交已部分执行，也必须可以安全调用。
    async fn rollback(&mut self, ctx: &AppContext) -> Result<(), AppError>;

    /// 取走本次处理期间记录的事件
    fn take_events(&mut self) -> Vec<EventEnvelope> {
        Vec::new()
    }
}

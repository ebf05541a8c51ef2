use crate::{command::Command, context::AppContext, error::AppError, lifecycle::HandlerLifecycle};
use async_trait::async_trait;

/// 命令处理器
///
/// 每次调度由工厂新建实例，`handle` 至多调用一次。
#[async_trait]
pub trait CommandHandler<C>: HandlerLifecycle
where
    C: Command,
{
    async fn handle(&mut self, ctx: &AppContext, cmd: C) -> Result<C::Output, AppError>;
}

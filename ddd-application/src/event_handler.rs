use crate::{context::AppContext, error::AppError, lifecycle::HandlerLifecycle};
use async_trait::async_trait;
use ddd_domain::domain_event::DomainEvent;

/// 事件处理器
///
/// 同一事件可以注册多个处理器，按注册顺序依次调用，彼此的失败互不影响。
/// 事件以引用传入，载荷在兄弟处理器之间共享。
#[async_trait]
pub trait EventHandler<E>: HandlerLifecycle
where
    E: DomainEvent,
{
    async fn handle(&mut self, ctx: &AppContext, event: &E) -> Result<(), AppError>;
}

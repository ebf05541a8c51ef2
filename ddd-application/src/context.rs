use ddd_domain::domain_event::{BusinessContext, EventEnvelope};
use tokio_util::sync::CancellationToken;

/// 应用层上下文（Application Context）
///
/// 承载一次应用层调用所需的横切信息，例如：
/// - 业务语境（`BusinessContext`）：关联追踪 `correlation_id`、因果链 `causation_id`、
///   执行者类型/ID 等；
/// - 幂等键（`idempotency_key`）：用于在基础设施层实现请求幂等；
/// - 取消令牌（`cancellation`）：调用方取消或超时后，进行中的 `handle`/`commit`
///   尽快失败并返回 `AppError::Cancelled`。
///
/// 典型用法：
/// ```rust
/// use ddd_application::context::AppContext;
/// use ddd_domain::domain_event::BusinessContext;
/// use tokio_util::sync::CancellationToken;
///
/// let token = CancellationToken::new();
/// let ctx = AppContext {
///     biz: BusinessContext::builder()
///         .maybe_correlation_id(Some("cor-123".into()))
///         .maybe_actor_type(Some("user".into()))
///         .maybe_actor_id(Some("u-1".into()))
///         .build(),
///     idempotency_key: Some("idem-xyz".into()),
///     cancellation: token.clone(),
/// };
/// assert!(!ctx.is_cancelled());
/// token.cancel();
/// assert!(ctx.is_cancelled());
/// ```
#[derive(Clone, Debug, Default)]
pub struct AppContext {
    /// 业务语境（链路追踪、审计主体、操作因果）
    pub biz: BusinessContext,
    /// 幂等键（可选）：为空则由上层或基础设施决定是否参与幂等
    pub idempotency_key: Option<String>,
    /// 取消令牌
    pub cancellation: CancellationToken,
}

impl AppContext {
    pub fn new(biz: BusinessContext) -> Self {
        Self {
            biz,
            ..Self::default()
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// 事件处理器使用的上下文：因果ID指向该事件，其余信息（含取消令牌）沿用
    pub(crate) fn for_event(&self, envelope: &EventEnvelope) -> Self {
        Self {
            biz: self.biz.caused_by(envelope.event_id().to_string()),
            idempotency_key: self.idempotency_key.clone(),
            cancellation: self.cancellation.clone(),
        }
    }
}

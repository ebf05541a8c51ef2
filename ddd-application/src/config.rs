use bon::Builder;

/// 事件处理器失败后的兄弟处理器策略
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EventFailurePolicy {
    /// 尽力而为：记录失败，同一事件的其余处理器继续执行
    #[default]
    Continue,
    /// 同一事件的其余处理器不再执行（记为跳过），其他事件不受影响
    SkipRemainingSiblings,
}

/// 调度配置
///
/// ```rust
/// use ddd_application::config::{DispatchConfig, EventFailurePolicy};
///
/// let config = DispatchConfig::builder()
///     .event_failure_policy(EventFailurePolicy::SkipRemainingSiblings)
///     .max_depth(8)
///     .build();
/// assert_eq!(config.max_depth, Some(8));
/// ```
#[derive(Builder, Clone, Debug, Default)]
pub struct DispatchConfig {
    /// 事件处理器失败后的策略
    #[builder(default)]
    pub event_failure_policy: EventFailurePolicy,
    /// 事件传播的最大深度（命令直接产生的事件深度为 1），`None` 表示不限
    pub max_depth: Option<usize>,
}

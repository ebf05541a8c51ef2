use crate::message_kind::MessageKind;
use std::fmt;

/// 领域事件载荷需要满足的通用能力边界
///
/// 事件是已发生事实的不可变描述，可以有零个、一个或多个订阅处理器。
/// 事件的具体类型即其种类；`NAME` 为稳定名称，避免依赖 `type_name::<T>()`。
pub trait DomainEvent: fmt::Debug + Send + Sync + 'static {
    /// 事件的稳定名称（建议常量字符串，不随重构变化）
    const NAME: &'static str;

    /// 事件种类标签（注册表查找键）
    fn kind() -> MessageKind
    where
        Self: Sized,
    {
        MessageKind::of::<Self>(Self::NAME)
    }
}

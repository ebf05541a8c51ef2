use ddd_domain::MessageKind;
use std::fmt;

/// 应用层命令（Command）
///
/// 表达“意图”的写操作请求，通常会修改领域状态。
/// - 每种命令有且仅有一个处理器工厂；
/// - 命令的具体类型即其种类（注册表查找键）；
/// - 建议保持语义化的“动宾结构”命名，如 `ChangeEmail`、`CloseOrder`。
///
/// 关联常量/类型：
/// - `NAME`：命令的稳定名称，用于日志、追踪与错误信息。避免依赖 `type_name::<T>()`。
/// - `Output`：处理器返回给调用方的业务结果，无结果时使用 `()`。
pub trait Command: fmt::Debug + Send + Sync + 'static {
    /// 命令的稳定名称（建议常量字符串，不随重构变化）
    const NAME: &'static str;

    /// 处理结果
    type Output: Send + 'static;

    /// 命令种类标签
    fn kind() -> MessageKind
    where
        Self: Sized,
    {
        MessageKind::of::<Self>(Self::NAME)
    }
}

//! 消息种类标签（MessageKind）
//!
//! 命令与事件在注册表中以具体 Rust 类型作为键。`MessageKind` 把 `TypeId`
//! 与稳定名称绑定在一起：相等与哈希只看 `TypeId`，名称仅用于日志与错误信息。
//!
use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// 消息种类：类型标识 + 稳定名称
#[derive(Clone, Copy)]
pub struct MessageKind {
    type_id: TypeId,
    name: &'static str,
}

impl MessageKind {
    /// 以具体类型 `T` 构造种类标签
    pub fn of<T: 'static>(name: &'static str) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 判断是否为类型 `T` 的种类
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

impl PartialEq for MessageKind {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for MessageKind {}

impl Hash for MessageKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MessageKind").field(&self.name).finish()
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

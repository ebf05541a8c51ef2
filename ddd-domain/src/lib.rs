//! DDD 领域层基础库（ddd-domain）
//!
//! 提供命令/事件调度所需的领域层构件：
//! - 消息种类标签（`message_kind`）：以具体类型为键、附带稳定名称
//! - 领域事件（`domain_event`）：事件接口、类型擦除信封、元数据与事件缓冲区
//! - 统一错误（`error`）
//!
//! 本 crate 不依赖任何运行时，具体的调度与事务生命周期由 `ddd-application` 负责。
//!
pub mod domain_event;
pub mod error;
pub mod message_kind;

pub use message_kind::MessageKind;

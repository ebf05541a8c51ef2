//! 领域事件（Domain Event）
//!
//! 定义事件载荷需要实现的最小接口（`DomainEvent`），类型擦除后的
//! `EventEnvelope` 及其 `Metadata`，处理器暂存事件用的 `EventBuffer`，
//! 以及随调用链传递的 `BusinessContext`。

mod business_context;
mod domain_event_trait;
mod event_buffer;
mod event_envelope;
mod metadata;

pub use business_context::BusinessContext;
pub use domain_event_trait::DomainEvent;
pub use event_buffer::EventBuffer;
pub use event_envelope::EventEnvelope;
pub use metadata::Metadata;

use crate::message_kind::MessageKind;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use super::domain_event_trait::DomainEvent;
use super::metadata::Metadata;

type Payload = Arc<dyn Any + Send + Sync>;

type DebugFn = fn(&(dyn Any + Send + Sync), &mut fmt::Formatter<'_>) -> fmt::Result;

/// 事件信封：类型擦除后的事件载荷与元数据
///
/// - 载荷以 `Arc` 共享，同一事件分发给多个处理器时只做引用计数；
/// - 种类标签随信封携带，派发时无需检查载荷即可定位处理器；
/// - 处理器通过 [`downcast_ref`](Self::downcast_ref) 取回具体事件。
#[derive(Clone)]
pub struct EventEnvelope {
    kind: MessageKind,
    metadata: Metadata,
    payload: Payload,
    debug: DebugFn,
}

impl EventEnvelope {
    pub fn new<E: DomainEvent>(event: E) -> Self {
        let metadata = Metadata::builder().event_type(E::NAME).build();
        Self::with_metadata(event, metadata)
    }

    pub fn with_metadata<E: DomainEvent>(event: E, metadata: Metadata) -> Self {
        Self {
            kind: E::kind(),
            metadata,
            payload: Arc::new(event),
            debug: debug_payload::<E>,
        }
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn event_id(&self) -> Uuid {
        self.metadata.event_id()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn is<E: DomainEvent>(&self) -> bool {
        self.kind.is::<E>()
    }

    /// 还原为具体事件；类型不符时返回 `None`
    pub fn downcast_ref<E: DomainEvent>(&self) -> Option<&E> {
        self.payload.downcast_ref::<E>()
    }
}

impl fmt::Debug for EventEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct PayloadDebug<'a>(&'a EventEnvelope);

        impl fmt::Debug for PayloadDebug<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                (self.0.debug)(&*self.0.payload, f)
            }
        }

        f.debug_struct("EventEnvelope")
            .field("kind", &self.kind)
            .field("metadata", &self.metadata)
            .field("payload", &PayloadDebug(self))
            .finish()
    }
}

fn debug_payload<E: DomainEvent>(
    payload: &(dyn Any + Send + Sync),
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    match payload.downcast_ref::<E>() {
        Some(event) => fmt::Debug::fmt(event, f),
        None => f.write_str("<unknown>"),
    }
}

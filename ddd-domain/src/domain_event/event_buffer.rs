use std::slice::Iter;

use super::domain_event_trait::DomainEvent;
use super::event_envelope::EventEnvelope;

/// 待发布事件缓冲区，按记录顺序排列
///
/// 处理器在 `handle` 中记录事件，由调度器在提交成功后一次性取走；
/// 回滚时应调用 [`clear`](Self::clear) 丢弃已记录的事件。
#[derive(Debug, Default)]
pub struct EventBuffer {
    events: Vec<EventEnvelope>,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一个领域事件
    pub fn record<E: DomainEvent>(&mut self, event: E) {
        self.events.push(EventEnvelope::new(event));
    }

    /// 记录一个已封装的事件
    pub fn push(&mut self, envelope: EventEnvelope) {
        self.events.push(envelope);
    }

    /// 取走全部事件，缓冲区随之清空
    pub fn drain(&mut self) -> Vec<EventEnvelope> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn iter(&self) -> Iter<'_, EventEnvelope> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<'a> IntoIterator for &'a EventBuffer {
    type Item = &'a EventEnvelope;
    type IntoIter = Iter<'a, EventEnvelope>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

#![allow(dead_code)]

use async_trait::async_trait;
use ddd_application::context::AppContext;
use ddd_application::error::AppError;
use ddd_application::{CommandHandler, EventHandler, HandlerLifecycle};
use ddd_domain::domain_event::{DomainEvent, EventBuffer, EventEnvelope};
use ddd_macros::{Command, DomainEvent};
use std::sync::{Arc, Mutex};

#[derive(Debug, Command)]
#[command(output = u32)]
pub struct PlaceOrder {
    pub quantity: u32,
}

#[derive(Debug, Command)]
pub struct CancelOrder;

#[derive(Debug, DomainEvent)]
#[domain_event(name = "order.placed")]
pub struct OrderPlaced;

#[derive(Debug, DomainEvent)]
#[domain_event(name = "order.shipped")]
pub struct OrderShipped;

#[derive(Debug, DomainEvent)]
#[domain_event(name = "order.audited")]
pub struct OrderAudited;

#[derive(Debug, DomainEvent)]
#[domain_event(name = "order.ignored")]
pub struct OrderIgnored;

/// 按调用顺序记录生命周期步骤，形如 `label:handle`
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|e| *e == entry).count()
    }

    pub fn labels_with(&self, step: &str) -> Vec<String> {
        let suffix = format!(":{step}");
        self.entries()
            .into_iter()
            .filter_map(|e| e.strip_suffix(&suffix).map(str::to_string))
            .collect()
    }
}

#[derive(Clone, Copy, Default)]
pub struct Script {
    pub fail_handle: bool,
    pub fail_commit: bool,
    pub fail_rollback: bool,
    pub hang_handle: bool,
}

impl Script {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn failing_handle() -> Self {
        Self {
            fail_handle: true,
            ..Self::default()
        }
    }

    pub fn failing_commit() -> Self {
        Self {
            fail_commit: true,
            ..Self::default()
        }
    }
}

type EmitFn = Arc<dyn Fn(&mut EventBuffer) + Send + Sync>;

/// 脚本化处理器：记录每一步，按脚本失败，并在 handle 中发出预设事件
pub struct Recorder {
    label: &'static str,
    journal: Journal,
    script: Script,
    emit: EmitFn,
    events: EventBuffer,
}

impl Recorder {
    async fn run_handle(&mut self, ctx: &AppContext) -> Result<(), AppError> {
        self.journal.record(format!("{}:handle", self.label));
        if let Some(cause) = ctx.biz.causation_id() {
            self.journal.record(format!("{}:caused_by:{cause}", self.label));
        }
        if self.script.hang_handle {
            std::future::pending::<()>().await;
        }
        if self.script.fail_handle {
            return Err(AppError::Validation(format!("{} rejected", self.label)));
        }
        (self.emit)(&mut self.events);
        Ok(())
    }
}

#[async_trait]
impl HandlerLifecycle for Recorder {
    async fn commit(&mut self, _ctx: &AppContext) -> Result<(), AppError> {
        self.journal.record(format!("{}:commit", self.label));
        if self.script.fail_commit {
            return Err(AppError::Infra(format!("{} commit failed", self.label)));
        }
        Ok(())
    }

    async fn rollback(&mut self, _ctx: &AppContext) -> Result<(), AppError> {
        self.journal.record(format!("{}:rollback", self.label));
        self.events.clear();
        if self.script.fail_rollback {
            return Err(AppError::Infra(format!("{} rollback failed", self.label)));
        }
        Ok(())
    }

    fn take_events(&mut self) -> Vec<EventEnvelope> {
        self.events.drain()
    }
}

#[async_trait]
impl CommandHandler<PlaceOrder> for Recorder {
    async fn handle(&mut self, ctx: &AppContext, cmd: PlaceOrder) -> Result<u32, AppError> {
        self.run_handle(ctx).await?;
        Ok(cmd.quantity * 10)
    }
}

#[async_trait]
impl CommandHandler<CancelOrder> for Recorder {
    async fn handle(&mut self, ctx: &AppContext, _cmd: CancelOrder) -> Result<(), AppError> {
        self.run_handle(ctx).await
    }
}

#[async_trait]
impl<E: DomainEvent> EventHandler<E> for Recorder {
    async fn handle(&mut self, ctx: &AppContext, _event: &E) -> Result<(), AppError> {
        self.run_handle(ctx).await
    }
}

/// 产出 `Recorder` 的工厂
pub fn recorder(
    label: &'static str,
    journal: &Journal,
    script: Script,
) -> impl Fn() -> Result<Recorder, AppError> + Send + Sync + 'static {
    emitting(label, journal, script, |_| {})
}

/// 产出在 handle 中发出事件的 `Recorder` 工厂
pub fn emitting(
    label: &'static str,
    journal: &Journal,
    script: Script,
    emit: impl Fn(&mut EventBuffer) + Send + Sync + 'static,
) -> impl Fn() -> Result<Recorder, AppError> + Send + Sync + 'static {
    let journal = journal.clone();
    let emit: EmitFn = Arc::new(emit);
    move || {
        Ok::<_, AppError>(Recorder {
            label,
            journal: journal.clone(),
            script,
            emit: emit.clone(),
            events: EventBuffer::new(),
        })
    }
}

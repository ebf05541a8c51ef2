//! 处理器工厂注册表
//!
//! 两阶段生命周期：启动期通过 [`HandlerRegistryBuilder`] 同步注册，
//! 随后 [`freeze`](HandlerRegistryBuilder::freeze) 为只读的 [`HandlerRegistry`]，
//! 可在多个任务间共享并发读取，无需加锁。冻结后不再提供任何注册入口。
//!
use crate::{
    command::Command, command_handler::CommandHandler, context::AppContext, error::AppError,
    event_handler::EventHandler,
};
use async_trait::async_trait;
use ddd_domain::MessageKind;
use ddd_domain::domain_event::{DomainEvent, EventEnvelope};
use std::any::{Any, type_name};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

pub(crate) type BoxAnySend = Box<dyn Any + Send>;

/// 交给类型擦除处理器的消息
pub(crate) enum Message {
    Command {
        name: &'static str,
        payload: BoxAnySend,
    },
    Event(EventEnvelope),
}

impl Message {
    fn name(&self) -> &'static str {
        match self {
            Self::Command { name, .. } => *name,
            Self::Event(env) => env.name(),
        }
    }
}

/// 类型擦除后的处理器，调度器只面向该接口驱动生命周期
#[async_trait]
pub(crate) trait ErasedHandler: Send {
    async fn handle(&mut self, ctx: &AppContext, msg: Message) -> Result<BoxAnySend, AppError>;
    async fn commit(&mut self, ctx: &AppContext) -> Result<(), AppError>;
    async fn rollback(&mut self, ctx: &AppContext) -> Result<(), AppError>;
    fn take_events(&mut self) -> Vec<EventEnvelope>;
}

struct CommandAdapter<C, H> {
    inner: H,
    _marker: PhantomData<fn(C)>,
}

#[async_trait]
impl<C, H> ErasedHandler for CommandAdapter<C, H>
where
    C: Command,
    H: CommandHandler<C> + 'static,
{
    async fn handle(&mut self, ctx: &AppContext, msg: Message) -> Result<BoxAnySend, AppError> {
        match msg {
            Message::Command { name, payload } => {
                // 正常情况下这里的 downcast 永远不会失败（键与适配器同一泛型 C）
                let cmd = payload
                    .downcast::<C>()
                    .map_err(|_| AppError::TypeMismatch {
                        expected: C::NAME,
                        found: name,
                    })?;
                let output = self.inner.handle(ctx, *cmd).await?;
                Ok(Box::new(output) as BoxAnySend)
            }
            other => Err(AppError::TypeMismatch {
                expected: C::NAME,
                found: other.name(),
            }),
        }
    }

    async fn commit(&mut self, ctx: &AppContext) -> Result<(), AppError> {
        self.inner.commit(ctx).await
    }

    async fn rollback(&mut self, ctx: &AppContext) -> Result<(), AppError> {
        self.inner.rollback(ctx).await
    }

    fn take_events(&mut self) -> Vec<EventEnvelope> {
        self.inner.take_events()
    }
}

struct EventAdapter<E, H> {
    inner: H,
    _marker: PhantomData<fn(E)>,
}

#[async_trait]
impl<E, H> ErasedHandler for EventAdapter<E, H>
where
    E: DomainEvent,
    H: EventHandler<E> + 'static,
{
    async fn handle(&mut self, ctx: &AppContext, msg: Message) -> Result<BoxAnySend, AppError> {
        let found = msg.name();
        let Message::Event(envelope) = msg else {
            return Err(AppError::TypeMismatch {
                expected: E::NAME,
                found,
            });
        };
        let Some(event) = envelope.downcast_ref::<E>() else {
            return Err(AppError::TypeMismatch {
                expected: E::NAME,
                found,
            });
        };
        self.inner.handle(ctx, event).await?;
        Ok(Box::new(()) as BoxAnySend)
    }

    async fn commit(&mut self, ctx: &AppContext) -> Result<(), AppError> {
        self.inner.commit(ctx).await
    }

    async fn rollback(&mut self, ctx: &AppContext) -> Result<(), AppError> {
        self.inner.rollback(ctx).await
    }

    fn take_events(&mut self) -> Vec<EventEnvelope> {
        self.inner.take_events()
    }
}

type BuildFn = Arc<dyn Fn() -> Result<Box<dyn ErasedHandler>, AppError> + Send + Sync>;

/// 处理器工厂：每次调用产出一个全新的处理器实例
#[derive(Clone)]
pub struct HandlerFactory {
    message: &'static str,
    handler: &'static str,
    build: BuildFn,
}

impl HandlerFactory {
    fn for_command<C, H, F>(factory: F) -> Self
    where
        C: Command,
        H: CommandHandler<C> + 'static,
        F: Fn() -> Result<H, AppError> + Send + Sync + 'static,
    {
        Self {
            message: C::NAME,
            handler: type_name::<H>(),
            build: Arc::new(move || -> Result<Box<dyn ErasedHandler>, AppError> {
                let inner = factory()?;
                Ok(Box::new(CommandAdapter::<C, H> {
                    inner,
                    _marker: PhantomData,
                }) as Box<dyn ErasedHandler>)
            }),
        }
    }

    fn for_event<E, H, F>(factory: F) -> Self
    where
        E: DomainEvent,
        H: EventHandler<E> + 'static,
        F: Fn() -> Result<H, AppError> + Send + Sync + 'static,
    {
        Self {
            message: E::NAME,
            handler: type_name::<H>(),
            build: Arc::new(move || -> Result<Box<dyn ErasedHandler>, AppError> {
                let inner = factory()?;
                Ok(Box::new(EventAdapter::<E, H> {
                    inner,
                    _marker: PhantomData,
                }) as Box<dyn ErasedHandler>)
            }),
        }
    }

    /// 绑定的命令/事件名称
    pub fn message_name(&self) -> &'static str {
        self.message
    }

    /// 产出的处理器类型名
    pub fn handler_name(&self) -> &'static str {
        self.handler
    }

    pub(crate) fn construct(&self) -> Result<Box<dyn ErasedHandler>, AppError> {
        (self.build)()
    }
}

impl std::fmt::Debug for HandlerFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerFactory")
            .field("message", &self.message)
            .field("handler", &self.handler)
            .finish()
    }
}

/// 注册阶段的可变注册表
#[derive(Default)]
pub struct HandlerRegistryBuilder {
    commands: HashMap<MessageKind, HandlerFactory>,
    events: HashMap<MessageKind, Vec<HandlerFactory>>,
}

impl HandlerRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为命令种类绑定唯一的处理器工厂；重复绑定属于配置错误
    pub fn register_command_handler_factory<C, H, F>(&mut self, factory: F) -> Result<(), AppError>
    where
        C: Command,
        H: CommandHandler<C> + 'static,
        F: Fn() -> Result<H, AppError> + Send + Sync + 'static,
    {
        let kind = C::kind();
        if self.commands.contains_key(&kind) {
            return Err(AppError::AlreadyRegisteredCommand { command: C::NAME });
        }

        self.commands
            .insert(kind, HandlerFactory::for_command::<C, H, F>(factory));

        Ok(())
    }

    /// 为事件种类追加处理器工厂；同一事件可注册多个，按注册顺序调用
    pub fn register_event_handler_factory<E, H, F>(&mut self, factory: F)
    where
        E: DomainEvent,
        H: EventHandler<E> + 'static,
        F: Fn() -> Result<H, AppError> + Send + Sync + 'static,
    {
        self.events
            .entry(E::kind())
            .or_default()
            .push(HandlerFactory::for_event::<E, H, F>(factory));
    }

    /// 结束注册阶段
    pub fn freeze(self) -> HandlerRegistry {
        HandlerRegistry {
            commands: self.commands,
            events: self.events,
        }
    }
}

/// 冻结后的只读注册表
pub struct HandlerRegistry {
    commands: HashMap<MessageKind, HandlerFactory>,
    events: HashMap<MessageKind, Vec<HandlerFactory>>,
}

impl HandlerRegistry {
    pub fn builder() -> HandlerRegistryBuilder {
        HandlerRegistryBuilder::new()
    }

    pub fn resolve_command_factory(&self, kind: &MessageKind) -> Option<&HandlerFactory> {
        self.commands.get(kind)
    }

    /// 事件种类的全部工厂（按注册顺序）；未注册时为空
    pub fn resolve_event_factories(&self, kind: &MessageKind) -> &[HandlerFactory] {
        self.events.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 获取已注册的命令名列表（只读视图）
    pub fn registered_commands(&self) -> Vec<&'static str> {
        self.commands.values().map(|f| f.message).collect()
    }

    /// 获取已注册的事件名及其处理器数量（只读视图）
    pub fn registered_events(&self) -> Vec<(&'static str, usize)> {
        self.events
            .values()
            .filter_map(|list| list.first().map(|f| (f.message, list.len())))
            .collect()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("commands", &self.registered_commands())
            .field("events", &self.registered_events())
            .finish()
    }
}

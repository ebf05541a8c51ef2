use crate::{
    command::Command,
    command_bus::CommandBus,
    command_handler::CommandHandler,
    config::DispatchConfig,
    context::AppContext,
    dispatcher::Dispatcher,
    error::AppError,
    event_handler::EventHandler,
    outcome::CommandOutcome,
    registry::{HandlerRegistry, HandlerRegistryBuilder},
};
use async_trait::async_trait;
use ddd_domain::domain_event::DomainEvent;
use std::sync::Arc;
use tracing::info;

/// 启动器（Bootstrapper）
///
/// 组合注册表与调度器，对外仅暴露一个强类型的命令入口。
/// 生命周期：构造 → 注册 → 冻结（`build`）→ 服务；冻结后可 `clone` 到任意任务并发使用。
///
/// ```rust,ignore
/// let bootstrapper = Bootstrapper::builder()
///     .register_command_handler_factory::<ChangeEmail, _, _>(|| Ok(ChangeEmailHandler::new()))?
///     .register_event_handler_factory::<EmailChanged, _, _>(|| Ok(EmailChangedHandler::new()))
///     .build();
///
/// let outcome = bootstrapper.handle_command(&ctx, ChangeEmail { .. }).await?;
/// ```
#[derive(Clone, Debug)]
pub struct Bootstrapper {
    dispatcher: Dispatcher,
}

impl Bootstrapper {
    pub fn builder() -> BootstrapperBuilder {
        BootstrapperBuilder::default()
    }

    /// 处理命令：返回处理器的业务结果与事件传播报告
    pub async fn handle_command<C: Command>(
        &self,
        ctx: &AppContext,
        cmd: C,
    ) -> Result<CommandOutcome<C::Output>, AppError> {
        self.dispatcher.dispatch_command(ctx, cmd).await
    }

    pub fn registry(&self) -> &HandlerRegistry {
        self.dispatcher.registry()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

#[async_trait]
impl CommandBus for Bootstrapper {
    async fn dispatch<C: Command>(
        &self,
        ctx: &AppContext,
        cmd: C,
    ) -> Result<CommandOutcome<C::Output>, AppError> {
        self.handle_command(ctx, cmd).await
    }
}

/// 启动器构建器（注册阶段）
#[derive(Default)]
pub struct BootstrapperBuilder {
    registry: HandlerRegistryBuilder,
    config: DispatchConfig,
}

impl BootstrapperBuilder {
    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    /// 绑定命令处理器工厂；同一命令重复绑定返回 `AlreadyRegisteredCommand`
    pub fn register_command_handler_factory<C, H, F>(mut self, factory: F) -> Result<Self, AppError>
    where
        C: Command,
        H: CommandHandler<C> + 'static,
        F: Fn() -> Result<H, AppError> + Send + Sync + 'static,
    {
        self.registry
            .register_command_handler_factory::<C, H, F>(factory)?;
        Ok(self)
    }

    /// 追加事件处理器工厂
    pub fn register_event_handler_factory<E, H, F>(mut self, factory: F) -> Self
    where
        E: DomainEvent,
        H: EventHandler<E> + 'static,
        F: Fn() -> Result<H, AppError> + Send + Sync + 'static,
    {
        self.registry.register_event_handler_factory::<E, H, F>(factory);
        self
    }

    /// 冻结注册表并开始服务
    pub fn build(self) -> Bootstrapper {
        let registry = self.registry.freeze();
        info!(
            commands = registry.registered_commands().len(),
            events = registry.registered_events().len(),
            "handler registry frozen"
        );

        Bootstrapper {
            dispatcher: Dispatcher::new(Arc::new(registry), self.config),
        }
    }
}

//! 启动装配：注册处理器工厂并暴露共享适配器

use crate::adapters::{NotificationOutbox, UserStore};
use crate::handlers::{ChangeEmailCommandHandler, EmailChangedEventHandler};
use crate::model::{ChangeEmailCommand, EmailChangedEvent};
use ddd_application::Bootstrapper;
use ddd_application::command::Command;
use ddd_application::config::DispatchConfig;
use ddd_application::context::AppContext;
use ddd_application::error::AppError;
use ddd_application::outcome::CommandOutcome;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 初始化 tracing，日志级别取自 `DDD_LOG`，缺省为 `info`
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("DDD_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// 装配完成的应用
#[derive(Clone)]
pub struct App {
    bootstrapper: Bootstrapper,
    users: UserStore,
    notifications: NotificationOutbox,
}

impl App {
    pub fn new(config: DispatchConfig) -> Result<Self, AppError> {
        let users = UserStore::default();
        let notifications = NotificationOutbox::default();

        let bootstrapper = Bootstrapper::builder()
            .config(config)
            .register_command_handler_factory::<ChangeEmailCommand, _, _>({
                let users = users.clone();
                move || Ok(ChangeEmailCommandHandler::new(users.unit_of_work()))
            })?
            .register_event_handler_factory::<EmailChangedEvent, _, _>({
                let notifications = notifications.clone();
                move || Ok(EmailChangedEventHandler::new(notifications.session()))
            })
            .build();

        Ok(Self {
            bootstrapper,
            users,
            notifications,
        })
    }

    pub async fn handle_command<C: Command>(
        &self,
        ctx: &AppContext,
        cmd: C,
    ) -> Result<CommandOutcome<C::Output>, AppError> {
        self.bootstrapper.handle_command(ctx, cmd).await
    }

    pub fn bootstrapper(&self) -> &Bootstrapper {
        &self.bootstrapper
    }

    pub fn users(&self) -> &UserStore {
        &self.users
    }

    /// 共享的通知发件箱
    pub fn notifications(&self) -> &NotificationOutbox {
        &self.notifications
    }
}

//! 具体的命令/事件处理器

use crate::adapters::{EmailNotifier, UserRepository};
use crate::model::{ChangeEmailCommand, EmailChangedEvent, NotifySlackEvent};
use async_trait::async_trait;
use ddd_application::context::AppContext;
use ddd_application::error::AppError;
use ddd_application::{CommandHandler, EventHandler, HandlerLifecycle};
use ddd_domain::domain_event::{EventBuffer, EventEnvelope};
use tracing::info;

/// 修改用户邮箱，成功后发出 `EmailChangedEvent`
pub struct ChangeEmailCommandHandler<R> {
    repository: R,
    events: EventBuffer,
}

impl<R: UserRepository> ChangeEmailCommandHandler<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            events: EventBuffer::new(),
        }
    }
}

#[async_trait]
impl<R: UserRepository + 'static> HandlerLifecycle for ChangeEmailCommandHandler<R> {
    async fn commit(&mut self, ctx: &AppContext) -> Result<(), AppError> {
        Ok(self.repository.commit(ctx).await?)
    }

    async fn rollback(&mut self, ctx: &AppContext) -> Result<(), AppError> {
        self.events.clear();
        Ok(self.repository.rollback(ctx).await?)
    }

    fn take_events(&mut self) -> Vec<EventEnvelope> {
        self.events.drain()
    }
}

#[async_trait]
impl<R: UserRepository + 'static> CommandHandler<ChangeEmailCommand> for ChangeEmailCommandHandler<R> {
    async fn handle(&mut self, ctx: &AppContext, cmd: ChangeEmailCommand) -> Result<(), AppError> {
        let mut user = self.repository.get(ctx, &cmd.user_id).await?;
        let original_email = user.change_email(&cmd.new_email)?;
        self.repository.save(ctx, user).await?;

        info!(user_id = %cmd.user_id, "email changed");
        self.events.record(EmailChangedEvent {
            user_id: cmd.user_id,
            new_email: cmd.new_email,
            original_email,
        });
        Ok(())
    }
}

/// 发送邮箱变更通知，并发出 `NotifySlackEvent`
pub struct EmailChangedEventHandler<N> {
    notifier: N,
    events: EventBuffer,
}

impl<N: EmailNotifier> EmailChangedEventHandler<N> {
    pub fn new(notifier: N) -> Self {
        Self {
            notifier,
            events: EventBuffer::new(),
        }
    }
}

#[async_trait]
impl<N: EmailNotifier + 'static> HandlerLifecycle for EmailChangedEventHandler<N> {
    async fn commit(&mut self, ctx: &AppContext) -> Result<(), AppError> {
        Ok(self.notifier.commit(ctx).await?)
    }

    async fn rollback(&mut self, ctx: &AppContext) -> Result<(), AppError> {
        self.events.clear();
        Ok(self.notifier.rollback(ctx).await?)
    }

    fn take_events(&mut self) -> Vec<EventEnvelope> {
        self.events.drain()
    }
}

#[async_trait]
impl<N: EmailNotifier + 'static> EventHandler<EmailChangedEvent> for EmailChangedEventHandler<N> {
    async fn handle(&mut self, ctx: &AppContext, event: &EmailChangedEvent) -> Result<(), AppError> {
        self.notifier
            .notify_email_changed(ctx, &event.user_id, &event.new_email, &event.original_email)
            .await?;

        self.events.record(NotifySlackEvent {
            message: "Email notification sent for EmailChanged event".to_string(),
        });
        Ok(())
    }
}

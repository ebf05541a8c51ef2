//! 持久化与通知适配器
//!
//! 两类适配器都以“工作单元”的方式参与处理器的提交/回滚：
//! 写操作先暂存在单元内部，`commit` 时一次性落地到共享存储，`rollback` 时丢弃。

use crate::model::User;
use async_trait::async_trait;
use ddd_application::context::AppContext;
use ddd_domain::error::{DomainError, DomainResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 用户仓储
#[async_trait]
pub trait UserRepository: Send {
    async fn get(&mut self, ctx: &AppContext, user_id: &str) -> DomainResult<User>;
    async fn save(&mut self, ctx: &AppContext, user: User) -> DomainResult<()>;
    async fn commit(&mut self, ctx: &AppContext) -> DomainResult<()>;
    async fn rollback(&mut self, ctx: &AppContext) -> DomainResult<()>;
}

/// 进程内共享的用户存储
#[derive(Clone, Default)]
pub struct UserStore {
    users: Arc<Mutex<HashMap<String, User>>>,
}

impl UserStore {
    pub fn insert(&self, user: User) {
        lock(&self.users).insert(user.id.clone(), user);
    }

    pub fn get(&self, user_id: &str) -> Option<User> {
        lock(&self.users).get(user_id).cloned()
    }

    /// 新建一个工作单元（每个处理器实例一个）
    pub fn unit_of_work(&self) -> InMemoryUserRepository {
        InMemoryUserRepository {
            store: self.clone(),
            staged: HashMap::new(),
        }
    }
}

pub struct InMemoryUserRepository {
    store: UserStore,
    staged: HashMap<String, User>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&mut self, _ctx: &AppContext, user_id: &str) -> DomainResult<User> {
        if let Some(user) = self.staged.get(user_id) {
            return Ok(user.clone());
        }
        self.store.get(user_id).ok_or_else(|| DomainError::NotFound {
            reason: format!("user {user_id}"),
        })
    }

    async fn save(&mut self, _ctx: &AppContext, user: User) -> DomainResult<()> {
        self.staged.insert(user.id.clone(), user);
        Ok(())
    }

    async fn commit(&mut self, _ctx: &AppContext) -> DomainResult<()> {
        let staged = std::mem::take(&mut self.staged);
        debug!(users = staged.len(), "committing user changes");
        lock(&self.store.users).extend(staged);
        Ok(())
    }

    async fn rollback(&mut self, _ctx: &AppContext) -> DomainResult<()> {
        self.staged.clear();
        Ok(())
    }
}

/// 邮件变更通知能力
#[async_trait]
pub trait EmailNotifier: Send {
    async fn notify_email_changed(
        &mut self,
        ctx: &AppContext,
        user_id: &str,
        new_email: &str,
        old_email: &str,
    ) -> DomainResult<()>;
    async fn commit(&mut self, ctx: &AppContext) -> DomainResult<()>;
    async fn rollback(&mut self, ctx: &AppContext) -> DomainResult<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailChangedNotification {
    pub user_id: String,
    pub new_email: String,
    pub old_email: String,
}

/// 已发送通知的共享发件箱
#[derive(Clone, Default)]
pub struct NotificationOutbox {
    sent: Arc<Mutex<Vec<EmailChangedNotification>>>,
    unavailable: Arc<AtomicBool>,
}

impl NotificationOutbox {
    pub fn sent(&self) -> Vec<EmailChangedNotification> {
        lock(&self.sent).clone()
    }

    /// 模拟下游不可用：之后的提交全部失败
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn session(&self) -> InMemoryEmailNotifier {
        InMemoryEmailNotifier {
            outbox: self.clone(),
            pending: Vec::new(),
        }
    }
}

pub struct InMemoryEmailNotifier {
    outbox: NotificationOutbox,
    pending: Vec<EmailChangedNotification>,
}

#[async_trait]
impl EmailNotifier for InMemoryEmailNotifier {
    async fn notify_email_changed(
        &mut self,
        _ctx: &AppContext,
        user_id: &str,
        new_email: &str,
        old_email: &str,
    ) -> DomainResult<()> {
        self.pending.push(EmailChangedNotification {
            user_id: user_id.to_string(),
            new_email: new_email.to_string(),
            old_email: old_email.to_string(),
        });
        Ok(())
    }

    async fn commit(&mut self, _ctx: &AppContext) -> DomainResult<()> {
        if self.outbox.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::Notification {
                reason: "notification service unavailable".to_string(),
            });
        }
        let pending = std::mem::take(&mut self.pending);
        lock(&self.outbox.sent).extend(pending);
        Ok(())
    }

    async fn rollback(&mut self, _ctx: &AppContext) -> DomainResult<()> {
        self.pending.clear();
        Ok(())
    }
}

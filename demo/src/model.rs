//! 用户模型与消息定义

use ddd_domain::error::{DomainError, DomainResult};
use ddd_macros::{Command, DomainEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
}

impl User {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
        }
    }

    /// 修改邮箱，返回原邮箱
    pub fn change_email(&mut self, new_email: &str) -> DomainResult<String> {
        validate_email(new_email)?;
        if self.email == new_email {
            return Err(DomainError::InvalidCommand {
                reason: format!("user {} already uses {new_email}", self.id),
            });
        }
        Ok(std::mem::replace(&mut self.email, new_email.to_string()))
    }
}

fn validate_email(email: &str) -> DomainResult<()> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(DomainError::InvalidValue {
            reason: format!("malformed email address: {email}"),
        }),
    }
}

#[derive(Debug, Clone, Command)]
pub struct ChangeEmailCommand {
    pub user_id: String,
    pub new_email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, DomainEvent)]
pub struct EmailChangedEvent {
    pub user_id: String,
    pub new_email: String,
    pub original_email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, DomainEvent)]
pub struct NotifySlackEvent {
    pub message: String,
}

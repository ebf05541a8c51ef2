//! 领域层统一错误定义
//!
//! 聚焦领域规则、仓储与通知适配器等最小必要集合，
//! 便于在应用层统一转换为 `AppError`。
//!
use thiserror::Error;

/// 统一错误类型（基础库最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DomainError {
    // --- 领域规则/命令与状态 ---
    #[error("invalid command: {reason}")]
    InvalidCommand { reason: String },
    #[error("invalid state: {reason}")]
    InvalidState { reason: String },
    #[error("invalid value: {reason}")]
    InvalidValue { reason: String },
    #[error("not found: {reason}")]
    NotFound { reason: String },

    // --- 仓储/通知 ---
    #[error("repository error: {reason}")]
    Repository { reason: String },
    #[error("notification error: {reason}")]
    Notification { reason: String },
    #[error("version conflict: expected={expected}, actual={actual}")]
    VersionConflict { expected: usize, actual: usize },
}

/// 统一 Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;

use ddd_domain::error::DomainError;
use std::fmt;
use uuid::Uuid;

/// 生命周期阶段（用于错误定位与日志）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleStage {
    Construct,
    Handle,
    Commit,
}

impl fmt::Display for LifecycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Construct => "construct",
            Self::Handle => "handle",
            Self::Commit => "commit",
        })
    }
}

#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    // --- 业务/基础设施（由具体处理器返回） ---
    #[error("domain: {0}")]
    Domain(#[from] DomainError),

    #[error("validation: {0}")]
    Validation(String),

    #[error("authorization: {0}")]
    Authorization(String),

    #[error("infra: {0}")]
    Infra(String),

    // --- 注册 ---
    #[error("handler already registered: command={command}")]
    AlreadyRegisteredCommand { command: &'static str },

    // --- 调度 ---
    #[error("unregistered command: {0}")]
    UnregisteredCommand(&'static str),

    #[error("handler construction failed: message={message}, handler={handler}: {source}")]
    HandlerConstructionFailed {
        message: &'static str,
        handler: &'static str,
        #[source]
        source: Box<AppError>,
    },

    #[error("handle failed: message={message}: {source}{}", rollback_note(.rollback))]
    HandleFailed {
        message: &'static str,
        #[source]
        source: Box<AppError>,
        rollback: Option<Box<AppError>>,
    },

    #[error("commit failed: message={message}: {source}{}", rollback_note(.rollback))]
    CommitFailed {
        message: &'static str,
        #[source]
        source: Box<AppError>,
        rollback: Option<Box<AppError>>,
    },

    #[error("rollback failed: message={message}: {source}")]
    RollbackFailed {
        message: &'static str,
        #[source]
        source: Box<AppError>,
    },

    #[error("cancelled: message={message}, stage={stage}{}", rollback_note(.rollback))]
    Cancelled {
        message: &'static str,
        stage: LifecycleStage,
        rollback: Option<Box<AppError>>,
    },

    #[error("event propagation failed: {} handler failure(s)", .failures.len())]
    EventPropagationFailed { failures: Vec<EventFailure> },

    #[error("propagation depth exceeded: event={event}, depth={depth}, max={max}")]
    PropagationDepthExceeded {
        event: &'static str,
        depth: usize,
        max: usize,
    },

    // --- 内部不变量 ---
    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

impl AppError {
    /// 回滚阶段的附带错误（原始错误优先，回滚错误仅作记录）
    pub fn rollback_error(&self) -> Option<&AppError> {
        match self {
            Self::HandleFailed { rollback, .. }
            | Self::CommitFailed { rollback, .. }
            | Self::Cancelled { rollback, .. } => rollback.as_deref(),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

fn rollback_note(rollback: &Option<Box<AppError>>) -> String {
    match rollback {
        Some(err) => format!(" (also: {err})"),
        None => String::new(),
    }
}

/// 事件传播中单个处理器的失败记录
#[derive(Debug)]
pub struct EventFailure {
    /// 事件名称
    pub event: &'static str,
    /// 事件唯一标识
    pub event_id: Uuid,
    /// 处理器类型名（深度超限时为空字符串）
    pub handler: &'static str,
    /// 传播深度（命令直接产生的事件为 1）
    pub depth: usize,
    pub error: AppError,
}

impl fmt::Display for EventFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "event={} id={} handler={} depth={}: {}",
            self.event, self.event_id, self.handler, self.depth, self.error
        )
    }
}

use crate::error::{AppError, EventFailure};

/// 事件传播报告
///
/// 事件的传播是尽力而为的：处理器失败不会回滚命令或已提交的兄弟处理器，
/// 但每一次失败都会记录在这里，绝不静默吞掉。
#[derive(Debug, Default)]
pub struct PropagationReport {
    pub(crate) dispatched: usize,
    pub(crate) committed: usize,
    pub(crate) skipped: usize,
    pub(crate) unhandled: Vec<&'static str>,
    pub(crate) failures: Vec<EventFailure>,
}

impl PropagationReport {
    /// 进入调度的事件数（含无人订阅的事件）
    pub fn dispatched(&self) -> usize {
        self.dispatched
    }

    /// 成功提交的事件处理器数
    pub fn committed(&self) -> usize {
        self.committed
    }

    /// 因失败策略被跳过的事件处理器数
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// 无人订阅而被丢弃的事件名称，按出现顺序
    pub fn unhandled(&self) -> &[&'static str] {
        &self.unhandled
    }

    pub fn failures(&self) -> &[EventFailure] {
        &self.failures
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// 有失败时转换为 `AppError::EventPropagationFailed`
    pub fn into_result(self) -> Result<(), AppError> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(AppError::EventPropagationFailed {
                failures: self.failures,
            })
        }
    }
}

/// 命令调度结果：处理器的业务结果 + 事件传播报告
#[derive(Debug)]
pub struct CommandOutcome<T> {
    pub output: T,
    pub propagation: PropagationReport,
}

impl<T> CommandOutcome<T> {
    /// 严格模式：事件传播存在失败时返回错误（命令本身已提交，不受影响）
    pub fn into_result(self) -> Result<T, AppError> {
        self.propagation.into_result()?;
        Ok(self.output)
    }

    pub fn into_parts(self) -> (T, PropagationReport) {
        (self.output, self.propagation)
    }
}

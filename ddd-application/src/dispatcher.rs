//! 调度器（Dispatcher）
//!
//! 命令路径：解析工厂 → 构造处理器 → `handle` → `commit`（失败则 `rollback`）→ 传播事件。
//! 事件路径：对每个事件按注册顺序构造全部处理器，逐个执行同样的生命周期，
//! 成功提交后立即递归传播该处理器产生的事件（深度优先），再处理下一个兄弟处理器。
//!
//! 事件失败只记录在 [`PropagationReport`] 中，不回滚命令，也不影响已提交的兄弟处理器。
//!
use crate::{
    command::Command,
    config::{DispatchConfig, EventFailurePolicy},
    context::AppContext,
    error::{AppError, EventFailure, LifecycleStage},
    outcome::{CommandOutcome, PropagationReport},
    registry::{BoxAnySend, ErasedHandler, HandlerFactory, HandlerRegistry, Message},
};
use ddd_domain::domain_event::EventEnvelope;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use std::any::type_name;
use std::future::Future;
use std::sync::Arc;
use tracing::{Instrument, debug, info, info_span, warn};

/// `handle`/`commit` 的中断原因
enum Interruption {
    Cancelled,
    Failed(AppError),
}

#[derive(Clone, Debug)]
pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(registry: Arc<HandlerRegistry>, config: DispatchConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// 调度一条命令
    ///
    /// 命令级失败（未注册、构造失败、处理/提交失败、取消）直接返回错误；
    /// 提交成功后事件传播的失败汇总在返回值的 `propagation` 中。
    pub async fn dispatch_command<C: Command>(
        &self,
        ctx: &AppContext,
        cmd: C,
    ) -> Result<CommandOutcome<C::Output>, AppError> {
        let span = info_span!(
            "dispatch_command",
            command = C::NAME,
            correlation_id = ctx.biz.correlation_id().unwrap_or_default()
        );

        async move {
            let Some(factory) = self.registry.resolve_command_factory(&C::kind()) else {
                warn!("no handler factory registered for command");
                return Err(AppError::UnregisteredCommand(C::NAME));
            };

            let mut handler = construct(ctx, factory)?;
            let message = Message::Command {
                name: C::NAME,
                payload: Box::new(cmd),
            };
            let output = run_lifecycle(ctx, factory, handler.as_mut(), message).await?;
            let output = output
                .downcast::<C::Output>()
                .map(|b| *b)
                .map_err(|_| AppError::TypeMismatch {
                    expected: type_name::<C::Output>(),
                    found: "unknown",
                })?;

            let events = handler.take_events();
            drop(handler);
            info!(
                handler = factory.handler_name(),
                events = events.len(),
                "command committed"
            );

            let mut report = PropagationReport::default();
            self.propagate(ctx, events, 1, &mut report).await;

            if !report.is_clean() {
                warn!(
                    failures = report.failures().len(),
                    "event propagation finished with failures"
                );
            }

            Ok::<_, AppError>(CommandOutcome {
                output,
                propagation: report,
            })
        }
        .instrument(span)
        .await
    }

    /// 按发出顺序逐个传播事件；每个事件的下游事件在处理下一个事件前全部完成
    fn propagate<'a>(
        &'a self,
        ctx: &'a AppContext,
        events: Vec<EventEnvelope>,
        depth: usize,
        report: &'a mut PropagationReport,
    ) -> BoxFuture<'a, ()> {
        async move {
            for envelope in events {
                self.dispatch_event(ctx, envelope, depth, report).await;
            }
        }
        .boxed()
    }

    async fn dispatch_event(
        &self,
        ctx: &AppContext,
        envelope: EventEnvelope,
        depth: usize,
        report: &mut PropagationReport,
    ) {
        report.dispatched += 1;

        let factories = self.registry.resolve_event_factories(&envelope.kind());
        if factories.is_empty() {
            debug!(event = envelope.name(), "no handlers registered for event");
            report.unhandled.push(envelope.name());
            return;
        }

        // 无人订阅的事件不受深度限制
        if let Some(max) = self.config.max_depth {
            if depth > max {
                warn!(event = envelope.name(), depth, max, "event dropped: propagation depth exceeded");
                report.failures.push(EventFailure {
                    event: envelope.name(),
                    event_id: envelope.event_id(),
                    handler: "",
                    depth,
                    error: AppError::PropagationDepthExceeded {
                        event: envelope.name(),
                        depth,
                        max,
                    },
                });
                return;
            }
        }

        let event_ctx = ctx.for_event(&envelope);
        for (index, factory) in factories.iter().enumerate() {
            let span = info_span!(
                "dispatch_event",
                event = envelope.name(),
                event_id = %envelope.event_id(),
                handler = factory.handler_name(),
                depth
            );

            let result = run_event_handler(&event_ctx, factory, &envelope)
                .instrument(span)
                .await;

            match result {
                Ok(emitted) => {
                    report.committed += 1;
                    self.propagate(&event_ctx, emitted, depth + 1, report).await;
                }
                Err(error) => {
                    warn!(
                        event = envelope.name(),
                        handler = factory.handler_name(),
                        depth,
                        error = %error,
                        "event handler failed"
                    );
                    report.failures.push(EventFailure {
                        event: envelope.name(),
                        event_id: envelope.event_id(),
                        handler: factory.handler_name(),
                        depth,
                        error,
                    });

                    if self.config.event_failure_policy == EventFailurePolicy::SkipRemainingSiblings {
                        report.skipped += factories.len() - index - 1;
                        break;
                    }
                }
            }
        }
    }
}

async fn run_event_handler(
    ctx: &AppContext,
    factory: &HandlerFactory,
    envelope: &EventEnvelope,
) -> Result<Vec<EventEnvelope>, AppError> {
    let mut handler = construct(ctx, factory)?;
    run_lifecycle(ctx, factory, handler.as_mut(), Message::Event(envelope.clone())).await?;
    let events = handler.take_events();
    debug!(events = events.len(), "event handler committed");
    Ok(events)
}

fn construct(
    ctx: &AppContext,
    factory: &HandlerFactory,
) -> Result<Box<dyn ErasedHandler>, AppError> {
    if ctx.is_cancelled() {
        return Err(AppError::Cancelled {
            message: factory.message_name(),
            stage: LifecycleStage::Construct,
            rollback: None,
        });
    }

    factory
        .construct()
        .map_err(|source| AppError::HandlerConstructionFailed {
            message: factory.message_name(),
            handler: factory.handler_name(),
            source: Box::new(source),
        })
}

/// handle → commit；任一步失败则回滚并返回对应错误
async fn run_lifecycle(
    ctx: &AppContext,
    factory: &HandlerFactory,
    handler: &mut dyn ErasedHandler,
    message: Message,
) -> Result<BoxAnySend, AppError> {
    let handled = guard(ctx, handler.handle(ctx, message)).await;
    let output = match handled {
        Ok(output) => output,
        Err(cause) => {
            return Err(roll_back(ctx, factory, handler, LifecycleStage::Handle, cause).await);
        }
    };

    let committed = guard(ctx, handler.commit(ctx)).await;
    if let Err(cause) = committed {
        return Err(roll_back(ctx, factory, handler, LifecycleStage::Commit, cause).await);
    }

    Ok(output)
}

/// 与取消令牌竞速执行；已取消时不再调用处理器
async fn guard<T>(
    ctx: &AppContext,
    fut: impl Future<Output = Result<T, AppError>>,
) -> Result<T, Interruption> {
    if ctx.is_cancelled() {
        return Err(Interruption::Cancelled);
    }

    tokio::select! {
        biased;
        _ = ctx.cancellation.cancelled() => Err(Interruption::Cancelled),
        res = fut => res.map_err(Interruption::Failed),
    }
}

/// 回滚不参与取消竞速：取消后仍需丢弃暂存的副作用
async fn roll_back(
    ctx: &AppContext,
    factory: &HandlerFactory,
    handler: &mut dyn ErasedHandler,
    stage: LifecycleStage,
    cause: Interruption,
) -> AppError {
    let message = factory.message_name();

    let rollback = match handler.rollback(ctx).await {
        Ok(()) => None,
        Err(err) => {
            warn!(message, error = %err, "rollback failed");
            Some(Box::new(AppError::RollbackFailed {
                message,
                source: Box::new(err),
            }))
        }
    };

    match cause {
        Interruption::Cancelled => AppError::Cancelled {
            message,
            stage,
            rollback,
        },
        Interruption::Failed(err) => {
            debug!(message, %stage, error = %err, "rolled back");
            let source = Box::new(err);
            match stage {
                LifecycleStage::Commit => AppError::CommitFailed {
                    message,
                    source,
                    rollback,
                },
                _ => AppError::HandleFailed {
                    message,
                    source,
                    rollback,
                },
            }
        }
    }
}

mod common;

use common::*;
use ddd_application::Bootstrapper;
use ddd_application::config::{DispatchConfig, EventFailurePolicy};
use ddd_application::context::AppContext;
use ddd_application::error::{AppError, LifecycleStage};
use ddd_domain::domain_event::BusinessContext;

#[tokio::test]
async fn event_without_subscribers_is_dropped_silently() -> anyhow::Result<()> {
    let journal = Journal::default();
    let bootstrapper = Bootstrapper::builder()
        .register_command_handler_factory::<PlaceOrder, _, _>(emitting(
            "cmd",
            &journal,
            Script::ok(),
            |buf| buf.record(OrderIgnored),
        ))?
        .build();

    let outcome = bootstrapper
        .handle_command(&AppContext::default(), PlaceOrder { quantity: 2 })
        .await?;

    assert_eq!(outcome.propagation.dispatched(), 1);
    assert_eq!(outcome.propagation.unhandled(), &["order.ignored"]);
    assert_eq!(outcome.into_result()?, 20);
    Ok(())
}

#[tokio::test]
async fn all_factories_for_an_event_run_in_registration_order() -> anyhow::Result<()> {
    let journal = Journal::default();
    let bootstrapper = Bootstrapper::builder()
        .register_command_handler_factory::<PlaceOrder, _, _>(emitting(
            "cmd",
            &journal,
            Script::ok(),
            |buf| buf.record(OrderPlaced),
        ))?
        .register_event_handler_factory::<OrderPlaced, _, _>(recorder("first", &journal, Script::ok()))
        .register_event_handler_factory::<OrderPlaced, _, _>(recorder("second", &journal, Script::ok()))
        .build();

    let outcome = bootstrapper
        .handle_command(&AppContext::default(), PlaceOrder { quantity: 1 })
        .await?;

    assert_eq!(outcome.propagation.committed(), 2);
    assert_eq!(journal.labels_with("commit"), vec!["cmd", "first", "second"]);
    Ok(())
}

#[tokio::test]
async fn cascading_events_complete_depth_first() -> anyhow::Result<()> {
    let journal = Journal::default();
    let bootstrapper = Bootstrapper::builder()
        .register_command_handler_factory::<PlaceOrder, _, _>(emitting(
            "cmd",
            &journal,
            Script::ok(),
            |buf| {
                buf.record(OrderPlaced);
                buf.record(OrderAudited);
            },
        ))?
        .register_event_handler_factory::<OrderPlaced, _, _>(emitting(
            "placed-a",
            &journal,
            Script::ok(),
            |buf| buf.record(OrderShipped),
        ))
        .register_event_handler_factory::<OrderPlaced, _, _>(recorder("placed-b", &journal, Script::ok()))
        .register_event_handler_factory::<OrderShipped, _, _>(recorder("shipped", &journal, Script::ok()))
        .register_event_handler_factory::<OrderAudited, _, _>(recorder("audited", &journal, Script::ok()))
        .build();

    let outcome = bootstrapper
        .handle_command(&AppContext::default(), PlaceOrder { quantity: 1 })
        .await?;

    assert_eq!(
        journal.labels_with("commit"),
        vec!["cmd", "placed-a", "shipped", "placed-b", "audited"]
    );
    assert_eq!(outcome.propagation.dispatched(), 3);
    assert_eq!(outcome.propagation.committed(), 4);
    assert!(outcome.propagation.is_clean());
    Ok(())
}

#[tokio::test]
async fn failing_sibling_does_not_stop_the_others() -> anyhow::Result<()> {
    let journal = Journal::default();
    let bootstrapper = Bootstrapper::builder()
        .register_command_handler_factory::<PlaceOrder, _, _>(emitting(
            "cmd",
            &journal,
            Script::ok(),
            |buf| {
                buf.record(OrderPlaced);
                buf.record(OrderAudited);
            },
        ))?
        .register_event_handler_factory::<OrderPlaced, _, _>(emitting(
            "broken",
            &journal,
            Script::failing_handle(),
            |buf| buf.record(OrderShipped),
        ))
        .register_event_handler_factory::<OrderPlaced, _, _>(recorder("healthy", &journal, Script::ok()))
        .register_event_handler_factory::<OrderShipped, _, _>(recorder("shipped", &journal, Script::ok()))
        .register_event_handler_factory::<OrderAudited, _, _>(recorder("audited", &journal, Script::ok()))
        .build();

    let outcome = bootstrapper
        .handle_command(&AppContext::default(), PlaceOrder { quantity: 3 })
        .await?;

    assert_eq!(outcome.output, 30);
    assert_eq!(journal.count("broken:rollback"), 1);
    assert_eq!(journal.count("broken:commit"), 0);
    assert_eq!(journal.labels_with("commit"), vec!["cmd", "healthy", "audited"]);
    assert_eq!(journal.count("cmd:rollback"), 0);

    let failures = outcome.propagation.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].event, "order.placed");
    assert_eq!(failures[0].depth, 1);
    assert!(failures[0].handler.contains("Recorder"));
    assert!(matches!(failures[0].error, AppError::HandleFailed { .. }));

    match outcome.into_result() {
        Err(AppError::EventPropagationFailed { failures }) => assert_eq!(failures.len(), 1),
        other => panic!("unexpected result: {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn skip_policy_stops_remaining_siblings_of_same_event() -> anyhow::Result<()> {
    let journal = Journal::default();
    let config = DispatchConfig::builder()
        .event_failure_policy(EventFailurePolicy::SkipRemainingSiblings)
        .build();
    let bootstrapper = Bootstrapper::builder()
        .config(config)
        .register_command_handler_factory::<PlaceOrder, _, _>(emitting(
            "cmd",
            &journal,
            Script::ok(),
            |buf| {
                buf.record(OrderPlaced);
                buf.record(OrderAudited);
            },
        ))?
        .register_event_handler_factory::<OrderPlaced, _, _>(recorder(
            "broken",
            &journal,
            Script::failing_commit(),
        ))
        .register_event_handler_factory::<OrderPlaced, _, _>(recorder("skipped", &journal, Script::ok()))
        .register_event_handler_factory::<OrderAudited, _, _>(recorder("audited", &journal, Script::ok()))
        .build();

    let outcome = bootstrapper
        .handle_command(&AppContext::default(), PlaceOrder { quantity: 1 })
        .await?;

    assert_eq!(journal.count("skipped:handle"), 0);
    assert_eq!(journal.count("broken:rollback"), 1);
    assert_eq!(journal.count("audited:commit"), 1);
    assert_eq!(outcome.propagation.skipped(), 1);
    assert!(matches!(
        outcome.propagation.failures()[0].error,
        AppError::CommitFailed { .. }
    ));
    Ok(())
}

#[tokio::test]
async fn depth_limit_records_and_drops_deeper_events() -> anyhow::Result<()> {
    let journal = Journal::default();
    let config = DispatchConfig::builder().max_depth(1).build();
    let bootstrapper = Bootstrapper::builder()
        .config(config)
        .register_command_handler_factory::<PlaceOrder, _, _>(emitting(
            "cmd",
            &journal,
            Script::ok(),
            |buf| buf.record(OrderPlaced),
        ))?
        .register_event_handler_factory::<OrderPlaced, _, _>(emitting(
            "placed",
            &journal,
            Script::ok(),
            |buf| buf.record(OrderShipped),
        ))
        .register_event_handler_factory::<OrderShipped, _, _>(recorder("shipped", &journal, Script::ok()))
        .build();

    let outcome = bootstrapper
        .handle_command(&AppContext::default(), PlaceOrder { quantity: 1 })
        .await?;

    assert_eq!(journal.count("placed:commit"), 1);
    assert_eq!(journal.count("shipped:handle"), 0);
    let failures = outcome.propagation.failures();
    assert_eq!(failures.len(), 1);
    assert!(matches!(
        failures[0].error,
        AppError::PropagationDepthExceeded {
            event: "order.shipped",
            depth: 2,
            max: 1
        }
    ));
    Ok(())
}

#[tokio::test]
async fn depth_limit_ignores_events_without_subscribers() -> anyhow::Result<()> {
    let journal = Journal::default();
    let config = DispatchConfig::builder().max_depth(1).build();
    let bootstrapper = Bootstrapper::builder()
        .config(config)
        .register_command_handler_factory::<PlaceOrder, _, _>(emitting(
            "cmd",
            &journal,
            Script::ok(),
            |buf| buf.record(OrderPlaced),
        ))?
        .register_event_handler_factory::<OrderPlaced, _, _>(emitting(
            "placed",
            &journal,
            Script::ok(),
            |buf| buf.record(OrderIgnored),
        ))
        .build();

    let outcome = bootstrapper
        .handle_command(&AppContext::default(), PlaceOrder { quantity: 1 })
        .await?;

    assert!(outcome.propagation.is_clean(), "{:?}", outcome.propagation.failures());
    assert_eq!(outcome.propagation.unhandled(), &["order.ignored"]);
    assert_eq!(outcome.propagation.dispatched(), 2);
    assert_eq!(outcome.into_result()?, 10);
    Ok(())
}

#[tokio::test]
async fn failing_event_factory_is_recorded_and_siblings_run() -> anyhow::Result<()> {
    let journal = Journal::default();
    let bootstrapper = Bootstrapper::builder()
        .register_command_handler_factory::<PlaceOrder, _, _>(emitting(
            "cmd",
            &journal,
            Script::ok(),
            |buf| buf.record(OrderPlaced),
        ))?
        .register_event_handler_factory::<OrderPlaced, Recorder, _>(|| {
            Err(AppError::Infra("mailer unavailable".into()))
        })
        .register_event_handler_factory::<OrderPlaced, _, _>(recorder("healthy", &journal, Script::ok()))
        .build();

    let outcome = bootstrapper
        .handle_command(&AppContext::default(), PlaceOrder { quantity: 2 })
        .await?;

    assert_eq!(outcome.output, 20);
    assert_eq!(journal.labels_with("commit"), vec!["cmd", "healthy"]);
    assert_eq!(journal.labels_with("rollback"), Vec::<String>::new());

    let failures = outcome.propagation.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].event, "order.placed");
    match &failures[0].error {
        AppError::HandlerConstructionFailed { message, source, .. } => {
            assert_eq!(*message, "order.placed");
            assert!(matches!(**source, AppError::Infra(_)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn event_commit_failure_keeps_rollback_failure() -> anyhow::Result<()> {
    let journal = Journal::default();
    let script = Script {
        fail_commit: true,
        fail_rollback: true,
        ..Script::ok()
    };
    let bootstrapper = Bootstrapper::builder()
        .register_command_handler_factory::<PlaceOrder, _, _>(emitting(
            "cmd",
            &journal,
            Script::ok(),
            |buf| buf.record(OrderPlaced),
        ))?
        .register_event_handler_factory::<OrderPlaced, _, _>(emitting(
            "broken",
            &journal,
            script,
            |buf| buf.record(OrderShipped),
        ))
        .register_event_handler_factory::<OrderShipped, _, _>(recorder("shipped", &journal, Script::ok()))
        .build();

    let outcome = bootstrapper
        .handle_command(&AppContext::default(), PlaceOrder { quantity: 1 })
        .await?;

    assert_eq!(journal.count("broken:commit"), 1);
    assert_eq!(journal.count("broken:rollback"), 1);
    assert_eq!(journal.count("shipped:handle"), 0);
    assert_eq!(journal.count("cmd:rollback"), 0);

    let failures = outcome.propagation.failures();
    assert_eq!(failures.len(), 1);
    let error = &failures[0].error;
    assert!(matches!(error, AppError::CommitFailed { .. }));
    assert!(matches!(
        error.rollback_error(),
        Some(AppError::RollbackFailed { message: "order.placed", .. })
    ));
    let text = error.to_string();
    assert!(text.contains("broken commit failed"), "{text}");
    assert!(text.contains("broken rollback failed"), "{text}");
    Ok(())
}

#[tokio::test]
async fn cancellation_during_propagation_spares_the_command() -> anyhow::Result<()> {
    let journal = Journal::default();
    let ctx = AppContext::default();
    let token = ctx.cancellation.clone();
    let bootstrapper = Bootstrapper::builder()
        .register_command_handler_factory::<PlaceOrder, _, _>(emitting(
            "cmd",
            &journal,
            Script::ok(),
            |buf| {
                buf.record(OrderPlaced);
                buf.record(OrderAudited);
            },
        ))?
        .register_event_handler_factory::<OrderPlaced, _, _>(emitting(
            "canceller",
            &journal,
            Script::ok(),
            move |_| token.cancel(),
        ))
        .register_event_handler_factory::<OrderPlaced, _, _>(recorder("sibling", &journal, Script::ok()))
        .register_event_handler_factory::<OrderAudited, _, _>(recorder("audited", &journal, Script::ok()))
        .build();

    let outcome = bootstrapper.handle_command(&ctx, PlaceOrder { quantity: 4 }).await?;

    assert_eq!(outcome.output, 40);
    assert_eq!(journal.count("cmd:commit"), 1);
    assert_eq!(journal.count("cmd:rollback"), 0);
    assert_eq!(journal.count("canceller:commit"), 0);
    assert_eq!(journal.count("canceller:rollback"), 1);
    assert_eq!(journal.count("sibling:handle"), 0);
    assert_eq!(journal.count("audited:handle"), 0);
    assert_eq!(outcome.propagation.committed(), 0);

    let failures = outcome.propagation.failures();
    assert_eq!(failures.len(), 3);
    assert!(failures.iter().all(|f| f.error.is_cancelled()));
    assert!(matches!(
        failures[0].error,
        AppError::Cancelled { stage: LifecycleStage::Commit, .. }
    ));
    assert!(matches!(
        failures[1].error,
        AppError::Cancelled { stage: LifecycleStage::Construct, .. }
    ));
    assert_eq!(failures[2].event, "order.audited");
    Ok(())
}

#[tokio::test]
async fn event_handlers_see_event_as_causation() -> anyhow::Result<()> {
    let journal = Journal::default();
    let bootstrapper = Bootstrapper::builder()
        .register_command_handler_factory::<PlaceOrder, _, _>(emitting(
            "cmd",
            &journal,
            Script::ok(),
            |buf| buf.record(OrderPlaced),
        ))?
        .register_event_handler_factory::<OrderPlaced, _, _>(recorder("evt", &journal, Script::ok()))
        .build();

    let ctx = AppContext::new(
        BusinessContext::builder()
            .correlation_id("cor-1".to_string())
            .causation_id("request-1".to_string())
            .build(),
    );
    bootstrapper
        .handle_command(&ctx, PlaceOrder { quantity: 1 })
        .await?;

    let entries = journal.entries();
    assert!(entries.contains(&"cmd:caused_by:request-1".to_string()));
    let evt_cause = entries
        .iter()
        .find_map(|e| e.strip_prefix("evt:caused_by:"))
        .expect("event handler saw a causation id");
    assert_ne!(evt_cause, "request-1");
    assert!(uuid_like(evt_cause), "{evt_cause}");
    Ok(())
}

fn uuid_like(s: &str) -> bool {
    s.len() == 36 && s.chars().filter(|c| *c == '-').count() == 4
}

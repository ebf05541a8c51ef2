use ddd_application::config::DispatchConfig;
use ddd_application::context::AppContext;
use ddd_domain::domain_event::BusinessContext;
use demo::model::{ChangeEmailCommand, User};
use demo::{App, init_tracing};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let app = App::new(DispatchConfig::default())?;
    app.users().insert(User::new("u1", "old@example.com"));

    let ctx = AppContext::new(
        BusinessContext::builder()
            .maybe_correlation_id(Some("cor-1".into()))
            .maybe_actor_type(Some("user".into()))
            .maybe_actor_id(Some("u1".into()))
            .build(),
    );

    let outcome = app
        .handle_command(
            &ctx,
            ChangeEmailCommand {
                user_id: "u1".into(),
                new_email: "a@b.com".into(),
            },
        )
        .await?;

    info!(
        committed = outcome.propagation.committed(),
        unhandled = ?outcome.propagation.unhandled(),
        "change email dispatched"
    );
    outcome.into_result()?;

    for n in app.notifications().sent() {
        info!(user_id = %n.user_id, new_email = %n.new_email, old_email = %n.old_email, "notification sent");
    }

    // 未知用户 -> HandleFailed（仓储 NotFound），状态保持不变
    if let Err(err) = app
        .handle_command(
            &ctx,
            ChangeEmailCommand {
                user_id: "u404".into(),
                new_email: "x@y.com".into(),
            },
        )
        .await
    {
        warn!(error = %err, "command rejected as expected");
    }

    Ok(())
}

use async_trait::async_trait;
use ddd_application::{
    Bootstrapper, CommandHandler, EventHandler, HandlerLifecycle, config::DispatchConfig,
    config::EventFailurePolicy, context::AppContext, error::AppError,
};
use ddd_domain::domain_event::{BusinessContext, EventBuffer, EventEnvelope};
use ddd_macros::{Command, DomainEvent};
use std::sync::{Arc, Mutex};

#[derive(Debug, Command)]
#[command(name = "order.place", output = u64)]
struct PlaceOrder {
    sku: String,
    quantity: u32,
}

#[derive(Debug, DomainEvent)]
#[domain_event(name = "order.placed")]
struct OrderPlaced {
    order_no: u64,
    sku: String,
}

#[derive(Debug, DomainEvent)]
#[domain_event(name = "stock.reserved")]
struct StockReserved {
    order_no: u64,
}

type Ledger = Arc<Mutex<Vec<String>>>;

struct PlaceOrderHandler {
    next_no: u64,
    events: EventBuffer,
}

#[async_trait]
impl HandlerLifecycle for PlaceOrderHandler {
    async fn commit(&mut self, _ctx: &AppContext) -> Result<(), AppError> {
        Ok(())
    }

    async fn rollback(&mut self, _ctx: &AppContext) -> Result<(), AppError> {
        self.events.clear();
        Ok(())
    }

    fn take_events(&mut self) -> Vec<EventEnvelope> {
        self.events.drain()
    }
}

#[async_trait]
impl CommandHandler<PlaceOrder> for PlaceOrderHandler {
    async fn handle(&mut self, _ctx: &AppContext, cmd: PlaceOrder) -> Result<u64, AppError> {
        if cmd.quantity == 0 {
            return Err(AppError::Validation("quantity must be positive".into()));
        }
        self.events.record(OrderPlaced {
            order_no: self.next_no,
            sku: cmd.sku,
        });
        Ok(self.next_no)
    }
}

struct ReserveStock {
    ledger: Ledger,
    staged: Option<String>,
    events: EventBuffer,
}

#[async_trait]
impl HandlerLifecycle for ReserveStock {
    async fn commit(&mut self, _ctx: &AppContext) -> Result<(), AppError> {
        if let Some(line) = self.staged.take() {
            self.ledger
                .lock()
                .map_err(|_| AppError::Infra("ledger lock poisoned".into()))?
                .push(line);
        }
        Ok(())
    }

    async fn rollback(&mut self, _ctx: &AppContext) -> Result<(), AppError> {
        self.staged = None;
        self.events.clear();
        Ok(())
    }

    fn take_events(&mut self) -> Vec<EventEnvelope> {
        self.events.drain()
    }
}

#[async_trait]
impl EventHandler<OrderPlaced> for ReserveStock {
    async fn handle(&mut self, _ctx: &AppContext, event: &OrderPlaced) -> Result<(), AppError> {
        self.staged = Some(format!("reserved {} for #{}", event.sku, event.order_no));
        self.events.record(StockReserved {
            order_no: event.order_no,
        });
        Ok(())
    }
}

struct AnnounceReservation {
    ledger: Ledger,
}

#[async_trait]
impl HandlerLifecycle for AnnounceReservation {
    async fn commit(&mut self, _ctx: &AppContext) -> Result<(), AppError> {
        Ok(())
    }

    async fn rollback(&mut self, _ctx: &AppContext) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl EventHandler<StockReserved> for AnnounceReservation {
    async fn handle(&mut self, ctx: &AppContext, event: &StockReserved) -> Result<(), AppError> {
        let line = format!(
            "announced #{} (caused by {})",
            event.order_no,
            ctx.biz.causation_id().unwrap_or("-")
        );
        self.ledger
            .lock()
            .map_err(|_| AppError::Infra("ledger lock poisoned".into()))?
            .push(line);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let ledger: Ledger = Arc::default();
    let reserve_ledger = ledger.clone();
    let announce_ledger = ledger.clone();

    let bootstrapper = Bootstrapper::builder()
        .config(
            DispatchConfig::builder()
                .event_failure_policy(EventFailurePolicy::Continue)
                .max_depth(4)
                .build(),
        )
        .register_command_handler_factory::<PlaceOrder, _, _>(|| {
            Ok(PlaceOrderHandler {
                next_no: 1001,
                events: EventBuffer::new(),
            })
        })?
        .register_event_handler_factory::<OrderPlaced, _, _>(move || {
            Ok(ReserveStock {
                ledger: reserve_ledger.clone(),
                staged: None,
                events: EventBuffer::new(),
            })
        })
        .register_event_handler_factory::<StockReserved, _, _>(move || {
            Ok(AnnounceReservation {
                ledger: announce_ledger.clone(),
            })
        })
        .build();

    let ctx = AppContext::new(
        BusinessContext::builder()
            .correlation_id("example-1".to_string())
            .build(),
    );

    let order_no = bootstrapper
        .handle_command(
            &ctx,
            PlaceOrder {
                sku: "SKU-42".into(),
                quantity: 3,
            },
        )
        .await?
        .into_result()?;
    println!("order placed: #{order_no}");

    let rejected = bootstrapper
        .handle_command(
            &ctx,
            PlaceOrder {
                sku: "SKU-42".into(),
                quantity: 0,
            },
        )
        .await;
    println!("rejected: {}", rejected.err().map(|e| e.to_string()).unwrap_or_default());

    for line in ledger.lock().map_err(|_| anyhow::anyhow!("ledger lock poisoned"))?.iter() {
        println!("{line}");
    }
    Ok(())
}

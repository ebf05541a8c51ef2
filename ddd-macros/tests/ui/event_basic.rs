use ddd_domain::domain_event::{DomainEvent, EventEnvelope};
use ddd_macros::DomainEvent;

#[derive(Debug, DomainEvent)]
struct AccountOpened {
    id: String,
}

#[derive(Debug, DomainEvent)]
#[domain_event(name = "account.closed")]
enum AccountClosed {
    ByOwner,
    ByAdmin { reason: String },
}

fn main() {
    let env = EventEnvelope::new(AccountOpened { id: "a-1".into() });
    assert!(env.is::<AccountOpened>());
    let _ = AccountClosed::ByAdmin { reason: "fraud".into() };
    let _ = AccountClosed::ByOwner;
    let _ = <AccountClosed as DomainEvent>::NAME;
}

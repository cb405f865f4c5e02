//! Background task that auto-confirms overdue checkouts.
//!
//! Runs in a tokio::spawn loop, checking every `sweep_interval_secs` for
//! checkouts whose owner confirmation has been pending since before the
//! configured window (72h by default) and settling them in the renter's
//! favor. The deadline is computed from the persisted `requested_at`, so
//! restarts are harmless, and the conditional settlement write keeps the
//! sweep idempotent.

use std::sync::Arc;

use tokio::time::Duration;
use tracing::{info, warn};

use super::checkout::CheckoutService;
use crate::shared::shutdown::ShutdownSignal;

/// Start the checkout timeout sweep task.
pub fn start_checkout_timeout_task(
    service: Arc<CheckoutService>,
    shutdown: ShutdownSignal,
    sweep_interval_secs: u64,
    confirmation_window_hours: i64,
) {
    tokio::spawn(async move {
        info!(
            sweep_interval = sweep_interval_secs,
            window_hours = confirmation_window_hours,
            "Checkout timeout sweep started"
        );

        let window = chrono::Duration::hours(confirmation_window_hours);
        let mut interval = tokio::time::interval(Duration::from_secs(sweep_interval_secs));

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    metrics::counter!("checkout_sweep_runs_total").increment(1);
                    match service.auto_confirm_overdue(window).await {
                        Ok(0) => {}
                        Ok(applied) => {
                            info!(applied, "Checkout timeout sweep auto-confirmed checkouts");
                        }
                        Err(e) => {
                            warn!(error = %e, "Checkout timeout sweep error");
                        }
                    }
                }
                _ = shutdown.notified().wait() => {
                    info!("Checkout timeout sweep shutting down");
                    break;
                }
            }
        }

        info!("Checkout timeout sweep stopped");
    });
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::events::create_event_bus;
    use crate::domain::checkout::{Checkout, CheckoutKind};
    use crate::domain::property::Property;
    use crate::domain::rent_request::RentRequest;
    use crate::domain::user::{User, UserRole};
    use crate::domain::RepositoryProvider;
    use crate::infrastructure::memory::InMemoryRepositoryProvider;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    async fn overdue_checkout(repos: &Arc<InMemoryRepositoryProvider>) -> Uuid {
        let owner = User::new("Omar Owner", "omar@example.com", UserRole::Owner);
        let renter = User::new("Rita Renter", "rita@example.com", UserRole::Renter);
        let property = Property::new(
            owner.id,
            "Sunny flat",
            "12 Elm Street",
            "1200.00".parse().unwrap(),
            "600.00".parse().unwrap(),
            "USD",
        );

        let mut request = RentRequest::new(
            property.id,
            renter.id,
            owner.id,
            NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            property.rent_amount,
            property.deposit_amount,
            "USD",
        )
        .unwrap();
        request.confirm().unwrap();
        request.mark_paid().unwrap();

        let mut checkout = Checkout::new(request.id, CheckoutKind::Normal, None);
        checkout.requested_at = Utc::now() - chrono::Duration::hours(73);
        let checkout_id = checkout.id;

        repos.users().save(owner).await.unwrap();
        repos.users().save(renter).await.unwrap();
        repos.properties().save(property).await.unwrap();
        repos.rent_requests().save(request).await.unwrap();
        repos.checkouts().save(checkout).await.unwrap();

        checkout_id
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_task_settles_overdue_checkouts() {
        let repos = Arc::new(InMemoryRepositoryProvider::new());
        let checkout_id = overdue_checkout(&repos).await;

        let service = Arc::new(CheckoutService::new(
            repos.clone() as Arc<dyn RepositoryProvider>,
            create_event_bus(),
        ));
        let shutdown = ShutdownSignal::new();

        start_checkout_timeout_task(service, shutdown.clone(), 60, 72);

        // first interval tick fires immediately; give the task time to run it
        tokio::time::sleep(Duration::from_secs(1)).await;

        let settled = repos
            .checkouts()
            .find_by_id(checkout_id)
            .await
            .unwrap()
            .unwrap();
        assert!(settled.is_settled());

        shutdown.trigger();
    }
}

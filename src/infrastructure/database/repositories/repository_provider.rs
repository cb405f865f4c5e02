//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::checkout::{AgentDecisionRepository, CheckoutRepository};
use crate::domain::payment::PaymentRepository;
use crate::domain::property::PropertyRepository;
use crate::domain::rent_request::RentRequestRepository;
use crate::domain::repositories::RepositoryProvider;
use crate::domain::user::UserRepository;

use super::checkout_repository::SeaOrmCheckoutRepository;
use super::decision_repository::SeaOrmAgentDecisionRepository;
use super::payment_repository::SeaOrmPaymentRepository;
use super::property_repository::SeaOrmPropertyRepository;
use super::rent_request_repository::SeaOrmRentRequestRepository;
use super::user_repository::SeaOrmUserRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let request = repos.rent_requests().find_by_id(id).await?;
/// let checkout = repos.checkouts().find_by_rent_request(id).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    users: SeaOrmUserRepository,
    properties: SeaOrmPropertyRepository,
    rent_requests: SeaOrmRentRequestRepository,
    payments: SeaOrmPaymentRepository,
    checkouts: SeaOrmCheckoutRepository,
    decisions: SeaOrmAgentDecisionRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            users: SeaOrmUserRepository::new(db.clone()),
            properties: SeaOrmPropertyRepository::new(db.clone()),
            rent_requests: SeaOrmRentRequestRepository::new(db.clone()),
            payments: SeaOrmPaymentRepository::new(db.clone()),
            checkouts: SeaOrmCheckoutRepository::new(db.clone()),
            decisions: SeaOrmAgentDecisionRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    fn properties(&self) -> &dyn PropertyRepository {
        &self.properties
    }

    fn rent_requests(&self) -> &dyn RentRequestRepository {
        &self.rent_requests
    }

    fn payments(&self) -> &dyn PaymentRepository {
        &self.payments
    }

    fn checkouts(&self) -> &dyn CheckoutRepository {
        &self.checkouts
    }

    fn decisions(&self) -> &dyn AgentDecisionRepository {
        &self.decisions
    }
}

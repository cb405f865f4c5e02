//! SeaORM implementation of PropertyRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use super::{db_err, parse_amount};
use crate::domain::property::{Property, PropertyRepository};
use crate::domain::DomainResult;
use crate::infrastructure::database::entities::property;

pub struct SeaOrmPropertyRepository {
    db: DatabaseConnection,
}

impl SeaOrmPropertyRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: property::Model) -> Property {
    Property {
        id: m.id,
        owner_id: m.owner_id,
        title: m.title,
        address: m.address,
        rent_amount: parse_amount(&m.rent_amount),
        deposit_amount: parse_amount(&m.deposit_amount),
        currency: m.currency,
        is_active: m.is_active,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

#[async_trait]
impl PropertyRepository for SeaOrmPropertyRepository {
    async fn save(&self, p: Property) -> DomainResult<()> {
        debug!("Saving property: {}", p.id);

        let model = property::ActiveModel {
            id: Set(p.id),
            owner_id: Set(p.owner_id),
            title: Set(p.title),
            address: Set(p.address),
            rent_amount: Set(p.rent_amount.to_string()),
            deposit_amount: Set(p.deposit_amount.to_string()),
            currency: Set(p.currency),
            is_active: Set(p.is_active),
            created_at: Set(p.created_at),
            updated_at: Set(p.updated_at),
        };
        model.insert(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Property>> {
        let model = property::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }
}

//! Stock repository: items and their append-only movement trail.
//!
//! The cached `current_stock` on an item only changes together with a new
//! movement row, under a version compare-and-swap. The movement's
//! `sequence` is the item version it produced, so two writers that read the
//! same version collide on a unique key even without row locks.

use bursar_core::ActorContext;
use bursar_core::inventory::{ItemType, StockOperation, StockOrigin, compute_stock_change};
use bursar_core::LedgerError;
use bursar_core::originators::ensure_income_account;
use bursar_shared::config::LedgerConfig;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait, prelude::DateTimeWithTimeZone, sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::account::load_account;
use super::for_update;
use crate::entities::{items, sea_orm_active_enums, stock_movements};
use crate::error::PostingError;
use crate::retry::with_retry;

/// Input for registering an item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItem {
    /// Unique item code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Inventory or service.
    pub item_type: ItemType,
    /// Stock on hand when the item is registered.
    pub opening_stock: i32,
    /// Level at or below which the item should be reordered (0 disables).
    pub reorder_level: i32,
    /// Default selling price.
    pub unit_price: Decimal,
    /// Income account credited when the item is invoiced.
    pub income_account_id: Option<Uuid>,
}

/// Stock repository.
#[derive(Debug, Clone)]
pub struct StockRepository {
    db: DatabaseConnection,
    config: LedgerConfig,
}

impl StockRepository {
    /// Creates a new stock repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, config: LedgerConfig) -> Self {
        Self { db, config }
    }

    /// Registers an item, recording its opening stock as the first movement.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for blank fields, negative quantities or prices,
    /// opening stock on a service item, a code already in use, or an income
    /// account of another category, and `AccountNotFound` for an unknown
    /// income account.
    pub async fn create_item(
        &self,
        input: NewItem,
        actor: ActorContext,
    ) -> Result<items::Model, PostingError> {
        validate_new_item(&input)?;

        let txn = self.db.begin().await?;

        if let Some(account_id) = input.income_account_id {
            ensure_income_account(&load_account(&txn, account_id).await?)?;
        }

        let code = input.code.trim().to_string();
        let existing = items::Entity::find()
            .filter(items::Column::Code.eq(code.as_str()))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(LedgerError::Validation(format!("item code '{code}' already exists")).into());
        }

        let now = Utc::now().into();
        let item = items::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(code.clone()),
            name: Set(input.name.trim().to_string()),
            item_type: Set(input.item_type.into()),
            current_stock: Set(0),
            reorder_level: Set(input.reorder_level),
            unit_price: Set(input.unit_price),
            income_account_id: Set(input.income_account_id),
            is_active: Set(true),
            version: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|err| PostingError::from_claim(err, "item", code.as_str()))?;

        let item_id = item.id;
        if input.opening_stock > 0 {
            Self::record_movement_in(
                &txn,
                item_id,
                input.opening_stock,
                StockOperation::Set,
                actor,
                StockOrigin::Opening,
            )
            .await?;
        }

        let item = items::Entity::find_by_id(item_id)
            .one(&txn)
            .await?
            .ok_or(LedgerError::NotFound {
                entity: "item",
                id: item_id,
            })?;

        txn.commit().await?;

        info!(item_id = %item.id, code = %item.code, stock = item.current_stock, "item created");
        Ok(item)
    }

    /// Records one stock movement inside the caller's transaction.
    ///
    /// `delta` is interpreted per `operation`: the change for `add`,
    /// `subtract` and `adjustment`, the target level for `set`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown item, `Validation` for a service
    /// item or a quantity with the wrong sign, and `ConcurrentModification`
    /// when another writer changed the item first.
    pub async fn record_movement_in(
        txn: &DatabaseTransaction,
        item_id: Uuid,
        delta: i32,
        operation: StockOperation,
        actor: ActorContext,
        origin: StockOrigin,
    ) -> Result<stock_movements::Model, PostingError> {
        let backend = txn.get_database_backend();
        let item = for_update(items::Entity::find_by_id(item_id), backend)
            .one(txn)
            .await?
            .ok_or(LedgerError::NotFound {
                entity: "item",
                id: item_id,
            })?;

        if item.item_type != sea_orm_active_enums::ItemType::Inventory {
            return Err(LedgerError::Validation(format!(
                "item {} is a service and carries no stock",
                item.code
            ))
            .into());
        }

        let change = compute_stock_change(item.current_stock, delta, operation)?;
        let sequence = item.version + 1;
        let now: DateTimeWithTimeZone = Utc::now().into();

        let result = items::Entity::update_many()
            .col_expr(items::Column::CurrentStock, Expr::value(change.new))
            .col_expr(items::Column::Version, Expr::value(sequence))
            .col_expr(items::Column::UpdatedAt, Expr::value(now))
            .filter(items::Column::Id.eq(item_id))
            .filter(items::Column::Version.eq(item.version))
            .exec(txn)
            .await?;
        if result.rows_affected != 1 {
            return Err(LedgerError::ConcurrentModification {
                entity: "item",
                key: item_id.to_string(),
            }
            .into());
        }

        let movement = stock_movements::ActiveModel {
            id: Set(Uuid::new_v4()),
            item_id: Set(item_id),
            sequence: Set(sequence),
            delta: Set(change.delta),
            operation: Set(operation.into()),
            previous_stock: Set(change.previous),
            new_stock: Set(change.new),
            actor_id: Set(actor.user_id.into_inner()),
            origin_type: Set(origin.into()),
            origin_id: Set(origin.origin_id()),
            created_at: Set(now),
        }
        .insert(txn)
        .await
        .map_err(|err| PostingError::from_claim(err, "item", item_id.to_string()))?;

        debug!(
            item_id = %item_id,
            operation = %operation,
            previous = change.previous,
            new = change.new,
            "stock movement recorded"
        );
        Ok(movement)
    }

    /// Manually adjusts an item's stock in its own transaction.
    ///
    /// # Errors
    ///
    /// See [`StockRepository::record_movement_in`].
    pub async fn adjust_stock(
        &self,
        item_id: Uuid,
        delta: i32,
        operation: StockOperation,
        actor: ActorContext,
    ) -> Result<stock_movements::Model, PostingError> {
        with_retry("adjust_stock", self.config.max_retries, move || async move {
            let txn = self.db.begin().await?;
            let movement = Self::record_movement_in(
                &txn,
                item_id,
                delta,
                operation,
                actor,
                StockOrigin::Adjustment,
            )
            .await?;
            txn.commit().await?;
            Ok(movement)
        })
        .await
    }

    /// Lists an item's movements in the order they were recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_movements(
        &self,
        item_id: Uuid,
    ) -> Result<Vec<stock_movements::Model>, PostingError> {
        let movements = stock_movements::Entity::find()
            .filter(stock_movements::Column::ItemId.eq(item_id))
            .order_by_asc(stock_movements::Column::Sequence)
            .all(&self.db)
            .await?;
        Ok(movements)
    }

    /// Finds an item by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_item(&self, item_id: Uuid) -> Result<Option<items::Model>, PostingError> {
        Ok(items::Entity::find_by_id(item_id).one(&self.db).await?)
    }

    /// Lists active inventory items at or below their reorder level.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn items_needing_reorder(&self) -> Result<Vec<items::Model>, PostingError> {
        let items = items::Entity::find()
            .filter(items::Column::IsActive.eq(true))
            .filter(items::Column::ItemType.eq(sea_orm_active_enums::ItemType::Inventory))
            .order_by_asc(items::Column::Code)
            .all(&self.db)
            .await?;
        Ok(items.into_iter().filter(items::Model::needs_reorder).collect())
    }
}

fn validate_new_item(input: &NewItem) -> Result<(), LedgerError> {
    if input.code.trim().is_empty() || input.name.trim().is_empty() {
        return Err(LedgerError::Validation("item code and name are required".to_string()));
    }
    if input.opening_stock < 0 || input.reorder_level < 0 {
        return Err(LedgerError::Validation(
            "stock quantities cannot be negative".to_string(),
        ));
    }
    if input.unit_price < Decimal::ZERO {
        return Err(LedgerError::Validation("unit price cannot be negative".to_string()));
    }
    if !input.item_type.is_stock_tracked() && input.opening_stock != 0 {
        return Err(LedgerError::Validation(
            "service items carry no stock".to_string(),
        ));
    }
    Ok(())
}

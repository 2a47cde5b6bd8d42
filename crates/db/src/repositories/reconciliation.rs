//! Reconciliation repository: marking journal lines as cleared by a bank
//! statement.

use bursar_core::reconciliation::{LineReconState, plan_reconciliation};
use bursar_core::{ActorContext, LedgerError};
use bursar_shared::config::LedgerConfig;
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait, sea_query::Expr,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::account::load_account;
use crate::entities::{bank_reconciliations, journal_lines};
use crate::error::PostingError;
use crate::retry::with_retry;

/// Result of a reconciliation batch.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationOutcome {
    /// The batch record; `None` when every line was already reconciled.
    pub reconciliation: Option<bank_reconciliations::Model>,
    /// Lines reconciled by this batch.
    pub newly_reconciled: Vec<Uuid>,
    /// Lines that were reconciled before and were left untouched.
    pub already_reconciled: Vec<Uuid>,
}

/// Reconciliation repository.
#[derive(Debug, Clone)]
pub struct ReconciliationRepository {
    db: DatabaseConnection,
    config: LedgerConfig,
}

impl ReconciliationRepository {
    /// Creates a new reconciliation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, config: LedgerConfig) -> Self {
        Self { db, config }
    }

    /// Reconciles a batch of journal lines against a statement.
    ///
    /// The batch is all-or-nothing. Lines already reconciled keep their
    /// original date; repeating a batch is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty batch, `NotFound` when any line id
    /// is unknown, and `AccountNotFound` for an unknown bank account.
    pub async fn reconcile_lines(
        &self,
        line_ids: &[Uuid],
        statement_date: NaiveDate,
        actor: ActorContext,
        bank_account_id: Option<Uuid>,
    ) -> Result<ReconciliationOutcome, PostingError> {
        with_retry("reconcile_lines", self.config.max_retries, move || async move {
            let txn = self.db.begin().await?;

            if let Some(account_id) = bank_account_id {
                load_account(&txn, account_id).await?;
            }

            let found: Vec<(Uuid, bool)> = journal_lines::Entity::find()
                .filter(journal_lines::Column::Id.is_in(line_ids.iter().copied()))
                .select_only()
                .column(journal_lines::Column::Id)
                .column(journal_lines::Column::Reconciled)
                .into_tuple()
                .all(&txn)
                .await?;
            let states: Vec<LineReconState> = found
                .into_iter()
                .map(|(line_id, reconciled)| LineReconState {
                    line_id,
                    reconciled,
                })
                .collect();

            let plan = plan_reconciliation(line_ids, &states)?;
            if plan.is_noop() {
                return Ok(ReconciliationOutcome {
                    reconciliation: None,
                    newly_reconciled: Vec::new(),
                    already_reconciled: plan.already_reconciled,
                });
            }

            let result = journal_lines::Entity::update_many()
                .col_expr(journal_lines::Column::Reconciled, Expr::value(true))
                .col_expr(journal_lines::Column::ReconciledAt, Expr::value(statement_date))
                .filter(journal_lines::Column::Id.is_in(plan.to_mark.iter().copied()))
                .filter(journal_lines::Column::Reconciled.eq(false))
                .exec(&txn)
                .await?;
            if usize::try_from(result.rows_affected).ok() != Some(plan.to_mark.len()) {
                return Err(LedgerError::ConcurrentModification {
                    entity: "journal_line",
                    key: format!("reconciliation batch of {}", plan.to_mark.len()),
                }
                .into());
            }

            let reconciled_count = i32::try_from(plan.to_mark.len())
                .map_err(|_| LedgerError::Validation("reconciliation batch too large".to_string()))?;
            let record = bank_reconciliations::ActiveModel {
                id: Set(Uuid::new_v4()),
                statement_date: Set(statement_date),
                bank_account_id: Set(bank_account_id),
                reconciled_count: Set(reconciled_count),
                created_by: Set(actor.user_id.into_inner()),
                created_at: Set(Utc::now().into()),
            }
            .insert(&txn)
            .await?;

            txn.commit().await?;

            info!(
                reconciliation_id = %record.id,
                statement_date = %statement_date,
                newly_reconciled = plan.to_mark.len(),
                already_reconciled = plan.already_reconciled.len(),
                "journal lines reconciled"
            );

            Ok(ReconciliationOutcome {
                reconciliation: Some(record),
                newly_reconciled: plan.to_mark,
                already_reconciled: plan.already_reconciled,
            })
        })
        .await
    }

    /// Lists reconciliation batches, newest statement first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_reconciliations(
        &self,
    ) -> Result<Vec<bank_reconciliations::Model>, PostingError> {
        let records = bank_reconciliations::Entity::find()
            .order_by_desc(bank_reconciliations::Column::StatementDate)
            .order_by_desc(bank_reconciliations::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(records)
    }
}

//! Invoice repository: issuing invoices.
//!
//! An invoice, its line items, the stock it consumes and its journal are
//! written in one transaction. The invoice number is the journal reference.

use std::collections::HashMap;

use bursar_core::accounts::{AccountInfo, AccountRole, PostingTarget};
use bursar_core::inventory::{StockOperation, StockOrigin};
use bursar_core::ledger::{JournalKind, PostJournalInput};
use bursar_core::originators::{
    IssueInvoiceInput, build_invoice_lines, ensure_income_account, line_amount,
};
use bursar_core::reconciliation::SettlementStatus;
use bursar_core::{ActorContext, LedgerError};
use bursar_shared::config::LedgerConfig;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use super::account::{load_account, role_account};
use super::for_update;
use super::journal::{JournalRepository, PostedJournal};
use super::stock::StockRepository;
use crate::entities::{invoice_items, invoices, items, sea_orm_active_enums, stock_movements};
use crate::error::PostingError;
use crate::retry::with_retry;

/// An issued invoice with everything written alongside it.
#[derive(Debug, Clone)]
pub struct IssuedInvoice {
    /// The invoice row.
    pub invoice: invoices::Model,
    /// Line items in input order.
    pub items: Vec<invoice_items::Model>,
    /// The invoice journal.
    pub journal: PostedJournal,
    /// Stock movements for inventory lines.
    pub movements: Vec<stock_movements::Model>,
}

/// Invoice repository.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    db: DatabaseConnection,
    config: LedgerConfig,
    journal: JournalRepository,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: LedgerConfig) -> Self {
        let journal = JournalRepository::new(db.clone(), config.clone());
        Self {
            db,
            config,
            journal,
        }
    }

    /// Issues an invoice.
    ///
    /// Debits the receivable account for the total and credits each
    /// distinct income target; inventory lines decrement stock.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for malformed input or a line crediting a
    /// non-income account, `MissingAccount` when no
    /// receivable (or needed default revenue) account exists, `NotFound`
    /// for an unknown item, and any posting error. Nothing is written on
    /// error.
    pub async fn issue_invoice(
        &self,
        input: IssueInvoiceInput,
        actor: ActorContext,
    ) -> Result<IssuedInvoice, PostingError> {
        input.validate()?;
        let input = &input;
        with_retry("issue_invoice", self.config.max_retries, move || async move {
            self.try_issue(input, actor).await
        })
        .await
    }

    async fn try_issue(
        &self,
        input: &IssueInvoiceInput,
        actor: ActorContext,
    ) -> Result<IssuedInvoice, PostingError> {
        let txn = self.db.begin().await?;

        let receivable = role_account(&txn, AccountRole::Receivable).await?;
        let stock_items = lock_items(&txn, input).await?;

        let mut revenue_default: Option<AccountInfo> = None;
        let mut priced: Vec<(PostingTarget, Decimal)> = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            let amount = line_amount(line)?;
            let item = line.item_id.and_then(|id| stock_items.get(&id));
            let income_id = line
                .income_account_id
                .or_else(|| item.and_then(|i| i.income_account_id));
            let target = match income_id {
                Some(account_id) => {
                    let account = load_account(&txn, account_id).await?;
                    ensure_income_account(&account)?;
                    account.posting_target()
                }
                None => {
                    if revenue_default.is_none() {
                        revenue_default =
                            Some(role_account(&txn, AccountRole::RevenueDefault).await?);
                    }
                    revenue_default
                        .as_ref()
                        .map(AccountInfo::posting_target)
                        .ok_or(LedgerError::MissingAccount {
                            role: AccountRole::RevenueDefault,
                        })?
                }
            };
            priced.push((target, amount));
        }

        let number = self
            .journal
            .next_reference_in(&txn, JournalKind::Invoice, input.invoice_date)
            .await?;
        let description = input.journal_description(&number);
        let posting = build_invoice_lines(
            receivable.posting_target(),
            &priced,
            &description,
            actor.branch_id,
        )?;

        let invoice = insert_invoice(&txn, input, &number, posting.total, actor).await?;
        let line_items = insert_line_items(&txn, invoice.id, input, &priced).await?;

        let mut movements = Vec::new();
        for line in &input.lines {
            let Some(item) = line.item_id.and_then(|id| stock_items.get(&id)) else {
                continue;
            };
            if item.item_type == sea_orm_active_enums::ItemType::Inventory {
                let movement = StockRepository::record_movement_in(
                    &txn,
                    item.id,
                    -line.quantity,
                    StockOperation::Subtract,
                    actor,
                    StockOrigin::Invoice(invoice.id),
                )
                .await?;
                movements.push(movement);
            }
        }

        let journal = self
            .journal
            .post_generated_in(
                &txn,
                PostJournalInput {
                    kind: JournalKind::Invoice,
                    journal_date: input.invoice_date,
                    reference: Some(number.clone()),
                    description,
                    actor,
                    reverses_journal_id: None,
                    lines: posting.lines,
                },
            )
            .await?;

        let mut active: invoices::ActiveModel = invoice.into();
        active.journal_id = Set(Some(journal.header.id));
        let invoice = active.update(&txn).await?;

        txn.commit().await?;

        info!(
            invoice_id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            total = %invoice.total_amount,
            lines = line_items.len(),
            movements = movements.len(),
            "invoice issued"
        );

        Ok(IssuedInvoice {
            invoice,
            items: line_items,
            journal,
            movements,
        })
    }

    /// Finds an invoice by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_invoice(&self, id: Uuid) -> Result<Option<invoices::Model>, PostingError> {
        Ok(invoices::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Lists an invoice's line items.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_items(
        &self,
        invoice_id: Uuid,
    ) -> Result<Vec<invoice_items::Model>, PostingError> {
        let items = invoice_items::Entity::find()
            .filter(invoice_items::Column::InvoiceId.eq(invoice_id))
            .order_by_asc(invoice_items::Column::LineNo)
            .all(&self.db)
            .await?;
        Ok(items)
    }

    /// Lists invoices that still have a balance due.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_outstanding(&self) -> Result<Vec<invoices::Model>, PostingError> {
        let invoices = invoices::Entity::find()
            .filter(invoices::Column::Status.ne(sea_orm_active_enums::SettlementStatus::Paid))
            .order_by_asc(invoices::Column::InvoiceDate)
            .order_by_asc(invoices::Column::InvoiceNumber)
            .all(&self.db)
            .await?;
        Ok(invoices)
    }
}

/// Loads (and on Postgres locks) every item the invoice names.
async fn lock_items(
    txn: &DatabaseTransaction,
    input: &IssueInvoiceInput,
) -> Result<HashMap<Uuid, items::Model>, PostingError> {
    let backend = txn.get_database_backend();
    let mut loaded = HashMap::new();
    for item_id in input.lines.iter().filter_map(|line| line.item_id) {
        if loaded.contains_key(&item_id) {
            continue;
        }
        let item = for_update(items::Entity::find_by_id(item_id), backend)
            .one(txn)
            .await?
            .ok_or(LedgerError::NotFound {
                entity: "item",
                id: item_id,
            })?;
        if !item.is_active {
            return Err(LedgerError::Validation(format!("item {} is inactive", item.code)).into());
        }
        loaded.insert(item_id, item);
    }
    Ok(loaded)
}

async fn insert_invoice(
    txn: &DatabaseTransaction,
    input: &IssueInvoiceInput,
    number: &str,
    total: Decimal,
    actor: ActorContext,
) -> Result<invoices::Model, PostingError> {
    let now = Utc::now().into();
    invoices::ActiveModel {
        id: Set(Uuid::new_v4()),
        invoice_number: Set(number.to_string()),
        customer_name: Set(input.customer_name.trim().to_string()),
        invoice_date: Set(input.invoice_date),
        due_date: Set(input.due_date),
        description: Set(input.description.clone()),
        total_amount: Set(total),
        paid_amount: Set(Decimal::ZERO),
        status: Set(SettlementStatus::Pending.into()),
        journal_id: Set(None),
        created_by: Set(actor.user_id.into_inner()),
        branch_id: Set(actor.branch_id.map(|b| b.into_inner())),
        version: Set(1),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(txn)
    .await
    .map_err(|err| PostingError::from_claim(err, "invoice", number))
}

async fn insert_line_items(
    txn: &DatabaseTransaction,
    invoice_id: Uuid,
    input: &IssueInvoiceInput,
    priced: &[(PostingTarget, Decimal)],
) -> Result<Vec<invoice_items::Model>, PostingError> {
    let mut result = Vec::with_capacity(priced.len());
    for (index, (line, (target, amount))) in input.lines.iter().zip(priced).enumerate() {
        let line_no = i32::try_from(index + 1)
            .map_err(|_| LedgerError::Validation("too many invoice lines".to_string()))?;
        let model = invoice_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            invoice_id: Set(invoice_id),
            line_no: Set(line_no),
            item_id: Set(line.item_id),
            description: Set(line.description.clone()),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
            amount: Set(*amount),
            income_account_id: Set(target.account_id),
            income_sub_account_id: Set(target.sub_account_id),
        }
        .insert(txn)
        .await?;
        result.push(model);
    }
    Ok(result)
}

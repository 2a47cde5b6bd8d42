//! Payment repository: receipts against invoices, payments against
//! purchase orders, and voids.
//!
//! The payment reference is the journal reference. Paid amounts and status
//! on the target are cached and only ever written here, under a version
//! compare-and-swap.

use bursar_core::accounts::{AccountInfo, AccountRole};
use bursar_core::ledger::{JournalKind, PostJournalInput, month_prefix, next_reference};
use bursar_core::originators::{
    NewPurchaseOrder, PaymentMethod, PurchaseOrderPaymentInput, ReceivePaymentInput,
    VoidPaymentInput, build_purchase_order_payment_lines, build_receipt_lines,
    build_reversal_lines,
};
use bursar_core::reconciliation::{
    SettlementStatus, SettlementUpdate, apply_payment, reverse_payment,
};
use bursar_core::{ActorContext, LedgerError};
use bursar_shared::config::LedgerConfig;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    prelude::DateTimeWithTimeZone, sea_query::Expr,
};
use tracing::{info, warn};
use uuid::Uuid;

use super::account::role_account;
use super::for_update;
use super::journal::{JournalRepository, PostedJournal, load_journal};
use crate::entities::{
    bank_transactions, invoices, payments, purchase_orders,
    sea_orm_active_enums::{BankDirection, PaymentStatus, PaymentTarget},
};
use crate::error::PostingError;
use crate::retry::with_retry;

/// Prefix of purchase-order numbers.
pub const PURCHASE_ORDER_PREFIX: &str = "PO";

/// A completed payment with everything written alongside it.
#[derive(Debug, Clone)]
pub struct RecordedPayment {
    /// The payment row.
    pub payment: payments::Model,
    /// The payment journal.
    pub journal: PostedJournal,
    /// Paid amount and status of the target after the payment.
    pub settlement: SettlementUpdate,
    /// Bank record for check and bank-transfer payments.
    pub bank_transaction: Option<bank_transactions::Model>,
}

/// A voided payment.
#[derive(Debug, Clone)]
pub struct VoidedPayment {
    /// The payment row, now voided.
    pub payment: payments::Model,
    /// The reversing journal.
    pub journal: PostedJournal,
    /// Paid amount and status of the target after the void.
    pub settlement: Option<SettlementUpdate>,
}

/// Settlement state of an invoice or purchase order.
struct Settleable {
    id: Uuid,
    total: Decimal,
    paid: Decimal,
    version: i64,
}

/// Payment repository.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
    config: LedgerConfig,
    journal: JournalRepository,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: LedgerConfig) -> Self {
        let journal = JournalRepository::new(db.clone(), config.clone());
        Self {
            db,
            config,
            journal,
        }
    }

    /// Receives a payment against an invoice.
    ///
    /// Debits cash (cash method) or bank (every other method) and credits
    /// the receivable account.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown invoice, `InvalidAmount` or
    /// `Overpayment` (carrying the remaining balance) for an amount outside
    /// `0 < amount <= total - paid`, `MissingAccount` when a needed role is
    /// unassigned, and `ConcurrentModification` once retries are exhausted.
    pub async fn receive_invoice_payment(
        &self,
        input: ReceivePaymentInput,
        actor: ActorContext,
    ) -> Result<RecordedPayment, PostingError> {
        let input = &input;
        with_retry("receive_invoice_payment", self.config.max_retries, move || async move {
            self.try_receive(input, actor).await
        })
        .await
    }

    async fn try_receive(
        &self,
        input: &ReceivePaymentInput,
        actor: ActorContext,
    ) -> Result<RecordedPayment, PostingError> {
        let txn = self.db.begin().await?;

        let invoice = for_update(
            invoices::Entity::find_by_id(input.invoice_id),
            txn.get_database_backend(),
        )
        .one(&txn)
        .await?
        .ok_or(LedgerError::NotFound {
            entity: "invoice",
            id: input.invoice_id,
        })?;

        let settlement = apply_payment(invoice.total_amount, invoice.paid_amount, input.amount)
            .inspect_err(|err| {
                warn!(invoice_id = %invoice.id, amount = %input.amount, error = %err, "invoice payment rejected");
            })?;

        let settlement_account = role_account(&txn, input.method.settlement_role()).await?;
        let receivable = role_account(&txn, AccountRole::Receivable).await?;

        let reference = self
            .journal
            .next_reference_in(&txn, JournalKind::Payment, input.payment_date)
            .await?;
        let description = format!(
            "Payment {reference} for invoice {} ({})",
            invoice.invoice_number, input.method
        );
        let lines = build_receipt_lines(
            settlement_account.posting_target(),
            receivable.posting_target(),
            input.amount,
            &description,
            actor.branch_id,
        );
        let journal = self
            .journal
            .post_generated_in(
                &txn,
                PostJournalInput {
                    kind: JournalKind::Payment,
                    journal_date: input.payment_date,
                    reference: Some(reference.clone()),
                    description,
                    actor,
                    reverses_journal_id: None,
                    lines,
                },
            )
            .await?;

        let payment = insert_payment(
            &txn,
            PaymentTarget::Invoice,
            invoice.id,
            input.amount,
            input.method,
            input.payment_date,
            &reference,
            input.note.clone(),
            journal.header.id,
            actor,
        )
        .await?;

        let bank_transaction = record_bank_transaction(
            &txn,
            &payment,
            &settlement_account,
            input.method,
            BankDirection::Deposit,
        )
        .await?;

        update_invoice_settlement(
            &txn,
            &Settleable {
                id: invoice.id,
                total: invoice.total_amount,
                paid: invoice.paid_amount,
                version: invoice.version,
            },
            &settlement,
        )
        .await?;

        txn.commit().await?;

        info!(
            payment_id = %payment.id,
            reference = %payment.reference,
            invoice_id = %invoice.id,
            amount = %payment.amount,
            status = %settlement.status,
            "invoice payment received"
        );

        Ok(RecordedPayment {
            payment,
            journal,
            settlement,
            bank_transaction,
        })
    }

    /// Pays (part of) a purchase order.
    ///
    /// Debits the payable account and credits bank (cash for the cash
    /// method). Check and bank-transfer payments also write a bank
    /// transaction record.
    ///
    /// # Errors
    ///
    /// Same as [`PaymentRepository::receive_invoice_payment`].
    pub async fn pay_purchase_order(
        &self,
        input: PurchaseOrderPaymentInput,
        actor: ActorContext,
    ) -> Result<RecordedPayment, PostingError> {
        let input = &input;
        with_retry("pay_purchase_order", self.config.max_retries, move || async move {
            self.try_pay_purchase_order(input, actor).await
        })
        .await
    }

    async fn try_pay_purchase_order(
        &self,
        input: &PurchaseOrderPaymentInput,
        actor: ActorContext,
    ) -> Result<RecordedPayment, PostingError> {
        let txn = self.db.begin().await?;

        let order = for_update(
            purchase_orders::Entity::find_by_id(input.purchase_order_id),
            txn.get_database_backend(),
        )
        .one(&txn)
        .await?
        .ok_or(LedgerError::NotFound {
            entity: "purchase_order",
            id: input.purchase_order_id,
        })?;

        let settlement = apply_payment(order.total_amount, order.paid_amount, input.amount)
            .inspect_err(|err| {
                warn!(purchase_order_id = %order.id, amount = %input.amount, error = %err, "purchase order payment rejected");
            })?;

        let payable = role_account(&txn, AccountRole::Payable).await?;
        let settlement_account = role_account(&txn, input.method.settlement_role()).await?;

        let reference = self
            .journal
            .next_reference_in(&txn, JournalKind::PurchaseOrderPayment, input.payment_date)
            .await?;
        let description = format!(
            "Payment {reference} for purchase order {} ({})",
            order.po_number, input.method
        );
        let lines = build_purchase_order_payment_lines(
            payable.posting_target(),
            settlement_account.posting_target(),
            input.amount,
            &description,
            actor.branch_id,
        );
        let journal = self
            .journal
            .post_generated_in(
                &txn,
                PostJournalInput {
                    kind: JournalKind::PurchaseOrderPayment,
                    journal_date: input.payment_date,
                    reference: Some(reference.clone()),
                    description,
                    actor,
                    reverses_journal_id: None,
                    lines,
                },
            )
            .await?;

        let payment = insert_payment(
            &txn,
            PaymentTarget::PurchaseOrder,
            order.id,
            input.amount,
            input.method,
            input.payment_date,
            &reference,
            input.note.clone(),
            journal.header.id,
            actor,
        )
        .await?;

        let bank_transaction = record_bank_transaction(
            &txn,
            &payment,
            &settlement_account,
            input.method,
            BankDirection::Withdrawal,
        )
        .await?;

        update_purchase_order_settlement(
            &txn,
            &Settleable {
                id: order.id,
                total: order.total_amount,
                paid: order.paid_amount,
                version: order.version,
            },
            &settlement,
        )
        .await?;

        txn.commit().await?;

        info!(
            payment_id = %payment.id,
            reference = %payment.reference,
            purchase_order_id = %order.id,
            amount = %payment.amount,
            status = %settlement.status,
            "purchase order payment made"
        );

        Ok(RecordedPayment {
            payment,
            journal,
            settlement,
            bank_transaction,
        })
    }

    /// Voids a completed payment.
    ///
    /// Posts a reversing journal, reduces the target's paid amount and
    /// re-derives its status. Bank-recorded payments get an offsetting bank
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown payment and `AlreadyReversed` for
    /// a payment that is already voided.
    pub async fn void_payment(
        &self,
        input: VoidPaymentInput,
        actor: ActorContext,
    ) -> Result<VoidedPayment, PostingError> {
        if input.reason.trim().is_empty() {
            return Err(LedgerError::Validation("a void reason is required".to_string()).into());
        }
        let input = &input;
        with_retry("void_payment", self.config.max_retries, move || async move {
            self.try_void(input, actor).await
        })
        .await
    }

    async fn try_void(
        &self,
        input: &VoidPaymentInput,
        actor: ActorContext,
    ) -> Result<VoidedPayment, PostingError> {
        let txn = self.db.begin().await?;
        let backend = txn.get_database_backend();

        let payment = for_update(payments::Entity::find_by_id(input.payment_id), backend)
            .one(&txn)
            .await?
            .ok_or(LedgerError::NotFound {
                entity: "payment",
                id: input.payment_id,
            })?;
        if payment.status == PaymentStatus::Voided {
            return Err(LedgerError::AlreadyReversed {
                entity: "payment",
                id: payment.id,
            }
            .into());
        }

        let original = load_journal(&txn, payment.journal_id).await?;
        let journal = self
            .journal
            .post_in(
                &txn,
                PostJournalInput {
                    kind: JournalKind::Reversal,
                    journal_date: input.void_date,
                    reference: None,
                    description: format!(
                        "Void of payment {}: {}",
                        payment.reference,
                        input.reason.trim()
                    ),
                    actor,
                    reverses_journal_id: Some(original.header.id),
                    lines: build_reversal_lines(&original.line_inputs()),
                },
            )
            .await?;

        let settlement = match (payment.target_type, payment.target_id) {
            (PaymentTarget::Invoice, Some(invoice_id)) => {
                let invoice = for_update(invoices::Entity::find_by_id(invoice_id), backend)
                    .one(&txn)
                    .await?
                    .ok_or(LedgerError::NotFound {
                        entity: "invoice",
                        id: invoice_id,
                    })?;
                let target = Settleable {
                    id: invoice.id,
                    total: invoice.total_amount,
                    paid: invoice.paid_amount,
                    version: invoice.version,
                };
                let update = reverse_payment(target.total, target.paid, payment.amount)?;
                update_invoice_settlement(&txn, &target, &update).await?;
                Some(update)
            }
            (PaymentTarget::PurchaseOrder, Some(order_id)) => {
                let order = for_update(purchase_orders::Entity::find_by_id(order_id), backend)
                    .one(&txn)
                    .await?
                    .ok_or(LedgerError::NotFound {
                        entity: "purchase_order",
                        id: order_id,
                    })?;
                let target = Settleable {
                    id: order.id,
                    total: order.total_amount,
                    paid: order.paid_amount,
                    version: order.version,
                };
                let update = reverse_payment(target.total, target.paid, payment.amount)?;
                update_purchase_order_settlement(&txn, &target, &update).await?;
                Some(update)
            }
            _ => None,
        };

        let original_bank = bank_transactions::Entity::find()
            .filter(bank_transactions::Column::PaymentId.eq(payment.id))
            .order_by_asc(bank_transactions::Column::CreatedAt)
            .one(&txn)
            .await?;
        if let Some(bank) = original_bank {
            bank_transactions::ActiveModel {
                id: Set(Uuid::new_v4()),
                payment_id: Set(payment.id),
                bank_account_id: Set(bank.bank_account_id),
                amount: Set(bank.amount),
                direction: Set(match bank.direction {
                    BankDirection::Deposit => BankDirection::Withdrawal,
                    BankDirection::Withdrawal => BankDirection::Deposit,
                }),
                method: Set(bank.method),
                reference: Set(journal.header.reference.clone()),
                transaction_date: Set(input.void_date),
                created_at: Set(Utc::now().into()),
            }
            .insert(&txn)
            .await?;
        }

        let mut active: payments::ActiveModel = payment.into();
        active.status = Set(PaymentStatus::Voided);
        active.void_journal_id = Set(Some(journal.header.id));
        active.updated_at = Set(Utc::now().into());
        let payment = active.update(&txn).await?;

        txn.commit().await?;

        info!(
            payment_id = %payment.id,
            reference = %payment.reference,
            reversal = %journal.header.reference,
            "payment voided"
        );

        Ok(VoidedPayment {
            payment,
            journal,
            settlement,
        })
    }

    /// Registers a purchase order so payments can be made against it.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank supplier or non-positive total.
    pub async fn create_purchase_order(
        &self,
        input: NewPurchaseOrder,
        actor: ActorContext,
    ) -> Result<purchase_orders::Model, PostingError> {
        input.validate()?;
        let input = &input;
        with_retry("create_purchase_order", self.config.max_retries, move || async move {
            let txn = self.db.begin().await?;
            let number = self.next_purchase_order_number(&txn, input.order_date).await?;
            let now = Utc::now().into();
            let order = purchase_orders::ActiveModel {
                id: Set(Uuid::new_v4()),
                po_number: Set(number.clone()),
                supplier_name: Set(input.supplier_name.trim().to_string()),
                order_date: Set(input.order_date),
                total_amount: Set(input.total_amount),
                paid_amount: Set(Decimal::ZERO),
                status: Set(SettlementStatus::Pending.into()),
                created_by: Set(actor.user_id.into_inner()),
                version: Set(1),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(|err| PostingError::from_claim(err, "purchase_order", number.as_str()))?;
            txn.commit().await?;

            info!(purchase_order_id = %order.id, po_number = %order.po_number, "purchase order created");
            Ok(order)
        })
        .await
    }

    async fn next_purchase_order_number(
        &self,
        txn: &DatabaseTransaction,
        date: NaiveDate,
    ) -> Result<String, PostingError> {
        let prefix = month_prefix(PURCHASE_ORDER_PREFIX, date);
        let issued: Vec<String> = purchase_orders::Entity::find()
            .filter(purchase_orders::Column::PoNumber.starts_with(prefix.as_str()))
            .select_only()
            .column(purchase_orders::Column::PoNumber)
            .into_tuple()
            .all(txn)
            .await?;
        Ok(next_reference(
            PURCHASE_ORDER_PREFIX,
            date,
            issued.iter().map(String::as_str),
            self.config.reference_digits,
        ))
    }

    /// Finds a payment by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_payment(&self, id: Uuid) -> Result<Option<payments::Model>, PostingError> {
        Ok(payments::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Finds a purchase order by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_purchase_order(
        &self,
        id: Uuid,
    ) -> Result<Option<purchase_orders::Model>, PostingError> {
        Ok(purchase_orders::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Lists the payments made against an invoice or purchase order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_payments_for(
        &self,
        target_id: Uuid,
    ) -> Result<Vec<payments::Model>, PostingError> {
        let payments = payments::Entity::find()
            .filter(payments::Column::TargetId.eq(target_id))
            .order_by_asc(payments::Column::PaymentDate)
            .order_by_asc(payments::Column::Reference)
            .all(&self.db)
            .await?;
        Ok(payments)
    }

    /// Lists the bank transactions written for a payment.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_bank_transactions(
        &self,
        payment_id: Uuid,
    ) -> Result<Vec<bank_transactions::Model>, PostingError> {
        let records = bank_transactions::Entity::find()
            .filter(bank_transactions::Column::PaymentId.eq(payment_id))
            .order_by_asc(bank_transactions::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(records)
    }
}

#[allow(clippy::too_many_arguments)]
async fn insert_payment(
    txn: &DatabaseTransaction,
    target_type: PaymentTarget,
    target_id: Uuid,
    amount: Decimal,
    method: PaymentMethod,
    payment_date: NaiveDate,
    reference: &str,
    note: Option<String>,
    journal_id: Uuid,
    actor: ActorContext,
) -> Result<payments::Model, PostingError> {
    let now = Utc::now().into();
    payments::ActiveModel {
        id: Set(Uuid::new_v4()),
        target_type: Set(target_type),
        target_id: Set(Some(target_id)),
        amount: Set(amount),
        method: Set(method.into()),
        payment_date: Set(payment_date),
        reference: Set(reference.to_string()),
        status: Set(PaymentStatus::Completed),
        note: Set(note),
        journal_id: Set(journal_id),
        void_journal_id: Set(None),
        created_by: Set(actor.user_id.into_inner()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(txn)
    .await
    .map_err(|err| PostingError::from_claim(err, "payment", reference))
}

async fn record_bank_transaction(
    txn: &DatabaseTransaction,
    payment: &payments::Model,
    bank_account: &AccountInfo,
    method: PaymentMethod,
    direction: BankDirection,
) -> Result<Option<bank_transactions::Model>, PostingError> {
    if !method.records_bank_transaction() {
        return Ok(None);
    }
    let record = bank_transactions::ActiveModel {
        id: Set(Uuid::new_v4()),
        payment_id: Set(payment.id),
        bank_account_id: Set(bank_account.id),
        amount: Set(payment.amount),
        direction: Set(direction),
        method: Set(method.into()),
        reference: Set(payment.reference.clone()),
        transaction_date: Set(payment.payment_date),
        created_at: Set(Utc::now().into()),
    }
    .insert(txn)
    .await?;
    Ok(Some(record))
}

async fn update_invoice_settlement(
    txn: &DatabaseTransaction,
    target: &Settleable,
    update: &SettlementUpdate,
) -> Result<(), PostingError> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let status: crate::entities::sea_orm_active_enums::SettlementStatus = update.status.into();
    let result = invoices::Entity::update_many()
        .col_expr(invoices::Column::PaidAmount, Expr::value(update.paid))
        .col_expr(invoices::Column::Status, Expr::value(status))
        .col_expr(invoices::Column::Version, Expr::value(target.version + 1))
        .col_expr(invoices::Column::UpdatedAt, Expr::value(now))
        .filter(invoices::Column::Id.eq(target.id))
        .filter(invoices::Column::Version.eq(target.version))
        .exec(txn)
        .await?;
    ensure_single_row(result.rows_affected, "invoice", target.id)
}

async fn update_purchase_order_settlement(
    txn: &DatabaseTransaction,
    target: &Settleable,
    update: &SettlementUpdate,
) -> Result<(), PostingError> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let status: crate::entities::sea_orm_active_enums::SettlementStatus = update.status.into();
    let result = purchase_orders::Entity::update_many()
        .col_expr(purchase_orders::Column::PaidAmount, Expr::value(update.paid))
        .col_expr(purchase_orders::Column::Status, Expr::value(status))
        .col_expr(purchase_orders::Column::Version, Expr::value(target.version + 1))
        .col_expr(purchase_orders::Column::UpdatedAt, Expr::value(now))
        .filter(purchase_orders::Column::Id.eq(target.id))
        .filter(purchase_orders::Column::Version.eq(target.version))
        .exec(txn)
        .await?;
    ensure_single_row(result.rows_affected, "purchase_order", target.id)
}

fn ensure_single_row(rows_affected: u64, entity: &'static str, id: Uuid) -> Result<(), PostingError> {
    if rows_affected == 1 {
        Ok(())
    } else {
        Err(LedgerError::ConcurrentModification {
            entity,
            key: id.to_string(),
        }
        .into())
    }
}

//! Journal repository: the single write path into the ledger.
//!
//! Every journal is validated, written header first and lines in storage
//! order, then re-summed from the persisted lines before the transaction
//! may commit.

use std::collections::HashMap;

use bursar_core::accounts::AccountInfo;
use bursar_core::ledger::{
    JournalKind, JournalLineInput, JournalTotals, LedgerError, PostJournalInput, PostingService,
    month_prefix, next_reference,
};
use bursar_shared::config::LedgerConfig;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{error, info};
use uuid::Uuid;

use super::account::load_account;
use crate::entities::{journal_headers, journal_lines, sea_orm_active_enums};
use crate::error::PostingError;
use crate::retry::with_retry;

/// A journal as stored.
#[derive(Debug, Clone)]
pub struct PostedJournal {
    /// Journal header.
    pub header: journal_headers::Model,
    /// Lines in storage order (debits first).
    pub lines: Vec<journal_lines::Model>,
    /// Totals re-read from the stored lines.
    pub totals: JournalTotals,
}

impl PostedJournal {
    /// Lines converted back into posting inputs, in storage order.
    #[must_use]
    pub fn line_inputs(&self) -> Vec<JournalLineInput> {
        self.lines.iter().map(JournalLineInput::from).collect()
    }
}

/// Journal repository.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
    config: LedgerConfig,
}

impl JournalRepository {
    /// Creates a new journal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, config: LedgerConfig) -> Self {
        Self { db, config }
    }

    /// Posts a journal in its own transaction.
    ///
    /// A generated reference that collides with a concurrent writer is
    /// retried up to `ledger.max_retries` times.
    ///
    /// # Errors
    ///
    /// Returns the validation error that rejected the journal, or the
    /// database error that aborted it. Nothing is written in either case.
    pub async fn post(&self, input: PostJournalInput) -> Result<PostedJournal, PostingError> {
        let input = &input;
        with_retry("post_journal", self.config.max_retries, move || async move {
            let txn = self.db.begin().await?;
            let posted = self.post_in(&txn, input.clone()).await?;
            txn.commit().await?;
            Ok(posted)
        })
        .await
    }

    /// Posts a journal inside the caller's transaction.
    ///
    /// The caller commits; on any error it must drop the transaction so
    /// that the partial journal is rolled back.
    ///
    /// # Errors
    ///
    /// See [`JournalRepository::post`].
    pub async fn post_in(
        &self,
        txn: &DatabaseTransaction,
        input: PostJournalInput,
    ) -> Result<PostedJournal, PostingError> {
        self.post_checked_in(txn, input, false).await
    }

    /// Posts a journal whose reference the caller generated with
    /// [`JournalRepository::next_reference_in`] in the same transaction.
    ///
    /// A clash on that reference means another writer claimed it first and
    /// surfaces as a retryable `ConcurrentModification`.
    pub(crate) async fn post_generated_in(
        &self,
        txn: &DatabaseTransaction,
        input: PostJournalInput,
    ) -> Result<PostedJournal, PostingError> {
        self.post_checked_in(txn, input, true).await
    }

    async fn post_checked_in(
        &self,
        txn: &DatabaseTransaction,
        input: PostJournalInput,
        generated: bool,
    ) -> Result<PostedJournal, PostingError> {
        let tolerance = self.config.balance_tolerance;
        let totals = match PostingService::validate_lines(&input.lines, tolerance) {
            Ok(totals) => totals,
            Err(err) => {
                if matches!(err, LedgerError::UnbalancedJournal { .. }) {
                    error!(kind = %input.kind, payload = %payload(&input), error = %err, "unbalanced journal rejected");
                }
                return Err(err.into());
            }
        };

        self.write_journal(txn, &input, totals, generated)
            .await
            .inspect_err(|err| {
                if let PostingError::Database(db_err) = err {
                    error!(kind = %input.kind, payload = %payload(&input), error = %db_err, "journal write failed");
                }
            })
    }

    async fn write_journal(
        &self,
        txn: &DatabaseTransaction,
        input: &PostJournalInput,
        totals: JournalTotals,
        generated: bool,
    ) -> Result<PostedJournal, PostingError> {
        let (reference, generated) = match &input.reference {
            Some(reference) => (reference.clone(), generated),
            None => (
                self.next_reference_in(txn, input.kind, input.journal_date)
                    .await?,
                true,
            ),
        };

        let kind: sea_orm_active_enums::JournalKind = input.kind.into();
        let clash = journal_headers::Entity::find()
            .filter(journal_headers::Column::Kind.eq(kind))
            .filter(journal_headers::Column::Reference.eq(reference.as_str()))
            .one(txn)
            .await?;
        if clash.is_some() && generated {
            return Err(LedgerError::ConcurrentModification {
                entity: "journal_reference",
                key: reference,
            }
            .into());
        }
        if clash.is_some() {
            return Err(LedgerError::DuplicateReference {
                kind: input.kind.to_string(),
                reference,
            }
            .into());
        }

        let header = self.insert_header(txn, input, kind, &reference).await?;
        let lines = self
            .insert_lines(txn, header.id, PostingService::order_lines(input.lines.clone()))
            .await?;

        let persisted = self.persisted_totals(txn, header.id).await?;
        if let Err(err) = persisted.ensure_balanced(self.config.balance_tolerance) {
            error!(journal_id = %header.id, payload = %payload(input), error = %err, "stored journal does not balance");
            return Err(err.into());
        }

        info!(
            journal_id = %header.id,
            kind = %input.kind,
            reference = %header.reference,
            debit = %totals.debit,
            credit = %totals.credit,
            lines = lines.len(),
            "journal posted"
        );

        Ok(PostedJournal {
            header,
            lines,
            totals: persisted,
        })
    }

    async fn insert_header(
        &self,
        txn: &DatabaseTransaction,
        input: &PostJournalInput,
        kind: sea_orm_active_enums::JournalKind,
        reference: &str,
    ) -> Result<journal_headers::Model, PostingError> {
        let header = journal_headers::ActiveModel {
            id: Set(Uuid::new_v4()),
            kind: Set(kind),
            reference: Set(reference.to_string()),
            journal_date: Set(input.journal_date),
            description: Set(input.description.clone()),
            created_by: Set(input.actor.user_id.into_inner()),
            branch_id: Set(input.actor.branch_id.map(|b| b.into_inner())),
            reverses_journal_id: Set(input.reverses_journal_id),
            created_at: Set(Utc::now().into()),
        };

        header
            .insert(txn)
            .await
            .map_err(|err| PostingError::from_claim(err, "journal_reference", reference))
    }

    /// Inserts the lines, checking each line's accounts as it goes.
    async fn insert_lines(
        &self,
        txn: &DatabaseTransaction,
        journal_id: Uuid,
        lines: Vec<JournalLineInput>,
    ) -> Result<Vec<journal_lines::Model>, PostingError> {
        let now = Utc::now().into();
        let mut accounts: HashMap<Uuid, AccountInfo> = HashMap::new();
        let mut result = Vec::with_capacity(lines.len());

        for (index, line) in lines.into_iter().enumerate() {
            let account = cached_account(txn, &mut accounts, line.account_id).await?;
            let sub_account = match line.sub_account_id {
                Some(sub_id) => Some(cached_account(txn, &mut accounts, sub_id).await?),
                None => None,
            };
            PostingService::check_accounts(&account, sub_account.as_ref())?;

            let line_no = i32::try_from(index + 1)
                .map_err(|_| LedgerError::Validation("too many journal lines".to_string()))?;
            let model = journal_lines::ActiveModel {
                id: Set(Uuid::new_v4()),
                journal_id: Set(journal_id),
                line_no: Set(line_no),
                account_id: Set(line.account_id),
                sub_account_id: Set(line.sub_account_id),
                debit: Set(line.debit),
                credit: Set(line.credit),
                description: Set(line.description),
                branch_id: Set(line.branch_id.map(|b| b.into_inner())),
                reconciled: Set(false),
                reconciled_at: Set(None),
                created_at: Set(now),
            }
            .insert(txn)
            .await?;

            result.push(model);
        }

        Ok(result)
    }

    async fn persisted_totals(
        &self,
        txn: &DatabaseTransaction,
        journal_id: Uuid,
    ) -> Result<JournalTotals, PostingError> {
        let amounts: Vec<(Decimal, Decimal)> = journal_lines::Entity::find()
            .filter(journal_lines::Column::JournalId.eq(journal_id))
            .select_only()
            .column(journal_lines::Column::Debit)
            .column(journal_lines::Column::Credit)
            .into_tuple()
            .all(txn)
            .await?;

        Ok(amounts
            .into_iter()
            .fold(JournalTotals::default(), |acc, (debit, credit)| JournalTotals {
                debit: acc.debit + debit,
                credit: acc.credit + credit,
            }))
    }

    /// Computes the next reference for `kind` in the month of `date`.
    ///
    /// Two transactions may compute the same reference; the loser fails on
    /// the unique key with a retryable `ConcurrentModification`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn next_reference_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        kind: JournalKind,
        date: NaiveDate,
    ) -> Result<String, PostingError> {
        let prefix = month_prefix(kind.prefix(), date);
        let issued: Vec<String> = journal_headers::Entity::find()
            .filter(journal_headers::Column::Kind.eq(sea_orm_active_enums::JournalKind::from(kind)))
            .filter(journal_headers::Column::Reference.starts_with(prefix.as_str()))
            .select_only()
            .column(journal_headers::Column::Reference)
            .into_tuple()
            .all(conn)
            .await?;

        Ok(next_reference(
            kind.prefix(),
            date,
            issued.iter().map(String::as_str),
            self.config.reference_digits,
        ))
    }

    /// Gets a journal with its lines.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the journal does not exist.
    pub async fn get_journal(&self, journal_id: Uuid) -> Result<PostedJournal, PostingError> {
        load_journal(&self.db, journal_id).await
    }

    /// Lists journals of a kind, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_journals(
        &self,
        kind: Option<JournalKind>,
    ) -> Result<Vec<journal_headers::Model>, PostingError> {
        let mut query = journal_headers::Entity::find();
        if let Some(kind) = kind {
            query = query
                .filter(journal_headers::Column::Kind.eq(sea_orm_active_enums::JournalKind::from(kind)));
        }
        let headers = query
            .order_by_desc(journal_headers::Column::JournalDate)
            .order_by_desc(journal_headers::Column::Reference)
            .all(&self.db)
            .await?;
        Ok(headers)
    }
}

/// Loads a journal and its lines on any connection.
pub(crate) async fn load_journal<C: ConnectionTrait>(
    conn: &C,
    journal_id: Uuid,
) -> Result<PostedJournal, PostingError> {
    let header = journal_headers::Entity::find_by_id(journal_id)
        .one(conn)
        .await?
        .ok_or(LedgerError::NotFound {
            entity: "journal",
            id: journal_id,
        })?;

    let lines = journal_lines::Entity::find()
        .filter(journal_lines::Column::JournalId.eq(journal_id))
        .order_by_asc(journal_lines::Column::LineNo)
        .all(conn)
        .await?;

    let totals = JournalTotals {
        debit: lines.iter().map(|l| l.debit).sum(),
        credit: lines.iter().map(|l| l.credit).sum(),
    };

    Ok(PostedJournal {
        header,
        lines,
        totals,
    })
}

async fn cached_account(
    txn: &DatabaseTransaction,
    cache: &mut HashMap<Uuid, AccountInfo>,
    id: Uuid,
) -> Result<AccountInfo, PostingError> {
    if let Some(account) = cache.get(&id) {
        return Ok(account.clone());
    }
    let account = load_account(txn, id).await?;
    cache.insert(id, account.clone());
    Ok(account)
}

fn payload(input: &PostJournalInput) -> String {
    serde_json::to_string(input).unwrap_or_default()
}

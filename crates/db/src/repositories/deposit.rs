//! Deposit repository: money banked into an asset account.

use bursar_core::ledger::{JournalKind, PostJournalInput};
use bursar_core::originators::{DepositInput, build_deposit_lines};
use bursar_core::ActorContext;
use bursar_shared::config::LedgerConfig;
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::info;

use super::account::load_account;
use super::journal::{JournalRepository, PostedJournal};
use crate::error::PostingError;
use crate::retry::with_retry;

/// Deposit repository.
#[derive(Debug, Clone)]
pub struct DepositRepository {
    db: DatabaseConnection,
    config: LedgerConfig,
    journal: JournalRepository,
}

impl DepositRepository {
    /// Creates a new deposit repository.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: LedgerConfig) -> Self {
        let journal = JournalRepository::new(db.clone(), config.clone());
        Self {
            db,
            config,
            journal,
        }
    }

    /// Records a deposit: debit the deposit account, credit the source.
    ///
    /// The actor's branch is stamped on both lines and is mandatory.
    ///
    /// # Errors
    ///
    /// Returns `Validation` without a branch, for a non-positive amount, a
    /// non-asset deposit account or a source outside income, liability and
    /// equity; `AccountNotFound` for unknown accounts; and any posting error.
    pub async fn record_deposit(
        &self,
        input: DepositInput,
        actor: ActorContext,
    ) -> Result<PostedJournal, PostingError> {
        let input = &input;
        with_retry("record_deposit", self.config.max_retries, move || async move {
            let txn = self.db.begin().await?;

            let deposit_account = load_account(&txn, input.deposit_account_id).await?;
            let source_account = load_account(&txn, input.source_account_id).await?;
            let lines =
                build_deposit_lines(input, &deposit_account, &source_account, actor.branch_id)?;

            let journal = self
                .journal
                .post_in(
                    &txn,
                    PostJournalInput {
                        kind: JournalKind::Deposit,
                        journal_date: input.deposit_date,
                        reference: None,
                        description: input.description.clone(),
                        actor,
                        reverses_journal_id: None,
                        lines,
                    },
                )
                .await?;

            txn.commit().await?;

            info!(
                journal_id = %journal.header.id,
                reference = %journal.header.reference,
                amount = %input.amount,
                deposit_account = %deposit_account.code,
                source_account = %source_account.code,
                "deposit recorded"
            );
            Ok(journal)
        })
        .await
    }
}

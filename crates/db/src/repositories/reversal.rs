//! Reversal repository: undoing deposit and manual journals.

use bursar_core::ledger::{JournalKind, PostJournalInput};
use bursar_core::originators::{ReverseJournalInput, build_reversal_lines, ensure_reversible};
use bursar_core::{ActorContext, LedgerError};
use bursar_shared::config::LedgerConfig;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait};
use tracing::info;

use super::journal::{JournalRepository, PostedJournal, load_journal};
use crate::entities::journal_headers;
use crate::error::PostingError;
use crate::retry::with_retry;

/// Reversal repository.
#[derive(Debug, Clone)]
pub struct ReversalRepository {
    db: DatabaseConnection,
    config: LedgerConfig,
    journal: JournalRepository,
}

impl ReversalRepository {
    /// Creates a new reversal repository.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: LedgerConfig) -> Self {
        let journal = JournalRepository::new(db.clone(), config.clone());
        Self {
            db,
            config,
            journal,
        }
    }

    /// Posts a journal with every line of `input.journal_id` on the other side.
    ///
    /// Invoice and payment journals are undone through their documents
    /// (payments are voided) and are refused here.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown journal, `Validation` for a kind
    /// that cannot be reversed directly or a blank reason, and
    /// `AlreadyReversed` when a reversal already exists.
    pub async fn reverse_journal(
        &self,
        input: ReverseJournalInput,
        actor: ActorContext,
    ) -> Result<PostedJournal, PostingError> {
        if input.reason.trim().is_empty() {
            return Err(LedgerError::Validation("a reversal reason is required".to_string()).into());
        }
        let input = &input;
        with_retry("reverse_journal", self.config.max_retries, move || async move {
            let txn = self.db.begin().await?;

            let original = load_journal(&txn, input.journal_id).await?;
            ensure_reversible(original.header.kind.into(), original.header.id)?;

            let existing = journal_headers::Entity::find()
                .filter(journal_headers::Column::ReversesJournalId.eq(original.header.id))
                .one(&txn)
                .await?;
            if existing.is_some() {
                return Err(LedgerError::AlreadyReversed {
                    entity: "journal",
                    id: original.header.id,
                }
                .into());
            }

            let journal = self
                .journal
                .post_in(
                    &txn,
                    PostJournalInput {
                        kind: JournalKind::Reversal,
                        journal_date: input.reversal_date,
                        reference: None,
                        description: format!(
                            "Reversal of {}: {}",
                            original.header.reference,
                            input.reason.trim()
                        ),
                        actor,
                        reverses_journal_id: Some(original.header.id),
                        lines: build_reversal_lines(&original.line_inputs()),
                    },
                )
                .await?;

            txn.commit().await?;

            info!(
                journal_id = %journal.header.id,
                reference = %journal.header.reference,
                reverses = %original.header.reference,
                "journal reversed"
            );
            Ok(journal)
        })
        .await
    }
}

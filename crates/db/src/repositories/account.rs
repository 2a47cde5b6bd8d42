//! Account repository for chart of accounts database operations.
//!
//! Accounts are looked up by id, by code, or by their role tag. They are
//! deactivated, never deleted.

use bursar_core::accounts::{
    AccountCategory, AccountInfo, AccountRole, ChartEntry, NewAccount, validate_new_account,
};
use bursar_core::LedgerError;
use bursar_shared::config::{DeactivationPolicy, LedgerConfig};
use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use crate::entities::{accounts, journal_headers, journal_lines, sea_orm_active_enums};
use crate::error::PostingError;

/// Filter options for listing accounts.
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    /// Filter by category.
    pub category: Option<AccountCategory>,
    /// Filter by role tag.
    pub role: Option<AccountRole>,
    /// Only the sub-accounts of this parent.
    pub parent_id: Option<Uuid>,
    /// Only top-level accounts.
    pub top_level_only: bool,
    /// Skip deactivated accounts.
    pub active_only: bool,
}

/// Account repository for the chart of accounts.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
    policy: DeactivationPolicy,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: &LedgerConfig) -> Self {
        Self {
            db,
            policy: config.deactivation_policy,
        }
    }

    /// Registers a new account.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateCode` when the code is taken, `AccountNotFound`
    /// for an unknown parent, and `Validation` for every other rule
    /// (role/category mismatch, parent inactive or not top-level, role
    /// already carried by another active account).
    pub async fn create_account(&self, input: NewAccount) -> Result<accounts::Model, PostingError> {
        let txn = self.db.begin().await?;

        let parent = match input.parent_id {
            Some(parent_id) => Some(load_account(&txn, parent_id).await?),
            None => None,
        };
        validate_new_account(&input, parent.as_ref())?;

        let code = input.code.trim().to_string();
        let existing = accounts::Entity::find()
            .filter(accounts::Column::Code.eq(code.as_str()))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(LedgerError::DuplicateCode(code).into());
        }

        if let Some(role) = input.role
            && let Some(holder) = find_role_holder(&txn, role).await?
        {
            return Err(LedgerError::Validation(format!(
                "role '{role}' is already carried by account {}",
                holder.code
            ))
            .into());
        }

        let now = Utc::now().into();
        let account = accounts::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(code.clone()),
            name: Set(input.name.trim().to_string()),
            category: Set(input.category.into()),
            role: Set(input.role.map(Into::into)),
            parent_id: Set(input.parent_id),
            is_active: Set(true),
            opening_balance: Set(input.opening_balance),
            sort_order: Set(input.sort_order),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|err| PostingError::from_claim(err, "account", code.as_str()))?;

        txn.commit().await?;

        info!(account_id = %account.id, code = %account.code, "account created");
        Ok(account)
    }

    /// Finds an account by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<accounts::Model>, PostingError> {
        Ok(accounts::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Resolves an account by ID.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` when no account has this ID.
    pub async fn resolve_by_id(&self, id: Uuid) -> Result<AccountInfo, PostingError> {
        load_account(&self.db, id).await
    }

    /// Resolves an account by its code.
    ///
    /// # Errors
    ///
    /// Returns `AccountCodeNotFound` when no account has this code.
    pub async fn resolve_by_code(&self, code: &str) -> Result<AccountInfo, PostingError> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::Code.eq(code))
            .one(&self.db)
            .await?
            .ok_or_else(|| LedgerError::AccountCodeNotFound(code.to_string()))?;
        Ok(AccountInfo::from(&account))
    }

    /// Resolves the active account carrying `role`.
    ///
    /// # Errors
    ///
    /// Returns `MissingAccount` when no active account carries the role.
    pub async fn resolve_by_role(&self, role: AccountRole) -> Result<AccountInfo, PostingError> {
        role_account(&self.db, role).await
    }

    /// Lists accounts in chart order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(
        &self,
        filter: AccountFilter,
    ) -> Result<Vec<accounts::Model>, PostingError> {
        let mut query = accounts::Entity::find();

        if let Some(category) = filter.category {
            query = query.filter(
                accounts::Column::Category.eq(sea_orm_active_enums::AccountCategory::from(category)),
            );
        }
        if let Some(role) = filter.role {
            query = query
                .filter(accounts::Column::Role.eq(sea_orm_active_enums::AccountRole::from(role)));
        }
        if let Some(parent_id) = filter.parent_id {
            query = query.filter(accounts::Column::ParentId.eq(parent_id));
        }
        if filter.top_level_only {
            query = query.filter(accounts::Column::ParentId.is_null());
        }
        if filter.active_only {
            query = query.filter(accounts::Column::IsActive.eq(true));
        }

        let accounts = query
            .order_by_asc(accounts::Column::SortOrder)
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await?;

        Ok(accounts)
    }

    /// Deactivates an account so it accepts no new postings.
    ///
    /// `today` decides the open period for the
    /// [`DeactivationPolicy::RejectOpenUnreconciled`] policy.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for an unknown account, and
    /// `ConstraintViolation` when the policy refuses the change.
    pub async fn deactivate(
        &self,
        id: Uuid,
        today: NaiveDate,
    ) -> Result<accounts::Model, PostingError> {
        let txn = self.db.begin().await?;

        let account = accounts::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(LedgerError::AccountNotFound(id))?;
        if !account.is_active {
            return Ok(account);
        }

        if self.policy == DeactivationPolicy::RejectOpenUnreconciled {
            let month_start = today.with_day(1).unwrap_or(today);
            let open_lines = journal_lines::Entity::find()
                .inner_join(journal_headers::Entity)
                .filter(
                    Condition::any()
                        .add(journal_lines::Column::AccountId.eq(id))
                        .add(journal_lines::Column::SubAccountId.eq(id)),
                )
                .filter(journal_lines::Column::Reconciled.eq(false))
                .filter(journal_headers::Column::JournalDate.gte(month_start))
                .filter(journal_headers::Column::JournalDate.lte(today))
                .count(&txn)
                .await?;
            if open_lines > 0 {
                return Err(LedgerError::ConstraintViolation(format!(
                    "account {} has {open_lines} unreconciled line(s) in the open period",
                    account.code
                ))
                .into());
            }
        }

        let mut active: accounts::ActiveModel = account.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now().into());
        let account = active.update(&txn).await?;

        txn.commit().await?;

        info!(account_id = %account.id, code = %account.code, "account deactivated");
        Ok(account)
    }

    /// Checks that every role in `roles` is carried by an active account.
    ///
    /// # Errors
    ///
    /// Returns `MissingAccount` naming the first absent role.
    pub async fn ensure_required_roles(
        &self,
        roles: &[AccountRole],
    ) -> Result<Vec<AccountInfo>, PostingError> {
        let mut resolved = Vec::with_capacity(roles.len());
        for role in roles {
            resolved.push(role_account(&self.db, *role).await?);
        }
        Ok(resolved)
    }

    /// Creates every chart entry whose code is not yet taken.
    ///
    /// Entries must list parents before their sub-accounts. Returns the
    /// number of accounts created.
    ///
    /// # Errors
    ///
    /// Returns `AccountCodeNotFound` when a parent code cannot be resolved, and any
    /// error [`AccountRepository::create_account`] returns.
    pub async fn seed_chart(&self, chart: &[ChartEntry]) -> Result<usize, PostingError> {
        let mut created = 0;
        for (index, entry) in chart.iter().enumerate() {
            let exists = accounts::Entity::find()
                .filter(accounts::Column::Code.eq(entry.code))
                .count(&self.db)
                .await?
                > 0;
            if exists {
                continue;
            }

            let parent_id = match entry.parent_code {
                Some(code) => Some(self.resolve_by_code(code).await?.id),
                None => None,
            };
            self.create_account(NewAccount {
                code: entry.code.to_string(),
                name: entry.name.to_string(),
                category: entry.category,
                role: entry.role,
                parent_id,
                opening_balance: Decimal::ZERO,
                sort_order: i32::try_from(index).unwrap_or(i32::MAX),
            })
            .await?;
            created += 1;
        }
        Ok(created)
    }
}

/// Loads an account on any connection or transaction.
pub(crate) async fn load_account<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<AccountInfo, PostingError> {
    let account = accounts::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(LedgerError::AccountNotFound(id))?;
    Ok(AccountInfo::from(&account))
}

/// Resolves the active account carrying `role` on any connection.
pub(crate) async fn role_account<C: ConnectionTrait>(
    conn: &C,
    role: AccountRole,
) -> Result<AccountInfo, PostingError> {
    let account = find_role_holder(conn, role)
        .await?
        .ok_or(LedgerError::MissingAccount { role })?;
    Ok(AccountInfo::from(&account))
}

async fn find_role_holder<C: ConnectionTrait>(
    conn: &C,
    role: AccountRole,
) -> Result<Option<accounts::Model>, PostingError> {
    let account = accounts::Entity::find()
        .filter(accounts::Column::Role.eq(sea_orm_active_enums::AccountRole::from(role)))
        .filter(accounts::Column::IsActive.eq(true))
        .order_by_asc(accounts::Column::Code)
        .one(conn)
        .await?;
    Ok(account)
}

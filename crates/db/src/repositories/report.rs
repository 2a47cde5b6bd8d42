//! Report repository for financial report database operations.
//!
//! Every figure is recomputed from the stored journal lines; cached totals
//! on invoices, purchase orders and items are never read here.

use std::collections::HashMap;

use bursar_core::accounts::AccountInfo;
use bursar_core::reports::{
    AccountActivity, AccountBalance, BalanceSheetReport, GeneralLedgerReport,
    IncomeStatementReport, LedgerLine, LineFilter, ReportService, TrialBalanceReport,
};
use bursar_shared::config::LedgerConfig;
use bursar_shared::types::{BranchId, DateRange, PageRequest, PageResponse};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, SelectTwo,
};
use uuid::Uuid;

use crate::entities::{accounts, journal_headers, journal_lines, sea_orm_active_enums};
use crate::error::PostingError;

/// Report repository.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
    tolerance: Decimal,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: &LedgerConfig) -> Self {
        Self {
            db,
            tolerance: config.balance_tolerance,
        }
    }

    /// Lists journal lines with their journal, oldest first.
    ///
    /// An account filter matches lines posted to the account itself or to
    /// it as a sub-account.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an inverted date range.
    pub async fn list_lines(
        &self,
        filter: &LineFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<LedgerLine>, PostingError> {
        ReportService::validate_range(&filter.range)?;

        let total = lines_query(filter).count(&self.db).await?;
        let rows = lines_query(filter)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(
            to_ledger_lines(rows),
            page.page,
            page.per_page,
            total,
        ))
    }

    /// Opening, movement and closing balance of an account over `range`.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for an unknown account and `Validation`
    /// for an inverted date range.
    pub async fn account_balance(
        &self,
        account_id: Uuid,
        range: DateRange,
    ) -> Result<AccountActivity, PostingError> {
        ReportService::validate_range(&range)?;
        let account = self.account(account_id).await?;
        let info = AccountInfo::from(&account);

        let filter = LineFilter {
            account_id: Some(account_id),
            range: DateRange {
                from: None,
                to: range.to,
            },
            ..LineFilter::default()
        };
        let amounts: Vec<(NaiveDate, Decimal, Decimal)> = self
            .all_lines(&filter)
            .await?
            .into_iter()
            .map(|line| (line.journal_date, line.debit, line.credit))
            .collect();

        let opening = self.rolled_up_opening(&account).await?;

        Ok(ReportService::summarize_activity(
            &info,
            opening,
            &amounts,
            range,
        ))
    }

    /// Trial balance as of a date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn trial_balance(&self, as_of: NaiveDate) -> Result<TrialBalanceReport, PostingError> {
        let balances = self.balances(DateRange::up_to(as_of), true).await?;
        Ok(ReportService::generate_trial_balance(as_of, balances, self.tolerance))
    }

    /// Balance sheet as of a date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn balance_sheet(&self, as_of: NaiveDate) -> Result<BalanceSheetReport, PostingError> {
        let balances = self.balances(DateRange::up_to(as_of), true).await?;
        Ok(ReportService::generate_balance_sheet(as_of, balances, self.tolerance))
    }

    /// Income statement for a period.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an inverted date range.
    pub async fn income_statement(
        &self,
        period: DateRange,
    ) -> Result<IncomeStatementReport, PostingError> {
        ReportService::validate_range(&period)?;
        let balances = self.balances(period, false).await?;
        Ok(ReportService::generate_income_statement(period, balances))
    }

    /// General ledger of one account with running balances.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for an unknown account and `Validation`
    /// for an inverted date range.
    pub async fn general_ledger(
        &self,
        account_id: Uuid,
        period: DateRange,
    ) -> Result<GeneralLedgerReport, PostingError> {
        let activity = self.account_balance(account_id, period).await?;
        let account = self.account(account_id).await?;

        let filter = LineFilter {
            account_id: Some(account_id),
            range: period,
            ..LineFilter::default()
        };
        let lines = self.all_lines(&filter).await?;

        Ok(ReportService::build_general_ledger(
            &AccountInfo::from(&account),
            period,
            activity.opening,
            lines,
        ))
    }

    async fn account(&self, account_id: Uuid) -> Result<accounts::Model, PostingError> {
        let account = accounts::Entity::find_by_id(account_id)
            .one(&self.db)
            .await?
            .ok_or(bursar_core::LedgerError::AccountNotFound(account_id))?;
        Ok(account)
    }

    /// Opening balance of an account plus those of its sub-accounts.
    async fn rolled_up_opening(&self, account: &accounts::Model) -> Result<Decimal, PostingError> {
        if account.parent_id.is_some() {
            return Ok(account.opening_balance);
        }
        let children = accounts::Entity::find()
            .filter(accounts::Column::ParentId.eq(account.id))
            .all(&self.db)
            .await?;
        Ok(children
            .iter()
            .fold(account.opening_balance, |sum, child| sum + child.opening_balance))
    }

    async fn all_lines(&self, filter: &LineFilter) -> Result<Vec<LedgerLine>, PostingError> {
        let rows = lines_query(filter).all(&self.db).await?;
        Ok(to_ledger_lines(rows))
    }

    /// Per-account balances over `range`, each account holding only the
    /// lines posted to it as the leaf (its own lines, or its lines as a
    /// sub-account).
    async fn balances(
        &self,
        range: DateRange,
        include_opening: bool,
    ) -> Result<Vec<AccountBalance>, PostingError> {
        let accounts = accounts::Entity::find()
            .order_by_asc(accounts::Column::SortOrder)
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await?;

        let filter = LineFilter {
            range,
            ..LineFilter::default()
        };
        let mut totals: HashMap<Uuid, (Decimal, Decimal)> = HashMap::new();
        for line in self.all_lines(&filter).await? {
            let entry = totals
                .entry(line.sub_account_id.unwrap_or(line.account_id))
                .or_insert((Decimal::ZERO, Decimal::ZERO));
            entry.0 += line.debit;
            entry.1 += line.credit;
        }

        Ok(accounts
            .iter()
            .filter_map(|account| {
                let (debit, credit) = totals.get(&account.id).copied().unwrap_or_default();
                let opening = if include_opening {
                    account.opening_balance
                } else {
                    Decimal::ZERO
                };
                let untouched = debit.is_zero() && credit.is_zero() && opening.is_zero();
                if untouched && !account.is_active {
                    return None;
                }
                Some(AccountBalance::new(
                    &AccountInfo::from(account),
                    opening,
                    debit,
                    credit,
                ))
            })
            .collect())
    }
}

fn lines_query(
    filter: &LineFilter,
) -> SelectTwo<journal_lines::Entity, journal_headers::Entity> {
    let mut query = journal_lines::Entity::find().find_also_related(journal_headers::Entity);

    if let Some(account_id) = filter.account_id {
        query = query.filter(
            Condition::any()
                .add(journal_lines::Column::AccountId.eq(account_id))
                .add(journal_lines::Column::SubAccountId.eq(account_id)),
        );
    }
    if let Some(journal_id) = filter.journal_id {
        query = query.filter(journal_lines::Column::JournalId.eq(journal_id));
    }
    if let Some(kind) = filter.kind {
        query = query.filter(
            journal_headers::Column::Kind.eq(sea_orm_active_enums::JournalKind::from(kind)),
        );
    }
    if let Some(from) = filter.range.from {
        query = query.filter(journal_headers::Column::JournalDate.gte(from));
    }
    if let Some(to) = filter.range.to {
        query = query.filter(journal_headers::Column::JournalDate.lte(to));
    }
    if let Some(reconciled) = filter.reconciled {
        query = query.filter(journal_lines::Column::Reconciled.eq(reconciled));
    }
    if let Some(branch_id) = filter.branch_id {
        query = query.filter(journal_lines::Column::BranchId.eq(branch_id.into_inner()));
    }

    query
        .order_by_asc(journal_headers::Column::JournalDate)
        .order_by_asc(journal_headers::Column::CreatedAt)
        .order_by_asc(journal_lines::Column::JournalId)
        .order_by_asc(journal_lines::Column::LineNo)
}

fn to_ledger_lines(
    rows: Vec<(journal_lines::Model, Option<journal_headers::Model>)>,
) -> Vec<LedgerLine> {
    rows.into_iter()
        .filter_map(|(line, header)| {
            let header = header?;
            Some(LedgerLine {
                line_id: line.id,
                journal_id: header.id,
                kind: header.kind.into(),
                reference: header.reference,
                journal_date: header.journal_date,
                line_no: line.line_no,
                account_id: line.account_id,
                sub_account_id: line.sub_account_id,
                debit: line.debit,
                credit: line.credit,
                description: line.description.unwrap_or(header.description),
                branch_id: line.branch_id.map(BranchId::from_uuid),
                reconciled: line.reconciled,
                reconciled_at: line.reconciled_at,
            })
        })
        .collect()
}

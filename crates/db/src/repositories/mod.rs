//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Every write opens one database transaction; the `*_in` variants run
//! inside a transaction owned by the caller.

pub mod account;
pub mod audit;
pub mod deposit;
pub mod invoice;
pub mod journal;
pub mod payment;
pub mod reconciliation;
pub mod report;
pub mod reversal;
pub mod stock;

pub use account::{AccountFilter, AccountRepository};
pub use audit::{AuditReport, AuditRepository};
pub use deposit::DepositRepository;
pub use invoice::{InvoiceRepository, IssuedInvoice};
pub use journal::{JournalRepository, PostedJournal};
pub use payment::{PaymentRepository, RecordedPayment, VoidedPayment};
pub use reconciliation::{ReconciliationOutcome, ReconciliationRepository};
pub use report::ReportRepository;
pub use reversal::ReversalRepository;
pub use stock::{NewItem, StockRepository};

use sea_orm::{DbBackend, EntityTrait, QuerySelect, Select};

/// Adds `FOR UPDATE` on backends that support row locks.
///
/// Version columns guard the same rows on every backend; the lock only
/// serialises writers earlier on Postgres.
pub(crate) fn for_update<E: EntityTrait>(select: Select<E>, backend: DbBackend) -> Select<E> {
    if backend == DbBackend::Sqlite {
        select
    } else {
        select.lock_exclusive()
    }
}

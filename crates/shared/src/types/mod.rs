//! Common types used across the application.

pub mod id;
pub mod money;
pub mod pagination;
pub mod period;

pub use id::*;
pub use money::{CURRENCY_SCALE, DEFAULT_BALANCE_TOLERANCE, round_currency, within_tolerance};
pub use pagination::{PageMeta, PageRequest, PageResponse};
pub use period::DateRange;

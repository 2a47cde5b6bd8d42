//! Inventory stock ledger rules.
//!
//! Stock levels change only through movements. Each movement records the
//! level before and after, so the trail of an item can be replayed and
//! checked against the cached level on the item.

pub mod stock;

#[cfg(test)]
mod stock_props;

pub use stock::{
    ItemType, StockChange, StockOperation, StockOrigin, compute_stock_change, needs_reorder,
};

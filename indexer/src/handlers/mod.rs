//! Event handlers.
//!
//! One handler per event kind. Each takes the store handle explicitly and
//! projects a single chain event into entity saves. Every handler that
//! writes goes through [`create_transaction_entity`] so each record links
//! to its transaction.

mod deposit;
mod order;
mod transaction;

pub use deposit::handle_deposit;
pub use order::{handle_add_order, handle_remove_order, AddOrderOutcome, RemoveOrderOutcome};
pub use transaction::create_transaction_entity;

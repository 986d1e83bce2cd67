//! Ledger record model.
//!
//! # Responsibility
//! - Define the two measurement records persisted by the registrar.
//! - Own the persisted JSON layout (field names and order).
//!
//! # Invariants
//! - `docType` is set at construction and never changed afterwards.
//! - Records are immutable once written; there is no update path.

pub mod measurement;

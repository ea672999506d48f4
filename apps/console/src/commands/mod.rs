//! # Console Commands
//!
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (exports)
//! ├── reference.rs  ◄─── Catalog search, checklist, warranty terms
//! ├── payment.rs    ◄─── Payment methods, fee simulation, installments
//! └── order.rs      ◄─── Draft totals and submission
//! ```
//!
//! Every command returns a serializable value that `run` prints as JSON, or
//! a [`ConsoleError`](crate::error::ConsoleError).

pub mod order;
pub mod payment;
pub mod reference;

//! # balcao-api: ERP Backend Client for Balcão
//!
//! Everything in the order builder that talks to the backend: reference
//! data, fee simulation and order submission.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          balcao-api                                     │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 OrderSession (one order being built)             │  │
//! │  │                                                                  │  │
//! │  │  apply(action) ──► balcao_core::Order::apply (pure reducer)      │  │
//! │  │  select_payment ──► balcao_core::fee::select                     │  │
//! │  │  submit ──► validate ─► create_order ─► payment ─► status step   │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │                               ▼                                         │
//! │  ┌────────────────┐   ┌────────────────┐   ┌────────────────────────┐  │
//! │  │ ReferenceCache │──►│ Backend trait  │◄──│ HttpBackend (reqwest)  │  │
//! │  │ methods,       │   │                │   │ ApiConfig (toml+env)   │  │
//! │  │ checklist,     │   │                │   │                        │  │
//! │  │ warranty terms │   │                │   │                        │  │
//! │  └────────────────┘   └────────────────┘   └────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`backend`] - The `Backend` trait
//! - [`config`] - Base URL, token and timeout
//! - [`error`] - Client error types and operator messages
//! - [`fees`] - Local fee preview and backend simulation
//! - [`http`] - `reqwest` implementation of `Backend`
//! - [`reference`] - Read-through cache of shared reference data
//! - [`session`] - Order session and submission
//! - [`wire`] - Request bodies
//! - `testing` - In-memory backend (tests and the `testing` feature)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use balcao_api::{ApiConfig, HttpBackend, OrderSession, ReferenceCache};
//! use balcao_core::{OrderAction, OrderKind, Destination};
//!
//! let backend = Arc::new(HttpBackend::new(ApiConfig::load_or_default(None))?);
//! let cache = Arc::new(ReferenceCache::new(backend));
//!
//! let session = OrderSession::new(Arc::clone(&cache), OrderKind::Sale);
//! session.apply(OrderAction::SetCounterparty(Some(42)))?;
//! session.apply(OrderAction::AddItem(entry))?;
//! session.select_payment(1, 3).await?;
//!
//! let outcome = session.submit(Destination::Finalize, today).await?;
//! println!("{} is {}", outcome.order.number, outcome.status);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backend;
pub mod config;
pub mod error;
pub mod fees;
pub mod http;
pub mod reference;
pub mod session;
pub mod wire;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use backend::Backend;
pub use config::ApiConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpBackend;
pub use reference::{MethodTable, ReferenceCache, ReferenceKind};
pub use session::{OrderSession, Phase, SubmitOutcome};
pub use wire::{CreateOrderPayload, PaymentRecordPayload};

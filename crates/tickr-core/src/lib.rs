//! # tickr-core
//!
//! Dialogue surface of the TICKR stock bot: a small per-session state machine
//! that turns free text into either a forecast request or a canned reply.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     DialogueRouter                          │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │   Intent    │  │  FaqTable   │  │  ForecastService    │  │
//! │  │ classifier  │──│ (canned)    │──│  (pipeline seam)    │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//!            ▲ &mut DialogueContext, one per session
//! ```
//!
//! The `ForecastService` trait keeps this crate free of network code; the
//! `stock-advisor` crate provides the real implementation.

pub mod error;
pub mod faq;
pub mod intent;
pub mod router;
pub mod service;
pub mod session;

pub use error::{ForecastError, Result};
pub use faq::FaqTable;
pub use intent::Intent;
pub use router::{DialogueRouter, RouterConfig};
pub use service::ForecastService;
pub use session::{
    DEFAULT_SESSION_IDLE_TTL_SECS, DialogueContext, MemorySessionStore, Session, SessionId, SessionStore,
};

//! Hembi Core - the conversational order-taking engine
//!
//! This crate holds everything with real state and branching:
//! - **Intent classification** (`intent`) - keyword tables + an order heuristic
//! - **Order extraction** (`extract`) - free text → priced order items
//! - **Conversation store** (`store`) - per-party state with a 30-minute TTL
//! - **Dialogue orchestration** (`dialogue`) - the multi-turn collection flow
//!
//! The WhatsApp transport, HTTP host, and CLI live in sibling crates and
//! only call `DialogueEngine::handle_inbound_text` plus the sweep hook.
//!
//! # Flow
//!
//! ```text
//! inbound text + party id → DialogueEngine
//!     Idle            → IntentClassifier → OrderExtractor → store draft
//!     collecting/...  → state-specific step handler → store mutation
//!                     → outbound message text
//! ```

pub mod catalog;
pub mod config;
pub mod dialogue;
pub mod domain;
pub mod errors;
pub mod extract;
pub mod intent;
pub mod messages;
pub mod store;
mod text;

pub use catalog::ProductCatalog;
pub use dialogue::engine::DialogueEngine;
pub use dialogue::states::{ConversationRecord, DialogueState};
pub use domain::order::{DraftPatch, OrderDraft, OrderItem, OrderTotals, PaymentMethod};
pub use domain::party::PartyId;
pub use domain::product::{Product, ProductId};
pub use errors::{ApplicationError, DomainError};
pub use extract::OrderExtractor;
pub use intent::{Intent, IntentClassifier, OrderSignal, QuantityProductSignal};
pub use store::{Clock, ConversationAccess, ConversationStore, SystemClock};

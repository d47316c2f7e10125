//! WhatsApp Integration - Cloud API channel adapter
//!
//! This crate is the thin transport around the dialogue engine:
//! - **Webhook model** (`webhook`) - Cloud API payload types + the GET
//!   verification handshake
//! - **Inbound processing** (`inbound`) - fans a webhook payload out into
//!   engine calls and reply deliveries, with duplicate suppression
//! - **Delivery** (`delivery`) - `MessageDelivery` trait, the Cloud API
//!   client, and a no-op implementation for tests/offline use
//!
//! Nothing here holds dialogue state; all of that lives in `hembi-core`.

pub mod delivery;
pub mod inbound;
pub mod webhook;

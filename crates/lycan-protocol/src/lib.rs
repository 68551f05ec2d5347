//! Shared vocabulary for Lycan.
//!
//! This crate defines the small set of types every other layer agrees on:
//!
//! - **Identity** ([`PlayerId`], [`RoomId`], [`ConnectionRef`]): opaque
//!   handles for players, rooms, and the transport connections behind them.
//! - **Routing** ([`Recipient`]): who a server message is addressed to.
//!   Private results (seer checks, witch notices) must never be broadcast,
//!   so every outbound message carries one of these.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how messages become bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong while encoding.
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes, external) → Protocol (ids, codec) → Room (actor) → Engine (rules)
//! ```
//!
//! The protocol layer knows nothing about werewolves. It only knows how to
//! name things and how to serialize them.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{ConnectionRef, PlayerId, Recipient, RoomId};

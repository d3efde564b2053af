//! # rivulet-core
//!
//! Shared building blocks for the rivulet stream client.
//!
//! This crate provides the runtime-agnostic pieces used by
//! `rivulet-client`:
//!
//! - **Suspension primitive** — [`Waiter`], a single-use
//!   suspension/resumption token with an exactly-once resolve contract.
//!
//! - **Stream reader** — [`Reader`], an unbounded append-only byte
//!   buffer with blocking, EOF-aware drain semantics built on the
//!   waiter.
//!
//! - **Request builder** — [`Request`], pure formatting of a minimal
//!   request line plus `Host` header into wire bytes.
//!
//! - **Transport capability traits** — [`transport`]: the connect /
//!   send / close surface and the event callbacks a transport delivers
//!   into a bound handler.

pub mod error;
pub mod reader;
pub mod request;
pub mod transport;
pub mod waiter;

pub use error::{Error, Result};
pub use reader::Reader;
pub use request::Request;
pub use waiter::{Wait, Waiter};

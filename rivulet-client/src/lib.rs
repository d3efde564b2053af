//! # rivulet-client
//!
//! Asynchronous connect → send-request → drain-response client built
//! on the `rivulet-core` primitives, composed over tokio.
//!
//! This crate provides:
//! - **Adapter**: the connection lifecycle state machine translating
//!   transport events into reader state changes
//! - **Writer**: a thin, non-blocking send wrapper over a connection
//!   handle
//! - **Session**: one-shot request orchestration returning the raw
//!   response bytes
//! - **TCP transport**: the production `Connector` implementation with
//!   its read and write event pumps
//! - **Remote scheduler**: a second runtime on its own thread, fed
//!   through a thread-safe hand-off queue

pub mod adapter;
pub mod remote;
pub mod session;
pub mod tcp;
pub mod writer;

pub use adapter::{AdapterState, ClientAdapter};
pub use remote::RemoteScheduler;
pub use session::{ClientSession, open_connection};
pub use tcp::{TcpConnector, TcpHandle};
pub use writer::Writer;

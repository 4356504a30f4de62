//! Request transports.
//!
//! - Stdio: JSON-lines requests on stdin, responses on stdout

pub mod request;
pub mod stdio;

pub use request::{Request, Response, handle, handle_line};
pub use stdio::StdioTransport;

use crate::error::DbResult;
use std::future::Future;

/// A source of adapter requests.
pub trait Transport: Send + Sync {
    /// Serve requests until the transport shuts down.
    fn run(&self) -> impl Future<Output = DbResult<()>> + Send;

    /// Get the name of this transport for logging.
    fn name(&self) -> &'static str;
}

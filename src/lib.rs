//! Evaluates a small CUE-like configuration language against a set of
//! source files and exports the result as canonical JSON plus a SHA-256
//! digest of the exact rendered bytes.
//!
//! The pipeline is load → build → unify → narrow → validate → render. The
//! load+build step runs behind [`Client`]'s process-wide lock because the
//! evaluation engine is not safe for concurrent use; everything after it
//! operates on request-local values without the lock.

pub mod client;
pub mod context;
pub mod errors;
pub mod export;
pub mod loader;
pub mod parser;
pub mod path;
pub mod render;
pub mod syntax;
pub mod unify;
pub mod validate;
pub mod value;

use std::sync::OnceLock;

pub use client::Client;
pub use errors::{ExportError, Result};
pub use export::{Export, ExportRequest};
pub use path::Path;
pub use value::Value;

static CLIENT: OnceLock<Client> = OnceLock::new();

/// The shared process-wide client. Everything exported through the
/// convenience entry point serializes on this one lock.
pub fn shared_client() -> &'static Client {
    CLIENT.get_or_init(Client::new)
}

/// Convenience: run a request against the shared client.
pub fn export(req: &ExportRequest) -> Result<Export> {
    export::export(shared_client(), req)
}

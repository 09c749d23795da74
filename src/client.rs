use parking_lot::Mutex;
use tracing::debug;

use crate::context::Context;
use crate::errors::{ExportError, Result};
use crate::loader::{self, LoadOptions};
use crate::value::Value;

/// Serialized front end to the evaluation engine.
///
/// The engine is not safe for concurrent use: overlapping load/build cycles
/// corrupt its internal state. `Client` owns a process-wide mutex and admits
/// one load+build cycle at a time; everything downstream (unify, lookup,
/// validate, render) works on request-local values and runs outside the
/// critical section. Share one `Client` per process.
#[derive(Default)]
pub struct Client {
    mtx: Mutex<()>,
}

impl Client {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the locators and build every instance into a value, in
    /// locator order. A fresh `Context` is created per call and never
    /// reused. The first load or build failure aborts the whole call; no
    /// partial value list is ever returned. The lock is guard-scoped, so
    /// it is released on every exit path.
    pub fn load(&self, opts: &LoadOptions) -> Result<Vec<Value>> {
        let _guard = self.mtx.lock();
        debug!("entered evaluation critical section");

        let ctx = Context::new(&opts.tags);
        let mut values = Vec::new();
        for mut instance in loader::instances(opts) {
            if let Some(reason) = instance.err.take() {
                return Err(ExportError::Load {
                    instance: instance.id,
                    reason,
                });
            }
            if instance.incomplete {
                return Err(ExportError::Load {
                    instance: instance.id,
                    reason: "instance has unresolved imports".to_string(),
                });
            }
            let value = ctx.build(&instance).map_err(|reason| ExportError::Build {
                instance: instance.id.clone(),
                reason,
            })?;
            values.push(value);
        }
        Ok(values)
    }
}

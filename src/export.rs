use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::Client;
use crate::errors::{ExportError, Result};
use crate::loader::{LoadOptions, Tag};
use crate::path::{self, Path};
use crate::render;
use crate::unify;
use crate::validate;
use crate::value::Value;

/// One evaluation request. Constructed per invocation and immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRequest {
    /// Working directory for loading; the current directory when omitted.
    pub dir: Option<PathBuf>,
    /// Locators (file or directory paths), in unification order. Empty
    /// means "load the working directory as a package instance".
    pub args: Vec<String>,
    /// Only load files belonging to this package.
    pub package: Option<String>,
    /// Tag bindings, `key=value` or bare boolean `key`.
    pub tags: Vec<String>,
    /// Narrow the result to this path before validating and rendering.
    pub expression: Option<String>,
    /// Unify all instance values (default). When false only the first
    /// resolved value is used and the rest are ignored.
    pub unify: bool,
}

impl Default for ExportRequest {
    fn default() -> Self {
        ExportRequest {
            dir: None,
            args: Vec::new(),
            package: None,
            tags: Vec::new(),
            expression: None,
            unify: true,
        }
    }
}

/// The rendered result: canonical JSON bytes and the digest identifying
/// them. The digest is a pure function of `rendered` and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Export {
    pub rendered: String,
    pub id: String,
}

/// Run the full pipeline: load and build under the client's lock, then
/// unify, narrow, validate, and render on the request-local values.
pub fn export(client: &Client, req: &ExportRequest) -> Result<Export> {
    let mut tags = Vec::with_capacity(req.tags.len());
    for raw in &req.tags {
        let tag = Tag::parse(raw).map_err(|reason| ExportError::Load {
            instance: raw.clone(),
            reason,
        })?;
        tags.push(tag);
    }
    let opts = LoadOptions {
        dir: req.dir.clone().unwrap_or_else(|| PathBuf::from(".")),
        args: req.args.clone(),
        package: req.package.clone(),
        tags,
    };

    let values = client.load(&opts)?;
    debug!(values = values.len(), unify = req.unify, "instances built");

    let mut value = if req.unify {
        unify::unify_all(&values)?
    } else {
        values.into_iter().next().unwrap_or(Value::Top)
    };

    if let Some(expr) = req.expression.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        let parsed = Path::parse(expr).map_err(|e| ExportError::ParsePath {
            path: expr.to_string(),
            reason: e.to_string(),
        })?;
        value = path::lookup(&value, &parsed)
            .cloned()
            .ok_or_else(|| ExportError::Lookup {
                path: expr.to_string(),
            })?;
    }

    validate::validate(&value)?;

    let (rendered, id) = render::render(&value)?;
    debug!(%id, bytes = rendered.len(), "rendered export");
    Ok(Export { rendered, id })
}

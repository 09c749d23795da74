use std::fs;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use tracing::debug;

use crate::syntax::{self, SourceFile};
use crate::value::Value;

const SOURCE_EXTENSION: &str = "cue";

/// A `key=value` or bare-flag tag binding, injected into `@tag(...)` fields.
#[derive(Debug, Clone)]
pub struct Tag {
    pub key: String,
    pub value: Value,
}

impl Tag {
    /// Parse a binding string: `key=value` binds a string, a bare `key`
    /// binds `true`.
    pub fn parse(s: &str) -> Result<Tag, String> {
        let (key, value) = match s.split_once('=') {
            Some((k, v)) => (k, Value::String(v.to_string())),
            None => (s, Value::Bool(true)),
        };
        if key.is_empty() {
            return Err(format!("tag {s:?} has an empty key"));
        }
        if !key.chars().all(|c| c == '_' || c.is_ascii_alphanumeric()) {
            return Err(format!("tag {s:?} has an invalid key"));
        }
        Ok(Tag {
            key: key.to_string(),
            value,
        })
    }
}

/// Inputs to instance loading: working directory, locators, optional
/// package filter, and tag bindings. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub dir: PathBuf,
    pub args: Vec<String>,
    pub package: Option<String>,
    pub tags: Vec<Tag>,
}

/// The load result for one locator: parsed sources, or the error that kept
/// them from resolving. Incomplete instances (unresolved imports) are
/// rejected by the evaluator exactly like errored ones.
#[derive(Debug)]
pub struct Instance {
    pub id: String,
    pub files: Vec<SourceFile>,
    pub err: Option<String>,
    pub incomplete: bool,
}

impl Instance {
    fn failed(id: impl Into<String>, err: impl Into<String>) -> Self {
        Instance {
            id: id.into(),
            files: Vec::new(),
            err: Some(err.into()),
            incomplete: false,
        }
    }
}

/// Resolve the locators into instances, one per locator in caller order.
/// An empty locator list loads the working directory as a single package
/// instance. Failures are carried inside the returned instances; nothing
/// is dropped.
pub fn instances(opts: &LoadOptions) -> Vec<Instance> {
    debug!(dir = %opts.dir.display(), args = opts.args.len(), "resolving instances");
    if opts.args.is_empty() {
        return vec![dir_instance(
            opts.dir.display().to_string(),
            &opts.dir,
            opts.package.as_deref(),
        )];
    }
    opts.args
        .iter()
        .map(|arg| {
            let path = opts.dir.join(arg);
            if path.is_dir() {
                dir_instance(arg.clone(), &path, opts.package.as_deref())
            } else {
                file_instance(arg.clone(), &path, opts.package.as_deref())
            }
        })
        .collect()
}

fn file_instance(id: String, path: &Path, package: Option<&str>) -> Instance {
    let src = match fs::read_to_string(path) {
        Ok(src) => src,
        Err(e) => return Instance::failed(id, format!("cannot read {}: {e}", path.display())),
    };
    let file = match syntax::parse_source(&src) {
        Ok(file) => file,
        Err(e) => return Instance::failed(id, format!("{}: {e}", path.display())),
    };
    if let (Some(want), Some(have)) = (package, file.package.as_deref()) {
        if want != have {
            return Instance::failed(
                id,
                format!("{} is part of package {have:?}, not {want:?}", path.display()),
            );
        }
    }
    let incomplete = !file.imports.is_empty();
    Instance {
        id,
        files: vec![file],
        err: None,
        incomplete,
    }
}

/// Load every source file of a directory as one package instance. File
/// order is sorted by name so evaluation is deterministic regardless of
/// directory iteration order.
fn dir_instance(id: String, dir: &Path, package: Option<&str>) -> Instance {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => return Instance::failed(id, format!("cannot read {}: {e}", dir.display())),
    };
    let paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == SOURCE_EXTENSION))
        .sorted()
        .collect();
    if paths.is_empty() {
        return Instance::failed(id, format!("no .{SOURCE_EXTENSION} files in {}", dir.display()));
    }

    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        let src = match fs::read_to_string(path) {
            Ok(src) => src,
            Err(e) => {
                return Instance::failed(id, format!("cannot read {}: {e}", path.display()))
            }
        };
        match syntax::parse_source(&src) {
            Ok(file) => files.push(file),
            Err(e) => return Instance::failed(id, format!("{}: {e}", path.display())),
        }
    }

    if let Some(want) = package {
        files.retain(|f| f.package.as_deref() == Some(want));
        if files.is_empty() {
            return Instance::failed(
                id,
                format!("no files for package {want:?} in {}", dir.display()),
            );
        }
    } else {
        let packages: Vec<&str> = files
            .iter()
            .filter_map(|f| f.package.as_deref())
            .unique()
            .collect();
        if packages.len() > 1 {
            return Instance::failed(
                id,
                format!(
                    "multiple packages in {}: {}",
                    dir.display(),
                    packages.iter().join(", ")
                ),
            );
        }
    }

    let incomplete = files.iter().any(|f| !f.imports.is_empty());
    Instance {
        id,
        files,
        err: None,
        incomplete,
    }
}

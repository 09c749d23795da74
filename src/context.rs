use std::collections::HashMap;

use tracing::debug;

use crate::loader::{Instance, Tag};
use crate::parser::StringSegment;
use crate::syntax::{Expr, FieldDecl};
use crate::unify;
use crate::value::{Field, Kind, Value};

/// A single-use evaluation session. One context is created per pipeline
/// invocation and discarded after rendering; values built by different
/// contexts are never mixed.
pub struct Context {
    tags: HashMap<String, Value>,
}

/// Scope stack for reference resolution, innermost last.
type Env<'a> = Vec<&'a [FieldDecl]>;

impl Context {
    pub fn new(tags: &[Tag]) -> Self {
        let tags = tags
            .iter()
            .map(|t| (t.key.clone(), t.value.clone()))
            .collect();
        Context { tags }
    }

    /// Evaluate an instance into a value. All files of the instance share
    /// one top-level scope; duplicate labels across files unify.
    pub fn build(&self, instance: &Instance) -> Result<Value, String> {
        let root: Vec<FieldDecl> = instance
            .files
            .iter()
            .flat_map(|f| f.fields.iter().cloned())
            .collect();
        debug!(instance = %instance.id, fields = root.len(), "building instance");

        let env: Env = vec![&root];
        let mut active = Vec::new();
        self.eval_fields(&root, &env, &mut active)
    }

    /// Evaluate a field list into a struct, unifying duplicate labels.
    fn eval_fields(
        &self,
        decls: &[FieldDecl],
        env: &Env,
        active: &mut Vec<(usize, String)>,
    ) -> Result<Value, String> {
        let mut out: Vec<Field> = Vec::new();
        for decl in decls {
            let value = self.eval_field(decl, env, active)?;
            match out.iter_mut().find(|f| f.name == decl.label) {
                Some(existing) => {
                    existing.value = unify::unify(&existing.value, &value)
                        .map_err(|c| format!("field {:?}: {c}", decl.label))?;
                }
                None => out.push(Field {
                    name: decl.label.clone(),
                    hidden: decl.hidden,
                    value,
                }),
            }
        }
        Ok(Value::Struct(out))
    }

    fn eval_field(
        &self,
        decl: &FieldDecl,
        env: &Env,
        active: &mut Vec<(usize, String)>,
    ) -> Result<Value, String> {
        if let Some(tag) = &decl.tag {
            if let Some(bound) = self.tags.get(tag) {
                return Ok(bound.clone());
            }
        }
        self.eval_expr(&decl.expr, env, active)
    }

    fn eval_expr(
        &self,
        expr: &Expr,
        env: &Env,
        active: &mut Vec<(usize, String)>,
    ) -> Result<Value, String> {
        match expr {
            Expr::Null => Ok(Value::Null),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Int(i) => Ok(Value::Int(*i)),
            Expr::Float(f) => Ok(Value::Float(*f)),
            Expr::Type(k) => Ok(Value::Type(*k)),
            Expr::Top => Ok(Value::Top),
            Expr::Str(segments) => self.eval_string(segments, env, active),
            Expr::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.eval_expr(item, env, active)?);
                }
                Ok(Value::List(out))
            }
            Expr::Struct(fields) => {
                let mut inner = env.clone();
                inner.push(fields);
                self.eval_fields(fields, &inner, active)
            }
            Expr::Disjunction { branches, default } => {
                let mut out = Vec::with_capacity(branches.len());
                for branch in branches {
                    out.push(self.eval_expr(branch, env, active)?);
                }
                Ok(Value::Disjunction {
                    branches: out,
                    default: *default,
                })
            }
            Expr::Ref(path) => self.resolve(path, env, active),
        }
    }

    /// Evaluate a string literal, substituting `\(...)` interpolations.
    /// A non-concrete interpolation operand leaves the whole string as an
    /// unresolved `string` constraint, caught later by validation.
    fn eval_string(
        &self,
        segments: &[StringSegment],
        env: &Env,
        active: &mut Vec<(usize, String)>,
    ) -> Result<Value, String> {
        let mut out = String::new();
        for segment in segments {
            match segment {
                StringSegment::Literal(s) => out.push_str(s),
                StringSegment::Interpolation(src) => {
                    let expr = crate::syntax::parse_expr_str(src)
                        .map_err(|e| format!("interpolation {src:?}: {e}"))?;
                    let value = self.eval_expr(&expr, env, active)?;
                    match value.resolved() {
                        Value::String(s) => out.push_str(s),
                        Value::Int(i) => out.push_str(&i.to_string()),
                        Value::Float(f) => out.push_str(&f.to_string()),
                        Value::Bool(b) => out.push_str(&b.to_string()),
                        Value::Type(_) | Value::Top | Value::Disjunction { .. } => {
                            return Ok(Value::Type(Kind::String))
                        }
                        other => {
                            return Err(format!(
                                "cannot interpolate {} into string",
                                other.describe()
                            ))
                        }
                    }
                }
            }
        }
        Ok(Value::String(out))
    }

    /// Resolve a dotted reference against the scope stack, innermost first.
    /// The head may name a hidden field; the tail navigates struct fields.
    fn resolve(
        &self,
        path: &[String],
        env: &Env,
        active: &mut Vec<(usize, String)>,
    ) -> Result<Value, String> {
        let head = match path.first() {
            Some(h) => h,
            None => return Err("empty reference".to_string()),
        };
        for depth in (0..env.len()).rev() {
            let Some(decl) = env[depth].iter().find(|d| &d.label == head) else {
                continue;
            };
            let key = (depth, head.clone());
            if active.contains(&key) {
                return Err(format!("cycle through reference {head:?}"));
            }
            active.push(key);
            let scope: Env = env[..=depth].to_vec();
            let result = self.eval_field(decl, &scope, active);
            active.pop();

            let mut value = result?;
            for segment in &path[1..] {
                value = navigate(&value, segment)
                    .ok_or_else(|| format!("reference {}: no field {segment:?}", path.join(".")))?;
            }
            return Ok(value);
        }
        Err(format!("reference to undefined field {head:?}"))
    }
}

/// Struct member access for references; hidden fields are visible here,
/// unlike in path lookup.
fn navigate(value: &Value, name: &str) -> Option<Value> {
    match value.resolved() {
        Value::Struct(fields) => fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.clone()),
        _ => None,
    }
}

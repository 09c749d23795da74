use std::fmt;

use crate::errors::{ExportError, Result};
use crate::value::{Field, Kind, Value};

/// A unification conflict, with the field path it occurred under.
#[derive(Debug, Clone)]
pub struct Conflict {
    path: Vec<String>,
    reason: String,
}

impl Conflict {
    fn new(a: &Value, b: &Value) -> Self {
        Conflict {
            path: Vec::new(),
            reason: format!("conflicting values {} and {}", a.describe(), b.describe()),
        }
    }

    fn under(mut self, name: &str) -> Self {
        self.path.insert(0, name.to_string());
        self
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.reason)
        } else {
            write!(f, "{}: {}", self.path.join("."), self.reason)
        }
    }
}

/// Fold an ordered sequence of values into one. The empty sequence yields
/// `Top`. The fold is explicitly left-to-right so a conflict names the
/// operands in input order, even though the operator itself is commutative.
pub fn unify_all(values: &[Value]) -> Result<Value> {
    let mut acc = Value::Top;
    for v in values {
        acc = unify(&acc, v).map_err(|c| ExportError::Unify(c.to_string()))?;
    }
    Ok(acc)
}

/// Unify two values. `Top` is the identity; equal scalars unify to
/// themselves; structs merge field-wise; a type constraint narrows to any
/// inhabitant of its kind; disjunctions keep the branches that survive.
pub fn unify(a: &Value, b: &Value) -> std::result::Result<Value, Conflict> {
    match (a, b) {
        (Value::Top, other) | (other, Value::Top) => Ok(other.clone()),

        (Value::Disjunction { branches, default }, other) => {
            unify_disjunction(branches, *default, other, true)
        }
        (other, Value::Disjunction { branches, default }) => {
            unify_disjunction(branches, *default, other, false)
        }

        (Value::Type(x), Value::Type(y)) => match (x, y) {
            _ if x == y => Ok(Value::Type(*x)),
            (Kind::Number, Kind::Int) | (Kind::Int, Kind::Number) => Ok(Value::Type(Kind::Int)),
            (Kind::Number, Kind::Float) | (Kind::Float, Kind::Number) => {
                Ok(Value::Type(Kind::Float))
            }
            _ => Err(Conflict::new(a, b)),
        },
        (Value::Type(k), concrete) | (concrete, Value::Type(k)) => {
            if constrains(*k, concrete) {
                Ok(concrete.clone())
            } else {
                Err(Conflict::new(a, b))
            }
        }

        (Value::Struct(af), Value::Struct(bf)) => unify_structs(af, bf),

        (Value::List(ai), Value::List(bi)) => {
            if ai.len() != bi.len() {
                return Err(Conflict::new(a, b));
            }
            let mut out = Vec::with_capacity(ai.len());
            for (i, (x, y)) in ai.iter().zip(bi).enumerate() {
                out.push(unify(x, y).map_err(|c| c.under(&i.to_string()))?);
            }
            Ok(Value::List(out))
        }

        // Ints and floats unify when numerically equal, mirroring the
        // `number` kind bridging both.
        (Value::Int(i), Value::Float(f)) | (Value::Float(f), Value::Int(i)) => {
            if *i as f64 == *f {
                Ok(Value::Int(*i))
            } else {
                Err(Conflict::new(a, b))
            }
        }

        _ if a == b => Ok(a.clone()),
        _ => Err(Conflict::new(a, b)),
    }
}

/// Does a value inhabit kind `k`?
fn constrains(k: Kind, v: &Value) -> bool {
    match (k, v) {
        (Kind::Number, Value::Int(_) | Value::Float(_)) => true,
        _ => k == v.kind(),
    }
}

fn unify_disjunction(
    branches: &[Value],
    default: Option<usize>,
    other: &Value,
    disjunction_on_left: bool,
) -> std::result::Result<Value, Conflict> {
    let mut out = Vec::new();
    let mut new_default = None;
    for (i, branch) in branches.iter().enumerate() {
        let attempt = if disjunction_on_left {
            unify(branch, other)
        } else {
            unify(other, branch)
        };
        if let Ok(v) = attempt {
            if default == Some(i) {
                new_default = Some(out.len());
            }
            out.push(v);
        }
    }
    match out.len() {
        0 => Err(Conflict {
            path: Vec::new(),
            reason: format!(
                "no disjunction branch unifies with {}",
                other.describe()
            ),
        }),
        1 => Ok(out.remove(0)),
        _ => Ok(Value::Disjunction {
            branches: out,
            default: new_default,
        }),
    }
}

fn unify_structs(af: &[Field], bf: &[Field]) -> std::result::Result<Value, Conflict> {
    let mut out: Vec<Field> = af.to_vec();
    for fb in bf {
        match out.iter_mut().find(|f| f.name == fb.name) {
            Some(fa) => {
                fa.value = unify(&fa.value, &fb.value).map_err(|c| c.under(&fb.name))?;
            }
            None => out.push(fb.clone()),
        }
    }
    Ok(Value::Struct(out))
}

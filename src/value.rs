use std::fmt;

/// Kind of a type constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Null,
    Bool,
    Int,
    Float,
    /// Either int or float.
    Number,
    String,
    List,
    Struct,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::List => "list",
            Kind::Struct => "struct",
        };
        f.write_str(name)
    }
}

/// An evaluated value. Values are plain request-local data: once built they
/// are never shared with or compared against another request's context.
///
/// `Top`, `Type`, and a defaultless `Disjunction` are the non-concrete
/// states; everything else is concrete.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    /// Ordered fields; order is declaration order and is preserved through
    /// unification and rendering.
    Struct(Vec<Field>),
    /// A bare type constraint such as `string`.
    Type(Kind),
    /// The no-constraint value `_`, identity of unification.
    Top,
    Disjunction {
        branches: Vec<Value>,
        /// Index of the `*`-marked branch, if any. A disjunction with a
        /// default is treated as its default once evaluation is done.
        default: Option<usize>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub hidden: bool,
    pub value: Value,
}

impl Value {
    /// The kind this value inhabits, for constraint checks and diagnostics.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::String(_) => Kind::String,
            Value::List(_) => Kind::List,
            Value::Struct(_) => Kind::Struct,
            // Non-concrete values report the kind they constrain to.
            Value::Type(k) => *k,
            Value::Top => Kind::Struct,
            Value::Disjunction { .. } => Kind::Struct,
        }
    }

    /// Resolve a disjunction to its default branch, recursively. Identity
    /// for every other value.
    pub fn resolved(&self) -> &Value {
        match self {
            Value::Disjunction {
                branches,
                default: Some(i),
            } => match branches.get(*i) {
                Some(v) => v.resolved(),
                None => self,
            },
            _ => self,
        }
    }

    /// Short rendering for diagnostics. Structs and lists are abbreviated.
    pub fn describe(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => format!("{s:?}"),
            Value::List(items) => format!("list of {}", items.len()),
            Value::Struct(fields) => format!("struct of {}", fields.len()),
            Value::Type(k) => k.to_string(),
            Value::Top => "_".to_string(),
            Value::Disjunction { branches, .. } => format!("disjunction of {}", branches.len()),
        }
    }

    /// Look up a visible struct field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self.resolved() {
            Value::Struct(fields) => fields
                .iter()
                .find(|f| !f.hidden && f.name == name)
                .map(|f| &f.value),
            _ => None,
        }
    }
}

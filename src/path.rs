use crate::parser::{Cursor, StringSegment, SyntaxError};
use crate::value::Value;

/// One step of a parsed path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// `.name` or `."quoted name"`.
    Field(String),
    /// `[index]` into a list.
    Index(usize),
}

/// A parsed, validated path expression such as `Foo.Bar`, `items[2]` or
/// `"weird key".inner`. Parsing is separate from lookup so callers can
/// tell a malformed expression from a path that is merely absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub selectors: Vec<Selector>,
}

impl Path {
    pub fn parse(expr: &str) -> Result<Path, SyntaxError> {
        let mut c = Cursor::new(expr);
        c.skip_ws();
        let mut selectors = vec![parse_field_selector(&mut c)?];
        loop {
            if c.consume_char('.') {
                selectors.push(parse_field_selector(&mut c)?);
                continue;
            }
            if c.consume_char('[') {
                c.skip_ws();
                if c.peek_char() == Some('"') {
                    let name = quoted(&mut c)?;
                    selectors.push(Selector::Field(name));
                } else {
                    let (raw, is_float) = c.parse_number()?;
                    if is_float {
                        return Err(c.err("index must be an integer"));
                    }
                    let index = raw
                        .parse::<usize>()
                        .map_err(|_| c.err("index must be a non-negative integer"))?;
                    selectors.push(Selector::Index(index));
                }
                c.skip_ws();
                c.expect(']')?;
                continue;
            }
            break;
        }
        c.skip_ws();
        if !c.eof() {
            return Err(c.err("trailing input"));
        }
        Ok(Path { selectors })
    }
}

fn parse_field_selector(c: &mut Cursor) -> Result<Selector, SyntaxError> {
    if c.peek_char() == Some('"') {
        Ok(Selector::Field(quoted(c)?))
    } else {
        Ok(Selector::Field(c.parse_identifier()?))
    }
}

fn quoted(c: &mut Cursor) -> Result<String, SyntaxError> {
    let mut out = String::new();
    for segment in c.parse_string_segments()? {
        match segment {
            StringSegment::Literal(s) => out.push_str(&s),
            StringSegment::Interpolation(_) => {
                return Err(c.err("interpolation not allowed in a path"))
            }
        }
    }
    Ok(out)
}

/// Narrow a value to the sub-value at `path`. `None` means the path is
/// well formed but absent: a missing field, an out-of-range index, or a
/// selector applied to the wrong shape. Hidden fields are not addressable.
pub fn lookup<'a>(value: &'a Value, path: &Path) -> Option<&'a Value> {
    let mut current = value;
    for selector in &path.selectors {
        current = match selector {
            Selector::Field(name) => current.field(name)?,
            Selector::Index(i) => match current.resolved() {
                Value::List(items) => items.get(*i)?,
                _ => return None,
            },
        };
    }
    Some(current)
}

use crate::parser::{Cursor, StringSegment, SyntaxError};
use crate::value::Kind;

/// Parsed form of one source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub package: Option<String>,
    /// Import declarations are recognized but not resolved; an instance
    /// containing any is incomplete.
    pub imports: Vec<String>,
    pub fields: Vec<FieldDecl>,
}

#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub label: String,
    /// Labels starting with `_` are evaluated and referencable but never
    /// exported, validated, or addressable by path.
    pub hidden: bool,
    /// `@tag(name)` attribute: the field takes an injected binding when one
    /// is supplied with the load options.
    pub tag: Option<String>,
    pub expr: Expr,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// String literal as alternating literal/interpolation segments.
    Str(Vec<StringSegment>),
    Struct(Vec<FieldDecl>),
    List(Vec<Expr>),
    /// Dotted reference, resolved lexically innermost scope outward.
    Ref(Vec<String>),
    /// Type constraint such as `string` or `int`; not concrete.
    Type(Kind),
    /// `_`, the no-constraint value.
    Top,
    Disjunction {
        branches: Vec<Expr>,
        default: Option<usize>,
    },
}

/// Parse one source file.
pub fn parse_source(src: &str) -> Result<SourceFile, SyntaxError> {
    let mut c = Cursor::new(src);
    c.skip_ws();

    let mut package = None;
    if c.consume_keyword("package") {
        c.skip_ws();
        package = Some(c.parse_identifier()?);
        c.skip_ws();
    }

    let mut imports = Vec::new();
    while c.consume_keyword("import") {
        c.skip_ws();
        let segs = c.parse_string_segments()?;
        imports.push(segments_literal(&c, segs)?);
        c.skip_ws();
    }

    let mut fields = Vec::new();
    while !c.eof() {
        fields.push(parse_field(&mut c)?);
        c.skip_ws();
        c.consume_char(',');
        c.skip_ws();
    }

    Ok(SourceFile {
        package,
        imports,
        fields,
    })
}

/// Parse a standalone expression, as found inside an interpolation.
pub fn parse_expr_str(src: &str) -> Result<Expr, SyntaxError> {
    let mut c = Cursor::new(src);
    c.skip_ws();
    let expr = parse_expr(&mut c)?;
    c.skip_ws();
    if !c.eof() {
        return Err(c.err("trailing input"));
    }
    Ok(expr)
}

fn parse_field(c: &mut Cursor) -> Result<FieldDecl, SyntaxError> {
    let label = if c.peek_char() == Some('"') {
        let segs = c.parse_string_segments()?;
        segments_literal(c, segs)?
    } else {
        c.parse_identifier()?
    };
    let hidden = label.starts_with('_');
    c.skip_ws();
    c.expect(':')?;
    c.skip_ws();
    let expr = parse_expr(c)?;
    c.skip_ws();

    let mut tag = None;
    if c.consume_char('@') {
        if !c.consume_keyword("tag") {
            return Err(c.err("unknown attribute"));
        }
        c.expect('(')?;
        c.skip_ws();
        tag = Some(c.parse_identifier()?);
        c.skip_ws();
        c.expect(')')?;
    }

    Ok(FieldDecl {
        label,
        hidden,
        tag,
        expr,
    })
}

/// expr := ("*"? operand) ("|" "*"? operand)*
fn parse_expr(c: &mut Cursor) -> Result<Expr, SyntaxError> {
    let mut branches = Vec::new();
    let mut default = None;
    loop {
        let starred = c.consume_char('*');
        c.skip_ws();
        let operand = parse_operand(c)?;
        if starred && default.is_none() {
            default = Some(branches.len());
        }
        branches.push(operand);
        c.skip_ws();
        if !c.consume_char('|') {
            break;
        }
        c.skip_ws();
    }
    if branches.len() == 1 && default.is_none() {
        Ok(branches.pop().unwrap_or(Expr::Top))
    } else {
        Ok(Expr::Disjunction { branches, default })
    }
}

fn parse_operand(c: &mut Cursor) -> Result<Expr, SyntaxError> {
    match c.peek_char() {
        Some('"') => return Ok(Expr::Str(c.parse_string_segments()?)),
        Some('{') => return parse_struct(c),
        Some('[') => return parse_list(c),
        Some(ch) if ch == '-' || ch.is_ascii_digit() => {
            let (raw, is_float) = c.parse_number()?;
            return if is_float {
                raw.parse::<f64>()
                    .map(Expr::Float)
                    .map_err(|_| c.err("bad float literal"))
            } else {
                raw.parse::<i64>()
                    .map(Expr::Int)
                    .map_err(|_| c.err("integer literal out of range"))
            };
        }
        _ => {}
    }

    for (kw, expr) in [
        ("true", Expr::Bool(true)),
        ("false", Expr::Bool(false)),
        ("null", Expr::Null),
        ("string", Expr::Type(Kind::String)),
        ("int", Expr::Type(Kind::Int)),
        ("float", Expr::Type(Kind::Float)),
        ("number", Expr::Type(Kind::Number)),
        ("bool", Expr::Type(Kind::Bool)),
    ] {
        if c.consume_keyword(kw) {
            return Ok(expr);
        }
    }
    if c.consume_keyword("_") {
        return Ok(Expr::Top);
    }

    let mut path = vec![c.parse_identifier()?];
    while c.consume_char('.') {
        path.push(c.parse_identifier()?);
    }
    Ok(Expr::Ref(path))
}

fn parse_struct(c: &mut Cursor) -> Result<Expr, SyntaxError> {
    c.expect('{')?;
    c.skip_ws();
    let mut fields = Vec::new();
    while !c.consume_char('}') {
        if c.eof() {
            return Err(c.err("expected '}'"));
        }
        fields.push(parse_field(c)?);
        c.skip_ws();
        c.consume_char(',');
        c.skip_ws();
    }
    Ok(Expr::Struct(fields))
}

fn parse_list(c: &mut Cursor) -> Result<Expr, SyntaxError> {
    c.expect('[')?;
    c.skip_ws();
    let mut items = Vec::new();
    while !c.consume_char(']') {
        if c.eof() {
            return Err(c.err("expected ']'"));
        }
        items.push(parse_expr(c)?);
        c.skip_ws();
        c.consume_char(',');
        c.skip_ws();
    }
    Ok(Expr::List(items))
}

fn segments_literal(c: &Cursor, segs: Vec<StringSegment>) -> Result<String, SyntaxError> {
    let mut out = String::new();
    for seg in segs {
        match seg {
            StringSegment::Literal(s) => out.push_str(&s),
            StringSegment::Interpolation(_) => {
                return Err(c.err("interpolation not allowed here"))
            }
        }
    }
    Ok(out)
}

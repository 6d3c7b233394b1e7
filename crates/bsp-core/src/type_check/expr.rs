//! Type expressions: parsing `!DOUBLE[1 -]|CELL{CHAR}` into a tree
//!
//! ```text
//! TypeExpression := ['!'] Alternative ('|' Alternative)*
//! Alternative    := Kind [Qualifier]
//! ```
//!
//! Alternatives are split at `|` outside of `[] () {}`, so a cell qualifier
//! may itself contain a union.

use super::size_spec::SizeSpec;
use std::fmt;
use thiserror::Error;

/// Parse failure: what went wrong and the offending fragment
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason} in '{fragment}'")]
pub struct TypeExprError {
    pub fragment: String,
    pub reason: String,
}

impl TypeExprError {
    pub fn new(fragment: &str, reason: impl Into<String>) -> Self {
        TypeExprError {
            fragment: fragment.to_string(),
            reason: reason.into(),
        }
    }
}

/// Type keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Double,
    Int,
    Bool,
    Char,
    Func,
    Cell,
    Struct,
    PropList,
}

impl Kind {
    pub const ALL: [Kind; 8] = [
        Kind::Double,
        Kind::Int,
        Kind::Bool,
        Kind::Char,
        Kind::Func,
        Kind::Cell,
        Kind::Struct,
        Kind::PropList,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Kind::Double => "DOUBLE",
            Kind::Int => "INT",
            Kind::Bool => "BOOL",
            Kind::Char => "CHAR",
            Kind::Func => "FUNC",
            Kind::Cell => "CELL",
            Kind::Struct => "STRUCT",
            Kind::PropList => "PROPLIST",
        }
    }

    /// Match a keyword case-insensitively at the start of `text`
    fn split_keyword(text: &str) -> Option<(Kind, &str)> {
        Kind::ALL.iter().find_map(|&kind| {
            let keyword = kind.keyword();
            let head = text.get(..keyword.len())?;
            head.eq_ignore_ascii_case(keyword)
                .then(|| (kind, &text[keyword.len()..]))
        })
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Constraint attached to `CHAR`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharConstraint {
    Size(SizeSpec),
    /// Case-insensitive set of allowed literals
    OneOf(Vec<String>),
}

/// One alternative of a type expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeNode {
    Double(SizeSpec),
    Int(SizeSpec),
    Bool(SizeSpec),
    Char(CharConstraint),
    Func,
    /// Optional element type
    Cell(Option<Box<TypeExpr>>),
    /// Required field names
    Struct(Vec<String>),
    PropList,
}

impl TypeNode {
    pub fn kind(&self) -> Kind {
        match self {
            TypeNode::Double(_) => Kind::Double,
            TypeNode::Int(_) => Kind::Int,
            TypeNode::Bool(_) => Kind::Bool,
            TypeNode::Char(_) => Kind::Char,
            TypeNode::Func => Kind::Func,
            TypeNode::Cell(_) => Kind::Cell,
            TypeNode::Struct(_) => Kind::Struct,
            TypeNode::PropList => Kind::PropList,
        }
    }

    fn parse(text: &str) -> Result<Self, TypeExprError> {
        let (kind, qualifier) = Kind::split_keyword(text)
            .ok_or_else(|| TypeExprError::new(text, "unknown type"))?;
        let qualifier = qualifier.trim();

        let node = match kind {
            Kind::Double => TypeNode::Double(SizeSpec::parse(qualifier)?),
            Kind::Int => TypeNode::Int(SizeSpec::parse(qualifier)?),
            Kind::Bool => TypeNode::Bool(SizeSpec::parse(qualifier)?),
            Kind::Char if qualifier.starts_with('(') => {
                TypeNode::Char(CharConstraint::OneOf(word_list(qualifier)?))
            }
            Kind::Char => TypeNode::Char(CharConstraint::Size(SizeSpec::parse(qualifier)?)),
            Kind::Func | Kind::PropList => {
                if !qualifier.is_empty() {
                    return Err(TypeExprError::new(text, format!("{} takes no qualifier", kind)));
                }
                if kind == Kind::Func {
                    TypeNode::Func
                } else {
                    TypeNode::PropList
                }
            }
            Kind::Cell if qualifier.is_empty() => TypeNode::Cell(None),
            Kind::Cell => {
                let inner = enclosed(qualifier, '{', '}')
                    .ok_or_else(|| TypeExprError::new(qualifier, "cell element type must be enclosed in {}"))?;
                TypeNode::Cell(Some(Box::new(TypeExpr::parse(inner)?)))
            }
            Kind::Struct if qualifier.is_empty() => TypeNode::Struct(Vec::new()),
            Kind::Struct => TypeNode::Struct(word_list(qualifier)?),
        };
        Ok(node)
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind())?;
        match self {
            TypeNode::Double(size) | TypeNode::Int(size) | TypeNode::Bool(size) => {
                if !size.is_any() {
                    write!(f, "{}", size)?;
                }
            }
            TypeNode::Char(CharConstraint::Size(size)) if !size.is_any() => write!(f, "{}", size)?,
            TypeNode::Char(CharConstraint::OneOf(words)) | TypeNode::Struct(words) if !words.is_empty() => {
                write!(f, "({})", words.join(" "))?
            }
            TypeNode::Cell(Some(inner)) => write!(f, "{{{}}}", inner)?,
            _ => {}
        }
        Ok(())
    }
}

/// Parsed type expression
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeExpr {
    forbid_empty: bool,
    alternatives: Vec<TypeNode>,
}

impl TypeExpr {
    /// Parse a type expression; the empty expression accepts anything
    pub fn parse(text: &str) -> Result<Self, TypeExprError> {
        let (forbid_empty, body) = split_forbid_empty(text);
        if body.is_empty() {
            return Ok(TypeExpr { forbid_empty, alternatives: Vec::new() });
        }

        // `!` on an alternative other than the first has no effect of its own:
        // empty values are settled by the leading marker.
        let alternatives = split_alternatives(body)?
            .into_iter()
            .map(|part| TypeNode::parse(part.strip_prefix('!').map_or(part, str::trim)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TypeExpr { forbid_empty, alternatives })
    }

    /// Whether a leading `!` forbids empty values
    pub fn forbids_empty(&self) -> bool {
        self.forbid_empty
    }

    pub fn alternatives(&self) -> &[TypeNode] {
        &self.alternatives
    }

    /// No alternatives: every value conforms
    pub fn is_any(&self) -> bool {
        self.alternatives.is_empty()
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.forbid_empty {
            f.write_str("!")?;
        }
        let alternatives: Vec<String> = self.alternatives.iter().map(TypeNode::to_string).collect();
        f.write_str(&alternatives.join("|"))
    }
}

/// Strip a leading `!`, returning the flag and the trimmed body
pub(crate) fn split_forbid_empty(text: &str) -> (bool, &str) {
    let text = text.trim();
    match text.strip_prefix('!') {
        Some(rest) => (true, rest.trim()),
        None => (false, text),
    }
}

/// Split at `|` outside brackets, checking that delimiters balance
fn split_alternatives(body: &str) -> Result<Vec<&str>, TypeExprError> {
    let mut parts = Vec::new();
    let mut closers: Vec<char> = Vec::new();
    let mut start = 0;

    for (index, ch) in body.char_indices() {
        match ch {
            '[' => closers.push(']'),
            '(' => closers.push(')'),
            '{' => closers.push('}'),
            ']' | ')' | '}' => {
                if closers.pop() != Some(ch) {
                    return Err(TypeExprError::new(body, format!("unbalanced '{}'", ch)));
                }
            }
            '|' if closers.is_empty() => {
                parts.push(body[start..index].trim());
                start = index + 1;
            }
            _ => {}
        }
    }

    if let Some(missing) = closers.last() {
        return Err(TypeExprError::new(body, format!("missing '{}'", missing)));
    }
    parts.push(body[start..].trim());

    if parts.iter().any(|part| part.is_empty()) {
        return Err(TypeExprError::new(body, "empty alternative"));
    }
    Ok(parts)
}

/// Content between `open` and `close` when they wrap the whole qualifier
fn enclosed(qualifier: &str, open: char, close: char) -> Option<&str> {
    qualifier.strip_prefix(open)?.strip_suffix(close)
}

/// Space-separated words inside `( ... )`
fn word_list(qualifier: &str) -> Result<Vec<String>, TypeExprError> {
    let inner = enclosed(qualifier, '(', ')')
        .ok_or_else(|| TypeExprError::new(qualifier, "list must be enclosed in ()"))?;
    let words: Vec<String> = inner.split_whitespace().map(str::to_string).collect();
    if let Some(word) = words.iter().find(|w| w.contains(|c: char| "()[]{}".contains(c))) {
        return Err(TypeExprError::new(qualifier, format!("unexpected delimiter in '{}'", word)));
    }
    Ok(words)
}

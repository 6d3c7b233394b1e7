//! Runtime type checking against compact type expressions
//!
//! A type expression names a kind and an optional qualifier:
//!
//! | Expression | Accepts |
//! |---|---|
//! | `DOUBLE[2 -]` | numeric array with two rows and any number of columns |
//! | `INT[1]` | whole-number scalar |
//! | `BOOL` | logical array, or numeric array of zeros and ones |
//! | `CHAR(mean median)` | one of the literals, case-insensitively |
//! | `CELL{CHAR}` | cell container whose elements are all text |
//! | `STRUCT(x fs)` | struct with at least the fields `x` and `fs` |
//! | `PROPLIST` | `{name, value, ...}` property list |
//! | `FUNC` | function handle |
//!
//! Alternatives are joined with `|`. Empty values pass unless the expression
//! starts with `!`.
//!
//! [`validate`] returns a [`Verdict`] for callers that branch on the outcome;
//! [`check_type`] and [`check_named`] turn a rejection into a [`BspError`].

mod checker;
pub mod expr;
pub mod scope;
pub mod size_spec;
pub mod verdict;

pub use expr::{CharConstraint, Kind, TypeExpr, TypeExprError, TypeNode};
pub use scope::Scope;
pub use size_spec::{DimRange, SizeSpec};
pub use verdict::{Rejection, RejectionKind, Verdict};

use crate::error::{BspError, BspResult};
use crate::value::Value;

/// Validate `value` against `type_def`, naming it `name` in diagnostics
pub fn validate(value: &Value, type_def: &str, name: &str) -> Verdict {
    let (forbid_empty, body) = expr::split_forbid_empty(type_def);
    if body.is_empty() || (value.is_empty() && !forbid_empty) {
        return Verdict::Accepted;
    }

    let verdict = match TypeExpr::parse(type_def) {
        Ok(expr) => expr.check(value, name),
        Err(error) => Verdict::Rejected(Rejection::new(
            RejectionKind::MalformedTypeExpression,
            format!("Invalid type definition '{}' for '{}': {}", type_def, name, error),
        )),
    };

    if let Verdict::Rejected(rejection) = &verdict {
        tracing::trace!(name, type_def, kind = %rejection.kind(), "type check rejected value");
    }
    verdict
}

/// Top-level check: any rejection becomes [`BspError::TypeCheck`]
pub fn check_type(value: &Value, type_def: &str, name: &str) -> BspResult<()> {
    validate(value, type_def, name).into_result(name)
}

/// Resolve `name` in `scope`, then check it like [`check_type`]
pub fn check_named<S: Scope + ?Sized>(scope: &S, name: &str, type_def: &str) -> BspResult<()> {
    let value = scope
        .lookup(name)
        .ok_or_else(|| BspError::UnknownVariable { name: name.to_string() })?;
    check_type(value, type_def, name)
}

//! Checking values against parsed type expressions

use super::expr::{CharConstraint, Kind, TypeExpr, TypeNode};
use super::verdict::{Rejection, RejectionKind, Verdict};
use crate::value::{Array, Value};

impl TypeExpr {
    /// Check `value`, naming it `name` in diagnostics
    pub fn check(&self, value: &Value, name: &str) -> Verdict {
        self.check_value(value, name).into()
    }

    pub(crate) fn check_value(&self, value: &Value, name: &str) -> Result<(), Rejection> {
        if self.is_any() {
            return Ok(());
        }
        if value.is_empty() {
            if self.forbids_empty() {
                return Err(Rejection::new(
                    RejectionKind::EmptyValue,
                    format!("'{}' must not be empty", name),
                ));
            }
            return Ok(());
        }

        // Every alternative is tried; the first rejection is the one reported.
        let mut first_rejection = None;
        for alternative in self.alternatives() {
            match alternative.check(value, name) {
                Ok(()) => return Ok(()),
                Err(rejection) => {
                    first_rejection.get_or_insert(rejection);
                }
            }
        }
        match first_rejection {
            Some(rejection) => Err(rejection),
            None => Ok(()),
        }
    }
}

impl TypeNode {
    fn check(&self, value: &Value, name: &str) -> Result<(), Rejection> {
        match self {
            TypeNode::Double(size) => {
                let array = numeric(value, name, Kind::Double)?;
                size.check(array.shape(), name)
            }
            TypeNode::Int(size) => {
                let array = numeric(value, name, Kind::Int)?;
                if array.iter().any(|x| x.floor() != *x) {
                    return Err(Rejection::new(
                        RejectionKind::ValueKindMismatch,
                        format!("'{}' must be INT, but contains non-integer values", name),
                    ));
                }
                size.check(array.shape(), name)
            }
            TypeNode::Bool(size) => match value {
                Value::Logical(array) => size.check(array.shape(), name),
                Value::Numeric(array) if array.iter().all(|&x| x == 0.0 || x == 1.0) => {
                    size.check(array.shape(), name)
                }
                Value::Numeric(_) => Err(Rejection::new(
                    RejectionKind::ValueKindMismatch,
                    format!("'{}' must be BOOL, but contains values other than 0 and 1", name),
                )),
                _ => Err(kind_mismatch(value, name, Kind::Bool)),
            },
            TypeNode::Char(constraint) => {
                let text = value
                    .as_text()
                    .ok_or_else(|| kind_mismatch(value, name, Kind::Char))?;
                match constraint {
                    CharConstraint::Size(size) => size.check(&value.shape(), name),
                    CharConstraint::OneOf(allowed) => {
                        if allowed.iter().any(|option| option.eq_ignore_ascii_case(text)) {
                            Ok(())
                        } else {
                            Err(Rejection::new(
                                RejectionKind::DisallowedValue,
                                format!(
                                    "'{}' must be one of {{{}}}, but is '{}'",
                                    name,
                                    allowed.join(", "),
                                    text
                                ),
                            ))
                        }
                    }
                }
            }
            TypeNode::Func => match value {
                Value::Function(_) => Ok(()),
                _ => Err(kind_mismatch(value, name, Kind::Func)),
            },
            TypeNode::Cell(element_type) => {
                let cell = value
                    .as_cell()
                    .ok_or_else(|| kind_mismatch(value, name, Kind::Cell))?;
                if let Some(element_type) = element_type {
                    for (index, element) in cell.iter().enumerate() {
                        element_type.check_value(element, &format!("{}{{{}}}", name, index + 1))?;
                    }
                }
                Ok(())
            }
            TypeNode::Struct(required) => {
                let record = value
                    .as_struct()
                    .ok_or_else(|| kind_mismatch(value, name, Kind::Struct))?;
                let missing: Vec<&str> = required
                    .iter()
                    .map(String::as_str)
                    .filter(|field| !record.has_field(field))
                    .collect();
                if missing.is_empty() {
                    Ok(())
                } else {
                    Err(Rejection::new(
                        RejectionKind::MissingField,
                        format!("'{}' is missing required field(s): {}", name, missing.join(", ")),
                    ))
                }
            }
            TypeNode::PropList => {
                if is_prop_list(value) {
                    Ok(())
                } else {
                    Err(Rejection::new(
                        RejectionKind::ValueKindMismatch,
                        format!(
                            "'{}' must be a property/value list (cell with text at every key position), but is {} of size {}",
                            name,
                            value.class_name(),
                            value.shape()
                        ),
                    ))
                }
            }
        }
    }
}

fn numeric<'a>(value: &'a Value, name: &str, kind: Kind) -> Result<&'a Array<f64>, Rejection> {
    value.as_numeric().ok_or_else(|| kind_mismatch(value, name, kind))
}

fn kind_mismatch(value: &Value, name: &str, expected: Kind) -> Rejection {
    Rejection::new(
        RejectionKind::ValueKindMismatch,
        format!("'{}' must be {}, but is {}", name, expected, value.class_name()),
    )
}

/// Empty, or a flat cell of even length with text at each key slot
pub(crate) fn is_prop_list(value: &Value) -> bool {
    if value.is_empty() {
        return true;
    }
    match value.as_cell() {
        Some(cell) => {
            cell.shape().is_vector()
                && cell.len() % 2 == 0
                && cell.iter().step_by(2).all(|key| key.as_text().is_some())
        }
        None => false,
    }
}

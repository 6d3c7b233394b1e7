//! Property-list options with defaults and type definitions
//!
//! Functions declare their options as a table of [`PropSpec`]s; callers pass
//! a `{name, value, ...}` property list or an options struct. Names match
//! case-insensitively and every value is checked against its type definition.

use bsp_core::{check_type, option_error, BspError, BspResult, StructArray, Value};

/// Declaration of one option
#[derive(Debug, Clone, PartialEq)]
pub struct PropSpec {
    pub name: &'static str,
    pub default: Value,
    pub type_def: &'static str,
}

impl PropSpec {
    pub fn new(name: &'static str, default: impl Into<Value>, type_def: &'static str) -> Self {
        PropSpec {
            name,
            default: default.into(),
            type_def,
        }
    }
}

/// Normalised options: one field per declared option
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Options {
    values: StructArray,
}

impl Options {
    /// Case-insensitive lookup
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .record(0)
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    fn require(&self, name: &str) -> BspResult<&Value> {
        self.get(name)
            .ok_or_else(|| option_error!(name, "option is not declared"))
    }

    pub fn f64(&self, name: &str) -> BspResult<f64> {
        self.require(name)?
            .as_f64()
            .ok_or_else(|| option_error!(name, "expected a numeric scalar"))
    }

    pub fn usize(&self, name: &str) -> BspResult<usize> {
        let value = self.f64(name)?;
        if value < 0.0 || value.fract() != 0.0 || !value.is_finite() {
            return Err(option_error!(name, "expected a non-negative integer, got {}", value));
        }
        Ok(value as usize)
    }

    pub fn bool(&self, name: &str) -> BspResult<bool> {
        self.require(name)?
            .as_bool()
            .ok_or_else(|| option_error!(name, "expected a logical scalar"))
    }

    /// Two-element `[start end]` interval; empty means unset
    pub fn interval(&self, name: &str) -> BspResult<Option<[f64; 2]>> {
        let value = self.require(name)?;
        if value.is_empty() {
            return Ok(None);
        }
        match value.as_numeric().map(|a| a.data()) {
            Some(&[start, end]) => Ok(Some([start, end])),
            _ => Err(option_error!(name, "expected [start end]")),
        }
    }

    pub fn as_struct(&self) -> &StructArray {
        &self.values
    }
}

/// Merge a property list (or options struct) with declared defaults
pub fn set_defaults(props: &Value, specs: &[PropSpec]) -> BspResult<Options> {
    check_type(props, "PROPLIST|STRUCT", "opt")?;

    let given: Vec<(String, Value)> = match props {
        Value::Struct(record) => {
            if record.len() != 1 {
                return Err(option_error!("opt", "options struct must be scalar, got size {}", record.shape()));
            }
            record
                .record(0)
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect()
        }
        Value::Cell(cell) => cell
            .data()
            .chunks(2)
            .map(|pair| (pair[0].as_text().unwrap_or_default().to_string(), pair[1].clone()))
            .collect(),
        _ => Vec::new(),
    };

    let mut chosen: Vec<Option<Value>> = vec![None; specs.len()];
    for (name, value) in given {
        let index = specs
            .iter()
            .position(|spec| spec.name.eq_ignore_ascii_case(&name))
            .ok_or_else(|| unknown_property(&name, specs))?;
        chosen[index] = Some(value);
    }

    let mut values = StructArray::new();
    for (spec, value) in specs.iter().zip(chosen) {
        let value = value.unwrap_or_else(|| spec.default.clone());
        check_type(&value, spec.type_def, &format!("opt.{}", spec.name))?;
        values.set(spec.name, value);
    }
    Ok(Options { values })
}

fn unknown_property(name: &str, specs: &[PropSpec]) -> BspError {
    let known: Vec<&str> = specs.iter().map(|spec| spec.name).collect();
    option_error!(name, "unknown property, expected one of: {}", known.join(", "))
}

//! Size qualifiers: `[3 4]`, `[1- -]`, `[-10]`
//!
//! Each space-separated token bounds one dimension with an inclusive range.
//! A single token bounds the length of a vector in either orientation.

use super::expr::TypeExprError;
use super::verdict::{Rejection, RejectionKind};
use crate::value::Shape;
use std::fmt;

/// Inclusive length range of one dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DimRange {
    pub min: usize,
    /// `None` means unbounded
    pub max: Option<usize>,
}

impl DimRange {
    pub fn exact(len: usize) -> Self {
        DimRange { min: len, max: Some(len) }
    }

    pub fn any() -> Self {
        DimRange { min: 0, max: None }
    }

    pub fn contains(&self, len: usize) -> bool {
        len >= self.min && self.max.map_or(true, |max| len <= max)
    }

    /// Parse `n`, `a-b`, `a-`, `-b` or `-`
    pub fn parse(token: &str) -> Result<Self, TypeExprError> {
        let bound = |text: &str| -> Result<Option<usize>, TypeExprError> {
            if text.is_empty() {
                return Ok(None);
            }
            text.parse::<usize>()
                .map(Some)
                .map_err(|_| TypeExprError::new(token, "size bound is not a non-negative integer"))
        };

        let range = match token.split_once('-') {
            None => match bound(token)? {
                Some(len) => DimRange::exact(len),
                None => return Err(TypeExprError::new(token, "empty size token")),
            },
            Some((low, high)) => DimRange {
                min: bound(low)?.unwrap_or(0),
                max: bound(high)?,
            },
        };

        if let Some(max) = range.max {
            if range.min > max {
                return Err(TypeExprError::new(token, "lower size bound exceeds upper bound"));
            }
        }
        Ok(range)
    }
}

impl fmt::Display for DimRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (min, Some(max)) if min == max => write!(f, "{}", min),
            (0, None) => write!(f, "-"),
            (0, Some(max)) => write!(f, "-{}", max),
            (min, None) => write!(f, "{}-", min),
            (min, Some(max)) => write!(f, "{}-{}", min, max),
        }
    }
}

/// Parsed size qualifier; no ranges means any shape
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SizeSpec {
    dims: Vec<DimRange>,
}

impl SizeSpec {
    /// Unconstrained size
    pub fn any() -> Self {
        SizeSpec::default()
    }

    pub fn from_ranges(dims: Vec<DimRange>) -> Self {
        SizeSpec { dims }
    }

    /// Parse a qualifier; an empty qualifier is unconstrained
    pub fn parse(qualifier: &str) -> Result<Self, TypeExprError> {
        let qualifier = qualifier.trim();
        if qualifier.is_empty() {
            return Ok(SizeSpec::any());
        }

        let inner = qualifier
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(|| TypeExprError::new(qualifier, "size must be enclosed in []"))?;

        let dims = inner
            .split_whitespace()
            .map(DimRange::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SizeSpec { dims })
    }

    pub fn ranges(&self) -> &[DimRange] {
        &self.dims
    }

    pub fn is_any(&self) -> bool {
        self.dims.is_empty()
    }

    /// Check a shape against the declared ranges
    pub fn check(&self, shape: &Shape, name: &str) -> Result<(), Rejection> {
        match self.dims.as_slice() {
            [] => Ok(()),
            [range] => {
                if shape.is_vector() && range.contains(shape.numel()) {
                    Ok(())
                } else {
                    Err(self.mismatch(shape, name))
                }
            }
            dims => {
                if shape.rank() != dims.len() {
                    return Err(Rejection::new(
                        RejectionKind::ValueShapeMismatch,
                        format!(
                            "'{}' must have {} dimensions (size {}), but has {} (size {})",
                            name,
                            dims.len(),
                            self,
                            shape.rank(),
                            shape
                        ),
                    ));
                }
                let fits = dims
                    .iter()
                    .zip(shape.dims())
                    .all(|(range, &len)| range.contains(len));
                if fits {
                    Ok(())
                } else {
                    Err(self.mismatch(shape, name))
                }
            }
        }
    }

    fn mismatch(&self, shape: &Shape, name: &str) -> Rejection {
        Rejection::new(
            RejectionKind::ValueShapeMismatch,
            format!("'{}' must have size {}, but has size {}", name, self, shape),
        )
    }
}

impl fmt::Display for SizeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims: Vec<String> = self.dims.iter().map(DimRange::to_string).collect();
        write!(f, "[{}]", dims.join(" "))
    }
}

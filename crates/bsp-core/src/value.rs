//! Value: dynamically typed data inspected by the type checker
//!
//! Arrays follow the toolbox layout: column-major storage and a shape of at
//! least two dimensions, with trailing singleton dimensions beyond the second
//! dropped (a scalar is `[1 1]`, a row of five samples `[1 5]`).

use crate::error::{BspError, BspResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Array shape with toolbox normalization applied
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape(Vec<usize>);

impl Shape {
    /// Create a shape, padding to two dimensions and dropping trailing singletons
    pub fn new(dims: impl Into<Vec<usize>>) -> Self {
        let mut dims = dims.into();
        while dims.len() < 2 {
            dims.push(1);
        }
        while dims.len() > 2 && dims.last() == Some(&1) {
            dims.pop();
        }
        Shape(dims)
    }

    pub fn scalar() -> Self {
        Shape(vec![1, 1])
    }

    pub fn empty() -> Self {
        Shape(vec![0, 0])
    }

    pub fn row(len: usize) -> Self {
        Shape(vec![1, len])
    }

    pub fn column(len: usize) -> Self {
        Shape(vec![len, 1])
    }

    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    /// Length of dimension `index` (0-based); dimensions past the rank are 1
    pub fn dim(&self, index: usize) -> usize {
        self.0.get(index).copied().unwrap_or(1)
    }

    /// Number of dimensions (always >= 2)
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Total number of elements
    pub fn numel(&self) -> usize {
        self.0.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.numel() == 0
    }

    /// Rank-2 shape with at least one dimension of length 1
    pub fn is_vector(&self) -> bool {
        self.rank() == 2 && (self.0[0] == 1 || self.0[1] == 1)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims: Vec<String> = self.0.iter().map(|d| d.to_string()).collect();
        write!(f, "[{}]", dims.join(" "))
    }
}

/// Column-major n-dimensional array
#[derive(Debug, Clone, PartialEq)]
pub struct Array<T> {
    shape: Shape,
    data: Vec<T>,
}

impl<T> Array<T> {
    /// Create array from shape and column-major data
    pub fn new(shape: Shape, data: Vec<T>) -> BspResult<Self> {
        if shape.numel() != data.len() {
            return Err(BspError::DimensionMismatch {
                shape: shape.to_string(),
                expected: shape.numel(),
                actual: data.len(),
            });
        }
        Ok(Array { shape, data })
    }

    pub fn scalar(value: T) -> Self {
        Array { shape: Shape::scalar(), data: vec![value] }
    }

    pub fn row(data: Vec<T>) -> Self {
        Array { shape: Shape::row(data.len()), data }
    }

    pub fn column(data: Vec<T>) -> Self {
        Array { shape: Shape::column(data.len()), data }
    }

    pub fn empty() -> Self {
        Array { shape: Shape::empty(), data: Vec::new() }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Elements in column-major order
    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }
}

impl Array<f64> {
    /// Matrix from row-major nested rows; all rows must have equal length
    pub fn from_rows(rows: &[Vec<f64>]) -> BspResult<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().find(|r| r.len() != n_cols) {
            return Err(BspError::DimensionMismatch {
                shape: Shape::new([n_rows, n_cols]).to_string(),
                expected: n_cols,
                actual: bad.len(),
            });
        }

        let mut data = Vec::with_capacity(n_rows * n_cols);
        for col in 0..n_cols {
            for row in rows {
                data.push(row[col]);
            }
        }
        Array::new(Shape::new([n_rows, n_cols]), data)
    }
}

/// Reference to a callable by name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionHandle {
    pub name: String,
}

impl FunctionHandle {
    pub fn new(name: impl Into<String>) -> Self {
        FunctionHandle { name: name.into() }
    }
}

/// Array of records sharing one ordered field list
#[derive(Debug, Clone, PartialEq)]
pub struct StructArray {
    shape: Shape,
    fields: Vec<String>,
    records: Vec<Vec<Value>>,
}

impl StructArray {
    /// Scalar struct without fields
    pub fn new() -> Self {
        StructArray {
            shape: Shape::scalar(),
            fields: Vec::new(),
            records: vec![Vec::new()],
        }
    }

    /// Struct array from field names and per-record values
    pub fn from_records(shape: Shape, fields: Vec<String>, records: Vec<Vec<Value>>) -> BspResult<Self> {
        if shape.numel() != records.len() {
            return Err(BspError::DimensionMismatch {
                shape: shape.to_string(),
                expected: shape.numel(),
                actual: records.len(),
            });
        }
        if let Some(record) = records.iter().find(|r| r.len() != fields.len()) {
            return Err(BspError::DimensionMismatch {
                shape: format!("record with {} fields", fields.len()),
                expected: fields.len(),
                actual: record.len(),
            });
        }
        Ok(StructArray { shape, fields, records })
    }

    /// Builder-style field assignment on the first record
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value.into());
        self
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn field_names(&self) -> &[String] {
        &self.fields
    }

    /// Exact (case-sensitive) field test
    pub fn has_field(&self, name: &str) -> bool {
        self.field_index(name).is_some()
    }

    fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == name)
    }

    /// Field of the first record
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.get_at(0, name)
    }

    pub fn get_at(&self, index: usize, name: &str) -> Option<&Value> {
        let field = self.field_index(name)?;
        self.records.get(index).map(|record| &record[field])
    }

    /// Set a field on the first record, adding it (empty elsewhere) if missing
    pub fn set(&mut self, name: &str, value: Value) {
        if self.records.is_empty() {
            self.shape = Shape::scalar();
            self.records.push(vec![Value::empty(); self.fields.len()]);
        }
        let field = self.ensure_field(name);
        self.records[0][field] = value;
    }

    fn ensure_field(&mut self, name: &str) -> usize {
        if let Some(index) = self.field_index(name) {
            return index;
        }
        self.fields.push(name.to_string());
        for record in &mut self.records {
            record.push(Value::empty());
        }
        self.fields.len() - 1
    }

    /// Remove a field from every record, returning whether it existed
    pub fn remove_field(&mut self, name: &str) -> bool {
        match self.field_index(name) {
            Some(index) => {
                self.fields.remove(index);
                for record in &mut self.records {
                    record.remove(index);
                }
                true
            }
            None => false,
        }
    }

    /// Iterate over `(field, value)` pairs of one record
    pub fn record(&self, index: usize) -> impl Iterator<Item = (&str, &Value)> {
        let values = self.records.get(index).map(Vec::as_slice).unwrap_or(&[]);
        self.fields.iter().map(String::as_str).zip(values.iter())
    }
}

impl Default for StructArray {
    fn default() -> Self {
        Self::new()
    }
}

/// Dynamically typed value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Double-precision numeric array
    Numeric(Array<f64>),
    /// Logical array
    Logical(Array<bool>),
    /// Character row
    Text(String),
    /// Function handle
    Function(FunctionHandle),
    /// Container of heterogeneous values
    Cell(Array<Value>),
    /// Record or record array
    Struct(StructArray),
}

impl Value {
    /// Empty `[0 0]` numeric array
    pub fn empty() -> Self {
        Value::Numeric(Array::empty())
    }

    pub fn scalar(value: f64) -> Self {
        Value::Numeric(Array::scalar(value))
    }

    pub fn row(data: Vec<f64>) -> Self {
        Value::Numeric(Array::row(data))
    }

    pub fn column(data: Vec<f64>) -> Self {
        Value::Numeric(Array::column(data))
    }

    /// Numeric array from shape and column-major data
    pub fn numeric(shape: Shape, data: Vec<f64>) -> BspResult<Self> {
        Array::new(shape, data).map(Value::Numeric)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Value::Text(text.into())
    }

    pub fn function(name: impl Into<String>) -> Self {
        Value::Function(FunctionHandle::new(name))
    }

    /// 1xN cell container
    pub fn cell_row(items: Vec<Value>) -> Self {
        Value::Cell(Array::row(items))
    }

    /// 1xN cell of text entries
    pub fn text_cell<S: AsRef<str>>(items: &[S]) -> Self {
        Value::cell_row(items.iter().map(|s| Value::text(s.as_ref())).collect())
    }

    pub fn shape(&self) -> Shape {
        match self {
            Value::Numeric(a) => a.shape().clone(),
            Value::Logical(a) => a.shape().clone(),
            Value::Text(s) if s.is_empty() => Shape::empty(),
            Value::Text(s) => Shape::row(s.chars().count()),
            Value::Function(_) => Shape::scalar(),
            Value::Cell(a) => a.shape().clone(),
            Value::Struct(s) => s.shape().clone(),
        }
    }

    /// No elements (function handles are never empty)
    pub fn is_empty(&self) -> bool {
        self.shape().is_empty()
    }

    /// Class name used in diagnostics
    pub fn class_name(&self) -> &'static str {
        match self {
            Value::Numeric(_) => "double",
            Value::Logical(_) => "logical",
            Value::Text(_) => "char",
            Value::Function(_) => "function_handle",
            Value::Cell(_) => "cell",
            Value::Struct(_) => "struct",
        }
    }

    pub fn as_numeric(&self) -> Option<&Array<f64>> {
        match self {
            Value::Numeric(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_cell(&self) -> Option<&Array<Value>> {
        match self {
            Value::Cell(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructArray> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Scalar numeric or logical value as f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Numeric(a) if a.len() == 1 => Some(a.data()[0]),
            Value::Logical(a) if a.len() == 1 => Some(if a.data()[0] { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Scalar truth value; numeric scalars are true when non-zero
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Logical(a) if a.len() == 1 => Some(a.data()[0]),
            Value::Numeric(a) if a.len() == 1 => Some(a.data()[0] != 0.0),
            _ => None,
        }
    }

    /// Text entries of a cell container
    pub fn to_text_list(&self) -> Option<Vec<String>> {
        self.as_cell()?
            .iter()
            .map(|v| v.as_text().map(str::to_string))
            .collect()
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::scalar(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::scalar(f64::from(value))
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::scalar(value as f64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Logical(Array::scalar(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<f64>> for Value {
    fn from(value: Vec<f64>) -> Self {
        Value::row(value)
    }
}

impl From<Array<f64>> for Value {
    fn from(value: Array<f64>) -> Self {
        Value::Numeric(value)
    }
}

impl From<StructArray> for Value {
    fn from(value: StructArray) -> Self {
        Value::Struct(value)
    }
}

impl From<FunctionHandle> for Value {
    fn from(value: FunctionHandle) -> Self {
        Value::Function(value)
    }
}

/// Build a property/value list (`{name, value, ...}` cell row)
#[macro_export]
macro_rules! proplist {
    () => {
        $crate::value::Value::cell_row(Vec::new())
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::value::Value::cell_row(vec![
            $(
                $crate::value::Value::from($key),
                $crate::value::Value::from($value),
            )+
        ])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_normalization() {
        assert_eq!(Shape::new([5]).dims(), &[5, 1]);
        assert_eq!(Shape::new([3, 4, 1, 1]).dims(), &[3, 4]);
        assert_eq!(Shape::new([3, 4, 2]).rank(), 3);
        assert_eq!(Shape::new([3, 4, 2]).numel(), 24);
        assert_eq!(Shape::new([3, 4]).to_string(), "[3 4]");
        assert_eq!(Shape::new([3, 4]).dim(5), 1);
    }

    #[test]
    fn test_vector_detection() {
        assert!(Shape::row(5).is_vector());
        assert!(Shape::column(5).is_vector());
        assert!(Shape::scalar().is_vector());
        assert!(!Shape::new([3, 4]).is_vector());
        assert!(!Shape::new([1, 4, 2]).is_vector());
    }

    #[test]
    fn test_array_construction() {
        let array = Array::new(Shape::new([2, 3]), vec![0.0; 6]).unwrap();
        assert_eq!(array.len(), 6);

        let result = Array::new(Shape::new([2, 3]), vec![0.0; 5]);
        assert!(matches!(result, Err(BspError::DimensionMismatch { expected: 6, actual: 5, .. })));
    }

    #[test]
    fn test_from_rows_is_column_major() {
        let array = Array::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(array.shape().dims(), &[2, 3]);
        assert_eq!(array.data(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);

        assert!(Array::from_rows(&[vec![1.0], vec![1.0, 2.0]]).is_err());
    }

    #[test]
    fn test_value_emptiness() {
        assert!(Value::empty().is_empty());
        assert!(Value::text("").is_empty());
        assert!(Value::cell_row(Vec::new()).is_empty());
        assert!(!Value::function("mean").is_empty());
        assert!(!Value::Struct(StructArray::new()).is_empty());
        assert!(!Value::scalar(0.0).is_empty());
    }

    #[test]
    fn test_text_shape() {
        assert_eq!(Value::text("green").shape().dims(), &[1, 5]);
        assert_eq!(Value::text("").shape().dims(), &[0, 0]);
    }

    #[test]
    fn test_struct_fields() {
        let mut record = StructArray::new().with("x", 1.0).with("fs", 100.0);
        assert!(record.has_field("x"));
        assert!(!record.has_field("X"));
        assert_eq!(record.get("fs"), Some(&Value::scalar(100.0)));
        assert_eq!(record.field_names(), &["x".to_string(), "fs".to_string()]);

        record.set("x", Value::text("replaced"));
        assert_eq!(record.get("x").and_then(Value::as_text), Some("replaced"));

        assert!(record.remove_field("x"));
        assert!(!record.has_field("x"));
        assert!(!record.remove_field("x"));
    }

    #[test]
    fn test_struct_array_from_records() {
        let records = vec![
            vec![Value::scalar(1.0)],
            vec![Value::scalar(2.0)],
        ];
        let array = StructArray::from_records(Shape::row(2), vec!["a".to_string()], records).unwrap();
        assert_eq!(array.len(), 2);
        assert_eq!(array.get_at(1, "a"), Some(&Value::scalar(2.0)));

        let bad = StructArray::from_records(Shape::row(3), vec!["a".to_string()], vec![]);
        assert!(bad.is_err());
    }

    #[test]
    fn test_scalar_accessors() {
        assert_eq!(Value::from(true).as_f64(), Some(1.0));
        assert_eq!(Value::from(0.0).as_bool(), Some(false));
        assert_eq!(Value::row(vec![1.0, 2.0]).as_f64(), None);
        assert_eq!(
            Value::text_cell(&["C3", "C4"]).to_text_list(),
            Some(vec!["C3".to_string(), "C4".to_string()])
        );
        assert_eq!(Value::cell_row(vec![Value::scalar(1.0)]).to_text_list(), None);
    }

    #[test]
    fn test_proplist_macro() {
        let list = proplist!["nSections" => 3.0, "CalcStd" => true];
        let cell = list.as_cell().unwrap();
        assert_eq!(cell.len(), 4);
        assert_eq!(cell.data()[0], Value::text("nSections"));
        assert_eq!(cell.data()[3], Value::from(true));

        assert!(proplist![].is_empty());
    }
}

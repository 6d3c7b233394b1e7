//! JSON interchange for [`Value`]
//!
//! Nested arrays of numbers (or booleans) with a uniform shape become
//! numeric (or logical) arrays whose first dimension is the outermost JSON
//! level; a flat array becomes a row. Other arrays become cell rows, objects
//! become scalar structs and `{"@func": "name"}` is a function handle.

use crate::error::{BspError, BspResult};
use crate::value::{Array, Shape, StructArray, Value};
use serde_json::{Map, Number, Value as Json};

const FUNCTION_KEY: &str = "@func";

impl Value {
    /// Convert parsed JSON into a value
    pub fn from_json(json: &Json) -> Value {
        match json {
            Json::Null => Value::empty(),
            Json::Bool(flag) => Value::from(*flag),
            Json::Number(number) => Value::scalar(number.as_f64().unwrap_or(f64::NAN)),
            Json::String(text) => Value::text(text.as_str()),
            Json::Array(items) if items.is_empty() => Value::empty(),
            Json::Array(items) => {
                if let Some(array) = uniform_array(json, Json::as_f64) {
                    return Value::Numeric(array);
                }
                if let Some(array) = uniform_array(json, Json::as_bool) {
                    return Value::Logical(array);
                }
                Value::cell_row(items.iter().map(Value::from_json).collect())
            }
            Json::Object(map) => {
                if let (1, Some(Json::String(name))) = (map.len(), map.get(FUNCTION_KEY)) {
                    return Value::function(name.as_str());
                }
                let mut record = StructArray::new();
                for (field, value) in map {
                    record.set(field, Value::from_json(value));
                }
                Value::Struct(record)
            }
        }
    }

    /// Parse JSON text into a value
    pub fn from_json_str(text: &str) -> BspResult<Value> {
        let json: Json = serde_json::from_str(text).map_err(|e| BspError::SerializationError {
            reason: format!("Failed to parse JSON value: {}", e),
        })?;
        Ok(Value::from_json(&json))
    }

    /// Convert into JSON; non-finite numbers become `null`
    pub fn to_json(&self) -> Json {
        match self {
            Value::Numeric(array) if array.len() == 1 => number(array.data()[0]),
            Value::Numeric(array) => nested(array.shape(), array.iter().map(|&x| number(x)).collect()),
            Value::Logical(array) if array.len() == 1 => Json::Bool(array.data()[0]),
            Value::Logical(array) => nested(array.shape(), array.iter().map(|&b| Json::Bool(b)).collect()),
            Value::Text(text) => Json::String(text.clone()),
            Value::Function(handle) => {
                let mut map = Map::new();
                map.insert(FUNCTION_KEY.to_string(), Json::String(handle.name.clone()));
                Json::Object(map)
            }
            Value::Cell(cell) => nested(cell.shape(), cell.iter().map(Value::to_json).collect()),
            Value::Struct(records) => {
                let objects: Vec<Json> = (0..records.len())
                    .map(|index| {
                        let map: Map<String, Json> = records
                            .record(index)
                            .map(|(field, value)| (field.to_string(), value.to_json()))
                            .collect();
                        Json::Object(map)
                    })
                    .collect();
                if records.shape() == &Shape::scalar() {
                    objects.into_iter().next().unwrap_or(Json::Null)
                } else {
                    Json::Array(objects)
                }
            }
        }
    }
}

fn number(x: f64) -> Json {
    Number::from_f64(x).map(Json::Number).unwrap_or(Json::Null)
}

/// Shape implied by following the first element at every nesting level
fn probe_dims(json: &Json) -> Vec<usize> {
    let mut dims = Vec::new();
    let mut current = json;
    while let Json::Array(items) = current {
        dims.push(items.len());
        match items.first() {
            Some(first) => current = first,
            None => break,
        }
    }
    dims
}

fn flatten<T>(json: &Json, dims: &[usize], leaf: fn(&Json) -> Option<T>, out: &mut Vec<T>) -> bool {
    match (dims.split_first(), json) {
        (None, value) => match leaf(value) {
            Some(item) => {
                out.push(item);
                true
            }
            None => false,
        },
        (Some((&len, rest)), Json::Array(items)) if items.len() == len => {
            items.iter().all(|item| flatten(item, rest, leaf, out))
        }
        _ => false,
    }
}

fn uniform_array<T: Clone>(json: &Json, leaf: fn(&Json) -> Option<T>) -> Option<Array<T>> {
    let dims = probe_dims(json);
    let mut row_major = Vec::new();
    if !flatten(json, &dims, leaf, &mut row_major) {
        return None;
    }

    let (shape, data) = if dims.len() == 1 {
        (Shape::row(dims[0]), row_major)
    } else {
        let data = to_column_major(&row_major, &dims);
        (Shape::new(dims), data)
    };
    Array::new(shape, data).ok()
}

fn column_major_offset(index: &[usize], dims: &[usize]) -> usize {
    index.iter().zip(dims).rev().fold(0, |acc, (&i, &d)| acc * d + i)
}

fn row_major_offset(index: &[usize], dims: &[usize]) -> usize {
    index.iter().zip(dims).fold(0, |acc, (&i, &d)| acc * d + i)
}

/// Advance a multi-index in row-major order; false once exhausted
fn next_index(index: &mut [usize], dims: &[usize]) -> bool {
    for k in (0..index.len()).rev() {
        index[k] += 1;
        if index[k] < dims[k] {
            return true;
        }
        index[k] = 0;
    }
    false
}

fn to_column_major<T: Clone>(row_major: &[T], dims: &[usize]) -> Vec<T> {
    let mut out = row_major.to_vec();
    if row_major.is_empty() {
        return out;
    }
    let mut index = vec![0; dims.len()];
    loop {
        out[column_major_offset(&index, dims)] = row_major[row_major_offset(&index, dims)].clone();
        if !next_index(&mut index, dims) {
            break;
        }
    }
    out
}

fn to_row_major<T: Clone>(column_major: &[T], dims: &[usize]) -> Vec<T> {
    let mut out = column_major.to_vec();
    if column_major.is_empty() {
        return out;
    }
    let mut index = vec![0; dims.len()];
    loop {
        out[row_major_offset(&index, dims)] = column_major[column_major_offset(&index, dims)].clone();
        if !next_index(&mut index, dims) {
            break;
        }
    }
    out
}

/// Nest column-major elements by shape; rows stay flat
fn nested(shape: &Shape, column_major: Vec<Json>) -> Json {
    if column_major.is_empty() {
        return Json::Array(Vec::new());
    }
    if shape.rank() == 2 && shape.dim(0) == 1 {
        return Json::Array(column_major);
    }
    let row_major = to_row_major(&column_major, shape.dims());
    build(shape.dims(), &row_major)
}

fn build(dims: &[usize], row_major: &[Json]) -> Json {
    match dims.split_first() {
        None => row_major[0].clone(),
        Some((&len, rest)) => {
            let stride: usize = rest.iter().product();
            Json::Array(
                (0..len)
                    .map(|i| build(rest, &row_major[i * stride..(i + 1) * stride]))
                    .collect(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars_and_text() {
        assert_eq!(Value::from_json(&json!(2.5)), Value::scalar(2.5));
        assert_eq!(Value::from_json(&json!(true)), Value::from(true));
        assert_eq!(Value::from_json(&json!("C3")), Value::text("C3"));
        assert!(Value::from_json(&json!(null)).is_empty());
        assert!(Value::from_json(&json!([])).is_empty());
    }

    #[test]
    fn test_numeric_arrays() {
        let row = Value::from_json(&json!([1, 2, 3]));
        assert_eq!(row, Value::row(vec![1.0, 2.0, 3.0]));

        let matrix = Value::from_json(&json!([[1, 2, 3], [4, 5, 6]]));
        let array = matrix.as_numeric().unwrap();
        assert_eq!(array.shape().dims(), &[2, 3]);
        assert_eq!(array.data(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);

        let cube = Value::from_json(&json!([[[1, 2], [3, 4]], [[5, 6], [7, 8]], [[9, 10], [11, 12]]]));
        let array = cube.as_numeric().unwrap();
        assert_eq!(array.shape().dims(), &[3, 2, 2]);
        // cube[1][0][1] sits at column-major offset 1 + 3 * (0 + 2 * 1)
        assert_eq!(array.data()[7], 6.0);
    }

    #[test]
    fn test_ragged_and_mixed_arrays_become_cells() {
        let ragged = Value::from_json(&json!([[1, 2], [3]]));
        assert_eq!(ragged.as_cell().map(Array::len), Some(2));

        let mixed = Value::from_json(&json!(["policy", 1]));
        let cell = mixed.as_cell().unwrap();
        assert_eq!(cell.data()[0], Value::text("policy"));
        assert_eq!(cell.data()[1], Value::scalar(1.0));

        let strings = Value::from_json(&json!(["C3", "C4"]));
        assert_eq!(strings.to_text_list(), Some(vec!["C3".to_string(), "C4".to_string()]));
    }

    #[test]
    fn test_objects_and_functions() {
        let value = Value::from_json(&json!({ "fs": 100, "clab": ["Cz"] }));
        let record = value.as_struct().unwrap();
        assert_eq!(record.get("fs"), Some(&Value::scalar(100.0)));
        assert!(record.has_field("clab"));

        assert_eq!(Value::from_json(&json!({ "@func": "mean" })), Value::function("mean"));
    }

    #[test]
    fn test_to_json_shapes() {
        assert_eq!(Value::scalar(1.5).to_json(), json!(1.5));
        assert_eq!(Value::row(vec![1.0, 2.0]).to_json(), json!([1.0, 2.0]));
        assert_eq!(Value::column(vec![1.0, 2.0]).to_json(), json!([[1.0], [2.0]]));
        assert_eq!(Value::scalar(f64::NAN).to_json(), json!(null));
        assert_eq!(Value::empty().to_json(), json!([]));
        assert_eq!(Value::function("std").to_json(), json!({ "@func": "std" }));

        let matrix = json!([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        assert_eq!(Value::from_json(&matrix).to_json(), matrix);

        let cube = json!([[[1.0, 2.0], [3.0, 4.0]], [[5.0, 6.0], [7.0, 8.0]]]);
        assert_eq!(Value::from_json(&cube).to_json(), cube);
    }

    #[test]
    fn test_struct_to_json() {
        let record = StructArray::new().with("fs", 250.0).with("title", "calib");
        assert_eq!(Value::Struct(record).to_json(), json!({ "fs": 250.0, "title": "calib" }));
    }

    #[test]
    fn test_from_json_str_errors() {
        assert!(Value::from_json_str("[1, 2").is_err());
        assert_eq!(Value::from_json_str("[1, 2]").unwrap(), Value::row(vec![1.0, 2.0]));
    }
}

//! Behavioral properties of the type checker

use bsp_core::{check_type, proplist, validate, RejectionKind, Shape, StructArray, Value};

fn matrix(rows: usize, cols: usize) -> Value {
    Value::numeric(Shape::new([rows, cols]), vec![1.0; rows * cols]).unwrap()
}

#[test]
fn test_empty_values_pass_unless_forbidden() {
    let empties = [
        Value::empty(),
        Value::text(""),
        Value::cell_row(Vec::new()),
        Value::row(Vec::new()),
    ];
    let expressions = [
        "DOUBLE[3 4]",
        "INT[1]",
        "BOOL",
        "CHAR(red green)",
        "FUNC",
        "CELL{CHAR}",
        "STRUCT(x fs)",
        "PROPLIST",
        "DOUBLE|CHAR",
    ];

    for value in &empties {
        for expression in expressions {
            assert!(
                validate(value, expression, "v").is_accepted(),
                "{:?} should accept {:?}",
                expression,
                value
            );
        }
    }

    let verdict = validate(&Value::empty(), "!DOUBLE", "v");
    assert_eq!(verdict.kind(), Some(RejectionKind::EmptyValue));
}

#[test]
fn test_union_acceptance_is_symmetric() {
    let values = [
        Value::scalar(2.0),
        Value::scalar(2.5),
        Value::text("mean"),
        Value::from(true),
        Value::function("std"),
        Value::text_cell(&["a", "b"]),
        Value::Struct(StructArray::new().with("x", 1.0)),
        matrix(3, 4),
    ];
    let kinds = ["DOUBLE[1]", "INT", "CHAR(mean)", "BOOL", "FUNC", "CELL{CHAR}", "STRUCT(x)", "DOUBLE[3 4]"];

    for value in &values {
        for a in kinds {
            for b in kinds {
                let either = validate(value, a, "v").is_accepted() || validate(value, b, "v").is_accepted();
                assert_eq!(validate(value, &format!("{}|{}", a, b), "v").is_accepted(), either);
                assert_eq!(validate(value, &format!("{}|{}", b, a), "v").is_accepted(), either);
            }
        }
    }
}

#[test]
fn test_three_way_union() {
    assert!(validate(&Value::function("f"), "DOUBLE|CHAR|FUNC", "v").is_accepted());
    assert!(validate(&Value::from(true), "DOUBLE|CHAR|FUNC", "v").is_rejected());
}

#[test]
fn test_matrix_shape() {
    let x = matrix(3, 4);
    assert!(validate(&x, "DOUBLE[3 4]", "x").is_accepted());

    let verdict = validate(&x, "DOUBLE[2 4]", "x");
    assert_eq!(verdict.kind(), Some(RejectionKind::ValueShapeMismatch));
    let message = verdict.message().unwrap();
    assert!(message.contains("[2 4]"));
    assert!(message.contains("[3 4]"));
}

#[test]
fn test_single_dimension_accepts_row_and_column() {
    let row = Value::row(vec![1.0; 5]);
    let column = Value::column(vec![1.0; 5]);
    assert!(validate(&row, "DOUBLE[5]", "v").is_accepted());
    assert!(validate(&column, "DOUBLE[5]", "v").is_accepted());
    assert!(validate(&row, "DOUBLE[6-]", "v").is_rejected());
    assert!(validate(&matrix(5, 5), "DOUBLE[-]", "v").is_rejected());
}

#[test]
fn test_rank_must_match() {
    let verdict = validate(&matrix(3, 4), "DOUBLE[3 4 2]", "x");
    assert_eq!(verdict.kind(), Some(RejectionKind::ValueShapeMismatch));
    assert!(verdict.message().unwrap().contains("3 dimensions"));
}

#[test]
fn test_int_kind() {
    assert!(validate(&Value::scalar(2.0), "INT", "n").is_accepted());
    let verdict = validate(&Value::scalar(2.5), "INT", "n");
    assert_eq!(verdict.kind(), Some(RejectionKind::ValueKindMismatch));
}

#[test]
fn test_char_enumeration() {
    let expression = "CHAR(red green blue)";
    assert!(validate(&Value::text("green"), expression, "color").is_accepted());
    assert!(validate(&Value::text("GREEN"), expression, "color").is_accepted());

    let verdict = validate(&Value::text("purple"), expression, "color");
    assert_eq!(verdict.kind(), Some(RejectionKind::DisallowedValue));
    assert!(verdict.message().unwrap().contains("purple"));
}

#[test]
fn test_struct_required_fields() {
    let dat = Value::Struct(StructArray::new().with("x", 1.0).with("fs", 100.0));
    let verdict = validate(&dat, "STRUCT(x clab)", "dat");
    assert_eq!(verdict.kind(), Some(RejectionKind::MissingField));
    let message = verdict.message().unwrap();
    assert!(message.contains("clab"));
    assert!(!message.contains("fs"));
}

#[test]
fn test_cell_elements() {
    let names = Value::text_cell(&["C3", "Cz", "C4"]);
    assert!(validate(&names, "CELL{CHAR}", "clab").is_accepted());

    let mixed = Value::cell_row(vec![Value::text("C3"), Value::scalar(4.0), Value::text("C4")]);
    let verdict = validate(&mixed, "CELL{CHAR}", "clab");
    assert_eq!(verdict.kind(), Some(RejectionKind::ValueKindMismatch));
    assert!(verdict.message().unwrap().contains("clab{2}"));
}

#[test]
fn test_property_lists() {
    assert!(validate(&proplist![], "PROPLIST", "opt").is_accepted());
    assert!(validate(&proplist!["policy" => "mean", "std" => 1.0], "PROPLIST", "opt").is_accepted());
    assert!(validate(&proplist!["policy" => 1.0, "std" => "x"], "PROPLIST", "opt").is_accepted());

    let bad_key = Value::cell_row(vec![
        Value::text("policy"),
        Value::scalar(1.0),
        Value::scalar(2.0),
        Value::text("x"),
    ]);
    assert!(validate(&bad_key, "PROPLIST", "opt").is_rejected());

    let odd = Value::cell_row(vec![Value::text("policy"), Value::scalar(1.0), Value::text("std")]);
    assert!(validate(&odd, "PROPLIST", "opt").is_rejected());
    assert!(validate(&Value::text("policy"), "PROPLIST", "opt").is_rejected());
    assert_eq!(
        validate(&proplist![], "!PROPLIST", "opt").kind(),
        Some(RejectionKind::EmptyValue)
    );
}

#[test]
fn test_validation_is_idempotent() {
    let value = Value::cell_row(vec![Value::text("a"), Value::scalar(1.5)]);
    for expression in ["CELL{CHAR}", "CELL{CHAR|DOUBLE}", "PROPLIST", "STRUCT"] {
        let first = validate(&value, expression, "v");
        for _ in 0..3 {
            assert_eq!(validate(&value, expression, "v"), first);
        }
    }
}

#[test]
fn test_top_level_check_raises_with_message() {
    let error = check_type(&Value::text("abc"), "CELL{CHAR}", "clab").unwrap_err();
    assert_eq!(error.to_string(), "'clab' must be CELL, but is char");

    let error = check_type(&Value::scalar(1.0), "CELL(CHAR)", "clab").unwrap_err();
    assert_eq!(error.rejection_kind(), Some(RejectionKind::MalformedTypeExpression));
    assert!(error.to_string().contains("clab"));
}

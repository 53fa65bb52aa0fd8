//! Display preparation for course records
//!
//! The catalog client hands records over untouched. Before rendering, a few
//! list-valued fields are flattened into comma-separated strings so the UI can
//! show them in a single cell.

use serde_json::Value;

use crate::catalog::CourseRecord;

/// Fields flattened by `process_course`
pub const FLATTENED_FIELDS: [&str; 4] = ["grading_method", "gen_ed", "core", "sections"];

/// Flattens a JSON value into a display string
///
/// Lists (and the values of maps) are joined with `", "`, recursing into nested
/// lists. Elements that render empty or as `"0"` are dropped, booleans render as
/// `"1"`/`""` and null as `""`.
pub fn array_to_string(value: &Value) -> String {
    let items: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        scalar => return scalar_to_string(scalar),
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::Array(_) | Value::Object(_) => array_to_string(item),
            scalar => scalar_to_string(scalar),
        })
        .filter(|s| !s.is_empty() && s != "0")
        .collect::<Vec<_>>()
        .join(", ")
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => array_to_string(value),
    }
}

/// Returns a copy of `course` with list-valued display fields flattened
///
/// Only the fields in `FLATTENED_FIELDS` are touched, and only when they hold a
/// list or map. Strings, nulls and every other field pass through unchanged.
pub fn process_course(course: &CourseRecord) -> CourseRecord {
    let mut processed = course.clone();
    if let Value::Object(map) = &mut processed {
        for field in FLATTENED_FIELDS {
            if let Some(value) = map.get_mut(field) {
                if value.is_array() || value.is_object() {
                    *value = Value::String(array_to_string(value));
                }
            }
        }
    }
    processed
}

/// Renders one field of a record for display, `"-"` when absent
pub fn field_text(course: &CourseRecord, field: &str) -> String {
    match course.get(field) {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) if s.is_empty() => "-".to_string(),
        Some(value) => {
            let text = array_to_string(value);
            if text.is_empty() {
                "-".to_string()
            } else {
                text
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_array_to_string_simple() {
        assert_eq!(
            array_to_string(&json!(["Regular", "Pass-Fail", "Audit"])),
            "Regular, Pass-Fail, Audit"
        );
    }

    #[test]
    fn test_array_to_string_nested() {
        assert_eq!(
            array_to_string(&json!(["Regular", ["Sub1", "Sub2"], "Audit"])),
            "Regular, Sub1, Sub2, Audit"
        );
    }

    #[test]
    fn test_array_to_string_non_array() {
        assert_eq!(array_to_string(&json!("simple string")), "simple string");
        assert_eq!(array_to_string(&json!(4)), "4");
    }

    #[test]
    fn test_array_to_string_mixed_types() {
        assert_eq!(
            array_to_string(&json!(["String", 123, true, null])),
            "String, 123, 1"
        );
    }

    #[test]
    fn test_array_to_string_empty() {
        assert_eq!(array_to_string(&json!([])), "");
        assert_eq!(array_to_string(&json!([[], null, false])), "");
    }

    #[test]
    fn test_process_course_flattens_listed_fields() {
        let course = json!({
            "course_id": "AAAS100",
            "credits": "3",
            "grading_method": ["Regular", "Pass-Fail"],
            "gen_ed": [["DSHU"]],
            "core": [],
            "sections": ["AAAS100-0101", "AAAS100-0102"]
        });

        let processed = process_course(&course);

        assert_eq!(processed["grading_method"], "Regular, Pass-Fail");
        assert_eq!(processed["gen_ed"], "DSHU");
        assert_eq!(processed["core"], "");
        assert_eq!(processed["sections"], "AAAS100-0101, AAAS100-0102");
        assert_eq!(processed["credits"], "3");
        // the input is left alone
        assert_eq!(course["grading_method"], json!(["Regular", "Pass-Fail"]));
    }

    #[test]
    fn test_process_course_complex_data() {
        let course = json!({
            "course_id": "COMPLEX100",
            "grading_method": ["Regular", ["Nested1", "Nested2"], "Pass-Fail"],
            "gen_ed": "Already a string",
            "sections": null
        });

        let processed = process_course(&course);

        assert_eq!(processed["grading_method"], "Regular, Nested1, Nested2, Pass-Fail");
        assert_eq!(processed["gen_ed"], "Already a string");
        assert!(processed["sections"].is_null());
    }

    #[test]
    fn test_process_course_only_touches_listed_fields() {
        let course = json!({
            "course_id": "TEST100",
            "grading_method": "String grading method",
            "gen_ed": ["DSHU", "DVUP"],
            "core": "String core",
            "sections": ["SEC1", "SEC2"],
            "other_field": ["Not processed"]
        });

        let processed = process_course(&course);

        assert_eq!(processed["gen_ed"], "DSHU, DVUP");
        assert_eq!(processed["sections"], "SEC1, SEC2");
        assert_eq!(processed["grading_method"], "String grading method");
        assert_eq!(processed["core"], "String core");
        assert_eq!(processed["other_field"], json!(["Not processed"]));
    }

    #[test]
    fn test_field_text() {
        let course = json!({"name": "Intro", "core": [], "credits": 3, "dept_id": null});

        assert_eq!(field_text(&course, "name"), "Intro");
        assert_eq!(field_text(&course, "core"), "-");
        assert_eq!(field_text(&course, "credits"), "3");
        assert_eq!(field_text(&course, "dept_id"), "-");
        assert_eq!(field_text(&course, "missing"), "-");
    }
}

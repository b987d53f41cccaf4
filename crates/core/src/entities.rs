//! Flattening of provider parameter values into display strings.
//!
//! Composite values only contribute the keys listed in [`RECOGNIZED_KEYS`],
//! concatenated in that order without separators. Lists contribute their first
//! element only; whether later elements should be enumerated is still an open
//! product decision, so they are ignored rather than guessed at.

use crate::domain::value::DynamicValue;

/// Keys extracted from composite entities, in output order.
pub const RECOGNIZED_KEYS: [&str; 3] = ["amount", "unit", "date_time"];

pub fn flatten(value: &DynamicValue) -> String {
    match value {
        DynamicValue::String(text) => text.clone(),
        DynamicValue::Number(number) => format_number(*number),
        DynamicValue::Bool(flag) => flag.to_string(),
        DynamicValue::Map(fields) => RECOGNIZED_KEYS
            .iter()
            .filter_map(|key| fields.get(*key).map(|field| contribution(key, field)))
            .collect(),
        DynamicValue::List(items) => items.first().map(flatten).unwrap_or_default(),
        DynamicValue::Null => String::new(),
    }
}

/// Fixed-point rendering with six fractional digits, never scientific notation.
pub fn format_number(number: f64) -> String {
    format!("{number:.6}")
}

fn contribution(key: &str, field: &DynamicValue) -> String {
    match key {
        "amount" => format_number(field.as_number().unwrap_or_default()),
        _ => field.as_str().unwrap_or_default().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::domain::value::DynamicValue;

    use super::{flatten, format_number};

    fn flatten_json(value: serde_json::Value) -> String {
        flatten(&DynamicValue::from(value))
    }

    #[test]
    fn scalars_use_fixed_formats() {
        assert_eq!(flatten(&DynamicValue::from("Amsterdam")), "Amsterdam");
        assert_eq!(flatten(&DynamicValue::Number(3.0)), "3.000000");
        assert_eq!(flatten(&DynamicValue::Number(-0.25)), "-0.250000");
        assert_eq!(flatten(&DynamicValue::Bool(true)), "true");
        assert_eq!(flatten(&DynamicValue::Bool(false)), "false");
        assert_eq!(flatten(&DynamicValue::Null), "");
    }

    #[test]
    fn large_numbers_are_not_rendered_in_scientific_notation() {
        assert_eq!(format_number(1e21), "1000000000000000000000.000000");
        assert_eq!(format_number(1e-7), "0.000000");
    }

    #[test]
    fn composite_entities_concatenate_recognized_keys_in_fixed_order() {
        assert_eq!(flatten_json(json!({ "unit": "kg", "amount": 12.5 })), "12.500000kg");
        assert_eq!(
            flatten_json(json!({ "date_time": "2024-05-01T10:00:00+02:00", "amount": 1 })),
            "1.0000002024-05-01T10:00:00+02:00"
        );
    }

    #[test]
    fn composite_entities_ignore_unrecognized_keys() {
        assert_eq!(flatten_json(json!({ "currency": "EUR", "value": 3 })), "");
        assert_eq!(flatten_json(json!({ "unit": "m", "extra": "ignored" })), "m");
    }

    #[test]
    fn mistyped_recognized_fields_fall_back_to_zero_values() {
        assert_eq!(flatten_json(json!({ "amount": "twelve", "unit": 5 })), "0.000000");
    }

    #[test]
    fn lists_only_contribute_their_first_element() {
        assert_eq!(flatten_json(json!(["first", "second"])), "first");
        assert_eq!(flatten_json(json!([{ "amount": 2, "unit": "l" }, "ignored"])), "2.000000l");
        assert_eq!(flatten_json(json!([[true, false], 7])), "true");
    }

    #[test]
    fn empty_list_flattens_to_empty_string() {
        assert_eq!(flatten(&DynamicValue::List(Vec::new())), "");
    }
}

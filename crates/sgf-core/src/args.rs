//! Argument schemas for the two operations.
//!
//! Both schemas are closed: unknown fields are rejected during deserialization.
//! Selector rules that need no parsed game run here too, through the same
//! functions the resolver uses.

use std::borrow::Cow;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::SgfError;
use crate::selector::{check_request, ImageFormat, SelectorInput, Theme};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InfoArgs {
    #[validate(length(min = 1, message = "sgfContent must be a non-empty string"))]
    pub sgf_content: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[validate(schema(function = "validate_selection"))]
pub struct DiagramArgs {
    #[validate(length(min = 1, message = "sgfContent must be a non-empty string"))]
    pub sgf_content: String,
    pub move_number: Option<i64>,
    pub start_move: Option<i64>,
    pub end_move: Option<i64>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub coord_labels: Option<bool>,
    pub move_numbers: Option<bool>,
    pub theme: Option<Theme>,
    pub format: Option<ImageFormat>,
}

impl DiagramArgs {
    pub fn selector(&self) -> SelectorInput {
        SelectorInput {
            move_number: self.move_number,
            start_move: self.start_move,
            end_move: self.end_move,
            width: self.width,
            height: self.height,
            coord_labels: self.coord_labels,
            move_numbers: self.move_numbers,
            theme: self.theme,
            format: self.format,
        }
    }
}

fn validate_selection(args: &DiagramArgs) -> Result<(), ValidationError> {
    check_request(&args.selector()).map_err(|rule| {
        let mut err = ValidationError::new("selector");
        err.message = Some(Cow::Owned(rule.to_string()));
        err.add_param(Cow::Borrowed("details"), &rule.details());
        err
    })
}

/// Deserialize and validate raw arguments for an operation.
pub fn parse_args<T>(args: JsonValue) -> Result<T, SgfError>
where
    T: DeserializeOwned + Validate,
{
    if !args.is_object() {
        return Err(SgfError::InvalidArguments {
            message: "Arguments must be a JSON object".into(),
            details: None,
        });
    }

    let parsed: T = serde_json::from_value(args).map_err(|e| SgfError::InvalidArguments {
        message: format!("Invalid arguments: {e}"),
        details: None,
    })?;

    parsed.validate().map_err(from_validation_errors)?;
    Ok(parsed)
}

fn from_validation_errors(errors: ValidationErrors) -> SgfError {
    let mut fields: Vec<(String, Vec<ValidationError>)> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| (field.to_string(), errs.clone()))
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let first = fields
        .into_iter()
        .find_map(|(field, errs)| errs.into_iter().next().map(|e| (field, e)));

    let Some((field, err)) = first else {
        return SgfError::InvalidArguments {
            message: "Invalid arguments".into(),
            details: None,
        };
    };

    let message = err
        .message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| format!("{} is invalid", camel_case(&field)));

    let details = match err.params.get("details") {
        Some(details) if !details.is_null() => Some(details.clone()),
        _ if field != "__all__" => Some(json!({ "field": camel_case(&field) })),
        _ => None,
    };

    SgfError::InvalidArguments { message, details }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::selector::{resolve, MAX_BOARD_SIZE};

    fn diagram(args: JsonValue) -> Result<DiagramArgs, SgfError> {
        parse_args(args)
    }

    #[test]
    fn test_info_args() {
        let args: InfoArgs = parse_args(json!({ "sgfContent": "(;GM[1])" })).unwrap();
        assert_eq!(args.sgf_content, "(;GM[1])");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = parse_args::<InfoArgs>(json!({ "sgfContent": "(;GM[1])", "extra": 1 })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameters);
        assert!(err.to_string().contains("unknown field `extra`"));
    }

    #[test]
    fn test_missing_and_empty_content() {
        let err = parse_args::<InfoArgs>(json!({})).unwrap_err();
        assert!(err.to_string().contains("missing field `sgfContent`"));

        let err = parse_args::<InfoArgs>(json!({ "sgfContent": "" })).unwrap_err();
        assert_eq!(err.to_string(), "sgfContent must be a non-empty string");
        assert_eq!(err.details(), Some(json!({ "field": "sgfContent" })));
    }

    #[test]
    fn test_non_object_rejected() {
        let err = parse_args::<InfoArgs>(json!("(;GM[1])")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameters);
    }

    #[test]
    fn test_wrong_types_rejected() {
        let err = diagram(json!({ "sgfContent": "(;GM[1])", "moveNumber": "three" })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameters);

        let err = diagram(json!({ "sgfContent": "(;GM[1])", "theme": "neon" })).unwrap_err();
        assert!(err.to_string().contains("unknown variant `neon`"));
    }

    #[test]
    fn test_diagram_args_full() {
        let args = diagram(json!({
            "sgfContent": "(;GM[1];B[aa])",
            "startMove": 1,
            "endMove": 1,
            "width": 800,
            "height": 400,
            "coordLabels": false,
            "moveNumbers": true,
            "theme": "minimal",
            "format": "jpeg"
        }))
        .unwrap();
        let selector = args.selector();
        assert_eq!(selector.start_move, Some(1));
        assert_eq!(selector.theme, Some(Theme::Minimal));
        assert_eq!(selector.format, Some(ImageFormat::Jpeg));
    }

    #[test]
    fn test_mutual_exclusion_at_boundary() {
        let err = diagram(json!({
            "sgfContent": "(;GM[1];B[aa])",
            "moveNumber": 1,
            "startMove": 1,
            "endMove": 1
        }))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameters);
        assert_eq!(err.to_string(), "moveNumber cannot be combined with startMove/endMove");
    }

    #[test]
    fn test_boundary_and_resolver_agree() {
        let cases = [
            json!({ "moveNumber": 0 }),
            json!({ "startMove": 3 }),
            json!({ "startMove": 5, "endMove": 2 }),
            json!({ "width": 20 }),
            json!({ "height": 5000 }),
        ];
        for mut case in cases {
            case["sgfContent"] = json!("(;GM[1];B[aa])");
            let boundary = diagram(case.clone()).unwrap_err();

            let args: DiagramArgs = serde_json::from_value(case).unwrap();
            let resolver = resolve(&args.selector(), 10, 19, MAX_BOARD_SIZE).unwrap_err();

            assert_eq!(boundary.to_string(), resolver.to_string());
            assert_eq!(boundary.details(), resolver.details());
        }
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("sgf_content"), "sgfContent");
        assert_eq!(camel_case("width"), "width");
    }
}

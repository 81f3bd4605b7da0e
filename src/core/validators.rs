// src/core/validators.rs

use crate::models::Metadata;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^\s@<>()\[\]\\,;:]+@[^\s@<>()\[\]\\,;:]+\.[A-Za-z]{2,}$").unwrap();
    static ref URL_RE: Regex = Regex::new(r"^https?://[^\s/$.?#][^\s]*$").unwrap();
    static ref SLUG_RE: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

/// A check returning a failure message for bad input, `None` for good input.
pub type CustomValidator = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// A check applied to one positional input.
///
/// All variants but `Custom` can be declared in a manifest:
/// `validators = ["required", { contains = { values = ["ios", "android"] } }]`.
#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub enum Validator {
    /// Rejects the empty string.
    Required,
    /// A plausible email address.
    Email,
    /// Parses as a number.
    Numeric,
    /// An http or https URL.
    Url,
    /// Lowercase letters, digits and dashes.
    Slug,
    /// One of a fixed set of values.
    Contains {
        /// The accepted values.
        values: Vec<String>,
        /// Case-insensitive unless set.
        #[serde(default)]
        case_sensitive: bool,
    },
    /// A validator supplied in code.
    #[serde(skip)]
    Custom(CustomValidator),
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => f.write_str("Required"),
            Self::Email => f.write_str("Email"),
            Self::Numeric => f.write_str("Numeric"),
            Self::Url => f.write_str("Url"),
            Self::Slug => f.write_str("Slug"),
            Self::Contains {
                values,
                case_sensitive,
            } => f
                .debug_struct("Contains")
                .field("values", values)
                .field("case_sensitive", case_sensitive)
                .finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Validator {
    /// Wraps a closure as a validator.
    pub fn custom(check: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(check))
    }

    /// Runs the check, returning the failure message for `key` if `input` is rejected.
    pub fn check(&self, input: &str, key: &str) -> Option<String> {
        match self {
            Self::Required => input
                .is_empty()
                .then(|| format!("{key} must not be empty.")),
            Self::Email => (!EMAIL_RE.is_match(input))
                .then(|| format!("{key} is an invalid email address.")),
            Self::Numeric => (!is_numeric(input)).then(|| format!("{key} must be numeric.")),
            Self::Url => (!URL_RE.is_match(input)).then(|| {
                format!("{key} is an invalid url. Please make sure it starts with http:// or https://.")
            }),
            Self::Slug => (!SLUG_RE.is_match(input))
                .then(|| format!("{key} is an invalid slug (machine name).")),
            Self::Contains {
                values,
                case_sensitive,
            } => {
                let found = if *case_sensitive {
                    values.iter().any(|v| v == input)
                } else {
                    values.iter().any(|v| v.eq_ignore_ascii_case(input))
                };
                (!found).then(|| format!("{key} must be one of: {}.", values.join(", ")))
            }
            Self::Custom(check) => check(input),
        }
    }
}

/// Blank input counts as numeric; `Required` is what rejects it.
fn is_numeric(input: &str) -> bool {
    let trimmed = input.trim();
    trimmed.is_empty() || trimmed.parse::<f64>().is_ok_and(|n| !n.is_nan())
}

/// Every failure message produced while validating inputs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", .messages.join("\n"))]
pub struct ValidationError {
    /// One message per failed check, in validator order.
    pub messages: Vec<String>,
}

/// Runs every validator against `input`, collecting all failures.
pub fn validate(input: &str, key: &str, validators: &[Validator]) -> Result<(), ValidationError> {
    let messages: Vec<String> = validators
        .iter()
        .filter_map(|v| v.check(input, key))
        .collect();
    if messages.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { messages })
    }
}

/// Validates each declared input position of `metadata` against `inputs`.
///
/// A missing position is validated as the empty string. Failures from all inputs are
/// reported together.
pub fn validate_inputs(metadata: &Metadata, inputs: &[String]) -> Result<(), ValidationError> {
    let mut messages = Vec::new();
    for (i, input) in metadata.inputs.iter().enumerate() {
        if input.validators.is_empty() {
            continue;
        }
        let value = inputs.get(i).map(String::as_str).unwrap_or_default();
        if let Err(err) = validate(value, &input.name, &input.validators) {
            messages.extend(err.messages);
        }
    }

    if messages.is_empty() {
        Ok(())
    } else {
        log::debug!("Input validation failed for '{}': {:?}", metadata.name, messages);
        Err(ValidationError { messages })
    }
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InputDef;

    #[test]
    fn test_required() {
        assert!(validate("x", "name", &[Validator::Required]).is_ok());
        let err = validate("", "name", &[Validator::Required]).unwrap_err();
        assert_eq!(err.messages, vec!["name must not be empty."]);
    }

    #[test]
    fn test_email() {
        assert!(Validator::Email.check("dev@example.com", "email").is_none());
        assert!(Validator::Email.check("dev@example", "email").is_some());
        assert!(Validator::Email.check("not an email", "email").is_some());
    }

    #[test]
    fn test_numeric() {
        assert!(Validator::Numeric.check("42", "n").is_none());
        assert!(Validator::Numeric.check("-3.5", "n").is_none());
        assert!(Validator::Numeric.check("", "n").is_none());
        assert!(Validator::Numeric.check("NaN", "n").is_some());
        assert!(Validator::Numeric.check("12abc", "n").is_some());
    }

    #[test]
    fn test_url_and_slug() {
        assert!(Validator::Url.check("https://ionicframework.com", "url").is_none());
        assert!(Validator::Url.check("ftp://example.com", "url").is_some());
        assert!(Validator::Slug.check("my-app-2", "slug").is_none());
        assert!(Validator::Slug.check("My App", "slug").is_some());
        assert!(Validator::Slug.check("trailing-", "slug").is_some());
    }

    #[test]
    fn test_contains_case_handling() {
        let insensitive = Validator::Contains {
            values: vec!["ios".to_string(), "android".to_string()],
            case_sensitive: false,
        };
        assert!(insensitive.check("iOS", "platform").is_none());
        assert_eq!(
            insensitive.check("web", "platform"),
            Some("platform must be one of: ios, android.".to_string())
        );

        let sensitive = Validator::Contains {
            values: vec!["ios".to_string()],
            case_sensitive: true,
        };
        assert!(sensitive.check("iOS", "platform").is_some());
    }

    #[test]
    fn test_validate_collects_every_failure() {
        let err = validate("", "email", &[Validator::Required, Validator::Email]).unwrap_err();
        assert_eq!(err.messages.len(), 2);
        assert!(err.to_string().contains("must not be empty"));
        assert!(err.to_string().contains("invalid email"));
    }

    #[test]
    fn test_custom_validator() {
        let short = Validator::custom(|s| (s.len() > 3).then(|| "too long".to_string()));
        assert!(validate("abc", "code", std::slice::from_ref(&short)).is_ok());
        assert_eq!(
            validate("abcd", "code", &[short]).unwrap_err().messages,
            vec!["too long"]
        );
    }

    #[test]
    fn test_validate_inputs_by_position() {
        let metadata = Metadata::new("start")
            .with_input(InputDef::new("name").with_validator(Validator::Required))
            .with_input(InputDef::new("template").with_validator(Validator::Slug))
            .with_input(InputDef::new("notes"));

        let ok = vec!["myApp".to_string(), "tabs".to_string()];
        assert!(validate_inputs(&metadata, &ok).is_ok());

        let err = validate_inputs(&metadata, &[]).unwrap_err();
        assert_eq!(
            err.messages,
            vec![
                "name must not be empty.".to_string(),
                "template is an invalid slug (machine name).".to_string(),
            ]
        );
    }

    #[test]
    fn test_validators_from_toml() {
        #[derive(Deserialize)]
        struct Holder {
            validators: Vec<Validator>,
        }
        let holder: Holder = toml::from_str(
            r#"validators = ["required", { contains = { values = ["ios", "android"] } }]"#,
        )
        .unwrap();
        assert!(matches!(holder.validators[0], Validator::Required));
        assert!(matches!(
            &holder.validators[1],
            Validator::Contains { values, case_sensitive: false } if values.len() == 2
        ));
    }
}

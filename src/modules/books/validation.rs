//! Structural validation of book request bodies.
//!
//! Bodies are checked against a static field table before they are deserialized,
//! and every violation is reported rather than only the first.

use std::fmt;

use bookstore_http::error::AppError;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::models::{BookUpdate, NewBook};

/// JSON type a field must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Whole number that fits in an `i32`
    Integer,
}

impl FieldKind {
    fn type_name(self) -> &'static str {
        match self {
            FieldKind::Text => "string",
            FieldKind::Integer => "integer",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    pub non_empty: bool,
}

const fn text(name: &'static str) -> FieldRule {
    FieldRule {
        name,
        kind: FieldKind::Text,
        non_empty: false,
    }
}

const fn integer(name: &'static str) -> FieldRule {
    FieldRule {
        name,
        kind: FieldKind::Integer,
        non_empty: false,
    }
}

/// An ordered set of required fields
#[derive(Debug)]
pub struct Schema {
    fields: &'static [FieldRule],
}

/// Fields accepted by `POST /books`
pub static NEW_BOOK_SCHEMA: Schema = Schema {
    fields: &[
        FieldRule {
            name: "isbn",
            kind: FieldKind::Text,
            non_empty: true,
        },
        text("amazon_url"),
        text("author"),
        text("language"),
        integer("pages"),
        text("publisher"),
        text("title"),
        integer("year"),
    ],
};

/// Fields accepted by `PUT /books/{isbn}`; the ISBN itself is not updatable
pub static BOOK_UPDATE_SCHEMA: Schema = Schema {
    fields: &[
        text("amazon_url"),
        text("author"),
        text("language"),
        integer("pages"),
        text("publisher"),
        text("title"),
        integer("year"),
    ],
};

/// Every rule a request body broke, in schema order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<String>);

impl ValidationErrors {
    pub fn messages(&self) -> &[String] {
        &self.0
    }

    pub fn into_messages(self) -> Vec<String> {
        self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let details = errors.into_messages().into_iter().map(Value::String).collect();
        AppError::validation(details, "Validation failed")
    }
}

impl Schema {
    /// Collect every violation of this schema in `body`.
    pub fn violations(&self, body: &Value) -> Vec<String> {
        let Some(object) = body.as_object() else {
            return vec!["instance is not of a type(s) object".to_string()];
        };

        let mut errors = Vec::new();
        for rule in self.fields {
            match object.get(rule.name) {
                None => errors.push(format!("instance requires property \"{}\"", rule.name)),
                Some(value) => {
                    if let Some(error) = check_field(rule, value) {
                        errors.push(error);
                    }
                }
            }
        }
        errors
    }

    /// Check `body` and deserialize it into `T` when it conforms.
    pub fn parse<T: DeserializeOwned>(&self, body: &Value) -> Result<T, ValidationErrors> {
        let errors = self.violations(body);
        if !errors.is_empty() {
            return Err(ValidationErrors(errors));
        }
        self.deserialize(body)
    }

    /// Deserialize a conforming body, rewriting whole floats such as `123.0`
    /// in integer fields as integers first.
    fn deserialize<T: DeserializeOwned>(&self, body: &Value) -> Result<T, ValidationErrors> {
        let mut body = body.clone();
        for rule in self.fields.iter().filter(|rule| rule.kind == FieldKind::Integer) {
            if let Some(field) = body.get_mut(rule.name) {
                if let Some(number) = whole_number(field) {
                    *field = Value::from(number);
                }
            }
        }
        serde_json::from_value(body).map_err(|err| ValidationErrors(vec![err.to_string()]))
    }
}

/// Any JSON number without a fractional part, `2000` and `2000.0` alike
fn whole_number(value: &Value) -> Option<i64> {
    if let Some(number) = value.as_i64() {
        return Some(number);
    }
    let number = value.as_f64()?;
    (number.fract() == 0.0).then_some(number as i64)
}

fn check_field(rule: &FieldRule, value: &Value) -> Option<String> {
    let wrong_type = || {
        Some(format!(
            "instance.{} is not of a type(s) {}",
            rule.name,
            rule.kind.type_name()
        ))
    };

    match rule.kind {
        FieldKind::Text => match value.as_str() {
            None => wrong_type(),
            Some("") if rule.non_empty => Some(format!(
                "instance.{} does not meet minimum length of 1",
                rule.name
            )),
            Some(_) => None,
        },
        FieldKind::Integer => match whole_number(value).map(i32::try_from) {
            None => wrong_type(),
            Some(Ok(_)) => None,
            Some(Err(_)) => Some(format!(
                "instance.{} must be between {} and {}",
                rule.name,
                i32::MIN,
                i32::MAX
            )),
        },
    }
}

/// Validate a create body.
pub fn validate_new(body: &Value) -> Result<NewBook, ValidationErrors> {
    NEW_BOOK_SCHEMA.parse(body)
}

/// Validate an update body for the book at `isbn`.
///
/// An `isbn` in the body is tolerated only when it matches the path.
pub fn validate_update(body: &Value, isbn: &str) -> Result<BookUpdate, ValidationErrors> {
    let mut errors = BOOK_UPDATE_SCHEMA.violations(body);

    if let Some(sent) = body.get("isbn") {
        if sent.as_str() != Some(isbn) {
            errors.push("instance.isbn cannot be changed".to_string());
        }
    }

    if !errors.is_empty() {
        return Err(ValidationErrors(errors));
    }
    BOOK_UPDATE_SCHEMA.deserialize(body)
}

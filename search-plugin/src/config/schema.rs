//! Declarative schema for plugin options.
//!
//! The schema is plain data: a tree of `Record`s mapping field names to
//! `Shape`s. `validate` walks a merged options document against it and
//! reports the first violation with its JSON path. Nothing here performs I/O.

use search_plugin_shared::{ApiVersion, SelectorName};
use serde_json::{Map, Value};
use thiserror::Error;

/// The shape a value must have.
#[derive(Debug)]
pub enum Shape {
    /// Any string.
    String,
    /// `true` or `false`.
    Boolean,
    /// Non-negative integer.
    Count,
    /// Only the literal `false`.
    False,
    /// One of the listed strings.
    Enum(&'static [&'static str]),
    /// Array whose items all have the given shape.
    Array(&'static Shape),
    /// Any JSON object.
    Object,
    /// Object restricted to the fields of a record.
    Record(&'static Record),
    /// The first matching alternative wins.
    Either(&'static [Shape]),
}

/// A named field of a record.
#[derive(Debug)]
pub struct Field {
    pub name: &'static str,
    pub shape: Shape,
}

/// A closed object: only the listed fields are allowed.
#[derive(Debug)]
pub struct Record {
    pub fields: &'static [Field],
    /// Pairs of fields that may not both be present.
    pub exclusive: &'static [(&'static str, &'static str)],
}

impl Record {
    fn field(&self, name: &str) -> Option<&'static Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

const HOSTS: Shape = Shape::Either(&[
    Shape::String,
    Shape::Array(&Shape::String),
    Shape::Array(&Shape::Record(&HOST_DESCRIPTOR)),
]);

const STRINGS: Shape = Shape::Either(&[Shape::String, Shape::Array(&Shape::String)]);

/// Structured host entry.
pub const HOST_DESCRIPTOR: Record = Record {
    fields: &[
        Field { name: "host", shape: Shape::String },
        Field { name: "port", shape: Shape::Count },
        Field { name: "protocol", shape: Shape::Enum(&["http", "https"]) },
        Field { name: "path", shape: Shape::String },
        Field { name: "auth", shape: Shape::String },
        Field { name: "headers", shape: Shape::Object },
    ],
    exclusive: &[],
};

/// TLS settings.
pub const TLS: Record = Record {
    fields: &[
        Field { name: "pfx", shape: STRINGS },
        Field { name: "key", shape: Shape::String },
        Field { name: "passphrase", shape: Shape::String },
        Field { name: "cert", shape: Shape::String },
        Field { name: "ca", shape: STRINGS },
        Field { name: "ciphers", shape: Shape::String },
        Field { name: "rejectUnauthorized", shape: Shape::Boolean },
        Field { name: "secureProtocol", shape: Shape::String },
    ],
    exclusive: &[],
};

/// Search client options.
pub const CLIENT_CONFIGURATION: Record = Record {
    fields: &[
        Field { name: "host", shape: HOSTS },
        Field { name: "hosts", shape: HOSTS },
        Field { name: "httpAuth", shape: Shape::String },
        Field {
            name: "log",
            shape: Shape::Either(&[
                Shape::String,
                Shape::Array(&Shape::String),
                Shape::Object,
                Shape::Array(&Shape::Object),
            ]),
        },
        Field { name: "apiVersion", shape: Shape::Enum(ApiVersion::TAGS) },
        Field { name: "sniffOnStart", shape: Shape::Boolean },
        Field { name: "sniffInterval", shape: Shape::Either(&[Shape::Count, Shape::False]) },
        Field { name: "sniffOnConnectionFault", shape: Shape::Boolean },
        Field { name: "maxRetries", shape: Shape::Count },
        Field { name: "requestTimeout", shape: Shape::Count },
        Field { name: "deadTimeout", shape: Shape::Count },
        Field { name: "pingTimeout", shape: Shape::Count },
        Field { name: "maxSockets", shape: Shape::Count },
        Field { name: "keepAlive", shape: Shape::Boolean },
        Field { name: "keepAliveInterval", shape: Shape::Count },
        Field { name: "keepAliveMaxFreeSockets", shape: Shape::Count },
        Field { name: "keepAliveFreeSocketTimeout", shape: Shape::Count },
        Field { name: "suggestCompression", shape: Shape::Boolean },
        Field { name: "connectionClass", shape: Shape::String },
        Field { name: "sniffedNodesProtocol", shape: Shape::String },
        Field { name: "ssl", shape: Shape::Record(&TLS) },
        Field { name: "selector", shape: Shape::Enum(SelectorName::NAMES) },
    ],
    exclusive: &[("host", "hosts")],
};

/// Top level plugin options.
pub const PLUGIN_OPTIONS: Record = Record {
    fields: &[
        Field { name: "indices", shape: Shape::Array(&Shape::String) },
        Field { name: "configuration", shape: Shape::Record(&CLIENT_CONFIGURATION) },
    ],
    exclusive: &[],
};

/// A schema violation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A key outside the closed set of recognised keys.
    #[error("\"{path}\" is not allowed")]
    UnknownKey { path: String },

    /// A value of the wrong type.
    #[error("\"{path}\" must be {expected}")]
    TypeMismatch { path: String, expected: String },

    /// A value outside an enumerated set.
    #[error("\"{path}\" must be one of [{}]", allowed.join(", "))]
    InvalidValue { path: String, allowed: Vec<String> },

    /// Two mutually exclusive keys are both present.
    #[error("\"{path}\" contains a conflict between exclusive peers [{first}, {second}]")]
    Conflict {
        path: String,
        first: String,
        second: String,
    },

    /// The document passed validation but could not be decoded.
    #[error("{0}")]
    Decode(String),
}

impl ValidationError {
    /// JSON path of the offending value, when there is one.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::UnknownKey { path }
            | Self::TypeMismatch { path, .. }
            | Self::InvalidValue { path, .. }
            | Self::Conflict { path, .. } => Some(path),
            Self::Decode(_) => None,
        }
    }

    /// Create a conflict error.
    pub fn conflict(path: &str, first: &str, second: &str) -> Self {
        Self::Conflict {
            path: path.to_string(),
            first: first.to_string(),
            second: second.to_string(),
        }
    }
}

/// Validate a merged options document against `PLUGIN_OPTIONS`.
pub fn validate(document: &Value) -> Result<(), ValidationError> {
    check(document, &Shape::Record(&PLUGIN_OPTIONS), "value")
}

/// Validate `value` against `shape`; `path` names the value in errors.
pub fn check(value: &Value, shape: &Shape, path: &str) -> Result<(), ValidationError> {
    match shape {
        Shape::String => expect(value.is_string(), shape, path),
        Shape::Boolean => expect(value.is_boolean(), shape, path),
        Shape::Count => expect(value.is_u64(), shape, path),
        Shape::False => expect(value == &Value::Bool(false), shape, path),
        Shape::Object => expect(value.is_object(), shape, path),
        Shape::Enum(allowed) => match value.as_str() {
            Some(s) if allowed.contains(&s) => Ok(()),
            _ => Err(ValidationError::InvalidValue {
                path: path.to_string(),
                allowed: allowed.iter().map(|s| s.to_string()).collect(),
            }),
        },
        Shape::Array(item) => {
            let items = value.as_array().ok_or_else(|| mismatch(shape, path))?;
            for (i, element) in items.iter().enumerate() {
                check(element, item, &format!("{}[{}]", path, i))?;
            }
            Ok(())
        }
        Shape::Record(record) => {
            let object = value.as_object().ok_or_else(|| mismatch(shape, path))?;
            check_record(object, record, path)
        }
        Shape::Either(alternatives) => {
            if alternatives.iter().any(|alt| check(value, alt, path).is_ok()) {
                return Ok(());
            }
            // A single alternative of the right JSON type gives the most
            // precise error, e.g. an unknown key inside a host descriptor.
            let mut same_type = alternatives.iter().filter(|alt| alt.accepts_type_of(value));
            match (same_type.next(), same_type.next()) {
                (Some(alt), None) => check(value, alt, path),
                _ => Err(mismatch(shape, path)),
            }
        }
    }
}

fn check_record(object: &Map<String, Value>, record: &Record, path: &str) -> Result<(), ValidationError> {
    for (key, value) in object {
        let child = format!("{}.{}", path, key);
        let field = record
            .field(key)
            .ok_or_else(|| ValidationError::UnknownKey { path: child.clone() })?;
        check(value, &field.shape, &child)?;
    }

    for (first, second) in record.exclusive {
        if object.contains_key(*first) && object.contains_key(*second) {
            return Err(ValidationError::conflict(path, first, second));
        }
    }

    Ok(())
}

fn expect(ok: bool, shape: &Shape, path: &str) -> Result<(), ValidationError> {
    if ok {
        Ok(())
    } else {
        Err(mismatch(shape, path))
    }
}

fn mismatch(shape: &Shape, path: &str) -> ValidationError {
    ValidationError::TypeMismatch {
        path: path.to_string(),
        expected: shape.describe(),
    }
}

impl Shape {
    /// Human readable description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::String => "a string".to_string(),
            Self::Boolean => "a boolean".to_string(),
            Self::Count => "a non-negative integer".to_string(),
            Self::False => "false".to_string(),
            Self::Enum(allowed) => format!("one of [{}]", allowed.join(", ")),
            Self::Array(item) => format!("an array of {}", item.describe_plural()),
            Self::Object | Self::Record(_) => "an object".to_string(),
            Self::Either(alternatives) => alternatives
                .iter()
                .map(Shape::describe)
                .collect::<Vec<_>>()
                .join(" or "),
        }
    }

    fn describe_plural(&self) -> String {
        match self {
            Self::String => "strings".to_string(),
            Self::Object | Self::Record(_) => "objects".to_string(),
            other => other.describe(),
        }
    }

    /// Whether `value` has the JSON type this shape expects. Arrays look at
    /// their items; records ignore their fields.
    fn accepts_type_of(&self, value: &Value) -> bool {
        match self {
            Self::String | Self::Enum(_) => value.is_string(),
            Self::Boolean | Self::False => value.is_boolean(),
            Self::Count => value.is_number(),
            Self::Object | Self::Record(_) => value.is_object(),
            Self::Array(item) => value
                .as_array()
                .is_some_and(|items| items.iter().all(|v| item.accepts_type_of(v))),
            Self::Either(alternatives) => alternatives.iter().any(|alt| alt.accepts_type_of(value)),
        }
    }
}

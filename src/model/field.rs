//! Field kinds, concrete values, and descriptors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic type of a field, independent of any one store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Integer,
    Real,
    Text,
    Boolean,
    Timestamp,
    Uuid,
    Json,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldKind::Integer => "integer",
            FieldKind::Real => "real",
            FieldKind::Text => "text",
            FieldKind::Boolean => "boolean",
            FieldKind::Timestamp => "timestamp",
            FieldKind::Uuid => "uuid",
            FieldKind::Json => "json",
        };
        f.write_str(s)
    }
}

/// A concrete (set) field value. Unset is `None` at the call site, never a variant here.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Real(f64),
    Text(String),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
    Uuid(uuid::Uuid),
    Json(serde_json::Value),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Integer(_) => FieldKind::Integer,
            FieldValue::Real(_) => FieldKind::Real,
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Boolean(_) => FieldKind::Boolean,
            FieldValue::Timestamp(_) => FieldKind::Timestamp,
            FieldValue::Uuid(_) => FieldKind::Uuid,
            FieldValue::Json(_) => FieldKind::Json,
        }
    }
}

/// Rust scalar that can live in a resource field.
pub trait FieldType: Clone + Sized {
    const KIND: FieldKind;
    fn into_value(self) -> FieldValue;
    fn from_value(value: FieldValue) -> Option<Self>;
}

macro_rules! impl_field_type {
    ($ty:ty, $kind:ident) => {
        impl FieldType for $ty {
            const KIND: FieldKind = FieldKind::$kind;

            fn into_value(self) -> FieldValue {
                FieldValue::$kind(self)
            }

            fn from_value(value: FieldValue) -> Option<Self> {
                match value {
                    FieldValue::$kind(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

impl_field_type!(i64, Integer);
impl_field_type!(f64, Real);
impl_field_type!(String, Text);
impl_field_type!(bool, Boolean);
impl_field_type!(DateTime<Utc>, Timestamp);
impl_field_type!(uuid::Uuid, Uuid);
impl_field_type!(serde_json::Value, Json);

/// One named column of a resource type. Every field is nullable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub nullable: bool,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        FieldDescriptor {
            name: name.into(),
            kind,
            nullable: true,
        }
    }
}

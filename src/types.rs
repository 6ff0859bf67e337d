use std::fmt;

/// The value kind of a record member, decided from the member's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Bool,
    Str,
    Int,
    Uint,
    List,
    /// Floats, nested structs, maps, enums and non-string sequences.
    /// Described but never bound, merged or prompted.
    Unsupported,
}

impl Kind {
    pub fn is_bindable(self) -> bool {
        self != Kind::Unsupported
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Bool => "boolean",
            Kind::Str => "string",
            Kind::Int => "integer",
            Kind::Uint => "unsigned integer",
            Kind::List => "string list",
            Kind::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}

/// A resolved value for one field, ready to be written into its record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Bool(bool),
    Str(String),
    Int(i64),
    Uint(u64),
    List(Vec<String>),
}

impl FieldValue {
    pub fn kind(&self) -> Kind {
        match self {
            FieldValue::Bool(_) => Kind::Bool,
            FieldValue::Str(_) => Kind::Str,
            FieldValue::Int(_) => Kind::Int,
            FieldValue::Uint(_) => Kind::Uint,
            FieldValue::List(_) => Kind::List,
        }
    }

    pub(crate) fn into_json(self) -> serde_json::Value {
        match self {
            FieldValue::Bool(b) => serde_json::Value::Bool(b),
            FieldValue::Str(s) => serde_json::Value::String(s),
            FieldValue::Int(i) => serde_json::Value::from(i),
            FieldValue::Uint(u) => serde_json::Value::from(u),
            FieldValue::List(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::String).collect())
            }
        }
    }
}

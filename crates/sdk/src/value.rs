//! Weakly typed property values
//!
//! Hosts return property values in whatever shape their storage uses.
//! The mapping core converts these into the declared field types.

/// A raw property value as returned by the host
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawValue {
    /// No value stored
    #[default]
    Null,
    /// Boolean (true/false editors)
    Bool(bool),
    /// Integer (numeric editors, node pickers storing a single id)
    Int(i64),
    /// Floating point (decimal editors)
    Float(f64),
    /// Text (textbox, rich text, comma-separated pickers)
    Text(String),
    /// Multiple values (multi-node pickers, repeatable text)
    List(Vec<RawValue>),
}

impl RawValue {
    /// Check if the value is null or an empty/whitespace string
    pub fn is_empty(&self) -> bool {
        match self {
            RawValue::Null => true,
            RawValue::Text(s) => s.trim().is_empty(),
            RawValue::List(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Short name of the variant, for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            RawValue::Null => "null",
            RawValue::Bool(_) => "bool",
            RawValue::Int(_) => "int",
            RawValue::Float(_) => "float",
            RawValue::Text(_) => "text",
            RawValue::List(_) => "list",
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Bool(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Int(value)
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        RawValue::Int(value as i64)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Float(value)
    }
}

impl<T: Into<RawValue>> From<Vec<T>> for RawValue {
    fn from(value: Vec<T>) -> Self {
        RawValue::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(RawValue::Null)
    }
}

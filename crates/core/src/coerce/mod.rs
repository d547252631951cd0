//! Raw value coercion
//!
//! Host values arrive weakly typed. [`FromRaw`] converts a [`RawValue`]
//! into a property's declared type with best-effort rules:
//!
//! - a value already of the target shape is taken as-is
//! - text is parsed into numbers, booleans and enums
//! - delimited text becomes a list, or an [`ItemCollection`] of entities
//! - null and empty text become the type's default
//!
//! Failures are reported per property; the factories log them and leave the
//! property at its default.

mod collection;

use vault_sdk::RawValue;

use crate::context::VaultContext;
use crate::error::CoercionError;

pub use collection::ItemCollection;

/// Conversion from a raw host value into a property type
///
/// `scope` gives conversions that reference other nodes (collections) a way
/// to look them up through the same retrieval scope.
pub trait FromRaw: Sized {
    /// Convert `raw` into `Self`
    fn from_raw(raw: RawValue, scope: &VaultContext) -> Result<Self, CoercionError>;
}

impl FromRaw for RawValue {
    fn from_raw(raw: RawValue, _scope: &VaultContext) -> Result<Self, CoercionError> {
        Ok(raw)
    }
}

impl FromRaw for String {
    fn from_raw(raw: RawValue, scope: &VaultContext) -> Result<Self, CoercionError> {
        match raw {
            RawValue::Null => Ok(String::new()),
            RawValue::Text(text) => Ok(text),
            RawValue::Bool(value) => Ok(value.to_string()),
            RawValue::Int(value) => Ok(value.to_string()),
            RawValue::Float(value) => Ok(value.to_string()),
            RawValue::List(items) => {
                let parts = items
                    .into_iter()
                    .map(|item| String::from_raw(item, scope))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(parts.join(scope.config().delimiter()))
            }
        }
    }
}

impl FromRaw for bool {
    fn from_raw(raw: RawValue, _scope: &VaultContext) -> Result<Self, CoercionError> {
        match raw {
            RawValue::Null => Ok(false),
            RawValue::Bool(value) => Ok(value),
            RawValue::Int(value) => Ok(value != 0),
            RawValue::Text(text) => {
                let text = text.trim();
                if text.is_empty() || text == "0" || text.eq_ignore_ascii_case("false") {
                    Ok(false)
                } else if text == "1" || text.eq_ignore_ascii_case("true") {
                    Ok(true)
                } else {
                    Err(CoercionError::Parse {
                        target: "bool",
                        value: text.to_string(),
                    })
                }
            }
            other => Err(CoercionError::Unsupported {
                target: "bool",
                found: other.kind_name(),
            }),
        }
    }
}

macro_rules! impl_from_raw_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromRaw for $ty {
                fn from_raw(raw: RawValue, _scope: &VaultContext) -> Result<Self, CoercionError> {
                    match raw {
                        RawValue::Null => Ok(0),
                        RawValue::Bool(value) => Ok(value as $ty),
                        RawValue::Int(value) => <$ty>::try_from(value).map_err(|_| {
                            CoercionError::OutOfRange {
                                target: stringify!($ty),
                                value: value.to_string(),
                            }
                        }),
                        RawValue::Float(value) => {
                            if value.fract() == 0.0
                                && value >= <$ty>::MIN as f64
                                // MAX as f64 rounds up to 2^bits for 64-bit types
                                && value < <$ty>::MAX as f64 + 1.0
                            {
                                Ok(value as $ty)
                            } else {
                                Err(CoercionError::OutOfRange {
                                    target: stringify!($ty),
                                    value: value.to_string(),
                                })
                            }
                        }
                        RawValue::Text(text) => {
                            let text = text.trim();
                            if text.is_empty() {
                                return Ok(0);
                            }
                            text.parse::<$ty>().map_err(|_| CoercionError::Parse {
                                target: stringify!($ty),
                                value: text.to_string(),
                            })
                        }
                        other => Err(CoercionError::Unsupported {
                            target: stringify!($ty),
                            found: other.kind_name(),
                        }),
                    }
                }
            }
        )*
    };
}

impl_from_raw_int!(i8, i16, i32, i64, u8, u16, u32, u64, isize, usize);

macro_rules! impl_from_raw_float {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromRaw for $ty {
                fn from_raw(raw: RawValue, _scope: &VaultContext) -> Result<Self, CoercionError> {
                    match raw {
                        RawValue::Null => Ok(0.0),
                        RawValue::Int(value) => Ok(value as $ty),
                        RawValue::Float(value) => Ok(value as $ty),
                        RawValue::Text(text) => {
                            let text = text.trim();
                            if text.is_empty() {
                                return Ok(0.0);
                            }
                            text.parse::<$ty>().map_err(|_| CoercionError::Parse {
                                target: stringify!($ty),
                                value: text.to_string(),
                            })
                        }
                        other => Err(CoercionError::Unsupported {
                            target: stringify!($ty),
                            found: other.kind_name(),
                        }),
                    }
                }
            }
        )*
    };
}

impl_from_raw_float!(f32, f64);

impl<T: FromRaw> FromRaw for Option<T> {
    fn from_raw(raw: RawValue, scope: &VaultContext) -> Result<Self, CoercionError> {
        if raw.is_empty() {
            return Ok(None);
        }
        T::from_raw(raw, scope).map(Some)
    }
}

impl<T: FromRaw> FromRaw for Vec<T> {
    fn from_raw(raw: RawValue, scope: &VaultContext) -> Result<Self, CoercionError> {
        match raw {
            RawValue::Null => Ok(Vec::new()),
            RawValue::List(items) => items
                .into_iter()
                .map(|item| T::from_raw(item, scope))
                .collect(),
            RawValue::Text(text) => split_delimited(&text, scope.config().delimiter())
                .map(|part| T::from_raw(RawValue::Text(part.to_string()), scope))
                .collect(),
            single => Ok(vec![T::from_raw(single, scope)?]),
        }
    }
}

/// Split delimited text into trimmed, non-empty parts
pub(crate) fn split_delimited<'a>(
    text: &'a str,
    delimiter: &'a str,
) -> impl Iterator<Item = &'a str> + 'a {
    text.split(delimiter)
        .map(str::trim)
        .filter(|part| !part.is_empty())
}

//! SQL values and literal rendering.
//!
//! Statements in this crate are plain text: values are rendered as inline
//! literals rather than bound as parameters. [`SqlValue::to_sql_inline`] is
//! the single place where that rendering happens.

use std::fmt;

/// A single SQL scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Returns the SQL representation for inline use.
    ///
    /// Text is single-quoted with embedded quotes doubled, so a text value
    /// can never terminate its own literal. SQL has no literal for NaN or
    /// infinity, so non-finite floats render as `NULL`; [`SqlValue::is_finite`]
    /// lets callers reject them first.
    #[must_use]
    pub fn to_sql_inline(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Bool(b) => {
                if *b {
                    String::from("TRUE")
                } else {
                    String::from("FALSE")
                }
            }
            Self::Int(n) => format!("{n}"),
            Self::Float(f) if !f.is_finite() => String::from("NULL"),
            Self::Float(f) => format!("{f}"),
            Self::Text(s) => {
                let escaped = s.replace('\'', "''");
                format!("'{escaped}'")
            }
            Self::Blob(b) => {
                let hex: String = b.iter().map(|byte| format!("{byte:02X}")).collect();
                format!("X'{hex}'")
            }
        }
    }

    /// Returns true for [`SqlValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// False only for NaN and infinite floats.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        match self {
            Self::Float(f) => f.is_finite(),
            _ => true,
        }
    }

    /// Name of the variant, used in conversion errors.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
        }
    }
}

/// Plain-text rendering, the equivalent of a cursor's generic string
/// accessor. Unlike [`SqlValue::to_sql_inline`] nothing is quoted.
impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
            Self::Blob(b) => {
                for byte in b {
                    write!(f, "{byte:02X}")?;
                }
                Ok(())
            }
        }
    }
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

impl ToSqlValue for i64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(self)
    }
}

impl ToSqlValue for i32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for i16 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for i8 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for u32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for u16 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for u8 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(f64::from(self))
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

/// Reason a [`SqlValue`] could not be converted into a field type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionError {
    /// The Rust type that was requested.
    pub expected: &'static str,
    /// Description of the value that was found.
    pub found: String,
}

impl ConversionError {
    pub(crate) fn new(expected: &'static str, value: &SqlValue) -> Self {
        Self {
            expected,
            found: format!("{} `{value}`", value.kind_name()),
        }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot convert {} into {}", self.found, self.expected)
    }
}

impl std::error::Error for ConversionError {}

/// Trait for field types that can be assigned from a cursor cell.
///
/// The conversion is driven by the field's declared type. Whatever storage
/// class the back end reports for the cell is only an input to it.
pub trait FromSqlValue: Sized {
    /// Converts a cell into `Self`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionError`] when the value has no faithful
    /// representation in `Self` (NULL into a non-`Option` field, out of
    /// range integers, unparsable text).
    fn from_sql_value(value: SqlValue) -> Result<Self, ConversionError>;
}

impl FromSqlValue for SqlValue {
    fn from_sql_value(value: SqlValue) -> Result<Self, ConversionError> {
        Ok(value)
    }
}

impl FromSqlValue for i64 {
    fn from_sql_value(value: SqlValue) -> Result<Self, ConversionError> {
        match value {
            SqlValue::Int(n) => Ok(n),
            SqlValue::Bool(b) => Ok(Self::from(b)),
            SqlValue::Text(ref s) => s
                .trim()
                .parse()
                .map_err(|_| ConversionError::new("i64", &value)),
            other => Err(ConversionError::new("i64", &other)),
        }
    }
}

macro_rules! impl_from_sql_value_narrow_int {
    ($($ty:ty),+) => {
        $(
            impl FromSqlValue for $ty {
                fn from_sql_value(value: SqlValue) -> Result<Self, ConversionError> {
                    let wide = i64::from_sql_value(value.clone())
                        .map_err(|_| ConversionError::new(stringify!($ty), &value))?;
                    <$ty>::try_from(wide).map_err(|_| ConversionError::new(stringify!($ty), &value))
                }
            }
        )+
    };
}

impl_from_sql_value_narrow_int!(i32, i16, i8, u32, u16, u8);

impl FromSqlValue for f64 {
    #[allow(clippy::cast_precision_loss)]
    fn from_sql_value(value: SqlValue) -> Result<Self, ConversionError> {
        let wide = match value {
            SqlValue::Float(f) => f,
            SqlValue::Int(n) => n as Self,
            SqlValue::Text(ref s) => s
                .trim()
                .parse()
                .map_err(|_| ConversionError::new("f64", &value))?,
            ref other => return Err(ConversionError::new("f64", other)),
        };
        if wide.is_finite() {
            Ok(wide)
        } else {
            Err(ConversionError::new("f64", &value))
        }
    }
}

impl FromSqlValue for f32 {
    #[allow(clippy::cast_possible_truncation)]
    fn from_sql_value(value: SqlValue) -> Result<Self, ConversionError> {
        let wide = f64::from_sql_value(value.clone())
            .map_err(|_| ConversionError::new("f32", &value))?;
        let narrow = wide as Self;
        if narrow.is_finite() {
            Ok(narrow)
        } else {
            Err(ConversionError::new("f32", &value))
        }
    }
}

impl FromSqlValue for bool {
    fn from_sql_value(value: SqlValue) -> Result<Self, ConversionError> {
        match value {
            SqlValue::Bool(b) => Ok(b),
            SqlValue::Int(0) => Ok(false),
            SqlValue::Int(1) => Ok(true),
            SqlValue::Text(ref s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(ConversionError::new("bool", &value)),
            },
            other => Err(ConversionError::new("bool", &other)),
        }
    }
}

impl FromSqlValue for String {
    fn from_sql_value(value: SqlValue) -> Result<Self, ConversionError> {
        match value {
            SqlValue::Text(s) => Ok(s),
            SqlValue::Null | SqlValue::Blob(_) => Err(ConversionError::new("String", &value)),
            other => Ok(other.to_string()),
        }
    }
}

impl FromSqlValue for Vec<u8> {
    fn from_sql_value(value: SqlValue) -> Result<Self, ConversionError> {
        match value {
            SqlValue::Blob(b) => Ok(b),
            SqlValue::Text(s) => Ok(s.into_bytes()),
            other => Err(ConversionError::new("Vec<u8>", &other)),
        }
    }
}

impl<T: FromSqlValue> FromSqlValue for Option<T> {
    fn from_sql_value(value: SqlValue) -> Result<Self, ConversionError> {
        match value {
            SqlValue::Null => Ok(None),
            other => T::from_sql_value(other).map(Some),
        }
    }
}

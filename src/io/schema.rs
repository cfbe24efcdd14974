//! Static record schemas.
//!
//! A [`Schema`] is an ordered list of [`FieldSpec`]s describing how each field
//! of a record is laid out in a line: its name, its fixed-width column width,
//! its value type, and which side it is padded on. Record types expose their
//! schema through the [`Record`] trait and convert to and from an ordered list
//! of [`Value`]s, which is all the generic formatters and the validator need.

use crate::Error;
use chrono::NaiveDate;
use std::borrow::Cow;

/// Value type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text.
    Text,
    /// Boolean flag.
    Bool,
    /// Calendar date in the given `chrono` format.
    Date {
        /// `chrono` format string, e.g. `%Y-%m-%d`.
        format: &'static str,
    },
}

/// Padding side for fixed-width columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    /// Value first, padded on the right.
    Left,
    /// Padding first, value on the right.
    Right,
}

/// How boolean values are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolStyle {
    /// `TRUE` / `FALSE`.
    Upper,
    /// `true` / `false`.
    Lower,
}

/// Layout description of a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name, used in error messages and validation rules.
    pub name: &'static str,
    /// Column width in bytes for fixed-width layouts.
    pub width: usize,
    /// Value type.
    pub kind: FieldKind,
    /// Padding side for fixed-width layouts.
    pub align: Align,
}

impl FieldSpec {
    /// A left-aligned text field.
    #[must_use]
    pub const fn text(name: &'static str, width: usize) -> Self {
        Self {
            name,
            width,
            kind: FieldKind::Text,
            align: Align::Left,
        }
    }

    /// A left-aligned boolean field.
    #[must_use]
    pub const fn boolean(name: &'static str, width: usize) -> Self {
        Self {
            name,
            width,
            kind: FieldKind::Bool,
            align: Align::Left,
        }
    }

    /// A left-aligned date field.
    #[must_use]
    pub const fn date(name: &'static str, width: usize, format: &'static str) -> Self {
        Self {
            name,
            width,
            kind: FieldKind::Date { format },
            align: Align::Left,
        }
    }

    /// Pads this field on the left instead of the right.
    #[must_use]
    pub const fn right_aligned(mut self) -> Self {
        self.align = Align::Right;
        self
    }

    /// Converts trimmed field text into a typed value.
    ///
    /// Empty text is accepted for every kind: it yields an empty string,
    /// `false`, or no date.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the text is not a valid
    /// boolean or date.
    pub fn parse_value(&self, raw: &str) -> Result<Value, String> {
        match self.kind {
            FieldKind::Text => Ok(Value::Text(raw.to_string())),
            FieldKind::Bool => parse_bool(raw)
                .map(Value::Bool)
                .ok_or_else(|| format!("'{raw}' is not a boolean")),
            FieldKind::Date { format } => {
                if raw.is_empty() {
                    return Ok(Value::Date(None));
                }
                NaiveDate::parse_from_str(raw, format)
                    .map(|d| Value::Date(Some(d)))
                    .map_err(|e| format!("'{raw}' is not a date in format {format}: {e}"))
            },
        }
    }

    /// Renders a value as unpadded field text.
    #[must_use]
    pub fn render_value(&self, value: &Value, style: BoolStyle) -> String {
        match (value, self.kind) {
            (Value::Bool(b), _) => match (style, b) {
                (BoolStyle::Upper, true) => "TRUE".to_string(),
                (BoolStyle::Upper, false) => "FALSE".to_string(),
                (BoolStyle::Lower, true) => "true".to_string(),
                (BoolStyle::Lower, false) => "false".to_string(),
            },
            (Value::Date(Some(d)), FieldKind::Date { format }) => d.format(format).to_string(),
            (other, _) => other.as_text().into_owned(),
        }
    }

    /// Renders a value that will read back unchanged.
    ///
    /// Every layout trims field text on parse and splits input on line
    /// breaks, so such values cannot be written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the rendered text has leading or
    /// trailing whitespace or contains a line break.
    pub fn render_exact(&self, value: &Value, style: BoolStyle) -> crate::Result<String> {
        let rendered = self.render_value(value, style);
        if rendered.trim() != rendered {
            return Err(Error::InvalidInput(format!(
                "Field '{}' value {rendered:?} has leading or trailing whitespace",
                self.name
            )));
        }
        if rendered.contains(['\n', '\r']) {
            return Err(Error::InvalidInput(format!(
                "Field '{}' value {rendered:?} contains a line break",
                self.name
            )));
        }
        Ok(rendered)
    }
}

/// Parses a boolean in any of the common spellings.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Some(true),
        "false" | "f" | "0" | "no" | "n" | "" => Some(false),
        _ => None,
    }
}

/// Ordered field layout of a record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    fields: &'static [FieldSpec],
}

impl Schema {
    /// Creates a schema from a static field list.
    #[must_use]
    pub const fn new(fields: &'static [FieldSpec]) -> Self {
        Self { fields }
    }

    /// Returns the fields in declaration order.
    #[must_use]
    pub const fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    /// Returns the number of fields.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns whether the schema has no fields.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total width in bytes of a fixed-width line.
    #[must_use]
    pub fn record_width(&self) -> usize {
        self.fields.iter().map(|f| f.width).sum()
    }

    /// Returns the index of the named field.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// A typed field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Text value.
    Text(String),
    /// Boolean value.
    Bool(bool),
    /// Optional date value.
    Date(Option<NaiveDate>),
}

impl Value {
    /// Returns the value as text, formatting dates as ISO-8601.
    #[must_use]
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(s) => Cow::Borrowed(s.as_str()),
            Self::Bool(true) => Cow::Borrowed("true"),
            Self::Bool(false) => Cow::Borrowed("false"),
            Self::Date(Some(d)) => Cow::Owned(d.to_string()),
            Self::Date(None) => Cow::Borrowed(""),
        }
    }

    /// Returns whether the value is absent or empty text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::Bool(_) => false,
            Self::Date(d) => d.is_none(),
        }
    }
}

/// A record type with a static line layout.
///
/// `to_values` and `from_values` must agree with [`Record::schema`]: one
/// value per field, in field order, of the field's kind.
pub trait Record: Sized {
    /// Returns the record's field layout.
    fn schema() -> &'static Schema;

    /// Builds a record from values in schema order.
    ///
    /// # Errors
    ///
    /// Returns a description of the mismatch if the values do not fit the
    /// schema.
    fn from_values(values: Vec<Value>) -> Result<Self, String>;

    /// Returns the record's values in schema order.
    fn to_values(&self) -> Vec<Value>;
}

//! User record.

use crate::io::schema::{FieldSpec, Record, Schema, Value};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format used for `date_of_birth` in every layout.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Field layout of a user line.
///
/// Fixed-width widths add up to 87 bytes:
///
/// | Field | Width | Alignment |
/// |-------|-------|-----------|
/// | `id` | 12 | left |
/// | `username` | 22 | left |
/// | `email` | 26 | left |
/// | `phone` | 12 | left |
/// | `active` | 5 | right |
/// | `date_of_birth` | 10 | left |
const USER_FIELDS: [FieldSpec; 6] = [
    FieldSpec::text("id", 12),
    FieldSpec::text("username", 22),
    FieldSpec::text("email", 26),
    FieldSpec::text("phone", 12),
    FieldSpec::boolean("active", 5).right_aligned(),
    FieldSpec::date("date_of_birth", 10, DATE_FORMAT),
];

static USER_SCHEMA: Schema = Schema::new(&USER_FIELDS);

/// A user record as stored in the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Primary key.
    pub id: String,
    /// Login name.
    pub username: String,
    /// Contact email (may be empty).
    pub email: String,
    /// Contact phone number.
    pub phone: String,
    /// Whether the account is active.
    pub active: bool,
    /// Date of birth.
    pub date_of_birth: Option<NaiveDate>,
}

impl User {
    /// Creates a user with the given id and username and no other details.
    #[must_use]
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            email: String::new(),
            phone: String::new(),
            active: false,
            date_of_birth: None,
        }
    }

    /// Sets the email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Sets the phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    /// Sets the active flag.
    #[must_use]
    pub const fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Sets the date of birth.
    #[must_use]
    pub const fn with_date_of_birth(mut self, date: NaiveDate) -> Self {
        self.date_of_birth = Some(date);
        self
    }
}

impl Record for User {
    fn schema() -> &'static Schema {
        &USER_SCHEMA
    }

    fn from_values(values: Vec<Value>) -> Result<Self, String> {
        let count = values.len();
        let mut values = values.into_iter();
        let (
            Some(Value::Text(id)),
            Some(Value::Text(username)),
            Some(Value::Text(email)),
            Some(Value::Text(phone)),
            Some(Value::Bool(active)),
            Some(Value::Date(date_of_birth)),
            None,
        ) = (
            values.next(),
            values.next(),
            values.next(),
            values.next(),
            values.next(),
            values.next(),
            values.next(),
        )
        else {
            return Err(format!(
                "expected {} user values in schema order, got {count}",
                USER_SCHEMA.len()
            ));
        };

        Ok(Self {
            id,
            username,
            email,
            phone,
            active,
            date_of_birth,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.id.clone()),
            Value::Text(self.username.clone()),
            Value::Text(self.email.clone()),
            Value::Text(self.phone.clone()),
            Value::Bool(self.active),
            Value::Date(self.date_of_birth),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_schema_width() {
        assert_eq!(User::schema().len(), 6);
        assert_eq!(User::schema().record_width(), 87);
        assert_eq!(User::schema().position("date_of_birth"), Some(5));
    }

    #[test]
    fn test_values_round_trip() {
        let user = User::new("10", "abraham59E")
            .with_email("rory30@example.com")
            .with_phone("975-283-2267")
            .with_active(true)
            .with_date_of_birth(NaiveDate::from_ymd_opt(2019, 2, 20).unwrap());

        let rebuilt = User::from_values(user.to_values()).unwrap();
        assert_eq!(rebuilt, user);
    }

    #[test]
    fn test_from_values_rejects_wrong_shape() {
        let too_short = vec![Value::Text("1".into())];
        assert!(User::from_values(too_short).is_err());

        let mut wrong_kind = User::new("1", "a").to_values();
        wrong_kind[4] = Value::Text("yes".into());
        assert!(User::from_values(wrong_kind).is_err());

        let mut too_long = User::new("1", "a").to_values();
        too_long.push(Value::Bool(true));
        let err = User::from_values(too_long).unwrap_err();
        assert!(err.contains("got 7"));
    }
}

//! Record validation.
//!
//! Validates typed records against per-field rules before they are written.
//! Validation is pure: no I/O, no side effects, and the same record always
//! yields the same result.

use crate::io::schema::{Record, Value};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .unwrap_or_else(|_| unreachable!("email pattern is a valid regex"))
});

static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+?[0-9][0-9().\- ]{5,16}[0-9]$")
        .unwrap_or_else(|_| unreachable!("phone pattern is a valid regex"))
});

static USERNAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._\-]*$")
        .unwrap_or_else(|_| unreachable!("username pattern is a valid regex"))
});

/// A single field constraint.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Value must be present and not blank.
    Required,
    /// Value must be at most this many characters.
    MaxLength(usize),
    /// Value must look like an email address.
    Email,
    /// Value must look like a phone number.
    Phone,
    /// Value must be a login name (alphanumerics, `.`, `_`, `-`).
    Username,
    /// Value must match the given regex.
    Pattern(Regex),
}

impl Rule {
    /// Returns the rule's short name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::MaxLength(_) => "max",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Username => "username",
            Self::Pattern(_) => "pattern",
        }
    }

    /// Checks a value, returning a message if it violates the rule.
    ///
    /// Every rule except [`Rule::Required`] accepts an empty value.
    fn check(&self, value: &Value) -> Option<String> {
        if let Self::Required = self {
            return value.is_empty().then(|| "is required".to_string());
        }
        if value.is_empty() {
            return None;
        }

        let text = value.as_text();
        match self {
            Self::Required => None,
            Self::MaxLength(max) => {
                let len = text.chars().count();
                (len > *max).then(|| format!("must be at most {max} characters (got {len})"))
            },
            Self::Email => (!EMAIL_PATTERN.is_match(&text))
                .then(|| format!("'{text}' is not a valid email address")),
            Self::Phone => (!PHONE_PATTERN.is_match(&text))
                .then(|| format!("'{text}' is not a valid phone number")),
            Self::Username => (!USERNAME_PATTERN.is_match(&text))
                .then(|| format!("'{text}' is not a valid username")),
            Self::Pattern(re) => {
                (!re.is_match(&text)).then(|| format!("'{text}' does not match {}", re.as_str()))
            },
        }
    }
}

/// A rule a field failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Field that failed.
    pub field: String,
    /// Short name of the rule (see [`Rule::name`]).
    pub rule: String,
    /// Description of the failure.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.field, self.rule, self.message)
    }
}

/// Result of validating a record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    /// Violations found; empty means valid.
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    /// Returns whether the record passed every rule.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns the violations for one field.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Violation> + 'a {
        self.violations.iter().filter(move |v| v.field == field)
    }
}

/// Checks records against field constraints.
pub trait Validator<R> {
    /// Validates a record.
    fn validate(&self, record: &R) -> ValidationResult;
}

/// Rule-based validator usable with any [`Record`].
///
/// Rules are keyed by schema field name and evaluated in the order they were
/// added. A rule naming a field the record's schema does not have is itself
/// reported as a violation.
#[derive(Debug, Clone, Default)]
pub struct RecordValidator {
    rules: Vec<(String, Rule)>,
}

impl RecordValidator {
    /// Creates a validator with no rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule for a field.
    #[must_use]
    pub fn rule(mut self, field: impl Into<String>, rule: Rule) -> Self {
        self.rules.push((field.into(), rule));
        self
    }

    /// Returns the default rules for [`crate::models::User`].
    ///
    /// | Field | Rules |
    /// |-------|-------|
    /// | `id` | required, max 40 |
    /// | `username` | required, username, max 100 |
    /// | `email` | email, max 100 |
    /// | `phone` | required, phone, max 18 |
    /// | `date_of_birth` | required |
    #[must_use]
    pub fn for_users() -> Self {
        Self::new()
            .rule("id", Rule::Required)
            .rule("id", Rule::MaxLength(40))
            .rule("username", Rule::Required)
            .rule("username", Rule::Username)
            .rule("username", Rule::MaxLength(100))
            .rule("email", Rule::Email)
            .rule("email", Rule::MaxLength(100))
            .rule("phone", Rule::Required)
            .rule("phone", Rule::Phone)
            .rule("phone", Rule::MaxLength(18))
            .rule("date_of_birth", Rule::Required)
    }

    /// Returns the number of configured rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns whether no rules are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<R: Record> Validator<R> for RecordValidator {
    fn validate(&self, record: &R) -> ValidationResult {
        let schema = R::schema();
        let values = record.to_values();
        let mut violations = Vec::new();

        for (field, rule) in &self.rules {
            let Some(value) = schema.position(field).and_then(|i| values.get(i)) else {
                violations.push(Violation {
                    field: field.clone(),
                    rule: rule.name().to_string(),
                    message: "field is not part of the record schema".to_string(),
                });
                continue;
            };
            if let Some(message) = rule.check(value) {
                violations.push(Violation {
                    field: field.clone(),
                    rule: rule.name().to_string(),
                    message,
                });
            }
        }

        ValidationResult { violations }
    }
}

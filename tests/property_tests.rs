//! Property-based tests for line formats and import counts.
//!
//! Uses proptest to verify invariants across random inputs:
//! - Formatting then parsing a user yields the same user, for both layouts
//! - Values that parsing would alter are refused by formatting
//! - A well-formed file imports every line
//! - With `k` malformed lines out of `n`, exactly `n - k` records are imported

// Property tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use chrono::NaiveDate;
use proptest::prelude::*;
use std::io::Cursor;
use user_import::io::services::ErrorHandler;
use user_import::io::validation::RecordValidator;
use user_import::io::{FileLineReader, Layout, MemorySink, create_formatter};
use user_import::models::{RawLine, User};
use user_import::{ImportContext, Importer};

const MALFORMED: &str = "not,a,record";

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (1900i32..2100, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

/// Users whose values fit every fixed-width column.
fn user_strategy() -> impl Strategy<Value = User> {
    (
        "[0-9]{1,12}",
        "[a-z][a-z0-9._]{0,21}",
        prop::option::of("[a-z]{1,8}@example\\.com"),
        "[0-9]{3}-[0-9]{3}-[0-9]{4}",
        any::<bool>(),
        prop::option::of(date_strategy()),
    )
        .prop_map(|(id, username, email, phone, active, dob)| {
            let mut user = User::new(id, username)
                .with_phone(phone)
                .with_active(active);
            if let Some(email) = email {
                user = user.with_email(email);
            }
            if let Some(dob) = dob {
                user = user.with_date_of_birth(dob);
            }
            user
        })
}

/// Users whose id and username may carry leading or trailing whitespace.
fn padded_user_strategy() -> impl Strategy<Value = User> {
    (
        "[ \t]{0,2}[0-9]{1,8}[ \t]{0,2}",
        "[ ]{0,1}[a-z][a-z0-9]{0,10}[ ]{0,1}",
        "[0-9]{3}-[0-9]{3}-[0-9]{4}",
    )
        .prop_map(|(id, username, phone)| User::new(id, username).with_phone(phone))
}

fn has_edge_whitespace(user: &User) -> bool {
    [&user.id, &user.username]
        .iter()
        .any(|value| value.trim() != value.as_str())
}

/// Users that also pass the default validation rules.
fn valid_user_strategy() -> impl Strategy<Value = User> {
    (user_strategy(), date_strategy()).prop_map(|(user, dob)| user.with_date_of_birth(dob))
}

fn layout_strategy() -> impl Strategy<Value = Layout> {
    prop::sample::select(vec![
        Layout::delimiter(),
        Layout::Delimiter { delimiter: b';' },
        Layout::Delimiter { delimiter: b'\t' },
        Layout::FixedWidth,
    ])
}

fn import_lines(layout: Layout, lines: &[String]) -> (usize, usize, Vec<User>) {
    let mut input = lines.join("\n");
    input.push('\n');
    let mut source = FileLineReader::new(Cursor::new(input));
    let mut importer = Importer::new(
        create_formatter::<User>(layout),
        RecordValidator::for_users(),
        MemorySink::new(),
        ErrorHandler::default(),
    );
    let summary = importer.import(&ImportContext::new(), &mut source).unwrap();
    (
        summary.total_lines,
        summary.imported,
        importer.into_sink().into_records(),
    )
}

proptest! {
    /// Property: parse(format(user)) == user for every layout.
    #[test]
    fn prop_format_parse_round_trip(user in user_strategy(), layout in layout_strategy()) {
        let formatter = create_formatter::<User>(layout);
        let line = formatter.format(&user).unwrap();
        let parsed = formatter.parse(&RawLine::new(1, line)).unwrap();
        prop_assert_eq!(parsed, user);
    }

    /// Property: a value is either written so it reads back unchanged, or
    /// refused when written.
    #[test]
    fn prop_format_never_alters_values(user in padded_user_strategy(), layout in layout_strategy()) {
        let formatter = create_formatter::<User>(layout);
        match formatter.format(&user) {
            Ok(line) => {
                prop_assert!(!has_edge_whitespace(&user));
                let parsed = formatter.parse(&RawLine::new(1, line)).unwrap();
                prop_assert_eq!(parsed, user);
            },
            Err(_) => prop_assert!(has_edge_whitespace(&user)),
        }
    }

    /// Property: fixed-width lines always span the full record width.
    #[test]
    fn prop_fixed_width_lines_have_constant_width(user in user_strategy()) {
        let line = create_formatter::<User>(Layout::FixedWidth).format(&user).unwrap();
        prop_assert_eq!(line.len(), 87);
    }

    /// Property: a well-formed file imports every line, in order.
    #[test]
    fn prop_well_formed_file_fully_imported(
        users in prop::collection::vec(valid_user_strategy(), 0..40),
        layout in layout_strategy(),
    ) {
        let formatter = create_formatter::<User>(layout);
        let lines: Vec<String> = users.iter().map(|u| formatter.format(u).unwrap()).collect();

        let (total, imported, records) = import_lines(layout, &lines);
        prop_assert_eq!(total, users.len());
        prop_assert_eq!(imported, total);
        prop_assert_eq!(records, users);
    }

    /// Property: k malformed lines out of n leave n - k imported.
    #[test]
    fn prop_malformed_lines_are_skipped(
        lines in prop::collection::vec(
            prop_oneof![
                valid_user_strategy().prop_map(Some),
                Just(None),
            ],
            1..40,
        ),
    ) {
        let formatter = create_formatter::<User>(Layout::delimiter());
        let malformed = lines.iter().filter(|l| l.is_none()).count();
        let text: Vec<String> = lines
            .iter()
            .map(|l| l.as_ref().map_or_else(|| MALFORMED.to_string(), |u| formatter.format(u).unwrap()))
            .collect();

        let (total, imported, _) = import_lines(Layout::delimiter(), &text);
        prop_assert_eq!(total, lines.len());
        prop_assert_eq!(imported, lines.len() - malformed);
    }
}

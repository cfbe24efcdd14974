//! Single-line parse command handler.
//!
//! Runs one line through the formatter and validator and prints the outcome
//! as JSON, without touching the store.

use serde_json::{Value, json};
use user_import::io::create_formatter;
use user_import::io::validation::{RecordValidator, Validator};
use user_import::models::{RawLine, User};
use user_import::{Error, ImportConfig, Result};

/// Executes the parse command.
///
/// Fails (after printing) if the line does not produce a valid record.
pub fn cmd_parse(config: &ImportConfig, line: &str) -> Result<()> {
    let (report, valid) = check_line(config, line);

    let rendered = serde_json::to_string_pretty(&report).map_err(|e| Error::OperationFailed {
        operation: "render_parse_result".to_string(),
        cause: e.to_string(),
    })?;
    println!("{rendered}");

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidInput("line is not a valid record".to_string()))
    }
}

fn check_line(config: &ImportConfig, line: &str) -> (Value, bool) {
    let formatter = create_formatter::<User>(config.layout);
    let raw = RawLine::new(1, line);

    match formatter.parse(&raw) {
        Err(error) => (
            json!({
                "layout": config.layout.to_string(),
                "valid": false,
                "record": null,
                "errors": [{
                    "field": error.field,
                    "message": error.message,
                }],
            }),
            false,
        ),
        Ok(user) => {
            let result = RecordValidator::for_users().validate(&user);
            let errors: Vec<Value> = result
                .violations
                .iter()
                .map(|v| json!({ "field": v.field, "rule": v.rule, "message": v.message }))
                .collect();
            let valid = result.is_valid();
            (
                json!({
                    "layout": config.layout.to_string(),
                    "valid": valid,
                    "record": user,
                    "errors": errors,
                }),
                valid,
            )
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use user_import::io::Layout;

    #[test]
    fn test_check_valid_delimited_line() {
        let config = ImportConfig::new();
        let (report, valid) = check_line(
            &config,
            "10,abraham59E,rory30@example.com,975-283-2267,TRUE,2019-02-20",
        );
        assert!(valid);
        assert_eq!(report["record"]["username"], "abraham59E");
        assert_eq!(report["record"]["date_of_birth"], "2019-02-20");
    }

    #[test]
    fn test_check_unparseable_line() {
        let config = ImportConfig::new();
        let (report, valid) = check_line(&config, "10,only-two");
        assert!(!valid);
        assert!(report["record"].is_null());
        assert_eq!(report["errors"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_check_invalid_fixed_width_record() {
        let config = ImportConfig::new().with_layout(Layout::FixedWidth);
        let line = format!("{:<12}{:<22}", "", "abraham59");
        let (report, valid) = check_line(&config, &line);
        assert!(!valid);
        assert!(!report["record"].is_null());
        assert!(
            report["errors"]
                .as_array()
                .unwrap()
                .iter()
                .any(|e| e["field"] == "id")
        );
    }
}

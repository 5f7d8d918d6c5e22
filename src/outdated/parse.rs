//! Parsers for the outdated report formats
//!
//! Supported shapes:
//! - npm / pnpm / yarn berry: a JSON object keyed by package name
//! - yarn classic: newline-delimited JSON records with a `table` record
//! - bun: plain text lines of the form `name current → latest`

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

static BUN_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+)\s+(\S+)\s+→\s+(\S+)").unwrap());

/// One row of an outdated report before classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub name: String,
    pub current: String,
    pub wanted: String,
    pub latest: String,
}

impl ReportRow {
    fn new(name: &str, current: &str, wanted: &str, latest: &str) -> Self {
        Self {
            name: name.to_string(),
            current: current.to_string(),
            wanted: wanted.to_string(),
            latest: latest.to_string(),
        }
    }

    /// Build a row from possibly missing fields.
    ///
    /// Packages that are not installed have no `current`; it stays empty so
    /// the row classifies as a major update. A missing `wanted` stays empty
    /// too. Rows with neither `wanted` nor `latest` are dropped.
    fn from_parts(
        name: &str,
        current: Option<&str>,
        wanted: Option<&str>,
        latest: Option<&str>,
    ) -> Option<Self> {
        fn present<'a>(value: Option<&'a str>) -> Option<&'a str> {
            value.filter(|v| !v.trim().is_empty())
        }
        let (current, wanted, latest) = (present(current), present(wanted), present(latest));
        let latest = latest.or(wanted)?;
        Some(Self::new(
            name,
            current.unwrap_or_default(),
            wanted.unwrap_or_default(),
            latest,
        ))
    }
}

/// Parse a JSON outdated report.
///
/// Blank output is an empty report. Returns the parse error message when the
/// output is neither a JSON object nor yarn classic records.
pub fn parse_json_report(output: &str) -> Result<Vec<ReportRow>, String> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(object)) if is_yarn_record(&object) => Ok(yarn_table_rows(&object)),
        Ok(Value::Object(object)) => Ok(object_rows(&object)),
        Ok(other) => Err(format!("expected a JSON object, found {}", kind_of(&other))),
        Err(whole) => parse_ndjson(trimmed).ok_or_else(|| whole.to_string()),
    }
}

/// Parse bun's text report; lines that do not match are ignored
pub fn parse_text_report(output: &str) -> Vec<ReportRow> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| BUN_LINE_RE.captures(line))
        .map(|caps| ReportRow::new(&caps[1], &caps[2], &caps[3], &caps[3]))
        .collect()
}

fn object_rows(object: &Map<String, Value>) -> Vec<ReportRow> {
    object
        .iter()
        .filter_map(|(name, value)| {
            // npm reports one object per install location for duplicated packages
            let info = match value {
                Value::Array(items) => items.first()?,
                other => other,
            };
            let field = |key: &str| info.get(key).and_then(Value::as_str);
            let row = ReportRow::from_parts(
                name,
                field("current"),
                field("wanted"),
                field("latest"),
            );
            if row.is_none() {
                tracing::debug!(package = %name, "skipping outdated entry without versions");
            }
            row
        })
        .collect()
}

fn is_yarn_record(object: &Map<String, Value>) -> bool {
    object.get("type").is_some_and(Value::is_string) && object.contains_key("data")
}

fn parse_ndjson(output: &str) -> Option<Vec<ReportRow>> {
    let mut rows = Vec::new();
    for line in output.lines().filter(|line| !line.trim().is_empty()) {
        let record: Map<String, Value> = serde_json::from_str(line).ok()?;
        if !is_yarn_record(&record) {
            return None;
        }
        rows.extend(yarn_table_rows(&record));
    }
    Some(rows)
}

fn yarn_table_rows(record: &Map<String, Value>) -> Vec<ReportRow> {
    if record.get("type").and_then(Value::as_str) != Some("table") {
        return Vec::new();
    }
    let Some(data) = record.get("data") else {
        return Vec::new();
    };

    let head: Vec<String> = data
        .get("head")
        .and_then(Value::as_array)
        .map(|head| {
            head.iter()
                .map(|h| h.as_str().unwrap_or_default().to_ascii_lowercase())
                .collect()
        })
        .unwrap_or_default();
    let column =
        |label: &str, fallback: usize| head.iter().position(|h| h == label).unwrap_or(fallback);
    let (name_col, current_col, wanted_col, latest_col) = (
        column("package", 0),
        column("current", 1),
        column("wanted", 2),
        column("latest", 3),
    );

    data.get("body")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|row| {
            let cells = row.as_array()?;
            let cell = |index: usize| cells.get(index).and_then(Value::as_str);
            ReportRow::from_parts(
                cell(name_col)?,
                cell(current_col),
                cell(wanted_col),
                cell(latest_col),
            )
        })
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_npm_report() {
        let output = r#"{
            "react": {"current": "17.0.2", "wanted": "17.0.2", "latest": "18.2.0", "location": "node_modules/react"},
            "lodash": {"current": "4.17.20", "wanted": "4.17.21", "latest": "4.17.21"}
        }"#;
        let rows = parse_json_report(output).unwrap();
        assert_eq!(
            rows,
            vec![
                ReportRow::new("react", "17.0.2", "17.0.2", "18.2.0"),
                ReportRow::new("lodash", "4.17.20", "4.17.21", "4.17.21"),
            ]
        );
    }

    #[test]
    fn test_missing_current_stays_empty() {
        let output = r#"{"chalk": {"wanted": "5.3.0", "latest": "5.3.1"}}"#;
        let rows = parse_json_report(output).unwrap();
        assert_eq!(rows, vec![ReportRow::new("chalk", "", "5.3.0", "5.3.1")]);
    }

    #[test]
    fn test_missing_wanted_stays_empty() {
        let output = r#"{"chalk": {"current": "4.1.2", "latest": "5.3.0"}}"#;
        let rows = parse_json_report(output).unwrap();
        assert_eq!(rows, vec![ReportRow::new("chalk", "4.1.2", "", "5.3.0")]);
    }

    #[test]
    fn test_entries_without_target_versions_are_skipped() {
        let output = r#"{
            "ghost": {"current": "1.0.0"},
            "empty": {},
            "listed": {"latest": "2.0.0"},
            "ok": {"current": "1.0.0", "wanted": "1.0.1", "latest": "1.0.1"}
        }"#;
        let rows = parse_json_report(output).unwrap();
        assert_eq!(
            rows,
            vec![
                ReportRow::new("listed", "", "", "2.0.0"),
                ReportRow::new("ok", "1.0.0", "1.0.1", "1.0.1"),
            ]
        );
    }

    #[test]
    fn test_npm_duplicate_locations_take_first() {
        let output = r#"{"debug": [
            {"current": "2.6.9", "wanted": "2.6.9", "latest": "4.3.4"},
            {"current": "4.3.1", "wanted": "4.3.4", "latest": "4.3.4"}
        ]}"#;
        let rows = parse_json_report(output).unwrap();
        assert_eq!(rows, vec![ReportRow::new("debug", "2.6.9", "2.6.9", "4.3.4")]);
    }

    #[test]
    fn test_blank_output_is_empty() {
        assert!(parse_json_report("").unwrap().is_empty());
        assert!(parse_json_report("  \n").unwrap().is_empty());
        assert!(parse_json_report("{}").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_output_is_error() {
        assert!(parse_json_report("npm ERR! code ENOTFOUND").is_err());
        assert!(parse_json_report("[1, 2]").is_err());
    }

    #[test]
    fn test_parse_yarn_classic_table() {
        let output = concat!(
            r#"{"type":"info","data":"Color legend"}"#,
            "\n",
            r#"{"type":"table","data":{"head":["Package","Current","Wanted","Latest","Package Type","URL"],"body":[["react","17.0.2","17.0.2","18.2.0","dependencies","https://reactjs.org"],["@babel/core","7.20.0","7.23.0","7.23.0","devDependencies","https://babel.dev"]]}}"#,
            "\n"
        );
        let rows = parse_json_report(output).unwrap();
        assert_eq!(
            rows,
            vec![
                ReportRow::new("react", "17.0.2", "17.0.2", "18.2.0"),
                ReportRow::new("@babel/core", "7.20.0", "7.23.0", "7.23.0"),
            ]
        );
    }

    #[test]
    fn test_parse_single_yarn_table_record() {
        let output = r#"{"type":"table","data":{"head":["Package","Current","Wanted","Latest"],"body":[["chalk","4.1.2","4.1.2","5.3.0"]]}}"#;
        let rows = parse_json_report(output).unwrap();
        assert_eq!(rows, vec![ReportRow::new("chalk", "4.1.2", "4.1.2", "5.3.0")]);
    }

    #[test]
    fn test_parse_text_report() {
        let output = "\
bun outdated v1.0.0
react 17.0.2 → 18.2.0
@types/node 20.1.0 → 20.10.0
not a matching line
";
        let rows = parse_text_report(output);
        assert_eq!(
            rows,
            vec![
                ReportRow::new("react", "17.0.2", "18.2.0", "18.2.0"),
                ReportRow::new("@types/node", "20.1.0", "20.10.0", "20.10.0"),
            ]
        );
    }

    #[test]
    fn test_parse_text_report_empty() {
        assert!(parse_text_report("").is_empty());
    }
}

//! Delimited table parsing.
//!
//! Tables are plain comma-separated text with a header line. There is no
//! quoting or escaping, and rows are never validated against the header:
//! short rows read as empty text for their missing columns.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Field separator for every table.
pub const DELIMITER: char = ',';

/// A single cell, coerced at parse time.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The raw text parsed as a number.
    Number(f64),
    /// Anything else, trimmed.
    Text(String),
}

impl Value {
    /// Coerce a raw field. The longest leading float wins, so `3.5%` reads
    /// as `3.5`; fields without one (including `NaN` and empty) stay text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match float_prefix(trimmed).and_then(|p| p.parse::<f64>().ok()) {
            Some(n) => Value::Number(n),
            None => Value::Text(trimmed.to_string()),
        }
    }

    /// The numeric value, if this cell is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(_) => None,
        }
    }

    /// Numeric value for arithmetic; text counts as zero.
    pub fn number_or_zero(&self) -> f64 {
        self.as_number().unwrap_or(0.0)
    }

    /// Truthiness: non-zero numbers and non-empty text.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0,
            Value::Text(s) => !s.is_empty(),
        }
    }

    /// Text rendering. Numbers are formatted without a trailing `.0`.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Value::Number(n) => Cow::Owned(n.to_string()),
            Value::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

/// Longest prefix of `s` that forms a decimal float: optional sign, digits
/// with an optional fraction, optional exponent. `Infinity` is the only word
/// accepted.
fn float_prefix(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        return Some(&s[..end + "Infinity".len()]);
    }

    let digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let int_digits = digits(end);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits(end + 1);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digits(exp);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }

    Some(&s[..end])
}

/// One data line, aligned to the header it was parsed under.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Build a row; `values` is padded with empty text to the header width.
    pub fn new(columns: Arc<[String]>, mut values: Vec<Value>) -> Self {
        values.resize(columns.len(), Value::Text(String::new()));
        Self { columns, values }
    }

    #[cfg(test)]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Look up a cell by column name. A repeated column name resolves to
    /// its last occurrence.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .rposition(|c| c == column)
            .and_then(|i| self.values.get(i))
    }

    /// Numeric cell, zero when missing or not a number.
    pub fn number(&self, column: &str) -> f64 {
        self.get(column).map(Value::number_or_zero).unwrap_or(0.0)
    }

    /// Text cell, empty when missing.
    pub fn text(&self, column: &str) -> String {
        self.get(column)
            .map(|v| v.as_text().into_owned())
            .unwrap_or_default()
    }

    /// Exact string match. Numeric cells never match.
    pub fn is(&self, column: &str, expected: &str) -> bool {
        matches!(self.get(column), Some(Value::Text(s)) if s == expected)
    }

    /// Exact numeric match. Text cells never match.
    pub fn equals(&self, column: &str, expected: f64) -> bool {
        self.get(column).and_then(Value::as_number) == Some(expected)
    }

    /// Truthiness of a cell; missing cells are false.
    pub fn truthy(&self, column: &str) -> bool {
        self.get(column).is_some_and(Value::is_truthy)
    }
}

/// Parse the full text of one table into rows.
pub fn parse_table(content: &str) -> Vec<Row> {
    let mut lines = content.trim_start_matches('\u{feff}').trim().split('\n');

    let header = match lines.next() {
        Some(line) if !line.trim().is_empty() => line,
        _ => return Vec::new(),
    };

    let columns: Arc<[String]> = header
        .split(DELIMITER)
        .map(|h| h.trim().to_string())
        .collect();

    lines
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let values = line.split(DELIMITER).map(Value::parse).collect();
            Row::new(Arc::clone(&columns), values)
        })
        .collect()
}

/// The five parsed source tables.
#[derive(Debug, Clone, Default)]
pub struct TableSet {
    pub governance: Vec<Row>,
    pub surge: Vec<Row>,
    pub anomaly: Vec<Row>,
    pub quality_drift: Vec<Row>,
    pub load: Vec<Row>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_parse() {
        assert_eq!(Value::parse("42"), Value::Number(42.0));
        assert_eq!(Value::parse(" -1 "), Value::Number(-1.0));
        assert_eq!(Value::parse("3.25"), Value::Number(3.25));
        assert_eq!(Value::parse("Critical"), Value::Text("Critical".to_string()));
        assert_eq!(Value::parse("  Pune "), Value::Text("Pune".to_string()));
    }

    #[test]
    fn test_nan_and_empty_stay_text() {
        assert_eq!(Value::parse("NaN"), Value::Text("NaN".to_string()));
        assert_eq!(Value::parse(""), Value::Text(String::new()));
        assert_eq!(Value::parse("NaN").number_or_zero(), 0.0);
    }

    #[test]
    fn test_numeric_prefix() {
        assert_eq!(Value::parse("12abc"), Value::Number(12.0));
        assert_eq!(Value::parse("3.5%"), Value::Number(3.5));
        assert_eq!(Value::parse("-.5e2 units"), Value::Number(-50.0));
        assert_eq!(Value::parse("7e"), Value::Number(7.0));
        assert_eq!(Value::parse("5."), Value::Number(5.0));
        assert_eq!(Value::parse("Infinity"), Value::Number(f64::INFINITY));
        assert_eq!(Value::parse("12abc").number_or_zero(), 12.0);
    }

    #[test]
    fn test_no_numeric_prefix_stays_text() {
        assert_eq!(Value::parse("abc12"), Value::Text("abc12".to_string()));
        assert_eq!(Value::parse("n/a"), Value::Text("n/a".to_string()));
        assert_eq!(Value::parse("."), Value::Text(".".to_string()));
        assert_eq!(Value::parse("-"), Value::Text("-".to_string()));
        assert_eq!(Value::parse("inf"), Value::Text("inf".to_string()));
    }

    #[test]
    fn test_truthiness() {
        assert!(Value::Number(1.0).is_truthy());
        assert!(Value::Number(-1.0).is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(Value::Text("yes".to_string()).is_truthy());
        assert!(!Value::Text(String::new()).is_truthy());
    }

    #[test]
    fn test_number_text_rendering() {
        assert_eq!(Value::Number(100.0).as_text(), "100");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
    }

    #[test]
    fn test_parse_table_basic() {
        let rows = parse_table("state,district,total_auth_sum\nX,Y,100\nZ,W,250.5\n");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].columns(), &["state", "district", "total_auth_sum"]);
        assert_eq!(rows[0].text("state"), "X");
        assert_eq!(rows[0].number("total_auth_sum"), 100.0);
        assert_eq!(rows[1].number("total_auth_sum"), 250.5);
    }

    #[test]
    fn test_short_row_pads_with_empty_text() {
        let rows = parse_table("a,b,c\n1");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("a"), Some(&Value::Number(1.0)));
        assert_eq!(rows[0].get("b"), Some(&Value::Text(String::new())));
        assert_eq!(rows[0].get("c"), Some(&Value::Text(String::new())));
        assert_eq!(rows[0].number("c"), 0.0);
    }

    #[test]
    fn test_extra_fields_ignored() {
        let rows = parse_table("a,b\n1,2,3,4");
        assert_eq!(rows[0].columns().len(), 2);
        assert_eq!(rows[0].number("b"), 2.0);
    }

    #[test]
    fn test_header_trimmed_and_crlf() {
        let rows = parse_table(" state , QDI\r\nKerala,4.5\r\n");
        assert_eq!(rows[0].text("state"), "Kerala");
        assert_eq!(rows[0].number("QDI"), 4.5);
    }

    #[test]
    fn test_byte_order_mark_stripped() {
        let rows = parse_table("\u{feff}state,district,total_auth_sum\nKerala,Kollam,10\n");

        assert_eq!(rows[0].columns()[0], "state");
        assert_eq!(rows[0].text("state"), "Kerala");
        assert_eq!(rows[0].number("total_auth_sum"), 10.0);
    }

    #[test]
    fn test_empty_and_header_only() {
        assert!(parse_table("").is_empty());
        assert!(parse_table("   \n  ").is_empty());
        assert!(parse_table("a,b,c\n").is_empty());
    }

    #[test]
    fn test_blank_lines_skipped() {
        let rows = parse_table("a\n1\n\n2");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_duplicate_column_last_wins() {
        let rows = parse_table("a,a\n1,2");
        assert_eq!(rows[0].number("a"), 2.0);
    }

    #[test]
    fn test_missing_column_defaults() {
        let rows = parse_table("a\n1");
        assert_eq!(rows[0].get("missing"), None);
        assert_eq!(rows[0].number("missing"), 0.0);
        assert_eq!(rows[0].text("missing"), "");
        assert!(!rows[0].truthy("missing"));
    }

    #[test]
    fn test_is_and_equals_are_strict() {
        let rows = parse_table("level,flag\nCritical,1\n1,Critical");
        assert!(rows[0].is("level", "Critical"));
        assert!(rows[0].equals("flag", 1.0));
        assert!(!rows[1].is("level", "1"));
        assert!(!rows[1].equals("flag", 1.0));
    }
}

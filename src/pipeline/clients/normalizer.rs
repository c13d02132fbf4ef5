/// Parse-with-fallback conversion used for every numeric feature read.
///
/// Blank, unparsable, NaN or infinite input yields `0.0`; this never fails.
pub fn safe_float(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Monetary fields are finite and non-negative after normalization.
pub fn parse_amount(raw: Option<&str>) -> f64 {
    raw.map(safe_float).unwrap_or(0.0).max(0.0)
}

/// Like [`parse_amount`] for a present cell, also reporting whether the raw
/// text had to be replaced (unparsable, non-finite or negative).
pub(crate) fn checked_amount(raw: &str) -> (f64, bool) {
    let value = parse_amount(Some(raw));
    let exact = matches!(raw.trim().parse::<f64>(), Ok(parsed) if parsed == value);
    (value, !raw.trim().is_empty() && !exact)
}

/// Codes end up in report file names, so path separators and dot segments
/// are not accepted.
pub(crate) fn is_path_safe_code(code: &str) -> bool {
    code != "." && !code.contains("..") && !code.contains(['/', '\\', '\0'])
}

pub(crate) fn parse_count(raw: Option<&str>) -> u64 {
    parse_amount(raw).round() as u64
}

pub(crate) fn normalize_header(value: &str) -> String {
    value.replace(['\u{feff}', '\u{200b}'], "").trim().to_string()
}

/// Spend columns are written either with spaces or underscores in the
/// category part (`spent_Кафе_и_рестораны`); both map to one key.
pub(crate) fn category_key(value: &str) -> String {
    value
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

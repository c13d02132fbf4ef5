pub const CURRENCY_SUFFIX: &str = "₸";

/// Renders an amount as whole tenge grouped by thousands, e.g. `1 234 567 ₸`.
/// Non-finite input renders as `0 ₸`.
pub fn format_money(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let rounded = value.round_ties_even() as i64;

    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0 {
        grouped.push('-');
    }
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(digit);
    }

    format!("{grouped} {CURRENCY_SUFFIX}")
}

/// Rounds to cents. Non-finite input collapses to zero; values too large to
/// scale are already whole and come back unchanged.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let scaled = value * 100.0;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / 100.0
}

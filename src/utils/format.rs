//! Small text helpers for console output.

/// Formats a number with comma separators for thousands.
///
/// # Examples
///
/// ```
/// use sls_rule_activity::utils::format::format_number;
///
/// assert_eq!(format_number(1234), "1,234");
/// assert_eq!(format_number(42), "42");
/// ```
pub fn format_number(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Shows only the first four characters of an identifier such as a client id,
/// so it can appear in console output.
pub fn mask_secret(value: &str) -> String {
    let visible: String = value.chars().take(4).collect();
    if visible.chars().count() == value.chars().count() {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}

/// Pads or truncates `s` to `width` characters for fixed-width tables.
pub fn fit(s: &str, width: usize) -> String {
    let count = s.chars().count();
    if count <= width {
        format!("{:<width$}", s, width = width)
    } else {
        let mut cut: String = s.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

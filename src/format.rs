//! Number and bar formatting shared by the report, charts and dashboard

/// Format a cost with two decimals and thousand separators (e.g., 1234567.8 -> "1,234,567.80")
pub fn format_cost(cost: f64) -> String {
    let fixed = format!("{:.2}", cost);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };

    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    // Digits are ASCII, so byte indexing is safe
    for (i, ch) in digits.bytes().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch as char);
    }

    format!("{}{}.{}", sign, grouped, frac_part)
}

/// Horizontal bar scaled so that `max` fills `width` cells
pub fn format_sparkline(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || width == 0 {
        return "░".repeat(width);
    }
    let ratio = value / max;
    let filled = (ratio * width as f64).round() as usize;
    let filled = filled.min(width);
    let empty = width.saturating_sub(filled);
    format!("{}{}", "▓".repeat(filled), "░".repeat(empty))
}

/// Format a percentage bar with filled/empty blocks
/// Example: 50.0% with width 10 → "█████░░░░░"
pub fn format_percentage_bar(percent: f64, width: usize) -> String {
    let filled = ((percent / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    let empty = width.saturating_sub(filled);
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Share of `total` as a percentage (0 when total is 0)
pub fn share(cost: f64, total: f64) -> f64 {
    if total > 0.0 {
        cost / total * 100.0
    } else {
        0.0
    }
}

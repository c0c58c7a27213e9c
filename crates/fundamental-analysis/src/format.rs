/// Compact amount: `1.23B`, `45.60M`, or two decimals below a million.
pub fn format_num(num: f64) -> String {
    let abs = num.abs();
    if abs >= 1_000_000_000.0 {
        format!("{:.2}B", num / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{:.2}M", num / 1_000_000.0)
    } else {
        format!("{:.2}", num)
    }
}

/// A ratio shown as a percentage with one decimal (`0.714` -> `71.4%`).
pub fn format_pct(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

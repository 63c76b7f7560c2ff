use platecost_schemas::pricing::CurrencyFormat;

/// Formats an amount for display, e.g. `$15,500` or `-$2,000.50`.
pub fn format_currency(amount: f64, format: &CurrencyFormat) -> String {
    if !amount.is_finite() {
        return format!("{}{}", format.symbol, amount);
    }
    let fixed = format!("{:.*}", format.decimal_places, amount.abs());
    let (whole, fraction) = match fixed.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (fixed.as_str(), None),
    };

    let digits: Vec<char> = whole.chars().collect();
    let mut grouped = String::new();
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push_str(&format.thousands_separator);
        }
        grouped.push(*digit);
    }

    let sign = if amount < 0.0 && fixed.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    match fraction {
        Some(fraction) => format!(
            "{sign}{}{grouped}{}{fraction}",
            format.symbol, format.decimal_separator
        ),
        None => format!("{sign}{}{grouped}", format.symbol),
    }
}

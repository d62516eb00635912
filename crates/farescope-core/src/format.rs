//! Display formatting for prices, durations and clock times.

use crate::airports;

/// Symbol for an ISO currency code. Unknown codes fall back to "$" so a
/// price is never rendered bare.
pub fn currency_symbol(code: &str) -> &'static str {
    match code {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        "AUD" => "A$",
        "CAD" => "C$",
        "CHF" => "Fr",
        "CNY" => "¥",
        "INR" => "₹",
        _ => "$",
    }
}

/// Whole-amount price with thousands separators, e.g. `$1,235`.
pub fn format_price(amount: f64, currency: &str) -> String {
    format!(
        "{}{}",
        currency_symbol(currency),
        group_thousands(amount.round() as i64)
    )
}

fn group_thousands(value: i64) -> String {
    let digits = value.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Minutes as "7h 34m", dropping the zero component on exact hours or
/// sub-hour durations.
pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours == 0 {
        format!("{}m", mins)
    } else if mins == 0 {
        format!("{}h", hours)
    } else {
        format!("{}h {}m", hours, mins)
    }
}

pub fn format_stops(stops: u32) -> String {
    match stops {
        0 => "Non-stop".to_string(),
        1 => "1 Stop".to_string(),
        n => format!("{} Stops", n),
    }
}

/// 24h "HH:MM" rendered as a 12h clock. Anything that does not look like
/// a clock string is passed through unchanged, minutes included.
pub fn format_time(time: &str) -> String {
    let Some((hour_part, minutes)) = time.split_once(':') else {
        return time.to_string();
    };
    let Ok(hour) = hour_part.trim().parse::<u32>() else {
        return time.to_string();
    };
    let period = if hour % 24 >= 12 { "PM" } else { "AM" };
    let hour12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{} {}", hour12, minutes, period)
}

/// "JFK - New York" when the code is known, the bare uppercased code
/// otherwise.
pub fn format_airport(code: &str) -> String {
    match airports::airport_by_code(code) {
        Some(info) => format!("{} - {}", info.code, info.city),
        None => code.trim().to_uppercase(),
    }
}

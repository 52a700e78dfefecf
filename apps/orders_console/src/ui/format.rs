//! Pure formatting helpers for table cells.

use chrono::{DateTime, FixedOffset};
use shared::domain::Money;

pub const FALLBACK_STATUS_COLOR: &str = "#777";

/// Brazilian real, e.g. `R$ 1.234,50`.
pub fn format_brl(amount: Money) -> String {
    let cents = amount.cents();
    let abs = cents.unsigned_abs();
    let whole = (abs / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if cents < 0 { "-" } else { "" };
    format!("{sign}R$ {grouped},{:02}", abs % 100)
}

/// `dd/mm/yyyy HH:MM` rendered in the given offset.
pub fn format_datetime(value: &DateTime<FixedOffset>, offset: FixedOffset) -> String {
    value.with_timezone(&offset).format("%d/%m/%Y %H:%M").to_string()
}

pub fn format_order_number(order_number: i64) -> String {
    format!("#{order_number}")
}

pub fn format_product(name: &str, quantity: i64) -> String {
    format!("{name} ({quantity})")
}

/// Accepts `#rgb` and `#rrggbb`.
pub fn parse_hex_color(raw: &str) -> Option<(u8, u8, u8)> {
    let hex = raw.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => {
            let mut channels = hex
                .chars()
                .map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
            Some((channels.next()??, channels.next()??, channels.next()??))
        }
        6 => {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some((channel(0)?, channel(2)?, channel(4)?))
        }
        _ => None,
    }
}

/// Status label as a colored pill; plain brackets when color is off.
pub fn status_badge(name: &str, color: Option<&str>, color_enabled: bool) -> String {
    if !color_enabled {
        return format!("[{name}]");
    }
    let (r, g, b) = color
        .and_then(parse_hex_color)
        .or_else(|| parse_hex_color(FALLBACK_STATUS_COLOR))
        .unwrap_or((0x77, 0x77, 0x77));
    format!("\x1b[1;38;2;255;255;255;48;2;{r};{g};{b}m {name} \x1b[0m")
}

/// Display width of a badge, escape sequences excluded.
pub fn status_badge_width(name: &str) -> usize {
    name.chars().count() + 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_brl_with_grouping() {
        assert_eq!(format_brl(Money::from_cents(123_450)), "R$ 1.234,50");
        assert_eq!(format_brl(Money::from_cents(0)), "R$ 0,00");
        assert_eq!(format_brl(Money::from_cents(99)), "R$ 0,99");
        assert_eq!(format_brl(Money::from_cents(100_000_000)), "R$ 1.000.000,00");
        assert_eq!(format_brl(Money::from_cents(-100)), "-R$ 1,00");
    }

    #[test]
    fn formats_datetime_in_fixed_offset() {
        let ts = DateTime::parse_from_rfc3339("2024-05-01T16:45:00Z").expect("ts");
        let brt = FixedOffset::west_opt(3 * 3600).expect("offset");
        assert_eq!(format_datetime(&ts, brt), "01/05/2024 13:45");

        let utc = FixedOffset::east_opt(0).expect("offset");
        assert_eq!(format_datetime(&ts, utc), "01/05/2024 16:45");
    }

    #[test]
    fn parses_short_and_long_hex_colors() {
        assert_eq!(parse_hex_color("#777"), Some((0x77, 0x77, 0x77)));
        assert_eq!(parse_hex_color("#ff9800"), Some((0xff, 0x98, 0x00)));
        assert_eq!(parse_hex_color("red"), None);
        assert_eq!(parse_hex_color("#12345"), None);
        assert_eq!(parse_hex_color("#ççç"), None);
    }

    #[test]
    fn badge_falls_back_to_grey() {
        let badge = status_badge("Novo", None, true);
        assert!(badge.contains("48;2;119;119;119m"));
        assert!(badge.contains(" Novo "));
        assert_eq!(status_badge("Novo", Some("#2196f3"), false), "[Novo]");
        assert_eq!(status_badge_width("Novo"), 6);
    }
}

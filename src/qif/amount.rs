//! Conversion between minor currency units and the decimal text used in
//! QIF `T`/`$` lines and bank CSV exports.

use super::error::QifError;

/// Render minor units as `[-]units.cc`.
pub fn format_minor(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Parse a decimal amount into minor units.
///
/// Accepts one sign (before or after the currency prefix) or
/// accounting-style parentheses, at most one currency prefix (a symbol
/// such as `$`, `€`, `£`, or an upper-case ISO code like `EUR`),
/// thousands grouping and at most two fraction digits.
/// `decimal_separator` is `.` for most exports and `,` for European ones;
/// the other character, spaces and no-break spaces group thousands.
pub fn parse_minor(value: &str, decimal_separator: char) -> Result<i64, QifError> {
    let invalid = |reason: &str| QifError::InvalidAmount {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let mut text = value.trim();
    if text.is_empty() {
        return Err(invalid("empty value"));
    }

    let mut negative = false;
    let mut signed = false;
    if text.starts_with('(') && text.ends_with(')') {
        negative = true;
        signed = true;
        text = text[1..text.len() - 1].trim();
    }

    let grouping = if decimal_separator == ',' { '.' } else { ',' };

    if let Some((is_negative, rest)) = strip_sign(text) {
        if signed {
            return Err(invalid("more than one sign"));
        }
        negative = is_negative;
        signed = true;
        text = rest;
    }

    if let Some(rest) = strip_currency(text, decimal_separator, grouping) {
        text = rest;
        if let Some((is_negative, rest)) = strip_sign(text) {
            if signed {
                return Err(invalid("more than one sign"));
            }
            negative = is_negative;
            text = rest;
        }
    }

    let (whole, fraction) = match text.split_once(decimal_separator) {
        Some((w, f)) => (w, f),
        None => (text, ""),
    };

    let whole: String = whole
        .chars()
        .filter(|c| *c != grouping && !is_group_space(*c))
        .collect();
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid("no digits"));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("unexpected character in integer part"));
    }
    if fraction.len() > 2 || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("fraction must be at most two digits"));
    }

    let units: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid("value out of range"))?
    };
    let cents: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| invalid("bad fraction"))? * 10,
        _ => fraction.parse().map_err(|_| invalid("bad fraction"))?,
    };

    let minor = units
        .checked_mul(100)
        .and_then(|v| v.checked_add(cents))
        .ok_or_else(|| invalid("value out of range"))?;

    Ok(if negative { -minor } else { minor })
}

/// Adds two amounts, failing instead of wrapping.
pub fn checked_sum(a: i64, b: i64) -> Result<i64, QifError> {
    a.checked_add(b).ok_or(QifError::AmountOverflow { left: a, right: b })
}

fn strip_sign(text: &str) -> Option<(bool, &str)> {
    if let Some(rest) = text.strip_prefix('-') {
        Some((true, rest.trim_start()))
    } else {
        text.strip_prefix('+').map(|rest| (false, rest.trim_start()))
    }
}

// 貨幣符號或三碼 ISO 代碼，只去除一次
fn strip_currency(text: &str, decimal_separator: char, grouping: char) -> Option<&str> {
    let first = text.chars().next()?;
    let is_symbol = !first.is_alphanumeric()
        && !first.is_whitespace()
        && !matches!(first, '+' | '-' | '(' | ')')
        && first != decimal_separator
        && first != grouping;
    if is_symbol {
        return Some(text[first.len_utf8()..].trim_start());
    }

    let code = text.get(..3)?;
    let after = text[3..].chars().next();
    let code_ends = after.map_or(true, |c| !c.is_alphabetic());
    if code.chars().all(|c| c.is_ascii_uppercase()) && code_ends {
        return Some(text[3..].trim_start());
    }
    None
}

fn is_group_space(c: char) -> bool {
    matches!(c, ' ' | '\u{00A0}' | '\u{202F}')
}

use std::fmt;

/// Money is represented as integer cents to avoid floating-point precision issues.
/// All prices, balances and deposits are fixed at two decimal places,
/// so $12.50 = 1250 cents.
pub type Cents = i64;

/// Format cents as a human-readable decimal string.
/// Example: 1250 -> "12.50", -60 -> "-0.60"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Parse a decimal amount string into cents.
/// Example: "12.50" -> 1250, "12.5" -> 1250, "100" -> 10000
///
/// At most two decimal places are accepted; anything finer would silently
/// lose precision, so it is rejected instead.
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseCentsError::InvalidFormat);
    }

    let (units_str, decimal_str) = match input.split_once('.') {
        Some((u, d)) => (u, d),
        None => (input, ""),
    };

    // "-0.50" parses its units as 0, so check the sign on the text
    if units_str.starts_with('-') {
        return Err(ParseCentsError::Negative);
    }
    let units: i64 = if units_str.is_empty() {
        0
    } else {
        units_str.parse().map_err(|_| ParseCentsError::InvalidFormat)?
    };

    let decimal: i64 = match decimal_str.len() {
        0 => 0,
        1 => {
            decimal_str
                .parse::<i64>()
                .map_err(|_| ParseCentsError::InvalidFormat)?
                * 10
        }
        2 => decimal_str
            .parse()
            .map_err(|_| ParseCentsError::InvalidFormat)?,
        _ => return Err(ParseCentsError::TooManyDecimals),
    };
    if decimal < 0 {
        // A '-' after the decimal point, e.g. "1.-5"
        return Err(ParseCentsError::InvalidFormat);
    }

    Ok(units * 100 + decimal)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    InvalidFormat,
    Negative,
    TooManyDecimals,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::InvalidFormat => write!(f, "invalid money format"),
            ParseCentsError::Negative => write!(f, "amount must not be negative"),
            ParseCentsError::TooManyDecimals => {
                write!(f, "amounts have at most two decimal places")
            }
        }
    }
}

impl std::error::Error for ParseCentsError {}

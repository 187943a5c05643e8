use rust_decimal::Decimal;
use thiserror::Error;

/// Why a piece of text is not an exact decimal amount.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecimalParseError {
    #[error("empty amount")]
    Empty,
    #[error("invalid amount")]
    NonNumeric,
    #[error("amount out of range")]
    OutOfRange,
}

/// An exactly parsed decimal together with its significant fraction digits.
///
/// Amounts are never routed through binary floating point: the text is
/// validated and handed to [`Decimal`] as-is, so sums over thousands of values
/// carry no rounding drift.
///
/// # Examples
///
/// ```rust
/// use engine::amount::parse_decimal;
///
/// let parsed = parse_decimal("10.1234567").unwrap();
/// assert_eq!(parsed.decimal_places(), 7);
/// assert_eq!(parse_decimal("+2.50").unwrap().decimal_places(), 1);
/// assert!(parse_decimal("1e5").is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParsedDecimal {
    value: Decimal,
    decimal_places: u32,
}

impl ParsedDecimal {
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.value
    }

    /// Fraction digits after dropping trailing zeros (`"1.50"` has 1).
    #[must_use]
    pub const fn decimal_places(self) -> u32 {
        self.decimal_places
    }
}

/// Parses a plain decimal string: optional `+`/`-`, digits, optional `.` and
/// fraction digits. Exponents, thousands separators and `,` decimal separators
/// are rejected.
pub fn parse_decimal(s: &str) -> Result<ParsedDecimal, DecimalParseError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(DecimalParseError::Empty);
    }

    let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
        (true, stripped)
    } else if let Some(stripped) = trimmed.strip_prefix('+') {
        (false, stripped)
    } else {
        (false, trimmed)
    };
    if rest.is_empty() {
        return Err(DecimalParseError::NonNumeric);
    }

    let mut parts = rest.split('.');
    let units = parts.next().ok_or(DecimalParseError::NonNumeric)?;
    let fraction = parts.next();
    if parts.next().is_some() {
        return Err(DecimalParseError::NonNumeric);
    }

    if units.is_empty() || !units.chars().all(|c| c.is_ascii_digit()) {
        return Err(DecimalParseError::NonNumeric);
    }
    let fraction = fraction.unwrap_or("");
    if !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(DecimalParseError::NonNumeric);
    }

    let canonical = if fraction.is_empty() {
        units.to_string()
    } else {
        format!("{units}.{fraction}")
    };
    let mut value =
        Decimal::from_str_exact(&canonical).map_err(|_| DecimalParseError::OutOfRange)?;
    if negative && !value.is_zero() {
        value.set_sign_negative(true);
    }

    let decimal_places = fraction.trim_end_matches('0').len() as u32;
    Ok(ParsedDecimal {
        value,
        decimal_places,
    })
}

/// Parses a required positive amount, mapping failures to field errors.
pub(crate) fn parse_positive(field: &str, raw: &str) -> crate::ResultEngine<Decimal> {
    let parsed = parse_decimal(raw).map_err(|err| match err {
        DecimalParseError::Empty => crate::EngineError::missing(field),
        other => crate::EngineError::invalid(field, other.to_string()),
    })?;
    if parsed.value() <= Decimal::ZERO {
        return Err(crate::EngineError::invalid(field, "amount must be > 0"));
    }
    Ok(parsed.value())
}

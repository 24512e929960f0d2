use rust_decimal::Decimal;

/// Money is a decimal with a 96-bit mantissa and up to 28 fractional digits.
/// Ledger arithmetic goes through [`exact_add`], [`exact_sub`] and [`exact_mul`],
/// which fail instead of rounding.
pub type Amount = Decimal;

/// Format an amount as a human-readable string.
/// Example: 50.00 -> "50", -12.340 -> "-12.34"
pub fn format_amount(amount: Amount) -> String {
    amount.normalize().to_string()
}

/// Parse a decimal string into an amount, keeping every fractional digit.
/// Example: "50.00" -> 50.00, "12.5" -> 12.5, "0.001" -> 0.001
///
/// Input that does not fit an [`Amount`] without rounding is rejected.
pub fn parse_amount(input: &str) -> Result<Amount, ParseAmountError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseAmountError::InvalidFormat(input.to_string()));
    }

    Decimal::from_str_exact(input).map_err(|_| ParseAmountError::InvalidFormat(input.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseAmountError {
    #[error("invalid money format: '{0}'")]
    InvalidFormat(String),
}

/// Why an amount computation has no exact result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("result is out of range")]
    Overflow,

    #[error("result needs more digits than an amount holds")]
    Inexact,
}

/// `a + b`, exactly.
pub fn exact_add(a: Amount, b: Amount) -> Result<Amount, AmountError> {
    let result = a.checked_add(b).ok_or(AmountError::Overflow)?;
    let (a, b) = (a.normalize(), b.normalize());
    let scale = a.scale().max(b.scale());

    let expected = aligned_mantissa(a, scale)
        .zip(aligned_mantissa(b, scale))
        .and_then(|(a, b)| a.checked_add(b));
    verify(result, expected, scale)
}

/// `a - b`, exactly.
pub fn exact_sub(a: Amount, b: Amount) -> Result<Amount, AmountError> {
    let result = a.checked_sub(b).ok_or(AmountError::Overflow)?;
    let (a, b) = (a.normalize(), b.normalize());
    let scale = a.scale().max(b.scale());

    let expected = aligned_mantissa(a, scale)
        .zip(aligned_mantissa(b, scale))
        .and_then(|(a, b)| a.checked_sub(b));
    verify(result, expected, scale)
}

/// `a * b`, exactly.
pub fn exact_mul(a: Amount, b: Amount) -> Result<Amount, AmountError> {
    let result = a.checked_mul(b).ok_or(AmountError::Overflow)?;
    let (a, b) = (a.normalize(), b.normalize());

    let expected = a.mantissa().checked_mul(b.mantissa());
    verify(result, expected, a.scale() + b.scale())
}

fn aligned_mantissa(value: Amount, scale: u32) -> Option<i128> {
    10i128
        .checked_pow(scale - value.scale())?
        .checked_mul(value.mantissa())
}

/// Compare a computed amount against the exact `mantissa / 10^scale`.
/// A mantissa that did not fit an i128 counts as inexact.
fn verify(result: Amount, expected: Option<i128>, scale: u32) -> Result<Amount, AmountError> {
    let Some(mut mantissa) = expected else {
        return Err(AmountError::Inexact);
    };

    let mut scale = scale;
    while scale > 0 && mantissa % 10 == 0 {
        mantissa /= 10;
        scale -= 1;
    }

    let normalized = result.normalize();
    if normalized.mantissa() == mantissa && normalized.scale() == scale {
        Ok(result)
    } else {
        Err(AmountError::Inexact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec!(50.00)), "50");
        assert_eq!(format_amount(dec!(12.34)), "12.34");
        assert_eq!(format_amount(dec!(0.010)), "0.01");
        assert_eq!(format_amount(Decimal::ZERO), "0");
        assert_eq!(format_amount(dec!(-10)), "-10");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("50.00"), Ok(dec!(50.00)));
        assert_eq!(parse_amount("50"), Ok(dec!(50)));
        assert_eq!(parse_amount(" 12.5 "), Ok(dec!(12.5)));
        assert_eq!(parse_amount("-7.25"), Ok(dec!(-7.25)));
        // Every fractional digit is kept
        assert_eq!(parse_amount("100.999"), Ok(dec!(100.999)));
    }

    #[test]
    fn test_parse_amount_invalid() {
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("12.34.56").is_err());
        assert!(parse_amount("").is_err());
    }

    #[test]
    fn test_parse_amount_rejects_rounding() {
        assert!(parse_amount("1.00000000000000000000000000001").is_err());
        assert_eq!(
            parse_amount("1.0000000000000000000000000001"),
            Ok(dec!(1.0000000000000000000000000001))
        );
    }

    #[test]
    fn test_exact_arithmetic() {
        assert_eq!(exact_sub(dec!(100), dec!(10)), Ok(dec!(90)));
        assert_eq!(exact_sub(dec!(12.50), dec!(0.25)), Ok(dec!(12.25)));
        assert_eq!(exact_add(dec!(10), dec!(0.0000001)), Ok(dec!(10.0000001)));
        assert_eq!(exact_add(dec!(-1.5), dec!(1.5)), Ok(Decimal::ZERO));
        assert_eq!(exact_mul(dec!(5), dec!(0.05)), Ok(dec!(0.25)));
        assert_eq!(exact_mul(dec!(10), dec!(0.015)), Ok(dec!(0.15)));
        assert_eq!(exact_mul(dec!(0), dec!(0.05)), Ok(Decimal::ZERO));
    }

    #[test]
    fn test_exact_sub_refuses_to_round() {
        let huge = dec!(70000000000000000000000000000);
        assert_eq!(exact_sub(huge, dec!(0.1)), Err(AmountError::Inexact));
        assert_eq!(exact_add(huge, dec!(0.1)), Err(AmountError::Inexact));
    }

    #[test]
    fn test_exact_mul_refuses_to_round() {
        assert_eq!(
            exact_mul(dec!(0.000000000000001), dec!(0.000000000000001)),
            Err(AmountError::Inexact)
        );
    }

    #[test]
    fn test_overflow_is_reported() {
        assert_eq!(exact_add(Decimal::MAX, dec!(1)), Err(AmountError::Overflow));
        assert_eq!(exact_mul(Decimal::MAX, dec!(2)), Err(AmountError::Overflow));
    }
}

// Rupee amounts in lakhs and crores.
//
// All amounts are whole rupees stored as u64.

use thiserror::Error;

pub const LAKH: u64 = 100_000;
pub const CRORE: u64 = 10_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("empty amount")]
    Empty,
    #[error("invalid amount `{0}`")]
    Invalid(String),
    #[error("amount `{0}` is too large")]
    Overflow(String),
}

/// Render an amount the way the auction board shows it:
/// crores with two decimals from one crore up, lakhs with one decimal below.
pub fn format_amount(amount: u64) -> String {
    if amount >= CRORE {
        format!("₹{:.2} Cr", amount as f64 / CRORE as f64)
    } else {
        format!("₹{:.1} L", amount as f64 / LAKH as f64)
    }
}

/// Parse a typed amount: plain rupees (`2500000`) or a lakh/crore figure
/// (`25L`, `25 lakh`, `2.5cr`, `2.5 crore`).
pub fn parse_amount(input: &str) -> Result<u64, AmountError> {
    let s = input.trim().replace(['_', ','], "");
    if s.is_empty() {
        return Err(AmountError::Empty);
    }

    let lower = s.to_ascii_lowercase();
    let split = lower
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(lower.len());
    let (number, suffix) = lower.split_at(split);

    let unit = match suffix.trim() {
        "" => 1,
        "l" | "lakh" | "lakhs" | "lac" => LAKH,
        "cr" | "crore" | "crores" => CRORE,
        _ => return Err(AmountError::Invalid(input.to_string())),
    };

    let (whole, frac) = number.split_once('.').unwrap_or((number, ""));
    if whole.is_empty() && frac.is_empty() {
        return Err(AmountError::Invalid(input.to_string()));
    }
    let overflow = || AmountError::Overflow(input.to_string());
    let invalid = || AmountError::Invalid(input.to_string());

    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let mut total = whole.checked_mul(unit).ok_or_else(overflow)?;

    if !frac.is_empty() {
        if !frac.chars().all(|c| c.is_ascii_digit()) || frac.len() > 7 {
            return Err(invalid());
        }
        let scale = 10u64.pow(frac.len() as u32);
        let digits: u64 = frac.parse().map_err(|_| invalid())?;
        let scaled = digits.checked_mul(unit).ok_or_else(overflow)?;
        // Fractions must land on whole rupees.
        if scaled % scale != 0 {
            return Err(invalid());
        }
        total = total.checked_add(scaled / scale).ok_or_else(overflow)?;
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_crores_and_lakhs() {
        assert_eq!(format_amount(850_000_000), "₹85.00 Cr");
        assert_eq!(format_amount(25_000_000), "₹2.50 Cr");
        assert_eq!(format_amount(CRORE), "₹1.00 Cr");
        assert_eq!(format_amount(2_500_000), "₹25.0 L");
        assert_eq!(format_amount(9_950_000), "₹99.5 L");
        assert_eq!(format_amount(0), "₹0.0 L");
    }

    #[test]
    fn parses_plain_rupees() {
        assert_eq!(parse_amount("2500000"), Ok(2_500_000));
        assert_eq!(parse_amount("2,500,000"), Ok(2_500_000));
        assert_eq!(parse_amount(" 2_500_000 "), Ok(2_500_000));
    }

    #[test]
    fn parses_lakh_and_crore_suffixes() {
        assert_eq!(parse_amount("25L"), Ok(2_500_000));
        assert_eq!(parse_amount("25 lakh"), Ok(2_500_000));
        assert_eq!(parse_amount("2.5cr"), Ok(25_000_000));
        assert_eq!(parse_amount("2.5 Crore"), Ok(25_000_000));
        assert_eq!(parse_amount(".5cr"), Ok(5_000_000));
        assert_eq!(parse_amount("1.25L"), Ok(125_000));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_amount(""), Err(AmountError::Empty));
        assert!(matches!(parse_amount("abc"), Err(AmountError::Invalid(_))));
        assert!(matches!(parse_amount("12 dollars"), Err(AmountError::Invalid(_))));
        assert!(matches!(parse_amount("1.2.3"), Err(AmountError::Invalid(_))));
        assert!(matches!(parse_amount("."), Err(AmountError::Invalid(_))));
        assert!(matches!(parse_amount("0.5"), Err(AmountError::Invalid(_))));
    }

    #[test]
    fn rejects_overflow() {
        assert!(matches!(
            parse_amount("99999999999999999999cr"),
            Err(AmountError::Invalid(_)) | Err(AmountError::Overflow(_))
        ));
        assert!(matches!(
            parse_amount("9999999999999cr"),
            Err(AmountError::Overflow(_))
        ));
    }
}

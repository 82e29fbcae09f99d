use alloy_primitives::{Address, U256};

use crate::error::EncodingError;

/// Parses a fixed-width hex value. The `0x` prefix is optional; any case is accepted.
pub fn parse_hex<const N: usize>(s: &str) -> Result<[u8; N], String> {
    let s = s.trim();
    let ss = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    if ss.len() != N * 2 {
        return Err(format!("expected {} hex chars, got {}", N * 2, ss.len()));
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(ss, &mut out).map_err(|_| "invalid hex".to_string())?;
    Ok(out)
}

/// Lowercase `0x`-prefixed hex.
pub fn hex0x(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}

pub fn parse_address(s: &str) -> Result<Address, EncodingError> {
    let bytes: [u8; 20] =
        parse_hex(s).map_err(|e| EncodingError::InvalidAddress(format!("{:?}: {e}", s.trim())))?;
    let address = Address::from(bytes);
    if address == Address::ZERO {
        return Err(EncodingError::InvalidAddress("zero address not allowed".to_string()));
    }
    Ok(address)
}

/// Canonical display form of an address: lowercase, `0x` prefixed, no checksum.
pub fn normalize_address(address: &Address) -> String {
    hex0x(address)
}

pub fn pow10(exp: u32) -> Option<U256> {
    let ten = U256::from(10u64);
    let mut acc = U256::from(1u64);
    for _ in 0..exp {
        acc = acc.checked_mul(ten)?;
    }
    Some(acc)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
    /// A fractional remainder below the scale is an error.
    Exact,
    /// A fractional remainder below the scale is dropped.
    Floor,
}

/// Parses `digits[.digits]` and scales it by `10^decimals` into an exact integer.
pub fn parse_scaled(s: &str, decimals: u32, rounding: Rounding) -> Result<U256, EncodingError> {
    let invalid = |why: &str| EncodingError::InvalidAllocation(format!("{:?}: {why}", s));
    let s = s.trim();
    if s.is_empty() {
        return Err(invalid("empty"));
    }
    if s.starts_with('-') {
        return Err(invalid("negative"));
    }
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, f),
        None => (s, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid("no digits"));
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("not a decimal number"));
    }

    let frac_trimmed = frac_part.trim_end_matches('0');
    let scale = decimals as usize;
    let kept = if frac_trimmed.len() > scale {
        match rounding {
            Rounding::Exact => return Err(invalid("more fractional digits than the token supports")),
            Rounding::Floor => &frac_trimmed[..scale],
        }
    } else {
        frac_trimmed
    };

    let overflow = || invalid("exceeds uint256");
    let int_value = if int_part.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(int_part, 10).map_err(|_| overflow())?
    };
    let multiplier = pow10(decimals).ok_or_else(overflow)?;
    let mut value = int_value.checked_mul(multiplier).ok_or_else(overflow)?;
    if !kept.is_empty() {
        let frac_value = U256::from_str_radix(kept, 10).map_err(|_| overflow())?;
        let pad = pow10((scale - kept.len()) as u32).ok_or_else(overflow)?;
        let frac_scaled = frac_value.checked_mul(pad).ok_or_else(overflow)?;
        value = value.checked_add(frac_scaled).ok_or_else(overflow)?;
    }
    Ok(value)
}

pub fn parse_amount(s: &str, decimals: u32) -> Result<U256, EncodingError> {
    parse_scaled(s, decimals, Rounding::Exact)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_address_accepts_any_case_and_prefix() {
        let a = parse_address("0xAbCdEf0123456789abcdef0123456789ABCDEF01").unwrap();
        let b = parse_address("abcdef0123456789abcdef0123456789abcdef01").unwrap();
        assert_eq!(a, b);
        assert_eq!(normalize_address(&a), "0xabcdef0123456789abcdef0123456789abcdef01");
    }

    #[test]
    fn parse_address_rejects_bad_input() {
        assert!(parse_address("0x1234").is_err());
        assert!(parse_address("0xzz00000000000000000000000000000000000001").is_err());
        assert!(parse_address("0x0000000000000000000000000000000000000000").is_err());
    }

    #[test]
    fn amounts_ignore_formatting() {
        let a = parse_amount("1000", 0).unwrap();
        assert_eq!(parse_amount("0001000", 0).unwrap(), a);
        assert_eq!(parse_amount("1000.000", 0).unwrap(), a);
        assert_eq!(parse_amount(" 1000 ", 0).unwrap(), a);
    }

    #[test]
    fn amounts_scale_by_decimals() {
        assert_eq!(parse_amount("1.5", 18).unwrap(), U256::from(1_500_000_000_000_000_000u128));
        assert_eq!(parse_amount(".25", 2).unwrap(), U256::from(25u64));
        assert_eq!(parse_amount("7", 3).unwrap(), U256::from(7000u64));
    }

    #[test]
    fn amounts_never_truncate_silently() {
        assert!(parse_amount("1.5", 0).is_err());
        assert!(parse_amount("0.0000001", 6).is_err());
        assert_eq!(parse_scaled("0.0000019", 6, Rounding::Floor).unwrap(), U256::from(1u64));
    }

    #[test]
    fn amounts_reject_garbage() {
        for bad in ["", "-1", "1e18", "abc", "1.2.3", ".", "+5", "1 000"] {
            assert!(parse_amount(bad, 0).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn amounts_reject_overflow() {
        let max = U256::MAX.to_string();
        assert_eq!(parse_amount(&max, 0).unwrap(), U256::MAX);
        assert!(parse_amount(&max, 1).is_err());
        assert!(parse_amount(&format!("{max}0"), 0).is_err());
    }
}

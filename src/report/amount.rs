use alloy::primitives::U256;
use rust_decimal::{Decimal, RoundingStrategy};

/// Largest exponent a `Decimal` can carry as scale.
const MAX_SCALE: u8 = 28;

/// Convert a base-unit integer into a token amount using `decimals`.
///
/// The integer and fractional parts are split before conversion so an
/// 18-decimal balance never has to fit the 96-bit mantissa as one number.
/// Returns `None` when the whole part itself is out of range.
pub fn to_decimal(raw: U256, decimals: u8) -> Option<Decimal> {
    if decimals > MAX_SCALE {
        return None;
    }

    let unit = U256::from(10u64).pow(U256::from(decimals));
    let whole = i128::try_from(u128::try_from(raw / unit).ok()?).ok()?;
    let frac = i128::try_from(u128::try_from(raw % unit).ok()?).ok()?;

    let whole = Decimal::try_from_i128_with_scale(whole, 0).ok()?;
    let frac = Decimal::try_from_i128_with_scale(frac, decimals as u32).ok()?;
    whole.checked_add(frac)
}

/// Round half away from zero, the way a fixed-precision display expects.
pub fn round(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Render with exactly `dp` fractional digits.
pub fn fixed(value: Decimal, dp: u32) -> String {
    format!("{:.prec$}", round(value, dp), prec = dp as usize)
}

/// Totals cells: a zero sum is the bare `0`, anything else is fixed-precision.
pub fn total_cell(value: Decimal, dp: u32) -> String {
    if value > Decimal::ZERO {
        fixed(value, dp)
    } else {
        "0".to_string()
    }
}

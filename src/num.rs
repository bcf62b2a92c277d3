use alloy::primitives::U256;
use fastnum::{
    D256, bint,
    decimal::{Context, RoundingMode, UnsignedDecimal},
};

/// Decimals of rates stored by the pricing and sanity contracts,
/// e.g. 1 ETH = 500 KNC is stored as `500 * 10^18`.
pub const RATE_DECIMALS: u8 = 18;

/// Fixed-point to decimal converter.
#[derive(Clone, Copy, Debug, Default)]
pub struct Converter {
    decimals: i32,
}

impl Converter {
    pub fn new(decimals: u8) -> Self {
        Self {
            decimals: decimals as i32,
        }
    }

    /// Converter of on-chain rates.
    pub fn rates() -> Self {
        Self::new(RATE_DECIMALS)
    }

    pub fn from_unsigned<const N: usize>(&self, value: U256) -> UnsignedDecimal<N> {
        let unscaled = bint::UInt::<N>::from_le_slice(value.as_le_slice())
            .expect("Converter: U256 -> UInt::<N>");
        UnsignedDecimal::<N>::from_parts(
            unscaled,
            -self.decimals,
            Context::default().with_rounding_mode(RoundingMode::Floor),
        )
    }

    pub fn to_unsigned<const N: usize>(&self, value: UnsignedDecimal<N>) -> U256 {
        let rescaled = value.rescale(self.decimals as i16);
        U256::from_le_slice(rescaled.digits().to_radix_le(256).as_slice())
    }

    /// Converts a signed decimal to its fixed-point form, `None` if the value
    /// is negative, NaN, infinite or too large for a `U256`.
    pub fn to_non_negative(&self, value: D256) -> Option<U256> {
        if value.is_nan() || value.is_infinite() || value.is_negative() {
            return None;
        }
        let rescaled = value.rescale(self.decimals as i16);
        // Rescaling stops short of the requested scale once digits run out
        if rescaled.fractional_digits_count() != self.decimals as i16 {
            return None;
        }
        U256::try_from_le_slice(rescaled.digits().to_radix_le(256).as_slice())
    }
}

#[cfg(test)]
mod tests {
    use fastnum::{dec256, udec256};

    use super::*;

    #[test]
    fn test_numeric_converter_from_unsigned() {
        assert_eq!(
            Converter::new(0).from_unsigned(U256::from(1234567890)),
            udec256!(1234567890)
        );
        assert_eq!(
            Converter::new(6).from_unsigned(U256::from(1234567890)),
            udec256!(1234.56789)
        );
        assert_eq!(
            Converter::rates().from_unsigned(U256::from(2_000_000_000_000_000u64)),
            udec256!(0.002)
        );
    }

    #[test]
    fn test_numeric_converter_to_unsigned() {
        assert_eq!(
            Converter::new(6).to_unsigned(udec256!(1234.56789)),
            U256::from(1234567890)
        );
        assert_eq!(
            Converter::new(12).to_unsigned(udec256!(0.00123456789)),
            U256::from(1234567890)
        );
    }

    #[test]
    fn test_numeric_converter_to_non_negative() {
        assert_eq!(
            Converter::rates().to_non_negative(dec256!(500)),
            Some(U256::from(500u64) * U256::from(10u64).pow(U256::from(18)))
        );
        assert_eq!(
            Converter::rates().to_non_negative(dec256!(0.00182)),
            Some(U256::from(1_820_000_000_000_000u64))
        );
        assert_eq!(Converter::rates().to_non_negative(dec256!(0)), Some(U256::ZERO));
        assert_eq!(Converter::rates().to_non_negative(dec256!(-1)), None);
        assert_eq!(Converter::rates().to_non_negative(D256::NAN), None);
        assert_eq!(Converter::rates().to_non_negative(D256::INFINITY), None);
    }

    #[test]
    fn test_numeric_converter_to_non_negative_out_of_range() {
        assert_eq!(
            Converter::rates().to_non_negative(dec256!(1e50)),
            Some(U256::from(10u64).pow(U256::from(68)))
        );
        assert_eq!(
            Converter::rates().to_non_negative(dec256!(1e57)),
            Some(U256::from(10u64).pow(U256::from(75)))
        );
        assert_eq!(Converter::rates().to_non_negative(dec256!(2e59)), None);
        assert_eq!(Converter::rates().to_non_negative(dec256!(1e60)), None);
        assert_eq!(Converter::rates().to_non_negative(dec256!(123456789e55)), None);
    }
}

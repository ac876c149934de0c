use std::{
    fmt,
    ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign},
    str::FromStr,
};

use ethers::types::U256;
use eyre::{eyre, Error, Result};
use fixed_point_macros::{fixed, uint256};
use rand::{
    distributions::{
        uniform::{SampleBorrow, SampleUniform, UniformSampler},
        Distribution, Standard,
    },
    Rng,
};

/// Number of decimals in a token amount. Every token the basket touches
/// (3CRV, the yCRV vaults, the set token itself) uses 18.
pub const DECIMALS: usize = 18;

/// A wad: an 18-decimal fixed point wrapper around `U256`.
///
/// Multiplication and division round down like the integer math performed
/// by the contracts (`a.mul(b).div(1e18)`).
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct FixedPoint(U256);

impl Default for FixedPoint {
    fn default() -> FixedPoint {
        fixed!(0)
    }
}

/// Formatting ///

impl fmt::Debug for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedPoint({})", self.to_scaled_string(DECIMALS))
    }
}

/// Prints the amount in ether units with all 18 decimals.
impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_scaled_string(DECIMALS))
    }
}

/// Conversions ///

impl From<[u8; 32]> for FixedPoint {
    fn from(bytes: [u8; 32]) -> FixedPoint {
        U256::from(bytes).into()
    }
}

impl From<U256> for FixedPoint {
    fn from(u: U256) -> FixedPoint {
        FixedPoint(u)
    }
}

impl From<u128> for FixedPoint {
    fn from(u: u128) -> FixedPoint {
        FixedPoint(U256::from(u))
    }
}

impl From<FixedPoint> for U256 {
    fn from(f: FixedPoint) -> U256 {
        f.0
    }
}

/// Parses a decimal amount of whole tokens, e.g. `"250"` or `"0.03"`, into a
/// wad.
impl FromStr for FixedPoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<FixedPoint> {
        let s = s.trim();
        let (whole, fraction) = s.split_once('.').unwrap_or((s, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(eyre!("fixed-point: cannot parse an empty amount"));
        }
        if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return Err(eyre!("fixed-point: invalid amount {:?}", s));
        }
        if fraction.len() > DECIMALS {
            return Err(eyre!(
                "fixed-point: {:?} has more than {} decimals",
                s,
                DECIMALS
            ));
        }
        let digits = format!("{}{:0<width$}", whole, fraction, width = DECIMALS);
        let value = U256::from_dec_str(&digits)
            .map_err(|e| eyre!("fixed-point: failed to parse {:?}: {}", s, e))?;
        Ok(FixedPoint(value))
    }
}

/// Math ///

impl Add for FixedPoint {
    type Output = FixedPoint;

    fn add(self, other: FixedPoint) -> FixedPoint {
        FixedPoint(self.0 + other.0)
    }
}

impl AddAssign for FixedPoint {
    fn add_assign(&mut self, other: FixedPoint) {
        *self = *self + other;
    }
}

impl Sub for FixedPoint {
    type Output = FixedPoint;

    fn sub(self, other: FixedPoint) -> FixedPoint {
        FixedPoint(self.0 - other.0)
    }
}

impl SubAssign for FixedPoint {
    fn sub_assign(&mut self, other: FixedPoint) {
        *self = *self - other;
    }
}

/// Rounds down.
impl Mul for FixedPoint {
    type Output = FixedPoint;

    fn mul(self, other: FixedPoint) -> FixedPoint {
        self.mul_down(other)
    }
}

impl MulAssign for FixedPoint {
    fn mul_assign(&mut self, other: FixedPoint) {
        *self = *self * other;
    }
}

/// Rounds down.
impl Div for FixedPoint {
    type Output = FixedPoint;

    fn div(self, other: FixedPoint) -> FixedPoint {
        self.div_down(other)
    }
}

impl DivAssign for FixedPoint {
    fn div_assign(&mut self, other: FixedPoint) {
        *self = *self / other;
    }
}

impl FixedPoint {
    pub fn one() -> FixedPoint {
        fixed!(1e18)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn mul_div_down(self, other: FixedPoint, divisor: FixedPoint) -> FixedPoint {
        FixedPoint((self.0 * other.0) / divisor.0)
    }

    pub fn mul_down(self, other: FixedPoint) -> FixedPoint {
        self.mul_div_down(other, fixed!(1e18))
    }

    pub fn div_down(self, other: FixedPoint) -> FixedPoint {
        self.mul_div_down(fixed!(1e18), other)
    }

    /// Scales a float of whole tokens into a wad. Digits past the 18th
    /// decimal are truncated.
    pub fn from_f64(value: f64) -> Result<FixedPoint> {
        if !value.is_finite() || value < 0.0 {
            return Err(eyre!("fixed-point: cannot scale {} to a wad", value));
        }
        // `f64`'s `Display` never uses exponent notation, so the string is
        // always plain decimal digits.
        let repr = value.to_string();
        let repr = match repr.split_once('.') {
            Some((whole, fraction)) if fraction.len() > DECIMALS => {
                format!("{}.{}", whole, &fraction[..DECIMALS])
            }
            _ => repr,
        };
        repr.parse()
    }

    /// Converts the wad into a float of whole tokens. Precision is lost past
    /// roughly 15 significant digits.
    pub fn to_f64(self) -> f64 {
        self.to_scaled_string(DECIMALS)
            .parse::<f64>()
            .unwrap_or(f64::NAN)
    }

    /// Whole tokens with thousands separators, rounded half away from zero.
    /// `1234567.5e18` formats as `"1,234,568"`.
    pub fn format_rounded(self) -> String {
        let unit = uint256!(1e18);
        let whole = (self.0 + unit / 2) / unit;
        let digits = whole.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, digit) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }
        grouped
    }

    fn to_scaled_string(self, decimals: usize) -> String {
        let mut value = self.0;
        let mut digits = 0;
        let mut result = vec![];
        while value > uint256!(0) {
            if digits == decimals && decimals > 0 {
                result.push('.');
            }

            result.push(((value % uint256!(10)).low_u32() + 48) as u8 as char);
            value /= uint256!(10);
            digits += 1;
        }

        // Pad the fraction with leading zeros.
        if digits < decimals {
            result.resize(result.len() + decimals - digits, '0');
            digits = decimals;
        }

        // Add the decimal point and the leading zero of amounts below one.
        if digits == decimals {
            if decimals > 0 {
                result.push('.');
            }
            result.push('0');
        }

        result.iter().rev().collect()
    }
}

/// Sampling ///

impl Distribution<FixedPoint> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> FixedPoint {
        FixedPoint(U256::from(rng.gen::<[u8; 32]>()))
    }
}

pub struct UniformFixedPoint {
    low: FixedPoint,
    high: FixedPoint,
}

impl SampleUniform for FixedPoint {
    type Sampler = UniformFixedPoint;
}

impl UniformSampler for UniformFixedPoint {
    type X = FixedPoint;

    #[inline]
    fn new<B1, B2>(low_b: B1, high_b: B2) -> Self
    where
        B1: SampleBorrow<Self::X> + Sized,
        B2: SampleBorrow<Self::X> + Sized,
    {
        let low = *low_b.borrow();
        let high = *high_b.borrow();
        if low >= high {
            panic!("UniformFixedPoint::new called with invalid range");
        }
        UniformFixedPoint { low, high }
    }

    #[inline]
    fn new_inclusive<B1, B2>(low_b: B1, high_b: B2) -> Self
    where
        B1: SampleBorrow<Self::X> + Sized,
        B2: SampleBorrow<Self::X> + Sized,
    {
        let low = *low_b.borrow();
        let high = *high_b.borrow();
        if low > high {
            panic!("UniformFixedPoint::new_inclusive called with invalid range");
        }
        UniformFixedPoint::new(low, high + FixedPoint::from(1))
    }

    #[inline]
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> FixedPoint {
        let value = rng.gen::<FixedPoint>();
        let size: FixedPoint = self.high - self.low;
        FixedPoint::from(value.0 % size.0) + self.low
    }
}

use std::fmt;

const FRAC_BITS: u32 = 15;
const FRAC_MASK: u32 = (1 << FRAC_BITS) - 1;
// 2^-15 == 5^15 / 10^15, so every value has an exact 15 digit fraction.
const FIVE_POW_FRAC_BITS: u64 = 30_517_578_125;
const MAX_FRAC_DIGITS: usize = 30;

/// Unsigned fixed-point number with 15 fractional bits.
///
/// Used to compare two peak magnitudes without floating point, so the
/// classification of a hit is bit-for-bit identical on every target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Q15(u32);

impl Q15 {
    /// The value `1.0`.
    pub const ONE: Self = Self(1 << FRAC_BITS);
    /// The largest representable value. Division by zero saturates here.
    pub const MAX: Self = Self(u32::MAX);

    /// Creates a value from its raw representation (`value * 32768`).
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }
    /// Returns the raw representation.
    pub const fn raw(self) -> u32 {
        self.0
    }
    /// Converts a ratio to fixed point, truncating towards zero.
    ///
    /// Negative and NaN inputs become `0`; values too large to represent
    /// become [`Q15::MAX`].
    ///
    /// # Examples
    ///
    /// ```
    /// use drum_trigger::ratio::Q15;
    ///
    /// assert_eq!(Q15::from_f32(1.5).raw(), 49152);
    /// assert_eq!(Q15::from_f32(1.0), Q15::ONE);
    /// ```
    pub fn from_f32(ratio: f32) -> Self {
        // `as` saturates (and maps NaN to 0).
        Self((ratio * Self::ONE.0 as f32) as u32)
    }
    /// Builds a value from the integer part and the fractional digits of a
    /// decimal number, truncating the fraction to the nearest multiple of
    /// `2^-15` below it. Digits past the 30th are ignored.
    ///
    /// Returns `None` if `frac_digits` contains anything but ASCII digits or
    /// the value does not fit.
    ///
    /// # Examples
    ///
    /// ```
    /// use drum_trigger::ratio::Q15;
    ///
    /// assert_eq!(Q15::from_decimal(1, "5"), Some(Q15::from_raw(49152)));
    /// assert_eq!(Q15::from_decimal(131072, ""), None);
    /// ```
    pub fn from_decimal(int: u32, frac_digits: &str) -> Option<Self> {
        if !frac_digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let digits = &frac_digits.as_bytes()[..frac_digits.len().min(MAX_FRAC_DIGITS)];
        let numerator = digits
            .iter()
            .fold(0u128, |acc, b| acc * 10 + u128::from(b - b'0'));
        let scale = 10u128.pow(digits.len() as u32);
        // Below 2^15, so it fits a u32.
        let frac = ((numerator << FRAC_BITS) / scale) as u32;

        int.checked_mul(Self::ONE.0)?.checked_add(frac).map(Self)
    }
    /// Computes `numerator / denominator`.
    ///
    /// A zero denominator yields [`Q15::MAX`].
    ///
    /// # Examples
    ///
    /// ```
    /// use drum_trigger::ratio::Q15;
    ///
    /// assert_eq!(Q15::ratio(500, 480).raw(), 34133);
    /// assert_eq!(Q15::ratio(500, 0), Q15::MAX);
    /// ```
    pub fn ratio(numerator: u16, denominator: u16) -> Self {
        // A u16 shifted by 15 bits always fits in a u32.
        let scaled = u32::from(numerator) << FRAC_BITS;
        scaled
            .checked_div(u32::from(denominator))
            .map_or(Self::MAX, Self)
    }
}

impl fmt::Display for Q15 {
    /// Exact decimal form, without trailing zeros in the fraction.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let int = self.0 >> FRAC_BITS;
        let frac = u64::from(self.0 & FRAC_MASK) * FIVE_POW_FRAC_BITS;
        if frac == 0 {
            return write!(f, "{int}");
        }
        let digits = format!("{frac:015}");

        write!(f, "{int}.{}", digits.trim_end_matches('0'))
    }
}

//! SI unit prefixes and prefixed decimal quantities.
//!
//! A [`Prefixed`] pairs an exact decimal mantissa with a [`Prefix`], so that
//! quantities such as `5n`, `1.5µ` or `10k` are represented without binary
//! floating-point rounding. Equality and hashing are by value: `1000m` and
//! `1` compare equal and hash identically.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Mul;
use std::str::FromStr;

/// Enumerated SI prefixes, each standing for a power of ten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Prefix {
    /// 10^-24
    Yocto,
    /// 10^-21
    Zepto,
    /// 10^-18
    Atto,
    /// 10^-15
    Femto,
    /// 10^-12
    Pico,
    /// 10^-9
    Nano,
    /// 10^-6
    Micro,
    /// 10^-3
    Milli,
    /// 10^-2
    Centi,
    /// 10^-1
    Deci,
    /// 10^0
    Unit,
    /// 10^1
    Deca,
    /// 10^2
    Hecto,
    /// 10^3
    Kilo,
    /// 10^6
    Mega,
    /// 10^9
    Giga,
    /// 10^12
    Tera,
    /// 10^15
    Peta,
    /// 10^18
    Exa,
    /// 10^21
    Zetta,
    /// 10^24
    Yotta,
}

/// Suffix spellings accepted by the parser. Multi-character entries come first.
const SYMBOLS: &[(&str, Prefix)] = &[
    ("da", Prefix::Deca),
    ("y", Prefix::Yocto),
    ("z", Prefix::Zepto),
    ("a", Prefix::Atto),
    ("f", Prefix::Femto),
    ("p", Prefix::Pico),
    ("n", Prefix::Nano),
    ("µ", Prefix::Micro),
    ("μ", Prefix::Micro),
    ("u", Prefix::Micro),
    ("m", Prefix::Milli),
    ("c", Prefix::Centi),
    ("d", Prefix::Deci),
    ("h", Prefix::Hecto),
    ("k", Prefix::Kilo),
    ("K", Prefix::Kilo),
    ("M", Prefix::Mega),
    ("G", Prefix::Giga),
    ("T", Prefix::Tera),
    ("P", Prefix::Peta),
    ("E", Prefix::Exa),
    ("Z", Prefix::Zetta),
    ("Y", Prefix::Yotta),
];

impl Prefix {
    /// All prefixes in ascending exponent order.
    pub const ALL: [Prefix; 21] = [
        Prefix::Yocto,
        Prefix::Zepto,
        Prefix::Atto,
        Prefix::Femto,
        Prefix::Pico,
        Prefix::Nano,
        Prefix::Micro,
        Prefix::Milli,
        Prefix::Centi,
        Prefix::Deci,
        Prefix::Unit,
        Prefix::Deca,
        Prefix::Hecto,
        Prefix::Kilo,
        Prefix::Mega,
        Prefix::Giga,
        Prefix::Tera,
        Prefix::Peta,
        Prefix::Exa,
        Prefix::Zetta,
        Prefix::Yotta,
    ];

    /// The power-of-ten exponent this prefix stands for.
    pub fn exponent(self) -> i32 {
        match self {
            Prefix::Yocto => -24,
            Prefix::Zepto => -21,
            Prefix::Atto => -18,
            Prefix::Femto => -15,
            Prefix::Pico => -12,
            Prefix::Nano => -9,
            Prefix::Micro => -6,
            Prefix::Milli => -3,
            Prefix::Centi => -2,
            Prefix::Deci => -1,
            Prefix::Unit => 0,
            Prefix::Deca => 1,
            Prefix::Hecto => 2,
            Prefix::Kilo => 3,
            Prefix::Mega => 6,
            Prefix::Giga => 9,
            Prefix::Tera => 12,
            Prefix::Peta => 15,
            Prefix::Exa => 18,
            Prefix::Zetta => 21,
            Prefix::Yotta => 24,
        }
    }

    /// Returns the prefix for exponent `exp`, if one exists.
    pub fn from_exp(exp: i32) -> Option<Prefix> {
        Self::ALL.iter().copied().find(|p| p.exponent() == exp)
    }

    /// The canonical suffix used when displaying a [`Prefixed`].
    pub fn symbol(self) -> &'static str {
        match self {
            Prefix::Unit => "",
            Prefix::Micro => "µ",
            Prefix::Kilo => "k",
            other => SYMBOLS
                .iter()
                .find(|(_, p)| *p == other)
                .map(|(s, _)| *s)
                .unwrap_or(""),
        }
    }
}

/// Error produced when a string or float cannot be turned into a [`Prefixed`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid prefixed number: '{input}'")]
pub struct ParsePrefixedError {
    /// The offending input, as text.
    pub input: String,
}

impl ParsePrefixedError {
    fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// An exact decimal number scaled by an SI [`Prefix`].
#[derive(Clone, Copy, Serialize, Deserialize)]
pub struct Prefixed {
    /// The decimal mantissa.
    pub number: Decimal,
    /// The power-of-ten prefix.
    pub prefix: Prefix,
}

impl Prefixed {
    /// Creates a new prefixed quantity.
    pub fn new(number: impl Into<Decimal>, prefix: Prefix) -> Self {
        Self {
            number: number.into(),
            prefix,
        }
    }

    /// Creates an unprefixed integer quantity.
    pub fn from_int(value: i64) -> Self {
        Self::new(value, Prefix::Unit)
    }

    /// Converts a float, choosing the engineering prefix (a multiple of three)
    /// that keeps the mantissa in `[1, 1000)`.
    ///
    /// The float's shortest round-trip decimal representation is used, so
    /// `1e-6` becomes exactly `1µ` rather than a binary approximation.
    pub fn from_f64(value: f64) -> Result<Self, ParsePrefixedError> {
        if !value.is_finite() {
            return Err(ParsePrefixedError::new(value.to_string()));
        }
        let sci = format!("{value:e}");
        let (mant, exp) = sci
            .split_once('e')
            .ok_or_else(|| ParsePrefixedError::new(sci.clone()))?;
        let mant = Decimal::from_str(mant).map_err(|_| ParsePrefixedError::new(sci.clone()))?;
        let exp: i32 = exp.parse().map_err(|_| ParsePrefixedError::new(sci.clone()))?;
        Self::from_parts(mant, exp).ok_or_else(|| ParsePrefixedError::new(sci))
    }

    /// Builds `mant * 10^exp` with an engineering prefix.
    fn from_parts(mant: Decimal, exp: i32) -> Option<Self> {
        let eng = (exp.div_euclid(3) * 3).clamp(-24, 24);
        let number = shift_decimal(mant, exp - eng)?;
        Some(Self::new(number.normalize(), Prefix::from_exp(eng)?))
    }

    /// Approximates the quantity as an `f64`.
    pub fn to_f64(&self) -> f64 {
        self.number.to_f64().unwrap_or(f64::NAN) * 10f64.powi(self.prefix.exponent())
    }

    /// Re-expresses the same value with prefix `prefix`.
    ///
    /// Returns `None` if the rescaled mantissa does not fit a [`Decimal`].
    pub fn scale_to(&self, prefix: Prefix) -> Option<Self> {
        let number = shift_decimal(self.number, self.prefix.exponent() - prefix.exponent())?;
        Some(Self::new(number.normalize(), prefix))
    }

    /// Returns `true` for values strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        self.number.is_sign_positive() && !self.number.is_zero()
    }

    /// Canonical `(mantissa, exponent)` pair with no trailing decimal zeros.
    ///
    /// Two values are equal exactly when their canonical pairs are equal.
    fn canonical(&self) -> (i128, i32) {
        let n = self.number.normalize();
        let mut mantissa = n.mantissa();
        if mantissa == 0 {
            return (0, 0);
        }
        let mut exp = self.prefix.exponent() - n.scale() as i32;
        while mantissa % 10 == 0 {
            mantissa /= 10;
            exp += 1;
        }
        (mantissa, exp)
    }
}

/// Multiplies (positive `shift`) or divides `value` by `10^|shift|`.
fn shift_decimal(value: Decimal, shift: i32) -> Option<Decimal> {
    let mut out = value;
    for _ in 0..shift.unsigned_abs() {
        out = if shift > 0 {
            out.checked_mul(Decimal::TEN)?
        } else {
            out.checked_div(Decimal::TEN)?
        };
    }
    Some(out)
}

/// Parses plain (`1.5`) or scientific (`2e-9`) decimal text.
fn parse_number(text: &str) -> Option<Prefixed> {
    if text.is_empty() {
        return None;
    }
    match text.find(['e', 'E']) {
        Some(pos) => {
            let mant = Decimal::from_str(&text[..pos]).ok()?;
            let exp: i32 = text[pos + 1..].parse().ok()?;
            Prefixed::from_parts(mant, exp)
        }
        None => Decimal::from_str(text)
            .ok()
            .map(|d| Prefixed::new(d, Prefix::Unit)),
    }
}

impl PartialEq for Prefixed {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for Prefixed {}

impl Hash for Prefixed {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl fmt::Debug for Prefixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Prefixed({self})")
    }
}

impl fmt::Display for Prefixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.number.normalize(), self.prefix.symbol())
    }
}

impl FromStr for Prefixed {
    type Err = ParsePrefixedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(p) = parse_number(s) {
            return Ok(p);
        }
        for (symbol, prefix) in SYMBOLS {
            if let Some(num) = s.strip_suffix(symbol) {
                if let Some(p) = parse_number(num.trim()) {
                    let number = shift_decimal(p.number, p.prefix.exponent())
                        .ok_or_else(|| ParsePrefixedError::new(s))?;
                    return Ok(Self::new(number.normalize(), *prefix));
                }
            }
        }
        Err(ParsePrefixedError::new(s))
    }
}

impl From<i64> for Prefixed {
    fn from(value: i64) -> Self {
        Self::from_int(value)
    }
}

impl From<Decimal> for Prefixed {
    fn from(value: Decimal) -> Self {
        Self::new(value, Prefix::Unit)
    }
}

impl Mul<Prefix> for i64 {
    type Output = Prefixed;

    fn mul(self, rhs: Prefix) -> Prefixed {
        Prefixed::new(self, rhs)
    }
}

impl Mul<Prefix> for Decimal {
    type Output = Prefixed;

    fn mul(self, rhs: Prefix) -> Prefixed {
        Prefixed::new(self, rhs)
    }
}

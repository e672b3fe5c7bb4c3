use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// How free-text manual coordinates are turned into a [`Coordinate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManualParsePolicy {
    /// Both strings must parse to finite numbers, otherwise there is no
    /// manual coordinate.
    #[default]
    Strict,
    /// Any complete pair resolves; text that does not parse becomes `NaN`.
    ///
    /// Like a browser's numeric coercion, `0x`, `0o` and `0b` integer
    /// literals are read in their radix. Decimal text follows Rust's float
    /// grammar, so spellings such as `inf` parse where a browser gives `NaN`.
    Lenient,
}

impl FromStr for ManualParsePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(format!(
                "unknown manual coordinate policy '{other}'; expected 'strict' or 'lenient'"
            )),
        }
    }
}

impl std::fmt::Display for ManualParsePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Lenient => write!(f, "lenient"),
        }
    }
}

/// The two free-text boxes shown while manual mode is on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualCoordinateInput {
    pub lat: String,
    pub lng: String,
}

impl ManualCoordinateInput {
    #[must_use]
    pub fn new(lat: impl Into<String>, lng: impl Into<String>) -> Self {
        Self {
            lat: lat.into(),
            lng: lng.into(),
        }
    }

    /// Both boxes hold some text. Says nothing about whether it parses.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.lat.is_empty() && !self.lng.is_empty()
    }

    /// Parse the pair under `policy`. Incomplete input never resolves.
    #[must_use]
    pub fn resolve(&self, policy: ManualParsePolicy) -> Option<Coordinate> {
        if !self.is_complete() {
            return None;
        }
        match policy {
            ManualParsePolicy::Strict => {
                let lat = parse_finite(&self.lat)?;
                let lng = parse_finite(&self.lng)?;
                Some(Coordinate::new(lat, lng))
            }
            ManualParsePolicy::Lenient => Some(Coordinate::new(
                parse_or_nan(&self.lat),
                parse_or_nan(&self.lng),
            )),
        }
    }
}

fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_or_nan(raw: &str) -> f64 {
    let raw = raw.trim();
    parse_prefixed_integer(raw).unwrap_or_else(|| raw.parse::<f64>().unwrap_or(f64::NAN))
}

/// Unsigned `0x1A` / `0o17` / `0b101` literals. `None` when there is no
/// radix prefix; `NaN` when the prefix is followed by no or bad digits.
fn parse_prefixed_integer(raw: &str) -> Option<f64> {
    let radix = match raw.get(..2)? {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    let digits = &raw[2..];
    if digits.is_empty() {
        return Some(f64::NAN);
    }
    let value = digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix)
            .map(|d| acc * f64::from(radix) + f64::from(d))
    });
    Some(value.unwrap_or(f64::NAN))
}

//! Assign routes to relative risk bands.
//!
//! Bands are relative to the candidates of a single request: the safest
//! candidate is not necessarily safe in absolute terms. Two policies exist.
//! The crime-only flow bands routes by mean risk, the combined flow by
//! safety rating.

use std::fmt;

/// Relative risk band of a route within one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RiskLevel {
    /// Safest third of the request.
    Low,
    /// Middle third of the request.
    Medium,
    /// Riskiest third of the request.
    High,
}

impl RiskLevel {
    /// Bands in selection priority order.
    pub const PRIORITY: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Band name as shown to travellers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const LOW_CUTOFF: f64 = 0.33;
const HIGH_CUTOFF: f64 = 0.66;
const RATING_EPSILON: f64 = 1e-6;

/// Band routes by mean crime risk.
///
/// Risks are min-max normalised over the request. A normalised risk below
/// 0.33 is [`RiskLevel::Low`], below 0.66 [`RiskLevel::Medium`], and
/// anything else [`RiskLevel::High`]. When every risk is effectively equal
/// all routes are Low.
///
/// # Examples
/// ```
/// use saferoute_core::{RiskLevel, classify_by_risk};
///
/// let levels = classify_by_risk(&[0.2, 0.5, 0.8]);
/// assert_eq!(levels, vec![RiskLevel::Low, RiskLevel::Medium, RiskLevel::High]);
/// assert_eq!(classify_by_risk(&[0.4, 0.4]), vec![RiskLevel::Low; 2]);
/// ```
#[must_use]
#[expect(clippy::float_arithmetic, reason = "min-max normalisation")]
pub fn classify_by_risk(risks: &[f64]) -> Vec<RiskLevel> {
    let Some((min, max)) = bounds(risks) else {
        return Vec::new();
    };
    if is_close(max, min) {
        return vec![RiskLevel::Low; risks.len()];
    }
    let span = max - min;
    risks
        .iter()
        .map(|&risk| {
            let norm = (risk - min) / span;
            if norm < LOW_CUTOFF {
                RiskLevel::Low
            } else if norm < HIGH_CUTOFF {
                RiskLevel::Medium
            } else {
                RiskLevel::High
            }
        })
        .collect()
}

/// Band routes by composite safety rating, where higher is safer.
///
/// Ratings are normalised as `(r - min) / (max - min + 1e-6)`. A normalised
/// rating above 0.66 is [`RiskLevel::Low`], above 0.33
/// [`RiskLevel::Medium`], and anything else [`RiskLevel::High`].
///
/// Ratings that are all equal within floating-point tolerance band every
/// route Low, ahead of the epsilon-widened span.
///
/// # Examples
/// ```
/// use saferoute_core::{RiskLevel, classify_by_rating};
///
/// let levels = classify_by_rating(&[4.5, 1.0, 2.7]);
/// assert_eq!(levels, vec![RiskLevel::Low, RiskLevel::High, RiskLevel::Medium]);
/// ```
#[must_use]
#[expect(clippy::float_arithmetic, reason = "min-max normalisation")]
pub fn classify_by_rating(ratings: &[f64]) -> Vec<RiskLevel> {
    let Some((min, max)) = bounds(ratings) else {
        return Vec::new();
    };
    if is_close(max, min) {
        return vec![RiskLevel::Low; ratings.len()];
    }
    let span = max - min + RATING_EPSILON;
    ratings
        .iter()
        .map(|&rating| {
            let norm = (rating - min) / span;
            if norm > HIGH_CUTOFF {
                RiskLevel::Low
            } else if norm > LOW_CUTOFF {
                RiskLevel::Medium
            } else {
                RiskLevel::High
            }
        })
        .collect()
}

fn bounds(values: &[f64]) -> Option<(f64, f64)> {
    let (&first, rest) = values.split_first()?;
    Some(
        rest.iter()
            .fold((first, first), |(lo, hi), &value| (lo.min(value), hi.max(value))),
    )
}

/// Relative-or-absolute closeness, `|a - b| <= 1e-8 + 1e-5 * |b|`.
#[expect(clippy::float_arithmetic, reason = "tolerance comparison")]
fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-5_f64.mul_add(b.abs(), 1e-8)
}

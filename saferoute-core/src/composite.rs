//! Blend crime risk and lighting into a single safety rating.

/// Weight of the inverted crime risk in the combined score.
pub const SAFETY_WEIGHT: f64 = 0.6;

/// Weight of the lighting ratio in the combined score.
pub const LIGHTING_WEIGHT: f64 = 0.4;

/// Upper bound of the rating scale.
pub const RATING_SCALE: f64 = 5.0;

/// Combined score and the rating derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeScore {
    /// Weighted blend of safety and lighting, nominally in `0.0..=1.0`.
    pub combined: f64,
    /// Combined score on a 0 to 5 scale, one decimal place.
    pub rating: f64,
}

impl CompositeScore {
    /// Score a route from its mean crime risk and lighting ratio.
    ///
    /// # Examples
    /// ```
    /// use saferoute_core::CompositeScore;
    ///
    /// assert_eq!(CompositeScore::new(0.0, 1.0).rating, 5.0);
    /// assert_eq!(CompositeScore::new(1.0, 0.0).rating, 0.0);
    /// assert_eq!(CompositeScore::new(0.2, 0.5).rating, 3.4);
    /// ```
    #[must_use]
    pub fn new(mean_risk: f64, lighting_ratio: f64) -> Self {
        let combined = combined_score(mean_risk, lighting_ratio);
        Self {
            combined,
            rating: safety_rating(combined),
        }
    }
}

/// `(1 - mean_risk) * 0.6 + lighting_ratio * 0.4`.
///
/// Inputs are not clamped; risks above one yield a negative contribution.
#[must_use]
#[expect(clippy::float_arithmetic, reason = "weighted blend of two scores")]
pub fn combined_score(mean_risk: f64, lighting_ratio: f64) -> f64 {
    (1.0 - mean_risk).mul_add(SAFETY_WEIGHT, lighting_ratio * LIGHTING_WEIGHT)
}

/// Scale a combined score to 0 to 5 and round to one decimal place.
///
/// Halfway cases round to even on the scaled value.
#[must_use]
#[expect(clippy::float_arithmetic, reason = "scaling and decimal rounding")]
pub fn safety_rating(combined: f64) -> f64 {
    (combined * RATING_SCALE * 10.0).round_ties_even() / 10.0
}

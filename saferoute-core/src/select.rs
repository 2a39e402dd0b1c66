//! Pick a small, risk-diverse subset of scored routes.
//!
//! The selector first takes the lowest-risk member of each band in
//! [`RiskLevel::PRIORITY`] order, so a traveller sees one option per band
//! where the request allows it. Remaining slots are filled with the
//! lowest-risk routes not yet chosen.

use std::cmp::Ordering;

use crate::{RiskLevel, ScoredRoute};

/// Number of routes returned when no explicit cap is given.
pub const DEFAULT_SELECTION_CAP: usize = 3;

/// Properties the selector ranks routes by.
pub trait Rankable {
    /// Band assigned by the classifier.
    fn risk_level(&self) -> RiskLevel;
    /// Mean crime risk; lower is preferred.
    fn mean_risk(&self) -> f64;
}

impl Rankable for ScoredRoute {
    fn risk_level(&self) -> RiskLevel {
        self.risk_level
    }

    fn mean_risk(&self) -> f64 {
        self.mean_risk
    }
}

/// Final ordering applied to a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionOrder {
    /// Band representatives first, then fill routes by ascending risk.
    #[default]
    BandPriority,
    /// Highest safety rating first. Routes without a rating sort last and
    /// ties keep band-priority order.
    SafetyRatingDescending,
}

impl SelectionOrder {
    /// Reorder `routes` in place.
    pub fn apply(self, routes: &mut [ScoredRoute]) {
        match self {
            Self::BandPriority => {}
            Self::SafetyRatingDescending => {
                routes.sort_by(|a, b| compare_ratings(b.safety_rating, a.safety_rating));
            }
        }
    }
}

fn compare_ratings(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// Positions of the routes [`select_diverse`] would keep, in selection
/// order.
///
/// Ties on `mean_risk` resolve to the earlier route.
#[must_use]
pub fn select_indices<T: Rankable>(routes: &[T], cap: usize) -> Vec<usize> {
    let limit = cap.min(routes.len());
    let mut chosen: Vec<usize> = Vec::with_capacity(limit);

    for level in RiskLevel::PRIORITY {
        if chosen.len() >= limit {
            break;
        }
        let representative = routes
            .iter()
            .enumerate()
            .filter(|(_, route)| route.risk_level() == level)
            .min_by(|(_, a), (_, b)| a.mean_risk().total_cmp(&b.mean_risk()))
            .map(|(index, _)| index);
        chosen.extend(representative);
    }

    let mut remaining: Vec<(usize, f64)> = routes
        .iter()
        .enumerate()
        .filter(|(index, _)| !chosen.contains(index))
        .map(|(index, route)| (index, route.mean_risk()))
        .collect();
    remaining.sort_by(|(_, a), (_, b)| a.total_cmp(b));
    let open = limit.saturating_sub(chosen.len());
    chosen.extend(remaining.into_iter().take(open).map(|(index, _)| index));
    chosen
}

/// Keep at most `cap` routes, one per risk band first.
///
/// The result holds `min(cap, routes.len())` distinct routes.
///
/// # Examples
/// ```
/// use saferoute_core::select::{Rankable, select_diverse};
/// use saferoute_core::RiskLevel;
///
/// #[derive(Debug, PartialEq)]
/// struct Route(&'static str, RiskLevel, f64);
///
/// impl Rankable for Route {
///     fn risk_level(&self) -> RiskLevel { self.1 }
///     fn mean_risk(&self) -> f64 { self.2 }
/// }
///
/// let picked = select_diverse(
///     vec![
///         Route("a", RiskLevel::Low, 0.20),
///         Route("b", RiskLevel::Low, 0.10),
///         Route("c", RiskLevel::High, 0.90),
///         Route("d", RiskLevel::Low, 0.15),
///     ],
///     3,
/// );
/// let names: Vec<_> = picked.iter().map(|route| route.0).collect();
/// assert_eq!(names, vec!["b", "c", "d"]);
/// ```
#[must_use]
pub fn select_diverse<T: Rankable>(routes: Vec<T>, cap: usize) -> Vec<T> {
    let order = select_indices(&routes, cap);
    let mut slots: Vec<Option<T>> = routes.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|index| slots.get_mut(index).and_then(Option::take))
        .collect()
}

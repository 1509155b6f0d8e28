//! Rating statistics.
//!
//! Storage hands back `(star value, count)` pairs grouped from the current
//! rating rows; everything else (totals, means, rounding) is derived here so
//! the arithmetic is the same for a single store and for the whole platform.

use serde::Serialize;

/// Count of ratings per star value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StarBreakdown {
    pub five_star: u64,
    pub four_star: u64,
    pub three_star: u64,
    pub two_star: u64,
    pub one_star: u64,
}

impl StarBreakdown {
    /// Folds grouped counts into a histogram. Values outside 1..=5 are
    /// ignored; the schema never produces them.
    #[must_use]
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (i32, i64)>,
    {
        let mut breakdown = Self::default();
        for (value, count) in counts {
            let count = u64::try_from(count).unwrap_or(0);
            match value {
                5 => breakdown.five_star += count,
                4 => breakdown.four_star += count,
                3 => breakdown.three_star += count,
                2 => breakdown.two_star += count,
                1 => breakdown.one_star += count,
                _ => {}
            }
        }
        breakdown
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.five_star + self.four_star + self.three_star + self.two_star + self.one_star
    }

    #[must_use]
    pub const fn star_sum(&self) -> u64 {
        5 * self.five_star + 4 * self.four_star + 3 * self.three_star + 2 * self.two_star
            + self.one_star
    }

    /// Arithmetic mean, or `None` when there are no ratings.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean(&self) -> Option<f64> {
        match self.total() {
            0 => None,
            total => Some(self.star_sum() as f64 / total as f64),
        }
    }
}

/// Formats a mean to one decimal place; no ratings renders as `"0.0"`.
/// Ties round away from zero (`4.25` is `"4.3"`), unlike `{:.1}` alone.
#[must_use]
pub fn format_average(mean: Option<f64>) -> String {
    let rounded = (mean.unwrap_or(0.0) * 10.0).round() / 10.0;
    format!("{rounded:.1}")
}

/// Per-store statistics, always derived from the rows present at call time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub total_ratings: u64,
    pub average_rating: String,
    pub star_breakdown: StarBreakdown,
}

impl StoreStats {
    #[must_use]
    pub fn from_breakdown(star_breakdown: StarBreakdown) -> Self {
        Self {
            total_ratings: star_breakdown.total(),
            average_rating: format_average(star_breakdown.mean()),
            star_breakdown,
        }
    }

    #[must_use]
    pub fn has_ratings(&self) -> bool {
        self.total_ratings > 0
    }
}

/// Rows created within the trailing statistics window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecentActivity {
    pub users_this_month: u64,
    pub stores_this_month: u64,
    pub ratings_this_month: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleBreakdown {
    pub admins: u64,
    pub store_owners: u64,
    pub users: u64,
}

/// Platform-wide rollup for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformStats {
    pub total_users: u64,
    pub total_stores: u64,
    pub total_ratings: u64,
    pub recent_activity: RecentActivity,
    /// Mean over every rating row, not a mean of per-store means.
    pub average_platform_rating: String,
    pub users_by_role: RoleBreakdown,
}

/// Mean of the per-store means, counting only stores that have ratings.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_of_rated(breakdowns: &[StarBreakdown]) -> String {
    let means: Vec<f64> = breakdowns.iter().filter_map(StarBreakdown::mean).collect();
    if means.is_empty() {
        return format_average(None);
    }
    format_average(Some(means.iter().sum::<f64>() / means.len() as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_has_zero_average() {
        let stats = StoreStats::from_breakdown(StarBreakdown::from_counts(Vec::new()));
        assert_eq!(stats.total_ratings, 0);
        assert_eq!(stats.average_rating, "0.0");
        assert_eq!(stats.star_breakdown, StarBreakdown::default());
        assert!(!stats.has_ratings());
    }

    #[test]
    fn test_single_five_star() {
        let stats = StoreStats::from_breakdown(StarBreakdown::from_counts([(5, 1)]));
        assert_eq!(stats.total_ratings, 1);
        assert_eq!(stats.average_rating, "5.0");
        assert_eq!(stats.star_breakdown.five_star, 1);
    }

    #[test]
    fn test_breakdown_sums_to_total() {
        let breakdown = StarBreakdown::from_counts([(1, 2), (3, 4), (4, 1), (5, 3)]);
        let stats = StoreStats::from_breakdown(breakdown);
        assert_eq!(stats.total_ratings, 10);
        assert_eq!(breakdown.total(), stats.total_ratings);
        // (2 + 12 + 4 + 15) / 10
        assert_eq!(stats.average_rating, "3.3");
    }

    #[test]
    fn test_average_rounds_to_one_decimal() {
        let breakdown = StarBreakdown::from_counts([(4, 2), (5, 1)]);
        assert_eq!(StoreStats::from_breakdown(breakdown).average_rating, "4.3");

        let breakdown = StarBreakdown::from_counts([(1, 1), (2, 2)]);
        assert_eq!(StoreStats::from_breakdown(breakdown).average_rating, "1.7");
    }

    #[test]
    fn test_average_ties_round_up() {
        // 17 / 4 = 4.25
        let breakdown = StarBreakdown::from_counts([(4, 3), (5, 1)]);
        assert_eq!(StoreStats::from_breakdown(breakdown).average_rating, "4.3");

        // 5 / 4 = 1.25
        let breakdown = StarBreakdown::from_counts([(1, 3), (2, 1)]);
        assert_eq!(StoreStats::from_breakdown(breakdown).average_rating, "1.3");

        let rated = StarBreakdown::from_counts([(3, 1), (4, 1), (5, 2)]);
        assert_eq!(average_of_rated(&[rated, StarBreakdown::default()]), "4.3");
    }

    #[test]
    fn test_out_of_range_values_ignored() {
        let breakdown = StarBreakdown::from_counts([(0, 3), (6, 1), (2, 1)]);
        assert_eq!(breakdown.total(), 1);
        assert_eq!(breakdown.two_star, 1);
    }

    #[test]
    fn test_average_of_rated_skips_unrated_stores() {
        let rated = StarBreakdown::from_counts([(4, 1)]);
        let also_rated = StarBreakdown::from_counts([(5, 1)]);
        let unrated = StarBreakdown::default();
        assert_eq!(average_of_rated(&[rated, unrated, also_rated]), "4.5");
        assert_eq!(average_of_rated(&[unrated, unrated]), "0.0");
        assert_eq!(average_of_rated(&[]), "0.0");
    }
}

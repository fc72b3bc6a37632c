//! Fitness-sample statistics.
//!
//! Two things the trainer wants to know about a generation's scores: what
//! the distribution looks like ([`FitnessSummary`], surfaced in generation
//! reports), and whether the best fitness is still moving ([`improvement`],
//! the measure the adaptive mutation controller feeds its plateau check).

/// Distribution of one generation's fitness scores.
///
/// `spread` and `std_dev` together read as a diversity signal: a generation
/// whose scores have collapsed onto a narrow band is breeding from
/// near-identical strategies, however high its best fitness is.
#[derive(Debug, Clone)]
pub struct FitnessSummary {
    /// Lowest score in the generation (stalemates push this negative).
    pub worst: f32,
    /// Highest score in the generation.
    pub best: f32,
    pub mean: f32,
    pub median: f32,
    pub std_dev: f32,
}

impl FitnessSummary {
    /// Summarizes a generation's scores, in any order.
    ///
    /// Returns `None` for an empty generation. The median of an even-sized
    /// generation is the midpoint of the two middle scores.
    ///
    /// # Examples
    ///
    /// ```
    /// # use kumite_stats::FitnessSummary;
    /// let scores = [447.0, -86.5, 512.0, 447.0];
    /// let summary = FitnessSummary::from_scores(scores).unwrap();
    /// assert_eq!(summary.best, 512.0);
    /// assert_eq!(summary.worst, -86.5);
    /// assert_eq!(summary.median, 447.0);
    /// assert_eq!(summary.spread(), 598.5);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_scores<I>(scores: I) -> Option<Self>
    where
        I: IntoIterator<Item = f32>,
    {
        let mut scores: Vec<f32> = scores.into_iter().collect();
        if scores.is_empty() {
            return None;
        }

        let n = scores.len() as f32;
        let mut worst = f32::INFINITY;
        let mut best = f32::NEG_INFINITY;
        let mut sum = 0.0;
        for &score in &scores {
            worst = worst.min(score);
            best = best.max(score);
            sum += score;
        }
        let mean = sum / n;
        let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f32>() / n;

        // Median by selection; no need to sort the whole generation.
        let len = scores.len();
        let mid = len / 2;
        let (below, upper, _) = scores.select_nth_unstable_by(mid, f32::total_cmp);
        let upper = *upper;
        let median = if len % 2 == 0 {
            let lower = below.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            f32::midpoint(lower, upper)
        } else {
            upper
        };

        Some(Self {
            worst,
            best,
            mean,
            median,
            std_dev: variance.sqrt(),
        })
    }

    /// Distance between the strongest and weakest genome of the generation.
    #[must_use]
    pub fn spread(&self) -> f32 {
        self.best - self.worst
    }
}

/// How much the best fitness moved from `old` to `new`.
///
/// Relative to `old` when the baseline is positive; the raw difference when
/// it is zero or negative (a ratio against a non-positive baseline is
/// meaningless — early generations routinely sit below zero on stalemate
/// penalties). The mutation controller compares this against its plateau
/// threshold.
#[must_use]
pub fn improvement(old: f32, new: f32) -> f32 {
    if old > 0.0 { (new - old) / old } else { new - old }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_generation_has_no_summary() {
        assert!(FitnessSummary::from_scores([]).is_none());
    }

    #[test]
    fn test_single_genome_generation() {
        let summary = FitnessSummary::from_scores([447.0]).unwrap();
        assert_eq!(summary.best, 447.0);
        assert_eq!(summary.worst, 447.0);
        assert_eq!(summary.median, 447.0);
        assert_eq!(summary.std_dev, 0.0);
        assert_eq!(summary.spread(), 0.0);
    }

    #[test]
    fn test_summary_of_a_mixed_generation() {
        // A stalemate loser, two mid-field genomes, one champion.
        let summary = FitnessSummary::from_scores([-100.0, 200.0, 300.0, 800.0]).unwrap();
        assert_eq!(summary.worst, -100.0);
        assert_eq!(summary.best, 800.0);
        assert_eq!(summary.mean, 300.0);
        assert_eq!(summary.median, 250.0);
        assert_eq!(summary.spread(), 900.0);
    }

    #[test]
    fn test_odd_generation_median_is_the_middle_score() {
        let summary = FitnessSummary::from_scores([5.0, 1.0, 9.0]).unwrap();
        assert_eq!(summary.median, 5.0);
    }

    #[test]
    fn test_improvement_is_relative_to_a_positive_baseline() {
        assert!((improvement(50.0, 54.0) - 0.08).abs() < 1e-6);
        assert!((improvement(80.0, 80.0)).abs() < 1e-6);
    }

    #[test]
    fn test_improvement_is_absolute_below_zero_baseline() {
        assert!((improvement(0.0, 3.0) - 3.0).abs() < 1e-6);
        assert!((improvement(-10.0, -9.5) - 0.5).abs() < 1e-6);
    }
}

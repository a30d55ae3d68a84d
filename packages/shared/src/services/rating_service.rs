/// K-factor: maximum possible adjustment per game.
const K_FACTOR: f64 = 32.0;

/// Stateless Elo rating math, consumed after a match ends. Owns no state and
/// touches no storage.
#[derive(Clone)]
pub struct RatingService;

impl RatingService {
    pub fn new() -> Self {
        RatingService
    }

    /// Expected score for player A against player B.
    pub fn expected_score(&self, rating_a: f64, rating_b: f64) -> f64 {
        1.0 / (1.0 + 10f64.powf((rating_b - rating_a) / 400.0))
    }

    /// New rating for player A given the actual score against player B
    /// (1.0 for a win, 0.5 for a draw, 0.0 for a loss).
    pub fn update_rating(&self, rating_a: f64, rating_b: f64, score_a: f64) -> f64 {
        let expected_a = self.expected_score(rating_a, rating_b);
        rating_a + K_FACTOR * (score_a - expected_a)
    }
}

impl Default for RatingService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_equal_ratings_have_even_expectation() {
        let service = RatingService::new();

        let expected = service.expected_score(1500.0, 1500.0);

        assert!((expected - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_equal_ratings_winner_gains_half_k() {
        let service = RatingService::new();

        let updated = service.update_rating(1500.0, 1500.0, 1.0);

        assert!((updated - 1516.0).abs() < 1e-9);
    }

    #[test]
    fn test_underdog_gains_more_from_a_win() {
        let service = RatingService::new();

        let underdog_gain = service.update_rating(1200.0, 1600.0, 1.0) - 1200.0;
        let favorite_gain = service.update_rating(1600.0, 1200.0, 1.0) - 1600.0;

        assert!(underdog_gain > favorite_gain);
    }

    #[test]
    fn test_loss_costs_rating() {
        let service = RatingService::new();

        let updated = service.update_rating(1500.0, 1500.0, 0.0);

        assert!(updated < 1500.0);
    }

    proptest! {
        #[test]
        fn prop_expected_scores_sum_to_one(
            rating_a in 0.0f64..3000.0,
            rating_b in 0.0f64..3000.0,
        ) {
            let service = RatingService::new();
            let sum = service.expected_score(rating_a, rating_b)
                + service.expected_score(rating_b, rating_a);
            prop_assert!((sum - 1.0).abs() < 1e-9);
        }

        #[test]
        fn prop_adjustment_is_bounded_by_k(
            rating_a in 0.0f64..3000.0,
            rating_b in 0.0f64..3000.0,
            score in 0.0f64..=1.0,
        ) {
            let service = RatingService::new();
            let delta = (service.update_rating(rating_a, rating_b, score) - rating_a).abs();
            prop_assert!(delta <= K_FACTOR + 1e-9);
        }
    }
}

use digit_oracle::error::PredictError;
use digit_oracle::predictor::{DigitPredictor, PredictorConfig};

fn pseudo_random_digits(n: usize, seed: u64) -> Vec<u8> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((state >> 33) % 10) as u8
        })
        .collect()
}

#[test]
/// The distribution is a proper probability vector and the chosen digit is
/// its argmax.
fn distribution_is_normalized_and_digit_is_argmax() {
    let predictor = DigitPredictor::default();
    for seed in [1u64, 7, 42, 1234] {
        let digits = pseudo_random_digits(100, seed);
        let forecast = predictor.forecast(&digits).unwrap();

        let sum: f64 = forecast.distribution.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9, "sum was {sum}");
        assert!(forecast.distribution.iter().all(|p| *p > 0.0));
        assert!(forecast.confidence <= 100);

        let best = forecast.distribution[usize::from(forecast.digit)];
        assert!(forecast.distribution.iter().all(|p| *p <= best));
    }
}

#[test]
fn fewer_than_min_history_is_insufficient() {
    let predictor = DigitPredictor::default();
    assert_eq!(
        predictor.forecast(&[]).unwrap_err(),
        PredictError::InsufficientData { have: 0, need: 20 }
    );
    assert!(predictor.forecast(&[4; 20]).is_ok());
}

#[test]
/// Alternating 5/7: the transition term from the trailing 7 favors 5.
fn alternating_history_picks_follower_of_last_digit() {
    let digits: Vec<u8> = (0..20).map(|i| if i % 2 == 0 { 5 } else { 7 }).collect();
    let forecast = DigitPredictor::default().forecast(&digits).unwrap();
    assert_eq!(forecast.digit, 5);
    assert_eq!(forecast.confidence, 80);
    for d in [0usize, 1, 2, 3, 4, 6, 8, 9] {
        assert!(forecast.distribution[5] > forecast.distribution[d]);
        assert!(forecast.distribution[7] > forecast.distribution[d]);
    }
}

#[test]
fn repeated_digit_saturates_confidence() {
    let forecast = DigitPredictor::default().forecast(&[3; 40]).unwrap();
    assert_eq!(forecast.digit, 3);
    assert_eq!(forecast.confidence, 100);
    assert!(forecast.distribution[3] > 0.99);
}

#[test]
/// Two digits with equal frequency: the one absent for 15+ ticks scores
/// `cold_boost` times higher.
fn cold_digit_is_boosted() {
    let mut digits = vec![0u8, 0];
    digits.extend([9u8; 18]);
    digits.extend([5u8, 5]);
    let predictor = DigitPredictor::new(PredictorConfig {
        short_window: 100,
        medium_window: 100,
        long_window: 100,
        transition_weight: 0.0,
        ..PredictorConfig::default()
    });
    let forecast = predictor.forecast(&digits).unwrap();
    assert_eq!(forecast.digit, 9);

    let ratio = forecast.distribution[0] / forecast.distribution[5];
    assert!((ratio - 1.1).abs() < 1e-9, "ratio was {ratio}");
}

#[test]
/// Three hits in the last ten ticks earn the hot multiplier.
fn hot_digit_is_boosted() {
    // 2 and 8 appear four times each overall; only 8 is in the recent window.
    let mut digits = vec![2u8, 2, 2, 2];
    digits.extend([6u8; 12]);
    digits.extend([8u8, 6, 8, 6, 8, 6, 8]);
    let predictor = DigitPredictor::new(PredictorConfig {
        short_window: 100,
        medium_window: 100,
        long_window: 100,
        transition_weight: 0.0,
        cold_threshold: 1_000,
        ..PredictorConfig::default()
    });
    let forecast = predictor.forecast(&digits).unwrap();
    let ratio = forecast.distribution[8] / forecast.distribution[2];
    assert!((ratio - 1.2).abs() < 1e-9, "ratio was {ratio}");
}

#[test]
fn custom_min_history_is_respected() {
    let predictor = DigitPredictor::new(PredictorConfig {
        min_history: 5,
        ..PredictorConfig::default()
    });
    assert!(predictor.forecast(&[1, 2, 3, 4, 5]).is_ok());
    assert_eq!(
        predictor.forecast(&[1, 2, 3, 4]).unwrap_err(),
        PredictError::InsufficientData { have: 4, need: 5 }
    );
}

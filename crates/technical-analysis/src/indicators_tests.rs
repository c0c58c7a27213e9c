#[cfg(test)]
mod tests {
    use super::super::indicators::*;

    // Helper function to create sample price data
    fn sample_prices() -> Vec<f64> {
        vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 45.61, 46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64,
        ]
    }

    #[test]
    fn test_sma_basic() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = sma(&data, 3);

        assert_eq!(result.len(), 3);
        assert!((result[0] - 2.0).abs() < 0.001); // (1+2+3)/3 = 2
        assert!((result[1] - 3.0).abs() < 0.001); // (2+3+4)/3 = 3
        assert!((result[2] - 4.0).abs() < 0.001); // (3+4+5)/3 = 4
    }

    #[test]
    fn test_sma_insufficient_data() {
        let data = vec![1.0, 2.0];
        let result = sma(&data, 5);

        assert_eq!(result.len(), 0);
        assert!(sma(&data, 0).is_empty());
    }

    #[test]
    fn test_sma_real_prices() {
        let prices = sample_prices();
        let result = sma(&prices, 5);

        assert_eq!(result.len(), prices.len() - 4);
        // First SMA(5) should be average of first 5 prices
        let expected_first = (44.34 + 44.09 + 44.15 + 43.61 + 44.33) / 5.0;
        assert!((result[0] - expected_first).abs() < 0.01);
    }

    #[test]
    fn test_rsi_basic() {
        let prices = sample_prices();
        let result = rsi(&prices, 14);

        assert_eq!(result.len(), prices.len() - 14);
        for value in &result {
            assert!(*value >= 0.0 && *value <= 100.0);
        }
    }

    #[test]
    fn test_rsi_simple_mean_window() {
        // Changes: +1, -1, +2 -> gains 3/3, losses 1/3, rs = 3, rsi = 75.
        let result = rsi(&[10.0, 11.0, 10.0, 12.0], 3);
        assert_eq!(result.len(), 1);
        assert!((result[0] - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_rsi_insufficient_data() {
        let data = vec![1.0, 2.0, 3.0];
        let result = rsi(&data, 14);

        assert_eq!(result.len(), 0);
    }

    #[test]
    fn test_rsi_overbought_oversold() {
        let uptrend: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let downtrend: Vec<f64> = (0..30).map(|i| 100.0 - i as f64).collect();

        assert_eq!(latest(&rsi(&uptrend, 14)), Some(100.0));
        assert_eq!(latest(&rsi(&downtrend, 14)), Some(0.0));
    }

    #[test]
    fn test_rsi_flat_is_neutral() {
        let flat = vec![50.0; 20];
        let result = rsi(&flat, 14);
        assert!(result.iter().all(|v| *v == 50.0));
    }

    #[test]
    fn test_latest_empty() {
        assert_eq!(latest(&[]), None);
    }
}

/// Simple Moving Average
///
/// One value per full window, so `result[0]` lines up with `data[period - 1]`.
pub fn sma(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let mut result = Vec::with_capacity(data.len() - period + 1);
    for i in period - 1..data.len() {
        let sum: f64 = data[i + 1 - period..=i].iter().sum();
        result.push(sum / period as f64);
    }
    result
}

/// Relative Strength Index over a rolling simple mean of gains and losses.
///
/// `result[0]` lines up with `data[period]`. A window without losses reads
/// 100, a window without any movement reads 50.
pub fn rsi(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period + 1 {
        return vec![];
    }

    let mut gains = Vec::with_capacity(data.len() - 1);
    let mut losses = Vec::with_capacity(data.len() - 1);

    for i in 1..data.len() {
        let change = data[i] - data[i - 1];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(change.abs());
        }
    }

    let avg_gains = sma(&gains, period);
    let avg_losses = sma(&losses, period);

    avg_gains
        .iter()
        .zip(avg_losses.iter())
        .map(|(&gain, &loss)| {
            if loss == 0.0 && gain == 0.0 {
                50.0
            } else if loss == 0.0 {
                100.0
            } else {
                let rs = gain / loss;
                100.0 - (100.0 / (1.0 + rs))
            }
        })
        .collect()
}

/// Last value of an indicator series, if any.
pub fn latest(series: &[f64]) -> Option<f64> {
    series.last().copied()
}

use serde::Serialize;

/// Padding added above and below the sample range so a flat line is not
/// drawn on the chart edge.
const DOMAIN_PADDING: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Rising,
    Falling,
    Flat,
}

/// Sparkline geometry for a trend sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sparkline {
    pub min: f64,
    pub max: f64,
    /// `(x, y)` in [0, 1]², y growing upwards.
    pub points: Vec<(f64, f64)>,
}

impl Sparkline {
    /// Samples are clamped to [0, 100]; non-finite samples are dropped.
    pub fn from_samples(samples: &[f64]) -> Self {
        let values: Vec<f64> = clean(samples);
        if values.is_empty() {
            return Self {
                min: 0.0,
                max: 0.0,
                points: Vec::new(),
            };
        }

        let lo = values.iter().copied().fold(f64::INFINITY, f64::min) - DOMAIN_PADDING;
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max) + DOMAIN_PADDING;
        let span = hi - lo;
        let last = (values.len() - 1).max(1) as f64;

        let points = values
            .iter()
            .enumerate()
            .map(|(i, v)| (i as f64 / last, (v - lo) / span))
            .collect();

        Self { min: lo, max: hi, points }
    }
}

/// Compare the last sample against the first.
pub fn direction(samples: &[f64]) -> TrendDirection {
    let values = clean(samples);
    match (values.first(), values.last()) {
        (Some(first), Some(last)) if last > first => TrendDirection::Rising,
        (Some(first), Some(last)) if last < first => TrendDirection::Falling,
        _ => TrendDirection::Flat,
    }
}

fn clean(samples: &[f64]) -> Vec<f64> {
    samples
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 100.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparkline_domain_padded() {
        let line = Sparkline::from_samples(&[20.0, 40.0, 60.0, 80.0]);
        assert_eq!(line.min, 15.0);
        assert_eq!(line.max, 85.0);
        assert_eq!(line.points.len(), 4);
        assert_eq!(line.points[0].0, 0.0);
        assert_eq!(line.points[3].0, 1.0);
        assert!(line.points.windows(2).all(|w| w[0].1 < w[1].1));
    }

    #[test]
    fn test_sparkline_clamps_out_of_range() {
        let line = Sparkline::from_samples(&[-20.0, 150.0, f64::NAN]);
        assert_eq!(line.points.len(), 2);
        assert_eq!(line.min, -5.0);
        assert_eq!(line.max, 105.0);
    }

    #[test]
    fn test_single_sample_and_empty() {
        let line = Sparkline::from_samples(&[42.0]);
        assert_eq!(line.points, vec![(0.0, 0.5)]);
        assert!(Sparkline::from_samples(&[]).points.is_empty());
    }

    #[test]
    fn test_direction() {
        assert_eq!(direction(&[10.0, 30.0, 25.0]), TrendDirection::Rising);
        assert_eq!(direction(&[70.0, 20.0]), TrendDirection::Falling);
        assert_eq!(direction(&[5.0]), TrendDirection::Flat);
        assert_eq!(direction(&[]), TrendDirection::Flat);
    }
}

use serde::Serialize;

use pulse_common::{Problem, ProblemId, Severity};

/// Centre of the 100×100 radar canvas.
pub const CENTER: (f64, f64) = (50.0, 50.0);

/// Degrees per category sector (6 categories ⇒ full circle).
const SECTOR_DEGREES: usize = 60;
/// In-sector spread: `(idx * SPREAD_STEP) % SPREAD_RANGE` degrees.
const SPREAD_STEP: usize = 15;
const SPREAD_RANGE: usize = 45;

const MIN_POINT_SIZE: f64 = 6.0;
const POINT_SIZE_RANGE: f64 = 12.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarPoint {
    pub problem_id: ProblemId,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub color: &'static str,
    pub title: String,
}

impl RadarPoint {
    /// Distance from the canvas centre.
    pub fn radius(&self) -> f64 {
        (self.x - CENTER.0).hypot(self.y - CENTER.1)
    }
}

/// Ring radius: Critical nearest the centre, Low farthest.
pub fn severity_radius(severity: Severity) -> f64 {
    match severity {
        Severity::Critical => 12.0,
        Severity::High => 22.0,
        Severity::Medium => 32.0,
        Severity::Low => 42.0,
    }
}

pub fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "#f43f5e",
        Severity::High => "#f59e0b",
        Severity::Medium => "#10b981",
        Severity::Low => "#6366f1",
    }
}

/// Marker size from impact, clamped so out-of-range scores stay in [6, 18].
pub fn point_size(impact_score: f64) -> f64 {
    let impact = if impact_score.is_finite() {
        impact_score.clamp(0.0, 100.0)
    } else {
        0.0
    };
    impact / 100.0 * POINT_SIZE_RANGE + MIN_POINT_SIZE
}

/// Angle in degrees for the `idx`-th record of the list being drawn.
///
/// Two records of one category whose indices agree modulo 3 land on the same
/// angle; the layout does not try to avoid that.
pub fn angle_degrees(idx: usize, problem: &Problem) -> f64 {
    let sector = problem.category.index() * SECTOR_DEGREES;
    let spread = (idx * SPREAD_STEP) % SPREAD_RANGE;
    (sector + spread) as f64
}

pub fn place_one(idx: usize, problem: &Problem) -> RadarPoint {
    let radian = angle_degrees(idx, problem).to_radians();
    let radius = severity_radius(problem.severity);

    RadarPoint {
        problem_id: problem.id,
        x: CENTER.0 + radius * radian.cos(),
        y: CENTER.1 + radius * radian.sin(),
        size: point_size(problem.impact_score),
        color: severity_color(problem.severity),
        title: problem.title.clone(),
    }
}

/// Place every record; `idx` is the position in the given (filtered) order.
pub fn place<'a>(records: impl IntoIterator<Item = &'a Problem>) -> Vec<RadarPoint> {
    records
        .into_iter()
        .enumerate()
        .map(|(idx, p)| place_one(idx, p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::problem;
    use pulse_common::Category;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_critical_nearer_than_low_same_category() {
        let records = vec![
            problem("low", Category::Health, Severity::Low).build(),
            problem("critical", Category::Health, Severity::Critical).build(),
        ];
        let points = place(&records);
        assert!(points[1].radius() < points[0].radius());
        assert!(close(points[1].radius(), 12.0));
        assert!(close(points[0].radius(), 42.0));
    }

    #[test]
    fn test_angle_uses_sector_and_spread() {
        let p = problem("x", Category::Education, Severity::Low).build();
        assert_eq!(angle_degrees(0, &p), 180.0);
        assert_eq!(angle_degrees(1, &p), 195.0);
        assert_eq!(angle_degrees(2, &p), 210.0);
        // Wraps within the sector.
        assert_eq!(angle_degrees(3, &p), 180.0);
    }

    #[test]
    fn test_first_social_point_due_east() {
        let p = problem("x", Category::Social, Severity::Medium).impact(100.0).build();
        let point = place_one(0, &p);
        assert!(close(point.x, 82.0));
        assert!(close(point.y, 50.0));
        assert_eq!(point.size, 18.0);
        assert_eq!(point.color, "#10b981");
    }

    #[test]
    fn test_point_size_clamped() {
        assert_eq!(point_size(0.0), 6.0);
        assert_eq!(point_size(50.0), 12.0);
        assert_eq!(point_size(250.0), 18.0);
        assert_eq!(point_size(-40.0), 6.0);
        assert_eq!(point_size(f64::NAN), 6.0);
    }

    #[test]
    fn test_severity_bands_strictly_ordered() {
        let radii: Vec<f64> = [Severity::Critical, Severity::High, Severity::Medium, Severity::Low]
            .into_iter()
            .map(severity_radius)
            .collect();
        assert!(radii.windows(2).all(|w| w[0] < w[1]));
    }
}

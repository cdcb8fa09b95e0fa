use eframe::egui::{Pos2, pos2};

/// Chord-to-radius ratio of arc-diagram edges.
const RADIUS_DIVISOR: f32 = 1.5;

/// Circular arc between two points on a shared baseline, as an SVG
/// `A r,r 0,0,sweep` segment would draw it. Both sweep directions bulge
/// below the baseline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcGeometry {
    pub start: Pos2,
    pub end: Pos2,
    pub radius: f32,
    pub sweep: bool,
}

impl ArcGeometry {
    pub fn between(x1: f32, x2: f32, baseline: f32) -> Self {
        Self {
            start: pos2(x1, baseline),
            end: pos2(x2, baseline),
            radius: (x2 - x1).abs() / RADIUS_DIVISOR,
            sweep: x1 > x2,
        }
    }

    pub fn svg_path(&self) -> String {
        format!(
            "M{},{}A{},{} 0,0,{} {},{}",
            self.start.x,
            self.start.y,
            self.radius,
            self.radius,
            u8::from(self.sweep),
            self.end.x,
            self.end.y
        )
    }

    pub fn center(&self) -> Option<Pos2> {
        let half_chord = (self.end.x - self.start.x).abs() * 0.5;
        if half_chord <= f32::EPSILON {
            return None;
        }
        let rise = (self.radius * self.radius - half_chord * half_chord).max(0.0).sqrt();
        Some(pos2((self.start.x + self.end.x) * 0.5, self.start.y - rise))
    }

    /// Deepest point of the arc, directly below the chord midpoint.
    pub fn apex(&self) -> Pos2 {
        match self.center() {
            Some(center) => pos2(center.x, center.y + self.radius),
            None => self.start,
        }
    }

    pub fn points(&self, segments: usize) -> Vec<Pos2> {
        let Some(center) = self.center() else {
            return vec![self.start, self.end];
        };

        let start_angle = (self.start.y - center.y).atan2(self.start.x - center.x);
        let end_angle = (self.end.y - center.y).atan2(self.end.x - center.x);
        let segments = segments.max(1);
        (0..=segments)
            .map(|step| {
                let t = step as f32 / segments as f32;
                let angle = start_angle + (end_angle - start_angle) * t;
                pos2(
                    center.x + self.radius * angle.cos(),
                    center.y + self.radius * angle.sin(),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_and_sweep_follow_endpoint_order() {
        let forward = ArcGeometry::between(20.0, 170.0, 100.0);
        let backward = ArcGeometry::between(170.0, 20.0, 100.0);

        assert_eq!(forward.radius, 100.0);
        assert!(!forward.sweep);
        assert!(backward.sweep);
        assert_eq!(forward.svg_path(), "M20,100A100,100 0,0,0 170,100");
        assert_eq!(backward.svg_path(), "M170,100A100,100 0,0,1 20,100");
    }

    #[test]
    fn arcs_bulge_below_the_baseline_in_both_directions() {
        for arc in [
            ArcGeometry::between(20.0, 170.0, 100.0),
            ArcGeometry::between(170.0, 20.0, 100.0),
        ] {
            let points = arc.points(16);
            assert_eq!(points.first().copied(), Some(arc.start));
            assert!(points.iter().all(|point| point.y >= 100.0 - 1e-3));
            assert!(arc.apex().y > 100.0);
            let last = points.last().copied().expect("points");
            assert!((last - arc.end).length() < 1e-3);
        }
    }

    #[test]
    fn every_sample_lies_on_the_circle() {
        let arc = ArcGeometry::between(40.0, 100.0, 50.0);
        let center = arc.center().expect("non-degenerate arc");
        for point in arc.points(12) {
            assert!(((point - center).length() - arc.radius).abs() < 1e-3);
        }
    }

    #[test]
    fn degenerate_arc_collapses_to_its_endpoints() {
        let arc = ArcGeometry::between(60.0, 60.0, 10.0);
        assert_eq!(arc.radius, 0.0);
        assert_eq!(arc.points(8), vec![arc.start, arc.end]);
    }
}

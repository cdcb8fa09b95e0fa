use eframe::egui::{Vec2, vec2};

const PHYLLOTAXIS_RADIUS: f32 = 10.0;

pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Sunflower placement used for nodes that arrive without coordinates.
pub fn phyllotaxis_position(center: Vec2, index: usize) -> Vec2 {
    let golden_angle = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
    let radius = PHYLLOTAXIS_RADIUS * (0.5 + index as f32).sqrt();
    let angle = index as f32 * golden_angle;
    center + vec2(angle.cos(), angle.sin()) * radius
}

/// Tiny deterministic offsets that break ties between coincident nodes.
#[derive(Clone, Debug)]
pub struct Jiggle {
    state: u64,
}

impl Default for Jiggle {
    fn default() -> Self {
        Self {
            state: 0x2545_f491_4f6c_dd1d,
        }
    }
}

impl Jiggle {
    pub fn next(&mut self) -> f32 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        let unit = ((self.state >> 40) as f64 / (1u64 << 24) as f64) as f32;
        (unit - 0.5) * 1e-6
    }
}

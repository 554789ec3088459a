use crate::common::types::Observations;
use crate::envelope::BoundIntersection;

/// Fraction of each axis span added as padding on both sides.
const PADDING_FRACTION: f64 = 0.1;

/// Plot extents after padding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartLayout {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl ChartLayout {
    /// Extents covering the observations, both Ele.Flow limits and any
    /// finite intersections, each axis padded by 10 % of its span.
    /// A zero span is padded by `max(|min| * 0.1, 1)` instead.
    pub fn compute(
        observations: &Observations,
        intersection: &BoundIntersection,
        min_ele_flow: f64,
        max_ele_flow: f64,
    ) -> Self {
        let mut xs: Vec<f64> = observations.x.clone();
        xs.extend(
            [intersection.min_intersection, intersection.max_intersection]
                .into_iter()
                .filter(|v| v.is_finite()),
        );
        let mut ys: Vec<f64> = observations.y.clone();
        ys.extend([min_ele_flow, max_ele_flow].into_iter().filter(|v| v.is_finite()));

        let (x_min, x_max) = padded(&xs);
        let (y_min, y_max) = padded(&ys);
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// `count` evenly spaced x values from `x_min` to `x_max` inclusive.
    pub fn sample_x(&self, count: usize) -> Vec<f64> {
        match count {
            0 => Vec::new(),
            1 => vec![self.x_min],
            _ => {
                let step = (self.x_max - self.x_min) / (count - 1) as f64;
                (0..count).map(|i| self.x_min + step * i as f64).collect()
            }
        }
    }

    /// Height of the range bar, 4 % above the bottom.
    pub fn marker_y(&self) -> f64 {
        self.y_min + (self.y_max - self.y_min) * 0.04
    }

    /// Height of the range annotation, 9 % above the bottom.
    pub fn marker_label_y(&self) -> f64 {
        self.y_min + (self.y_max - self.y_min) * 0.09
    }
}

fn padded(values: &[f64]) -> (f64, f64) {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return (-1.0, 1.0);
    }
    let mut pad = (max - min) * PADDING_FRACTION;
    if pad == 0.0 {
        pad = (min.abs() * PADDING_FRACTION).max(1.0);
    }
    (min - pad, max + pad)
}

//! Easing curves for tween steps
//!
//! An easing maps a step's raw ratio (0.0 to 1.0) onto the ratio used for
//! interpolation. Curves may overshoot (back, elastic) but always return
//! exactly 0.0 and 1.0 at the endpoints.

use std::f64::consts::PI;

/// Easing function applied to a step's ratio
#[derive(Clone, Copy, Debug, Default)]
pub enum Easing {
    #[default]
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    QuartIn,
    QuartOut,
    QuartInOut,
    SineIn,
    SineOut,
    SineInOut,
    BackIn,
    BackOut,
    BounceOut,
    ElasticOut,
    CubicBezier(f64, f64, f64, f64),
    Custom(fn(f64) -> f64),
}

impl Easing {
    /// Apply the easing function to a ratio
    pub fn apply(&self, t: f64) -> f64 {
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => 1.0 - (1.0 - t).powi(2),
            Easing::QuadInOut => in_out(t, 2),
            Easing::CubicIn => t.powi(3),
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
            Easing::CubicInOut => in_out(t, 3),
            Easing::QuartIn => t.powi(4),
            Easing::QuartOut => 1.0 - (1.0 - t).powi(4),
            Easing::QuartInOut => in_out(t, 4),
            Easing::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Easing::SineOut => (t * PI / 2.0).sin(),
            Easing::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
            Easing::BackIn => {
                let c = 1.70158;
                (c + 1.0) * t * t * t - c * t * t
            }
            Easing::BackOut => {
                let c = 1.70158;
                let u = t - 1.0;
                1.0 + (c + 1.0) * u * u * u + c * u * u
            }
            Easing::BounceOut => bounce_out(t),
            Easing::ElasticOut => {
                if t <= 0.0 || t >= 1.0 {
                    return t.clamp(0.0, 1.0);
                }
                2f64.powf(-10.0 * t) * ((t * 10.0 - 0.75) * (2.0 * PI / 3.0)).sin() + 1.0
            }
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier(t, *x1, *y1, *x2, *y2),
            Easing::Custom(f) => f(t),
        }
    }
}

/// Symmetric polynomial in-out of the given power
fn in_out(t: f64, power: i32) -> f64 {
    if t < 0.5 {
        2f64.powi(power - 1) * t.powi(power)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(power) / 2.0
    }
}

fn bounce_out(t: f64) -> f64 {
    const N: f64 = 7.5625;
    const D: f64 = 2.75;
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        N * t * t + 0.9375
    } else {
        let t = t - 2.625 / D;
        N * t * t + 0.984375
    }
}

/// CSS-style cubic bezier: find the curve parameter where x == t, then
/// read y there.
fn cubic_bezier(t: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let x = BezierAxis::new(x1, x2);
    let y = BezierAxis::new(y1, y2);
    y.at(x.solve(t))
}

/// One axis of a unit cubic bezier as `((a*s + b)*s + c)*s`
#[derive(Clone, Copy)]
struct BezierAxis {
    a: f64,
    b: f64,
    c: f64,
}

impl BezierAxis {
    const EPSILON: f64 = 1e-7;

    fn new(p1: f64, p2: f64) -> Self {
        let c = 3.0 * p1;
        let b = 3.0 * (p2 - p1) - c;
        Self { a: 1.0 - c - b, b, c }
    }

    #[inline]
    fn at(&self, s: f64) -> f64 {
        ((self.a * s + self.b) * s + self.c) * s
    }

    #[inline]
    fn slope(&self, s: f64) -> f64 {
        (3.0 * self.a * s + 2.0 * self.b) * s + self.c
    }

    /// Parameter `s` in [0, 1] with `at(s) == value`
    fn solve(&self, value: f64) -> f64 {
        let mut s = value;
        for _ in 0..8 {
            let err = self.at(s) - value;
            if err.abs() < Self::EPSILON {
                return s;
            }
            let slope = self.slope(s);
            if slope.abs() < Self::EPSILON {
                break;
            }
            s -= err / slope;
        }

        // Newton stalled; bisect until the bracket collapses
        let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
        s = value;
        while hi - lo > Self::EPSILON {
            let err = self.at(s) - value;
            if err.abs() < Self::EPSILON {
                break;
            }
            if err < 0.0 {
                lo = s;
            } else {
                hi = s;
            }
            s = (lo + hi) * 0.5;
        }
        s
    }
}

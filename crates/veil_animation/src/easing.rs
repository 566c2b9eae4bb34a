//! Easing functions for animations
//!
//! An easing maps normalized progress `p` (0.0 to 1.0) to an eased fraction.
//! Named families are derived from a small set of "ease-in" fragments through
//! the [`Easing::reverse`] and [`Easing::reflect`] combinators, and arbitrary
//! curves are expressed as Bezier splines pinned at (0,0) and (1,1).

use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use crate::error::{EasingError, Result};

const NEWTON_ITERATIONS: usize = 4;
const NEWTON_MIN_SLOPE: f64 = 0.001;
const SUBDIVISION_PRECISION: f64 = 1e-7;
const SUBDIVISION_MAX_ITERATIONS: usize = 10;
const SPLINE_SAMPLE_COUNT: usize = 11;
const SPLINE_INTERVAL: f64 = 1.0 / (SPLINE_SAMPLE_COUNT - 1) as f64;

/// Bezier timing curve with endpoints fixed at (0,0) and (1,1).
///
/// The interior control points are free; two of them give the familiar CSS
/// `cubic-bezier(x1, y1, x2, y2)`, more of them give a higher-order curve.
/// The curve is stored in power basis so both the point and its derivative
/// are cheap polynomial evaluations.
#[derive(Clone, Debug, PartialEq)]
pub struct Bezier {
    /// Power-basis coefficients `(cx_j, cy_j)`, lowest degree first
    coefficients: Vec<(f64, f64)>,
    /// x coordinate of the curve at `t = i * SPLINE_INTERVAL`
    samples: [f64; SPLINE_SAMPLE_COUNT],
}

impl Bezier {
    /// Build a curve from interior control coordinates `[x1, y1, x2, y2, ...]`.
    pub fn new(control: &[f64]) -> Result<Self> {
        if control.len() % 2 != 0 {
            return Err(EasingError::OddControlPoints(control.len()));
        }
        if let Some(bad) = control.iter().find(|v| !v.is_finite()) {
            return Err(EasingError::NonFiniteControlPoint(*bad));
        }

        let mut points = Vec::with_capacity(control.len() / 2 + 2);
        points.push((0.0, 0.0));
        points.extend(control.chunks_exact(2).map(|c| (c[0], c[1])));
        points.push((1.0, 1.0));

        let mut bezier = Self {
            coefficients: power_coefficients(&points),
            samples: [0.0; SPLINE_SAMPLE_COUNT],
        };
        for i in 0..SPLINE_SAMPLE_COUNT {
            bezier.samples[i] = bezier.point_at(i as f64 * SPLINE_INTERVAL).0;
        }
        Ok(bezier)
    }

    /// CSS-style cubic curve
    pub fn cubic(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self> {
        Self::new(&[x1, y1, x2, y2])
    }

    /// Degree of the polynomial (3 for a cubic)
    pub fn order(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Point on the curve at parameter `t`
    pub fn point_at(&self, t: f64) -> (f64, f64) {
        self.coefficients
            .iter()
            .rev()
            .fold((0.0, 0.0), |(x, y), (cx, cy)| (x * t + cx, y * t + cy))
    }

    /// First derivative of the curve at parameter `t`
    pub fn derivative_at(&self, t: f64) -> (f64, f64) {
        self.coefficients
            .iter()
            .enumerate()
            .skip(1)
            .rev()
            .fold((0.0, 0.0), |(x, y), (j, (cx, cy))| {
                let j = j as f64;
                (x * t + j * cx, y * t + j * cy)
            })
    }

    /// Eased value for progress `x`.
    ///
    /// The endpoints are returned exactly.
    pub fn ease(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        if x >= 1.0 {
            return 1.0;
        }
        self.point_at(self.t_for_x(x)).1
    }

    /// Solve `x(t) == x` for the curve parameter.
    pub fn t_for_x(&self, x: f64) -> f64 {
        let last = SPLINE_SAMPLE_COUNT - 1;
        let mut index = 0;
        for i in 1..SPLINE_SAMPLE_COUNT {
            if i == last || self.samples[i] > x {
                index = i - 1;
                break;
            }
        }

        let t_start = index as f64 * SPLINE_INTERVAL;
        let span = self.samples[index + 1] - self.samples[index];
        let guess = if span > 0.0 {
            t_start + SPLINE_INTERVAL * (x - self.samples[index]) / span
        } else {
            t_start
        };

        let slope = self.derivative_at(guess).0;
        if slope >= NEWTON_MIN_SLOPE {
            self.newton_raphson(x, guess)
        } else if slope == 0.0 {
            guess
        } else {
            self.binary_subdivide(x, t_start, t_start + SPLINE_INTERVAL)
        }
    }

    fn newton_raphson(&self, x: f64, guess: f64) -> f64 {
        let mut t = guess;
        for _ in 0..NEWTON_ITERATIONS {
            let slope = self.derivative_at(t).0;
            if slope == 0.0 {
                return t;
            }
            t -= (self.point_at(t).0 - x) / slope;
        }
        t
    }

    fn binary_subdivide(&self, x: f64, mut lo: f64, mut hi: f64) -> f64 {
        let mut t = lo;
        for _ in 0..SUBDIVISION_MAX_ITERATIONS {
            t = lo + (hi - lo) / 2.0;
            let dx = self.point_at(t).0 - x;
            if dx.abs() <= SUBDIVISION_PRECISION {
                return t;
            }
            if dx > 0.0 {
                hi = t;
            } else {
                lo = t;
            }
        }
        t
    }
}

/// Bernstein-to-power-basis conversion:
/// `c_j = n!/(n-j)! * sum_{i<=j} (-1)^(i+j) P_i / (i! (j-i)!)`
fn power_coefficients(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let n = points.len() - 1;
    let factorial = |k: usize| (1..=k).fold(1.0_f64, |acc, v| acc * v as f64);

    (0..=n)
        .map(|j| {
            let (mut xs, mut ys) = (0.0, 0.0);
            for (i, (px, py)) in points.iter().enumerate().take(j + 1) {
                let sign = if (i + j) % 2 == 0 { 1.0 } else { -1.0 };
                let weight = sign / (factorial(i) * factorial(j - i));
                xs += weight * px;
                ys += weight * py;
            }
            let scale = factorial(n) / factorial(n - j);
            (scale * xs, scale * ys)
        })
        .collect()
}

/// Base "ease-in" shapes that the named families are derived from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Fragment {
    Quad,
    Cubic,
    Quart,
    Quint,
    Expo,
    Sine,
    Circ,
    Back,
    Elastic,
    Bounce,
}

impl Fragment {
    pub const ALL: [Fragment; 10] = [
        Fragment::Quad,
        Fragment::Cubic,
        Fragment::Quart,
        Fragment::Quint,
        Fragment::Expo,
        Fragment::Sine,
        Fragment::Circ,
        Fragment::Back,
        Fragment::Elastic,
        Fragment::Bounce,
    ];

    /// Suffix used in preset names (`easeIn<Name>`)
    pub fn name(self) -> &'static str {
        match self {
            Fragment::Quad => "Quad",
            Fragment::Cubic => "Cubic",
            Fragment::Quart => "Quart",
            Fragment::Quint => "Quint",
            Fragment::Expo => "Expo",
            Fragment::Sine => "Sine",
            Fragment::Circ => "Circ",
            Fragment::Back => "Back",
            Fragment::Elastic => "Elastic",
            Fragment::Bounce => "Bounce",
        }
    }

    pub fn apply(self, p: f64) -> f64 {
        match self {
            Fragment::Quad => p * p,
            Fragment::Cubic => p * p * p,
            Fragment::Quart => p.powi(4),
            Fragment::Quint => p.powi(5),
            // Steeper polynomial stand-in for the exponential curve
            Fragment::Expo => p.powi(6),
            Fragment::Sine => 1.0 - (p * PI / 2.0).cos(),
            Fragment::Circ => 1.0 - (1.0 - p * p).sqrt(),
            Fragment::Back => p * p * (3.0 * p - 2.0),
            Fragment::Elastic => {
                if p == 0.0 || p == 1.0 {
                    p
                } else {
                    -(2.0_f64.powf(8.0 * (p - 1.0)))
                        * (((p - 1.0) * 80.0 - 7.5) * PI / 15.0).sin()
                }
            }
            Fragment::Bounce => {
                let p = p.clamp(0.0, 1.0);
                let mut bounce = 3;
                while bounce > 0 && p < (2.0_f64.powi(bounce) - 1.0) / 11.0 {
                    bounce -= 1;
                }
                let pow2 = 2.0_f64.powi(bounce);
                1.0 / 4.0_f64.powi(3 - bounce) - 7.5625 * ((pow2 * 3.0 - 2.0) / 22.0 - p).powi(2)
            }
        }
    }
}

/// Easing function type
#[derive(Clone, Default)]
pub enum Easing {
    #[default]
    Linear,
    /// Always 0
    Zero,
    /// Always 1
    One,
    /// `1 - p`
    Reverse,
    Swing,
    Spring,
    /// An ease-in fragment used as-is
    In(Fragment),
    Bezier(Arc<Bezier>),
    /// `p -> 1 - f(1 - p)`
    ReverseOf(Arc<Easing>),
    /// `p -> p < 0.5 ? f(2p)/2 : 1 - f(2 - 2p)/2`
    ReflectOf(Arc<Easing>),
    /// Plays `f` forward and backward until `count` forward runs are done
    RepeatOf { easing: Arc<Easing>, count: u32 },
    Custom(Arc<dyn Fn(f64) -> f64 + Send + Sync>),
}

impl Easing {
    /// CSS `cubic-bezier(x1, y1, x2, y2)`
    pub fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self> {
        Ok(Easing::Bezier(Arc::new(Bezier::cubic(x1, y1, x2, y2)?)))
    }

    /// Bezier from any even number of interior control coordinates
    pub fn control_points(control: &[f64]) -> Result<Self> {
        Ok(Easing::Bezier(Arc::new(Bezier::new(control)?)))
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Easing::Custom(Arc::new(f))
    }

    pub fn ease_in(fragment: Fragment) -> Self {
        Easing::In(fragment)
    }

    pub fn ease_out(fragment: Fragment) -> Self {
        Easing::In(fragment).reverse()
    }

    pub fn ease_in_out(fragment: Fragment) -> Self {
        Easing::In(fragment).reflect()
    }

    pub fn ease_out_in(fragment: Fragment) -> Self {
        Easing::In(fragment).reverse().reflect()
    }

    pub fn reverse(self) -> Self {
        Easing::ReverseOf(Arc::new(self))
    }

    pub fn reflect(self) -> Self {
        Easing::ReflectOf(Arc::new(self))
    }

    pub fn repeat(self, count: u32) -> Self {
        Easing::RepeatOf {
            easing: Arc::new(self),
            count: count.max(1),
        }
    }

    /// Apply the easing function to a progress value (0.0 to 1.0)
    pub fn apply(&self, p: f64) -> f64 {
        match self {
            Easing::Linear => p,
            Easing::Zero => 0.0,
            Easing::One => 1.0,
            Easing::Reverse => 1.0 - p,
            Easing::Swing => 0.5 - (p * PI).cos() / 2.0,
            Easing::Spring => 1.0 - (p * 4.5 * PI).cos() * (-p * 6.0).exp(),
            Easing::In(fragment) => fragment.apply(p),
            Easing::Bezier(bezier) => bezier.ease(p),
            Easing::ReverseOf(inner) => 1.0 - inner.apply(1.0 - p),
            Easing::ReflectOf(inner) => {
                if p < 0.5 {
                    0.5 * inner.apply(2.0 * p)
                } else {
                    1.0 - 0.5 * inner.apply(2.0 - 2.0 * p)
                }
            }
            Easing::RepeatOf { easing, count } => {
                let steps = (*count * 2 - 1) as f64;
                let scaled = p * steps;
                let step = scaled.floor();
                let value = easing.apply(scaled - step);
                if step as i64 % 2 == 1 {
                    1.0 - value
                } else {
                    value
                }
            }
            Easing::Custom(f) => f(p),
        }
    }
}

impl fmt::Debug for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::Linear => f.write_str("Linear"),
            Easing::Zero => f.write_str("Zero"),
            Easing::One => f.write_str("One"),
            Easing::Reverse => f.write_str("Reverse"),
            Easing::Swing => f.write_str("Swing"),
            Easing::Spring => f.write_str("Spring"),
            Easing::In(fragment) => f.debug_tuple("In").field(fragment).finish(),
            Easing::Bezier(bezier) => f.debug_tuple("Bezier").field(bezier).finish(),
            Easing::ReverseOf(inner) => f.debug_tuple("ReverseOf").field(inner).finish(),
            Easing::ReflectOf(inner) => f.debug_tuple("ReflectOf").field(inner).finish(),
            Easing::RepeatOf { easing, count } => f
                .debug_struct("RepeatOf")
                .field("easing", easing)
                .field("count", count)
                .finish(),
            Easing::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<Bezier> for Easing {
    fn from(bezier: Bezier) -> Self {
        Easing::Bezier(Arc::new(bezier))
    }
}

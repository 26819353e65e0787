//! Zero crossings of a per-vertex scalar field within one triangle.
//!
//! Every isoline family (contours, suggestive contours and highlights,
//! isophotes, topo lines, the curvature zero sets) is an [`Isoline`]
//! with a different field, level, and test.

use linedraw_math::{Point3, Vec3};

use crate::types::LinePiece;
use crate::zero::{find_zero_hermite, find_zero_linear, lerp, lerp_point};

/// How a crossing is located along an edge.
#[derive(Debug, Clone, Copy, Default)]
pub enum Interpolation<'a> {
    /// Linear interpolation of the end values.
    #[default]
    Linear,
    /// Cubic Hermite interpolation with per-vertex field gradients.
    Hermite {
        /// Gradient of the field at each vertex.
        gradients: &'a [Vec3],
    },
}

/// Per-vertex test of a line: passes where `num` and `den` are both
/// non-zero and share a sign. Without `den` it passes where `num > 0`.
#[derive(Debug, Clone, Copy)]
pub struct TestField<'a> {
    /// Numerator.
    pub num: &'a [f64],
    /// Denominator, or `None` for a constant 1.
    pub den: Option<&'a [f64]>,
}

impl TestField<'_> {
    fn num_den(&self, v: usize) -> (f64, f64) {
        (self.num[v], self.den.map_or(1.0, |d| d[v]))
    }

    /// Whether every corner of `tri` fails the test.
    pub fn fails_everywhere(&self, tri: [usize; 3]) -> bool {
        tri.iter().all(|&v| {
            let (num, den) = self.num_den(v);
            !passes(num, den)
        })
    }
}

#[inline]
fn passes(num: f64, den: f64) -> bool {
    num * den > 0.0
}

/// Opacity of a line end where the test evaluates to `num/den`.
///
/// `num/(den·fade + num)` goes to 0 where the test reaches its limit and
/// to 1 where it holds comfortably. A zero `fade` disables fading.
#[inline]
fn fade_alpha(num: f64, den: f64, fade: f64) -> f64 {
    if fade <= 0.0 {
        return 1.0;
    }
    let alpha = num / (den * fade + num);
    if alpha.is_nan() {
        0.0
    } else {
        alpha.clamp(0.0, 1.0)
    }
}

/// The level set `val = level`, optionally gated by a test.
#[derive(Debug, Clone, Copy)]
pub struct Isoline<'a> {
    /// Scalar field per vertex.
    pub val: &'a [f64],
    /// Iso value.
    pub level: f64,
    /// Test gating the line, if any.
    pub test: Option<TestField<'a>>,
    /// Crossing location method.
    pub interpolation: Interpolation<'a>,
    /// Fade factor of the test; 0 disables fading.
    pub fade: f64,
    /// Emit the pieces failing the test as hidden instead of dropping them.
    pub keep_failed: bool,
}

impl<'a> Isoline<'a> {
    /// Untested, unfaded level set of `val`.
    pub fn new(val: &'a [f64], level: f64) -> Self {
        Self {
            val,
            level,
            test: None,
            interpolation: Interpolation::Linear,
            fade: 0.0,
            keep_failed: false,
        }
    }

    /// Gate by `num/den > 0`.
    pub fn with_test(mut self, num: &'a [f64], den: Option<&'a [f64]>) -> Self {
        self.test = Some(TestField { num, den });
        self
    }

    /// Emit the crossing segment of one triangle, split by the test.
    ///
    /// Nothing is emitted when the field does not change sign across the
    /// triangle, or when the test fails at every corner and failed pieces
    /// are not kept.
    pub fn extract_face(
        &self,
        positions: &[Point3],
        tri: [usize; 3],
        emit: &mut impl FnMut(LinePiece),
    ) {
        if let Some(test) = &self.test {
            if !self.keep_failed && test.fails_everywhere(tri) {
                return;
            }
        }

        let vals = tri.map(|v| self.val[v] - self.level);
        let Some(odd) = odd_vertex(vals) else {
            return;
        };
        let i0 = tri[odd];
        let i1 = tri[(odd + 1) % 3];
        let i2 = tri[(odd + 2) % 3];
        let (v0, v1, v2) = (vals[odd], vals[(odd + 1) % 3], vals[(odd + 2) % 3]);

        let w10 = self.crossing(positions, i0, i1, v0, v1);
        let w20 = self.crossing(positions, i0, i2, v0, v2);
        let p1 = lerp_point(&positions[i0], &positions[i1], w10);
        let p2 = lerp_point(&positions[i0], &positions[i2], w20);

        let Some(test) = &self.test else {
            emit(LinePiece::visible(p1, p2));
            return;
        };

        let (num0, den0) = test.num_den(i0);
        let (numa, dena) = test.num_den(i1);
        let (numb, denb) = test.num_den(i2);
        let num = (lerp(num0, numa, w10), lerp(num0, numb, w20));
        let den = (lerp(den0, dena, w10), lerp(den0, denb, w20));
        self.emit_tested(p1, p2, num, den, emit);
    }

    fn crossing(&self, positions: &[Point3], a: usize, b: usize, va: f64, vb: f64) -> f64 {
        match self.interpolation {
            Interpolation::Linear => find_zero_linear(va, vb),
            Interpolation::Hermite { gradients } => find_zero_hermite(
                &positions[a],
                &positions[b],
                va,
                vb,
                &gradients[a],
                &gradients[b],
            ),
        }
    }

    /// Split `p1 → p2` where the interpolated test changes sign.
    ///
    /// The numerator and the denominator each cross zero at most once, so
    /// there are at most three pieces and validity alternates between them.
    fn emit_tested(
        &self,
        p1: Point3,
        p2: Point3,
        num: (f64, f64),
        den: (f64, f64),
        emit: &mut impl FnMut(LinePiece),
    ) {
        let num_at = |s: f64| lerp(num.0, num.1, s);
        let den_at = |s: f64| lerp(den.0, den.1, s);

        let mut cuts = [0.0; 4];
        let mut len = 1;
        for (a, b) in [num, den] {
            if (a >= 0.0) != (b >= 0.0) {
                let z = find_zero_linear(a, b);
                if z > 0.0 && z < 1.0 {
                    cuts[len] = z;
                    len += 1;
                }
            }
        }
        cuts[1..len].sort_by(f64::total_cmp);
        cuts[len] = 1.0;
        len += 1;

        let mut flush = |s0: f64, s1: f64, valid: bool| {
            let q0 = lerp_point(&p1, &p2, s0);
            let q1 = lerp_point(&p1, &p2, s1);
            if valid {
                emit(LinePiece {
                    alpha: [
                        fade_alpha(num_at(s0), den_at(s0), self.fade),
                        fade_alpha(num_at(s1), den_at(s1), self.fade),
                    ],
                    ..LinePiece::visible(q0, q1)
                });
            } else if self.keep_failed {
                emit(LinePiece::hidden(q0, q1));
            }
        };

        let mut start = 0.0;
        let mut current: Option<bool> = None;
        for w in cuts[..len].windows(2) {
            let (s0, s1) = (w[0], w[1]);
            if s1 <= s0 {
                continue;
            }
            let mid = 0.5 * (s0 + s1);
            let valid = passes(num_at(mid), den_at(mid));
            match current {
                Some(c) if c == valid => {}
                Some(c) => {
                    flush(start, s0, c);
                    start = s0;
                    current = Some(valid);
                }
                None => current = Some(valid),
            }
        }
        if let Some(c) = current {
            flush(start, 1.0, c);
        }
    }
}

/// Corner whose value has the opposite sign of the other two.
///
/// A zero counts with either side, but a corner only qualifies when it is
/// strictly non-zero, so a triangle that merely touches the level set has
/// no odd corner.
pub fn odd_vertex(vals: [f64; 3]) -> Option<usize> {
    (0..3).find(|&k| {
        let (v0, v1, v2) = (vals[k], vals[(k + 1) % 3], vals[(k + 2) % 3]);
        (v0 < 0.0 && v1 >= 0.0 && v2 >= 0.0) || (v0 > 0.0 && v1 <= 0.0 && v2 <= 0.0)
    })
}

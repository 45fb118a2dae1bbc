//! Globally adaptive Gauss–Kronrod quadrature.
//!
//! Every interval is integrated with the 15-point Kronrod rule; the embedded
//! 7-point Gauss rule gives the error estimate. The interval with the largest
//! error is bisected until the summed error meets the tolerance or the
//! interval budget runs out.
//!
//! The vector form integrates many integrands sharing one abscissa set: the
//! error of an interval is the largest error over its components, so all
//! components are refined together. This is what makes building a whole
//! coefficient image affordable.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use common::FloatExt;

/// Kronrod abscissae on [-1, 1], non-negative half, descending.
const XGK: [f64; 8] = [
    0.991_455_371_120_812_6,
    0.949_107_912_342_758_5,
    0.864_864_423_359_769_1,
    0.741_531_185_599_394_4,
    0.586_087_235_467_691_1,
    0.405_845_151_377_397_2,
    0.207_784_955_007_898_5,
    0.0,
];

/// Kronrod weights matching [`XGK`].
const WGK: [f64; 8] = [
    0.022_935_322_010_529_22,
    0.063_092_092_629_978_55,
    0.104_790_010_322_250_18,
    0.140_653_259_715_525_92,
    0.169_004_726_639_267_9,
    0.190_350_578_064_785_4,
    0.204_432_940_075_298_9,
    0.209_482_141_084_727_83,
];

/// Gauss weights for the odd-indexed Kronrod abscissae (`XGK[1]`, `XGK[3]`, ...).
const WG: [f64; 4] = [
    0.129_484_966_168_869_7,
    0.279_705_391_489_276_7,
    0.381_830_050_505_118_9,
    0.417_959_183_673_469_4,
];

/// Stopping rule for adaptive integration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Absolute error target.
    pub abs: f64,
    /// Relative error target, against the largest component of the result.
    pub rel: f64,
    /// Interval budget; exceeding it ends refinement unconverged.
    pub max_intervals: usize,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            abs: 0.0,
            rel: 1e-8,
            max_intervals: 1000,
        }
    }
}

impl Tolerance {
    pub fn relative(rel: f64) -> Self {
        Self {
            rel,
            ..Self::default()
        }
    }

    pub fn absolute(abs: f64) -> Self {
        Self {
            abs,
            rel: 0.0,
            ..Self::default()
        }
    }

    pub fn with_max_intervals(mut self, max_intervals: usize) -> Self {
        self.max_intervals = max_intervals;
        self
    }
}

/// Result of an adaptive integration.
#[derive(Debug, Clone, PartialEq)]
pub struct Quadrature<T> {
    pub value: T,
    /// Summed error estimate over all final intervals.
    pub error: f64,
    /// Number of integrand evaluations (one per abscissa, however many components).
    pub evaluations: usize,
    pub converged: bool,
}

#[derive(Debug)]
struct Segment {
    a: f64,
    b: f64,
    value: Vec<f64>,
    error: f64,
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        self.error.total_cmp(&other.error) == Ordering::Equal
    }
}

impl Eq for Segment {}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Segment {
    fn cmp(&self, other: &Self) -> Ordering {
        self.error.total_cmp(&other.error)
    }
}

/// Applies the 15-point rule to `[a, b]` for every component at once.
struct Kronrod15<F> {
    f: F,
    dim: usize,
    fval: Vec<f64>,
    gauss: Vec<f64>,
    evaluations: usize,
}

impl<F: FnMut(f64, &mut [f64])> Kronrod15<F> {
    fn new(f: F, dim: usize) -> Self {
        Self {
            f,
            dim,
            fval: vec![0.0; dim],
            gauss: vec![0.0; dim],
            evaluations: 0,
        }
    }

    fn segment(&mut self, a: f64, b: f64) -> Segment {
        let centre = 0.5 * (a + b);
        let half = 0.5 * (b - a);
        let mut kronrod = vec![0.0; self.dim];
        self.gauss.fill(0.0);

        for (k, (&x, &wk)) in XGK.iter().zip(WGK.iter()).enumerate() {
            // Gauss nodes are the odd Kronrod indices, and the centre (k = 7).
            let wg = (k % 2 == 1).then(|| WG[k / 2]);
            let nodes: &[f64] = if x == 0.0 { &[0.0] } else { &[-1.0, 1.0] };
            for &sign in nodes {
                (self.f)(centre + sign * half * x, &mut self.fval);
                self.evaluations += 1;
                for (acc, &v) in kronrod.iter_mut().zip(&self.fval) {
                    *acc += wk * v;
                }
                if let Some(wg) = wg {
                    for (acc, &v) in self.gauss.iter_mut().zip(&self.fval) {
                        *acc += wg * v;
                    }
                }
            }
        }

        let mut error = 0.0_f64;
        for (k, g) in kronrod.iter_mut().zip(&self.gauss) {
            *k *= half;
            error = error.max((*k - g * half).abs());
        }
        Segment {
            a,
            b,
            value: kronrod,
            error,
        }
    }
}

/// Integrate a vector-valued function over `[a, b]`.
///
/// `f(x, out)` writes all `dim` components at `x`. `breakpoints` inside
/// `(a, b)` start the subdivision, so kinks and steps of the integrand
/// should be listed there. Points outside the interval are ignored.
pub fn integrate_vec<F>(f: F, dim: usize, a: f64, b: f64, breakpoints: &[f64], tol: Tolerance) -> Quadrature<Vec<f64>>
where
    F: FnMut(f64, &mut [f64]),
{
    if a == b || dim == 0 {
        return Quadrature {
            value: vec![0.0; dim],
            error: 0.0,
            evaluations: 0,
            converged: true,
        };
    }
    if b < a {
        let mut q = integrate_vec(f, dim, b, a, breakpoints, tol);
        q.value.iter_mut().for_each(|v| *v = -*v);
        return q;
    }

    let mut edges: Vec<f64> = breakpoints.iter().copied().filter(|&p| p > a && p < b).collect();
    edges.sort_by(|p, q| p.fuzzy_cmp(*q));
    // Near-coincident breakpoints would leave zero-width segments.
    edges.dedup_by(|p, q| p.machine_eq(*q));
    edges.insert(0, a);
    edges.push(b);

    let mut rule = Kronrod15::new(f, dim);
    let mut heap = BinaryHeap::with_capacity(tol.max_intervals.max(edges.len()));
    let mut total = vec![0.0; dim];
    let mut total_error = 0.0;

    for w in edges.windows(2) {
        let seg = rule.segment(w[0], w[1]);
        add_into(&mut total, &seg.value, 1.0);
        total_error += seg.error;
        heap.push(seg);
    }

    let mut converged = false;
    loop {
        let target = tol.abs.max(tol.rel * max_abs(&total));
        if total_error <= target {
            converged = true;
            break;
        }
        if heap.len() >= tol.max_intervals {
            break;
        }
        let Some(worst) = heap.pop() else { break };
        let mid = 0.5 * (worst.a + worst.b);
        if mid <= worst.a || mid >= worst.b {
            // Interval can no longer be split in floating point.
            heap.push(worst);
            break;
        }

        let left = rule.segment(worst.a, mid);
        let right = rule.segment(mid, worst.b);
        add_into(&mut total, &worst.value, -1.0);
        add_into(&mut total, &left.value, 1.0);
        add_into(&mut total, &right.value, 1.0);
        total_error += left.error + right.error - worst.error;
        heap.push(left);
        heap.push(right);
    }

    // Re-sum to shed the drift of the running totals.
    let mut value = vec![0.0; dim];
    let mut error = 0.0;
    for seg in heap.iter() {
        add_into(&mut value, &seg.value, 1.0);
        error += seg.error;
    }

    Quadrature {
        value,
        error,
        evaluations: rule.evaluations,
        converged,
    }
}

/// Integrate a scalar function over `[a, b]`.
pub fn integrate<F>(mut f: F, a: f64, b: f64, breakpoints: &[f64], tol: Tolerance) -> Quadrature<f64>
where
    F: FnMut(f64) -> f64,
{
    let q = integrate_vec(|x, out| out[0] = f(x), 1, a, b, breakpoints, tol);
    Quadrature {
        value: q.value[0],
        error: q.error,
        evaluations: q.evaluations,
        converged: q.converged,
    }
}

/// Integrate `f(x, y)` over the rectangle `[x0, x1] × [y0, y1]` as nested
/// one-dimensional integrals, inner over `x`.
///
/// `x_breaks(y)` supplies the inner breakpoints for a given `y`. The inner
/// integrals use an absolute tolerance scaled by the outer interval length, so
/// their error does not dominate the outer estimate. `converged` is false if
/// the outer or any inner integration failed to converge; `evaluations`
/// counts calls of `f`.
pub fn integrate_2d<F, B>(
    mut f: F,
    (x0, x1): (f64, f64),
    (y0, y1): (f64, f64),
    mut x_breaks: B,
    y_breaks: &[f64],
    tol: Tolerance,
) -> Quadrature<f64>
where
    F: FnMut(f64, f64) -> f64,
    B: FnMut(f64) -> Vec<f64>,
{
    let inner_tol = Tolerance {
        abs: inner_abs_tolerance(tol, (y1 - y0).abs()),
        rel: 0.0,
        max_intervals: tol.max_intervals,
    };
    let mut inner_evaluations = 0;
    let mut inner_converged = true;

    let outer = integrate(
        |y| {
            let breaks = x_breaks(y);
            let q = integrate(|x| f(x, y), x0, x1, &breaks, inner_tol);
            inner_evaluations += q.evaluations;
            inner_converged &= q.converged;
            q.value
        },
        y0,
        y1,
        y_breaks,
        tol,
    );

    Quadrature {
        value: outer.value,
        error: outer.error,
        evaluations: inner_evaluations,
        converged: outer.converged && inner_converged,
    }
}

/// Absolute tolerance for inner integrals of a nested scheme whose outer
/// interval has length `outer_len`.
pub(crate) fn inner_abs_tolerance(tol: Tolerance, outer_len: f64) -> f64 {
    let abs = tol.abs / outer_len.max(1.0);
    // Without an absolute target, fall back to a tight fixed one; the outer
    // relative test still governs the result.
    if abs > 0.0 {
        abs
    } else {
        tol.rel * 1e-3
    }
}

#[inline]
fn add_into(acc: &mut [f64], v: &[f64], scale: f64) {
    for (a, &x) in acc.iter_mut().zip(v) {
        *a += scale * x;
    }
}

#[inline]
fn max_abs(v: &[f64]) -> f64 {
    v.iter().fold(0.0, |m, x| m.max(x.abs()))
}

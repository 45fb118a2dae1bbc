use std::f64::consts::PI;

use super::integrate::{integrate, integrate_2d, integrate_vec, Tolerance};
use super::*;

#[test]
fn test_sinc_values() {
    assert_eq!(sinc(0.0), 1.0);
    for k in 1..5 {
        assert!(sinc(k as f64).abs() < 1e-15, "sinc({k}) should vanish");
    }
    assert!((sinc(0.5) - 2.0 / PI).abs() < 1e-15);
}

#[test]
fn test_lanczos_support() {
    assert_eq!(lanczos(0.0, 3.0), 1.0);
    assert_eq!(lanczos(3.0, 3.0), 0.0);
    assert_eq!(lanczos(-4.5, 3.0), 0.0);
    assert!(lanczos(0.5, 3.0) > 0.5);
}

#[test]
fn test_tapered_sinc_support() {
    assert_eq!(tapered_sinc(0.0), 1.0);
    assert_eq!(tapered_sinc(10.0), 0.0);
    assert_eq!(tapered_sinc(-12.3), 0.0);
    assert!(tapered_sinc(9.99).abs() < 1e-6);
}

#[test]
fn test_tapered_sinc_row_matches_direct() {
    let row = TaperedSincRow::new(-22, 45);
    let mut out = vec![0.0; row.len()];
    for &x in &[-13.7, -3.0, -0.25, 0.0, 1e-10, 4.5, 12.6] {
        row.eval(x, &mut out);
        for (k, &v) in out.iter().enumerate() {
            let i = -22 + k as i32;
            let direct = tapered_sinc(x - i as f64);
            assert!(
                (v - direct).abs() < 1e-11,
                "x={x}, i={i}: row {v} vs direct {direct}"
            );
        }
    }
}

#[test]
fn test_integrate_polynomial_exact() {
    // 15-point Kronrod is exact well past degree 5
    let q = integrate(|x| 3.0 * x.powi(5) - x * x + 2.0, -1.0, 2.0, &[], Tolerance::default());
    let exact = 0.5 * (64.0 - 1.0) - (8.0 + 1.0) / 3.0 + 6.0;
    assert!(q.converged);
    assert!((q.value - exact).abs() < 1e-12, "{} vs {}", q.value, exact);
    assert_eq!(q.evaluations, 15);
}

#[test]
fn test_integrate_reversed_limits() {
    let q = integrate(|x| x, 1.0, 0.0, &[], Tolerance::default());
    assert!((q.value + 0.5).abs() < 1e-14);
}

#[test]
fn test_integrate_oscillatory() {
    // Zero-valued integral: only an absolute target can be met.
    let tol = Tolerance {
        abs: 1e-11,
        ..Tolerance::relative(1e-10)
    };
    let q = integrate(|x| (10.0 * x).sin(), 0.0, PI, &[], tol);
    assert!(q.converged);
    assert!(q.value.abs() < 1e-9, "got {}", q.value);

    let q = integrate(|x| x.sin().powi(2), 0.0, 20.0 * PI, &[], Tolerance::relative(1e-10));
    assert!((q.value - 10.0 * PI).abs() < 1e-8);
}

#[test]
fn test_breakpoints_handle_step() {
    let step = |x: f64| if x < 0.3 { 1.0 } else { 0.0 };
    let q = integrate(step, 0.0, 1.0, &[0.3], Tolerance::absolute(1e-12));
    assert!(q.converged);
    assert!((q.value - 0.3).abs() < 1e-12);
    // One 15-point rule per piece, no refinement needed.
    assert_eq!(q.evaluations, 30);
}

#[test]
fn test_budget_exhaustion_reports_unconverged() {
    let step = |x: f64| if x < 1.0 / 3.0 { 1.0 } else { 0.0 };
    let q = integrate(step, 0.0, 1.0, &[], Tolerance::absolute(1e-14).with_max_intervals(4));
    assert!(!q.converged);
    assert!((q.value - 1.0 / 3.0).abs() < 0.2, "best estimate still returned");
}

#[test]
fn test_integrate_vec_components_share_nodes() {
    let q = integrate_vec(
        |x, out| {
            out[0] = 1.0;
            out[1] = x.exp();
            out[2] = (x - 0.5).abs();
        },
        3,
        0.0,
        1.0,
        &[0.5],
        Tolerance::relative(1e-12),
    );
    assert!(q.converged);
    assert!((q.value[0] - 1.0).abs() < 1e-14);
    assert!((q.value[1] - (1f64.exp() - 1.0)).abs() < 1e-12);
    assert!((q.value[2] - 0.25).abs() < 1e-14);
}

#[test]
fn test_integrate_2d_disk_area() {
    let r = 2.5;
    let disk = |x: f64, y: f64| if x * x + y * y < r * r { 1.0 } else { 0.0 };
    let x_breaks = |y: f64| {
        let h = (r * r - y * y).max(0.0).sqrt();
        vec![-h, h]
    };
    let q = integrate_2d(
        disk,
        (-3.0, 3.0),
        (-3.0, 3.0),
        x_breaks,
        &[-r, r],
        Tolerance::relative(1e-9),
    );
    let exact = PI * r * r;
    assert!(
        (q.value - exact).abs() < 1e-6 * exact,
        "disk area {} vs {}",
        q.value,
        exact
    );
}

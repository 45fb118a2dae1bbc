use std::f64::consts::PI;
use std::sync::{Arc, OnceLock};

use super::*;
use crate::error::PhotometryError;

/// Kernels are slow to build; tests share one cache.
fn shared_cache() -> &'static CoefficientCache {
    static CACHE: OnceLock<CoefficientCache> = OnceLock::new();
    CACHE.get_or_init(CoefficientCache::new)
}

fn coeff(image: &CoeffImage, i: i32, j: i32) -> f64 {
    *image.get_parent(i, j).unwrap()
}

#[test]
fn test_weight_sum_matches_area() {
    let cache = shared_cache();
    cache
        .warm(&[(0.0, 2.0), (0.0, 4.0), (0.0, 6.0), (0.0, 8.0), (0.0, 12.0)])
        .unwrap();

    for r in [2.0, 4.0, 6.0, 8.0, 12.0] {
        let kernel = cache.kernel_info(0.0, r, DEFAULT_TAPER_WIDTH).unwrap();
        let expected = PI * r * r;
        let rel = (kernel.weight_sum() - expected).abs() / expected;
        assert!(
            rel < 1e-3,
            "r={r}: sum {} vs {} (rel {rel:.2e})",
            kernel.weight_sum(),
            expected
        );
        assert!(kernel.converged(), "r={r} did not converge");
        assert!(kernel.correction().radius < r);
    }
}

#[test]
fn test_image_shape_and_origin() {
    let image = shared_cache().get_kernel(0.0, 4.0, DEFAULT_TAPER_WIDTH).unwrap();
    assert_eq!(image.dimensions(), (29, 29));
    assert_eq!(image.origin(), (-14, -14));
    assert_eq!(kernel_width(4.0), 29);
    // Half-integer radius gives an even width, still starting at -width/2.
    assert_eq!(kernel_width(4.5), 30);
}

#[test]
fn test_image_symmetry_and_corners() {
    let image = shared_cache().get_kernel(0.0, 4.0, DEFAULT_TAPER_WIDTH).unwrap();
    for (i, j) in [(1, 0), (3, 2), (5, 1), (9, 4)] {
        let c = coeff(&image, i, j);
        for (a, b) in [(-i, j), (i, -j), (j, i), (-j, -i)] {
            assert!(
                (coeff(&image, a, b) - c).abs() < 1e-5,
                "c({a},{b}) != c({i},{j})"
            );
        }
    }
    // Zeroed where the distance reaches width / 2 = 14
    assert_eq!(coeff(&image, 14, 0), 0.0);
    assert_eq!(coeff(&image, 10, 10), 0.0);
    assert_eq!(coeff(&image, -14, -14), 0.0);
}

#[test]
fn test_interior_coefficient_near_unity() {
    let image = shared_cache().get_kernel(0.0, 12.0, DEFAULT_TAPER_WIDTH).unwrap();
    let c = coeff(&image, 0, 0);
    assert!((c - 1.0).abs() < 0.01, "centre coefficient {c}");
    // Well outside the aperture the weights are small.
    assert!(coeff(&image, 20, 0).abs() < 0.05);
}

#[test]
fn test_annulus_is_difference_of_disks() {
    let cache = shared_cache();
    let disk_in = cache.get_kernel(0.0, 2.0, DEFAULT_TAPER_WIDTH).unwrap();
    let annulus = cache.get_kernel(2.0, 6.0, DEFAULT_TAPER_WIDTH).unwrap();
    let expected = PI * (36.0 - 4.0);
    let rel = (annulus.sum() - expected).abs() / expected;
    assert!(rel < 5e-3, "annulus sum {} vs {expected}", annulus.sum());
    // The hole: the centre carries much less weight than inside a disk.
    assert!(coeff(&annulus, 0, 0) < 0.5 * coeff(&disk_in, 0, 0));
}

#[test]
fn test_cache_returns_same_image_within_epsilon() {
    let cache = CoefficientCache::new();
    let a = cache.get_kernel(0.0, 0.5, 1.0).unwrap();
    let b = cache.get_kernel(0.0, 0.5 + f64::EPSILON / 2.0, 1.0).unwrap();
    assert!(Arc::ptr_eq(&a, &b), "radii within epsilon must share an image");
    assert_eq!(cache.len(), 1);

    let c = cache.get_kernel(0.0, 0.5 + 1e-6, 1.0).unwrap();
    assert!(!Arc::ptr_eq(&a, &c));
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_concurrent_requests_build_once() {
    let cache = CoefficientCache::new();
    let images: Vec<Arc<CoeffImage>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| cache.get_kernel(0.0, 1.5, 1.0).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(images.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_invalid_radii_not_cached() {
    let cache = CoefficientCache::new();
    let err = cache.get_kernel(5.0, 3.0, 1.0).unwrap_err();
    assert!(matches!(err, PhotometryError::InvalidParameter { .. }));
    assert!(cache.is_empty());
}

#[test]
fn test_airy_image_contract() {
    let r = 5.0;
    let image = airy_coeff_image(0.0, r).unwrap();
    assert_eq!(kernel_width(r), 31);
    assert_eq!(image.dimensions(), (31, 31));
    assert_eq!(image.origin(), (-15, -15));

    let expected = PI * r * r;
    let rel = (image.sum() - expected).abs() / expected;
    assert!(rel < 0.05, "airy sum {} vs {expected}", image.sum());

    // Real, symmetric, peaked at the centre.
    let centre = coeff(&image, 0, 0);
    for (i, j) in [(2, 1), (4, 0), (7, 3)] {
        let c = coeff(&image, i, j);
        assert!((coeff(&image, -i, -j) - c).abs() < 1e-9);
        assert!((coeff(&image, j, i) - c).abs() < 1e-9);
    }
    assert!(centre > coeff(&image, 8, 0));
    assert!(centre > 0.5);
}

#[test]
fn test_airy_matches_kernel_layout_at_half_integer_radius() {
    let r = 2.5;
    let image = airy_coeff_image(0.0, r).unwrap();
    assert_eq!(kernel_width(r), 26);
    assert_eq!(image.dimensions(), (26, 26));
    assert_eq!(image.origin(), (-13, -13));

    let kernel = shared_cache().get_kernel(0.0, r, DEFAULT_TAPER_WIDTH).unwrap();
    assert_eq!(image.bbox(), kernel.bbox());

    let expected = PI * r * r;
    let rel = (image.sum() - expected).abs() / expected;
    assert!(rel < 0.05, "airy sum {} vs {expected}", image.sum());

    // Even width: symmetric about (0, 0) for every offset that has a mirror.
    for (i, j) in [(1, 0), (3, 2), (12, 5)] {
        let c = coeff(&image, i, j);
        assert!((coeff(&image, -i, -j) - c).abs() < 1e-9, "({i}, {j})");
        assert!((coeff(&image, j, i) - c).abs() < 1e-9, "({i}, {j})");
    }
    assert!(coeff(&image, 0, 0) > coeff(&image, 4, 0));
}

#[test]
fn test_airy_annulus_and_validation() {
    let disk = airy_coeff_image(0.0, 6.0).unwrap();
    let annulus = airy_coeff_image(3.0, 6.0).unwrap();
    assert_eq!(annulus.dimensions(), disk.dimensions());
    assert!(annulus.sum() < disk.sum());
    assert!(coeff(&annulus, 0, 0) < coeff(&disk, 0, 0));

    assert!(airy_coeff_image(4.0, 2.0).is_err());
    assert!(airy_coeff_image(0.0, f64::NAN).is_err());
}

#[test]
fn test_disk_transform_limits() {
    assert!((disk_transform(3.0, 0.0) - 9.0 * PI).abs() < 1e-12);
    // Continuous through k = 0
    assert!((disk_transform(3.0, 1e-9) - 9.0 * PI).abs() < 1e-6);
    assert_eq!(disk_transform(0.0, 0.2), 0.0);
}

use std::str::FromStr;

use super::*;
use crate::error::PhotometryError;

fn ramp(width: usize, height: usize) -> Plane<f32> {
    let pixels = (0..width * height).map(|i| i as f32).collect();
    Plane::new(width, height, pixels)
}

#[test]
fn test_parent_access_respects_origin() {
    let plane = ramp(4, 3).with_origin(-2, 10);
    assert_eq!(plane.bbox(), BoxI::new(-2, 10, 4, 3));
    assert_eq!(plane.get_parent(-2, 10), Some(&0.0));
    assert_eq!(plane.get_parent(1, 12), Some(&11.0));
    assert_eq!(plane.get_parent(2, 12), None);
    assert_eq!(plane.get_parent(-3, 10), None);
}

#[test]
fn test_sub_plane_is_deep_copy_in_parent_coordinates() {
    let plane = ramp(5, 5).with_origin(100, 200);
    let bbox = BoxI::new(101, 202, 3, 2);
    let mut sub = plane.sub_plane(&bbox).unwrap();

    assert_eq!(sub.origin(), (101, 202));
    assert_eq!(sub.dimensions(), (3, 2));
    assert_eq!(sub[(0, 0)], 11.0);
    assert_eq!(sub[(2, 1)], 18.0);

    sub[(0, 0)] = -1.0;
    assert_eq!(plane.get_parent(101, 202), Some(&11.0));
}

#[test]
fn test_sub_plane_out_of_bounds() {
    let plane = ramp(5, 5);
    let err = plane.sub_plane(&BoxI::new(3, 3, 3, 3)).unwrap_err();
    match err {
        PhotometryError::OutOfBounds {
            requested,
            available,
            context,
        } => {
            assert_eq!(requested, BoxI::new(3, 3, 3, 3));
            assert_eq!(available, BoxI::new(0, 0, 5, 5));
            assert!(context.is_empty());
        }
        other => panic!("expected OutOfBounds, got {other:?}"),
    }
}

#[test]
fn test_sum_and_convert() {
    let plane = ramp(3, 3).with_origin(-1, -1);
    assert_eq!(plane.sum(), 36.0);
    let converted: Plane<f64> = plane.convert();
    assert_eq!(converted.origin(), (-1, -1));
    assert_eq!(converted.sum(), 36.0);
}

#[test]
fn test_mask_plane_names() {
    assert_eq!(MaskPlane::from_str("DETECTED").unwrap(), MaskPlane::Detected);
    assert_eq!(MaskPlane::from_str("INTRP").unwrap(), MaskPlane::Intrp);
    assert_eq!(MaskPlane::Sat.to_string(), "SAT");
    assert_eq!(MaskPlane::DetectedNegative.to_string(), "DETECTED_NEGATIVE");
    assert!(MaskPlane::from_str("NOT_A_PLANE").is_err());
}

#[test]
fn test_mask_plane_bits_are_distinct() {
    use strum::IntoEnumIterator;

    let mut seen = 0u16;
    for plane in MaskPlane::iter() {
        assert_eq!(seen & plane.bit(), 0, "{plane} shares a bit");
        seen |= plane.bit();
    }
    assert_eq!(
        MaskPlane::bits(&[MaskPlane::Edge, MaskPlane::Sat]),
        MaskPlane::Edge.bit() | MaskPlane::Sat.bit()
    );
}

#[test]
fn test_masked_sub_image_copies_all_planes() {
    let mut mi = MaskedImage::<f64>::new(6, 6).with_origin(10, 20);
    *mi.image_mut().get_parent_mut(12, 23).unwrap() = 5.0;
    *mi.variance_mut().get_parent_mut(12, 23).unwrap() = 2.0;
    *mi.mask_mut().get_parent_mut(12, 23).unwrap() = MaskPlane::Detected.bit();

    let sub = mi.sub_image(&BoxI::new(11, 22, 3, 3)).unwrap();
    assert_eq!(sub.origin(), (11, 22));
    assert_eq!(sub.image()[(1, 1)], 5.0);
    assert_eq!(sub.variance()[(1, 1)], 2.0);
    assert_eq!(sub.mask()[(1, 1)], MaskPlane::Detected.bit());
    assert_eq!(sub.count_mask(MaskPlane::Detected.bit()), 1);

    let local = mi.sub_image_local(1, 2, 3, 3).unwrap();
    assert_eq!(local, sub);
}

#[test]
fn test_from_image_uniform_variance() {
    let mi = MaskedImage::from_image(ramp(2, 2).with_origin(3, 4), 9.0);
    assert_eq!(mi.origin(), (3, 4));
    assert!(mi.variance().pixels().iter().all(|&v| v == 9.0));
    assert_eq!(mi.count_mask(u16::MAX), 0);
}

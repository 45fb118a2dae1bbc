use super::*;
use crate::image::MaskPlane;

fn mask_from_rows(rows: &[&str]) -> Plane<MaskPixel> {
    // First string is the top row; y grows upwards.
    let height = rows.len();
    let width = rows[0].len();
    let mut mask = Plane::new_default(width, height);
    for (i, row) in rows.iter().enumerate() {
        let y = height - 1 - i;
        for (x, c) in row.chars().enumerate() {
            if c == '#' {
                mask[(x, y)] = MaskPlane::Detected.bit();
            }
        }
    }
    mask
}

#[test]
fn test_from_spans_merges_and_sorts() {
    let fp = Footprint::from_spans(vec![
        Span::new(1, 5, 6),
        Span::new(0, 0, 2),
        Span::new(0, 3, 4),
        Span::new(1, 0, 1),
        Span::new(1, 1, 3),
    ])
    .unwrap();

    assert_eq!(
        fp.spans(),
        &[Span::new(0, 0, 4), Span::new(1, 0, 3), Span::new(1, 5, 6)]
    );
    assert_eq!(fp.bbox(), BoxI::from_corners((0, 0), (6, 1)));
    assert_eq!(fp.area(), 11);
    assert!(Footprint::from_spans(Vec::new()).is_none());
}

#[test]
fn test_contains() {
    let fp = Footprint::from_spans(vec![Span::new(3, -2, 0), Span::new(3, 4, 5), Span::new(4, 1, 1)]).unwrap();
    assert!(fp.contains(-2, 3));
    assert!(fp.contains(0, 3));
    assert!(!fp.contains(2, 3));
    assert!(fp.contains(5, 3));
    assert!(fp.contains(1, 4));
    assert!(!fp.contains(0, 4));
    assert!(!fp.contains(1, 5));
}

#[test]
fn test_from_box_covers_box() {
    let b = BoxI::new(-1, -1, 3, 4);
    let fp = Footprint::from_box(b);
    assert_eq!(fp.area(), 12);
    assert_eq!(fp.bbox(), b);
    assert!(b.pixels().all(|(x, y)| fp.contains(x, y)));
}

#[test]
fn test_grow_single_pixel_is_disk() {
    let fp = Footprint::from_box(BoxI::new(10, 10, 1, 1)).grown(3);
    assert_eq!(fp.bbox(), BoxI::from_corners((7, 7), (13, 13)));
    for (x, y) in fp.bbox().pixels() {
        let dx = x - 10;
        let dy = y - 10;
        assert_eq!(
            fp.contains(x, y),
            dx * dx + dy * dy <= 9,
            "pixel ({x}, {y}) membership wrong"
        );
    }
    // 29 lattice points within radius 3
    assert_eq!(fp.area(), 29);
}

#[test]
fn test_grow_zero_is_identity() {
    let fp = Footprint::from_box(BoxI::new(0, 0, 2, 2));
    assert_eq!(fp.grown(0), fp);
}

#[test]
fn test_clipped_to() {
    let fp = Footprint::from_box(BoxI::new(0, 0, 5, 5)).grown(2);
    let clipped = fp.clipped_to(&BoxI::new(0, 0, 5, 5)).unwrap();
    assert_eq!(clipped.bbox(), BoxI::new(0, 0, 5, 5));
    assert_eq!(clipped.area(), 25);
    assert!(fp.clipped_to(&BoxI::new(100, 100, 2, 2)).is_none());
}

#[test]
fn test_set_mask_clips_to_plane() {
    let mut mask: Plane<MaskPixel> = Plane::new_default(4, 4);
    mask.set_origin(10, 10);
    let fp = Footprint::from_box(BoxI::new(8, 12, 4, 4));
    fp.set_mask(&mut mask, MaskPlane::Intrp.bit());

    let set: Vec<_> = mask
        .bbox()
        .pixels()
        .filter(|&(x, y)| *mask.get_parent(x, y).unwrap() != 0)
        .collect();
    assert_eq!(set, vec![(10, 12), (11, 12), (10, 13), (11, 13)]);
}

#[test]
fn test_detect_four_connectivity_splits_diagonals() {
    let mask = mask_from_rows(&[
        "##...", //
        "##...",
        "..#..",
        "....#",
    ]);
    let set = FootprintSet::from_mask(&mask, MaskPlane::Detected.bit(), Connectivity::Four);
    assert_eq!(set.len(), 3);
    // Row-major order from the bottom row.
    assert_eq!(set.footprints()[0].bbox(), BoxI::new(4, 0, 1, 1));
    assert_eq!(set.footprints()[1].bbox(), BoxI::new(2, 1, 1, 1));
    assert_eq!(set.footprints()[2].area(), 4);
}

#[test]
fn test_detect_eight_connectivity_joins_diagonals() {
    let mask = mask_from_rows(&[
        "##...", //
        "##...",
        "..#..",
        "....#",
    ]);
    let set = FootprintSet::from_mask(&mask, MaskPlane::Detected.bit(), Connectivity::Eight);
    assert_eq!(set.len(), 2);
    assert_eq!(set.footprints()[1].area(), 5);
}

#[test]
fn test_detect_u_shape_merges_branches() {
    let mask = mask_from_rows(&[
        "#...#", //
        "#...#",
        "#####",
    ]);
    let set = FootprintSet::from_mask(&mask, MaskPlane::Detected.bit(), Connectivity::Four);
    assert_eq!(set.len(), 1);
    assert_eq!(set.footprints()[0].area(), 9);

    let mask = mask_from_rows(&[
        "#####", //
        "#...#",
        "#...#",
    ]);
    let set = FootprintSet::from_mask(&mask, MaskPlane::Detected.bit(), Connectivity::Four);
    assert_eq!(set.len(), 1, "branches joined on a later row must merge");
}

#[test]
fn test_detect_uses_parent_coordinates_and_bits() {
    let mut mask = mask_from_rows(&["#.#"]);
    mask.set_origin(100, -5);
    mask[(1, 0)] = MaskPlane::Sat.bit();

    let set = FootprintSet::from_mask(&mask, MaskPlane::Detected.bit(), Connectivity::Eight);
    assert_eq!(set.len(), 2);
    assert!(set.footprints()[0].contains(100, -5));
    assert!(set.footprints()[1].contains(102, -5));
    assert_eq!(set.region(), BoxI::new(100, -5, 3, 1));

    let any = MaskPlane::Detected.bit() | MaskPlane::Sat.bit();
    let set = FootprintSet::from_mask(&mask, any, Connectivity::Four);
    assert_eq!(set.len(), 1);
}

#[test]
fn test_detect_empty_mask() {
    let mask: Plane<MaskPixel> = Plane::new_default(8, 8);
    let set = FootprintSet::from_mask(&mask, u16::MAX, Connectivity::Eight);
    assert!(set.is_empty());
}

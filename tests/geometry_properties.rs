use platepost::{overlap, overlap_with, AreaConvention, BBox, DegenerateOverlap, OverlapConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_box(rng: &mut StdRng) -> BBox {
    let x1 = rng.random_range(0..400) as f32;
    let y1 = rng.random_range(0..400) as f32;
    let w = rng.random_range(0..80) as f32;
    let h = rng.random_range(0..80) as f32;
    BBox::corners(x1, y1, x1 + w, y1 + h)
}

#[test]
fn self_overlap_is_unity() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..500 {
        let b = random_box(&mut rng);
        assert_eq!(overlap(&b, &b), 1.0, "{b:?}");
    }
}

#[test]
fn overlap_is_symmetric_and_bounded() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..2000 {
        let a = random_box(&mut rng);
        let b = random_box(&mut rng);
        let ab = overlap(&a, &b);
        assert_eq!(ab, overlap(&b, &a), "{a:?} {b:?}");
        assert!((0.0..=1.0).contains(&ab), "{a:?} {b:?} -> {ab}");
    }
}

#[test]
fn boxes_sharing_no_pixels_do_not_overlap() {
    let mut rng = StdRng::seed_from_u64(13);
    for _ in 0..500 {
        let a = random_box(&mut rng);
        let ca = a.corner_form();
        let gap = rng.random_range(1..20) as f32;
        let w = rng.random_range(0..50) as f32;
        let right = BBox::corners(ca.x2 + gap, ca.y1, ca.x2 + gap + w, ca.y2);
        let below = BBox::corners(ca.x1, ca.y2 + gap, ca.x2, ca.y2 + gap + w);
        assert_eq!(overlap(&a, &right), 0.0);
        assert_eq!(overlap(&a, &below), 0.0);
    }
}

#[test]
fn center_and_corner_inputs_agree() {
    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..500 {
        let cx = rng.random_range(20..400) as f32;
        let cy = rng.random_range(20..400) as f32;
        let w = (rng.random_range(0..20) * 2) as f32;
        let h = (rng.random_range(0..20) * 2) as f32;
        let centered = BBox::center(cx, cy, w, h);
        let cornered = BBox::corners(cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0);
        let other = random_box(&mut rng);
        assert_eq!(overlap(&centered, &other), overlap(&cornered, &other));
    }
}

#[test]
fn continuous_convention_is_never_larger_for_partial_overlap() {
    let continuous = OverlapConfig {
        area: AreaConvention::Continuous,
        degenerate: DegenerateOverlap::Zero,
    };
    // 10x10 boxes offset by 5 px: continuous IoU 1/7, inclusive IoU is higher.
    let a = BBox::corners(0.0, 0.0, 10.0, 10.0);
    let b = BBox::corners(5.0, 0.0, 15.0, 10.0);
    let c = overlap_with(&a, &b, &continuous);
    assert!((c - 50.0 / 150.0).abs() < 1e-6);
    let inclusive = overlap(&a, &b);
    assert!((inclusive - 66.0 / 176.0).abs() < 1e-6);
}

#[test]
fn degenerate_pairs_never_produce_nan() {
    let continuous = OverlapConfig {
        area: AreaConvention::Continuous,
        degenerate: DegenerateOverlap::Zero,
    };
    let point = BBox::center(3.0, 3.0, 0.0, 0.0);
    let line = BBox::corners(0.0, 3.0, 10.0, 3.0);
    for cfg in [OverlapConfig::default(), continuous] {
        for (a, b) in [(point, point), (point, line), (line, line)] {
            let v = overlap_with(&a, &b, &cfg);
            assert!(v.is_finite(), "{a:?} {b:?} {cfg:?}");
        }
    }
}

use footprint::{
    AlphaOutlineExtractor, BorderPolicy, Footprint, OutlineExtractor, Pipeline, PipelineBuilder,
    to_geojson_string,
};
use image::{Rgba, RgbaImage};

const INK: Rgba<u8> = Rgba([32, 64, 128, 255]);

/// 12x12 sprite shaped like a U: two 3-pixel wide bars joined by a 3-pixel
/// high base, opening upwards.
fn u_sprite() -> RgbaImage {
    RgbaImage::from_fn(12, 12, |x, y| {
        let body = (1..=10).contains(&x) && (1..=10).contains(&y);
        let notch = (4..=7).contains(&x) && (1..=7).contains(&y);
        if body && !notch { INK } else { Rgba([0, 0, 0, 0]) }
    })
}

fn process(img: &RgbaImage, max_segment_length: f64) -> Footprint {
    PipelineBuilder::build_simple(max_segment_length)
        .process(img)
        .expect("Should process sprite")
}

#[test]
fn test_u_outline_size() {
    let outline = AlphaOutlineExtractor::default()
        .extract_outline(&u_sprite())
        .expect("Should extract outline");
    assert_eq!(outline.len(), 48);
}

#[test]
fn test_u_keeps_its_notch_at_short_segments() {
    let footprint = process(&u_sprite(), 1.0);
    assert_eq!(footprint.outline_points, 48);
    assert_eq!(footprint.vertex_count(), 44);
    assert_eq!(footprint.area(), 49.5);

    // The notch interior is outside the polygon
    use geo::Intersects;
    let polygon = footprint.to_geo_polygon();
    assert!(!polygon.intersects(&geo_types::Coord { x: 5.5, y: 3.0 }));
}

#[test]
fn test_u_area_grows_with_segment_length() {
    let areas: Vec<f64> = [1.0, 2.0, 3.0, 4.5, 100.0]
        .into_iter()
        .map(|length| process(&u_sprite(), length).area())
        .collect();
    assert_eq!(areas, vec![49.5, 49.5, 49.5, 52.0, 81.0]);
}

#[test]
fn test_long_segments_give_the_convex_hull() {
    let footprint = process(&u_sprite(), 100.0);
    assert_eq!(footprint.vertex_count(), 32);
    assert_eq!(footprint.bounding_box().map(|(min, max)| (min.x, min.y, max.x, max.y)), Some((1.0, 1.0, 10.0, 10.0)));
}

#[test]
fn test_every_vertex_is_an_outline_pixel() {
    let img = u_sprite();
    let outline = AlphaOutlineExtractor::default()
        .extract_outline(&img)
        .expect("Should extract outline");
    for length in [1.0, 3.0, 100.0] {
        let footprint = process(&img, length);
        for vertex in &footprint.vertices {
            assert!(outline.points.contains(vertex), "{vertex:?} at length {length}");
        }
    }
}

#[test]
fn test_flat_output_of_a_small_square() {
    let mut img = RgbaImage::new(4, 4);
    for (x, y) in [(1, 1), (2, 1), (1, 2), (2, 2)] {
        img.put_pixel(x, y, INK);
    }
    let footprint = process(&img, 1.0);
    assert_eq!(footprint.to_flat_string(), "1,2,2,2,2,1,1,1");
}

#[test]
fn test_single_opaque_pixel() {
    let mut img = RgbaImage::new(5, 5);
    img.put_pixel(3, 2, INK);
    let footprint = process(&img, 1.0);
    assert!(footprint.degenerate);
    assert_eq!(footprint.to_flat_string(), "3,2");
}

#[test]
fn test_horizontal_bar_is_degenerate() {
    let mut img = RgbaImage::new(8, 3);
    for x in 1..=6 {
        img.put_pixel(x, 1, INK);
    }
    let footprint = process(&img, 1.0);
    assert!(footprint.degenerate);
    assert_eq!(footprint.vertex_count(), 6);
    assert_eq!(footprint.area(), 0.0);
}

#[test]
fn test_legacy_policy_on_a_sprite_touching_the_left_edge() {
    let img = RgbaImage::from_pixel(3, 3, INK);
    let strict = Pipeline::builder().build().process(&img).expect("Should process sprite");
    let legacy = Pipeline::builder()
        .border_policy(BorderPolicy::Legacy)
        .build()
        .process(&img)
        .expect("Should process sprite");

    assert_eq!(strict.outline_points, 8);
    assert_eq!(legacy.outline_points, 5);
}

#[test]
fn test_geojson_collection_from_pipeline() {
    let footprints = vec![
        ("u.png".to_string(), process(&u_sprite(), 1.0)),
        ("u_wide.png".to_string(), process(&u_sprite(), 100.0)),
    ];
    let text = to_geojson_string(&footprints).expect("Should serialize");
    let collection: geojson::FeatureCollection = text.parse().expect("Should parse back");
    assert_eq!(collection.features.len(), 2);
    assert_eq!(
        collection.features[1].property("area").and_then(|v| v.as_f64()),
        Some(81.0)
    );
}

/// 124x64 comb: an 8 pixel high spine along the top with 15 teeth, each
/// 4 pixels wide and 4 pixels apart, hanging 52 pixels below it.
fn comb_sprite() -> RgbaImage {
    RgbaImage::from_fn(124, 64, |x, y| {
        let inside = (2..=121).contains(&x) && (2..=61).contains(&y);
        if inside && (y <= 9 || ((x - 2) / 4) % 2 == 0) { INK } else { Rgba([0, 0, 0, 0]) }
    })
}

#[test]
fn test_comb_follows_its_teeth() {
    use geo::Intersects;

    let img = comb_sprite();
    let outline = AlphaOutlineExtractor::default()
        .extract_outline(&img)
        .expect("Should extract outline");
    assert_eq!(outline.len(), 1783);

    let footprint = process(&img, 1.0);
    assert!(!footprint.degenerate);
    assert!(footprint.vertices.iter().all(|v| outline.points.contains(v)));

    // Gaps between the teeth stay outside
    let polygon = footprint.to_geo_polygon();
    assert!(!polygon.intersects(&geo_types::Coord { x: 8.0, y: 40.0 }));
    assert!(outline.points.iter().all(|p| polygon.intersects(p)));
    assert!(footprint.area() < 0.5 * 119.0 * 59.0);
}

//! Tests for projecting the wind map extent.

use projection::{LambertConformal, MapProjection, PlateCarree, ProjectedExtent};
use test_utils::{assert_approx_eq, assert_coords_approx_eq, extent};

#[test]
fn test_wind_map_roundtrip_grid() {
    let (lon_min, lon_max, lat_min, lat_max) = extent::WIND_MAP;
    let proj = LambertConformal::centered(
        (lon_min + lon_max) * 0.5,
        (lat_min + lat_max) * 0.5,
    )
    .unwrap();

    for i in 0..=8 {
        for j in 0..=5 {
            let lon = lon_min + i as f64 * 5.0;
            let lat = lat_min + j as f64 * 5.0;
            let (x, y) = proj.forward(lon, lat);
            let (lon2, lat2) = proj.inverse(x, y);
            assert_coords_approx_eq!((lon2, lat2), (lon, lat), 1e-9);
        }
    }
}

#[test]
fn test_meridians_converge_northward() {
    let proj = LambertConformal::centered(140.0, 32.5).unwrap();

    let (west_south, _) = proj.forward(120.0, 20.0);
    let (east_south, _) = proj.forward(160.0, 20.0);
    let (west_north, _) = proj.forward(120.0, 45.0);
    let (east_north, _) = proj.forward(160.0, 45.0);

    assert!(east_north - west_north < east_south - west_south);
}

#[test]
fn test_extent_aspect_ratio_is_landscape() {
    let (lon_min, lon_max, lat_min, lat_max) = extent::WIND_MAP;
    let proj = LambertConformal::centered(140.0, 32.5).unwrap();
    let extent = ProjectedExtent::from_geographic(&proj, lon_min, lon_max, lat_min, lat_max).unwrap();

    assert!(extent.aspect_ratio() > 1.0);
    assert_approx_eq!(extent.width(), extent.max_x - extent.min_x, 1e-9);
}

#[test]
fn test_plate_carree_is_usable_as_trait_object() {
    let projections: Vec<Box<dyn MapProjection>> = vec![
        Box::new(PlateCarree),
        Box::new(LambertConformal::centered(140.0, 32.5).unwrap()),
    ];
    for proj in &projections {
        let (x, y) = proj.forward(141.0, 33.0);
        let (lon, lat) = proj.inverse(x, y);
        assert_coords_approx_eq!((lon, lat), (141.0, 33.0), 1e-9);
    }
}

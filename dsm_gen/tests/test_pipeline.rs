/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */
#![allow(unused)]

use std::fs::{self,File};
use std::io::Write;
use std::path::PathBuf;

use geo::{polygon, Polygon};
use ndarray::Array2;

use dsm_common::BoundingBox;
use dsm_gdal::{new_geotransform, same_srs, srs_epsg_4326, srs_from_wkt};
use dsm_gen::errors::DsmError;
use dsm_gen::footprints::{impute_heights, Footprint};
use dsm_gen::grid::{load_dem, write_geotiff, ElevationGrid, DEFAULT_NO_DATA};
use dsm_gen::rasterize::rasterize_footprints;
use dsm_gen::{make_dsm, DsmConfig};

// run with "cargo test -p dsm_gen -- --nocapture"

fn test_dir (name: &str)->PathBuf {
    let dir = std::env::temp_dir().join( format!("dsm_gen_test_{}_{}", name, std::process::id()));
    fs::create_dir_all( &dir).unwrap();
    dir
}

/// uniform rows x cols grid with 1 unit resolution, upper left corner at (0,rows), EPSG:4326
fn uniform_grid (rows: usize, cols: usize, value: f64)->ElevationGrid {
    ElevationGrid::new(
        Array2::from_elem( (rows,cols), value),
        new_geotransform( 0.0, 1.0, 0.0, rows as f64, 0.0, -1.0),
        srs_epsg_4326().to_wkt().unwrap(),
        DEFAULT_NO_DATA
    )
}

/// axis aligned box footprint
fn box_footprint (x0: f64, y0: f64, x1: f64, y1: f64, height: f64)->Footprint {
    Footprint::new( polygon![ (x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1), (x: x0, y: y0) ], height)
}

#[test]
fn test_rasterize_and_merge() {
    let dem = uniform_grid( 10, 10, 100.0);
    // covers the centers of cells [2..=4, 2..=4] (rows 2-4 have y centers 7.5, 6.5, 5.5)
    let footprints = vec![ box_footprint( 2.0, 5.0, 5.0, 8.0, 5.0) ];

    let heights = rasterize_footprints( &footprints, &dem).unwrap();
    let dsm = dem.add_surface( &heights).unwrap();
    assert_eq!( dsm.data.dim(), dem.data.dim());

    for row in 0..10 {
        for col in 0..10 {
            let expected = if (2..=4).contains(&row) && (2..=4).contains(&col) { 105.0 } else { 100.0 };
            assert_eq!( dsm.data[[row,col]], expected, "wrong DSM value at [{},{}]", row, col);
        }
    }
}

#[test]
fn test_footprint_outside_grid() {
    let dem = uniform_grid( 10, 10, 100.0);
    let footprints = vec![ box_footprint( 100.0, 5.0, 110.0, 8.0, 5.0) ];

    let heights = rasterize_footprints( &footprints, &dem).unwrap();
    let dsm = dem.add_surface( &heights).unwrap();

    assert!( dsm.data.iter().all( |v| *v == 100.0));
}

#[test]
fn test_no_data_passthrough() {
    let mut dem = uniform_grid( 10, 10, 100.0);
    dem.data[[3,3]] = DEFAULT_NO_DATA; // inside the footprint

    let footprints = vec![ box_footprint( 2.0, 5.0, 5.0, 8.0, 5.0) ];
    let heights = rasterize_footprints( &footprints, &dem).unwrap();
    let dsm = dem.add_surface( &heights).unwrap();

    assert_eq!( dsm.data[[3,3]], DEFAULT_NO_DATA);
    assert_eq!( dsm.data[[2,2]], 105.0);
}

#[test]
fn test_shape_mismatch() {
    let dem = uniform_grid( 10, 10, 100.0);
    let heights: Array2<f64> = Array2::zeros( (5,5));

    match dem.add_surface( &heights) {
        Err(DsmError::ShapeMismatch(10,10,5,5)) => {}
        other => panic!("expected ShapeMismatch, got {:?}", other.map(|g| g.data.dim()))
    }
}

#[test]
fn test_overlap_last_write_wins() {
    let dem = uniform_grid( 10, 10, 100.0);
    let footprints = vec![
        box_footprint( 2.0, 5.0, 5.0, 8.0, 5.0),
        box_footprint( 3.0, 5.0, 5.0, 8.0, 9.0), // overlaps cols 3,4
    ];

    let heights = rasterize_footprints( &footprints, &dem).unwrap();
    assert_eq!( heights[[3,2]], 5.0);
    assert_eq!( heights[[3,3]], 9.0);
    assert_eq!( heights[[3,4]], 9.0);
}

#[test]
fn test_clip() {
    let dem = uniform_grid( 10, 10, 100.0);
    let clipped = dem.clip( &BoundingBox::new( 2.0, 2.0, 6.0, 7.0)).unwrap();

    assert_eq!( clipped.data.dim(), (5,4)); // rows 3..8, cols 2..6
    assert_eq!( clipped.geo_transform[0], 2.0);
    assert_eq!( clipped.geo_transform[3], 7.0);
    assert_eq!( clipped.srs_wkt, dem.srs_wkt);

    // a box outside the grid is not a usable clip extent
    assert!( dem.clip( &BoundingBox::new( 20.0, 20.0, 30.0, 30.0)).is_err());
}

#[test]
fn test_impute_class_mean() {
    let mut footprints = vec![
        box_footprint( 0.0, 0.0, 1.0, 1.0, 10.0),
        box_footprint( 2.0, 0.0, 3.0, 1.0, 20.0),
        box_footprint( 4.0, 0.0, 5.0, 1.0, 0.0),
    ];
    footprints[0].class = Some("210".to_string());
    footprints[1].class = Some("210".to_string());
    footprints[2].class = Some("210".to_string());

    let n = impute_heights( &mut footprints);
    assert_eq!( n, 1);
    assert_eq!( footprints[2].height, 15.0);
    assert!( footprints[2].imputed);
}

#[test]
fn test_impute_nearest_neighbor() {
    let mut footprints = vec![
        box_footprint( 0.0, 0.0, 1.0, 1.0, 10.0),
        box_footprint( 20.0, 0.0, 21.0, 1.0, 30.0),
        box_footprint( 18.0, 0.0, 19.0, 1.0, 0.0), // nearest with height: the 30.0 one
    ];

    let n = impute_heights( &mut footprints);
    assert_eq!( n, 1);
    assert_eq!( footprints[2].height, 30.0);
}

#[test]
fn test_impute_without_height_data() {
    let mut footprints = vec![
        box_footprint( 0.0, 0.0, 1.0, 1.0, 0.0),
        box_footprint( 2.0, 0.0, 3.0, 1.0, 0.0),
    ];

    assert_eq!( impute_heights( &mut footprints), 0);
    assert!( footprints.iter().all( |fp| fp.height == 0.0));
}

#[test]
fn test_write_read_roundtrip() {
    let dir = test_dir("roundtrip");
    let path = dir.join("dsm.tif");

    let mut grid = uniform_grid( 10, 10, 100.0);
    grid.data[[0,0]] = DEFAULT_NO_DATA;
    grid.data[[5,5]] = 123.25;

    write_geotiff( &grid, &path).unwrap();
    let read_back = load_dem( &path).unwrap();

    assert_eq!( read_back.data.dim(), grid.data.dim());
    for (v0,v1) in grid.data.iter().zip( read_back.data.iter()) {
        assert!( (v0 - v1).abs() < 1e-9, "value changed in roundtrip: {} vs {}", v0, v1);
    }
    for i in 0..6 {
        assert!( (grid.geo_transform[i] - read_back.geo_transform[i]).abs() < 1e-9);
    }
    assert_eq!( read_back.no_data, DEFAULT_NO_DATA);
    assert!( same_srs( &srs_from_wkt( &read_back.srs_wkt).unwrap(), &srs_epsg_4326()));

    fs::remove_dir_all(&dir);
}

fn write_footprint_geojson (path: &PathBuf, coordinates: &str, height: f64) {
    let geojson = format!( r#"{{
  "type": "FeatureCollection",
  "features": [
    {{ "type": "Feature",
       "properties": {{ "HEIGHT": {:?} }},
       "geometry": {{ "type": "Polygon", "coordinates": {} }} }}
  ]
}}"#, height, coordinates);

    let mut file = File::create(path).unwrap();
    file.write_all( geojson.as_bytes()).unwrap();
}

#[test]
fn test_pipeline_end_to_end() {
    let dir = test_dir("pipeline");
    let dem_path = dir.join("dem.tif");
    let footprint_path = dir.join("footprints.geojson");
    let output_path = dir.join("dsm.tif");

    write_geotiff( &uniform_grid( 10, 10, 100.0), &dem_path).unwrap();
    write_footprint_geojson( &footprint_path, "[[[2.0,5.0],[5.0,5.0],[5.0,8.0],[2.0,8.0],[2.0,5.0]]]", 5.0);

    let config = DsmConfig {
        dem_path: dem_path.clone(),
        footprint_path: footprint_path.clone(),
        output_path: output_path.clone(),
        height_field: "HEIGHT".to_string(),
        height_scale: 1.0,
        class_field: None,
        extent: None,
        extent_path: None,
    };

    let path = make_dsm( &config).unwrap();
    assert_eq!( path, output_path);

    let dsm = load_dem( &path).unwrap();
    assert_eq!( dsm.data.dim(), (10,10));
    for row in 0..10 {
        for col in 0..10 {
            let expected = if (2..=4).contains(&row) && (2..=4).contains(&col) { 105.0 } else { 100.0 };
            assert!( (dsm.data[[row,col]] - expected).abs() < 1e-9, "wrong DSM value at [{},{}]", row, col);
        }
    }

    fs::remove_dir_all(&dir);
}

#[test]
fn test_pipeline_footprint_outside_dem() {
    let dir = test_dir("outside");
    let dem_path = dir.join("dem.tif");
    let footprint_path = dir.join("footprints.geojson");
    let output_path = dir.join("dsm.tif");

    write_geotiff( &uniform_grid( 10, 10, 100.0), &dem_path).unwrap();
    write_footprint_geojson( &footprint_path, "[[[100.0,5.0],[110.0,5.0],[110.0,8.0],[100.0,8.0],[100.0,5.0]]]", 5.0);

    let config = DsmConfig {
        dem_path, footprint_path,
        output_path: output_path.clone(),
        height_field: "HEIGHT".to_string(),
        height_scale: 1.0,
        class_field: None,
        extent: None,
        extent_path: None,
    };

    make_dsm( &config).unwrap();
    let dsm = load_dem( &output_path).unwrap();
    assert!( dsm.data.iter().all( |v| (*v - 100.0).abs() < 1e-9));

    fs::remove_dir_all(&dir);
}

#[test]
fn test_pipeline_with_clip_extent() {
    let dir = test_dir("clip");
    let dem_path = dir.join("dem.tif");
    let footprint_path = dir.join("footprints.geojson");
    let output_path = dir.join("dsm.tif");

    write_geotiff( &uniform_grid( 10, 10, 100.0), &dem_path).unwrap();
    write_footprint_geojson( &footprint_path, "[[[2.0,5.0],[5.0,5.0],[5.0,8.0],[2.0,8.0],[2.0,5.0]]]", 5.0);

    let config = DsmConfig {
        dem_path, footprint_path,
        output_path: output_path.clone(),
        height_field: "HEIGHT".to_string(),
        height_scale: 1.0,
        class_field: None,
        extent: Some( BoundingBox::new( 0.0, 4.0, 6.0, 10.0)),
        extent_path: None,
    };

    make_dsm( &config).unwrap();
    let dsm = load_dem( &output_path).unwrap();
    assert_eq!( dsm.data.dim(), (6,6)); // rows 0..6, cols 0..6
    assert_eq!( dsm.data[[2,2]], 105.0);
    assert_eq!( dsm.data[[0,0]], 100.0);

    fs::remove_dir_all(&dir);
}

#[test]
fn test_missing_inputs() {
    let dir = test_dir("missing");
    let dem_path = dir.join("no_such_dem.tif");

    match load_dem( &dem_path) {
        Err(DsmError::InputNotFound(p)) => assert_eq!( p, dem_path),
        other => panic!("expected InputNotFound, got {:?}", other.map(|g| g.data.dim()))
    }

    fs::remove_dir_all(&dir);
}

#[test]
fn test_invalid_height_field() {
    let dir = test_dir("badfield");
    let dem_path = dir.join("dem.tif");
    let footprint_path = dir.join("footprints.geojson");

    write_geotiff( &uniform_grid( 10, 10, 100.0), &dem_path).unwrap();
    write_footprint_geojson( &footprint_path, "[[[2.0,5.0],[5.0,5.0],[5.0,8.0],[2.0,8.0],[2.0,5.0]]]", 5.0);

    let config = DsmConfig {
        dem_path, footprint_path,
        output_path: dir.join("dsm.tif"),
        height_field: "NO_SUCH_FIELD".to_string(),
        height_scale: 1.0,
        class_field: None,
        extent: None,
        extent_path: None,
    };

    assert!( matches!( make_dsm( &config), Err(DsmError::InvalidFormat(_))));

    fs::remove_dir_all(&dir);
}

#[test]
fn test_failed_write_leaves_no_artifact() {
    let dir = test_dir("nowrite");
    let blocker = dir.join("blocker");
    File::create(&blocker).unwrap(); // a file where the output dir should be

    let output_path = blocker.join("dsm.tif");
    let grid = uniform_grid( 10, 10, 100.0);

    assert!( matches!( write_geotiff( &grid, &output_path), Err(DsmError::WriteError(_))));
    assert!( !output_path.exists());

    fs::remove_dir_all(&dir);
}

#[test]
fn test_config_from_ron() {
    let dir = test_dir("config");
    let config_path = dir.join("dsm.ron");

    let input = r#"DsmConfig(
        dem_path: "input_data/geneva_dem.tif",
        footprint_path: "input_data/ontario_buildings/oc_BuildingFootprints.shp",
        output_path: "geneva_dsm.tif",
        height_scale: 0.3048,
        class_field: Some("Prop_Class"),
    )"#;
    let mut file = File::create(&config_path).unwrap();
    file.write_all( input.as_bytes()).unwrap();
    drop(file);

    let config = DsmConfig::from_ron_file( &config_path).unwrap();
    assert_eq!( config.dem_path, PathBuf::from("input_data/geneva_dem.tif"));
    assert_eq!( config.height_field, "HEIGHT"); // default
    assert_eq!( config.height_scale, 0.3048);
    assert_eq!( config.class_field.as_deref(), Some("Prop_Class"));
    assert!( config.extent.is_none());

    fs::remove_dir_all(&dir);
}

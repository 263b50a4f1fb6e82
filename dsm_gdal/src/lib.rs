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

pub mod errors;

use std::{collections::HashMap, path::Path};
use lazy_static::lazy_static;
use ndarray::Array2;
use geo::{Coord, LineString, Polygon};

// we re-export these so that other crates don't have to use a direct gdal dependency to import
pub use gdal::{self, Driver, DriverManager, Metadata, MetadataEntry, Dataset, errors::GdalError, GeoTransform, GeoTransformEx};
pub use gdal::raster::{GdalType, GdalDataType, RasterBand, RasterCreationOptions, Buffer};
pub use gdal::spatial_ref::{CoordTransform, CoordTransformOptions, SpatialRef};
pub use gdal::vector::{Feature, FieldValue, Geometry, Layer, LayerAccess};

use dsm_common::{fs::extension, BoundingBox};
use crate::errors::{misc_error, Result};

lazy_static! {
    // note that we can't automatically populate this by iterating over DriverManager since some
    // drivers use the same file extension
    static ref EXT_MAP: HashMap<&'static str, &'static str> = HashMap::from( [ // file extension -> driver short name
        //--- raster drivers
        ("tif", "GTiff"),
        ("tiff", "GTiff"),
        ("png", "PNG"),
        ("nc", "netCDF"),

        //--- vector drivers
        ("json", "GeoJSON"),
        ("geojson", "GeoJSON"),
        ("kml", "KML"),
        ("shp", "ESRI Shapefile"),
        ("gpkg", "GPKG"),
    ]);
}

/// Note that filename extension has to be lowercase
pub fn get_driver_name_for_extension (ext: &str) -> Option<&'static str> {
    EXT_MAP.get( ext).map(|v| &**v)
}

pub fn get_driver_name_for_filename (path: impl AsRef<Path>) -> Option<&'static str> {
    extension( &path.as_ref()).and_then( |ext| get_driver_name_for_extension( ext))
}

pub fn get_driver_for_filename (path: impl AsRef<Path>) -> Option<Driver> {
    get_driver_name_for_filename( path).and_then( |n| DriverManager::get_driver_by_name(n).ok())
}

/* #region geotransform helpers **********************************************************************************/

pub fn new_geotransform (x_upper_left: f64, x_resolution: f64, row_rotation: f64,
                         y_upper_left: f64, col_rotation: f64, y_resolution: f64) -> GeoTransform {
    [x_upper_left,x_resolution,row_rotation,y_upper_left,col_rotation,y_resolution]
}

pub fn geotransform_from_bbox (bbox: &BoundingBox<f64>, x_resolution: f64, y_resolution: f64) -> GeoTransform {
    new_geotransform( bbox.west, x_resolution, 0.0,
                      bbox.north, 0.0, y_resolution)
}

/// the coordinate bounds covered by a north-up geotransform of the given raster dimensions
pub fn geotransform_bounds (a: &GeoTransform, cols: usize, rows: usize) -> BoundingBox<f64> {
    let (x0,y0) = a.apply( 0.0, 0.0);
    let (x1,y1) = a.apply( cols as f64, rows as f64);
    BoundingBox{ west: x0.min(x1), south: y0.min(y1), east: x0.max(x1), north: y0.max(y1) }
}

/* #endregion geotransform helpers */

/* #region well known SpatialRefs *********************************************************************************/

pub fn srs_lon_lat () -> SpatialRef { SpatialRef::from_epsg(4326).unwrap() }
pub fn srs_epsg_4326 () -> SpatialRef { SpatialRef::from_epsg(4326).unwrap() }

pub fn srs_epsg (epsg: u32) -> Result<SpatialRef> {
    Ok(SpatialRef::from_epsg(epsg)?)
}

pub fn srs_from_wkt (wkt: &str) -> Result<SpatialRef> {
    Ok(SpatialRef::from_wkt(wkt)?)
}

/// authority based SpatialRef comparison, with WKT fallback for SRS without authority info
pub fn same_srs (a: &SpatialRef, b: &SpatialRef) -> bool {
    if let (Ok(a_name),Ok(b_name),Ok(a_code),Ok(b_code)) = (a.auth_name(), b.auth_name(), a.auth_code(), b.auth_code()) {
        a_name == b_name && a_code == b_code
    } else {
        match (a.to_wkt(), b.to_wkt()) {
            (Ok(a_wkt), Ok(b_wkt)) => a_wkt == b_wkt,
            _ => false
        }
    }
}

/* #endregion well known SpatialRefs */

/* #region SpatialRef based coordinate transformations ************************************************************/

fn new_coord_transform (s_srs: &SpatialRef, t_srs: &SpatialRef) -> Result<CoordTransform> {
    let mut ct_options = CoordTransformOptions::new()?;
    ct_options.desired_accuracy( 0.0);
    ct_options.set_ballpark_allowed(false);
    Ok( CoordTransform::new_with_options( s_srs, t_srs, &ct_options)? )
}

pub fn transform_point_2d (transform: &CoordTransform, x: f64, y: f64) -> Result<(f64,f64)> {
    let mut ax: [f64;1] = [x];
    let mut ay: [f64;1] = [y];
    let mut az: [f64;0] = [];

    transform.transform_coords(&mut ax, &mut ay, &mut az)?;
    Ok((ax[0],ay[0]))
}

/// transform polygon coordinates from s_srs to t_srs.
/// GDAL expects/delivers coordinates in authority axis order, which for geographic SRS is lat,lon -
/// swap on both ends so that callers always deal with x,y (east,north) order.
pub fn transform_polygon (polygon: &Polygon<f64>, s_srs: &SpatialRef, t_srs: &SpatialRef) -> Result<Polygon<f64>> {
    let transform = new_coord_transform( s_srs, t_srs)?;
    let s_is_geo = s_srs.is_geographic();
    let t_is_geo = t_srs.is_geographic();

    let exterior = transform_ring( &transform, polygon.exterior(), s_is_geo, t_is_geo)?;
    let mut interiors: Vec<LineString<f64>> = Vec::with_capacity( polygon.interiors().len());
    for ring in polygon.interiors() {
        interiors.push( transform_ring( &transform, ring, s_is_geo, t_is_geo)?);
    }

    Ok( Polygon::new( exterior, interiors) )
}

fn transform_ring (transform: &CoordTransform, ring: &LineString<f64>, s_is_geo: bool, t_is_geo: bool) -> Result<LineString<f64>> {
    let (mut ax, mut ay): (Vec<f64>,Vec<f64>) = if s_is_geo {
        ( ring.coords().map(|c| c.y).collect(), ring.coords().map(|c| c.x).collect() )
    } else {
        ( ring.coords().map(|c| c.x).collect(), ring.coords().map(|c| c.y).collect() )
    };
    let mut az: [f64;0] = [];

    transform.transform_coords(&mut ax, &mut ay, &mut az)?;

    let coords: Vec<Coord<f64>> = if t_is_geo {
        ax.iter().zip( ay.iter()).map( |(lat,lon)| Coord{ x: *lon, y: *lat }).collect()
    } else {
        ax.iter().zip( ay.iter()).map( |(x,y)| Coord{ x: *x, y: *y }).collect()
    };

    Ok( LineString::from( coords) )
}

// watch out - if source or target are geographic we might have to swap axis order
// (we don't want to change axis_mapping_strategy in the provided SpatialRefs though)
pub fn transform_bounds_2d (s_srs: &SpatialRef, t_srs: &SpatialRef,
                            bbox: &BoundingBox<f64>, opt_densify_pts: Option<i32>) -> Result<BoundingBox<f64>> {
    let s_is_geo = s_srs.is_geographic();
    let t_is_geo = t_srs.is_geographic();

    let mut bounds: [f64;4] = if s_is_geo && !t_is_geo {
        [bbox.south, bbox.west, bbox.north, bbox.east]
    } else {
        [bbox.west, bbox.south, bbox.east, bbox.north]
    };
    let densify_pts: i32 = if let Some(dp) = opt_densify_pts { dp } else { 21 }; // default recommended by GDAL OCTTransformBounds doc

    let transform = new_coord_transform( s_srs, t_srs)?;
    let a = transform.transform_bounds(&mut bounds, densify_pts)?;

    if t_is_geo && !s_is_geo {
        Ok( BoundingBox{ west: a[1], south: a[0], east: a[3], north: a[2] } )
    } else {
        Ok( BoundingBox{ west: a[0], south: a[1], east: a[2], north: a[3] } )
    }
}

/* #endregion SpatialRef based coordinate transformations */

/* #region Dataset/RasterBand access ******************************************************************************/

pub fn compress_create_opts ()->RasterCreationOptions {
    let mut co = RasterCreationOptions::new();
    co.add_name_value("COMPRESS", "DEFLATE");
    co.add_name_value("PREDICTOR", "2");
    co
}

pub fn create_f64_dataset<P> (driver: &Driver, path: P, cols: usize, rows: usize, n_bands: usize, co: Option<RasterCreationOptions>)->Result<Dataset>
    where P: AsRef<Path>
{
    if let Some(co) = co {
        Ok( driver.create_with_band_type_with_options::<f64,P>(path, cols, rows, n_bands, &co)? )
    } else {
        Ok( driver.create_with_band_type::<f64,P>(path, cols, rows, n_bands)? )
    }
}

/// read a band region into a row-major [row,col] array. The default region is the whole band
pub fn read_band_f64 (ds: &Dataset, band_index: usize, window: Option<(isize,isize,usize,usize)>) -> Result<Array2<f64>> {
    let band = ds.rasterband(band_index)?;
    let (x0, y0, cols, rows) = window.unwrap_or( (0, 0, band.x_size(), band.y_size()));

    let buf: Buffer<f64> = band.read_as( (x0,y0), (cols,rows), (cols,rows), None)?;
    Array2::from_shape_vec( (rows,cols), buf.data().to_vec())
        .map_err( |e| misc_error( format!("band buffer does not match {}x{} region: {}", rows, cols, e)))
}

/// write a [row,col] array to a band, starting at the band origin
pub fn write_band_f64 (band: &mut RasterBand, data: &Array2<f64>) -> Result<()> {
    let (rows, cols) = data.dim();
    let mut buf: Buffer<f64> = Buffer::new( (cols,rows), data.iter().copied().collect());
    Ok( band.write( (0,0), (cols,rows), &mut buf)? )
}

#[derive(Debug)]
pub struct RasterInfo {
    pub cols: usize,
    pub rows: usize,

    pub left: f64,
    pub top: f64,
    pub dx: f64,
    pub dy: f64
}

impl RasterInfo {
    pub fn right (&self) -> f64 { self.left + self.dx * self.cols as f64 }
    pub fn bottom (&self) -> f64 { self.top + self.dy * self.rows as f64 }

    pub fn bounds (&self) -> BoundingBox<f64> {
        let right = self.right();
        let bottom = self.bottom();
        BoundingBox {
            west: self.left.min(right), south: self.top.min(bottom),
            east: self.left.max(right), north: self.top.max(bottom)
        }
    }
}

pub fn get_raster_info (ds: &Dataset)->Result<RasterInfo> {
    let (cols,rows) = ds.raster_size();
    let a = ds.geo_transform()?;

    Ok( RasterInfo { cols, rows, left: a[0], top: a[3], dx: a[1], dy: a[5] } )
}

/* #endregion Dataset/RasterBand access */

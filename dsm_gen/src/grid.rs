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

use std::path::{Path, PathBuf};
use ndarray::{s, Array2};
use tracing::info;

use dsm_common::{fs, BoundingBox};
use dsm_gdal::{
    compress_create_opts, create_f64_dataset, get_driver_for_filename, read_band_f64, write_band_f64,
    Dataset, Driver, GeoTransform, GeoTransformEx, SpatialRef,
};
use crate::errors::{input_not_found, invalid_format, write_error, DsmError, Result};

/// no-data sentinel used if the source DEM does not define one
pub const DEFAULT_NO_DATA: f64 = -9999.0;

/// a single band f64 raster held in memory, with the geo reference needed to map
/// grid indices to world coordinates
#[derive(Debug,Clone)]
pub struct ElevationGrid {
    pub data: Array2<f64>,          // [row,col], row 0 is the top scanline
    pub geo_transform: GeoTransform,
    pub srs_wkt: String,
    pub no_data: f64,
}

impl ElevationGrid {
    pub fn new (data: Array2<f64>, geo_transform: GeoTransform, srs_wkt: String, no_data: f64)->Self {
        ElevationGrid { data, geo_transform, srs_wkt, no_data }
    }

    #[inline]
    pub fn rows (&self)->usize { self.data.nrows() }

    #[inline]
    pub fn cols (&self)->usize { self.data.ncols() }

    pub fn spatial_ref (&self)->Result<SpatialRef> {
        Ok( dsm_gdal::srs_from_wkt( &self.srs_wkt)? )
    }

    /// world coordinates of the center of cell [row,col]
    #[inline]
    pub fn cell_center (&self, row: usize, col: usize)->(f64,f64) {
        self.geo_transform.apply( col as f64 + 0.5, row as f64 + 0.5)
    }

    #[inline]
    pub fn is_no_data (&self, v: f64)->bool {
        v == self.no_data || v.is_nan()
    }

    pub fn bounds (&self)->BoundingBox<f64> {
        dsm_gdal::geotransform_bounds( &self.geo_transform, self.cols(), self.rows())
    }

    /// the grid restricted to the grid-aligned sub-window covering `bbox` (no resampling)
    pub fn clip (&self, bbox: &BoundingBox<f64>)->Result<ElevationGrid> {
        let geo_to_grid = self.geo_transform.invert()?;
        let (px0,py0) = geo_to_grid.apply( bbox.west, bbox.north);
        let (px1,py1) = geo_to_grid.apply( bbox.east, bbox.south);

        let c0 = px0.min(px1).floor().max(0.0) as usize;
        let c1 = px0.max(px1).ceil().min( self.cols() as f64) as usize;
        let r0 = py0.min(py1).floor().max(0.0) as usize;
        let r1 = py0.max(py1).ceil().min( self.rows() as f64) as usize;

        if c1 <= c0 || r1 <= r0 {
            return Err( invalid_format( format!("clip extent {:?} does not intersect the DEM grid", bbox)))
        }

        let data = self.data.slice( s![r0..r1, c0..c1]).to_owned();
        let (ulx,uly) = self.geo_transform.apply( c0 as f64, r0 as f64);
        let mut geo_transform = self.geo_transform;
        geo_transform[0] = ulx;
        geo_transform[3] = uly;

        info!("clipped DEM to {} rows x {} cols", r1-r0, c1-c0);
        Ok( ElevationGrid { data, geo_transform, srs_wkt: self.srs_wkt.clone(), no_data: self.no_data } )
    }

    /// cell-wise `self + heights`, except that no-data cells pass through unchanged
    pub fn add_surface (&self, heights: &Array2<f64>)->Result<ElevationGrid> {
        let (rows,cols) = self.data.dim();
        let (h_rows,h_cols) = heights.dim();
        if rows != h_rows || cols != h_cols {
            return Err( DsmError::ShapeMismatch( rows, cols, h_rows, h_cols))
        }

        let mut data = self.data.clone();
        for (v,h) in data.iter_mut().zip( heights.iter()) {
            if !self.is_no_data(*v) {
                *v = *v + *h;
            }
        }

        Ok( ElevationGrid { data, geo_transform: self.geo_transform, srs_wkt: self.srs_wkt.clone(), no_data: self.no_data } )
    }
}

/// read a DEM raster into an ElevationGrid
pub fn load_dem (path: impl AsRef<Path>)->Result<ElevationGrid> {
    let path = path.as_ref();
    if !path.exists() {
        return Err( input_not_found( path))
    }

    let ds = Dataset::open( path)
        .map_err( |e| invalid_format( format!("not a readable raster dataset {:?} ({})", path, e)))?;
    if ds.raster_count() < 1 {
        return Err( invalid_format( format!("DEM {:?} has no raster band", path)))
    }

    let geo_transform = ds.geo_transform()
        .map_err( |e| invalid_format( format!("DEM {:?} has no geotransform ({})", path, e)))?;
    let srs_wkt = ds.spatial_ref()
        .and_then( |srs| srs.to_wkt())
        .map_err( |e| invalid_format( format!("DEM {:?} has no usable CRS ({})", path, e)))?;

    let band = ds.rasterband(1)?;
    let no_data = band.no_data_value().unwrap_or( DEFAULT_NO_DATA);
    let data = read_band_f64( &ds, 1, None)?;

    info!("loaded DEM {:?}: {} rows x {} cols, no_data {}", path, data.nrows(), data.ncols(), no_data);
    Ok( ElevationGrid::new( data, geo_transform, srs_wkt, no_data))
}

/// write the grid as a single band GeoTiff with embedded geotransform, CRS and no-data value.
/// The data goes to a temp sibling first and is only moved to `path` once fully written, so
/// a failed run never leaves a partial artifact at the output path.
pub fn write_geotiff (grid: &ElevationGrid, path: impl AsRef<Path>)->Result<PathBuf> {
    let path = path.as_ref();

    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::ensure_writable_dir( dir).map_err( |e| write_error( format!("output dir of {:?}: {}", path, e)))?;
        }
    }
    let driver = get_driver_for_filename( path)
        .ok_or_else( || write_error( format!("unsupported output format {:?}", path)))?;

    let part_path = fs::part_file_path( path);
    if let Err(e) = write_dataset( grid, &driver, &part_path) {
        let _ = fs::remove_if_exists( &part_path);
        return Err( write_error( format!("{:?}: {}", path, e)))
    }
    fs::commit_file( &part_path, path).map_err( |e| write_error( format!("{:?}: {}", path, e)))?;

    info!("wrote DSM {:?}: {} rows x {} cols", path, grid.rows(), grid.cols());
    Ok( path.to_path_buf())
}

fn write_dataset (grid: &ElevationGrid, driver: &Driver, path: &Path)->Result<()> {
    let co = compress_create_opts();
    let mut ds = create_f64_dataset( driver, path, grid.cols(), grid.rows(), 1, Some(co))?;

    ds.set_geo_transform( &grid.geo_transform)?;
    let srs = SpatialRef::from_wkt( &grid.srs_wkt)?;
    ds.set_spatial_ref( &srs)?;

    let mut band = ds.rasterband(1)?;
    band.set_no_data_value( Some(grid.no_data))?;
    write_band_f64( &mut band, &grid.data)?;

    Ok(())
}

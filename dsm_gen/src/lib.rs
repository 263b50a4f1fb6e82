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

//! build a Digital Surface Model (DSM) from a bare earth Digital Elevation Model (DEM)
//! by burning building footprint heights into the DEM grid.
//!
//! The pipeline is a strict linear sequence over immutable in-memory grids:
//!
//!    load DEM -> load/impute footprints -> rasterize heights -> merge -> write GeoTiff
//!
//! A run either produces a complete output raster or fails without touching the output path.

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use tracing::info;

use dsm_common::BoundingBox;

pub mod errors;
pub mod grid;
pub mod footprints;
pub mod rasterize;

pub use errors::DsmError;
use errors::{config_error, Result};
use footprints::{impute_heights, load_footprints, vector_extent};
use grid::{load_dem, write_geotiff, ElevationGrid};
use rasterize::rasterize_footprints;

/// parameters of a DSM pipeline run
#[derive(Debug,Serialize,Deserialize)]
pub struct DsmConfig {
    /// bare earth DEM raster
    pub dem_path: PathBuf,

    /// building footprint vector dataset
    pub footprint_path: PathBuf,

    /// where the DSM raster goes
    pub output_path: PathBuf,

    /// attribute field holding building height
    #[serde(default = "default_height_field")]
    pub height_field: String,

    /// factor applied to raw height values (0.3048 converts survey feet to meters)
    #[serde(default = "default_height_scale")]
    pub height_scale: f64,

    /// attribute field used for class mean height imputation
    #[serde(default)]
    pub class_field: Option<String>,

    /// optional clip extent, as explicit box in DEM CRS units...
    #[serde(default)]
    pub extent: Option<BoundingBox<f64>>,

    /// ...or as vector file whose feature envelope defines it
    #[serde(default)]
    pub extent_path: Option<PathBuf>,
}

fn default_height_field ()->String { "HEIGHT".to_string() }
fn default_height_scale ()->f64 { 1.0 }

impl DsmConfig {
    pub fn from_ron_file (path: impl AsRef<Path>)->Result<DsmConfig> {
        let path = path.as_ref();
        let input = std::fs::read_to_string( path)
            .map_err( |e| config_error( format!("cannot read config {:?}: {}", path, e)))?;
        ron::from_str( &input).map_err( |e| config_error( format!("cannot parse config {:?}: {}", path, e)))
    }
}

/// run the full pipeline. Returns the path of the written DSM raster
pub fn make_dsm (config: &DsmConfig)->Result<PathBuf> {
    info!("loading inputs...");
    let mut dem = load_dem( &config.dem_path)?;
    let dem_srs = dem.spatial_ref()?;

    let clip = match (&config.extent, &config.extent_path) {
        (Some(bbox), _) => Some(*bbox),
        (None, Some(path)) => Some( vector_extent( path, &dem_srs)?),
        (None, None) => None
    };
    if let Some(bbox) = &clip {
        dem = dem.clip( bbox)?;
    }

    let mut footprints = load_footprints(
        &config.footprint_path, &config.height_field, config.height_scale,
        config.class_field.as_deref(), &dem_srs)?;

    info!("imputing building heights...");
    impute_heights( &mut footprints);

    info!("making DSM...");
    let heights = rasterize_footprints( &footprints, &dem)?;
    let dsm = dem.add_surface( &heights)?;

    info!("saving DSM...");
    write_geotiff( &dsm, &config.output_path)
}

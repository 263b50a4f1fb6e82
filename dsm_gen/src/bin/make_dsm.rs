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

use std::path::PathBuf;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dsm_common::BoundingBox;
use dsm_gen::{make_dsm, DsmConfig};

#[derive(Parser)]
#[command(about="make_dsm - build a digital surface model by burning building heights into a DEM")]
struct Args {
    /// RON file with the full pipeline configuration (replaces the other arguments)
    #[arg(long)]
    config: Option<PathBuf>,

    /// bare earth DEM raster
    #[arg(long, default_value="input_data/geneva_dem.tif")]
    dem: PathBuf,

    /// building footprint vector dataset
    #[arg(long, default_value="input_data/ontario_buildings/oc_BuildingFootprints.shp")]
    footprints: PathBuf,

    /// attribute field holding building height
    #[arg(long, default_value="HEIGHT")]
    height_field: String,

    /// factor applied to raw height values (0.3048 converts survey feet to meters)
    #[arg(long, default_value_t=0.3048)]
    height_scale: f64,

    /// attribute field used for class mean height imputation
    #[arg(long)]
    class_field: Option<String>,

    /// clip extent as west,south,east,north in DEM CRS units
    #[arg(long, value_delimiter=',', num_args=4, allow_hyphen_values=true)]
    extent: Option<Vec<f64>>,

    /// vector file whose feature envelope defines the clip extent
    #[arg(long)]
    extent_file: Option<PathBuf>,

    /// output DSM raster path
    #[arg(long, short, default_value="geneva_dsm.tif")]
    output: PathBuf,
}

fn main () {
    tracing_subscriber::fmt()
        .with_env_filter( EnvFilter::try_from_default_env().unwrap_or_else( |_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => DsmConfig::from_ron_file( path),
        None => Ok( config_from_args( &args))
    };

    match config.and_then( |config| make_dsm( &config)) {
        Ok(path) => info!("DSM saved to {:?}, closing", path),
        Err(e) => {
            eprintln!("failed to make DSM: {}", e);
            std::process::exit(1);
        }
    }
}

fn config_from_args (args: &Args)->DsmConfig {
    DsmConfig {
        dem_path: args.dem.clone(),
        footprint_path: args.footprints.clone(),
        output_path: args.output.clone(),
        height_field: args.height_field.clone(),
        height_scale: args.height_scale,
        class_field: args.class_field.clone(),
        extent: args.extent.as_ref().map( |v| BoundingBox::from_wsen( &[v[0],v[1],v[2],v[3]])),
        extent_path: args.extent_file.clone(),
    }
}

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

use std::path::Path;
use anyhow::Result;
use clap::Parser;

use dsm_gdal::{get_raster_info, Dataset, LayerAccess, Metadata};

#[derive(Parser)]
#[command(about="show_meta - show size, bounds and metadata of raster/vector GDAL datasets")]
struct Args {
    /// path to GDAL dataset to analyze
    path: String,
}

fn main ()->Result<()> {
    let args = Args::parse();
    let ds = Dataset::open( Path::new( &args.path))?;

    if ds.raster_count() > 0 {
        let info = get_raster_info( &ds)?;
        println!("raster size: {} cols x {} rows", info.cols, info.rows);
        println!("resolution:  {}, {}", info.dx, info.dy);
        println!("bounds:      west {}  south {}  east {}  north {}",
                 info.bounds().west, info.bounds().south, info.bounds().east, info.bounds().north);
        show_meta( &ds, 0)?;

        for i in 0..ds.raster_count() {
            let band_id = i+1;
            println!("--- band {}", band_id);
            let band = ds.rasterband( band_id)?;
            if let Some(no_data) = band.no_data_value() {
                println!("    no_data: {}", no_data);
            }
            show_meta( &band, 4)?;
        }
    }

    for layer in ds.layers() {
        println!("--- layer '{}' ({} features)", layer.name(), layer.feature_count());
    }

    Ok(())
}

fn show_meta<M> (meta: &M, level: usize)->Result<()> where M: Metadata {
    let indent = String::from_utf8(vec![b' '; level])?;

    if let Ok(descr) = meta.description() {
        if !descr.is_empty() {
            println!("{}description: {}", indent, descr);
        }
    }

    for domain in meta.metadata_domains() {
        if let Some(items) = meta.metadata_domain( &domain) {
            if !items.is_empty() {
                println!("{}domain: {}", indent, domain);
                for item in &items {
                    println!("{}    {}", indent, item);
                }
            }
        }
    }

    Ok(())
}

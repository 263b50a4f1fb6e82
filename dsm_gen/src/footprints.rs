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

use std::collections::HashMap;
use std::path::Path;
use geo::{BoundingRect, Centroid, Point, Polygon};
use tracing::{debug, info, warn};

use dsm_common::BoundingBox;
use dsm_gdal::{same_srs, transform_bounds_2d, transform_polygon, Dataset, LayerAccess, SpatialRef};
use crate::errors::{crs_mismatch, input_not_found, invalid_format, Result};

/// a building footprint polygon with height above ground, in DEM CRS coordinates / linear units
#[derive(Debug,Clone)]
pub struct Footprint {
    pub polygon: Polygon<f64>,
    pub height: f64,
    pub class: Option<String>,
    pub imputed: bool,
}

impl Footprint {
    pub fn new (polygon: Polygon<f64>, height: f64)->Self {
        Footprint { polygon, height, class: None, imputed: false }
    }

    #[inline]
    pub fn has_height (&self)->bool { self.height > 0.0 }
}

/// read the polygon features of a vector dataset into Footprints, reprojected to `dem_srs`.
/// `height_field` holds the building height, scaled by `height_scale` into DEM linear units
/// (0.3048 for survey feet sources). Features without a usable height value load as height 0,
/// to be filled in by imputation.
pub fn load_footprints (path: impl AsRef<Path>, height_field: &str, height_scale: f64,
                        class_field: Option<&str>, dem_srs: &SpatialRef)->Result<Vec<Footprint>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err( input_not_found( path))
    }

    let ds = Dataset::open( path)
        .map_err( |e| invalid_format( format!("not a readable vector dataset {:?} ({})", path, e)))?;
    let mut layer = ds.layer(0)
        .map_err( |_| invalid_format( format!("footprint dataset {:?} has no vector layer", path)))?;
    let layer_srs = normalized_layer_srs( &layer)
        .ok_or_else( || crs_mismatch( format!("footprint layer {:?} has no CRS, cannot reproject to DEM grid", path)))?;
    let needs_transform = !same_srs( &layer_srs, dem_srs);

    let mut footprints: Vec<Footprint> = Vec::new();
    let mut n_missing = 0;
    let mut n_dropped = 0;

    for feature in layer.features() {
        let Some(geometry) = feature.geometry() else { n_dropped += 1; continue };

        let height = feature.field_as_double_by_name( height_field)
            .map_err( |e| invalid_format( format!("footprint dataset {:?} has no usable height field '{}' ({})", path, height_field, e)))?
            .unwrap_or(0.0) * height_scale;
        let class = match class_field {
            Some(field) => feature.field_as_string_by_name( field)
                .map_err( |e| invalid_format( format!("footprint dataset {:?} has no class field '{}' ({})", path, field, e)))?,
            None => None
        };
        if height == 0.0 { n_missing += 1 }

        for polygon in polygons_of( geometry.to_geo()?) {
            let polygon = if needs_transform { transform_polygon( &polygon, &layer_srs, dem_srs)? } else { polygon };
            footprints.push( Footprint { polygon, height, class: class.clone(), imputed: false });
        }
    }

    if n_dropped > 0 {
        debug!("dropped {} features without polygon geometry", n_dropped);
    }
    info!("loaded {} footprints from {:?} ({} without height data)", footprints.len(), path, n_missing);
    Ok(footprints)
}

// rebuild the layer SRS from its WKT so that coordinate transforms see authority axis order,
// not whatever data axis mapping the source driver attached
fn normalized_layer_srs (layer: &dsm_gdal::Layer)->Option<SpatialRef> {
    let srs = layer.spatial_ref()?;
    srs.to_wkt().ok().and_then( |wkt| SpatialRef::from_wkt( &wkt).ok())
}

// polygon features can come as single or multi polygons, everything else is not a footprint
fn polygons_of (geometry: geo::Geometry<f64>)->Vec<Polygon<f64>> {
    match geometry {
        geo::Geometry::Polygon(polygon) => vec![polygon],
        geo::Geometry::MultiPolygon(mp) => mp.0,
        _ => Vec::new()
    }
}

/// the common bounding box of all features of a vector dataset, in `dem_srs` coordinates.
/// This is how a study extent stored as its own (e.g. KML) layer turns into a DEM clip box
pub fn vector_extent (path: impl AsRef<Path>, dem_srs: &SpatialRef)->Result<BoundingBox<f64>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err( input_not_found( path))
    }

    let ds = Dataset::open( path)
        .map_err( |e| invalid_format( format!("not a readable vector dataset {:?} ({})", path, e)))?;
    let mut layer = ds.layer(0)
        .map_err( |_| invalid_format( format!("extent dataset {:?} has no vector layer", path)))?;
    let layer_srs = normalized_layer_srs( &layer)
        .ok_or_else( || crs_mismatch( format!("extent layer {:?} has no CRS, cannot reproject to DEM grid", path)))?;

    let mut bbox: Option<BoundingBox<f64>> = None;
    for feature in layer.features() {
        let Some(geometry) = feature.geometry() else { continue };
        if let Some(rect) = geometry.to_geo()?.bounding_rect() {
            let fb = BoundingBox{ west: rect.min().x, south: rect.min().y, east: rect.max().x, north: rect.max().y };
            bbox = Some( match bbox {
                Some(b) => BoundingBox {
                    west: b.west.min(fb.west), south: b.south.min(fb.south),
                    east: b.east.max(fb.east), north: b.north.max(fb.north)
                },
                None => fb
            });
        }
    }

    let bbox = bbox.ok_or_else( || invalid_format( format!("extent dataset {:?} has no usable features", path)))?;
    if !same_srs( &layer_srs, dem_srs) {
        Ok( transform_bounds_2d( &layer_srs, dem_srs, &bbox, None)? )
    } else {
        Ok(bbox)
    }
}

/// fill in missing building heights: first assign class mean heights (if the source has a
/// class attribute), then fall back to the height of the nearest neighbor with known height.
/// Returns the number of imputed footprints. If no footprint has a known height this is a
/// no-op - the DSM degenerates to the DEM
pub fn impute_heights (footprints: &mut [Footprint])->usize {
    let n_missing = footprints.iter().filter( |fp| !fp.has_height()).count();
    if n_missing == 0 || n_missing == footprints.len() {
        if n_missing > 0 {
            warn!("no footprint has height data, skipping imputation");
        }
        return 0
    }
    info!("{} of {} footprints lack height data", n_missing, footprints.len());

    let n_class = impute_class_means( footprints);
    let n_nearest = impute_nearest( footprints);

    info!("imputed heights for {} footprints ({} by class mean, {} by nearest neighbor)",
          n_class + n_nearest, n_class, n_nearest);
    n_class + n_nearest
}

fn impute_class_means (footprints: &mut [Footprint])->usize {
    let mut sums: HashMap<String,(f64,usize)> = HashMap::new();
    for fp in footprints.iter() {
        if fp.has_height() {
            if let Some(class) = &fp.class {
                let e = sums.entry( class.clone()).or_insert( (0.0,0));
                e.0 += fp.height;
                e.1 += 1;
            }
        }
    }
    if sums.is_empty() { return 0 }

    let mut n_imputed = 0;
    for fp in footprints.iter_mut() {
        if !fp.has_height() {
            if let Some(class) = &fp.class {
                if let Some((sum,n)) = sums.get( class) {
                    fp.height = sum / *n as f64;
                    fp.imputed = true;
                    n_imputed += 1;
                }
            }
        }
    }
    n_imputed
}

fn impute_nearest (footprints: &mut [Footprint])->usize {
    let known: Vec<(Point<f64>,f64)> = footprints.iter()
        .filter( |fp| fp.has_height())
        .filter_map( |fp| fp.polygon.centroid().map( |c| (c, fp.height)))
        .collect();
    if known.is_empty() { return 0 }

    let mut n_imputed = 0;
    for fp in footprints.iter_mut() {
        if !fp.has_height() {
            let Some(centroid) = fp.polygon.centroid() else { continue };

            let mut min_d2 = f64::MAX;
            let mut nearest_height = 0.0;
            for (p,height) in &known {
                let dx = p.x() - centroid.x();
                let dy = p.y() - centroid.y();
                let d2 = dx*dx + dy*dy;
                if d2 < min_d2 {
                    min_d2 = d2;
                    nearest_height = *height;
                }
            }

            fp.height = nearest_height;
            fp.imputed = true;
            n_imputed += 1;
        }
    }
    n_imputed
}

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

use geo::{BoundingRect, Contains, Point};
use ndarray::Array2;
use tracing::{debug, info};

use dsm_gdal::GeoTransformEx;
use crate::errors::Result;
use crate::footprints::Footprint;
use crate::grid::ElevationGrid;

/// burn footprint heights into a grid aligned with `grid`: cells whose center is covered by a
/// footprint polygon hold that footprint's height, all other cells hold 0.
/// Footprints outside the grid extent burn nothing. Overlapping footprints should not occur,
/// if they do the last one in iteration order wins.
pub fn rasterize_footprints (footprints: &[Footprint], grid: &ElevationGrid)->Result<Array2<f64>> {
    let (rows,cols) = grid.data.dim();
    let mut heights: Array2<f64> = Array2::zeros( (rows,cols));
    let geo_to_grid = grid.geo_transform.invert()?;

    let mut n_burned = 0;
    for fp in footprints {
        let Some(rect) = fp.polygon.bounding_rect() else { continue };

        // conservative row/col range for the polygon, clamped to the grid
        let (px0,py0) = geo_to_grid.apply( rect.min().x, rect.min().y);
        let (px1,py1) = geo_to_grid.apply( rect.max().x, rect.max().y);

        let c0 = px0.min(px1).floor().max(0.0) as usize;
        let c1 = (px0.max(px1).ceil().min( cols as f64)) as usize;
        let r0 = py0.min(py1).floor().max(0.0) as usize;
        let r1 = (py0.max(py1).ceil().min( rows as f64)) as usize;
        if c1 <= c0 || r1 <= r0 { continue } // entirely outside the grid

        let mut n_covered = 0;
        for row in r0..r1 {
            for col in c0..c1 {
                let (x,y) = grid.cell_center( row, col);
                if fp.polygon.contains( &Point::new(x,y)) {
                    heights[[row,col]] = fp.height;
                    n_covered += 1;
                }
            }
        }

        if n_covered > 0 {
            n_burned += 1;
            debug!("burned footprint with height {} into {} cells", fp.height, n_covered);
        }
    }

    info!("rasterized {} of {} footprints", n_burned, footprints.len());
    Ok(heights)
}

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

use serde::{Serialize,Deserialize};
use num::{Num,ToPrimitive};

pub mod fs;

/// a generic bounding box without semantics for the coordinate type
#[repr(C)]
#[derive(Debug,Copy,Clone,Serialize,Deserialize,PartialEq)]
pub struct BoundingBox <T: Num> {
    pub west: T,
    pub south: T,
    pub east: T,
    pub north: T
}

impl <T: Num + Copy + PartialOrd + ToPrimitive> BoundingBox<T> {
    pub fn new (west: T, south: T, east: T, north: T)->Self {
        BoundingBox{ west, south, east, north}
    }

    pub fn from_wsen<N> (wsen: &[N;4]) -> BoundingBox<T> where N: Num + Copy + Into<T> {
        BoundingBox::<T>{
            west: wsen[0].into(),
            south: wsen[1].into(),
            east: wsen[2].into(),
            north: wsen[3].into()
        }
    }

    pub fn to_minmax_array (&self) -> [T;4] {
        [self.west,self.south,self.east,self.north]
    }

    pub fn width (&self) -> T {
        self.east - self.west
    }

    pub fn height (&self) -> T {
        self.north - self.south
    }

    pub fn center (&self) -> (f64,f64) {
        ( (self.west + self.east).to_f64().unwrap() / 2.0, (self.south + self.north).to_f64().unwrap() / 2.0 )
    }

    pub fn contains_point (&self, x: T, y: T) -> bool {
        x >= self.west && x <= self.east && y >= self.south && y <= self.north
    }

    /// the overlap of two boxes, or None if they don't intersect
    pub fn intersection (&self, other: &BoundingBox<T>) -> Option<BoundingBox<T>> {
        let west  = if self.west  > other.west  { self.west }  else { other.west };
        let south = if self.south > other.south { self.south } else { other.south };
        let east  = if self.east  < other.east  { self.east }  else { other.east };
        let north = if self.north < other.north { self.north } else { other.north };

        if west < east && south < north {
            Some( BoundingBox{ west, south, east, north } )
        } else {
            None
        }
    }
}

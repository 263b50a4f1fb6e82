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

use dsm_common::BoundingBox;

#[test]
fn test_basic() {
    let bbox = BoundingBox::<f64>::new( -77.1, 42.8, -76.9, 42.9);
    assert_eq!( bbox, BoundingBox::from_wsen( &[-77.1, 42.8, -76.9, 42.9]));

    assert!( (bbox.width() - 0.2).abs() < 1e-12);
    assert!( (bbox.height() - 0.1).abs() < 1e-12);

    let (xc,yc) = bbox.center();
    assert!( (xc + 77.0).abs() < 1e-12);
    assert!( (yc - 42.85).abs() < 1e-12);

    assert!( bbox.contains_point( -77.0, 42.85));
    assert!( !bbox.contains_point( -76.0, 42.85));
}

#[test]
fn test_intersection() {
    let a = BoundingBox::<f64>::new( 0.0, 0.0, 10.0, 10.0);
    let b = BoundingBox::<f64>::new( 5.0, 5.0, 15.0, 15.0);
    let c = BoundingBox::<f64>::new( 20.0, 20.0, 30.0, 30.0);

    assert_eq!( a.intersection(&b), Some( BoundingBox::new( 5.0, 5.0, 10.0, 10.0)));
    assert_eq!( a.intersection(&c), None);
}

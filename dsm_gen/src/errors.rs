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
use std::path::{Path,PathBuf};
use thiserror::Error;
use dsm_gdal::errors::DsmGdalError;

pub type Result<T> = std::result::Result<T, DsmError>;

#[derive(Error,Debug)]
pub enum DsmError {

    #[error("input not found: {0}")]
    InputNotFound(PathBuf),

    #[error("invalid input format: {0}")]
    InvalidFormat(String),

    #[error("CRS mismatch: {0}")]
    CrsMismatch(String),

    #[error("grid shape mismatch: {0}x{1} vs {2}x{3}")]
    ShapeMismatch(usize,usize,usize,usize),

    #[error("failed to write output: {0}")]
    WriteError(String),

    #[error("invalid config: {0}")]
    ConfigError(String),

    // pass through for IO errors
    #[error("DSM IO error: {0}")]
    IOError( #[from] std::io::Error),

    // pass through for the raw GDAL errors of re-exported gdal types
    #[error("GDAL error: {0}")]
    GdalError( #[from] dsm_gdal::GdalError),

    // pass through for DsmGdalErrors
    #[error("dsm gdal error: {0}")]
    DsmGdalError( #[from] DsmGdalError),

}

pub fn input_not_found (path: impl AsRef<Path>)->DsmError {
    DsmError::InputNotFound( path.as_ref().to_path_buf())
}

pub fn invalid_format<S: ToString> (msg: S)->DsmError {
    DsmError::InvalidFormat( msg.to_string())
}

pub fn crs_mismatch<S: ToString> (msg: S)->DsmError {
    DsmError::CrsMismatch( msg.to_string())
}

pub fn write_error<S: ToString> (msg: S)->DsmError {
    DsmError::WriteError( msg.to_string())
}

pub fn config_error<S: ToString> (msg: S)->DsmError {
    DsmError::ConfigError( msg.to_string())
}

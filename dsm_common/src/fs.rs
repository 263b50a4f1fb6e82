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

use std::fs::{self,File};
use std::io::{self, Error as IOError, ErrorKind};
use std::ffi::OsString;
use std::path::{Path,PathBuf};

type Result<T> = std::result::Result<T,std::io::Error>;

pub fn filename<'a,T: AsRef<Path>> (path: &'a T)->Option<&'a str> {
    path.as_ref().file_name().and_then(|ostr| ostr.to_str())
}

pub fn extension<'a,T: AsRef<Path>> (path: &'a T)->Option<&'a str> {
    path.as_ref().extension().and_then(|ostr| ostr.to_str())
}

pub fn filestem <'a,T: AsRef<Path>> (path: &'a T)->Option<&'a str> {
    path.as_ref().file_stem().and_then(|ostr| ostr.to_str())
}

pub fn ensure_dir (path: impl AsRef<Path>)->io::Result<()> {
    let path = path.as_ref();
    if !path.is_dir() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// check if dir pathname exists and is writable, try to create dir otherwise
pub fn ensure_writable_dir (path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    if path.is_dir() {
        let md = fs::metadata(&path)?;
        if md.permissions().readonly() {
            Err( IOError::new( ErrorKind::PermissionDenied, format!("output dir {:?} not writable", &path)))
        } else {
            Ok(())
        }

    } else {
        fs::create_dir_all(path)
    }
}

pub fn existing_non_empty_file_from_path <P: AsRef<Path>> (path: P)-> Result<File> {
    let path = path.as_ref();
    if path.is_file() {
        let md = fs::metadata(path)?;
        if md.len() > 0 {
            File::open(path)
        } else {
            Err( IOError::new( ErrorKind::InvalidData, format!("file empty: {:?}", path)))
        }
    } else {
        Err( IOError::new( ErrorKind::NotFound, format!("file not found: {:?}", path)))
    }
}

/// the temp sibling of `path` that output is written to before it is committed
pub fn part_file_path (path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let mut os: OsString = path.as_os_str().to_os_string();
    os.push(".part");
    PathBuf::from(os)
}

/// move a fully written part file to its final destination (same filesystem, so this is atomic)
pub fn commit_file (part_path: impl AsRef<Path>, path: impl AsRef<Path>) -> Result<()> {
    fs::rename( part_path.as_ref(), path.as_ref())
}

pub fn remove_if_exists (path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.is_file() {
        fs::remove_file(path)?;
    }
    Ok(())
}

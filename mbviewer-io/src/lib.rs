//! I/O operations for mbviewer
//!
//! This crate decodes the PCD files that hold LOD variants, derives the
//! names and URLs of those variants, and defines the seam through which
//! the viewer fetches them.

pub mod pcd;
pub mod lod;
pub mod source;

pub use pcd::{PcdReader, PcdWriter, PcdWriteOptions, PcdDataFormat, PcdHeader, PcdField, PcdFieldType};
pub use lod::*;
pub use source::*;

use mbviewer_core::{PointCloud, Point3f, Result};
use std::path::Path;

/// Read a PCD file from disk
pub fn read_pcd_file<P: AsRef<Path>>(path: P) -> Result<PointCloud<Point3f>> {
    let bytes = std::fs::read(path)?;
    PcdReader::read_bytes(&bytes)
}

/// Write a point cloud to disk as binary PCD
pub fn write_pcd_file<P: AsRef<Path>>(cloud: &PointCloud<Point3f>, path: P) -> Result<()> {
    let bytes = PcdWriter::write_bytes(cloud, &PcdWriteOptions::default())?;
    std::fs::write(path, bytes)?;
    Ok(())
}

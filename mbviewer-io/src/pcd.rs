//! PCD (Point Cloud Data) format support
//!
//! LOD variants are served as `.pcd` files. This module decodes the ASCII and
//! binary encodings into positions and writes both encodings back out.

use mbviewer_core::{PointCloud, Point3f, Result, Error};
use std::io::{BufRead, Cursor, Read, Write};

/// Most points reserved up front; larger clouds grow as records arrive
const PREALLOCATION_LIMIT: usize = 1 << 20;

/// PCD data format variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcdDataFormat {
    Ascii,
    Binary,
    BinaryCompressed,
}

/// PCD field data types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcdFieldType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
}

impl PcdFieldType {
    /// Size of one value in bytes
    pub fn size(&self) -> usize {
        match self {
            PcdFieldType::I8 | PcdFieldType::U8 => 1,
            PcdFieldType::I16 | PcdFieldType::U16 => 2,
            PcdFieldType::I32 | PcdFieldType::U32 | PcdFieldType::F32 => 4,
            PcdFieldType::F64 => 8,
        }
    }

    fn type_char(&self) -> &'static str {
        match self {
            PcdFieldType::I8 | PcdFieldType::I16 | PcdFieldType::I32 => "I",
            PcdFieldType::U8 | PcdFieldType::U16 | PcdFieldType::U32 => "U",
            PcdFieldType::F32 | PcdFieldType::F64 => "F",
        }
    }

    fn from_type_and_size(type_str: &str, size: usize) -> Result<Self> {
        let field_type = match (type_str, size) {
            ("I", 1) => PcdFieldType::I8,
            ("I", 2) => PcdFieldType::I16,
            ("I", 4) => PcdFieldType::I32,
            ("U", 1) => PcdFieldType::U8,
            ("U", 2) => PcdFieldType::U16,
            ("U", 4) => PcdFieldType::U32,
            ("F", 4) => PcdFieldType::F32,
            ("F", 8) => PcdFieldType::F64,
            _ => return Err(Error::InvalidData(format!("Unknown field type/size combination: {}/{}", type_str, size))),
        };
        Ok(field_type)
    }

    /// Decode one little-endian value as f64
    fn decode_le(&self, bytes: &[u8]) -> f64 {
        match self {
            PcdFieldType::I8 => bytes[0] as i8 as f64,
            PcdFieldType::U8 => bytes[0] as f64,
            PcdFieldType::I16 => i16::from_le_bytes([bytes[0], bytes[1]]) as f64,
            PcdFieldType::U16 => u16::from_le_bytes([bytes[0], bytes[1]]) as f64,
            PcdFieldType::I32 => i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
            PcdFieldType::U32 => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
            PcdFieldType::F32 => f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
            PcdFieldType::F64 => {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(&bytes[..8]);
                f64::from_le_bytes(buf)
            }
        }
    }
}

/// PCD field definition
#[derive(Debug, Clone, PartialEq)]
pub struct PcdField {
    pub name: String,
    pub field_type: PcdFieldType,
    pub count: usize,
}

impl PcdField {
    fn xyz() -> Vec<PcdField> {
        ["x", "y", "z"]
            .iter()
            .map(|name| PcdField {
                name: name.to_string(),
                field_type: PcdFieldType::F32,
                count: 1,
            })
            .collect()
    }
}

/// PCD header information
#[derive(Debug, Clone, PartialEq)]
pub struct PcdHeader {
    pub version: String,
    pub fields: Vec<PcdField>,
    pub width: usize,
    pub height: usize,
    pub viewpoint: [f64; 7], // tx, ty, tz, qw, qx, qy, qz
    pub data_format: PcdDataFormat,
}

impl PcdHeader {
    /// Number of points declared by the header
    pub fn point_count(&self) -> usize {
        self.width.saturating_mul(self.height)
    }

    /// Size in bytes of one binary record
    pub fn record_size(&self) -> usize {
        self.fields.iter().map(|f| f.field_type.size() * f.count).sum()
    }

    /// Index of the named field
    fn field_index(&self, name: &str) -> Result<usize> {
        self.fields
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| Error::InvalidData(format!("Missing {} coordinate in PCD fields", name)))
    }
}

/// PCD write options
#[derive(Debug, Clone)]
pub struct PcdWriteOptions {
    pub data_format: PcdDataFormat,
    pub version: String,
    pub viewpoint: Option<[f64; 7]>,
}

impl Default for PcdWriteOptions {
    fn default() -> Self {
        Self {
            data_format: PcdDataFormat::Binary,
            version: "0.7".to_string(),
            viewpoint: None,
        }
    }
}

/// PCD decoder for downloaded LOD files
pub struct PcdReader;

impl PcdReader {
    /// Decode a complete PCD file held in memory into positions
    pub fn read_bytes(bytes: &[u8]) -> Result<PointCloud<Point3f>> {
        let mut cursor = Cursor::new(bytes);
        let header = Self::read_header(&mut cursor)?;
        Self::read_points(&mut cursor, &header)
    }

    /// Read PCD header, leaving the reader positioned at the first data byte
    pub fn read_header<R: BufRead>(reader: &mut R) -> Result<PcdHeader> {
        let mut version = None;
        let mut names = Vec::new();
        let mut sizes = Vec::new();
        let mut types = Vec::new();
        let mut counts = Vec::new();
        let mut width = None;
        let mut height = None;
        let mut viewpoint = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0];
        let mut points = None;
        let data_format;

        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line)?;
            if bytes_read == 0 {
                return Err(Error::InvalidData("Unexpected end of file in PCD header".to_string()));
            }

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = trimmed.split_whitespace().collect();
            let values = &parts[1..];

            match parts[0] {
                "VERSION" => version = values.first().map(|v| v.to_string()),
                "FIELDS" => names = values.iter().map(|v| v.to_string()).collect(),
                "SIZE" => sizes = parse_all::<usize>("SIZE", values)?,
                "TYPE" => types = values.iter().map(|v| v.to_string()).collect(),
                "COUNT" => counts = parse_all::<usize>("COUNT", values)?,
                "WIDTH" => width = parse_all::<usize>("WIDTH", values)?.first().copied(),
                "HEIGHT" => height = parse_all::<usize>("HEIGHT", values)?.first().copied(),
                "POINTS" => points = parse_all::<usize>("POINTS", values)?.first().copied(),
                "VIEWPOINT" => {
                    let parsed = parse_all::<f64>("VIEWPOINT", values)?;
                    if parsed.len() == 7 {
                        viewpoint.copy_from_slice(&parsed);
                    }
                }
                "DATA" => {
                    data_format = match values.first().copied() {
                        Some("ascii") => PcdDataFormat::Ascii,
                        Some("binary") => PcdDataFormat::Binary,
                        Some("binary_compressed") => PcdDataFormat::BinaryCompressed,
                        other => {
                            return Err(Error::InvalidData(format!("Unknown PCD DATA format: {:?}", other)))
                        }
                    };
                    break;
                }
                _ => {
                    // Ignore unknown header fields
                }
            }
        }

        let version = version.ok_or_else(|| Error::InvalidData("Missing VERSION in PCD header".to_string()))?;
        let width = width.ok_or_else(|| Error::InvalidData("Missing WIDTH in PCD header".to_string()))?;
        let height = height.unwrap_or(1);

        // COUNT is optional and defaults to one value per field
        if counts.is_empty() {
            counts = vec![1; names.len()];
        }
        if names.len() != sizes.len() || names.len() != types.len() || names.len() != counts.len() {
            return Err(Error::InvalidData("Mismatch between FIELDS, SIZE, TYPE, and COUNT declarations".to_string()));
        }

        let mut fields = Vec::with_capacity(names.len());
        for (i, name) in names.into_iter().enumerate() {
            fields.push(PcdField {
                name,
                field_type: PcdFieldType::from_type_and_size(&types[i], sizes[i])?,
                count: counts[i],
            });
        }

        let total = width
            .checked_mul(height)
            .ok_or_else(|| Error::InvalidData(format!("WIDTH * HEIGHT overflows ({} x {})", width, height)))?;
        if let Some(points) = points {
            if points != total {
                return Err(Error::InvalidData(format!("POINTS ({}) doesn't match WIDTH * HEIGHT ({})", points, total)));
            }
        }

        fields
            .iter()
            .try_fold(0usize, |acc, f| {
                f.field_type.size().checked_mul(f.count).and_then(|n| acc.checked_add(n))
            })
            .ok_or_else(|| Error::InvalidData("PCD record size overflows".to_string()))?;
        for field in fields.iter().filter(|f| matches!(f.name.as_str(), "x" | "y" | "z")) {
            if field.count == 0 {
                return Err(Error::InvalidData(format!("Coordinate field {} has COUNT 0", field.name)));
            }
        }

        Ok(PcdHeader {
            version,
            fields,
            width,
            height,
            viewpoint,
            data_format,
        })
    }

    /// Read point positions based on header format
    pub fn read_points<R: BufRead>(reader: &mut R, header: &PcdHeader) -> Result<PointCloud<Point3f>> {
        match header.data_format {
            PcdDataFormat::Ascii => Self::read_ascii_points(reader, header),
            PcdDataFormat::Binary => Self::read_binary_points(reader, header),
            PcdDataFormat::BinaryCompressed => {
                Err(Error::Unsupported("Binary compressed PCD format not yet supported".to_string()))
            }
        }
    }

    fn read_ascii_points<R: BufRead>(reader: &mut R, header: &PcdHeader) -> Result<PointCloud<Point3f>> {
        // Column of the first value of each coordinate field
        let mut columns = [0usize; 3];
        for (axis, name) in ["x", "y", "z"].iter().enumerate() {
            let index = header.field_index(name)?;
            columns[axis] = header.fields[..index].iter().map(|f| f.count).sum();
        }

        let mut cloud = PointCloud::with_capacity(header.point_count().min(PREALLOCATION_LIMIT));
        let mut line = String::new();

        while cloud.len() < header.point_count() {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                return Err(Error::InvalidData(format!(
                    "PCD data ended after {} of {} points",
                    cloud.len(),
                    header.point_count()
                )));
            }

            let values: Vec<&str> = line.split_whitespace().collect();
            if values.is_empty() {
                continue;
            }

            let mut coords = [0.0f32; 3];
            for (axis, &column) in columns.iter().enumerate() {
                let raw = values
                    .get(column)
                    .ok_or_else(|| Error::InvalidData("Not enough values in ASCII PCD line".to_string()))?;
                coords[axis] = raw
                    .parse::<f64>()
                    .map_err(|_| Error::InvalidData(format!("Invalid coordinate value: {}", raw)))? as f32;
            }

            cloud.push(Point3f::new(coords[0], coords[1], coords[2]));
        }

        Ok(cloud)
    }

    fn read_binary_points<R: Read>(reader: &mut R, header: &PcdHeader) -> Result<PointCloud<Point3f>> {
        // Byte offset and type of each coordinate within a record
        let mut layout = [(0usize, PcdFieldType::F32); 3];
        for (axis, name) in ["x", "y", "z"].iter().enumerate() {
            let index = header.field_index(name)?;
            let offset = header.fields[..index]
                .iter()
                .map(|f| f.field_type.size() * f.count)
                .sum();
            layout[axis] = (offset, header.fields[index].field_type);
        }

        let record_size = header.record_size();
        let mut record = vec![0u8; record_size];
        let mut cloud = PointCloud::with_capacity(header.point_count().min(PREALLOCATION_LIMIT));

        for _ in 0..header.point_count() {
            reader.read_exact(&mut record)?;

            let coord = |axis: usize| {
                let (offset, field_type) = layout[axis];
                field_type.decode_le(&record[offset..offset + field_type.size()]) as f32
            };
            cloud.push(Point3f::new(coord(0), coord(1), coord(2)));
        }

        Ok(cloud)
    }
}

fn parse_all<T: std::str::FromStr>(key: &str, values: &[&str]) -> Result<Vec<T>> {
    values
        .iter()
        .map(|v| {
            v.parse::<T>()
                .map_err(|_| Error::InvalidData(format!("Invalid {} value: {}", key, v)))
        })
        .collect()
}

/// PCD encoder for positions-only clouds
pub struct PcdWriter;

impl PcdWriter {
    /// Encode a point cloud into an in-memory PCD file
    pub fn write_bytes(cloud: &PointCloud<Point3f>, options: &PcdWriteOptions) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        Self::write_point_cloud_to_writer(cloud, &mut buffer, options)?;
        Ok(buffer)
    }

    /// Write point cloud to writer with options
    pub fn write_point_cloud_to_writer<W: Write>(
        cloud: &PointCloud<Point3f>,
        writer: &mut W,
        options: &PcdWriteOptions
    ) -> Result<()> {
        let header = PcdHeader {
            version: options.version.clone(),
            fields: PcdField::xyz(),
            width: cloud.len(),
            height: 1,
            viewpoint: options.viewpoint.unwrap_or([0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]),
            data_format: options.data_format,
        };

        Self::write_header(writer, &header)?;

        match options.data_format {
            PcdDataFormat::Ascii => {
                for point in cloud.iter() {
                    writeln!(writer, "{} {} {}", point.x, point.y, point.z)?;
                }
                Ok(())
            }
            PcdDataFormat::Binary => {
                for point in cloud.iter() {
                    writer.write_all(&point.x.to_le_bytes())?;
                    writer.write_all(&point.y.to_le_bytes())?;
                    writer.write_all(&point.z.to_le_bytes())?;
                }
                Ok(())
            }
            PcdDataFormat::BinaryCompressed => {
                Err(Error::Unsupported("Binary compressed PCD format not yet supported".to_string()))
            }
        }
    }

    fn write_header<W: Write>(writer: &mut W, header: &PcdHeader) -> Result<()> {
        let join = |f: &dyn Fn(&PcdField) -> String| {
            header.fields.iter().map(f).collect::<Vec<_>>().join(" ")
        };

        writeln!(writer, "# .PCD v{} - Point Cloud Data file format", header.version)?;
        writeln!(writer, "VERSION {}", header.version)?;
        writeln!(writer, "FIELDS {}", join(&|f: &PcdField| f.name.clone()))?;
        writeln!(writer, "SIZE {}", join(&|f: &PcdField| f.field_type.size().to_string()))?;
        writeln!(writer, "TYPE {}", join(&|f: &PcdField| f.field_type.type_char().to_string()))?;
        writeln!(writer, "COUNT {}", join(&|f: &PcdField| f.count.to_string()))?;
        writeln!(writer, "WIDTH {}", header.width)?;
        writeln!(writer, "HEIGHT {}", header.height)?;
        let vp = header.viewpoint;
        writeln!(writer, "VIEWPOINT {} {} {} {} {} {} {}", vp[0], vp[1], vp[2], vp[3], vp[4], vp[5], vp[6])?;
        writeln!(writer, "POINTS {}", header.point_count())?;

        let data_str = match header.data_format {
            PcdDataFormat::Ascii => "ascii",
            PcdDataFormat::Binary => "binary",
            PcdDataFormat::BinaryCompressed => "binary_compressed",
        };
        writeln!(writer, "DATA {}", data_str)?;

        Ok(())
    }
}

//! PLY vertex tables.
//!
//! Only the `vertex` element is kept. Every scalar vertex property survives a
//! load/filter/save cycle with its original name and type; `x`, `y`, `z`
//! are required.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlyEncoding {
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
}

impl PlyEncoding {
    fn keyword(self) -> &'static str {
        match self {
            PlyEncoding::Ascii => "ascii",
            PlyEncoding::BinaryLittleEndian => "binary_little_endian",
            PlyEncoding::BinaryBigEndian => "binary_big_endian",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlyScalarType {
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
}

impl PlyScalarType {
    fn parse(value: &str) -> Result<Self, String> {
        match value {
            "char" | "int8" => Ok(PlyScalarType::Int8),
            "uchar" | "uint8" => Ok(PlyScalarType::Uint8),
            "short" | "int16" => Ok(PlyScalarType::Int16),
            "ushort" | "uint16" => Ok(PlyScalarType::Uint16),
            "int" | "int32" => Ok(PlyScalarType::Int32),
            "uint" | "uint32" => Ok(PlyScalarType::Uint32),
            "float" | "float32" => Ok(PlyScalarType::Float32),
            "double" | "float64" => Ok(PlyScalarType::Float64),
            _ => Err(format!("Unsupported PLY property type '{value}'")),
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            PlyScalarType::Int8 => "char",
            PlyScalarType::Uint8 => "uchar",
            PlyScalarType::Int16 => "short",
            PlyScalarType::Uint16 => "ushort",
            PlyScalarType::Int32 => "int",
            PlyScalarType::Uint32 => "uint",
            PlyScalarType::Float32 => "float",
            PlyScalarType::Float64 => "double",
        }
    }

    fn size(self) -> usize {
        match self {
            PlyScalarType::Int8 | PlyScalarType::Uint8 => 1,
            PlyScalarType::Int16 | PlyScalarType::Uint16 => 2,
            PlyScalarType::Int32 | PlyScalarType::Uint32 | PlyScalarType::Float32 => 4,
            PlyScalarType::Float64 => 8,
        }
    }

    fn is_integer(self) -> bool {
        !matches!(self, PlyScalarType::Float32 | PlyScalarType::Float64)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct PlyProperty {
    name: String,
    data_type: PlyScalarType,
}

#[derive(Debug)]
struct PlyHeader {
    encoding: PlyEncoding,
    vertex_count: usize,
    rows_before_vertex: usize,
    properties: Vec<PlyProperty>,
}

/// Vertex rows of a PLY file, stored row-major as `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlyCloud {
    pub encoding: PlyEncoding,
    properties: Vec<PlyProperty>,
    values: Vec<f64>,
    xyz: [usize; 3],
}

impl PlyCloud {
    /// A cloud with only `double` x, y, z properties.
    pub fn from_positions(points: &[[f64; 3]]) -> Self {
        let properties = ["x", "y", "z"]
            .into_iter()
            .map(|name| PlyProperty {
                name: name.to_string(),
                data_type: PlyScalarType::Float64,
            })
            .collect();
        Self {
            encoding: PlyEncoding::BinaryLittleEndian,
            properties,
            values: points.iter().flatten().copied().collect(),
            xyz: [0, 1, 2],
        }
    }

    pub fn len(&self) -> usize {
        if self.properties.is_empty() {
            0
        } else {
            self.values.len() / self.properties.len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|prop| prop.name.as_str())
    }

    pub fn row(&self, index: usize) -> &[f64] {
        let stride = self.properties.len();
        &self.values[index * stride..(index + 1) * stride]
    }

    pub fn positions(&self) -> Vec<[f64; 3]> {
        (0..self.len())
            .map(|idx| {
                let row = self.row(idx);
                [row[self.xyz[0]], row[self.xyz[1]], row[self.xyz[2]]]
            })
            .collect()
    }

    /// Drops every row whose flag is `false`.
    pub fn retain(&mut self, mask: &[bool]) {
        let stride = self.properties.len();
        let mut rows = mask.iter();
        let mut kept = Vec::with_capacity(self.values.len());
        for row in self.values.chunks_exact(stride) {
            if rows.next().copied().unwrap_or(false) {
                kept.extend_from_slice(row);
            }
        }
        self.values = kept;
    }

    pub fn to_bytes(&self, encoding: PlyEncoding) -> Vec<u8> {
        let mut header = format!(
            "ply\nformat {} 1.0\ncomment written by octfilter\nelement vertex {}\n",
            encoding.keyword(),
            self.len()
        );
        for prop in &self.properties {
            header.push_str(&format!("property {} {}\n", prop.data_type.keyword(), prop.name));
        }
        header.push_str("end_header\n");

        let mut out = header.into_bytes();
        for idx in 0..self.len() {
            let row = self.row(idx);
            match encoding {
                PlyEncoding::Ascii => {
                    let line: Vec<String> = row
                        .iter()
                        .zip(&self.properties)
                        .map(|(value, prop)| {
                            if prop.data_type.is_integer() {
                                format!("{}", *value as i64)
                            } else {
                                format!("{value}")
                            }
                        })
                        .collect();
                    out.extend_from_slice(line.join(" ").as_bytes());
                    out.push(b'\n');
                }
                PlyEncoding::BinaryLittleEndian | PlyEncoding::BinaryBigEndian => {
                    let little = encoding == PlyEncoding::BinaryLittleEndian;
                    for (value, prop) in row.iter().zip(&self.properties) {
                        write_scalar(&mut out, *value, prop.data_type, little);
                    }
                }
            }
        }
        out
    }
}

pub fn parse_ply_bytes(data: &[u8]) -> Result<PlyCloud, String> {
    let (header, data_start) = parse_header_bytes(data)?;
    let find = |name: &str| {
        header
            .properties
            .iter()
            .position(|prop| prop.name == name)
            .ok_or_else(|| "PLY is missing position properties (x, y, z)".to_string())
    };
    let xyz = [find("x")?, find("y")?, find("z")?];

    let values = match header.encoding {
        PlyEncoding::Ascii => {
            let text = std::str::from_utf8(&data[data_start..])
                .map_err(|_| "PLY ASCII data is not UTF-8".to_string())?;
            parse_ascii_rows(text, &header)?
        }
        PlyEncoding::BinaryLittleEndian | PlyEncoding::BinaryBigEndian => {
            if header.rows_before_vertex > 0 {
                return Err("Binary PLY elements before 'vertex' are not supported".to_string());
            }
            let little = header.encoding == PlyEncoding::BinaryLittleEndian;
            parse_binary_rows(&data[data_start..], &header, little)?
        }
    };

    Ok(PlyCloud {
        encoding: header.encoding,
        properties: header.properties,
        values,
        xyz,
    })
}

fn parse_header_bytes(data: &[u8]) -> Result<(PlyHeader, usize), String> {
    let mut line_start = 0usize;
    let mut header_end = None;
    for (idx, byte) in data.iter().enumerate() {
        if *byte != b'\n' {
            continue;
        }
        let line = String::from_utf8_lossy(&data[line_start..idx]);
        if line.trim() == "end_header" {
            header_end = Some(idx + 1);
            break;
        }
        line_start = idx + 1;
    }

    let header_end = header_end.ok_or_else(|| "PLY header is missing end_header".to_string())?;
    let header_text = std::str::from_utf8(&data[..header_end])
        .map_err(|_| "PLY header is not ASCII".to_string())?;
    Ok((parse_header(header_text)?, header_end))
}

fn parse_header(text: &str) -> Result<PlyHeader, String> {
    let mut lines = text.lines();
    let first = lines.next().ok_or_else(|| "PLY header is missing".to_string())?;
    if first.trim() != "ply" {
        return Err("Not a PLY file".to_string());
    }

    let mut encoding = None;
    let mut vertex_count = None;
    let mut rows_before_vertex = 0usize;
    let mut properties = Vec::new();
    let mut in_vertex = false;

    for line in lines {
        let line = line.trim();
        if line.is_empty() || line.starts_with("comment") || line.starts_with("obj_info") {
            continue;
        }
        if line == "end_header" {
            break;
        }

        let mut parts = line.split_whitespace();
        let Some(tag) = parts.next() else {
            continue;
        };
        match tag {
            "format" => {
                encoding = Some(match parts.next().unwrap_or("") {
                    "ascii" => PlyEncoding::Ascii,
                    "binary_little_endian" => PlyEncoding::BinaryLittleEndian,
                    "binary_big_endian" => PlyEncoding::BinaryBigEndian,
                    other => return Err(format!("Unknown PLY format '{other}'")),
                });
            }
            "element" => {
                let name = parts.next().unwrap_or("");
                let count = parts
                    .next()
                    .ok_or_else(|| format!("Malformed PLY element '{name}'"))?
                    .parse::<usize>()
                    .map_err(|_| format!("Malformed PLY element count for '{name}'"))?;
                in_vertex = name == "vertex";
                if in_vertex {
                    vertex_count = Some(count);
                } else if vertex_count.is_none() {
                    rows_before_vertex += count;
                }
            }
            "property" if in_vertex => {
                let prop_type = parts.next().unwrap_or("");
                if prop_type == "list" {
                    let name = parts.last().unwrap_or("");
                    return Err(format!("PLY vertex list property '{name}' is not supported"));
                }
                let data_type = PlyScalarType::parse(prop_type)?;
                let name = parts.next().unwrap_or("").to_string();
                if name.is_empty() {
                    return Err(format!("PLY {prop_type} property missing name"));
                }
                properties.push(PlyProperty { name, data_type });
            }
            _ => {}
        }
    }

    let encoding = encoding.ok_or_else(|| "PLY format not specified".to_string())?;
    let vertex_count = vertex_count.ok_or_else(|| "PLY has no vertex element".to_string())?;
    Ok(PlyHeader {
        encoding,
        vertex_count,
        rows_before_vertex,
        properties,
    })
}

fn parse_ascii_rows(text: &str, header: &PlyHeader) -> Result<Vec<f64>, String> {
    let stride = header.properties.len();
    let expected = header
        .vertex_count
        .checked_mul(stride)
        .ok_or_else(|| "PLY vertex count is too large".to_string())?;
    let mut values = Vec::with_capacity(expected.min(text.len() / 2));
    let mut rows = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .skip(header.rows_before_vertex);

    for read in 0..header.vertex_count {
        let line = rows
            .next()
            .ok_or_else(|| "Unexpected end of PLY vertex data".to_string())?;
        let before = values.len();
        for token in line.split_whitespace().take(stride) {
            let value = token
                .parse::<f64>()
                .map_err(|_| format!("Invalid PLY value '{token}' in vertex {read}"))?;
            values.push(value);
        }
        if values.len() - before < stride {
            return Err(format!("PLY vertex {read} has too few values"));
        }
    }
    Ok(values)
}

fn parse_binary_rows(data: &[u8], header: &PlyHeader, little: bool) -> Result<Vec<f64>, String> {
    let row_size: usize = header.properties.iter().map(|prop| prop.data_type.size()).sum();
    let needed = row_size
        .checked_mul(header.vertex_count)
        .ok_or_else(|| "PLY vertex count is too large".to_string())?;
    if data.len() < needed {
        return Err("Unexpected end of binary PLY data".to_string());
    }

    let mut values = Vec::with_capacity(header.vertex_count * header.properties.len());
    for row in data[..needed].chunks_exact(row_size.max(1)) {
        let mut cursor = 0usize;
        for prop in &header.properties {
            let size = prop.data_type.size();
            values.push(read_scalar(&row[cursor..cursor + size], prop.data_type, little));
            cursor += size;
        }
    }
    Ok(values)
}

fn take<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

fn read_scalar(bytes: &[u8], data_type: PlyScalarType, little: bool) -> f64 {
    match data_type {
        PlyScalarType::Int8 => bytes[0] as i8 as f64,
        PlyScalarType::Uint8 => bytes[0] as f64,
        PlyScalarType::Int16 => {
            let raw = take::<2>(bytes);
            (if little { i16::from_le_bytes(raw) } else { i16::from_be_bytes(raw) }) as f64
        }
        PlyScalarType::Uint16 => {
            let raw = take::<2>(bytes);
            (if little { u16::from_le_bytes(raw) } else { u16::from_be_bytes(raw) }) as f64
        }
        PlyScalarType::Int32 => {
            let raw = take::<4>(bytes);
            (if little { i32::from_le_bytes(raw) } else { i32::from_be_bytes(raw) }) as f64
        }
        PlyScalarType::Uint32 => {
            let raw = take::<4>(bytes);
            (if little { u32::from_le_bytes(raw) } else { u32::from_be_bytes(raw) }) as f64
        }
        PlyScalarType::Float32 => {
            let raw = take::<4>(bytes);
            (if little { f32::from_le_bytes(raw) } else { f32::from_be_bytes(raw) }) as f64
        }
        PlyScalarType::Float64 => {
            let raw = take::<8>(bytes);
            if little {
                f64::from_le_bytes(raw)
            } else {
                f64::from_be_bytes(raw)
            }
        }
    }
}

fn put<const N: usize>(out: &mut Vec<u8>, le: [u8; N], be: [u8; N], little: bool) {
    out.extend_from_slice(if little { &le } else { &be });
}

fn write_scalar(out: &mut Vec<u8>, value: f64, data_type: PlyScalarType, little: bool) {
    match data_type {
        PlyScalarType::Int8 => out.push(value as i8 as u8),
        PlyScalarType::Uint8 => out.push(value as u8),
        PlyScalarType::Int16 => {
            let v = value as i16;
            put(out, v.to_le_bytes(), v.to_be_bytes(), little);
        }
        PlyScalarType::Uint16 => {
            let v = value as u16;
            put(out, v.to_le_bytes(), v.to_be_bytes(), little);
        }
        PlyScalarType::Int32 => {
            let v = value as i32;
            put(out, v.to_le_bytes(), v.to_be_bytes(), little);
        }
        PlyScalarType::Uint32 => {
            let v = value as u32;
            put(out, v.to_le_bytes(), v.to_be_bytes(), little);
        }
        PlyScalarType::Float32 => {
            let v = value as f32;
            put(out, v.to_le_bytes(), v.to_be_bytes(), little);
        }
        PlyScalarType::Float64 => put(out, value.to_le_bytes(), value.to_be_bytes(), little),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_ply_bytes, PlyCloud, PlyEncoding};

    const ASCII_WITH_COLOR: &str = "\
ply
format ascii 1.0
comment exported by a scanner
element vertex 3
property float x
property float y
property float z
property uchar red
property uchar green
property uchar blue
element face 0
property list uchar int vertex_indices
end_header
0 0 0 255 0 0
1 2 3 0 255 0
4 5 6 0 0 255
";

    #[test]
    fn parse_ascii_keeps_extra_properties() {
        let cloud = parse_ply_bytes(ASCII_WITH_COLOR.as_bytes()).expect("parse");
        assert_eq!(cloud.len(), 3);
        assert_eq!(cloud.encoding, PlyEncoding::Ascii);
        assert_eq!(
            cloud.property_names().collect::<Vec<_>>(),
            vec!["x", "y", "z", "red", "green", "blue"]
        );
        assert_eq!(cloud.positions()[1], [1.0, 2.0, 3.0]);
        assert_eq!(cloud.row(2), &[4.0, 5.0, 6.0, 0.0, 0.0, 255.0]);
    }

    fn header_with_count(format: &str, count: &str) -> Vec<u8> {
        format!(
            "ply\nformat {format} 1.0\nelement vertex {count}\nproperty float x\nproperty float y\nproperty float z\nend_header\n0 0 0\n"
        )
        .into_bytes()
    }

    #[test]
    fn overflowing_vertex_count_is_rejected() {
        let ascii = header_with_count("ascii", "18446744073709551615");
        let err = parse_ply_bytes(&ascii).expect_err("ascii overflow");
        assert_eq!(err, "PLY vertex count is too large");

        let binary = header_with_count("binary_little_endian", "1537228672809129302");
        let err = parse_ply_bytes(&binary).expect_err("binary overflow");
        assert_eq!(err, "PLY vertex count is too large");
    }

    #[test]
    fn huge_vertex_count_fails_without_reserving() {
        let ascii = header_with_count("ascii", "1000000000000");
        let err = parse_ply_bytes(&ascii).expect_err("ascii truncated");
        assert_eq!(err, "Unexpected end of PLY vertex data");

        let binary = header_with_count("binary_big_endian", "1000000000000");
        let err = parse_ply_bytes(&binary).expect_err("binary truncated");
        assert_eq!(err, "Unexpected end of binary PLY data");
    }

    #[test]
    fn header_errors_name_the_element() {
        let text = "ply\nformat ascii 1.0\nelement vertex many\nend_header\n";
        let err = parse_ply_bytes(text.as_bytes()).expect_err("bad count");
        assert!(err.contains("'vertex'"), "{err}");
    }

    #[test]
    fn retain_and_write_ascii() {
        let mut cloud = parse_ply_bytes(ASCII_WITH_COLOR.as_bytes()).expect("parse");
        cloud.retain(&[true, false, true]);
        let text = String::from_utf8(cloud.to_bytes(PlyEncoding::Ascii)).expect("utf8");
        assert!(text.contains("element vertex 2\n"));
        assert!(text.contains("property uchar red\n"));
        assert!(text.ends_with("end_header\n0 0 0 255 0 0\n4 5 6 0 0 255\n"));
    }

    #[test]
    fn parse_binary_little_endian() {
        let header = "\
ply
format binary_little_endian 1.0
element vertex 2
property float x
property double y
property float z
property ushort intensity
end_header
";
        let mut data = Vec::from(header.as_bytes());
        for (x, y, z, intensity) in [(1.0f32, 2.0f64, 3.0f32, 7u16), (-1.5, 0.25, 8.0, 9)] {
            data.extend_from_slice(&x.to_le_bytes());
            data.extend_from_slice(&y.to_le_bytes());
            data.extend_from_slice(&z.to_le_bytes());
            data.extend_from_slice(&intensity.to_le_bytes());
        }

        let cloud = parse_ply_bytes(&data).expect("parse");
        assert_eq!(cloud.positions(), vec![[1.0, 2.0, 3.0], [-1.5, 0.25, 8.0]]);
        assert_eq!(cloud.row(1)[3], 9.0);
    }

    #[test]
    fn binary_output_reads_back_with_types() {
        let mut cloud = parse_ply_bytes(ASCII_WITH_COLOR.as_bytes()).expect("parse");
        cloud.retain(&[false, true, true]);
        for encoding in [PlyEncoding::BinaryLittleEndian, PlyEncoding::BinaryBigEndian] {
            let reread = parse_ply_bytes(&cloud.to_bytes(encoding)).expect("reparse");
            assert_eq!(reread.encoding, encoding);
            assert_eq!(reread.positions(), vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
            assert_eq!(reread.row(0)[4], 255.0);
        }
    }

    #[test]
    fn truncated_binary_data_is_an_error() {
        let mut data = Vec::from(
            "ply\nformat binary_little_endian 1.0\nelement vertex 2\nproperty float x\nproperty float y\nproperty float z\nend_header\n"
                .as_bytes(),
        );
        data.extend_from_slice(&[0u8; 12]);
        assert_eq!(
            parse_ply_bytes(&data),
            Err("Unexpected end of binary PLY data".to_string())
        );
    }

    #[test]
    fn missing_position_is_an_error() {
        let data = "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nproperty float y\nend_header\n0 0\n";
        assert!(parse_ply_bytes(data.as_bytes()).is_err());
    }

    #[test]
    fn ascii_elements_before_vertex_are_skipped() {
        let data = "\
ply
format ascii 1.0
element camera 1
property float fov
element vertex 1
property float x
property float y
property float z
end_header
60
1 2 3
";
        let cloud = parse_ply_bytes(data.as_bytes()).expect("parse");
        assert_eq!(cloud.positions(), vec![[1.0, 2.0, 3.0]]);
    }

    #[test]
    fn from_positions_writes_doubles() {
        let cloud = PlyCloud::from_positions(&[[0.1, 0.2, 0.3]]);
        let reread = parse_ply_bytes(&cloud.to_bytes(PlyEncoding::BinaryLittleEndian))
            .expect("reparse");
        assert_eq!(reread.positions(), vec![[0.1, 0.2, 0.3]]);
    }
}

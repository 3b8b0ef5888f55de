use log::{debug, warn};

use crate::error::PlyError;
use crate::reader::ScalarType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlyFormat {
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
}

impl PlyFormat {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "ascii" => Some(Self::Ascii),
            "binary_little_endian" => Some(Self::BinaryLittleEndian),
            "binary_big_endian" => Some(Self::BinaryBigEndian),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascii => "ascii",
            Self::BinaryLittleEndian => "binary_little_endian",
            Self::BinaryBigEndian => "binary_big_endian",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDef {
    pub name: String,
    pub ty: ScalarType,
}

#[derive(Debug, Clone)]
pub struct PlyHeader {
    pub format: PlyFormat,
    pub vertex_count: usize,
    pub properties: Vec<PropertyDef>,
    /// Byte offset of the first vertex record.
    pub header_len: usize,
}

/// Element the following `property` lines belong to.
enum Section {
    Preamble,
    Vertex,
    Skipped,
}

#[inline]
pub(crate) fn next_line<'b>(buffer: &'b [u8], offset: &mut usize) -> Option<&'b [u8]> {
    if *offset >= buffer.len() {
        return None;
    }
    let start = *offset;

    match memchr::memchr(b'\n', &buffer[start..]) {
        Some(pos) => {
            *offset = start + pos + 1;
            Some(&buffer[start..start + pos])
        }
        None => {
            *offset = buffer.len();
            Some(&buffer[start..])
        }
    }
}

pub fn parse_header(raw_data: &[u8]) -> Result<PlyHeader, PlyError> {
    let mut offset = 0;

    // Anything before the magic line is noise.
    loop {
        let line = next_line(raw_data, &mut offset)
            .ok_or_else(|| PlyError::header("no 'ply' line"))?;
        if line.trim_ascii() == b"ply" {
            break;
        }
    }

    let mut format = None;
    let mut vertex_count = None;
    let mut properties: Vec<PropertyDef> = Vec::new();
    let mut section = Section::Preamble;

    loop {
        let line = next_line(raw_data, &mut offset)
            .ok_or_else(|| PlyError::header("no 'end_header' found before EOF"))?;
        let line = String::from_utf8_lossy(line);
        let mut words = line.split_whitespace();

        match words.next() {
            Some("end_header") => break,
            Some("format") => {
                let token = words.next().unwrap_or_default();
                format = Some(
                    PlyFormat::parse(token)
                        .ok_or_else(|| PlyError::header(format!("unknown format '{token}'")))?,
                );
            }
            Some("element") => {
                let name = words
                    .next()
                    .ok_or_else(|| PlyError::header("element without a name"))?;
                let count: usize = words
                    .next()
                    .and_then(|c| c.parse().ok())
                    .ok_or_else(|| PlyError::header(format!("bad count for element '{name}'")))?;
                if name == "vertex" {
                    if vertex_count.is_some() {
                        return Err(PlyError::header("element 'vertex' declared twice"));
                    }
                    vertex_count = Some(count);
                    section = Section::Vertex;
                } else if count == 0 {
                    warn!("Skipping empty PLY element '{name}'");
                    section = Section::Skipped;
                } else {
                    return Err(PlyError::header(format!(
                        "unsupported element '{name}' with {count} entries"
                    )));
                }
            }
            Some("property") => match section {
                Section::Vertex => {
                    let ty = words
                        .next()
                        .ok_or_else(|| PlyError::header("property without a type"))?;
                    if ty == "list" {
                        return Err(PlyError::header("list properties on 'vertex'"));
                    }
                    let name = words
                        .next()
                        .ok_or_else(|| PlyError::header("property without a name"))?;
                    if properties.iter().any(|p| p.name == name) {
                        return Err(PlyError::header(format!("duplicate property '{name}'")));
                    }
                    let ty = ScalarType::parse(ty);
                    if let ScalarType::Unknown(token) = &ty {
                        warn!("{}", PlyError::UnsupportedScalarType(token.clone()));
                    }
                    properties.push(PropertyDef {
                        name: name.to_string(),
                        ty,
                    });
                }
                Section::Skipped => {}
                Section::Preamble => {
                    return Err(PlyError::header("property before any element"));
                }
            },
            // comment, obj_info, blank lines and anything else carry no layout.
            _ => {}
        }
    }

    let format = format.ok_or_else(|| PlyError::header("missing format line"))?;
    let vertex_count =
        vertex_count.ok_or_else(|| PlyError::header("missing 'element vertex' definition"))?;

    debug!(
        "PLY header: {} with {} vertices, {} properties, {} header bytes",
        format.as_str(),
        vertex_count,
        properties.len(),
        offset
    );

    Ok(PlyHeader {
        format,
        vertex_count,
        properties,
        header_len: offset,
    })
}

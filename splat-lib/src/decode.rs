use log::debug;
use zerocopy::byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::common::MAX_REST_COEFFS;
use crate::error::PlyError;
use crate::header::{next_line, PlyFormat, PlyHeader};
use crate::layout::PropertyLayout;
use crate::reader::{read_scalar, ScalarType};

/// A vertex property name the splat schema understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Field {
    Position(usize),
    Scale(usize),
    Rotation(usize),
    Opacity,
    Alpha,
    Dc(usize),
    Rest(usize),
    Rgb8(usize),
    Rgb(usize),
}

impl Field {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        let field = match name {
            "x" => Self::Position(0),
            "y" => Self::Position(1),
            "z" => Self::Position(2),
            "scale_0" | "scale_x" => Self::Scale(0),
            "scale_1" | "scale_y" => Self::Scale(1),
            "scale_2" | "scale_z" => Self::Scale(2),
            "rot_0" => Self::Rotation(0),
            "rot_1" => Self::Rotation(1),
            "rot_2" => Self::Rotation(2),
            "rot_3" => Self::Rotation(3),
            "opacity" => Self::Opacity,
            "alpha" => Self::Alpha,
            "f_dc_0" => Self::Dc(0),
            "f_dc_1" => Self::Dc(1),
            "f_dc_2" => Self::Dc(2),
            "red" => Self::Rgb8(0),
            "green" => Self::Rgb8(1),
            "blue" => Self::Rgb8(2),
            "r" => Self::Rgb(0),
            "g" => Self::Rgb(1),
            "b" => Self::Rgb(2),
            other => {
                let i: usize = other.strip_prefix("f_rest_")?.parse().ok()?;
                return (i < MAX_REST_COEFFS).then_some(Self::Rest(i));
            }
        };
        Some(field)
    }
}

/// Values of one vertex record, keyed by the splat schema. `None` means the
/// property was not declared (or, for ascii, not present on the line).
#[derive(Clone, Debug)]
pub struct RawVertex {
    pub position: [Option<f64>; 3],
    pub scale: [Option<f64>; 3],
    pub rotation: [Option<f64>; 4],
    pub opacity: Option<f64>,
    pub alpha: Option<f64>,
    pub dc: [Option<f64>; 3],
    pub rest: [Option<f64>; MAX_REST_COEFFS],
    pub rgb8: [Option<f64>; 3],
    pub rgb: [Option<f64>; 3],
}

impl Default for RawVertex {
    fn default() -> Self {
        Self {
            position: [None; 3],
            scale: [None; 3],
            rotation: [None; 4],
            opacity: None,
            alpha: None,
            dc: [None; 3],
            rest: [None; MAX_REST_COEFFS],
            rgb8: [None; 3],
            rgb: [None; 3],
        }
    }
}

impl RawVertex {
    pub(crate) fn set(&mut self, field: Field, v: f64) {
        let slot = match field {
            Field::Position(i) => &mut self.position[i],
            Field::Scale(i) => &mut self.scale[i],
            Field::Rotation(i) => &mut self.rotation[i],
            Field::Opacity => &mut self.opacity,
            Field::Alpha => &mut self.alpha,
            Field::Dc(i) => &mut self.dc[i],
            Field::Rest(i) => &mut self.rest[i],
            Field::Rgb8(i) => &mut self.rgb8[i],
            Field::Rgb(i) => &mut self.rgb[i],
        };
        *slot = Some(v);
    }
}

/// How to treat a body shorter than the header promises.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Truncation {
    Reject,
    /// Decode the complete records that are present.
    Tolerate,
}

struct Slot {
    field: Field,
    offset: usize,
    ty: ScalarType,
}

/// Upper bound on the records the body can actually hold, for sizing
/// output buffers. Never trusts `vertex_count` alone.
pub fn capacity_hint(raw_data: &[u8], header: &PlyHeader) -> usize {
    let body = raw_data.len().saturating_sub(header.header_len);
    let fits = match header.format {
        // Shortest ascii record: one token plus a newline.
        PlyFormat::Ascii => body.div_ceil(2),
        _ => body / PropertyLayout::new(&header.properties).record_size().max(1),
    };
    header.vertex_count.min(fits)
}

/// Decodes every vertex record after the header and hands each to `visit`.
/// Returns the number of records visited.
pub fn decode_vertices<F>(
    raw_data: &[u8],
    header: &PlyHeader,
    truncation: Truncation,
    visit: F,
) -> Result<usize, PlyError>
where
    F: FnMut(RawVertex),
{
    if header.properties.is_empty() && header.vertex_count > 0 {
        return Err(PlyError::header(format!(
            "'element vertex {}' declares no properties",
            header.vertex_count
        )));
    }
    let body = raw_data.get(header.header_len..).unwrap_or_default();
    match header.format {
        PlyFormat::BinaryLittleEndian => {
            decode_binary::<LittleEndian, F>(body, header, truncation, visit)
        }
        PlyFormat::BinaryBigEndian => decode_binary::<BigEndian, F>(body, header, truncation, visit),
        PlyFormat::Ascii => decode_ascii(body, header, truncation, visit),
    }
}

fn decode_binary<O: ByteOrder, F>(
    body: &[u8],
    header: &PlyHeader,
    truncation: Truncation,
    mut visit: F,
) -> Result<usize, PlyError>
where
    F: FnMut(RawVertex),
{
    let layout = PropertyLayout::new(&header.properties);
    let record_size = layout.record_size();
    let count = header.vertex_count;
    if record_size == 0 {
        return Ok(0);
    }

    let needed = count.checked_mul(record_size).unwrap_or(usize::MAX);
    let count = if needed <= body.len() {
        count
    } else if truncation == Truncation::Tolerate {
        body.len() / record_size
    } else {
        return Err(PlyError::TruncatedData {
            needed,
            available: body.len(),
        });
    };

    let slots: Vec<Slot> = header
        .properties
        .iter()
        .filter_map(|p| {
            let field = Field::from_name(&p.name);
            if field.is_none() {
                debug!("Ignoring vertex property '{}'", p.name);
            }
            let loc = layout.get(&p.name)?;
            Some(Slot {
                field: field?,
                offset: loc.offset,
                ty: loc.ty.clone(),
            })
        })
        .collect();

    for record in body.chunks_exact(record_size).take(count) {
        let mut vertex = RawVertex::default();
        for slot in &slots {
            vertex.set(slot.field, read_scalar::<O>(record, slot.offset, &slot.ty)?);
        }
        visit(vertex);
    }
    Ok(count)
}

fn decode_ascii<F>(
    body: &[u8],
    header: &PlyHeader,
    truncation: Truncation,
    mut visit: F,
) -> Result<usize, PlyError>
where
    F: FnMut(RawVertex),
{
    let fields: Vec<Option<Field>> = header
        .properties
        .iter()
        .map(|p| Field::from_name(&p.name))
        .collect();

    let mut offset = 0;
    let mut decoded = 0;
    while decoded < header.vertex_count {
        let Some(line) = next_line(body, &mut offset) else {
            break;
        };
        if line.trim_ascii().is_empty() {
            continue;
        }

        let line = String::from_utf8_lossy(line);
        let mut vertex = RawVertex::default();
        for (field, token) in fields.iter().zip(line.split_whitespace()) {
            if let (Some(field), Ok(v)) = (field, token.parse::<f64>()) {
                vertex.set(*field, v);
            }
        }
        visit(vertex);
        decoded += 1;
    }

    if decoded < header.vertex_count && truncation == Truncation::Reject {
        return Err(PlyError::TruncatedData {
            needed: header.vertex_count,
            available: decoded,
        });
    }
    Ok(decoded)
}

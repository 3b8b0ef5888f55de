use std::io::Write;

use zerocopy::byteorder::{BigEndian, ByteOrder, LittleEndian, F32};
use zerocopy::IntoBytes;

use crate::common::{inv_sigmoid, MAX_REST_COEFFS};
use crate::error::PlyError;
use crate::header::PlyFormat;
use crate::structures::Splat;

/// Property values of one splat in file order, with scale and opacity
/// converted back to their stored (log / logit) form.
fn record(s: &Splat, rest_coeffs: usize) -> impl Iterator<Item = f32> + '_ {
    s.position
        .to_array()
        .into_iter()
        .chain(s.color_dc.to_array())
        .chain(s.color_rest[..rest_coeffs].iter().copied())
        .chain([inv_sigmoid(s.opacity)])
        .chain(s.scale.to_array().map(f32::ln))
        .chain(s.rotation.to_array())
}

/// Encodes splats as a PLY file that decodes back to the same splats.
/// `rest_coeffs` selects how many `f_rest_*` properties are written.
pub fn write_ply(
    output: &mut Vec<u8>,
    splats: &[Splat],
    rest_coeffs: usize,
    format: PlyFormat,
) -> Result<(), PlyError> {
    let rest_coeffs = rest_coeffs.min(MAX_REST_COEFFS);

    output.clear();
    writeln!(output, "ply\nformat {} 1.0", format.as_str())?;
    writeln!(output, "element vertex {}", splats.len())?;
    output.extend_from_slice(b"property float x\nproperty float y\nproperty float z\n");
    output.extend_from_slice(
        b"property float f_dc_0\nproperty float f_dc_1\nproperty float f_dc_2\n",
    );
    for i in 0..rest_coeffs {
        writeln!(output, "property float f_rest_{i}")?;
    }
    output.extend_from_slice(
        b"property float opacity\n\
          property float scale_0\nproperty float scale_1\nproperty float scale_2\n\
          property float rot_0\nproperty float rot_1\nproperty float rot_2\nproperty float rot_3\n\
          end_header\n",
    );

    let floats_per_splat = 3 + 3 + rest_coeffs + 1 + 3 + 4;
    match format {
        PlyFormat::BinaryLittleEndian => {
            write_binary::<LittleEndian>(output, splats, rest_coeffs, floats_per_splat)
        }
        PlyFormat::BinaryBigEndian => {
            write_binary::<BigEndian>(output, splats, rest_coeffs, floats_per_splat)
        }
        PlyFormat::Ascii => {
            for splat in splats {
                let line: Vec<String> = record(splat, rest_coeffs).map(|v| v.to_string()).collect();
                writeln!(output, "{}", line.join(" "))?;
            }
        }
    }
    Ok(())
}

fn write_binary<O: ByteOrder>(
    output: &mut Vec<u8>,
    splats: &[Splat],
    rest_coeffs: usize,
    floats_per_splat: usize,
) {
    output.reserve(splats.len() * floats_per_splat * 4);
    for splat in splats {
        for v in record(splat, rest_coeffs) {
            output.extend_from_slice(F32::<O>::new(v).as_bytes());
        }
    }
}

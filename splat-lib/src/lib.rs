pub mod attributes;
pub mod columns;
pub mod common;
pub mod decode;
pub mod error;
pub mod fixture;
pub mod header;
pub mod layout;
pub mod nav;
pub mod points;
pub mod raster;
pub mod reader;
pub mod shading;
mod structures;
pub mod writer;

use attributes::post_process;
use decode::capacity_hint;
use decode::decode_vertices;
use decode::Truncation;
use header::parse_header;
use log::debug;

pub use columns::{ColumnStore, SplatAttributes};
pub use error::PlyError;
pub use header::{PlyFormat, PlyHeader, PropertyDef};
pub use points::{decode_points, decode_scene, PointCloud, Scene};
pub use structures::{Splat, SplatCollection};

/// Decodes a complete Gaussian splat PLY file held in memory.
///
/// Any header or body error aborts the whole load; there is no partial
/// collection.
pub fn decode_splats(raw_data: &[u8]) -> Result<SplatCollection, PlyError> {
    let header = parse_header(raw_data)?;
    let mut splats = Vec::with_capacity(capacity_hint(raw_data, &header));
    let decoded = decode_vertices(raw_data, &header, Truncation::Reject, |raw| {
        splats.push(post_process(&raw))
    })?;
    debug!(
        "Decoded {} splats ({} format, {} properties, {} byte header)",
        decoded,
        header.format.as_str(),
        header.properties.len(),
        header.header_len
    );

    Ok(SplatCollection {
        format: header.format,
        vertex_count: header.vertex_count,
        properties: header.properties,
        splats,
    })
}

cfg_if::cfg_if! {
if #[cfg(feature = "async")] {
    use tokio::io::{AsyncRead, AsyncReadExt};

    async fn read_all<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, PlyError> {
        let mut raw_data = Vec::new();
        reader.read_to_end(&mut raw_data).await?;
        Ok(raw_data)
    }

    /// Drains `reader` and decodes the buffer once. The read is the only
    /// suspension point.
    #[inline(never)]
    pub async fn load_splats_async<R: AsyncRead + Unpin>(
        reader: &mut R,
    ) -> Result<SplatCollection, PlyError> {
        let raw_data = read_all(reader).await?;
        decode_splats(&raw_data)
    }

    #[inline(never)]
    pub async fn load_scene_async<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Scene, PlyError> {
        let raw_data = read_all(reader).await?;
        decode_scene(&raw_data)
    }
}
}

//! Fixed line geometry.
//!
//! Each segment is stored as two vertices of three floats. The position
//! attribute only reads two floats per vertex with a packed stride, so the
//! third float of the first vertex ends up as the x of the second fetched
//! vertex. The data is uploaded as-is.

use bytemuck::{Pod, Zeroable};

#[cfg(test)]
use super::AttributeLayout;

/// Number of line buffers uploaded and drawn per frame.
pub const SEGMENT_COUNT: usize = 5;

/// Vertices drawn per segment.
pub const VERTICES_PER_SEGMENT: u32 = 2;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub pos: [f32; 3],
}

impl LineVertex {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { pos: [x, y, z] }
    }
}

/// One independent line segment, uploaded into its own buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct LineSegment {
    pub vertices: [LineVertex; VERTICES_PER_SEGMENT as usize],
}

impl LineSegment {
    #[inline]
    pub const fn new(a: LineVertex, b: LineVertex) -> Self {
        Self { vertices: [a, b] }
    }

    /// Raw upload bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    /// Upload size in bytes: 2 vertices x 3 components x 4 bytes.
    #[inline]
    pub const fn byte_len() -> usize {
        std::mem::size_of::<Self>()
    }

    /// Positions as `layout` fetches them from the uploaded bytes.
    ///
    /// Returns `None` if the layout would read past the end of the buffer.
    #[cfg(test)]
    pub fn fetched_positions(&self, layout: &AttributeLayout) -> Option<Vec<[f32; 2]>> {
        let floats: &[f32] = bytemuck::cast_slice(self.as_bytes());
        let size = layout.format.size();
        let stride = (layout.effective_stride() / size) as usize;
        let offset = (layout.offset / size) as usize;

        (0..VERTICES_PER_SEGMENT as usize)
            .map(|i| {
                let start = offset + i * stride;
                let x = *floats.get(start)?;
                let y = if layout.components > 1 { *floats.get(start + 1)? } else { 0.0 };
                Some([x, y])
            })
            .collect()
    }
}

/// The five segments, in upload and draw order.
pub const LINE_SEGMENTS: [LineSegment; SEGMENT_COUNT] = [
    // bottom row
    LineSegment::new(LineVertex::new(-1.0, -1.0, 0.0), LineVertex::new(-0.5, -1.0, 0.0)),
    LineSegment::new(LineVertex::new(-0.25, -1.0, 0.0), LineVertex::new(0.25, -1.0, 0.0)),
    LineSegment::new(LineVertex::new(0.5, -1.0, 0.0), LineVertex::new(1.0, -1.0, 0.0)),
    // middle row
    LineSegment::new(LineVertex::new(-0.75, 0.0, 0.0), LineVertex::new(-0.25, 0.0, 0.0)),
    LineSegment::new(LineVertex::new(0.25, 0.0, 0.0), LineVertex::new(0.75, 0.0, 0.0)),
];

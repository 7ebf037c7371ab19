/// Scalar type of a vertex attribute component.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AttributeFormat {
    Float32,
}

impl AttributeFormat {
    /// Size of one component in bytes.
    #[inline]
    pub const fn size(self) -> u64 {
        match self {
            AttributeFormat::Float32 => 4,
        }
    }
}

/// Describes how a generic vertex attribute reads a bound vertex buffer.
///
/// A `stride` of 0 means tightly packed: consecutive vertices are
/// `components * format.size()` bytes apart, regardless of how the buffer
/// contents were laid out on upload.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct AttributeLayout {
    pub location: u32,
    pub components: u32,
    pub format: AttributeFormat,
    pub normalized: bool,
    pub stride: u64,
    pub offset: u64,
}

impl AttributeLayout {
    /// Attribute 0: two floats, not normalized, packed, starting at offset 0.
    pub const POSITION_2D: AttributeLayout = AttributeLayout {
        location: 0,
        components: 2,
        format: AttributeFormat::Float32,
        normalized: false,
        stride: 0,
        offset: 0,
    };

    /// Distance in bytes between two consecutive vertices.
    #[inline]
    pub const fn effective_stride(&self) -> u64 {
        if self.stride == 0 {
            self.components as u64 * self.format.size()
        } else {
            self.stride
        }
    }

    /// Size in bytes of the data a single vertex fetch reads.
    #[cfg(test)]
    pub const fn fetch_size(&self) -> u64 {
        self.components as u64 * self.format.size()
    }

    /// Minimum buffer size needed to fetch `vertex_count` vertices.
    #[cfg(test)]
    pub const fn required_bytes(&self, vertex_count: u32) -> u64 {
        if vertex_count == 0 {
            return 0;
        }
        self.offset + (vertex_count as u64 - 1) * self.effective_stride() + self.fetch_size()
    }

    /// Matching wgpu vertex format, if the component count is representable.
    pub fn vertex_format(&self) -> Option<wgpu::VertexFormat> {
        match (self.format, self.components) {
            (AttributeFormat::Float32, 1) => Some(wgpu::VertexFormat::Float32),
            (AttributeFormat::Float32, 2) => Some(wgpu::VertexFormat::Float32x2),
            (AttributeFormat::Float32, 3) => Some(wgpu::VertexFormat::Float32x3),
            (AttributeFormat::Float32, 4) => Some(wgpu::VertexFormat::Float32x4),
            _ => None,
        }
    }
}

//! Vertex types for 2D line rendering

use bytemuck::{Pod, Zeroable};

/// 2D vertex in normalized device coordinates with a color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Convert a linear color to packed BGRx8888
#[inline]
pub fn pack_bgrx(color: [f32; 4]) -> u32 {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0) as u32;
    (channel(color[0]) << 16) | (channel(color[1]) << 8) | channel(color[2])
}

/// Fixed colors
pub mod colors {
    pub const BACKGROUND: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_bgrx() {
        assert_eq!(pack_bgrx(colors::BACKGROUND), 0);
        assert_eq!(pack_bgrx(colors::WHITE), 0x00ff_ffff);
        assert_eq!(pack_bgrx([1.0, 0.0, 0.0, 1.0]), 0x00ff_0000);
        assert_eq!(pack_bgrx([0.0, 2.0, -1.0, 1.0]), 0x0000_ff00);
    }

    #[test]
    fn test_vertex_layout_stride() {
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
    }
}

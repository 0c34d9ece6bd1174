//! Draw primitives handed to a [`RenderSurface`](crate::scheduler::RenderSurface)
//! once per tick.

use crate::math::Vec3;
use crate::terrain::GridLine;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn hex(v: u32) -> Self {
        Self {
            r: (v >> 16) as u8,
            g: (v >> 8) as u8,
            b: v as u8,
        }
    }

    pub fn to_unit(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendMode {
    Normal,
    Additive,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub color: Rgb,
    pub opacity: f32,
    /// Point size in world units; ignored for lines.
    pub size: f32,
    pub blend: BlendMode,
}

pub const GRID_MATERIAL: Material = Material {
    color: Rgb::hex(0x00ffaa),
    opacity: 0.6,
    size: 0.0,
    blend: BlendMode::Normal,
};

pub const PARTICLE_MATERIAL: Material = Material {
    color: Rgb::hex(0x00ffff),
    opacity: 0.8,
    size: 0.05,
    blend: BlendMode::Additive,
};

pub const TRAIL_MATERIAL: Material = Material {
    color: Rgb::hex(0xff00ff),
    opacity: 0.6,
    size: 0.15,
    blend: BlendMode::Additive,
};

pub struct LineBatch<'a> {
    pub lines: &'a [GridLine],
    pub material: Material,
    /// False when the vertex data is unchanged since the previous draw.
    pub dirty: bool,
}

pub struct PointBatch<'a> {
    pub points: &'a [Vec3],
    pub material: Material,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
    pub frame_index: u64,
    pub fps: u32,
    pub scroll_y: f32,
    pub scroll_progress: f32,
    pub opacity: f32,
}

pub struct Caption<'a> {
    pub text: &'a str,
    pub cursor_on: bool,
}

pub struct FramePrimitives<'a> {
    pub grid: LineBatch<'a>,
    pub particles: PointBatch<'a>,
    pub trail: PointBatch<'a>,
    pub caption: Caption<'a>,
    pub stats: FrameStats,
}

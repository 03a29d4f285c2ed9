//! Typed pixel buffers.
//!
//! Uses `imgref::ImgVec` for 2D pixel data with typed pixels from the `rgb` crate.

pub use imgref::{Img, ImgRef, ImgVec};
pub use rgb::{RGB8, RGB16, RGBA8, RGBA16};

use image::DynamicImage;

use crate::flags::TargetLayout;

/// Decoded pixels in the layout selected by the read flags.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum PixelData {
    Gray8(ImgVec<u8>),
    Gray16(ImgVec<u16>),
    Rgb8(ImgVec<RGB8>),
    Rgb16(ImgVec<RGB16>),
    Rgba8(ImgVec<RGBA8>),
    Rgba16(ImgVec<RGBA16>),
}

impl PixelData {
    pub fn width(&self) -> u32 {
        match self {
            PixelData::Gray8(img) => img.width() as u32,
            PixelData::Gray16(img) => img.width() as u32,
            PixelData::Rgb8(img) => img.width() as u32,
            PixelData::Rgb16(img) => img.width() as u32,
            PixelData::Rgba8(img) => img.width() as u32,
            PixelData::Rgba16(img) => img.width() as u32,
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            PixelData::Gray8(img) => img.height() as u32,
            PixelData::Gray16(img) => img.height() as u32,
            PixelData::Rgb8(img) => img.height() as u32,
            PixelData::Rgb16(img) => img.height() as u32,
            PixelData::Rgba8(img) => img.height() as u32,
            PixelData::Rgba16(img) => img.height() as u32,
        }
    }

    /// Interleaved channel count, alpha included.
    pub fn channels(&self) -> u8 {
        match self {
            PixelData::Gray8(_) | PixelData::Gray16(_) => 1,
            PixelData::Rgb8(_) | PixelData::Rgb16(_) => 3,
            PixelData::Rgba8(_) | PixelData::Rgba16(_) => 4,
        }
    }

    pub fn bit_depth(&self) -> u8 {
        match self {
            PixelData::Gray8(_) | PixelData::Rgb8(_) | PixelData::Rgba8(_) => 8,
            PixelData::Gray16(_) | PixelData::Rgb16(_) | PixelData::Rgba16(_) => 16,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Raw interleaved bytes (native endian for 16-bit layouts).
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            PixelData::Gray8(img) => img.buf().as_slice(),
            PixelData::Gray16(img) => bytemuck::cast_slice(img.buf().as_slice()),
            PixelData::Rgb8(img) => bytemuck::cast_slice(img.buf().as_slice()),
            PixelData::Rgb16(img) => bytemuck::cast_slice(img.buf().as_slice()),
            PixelData::Rgba8(img) => bytemuck::cast_slice(img.buf().as_slice()),
            PixelData::Rgba16(img) => bytemuck::cast_slice(img.buf().as_slice()),
        }
    }

    /// Convert a codec image into the requested layout.
    pub(crate) fn from_dynamic(img: DynamicImage, layout: TargetLayout) -> Self {
        let w = img.width() as usize;
        let h = img.height() as usize;

        match (layout.color, layout.alpha, layout.sixteen_bit) {
            (false, false, false) => PixelData::Gray8(ImgVec::new(img.into_luma8().into_raw(), w, h)),
            (false, false, true) => PixelData::Gray16(ImgVec::new(img.into_luma16().into_raw(), w, h)),
            (true, false, false) => {
                let raw = img.into_rgb8().into_raw();
                let rgb: &[RGB8] = bytemuck::cast_slice(&raw);
                PixelData::Rgb8(ImgVec::new(rgb.to_vec(), w, h))
            }
            (true, false, true) => {
                let raw = img.into_rgb16().into_raw();
                let rgb: &[RGB16] = bytemuck::cast_slice(&raw);
                PixelData::Rgb16(ImgVec::new(rgb.to_vec(), w, h))
            }
            // Gray+alpha has no layout of its own; it widens to RGBA.
            (_, true, false) => {
                let raw = img.into_rgba8().into_raw();
                let rgba: &[RGBA8] = bytemuck::cast_slice(&raw);
                PixelData::Rgba8(ImgVec::new(rgba.to_vec(), w, h))
            }
            (_, true, true) => {
                let raw = img.into_rgba16().into_raw();
                let rgba: &[RGBA16] = bytemuck::cast_slice(&raw);
                PixelData::Rgba16(ImgVec::new(rgba.to_vec(), w, h))
            }
        }
    }
}

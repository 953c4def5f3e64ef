/// Abstract pixel formats and their native translation

/// Abstract pixel format used in texture setups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[allow(non_camel_case_types)]
pub enum PixelFormat {
    /// 32-bit RGBA, 8 bits per channel
    RGBA8,
    /// 24-bit RGB (no native equivalent on the d3d12-style backend)
    RGB8,
    RGBA4,
    R5G6B5,
    R5G5B5A1,
    R10G10B10A2,
    RGBA32F,
    RGBA16F,
    R32F,
    R16F,
    L8,
    DXT1,
    DXT3,
    DXT5,
    PVRTC4_RGBA,
    ETC2_RGB8,
    /// 16-bit depth
    DEPTH,
    /// 24-bit depth + 8-bit stencil
    DEPTHSTENCIL,
    /// No format (e.g. render target without depth)
    #[default]
    None,
}

impl PixelFormat {
    /// Formats accepted as color output of a render target
    pub fn is_valid_render_target_color_format(self) -> bool {
        matches!(
            self,
            PixelFormat::RGBA8
                | PixelFormat::R10G10B10A2
                | PixelFormat::RGBA32F
                | PixelFormat::RGBA16F
        )
    }

    /// Formats accepted as depth output of a render target
    pub fn is_valid_render_target_depth_format(self) -> bool {
        self.is_depth_format()
    }

    pub fn is_depth_format(self) -> bool {
        matches!(self, PixelFormat::DEPTH | PixelFormat::DEPTHSTENCIL)
    }

    pub fn is_compressed_format(self) -> bool {
        matches!(
            self,
            PixelFormat::DXT1
                | PixelFormat::DXT3
                | PixelFormat::DXT5
                | PixelFormat::PVRTC4_RGBA
                | PixelFormat::ETC2_RGB8
        )
    }

    /// Translate to the native format, `None` if the backend has no equivalent
    pub fn as_native_format(self) -> Option<NativeFormat> {
        match self {
            PixelFormat::RGBA8 => Some(NativeFormat::R8G8B8A8_UNORM),
            PixelFormat::RGBA4 => Some(NativeFormat::B4G4R4A4_UNORM),
            PixelFormat::R5G6B5 => Some(NativeFormat::B5G6R5_UNORM),
            PixelFormat::R5G5B5A1 => Some(NativeFormat::B5G5R5A1_UNORM),
            PixelFormat::R10G10B10A2 => Some(NativeFormat::R10G10B10A2_UNORM),
            PixelFormat::RGBA32F => Some(NativeFormat::R32G32B32A32_FLOAT),
            PixelFormat::RGBA16F => Some(NativeFormat::R16G16B16A16_FLOAT),
            PixelFormat::R32F => Some(NativeFormat::R32_FLOAT),
            PixelFormat::R16F => Some(NativeFormat::R16_FLOAT),
            PixelFormat::L8 => Some(NativeFormat::R8_UNORM),
            PixelFormat::DXT1 => Some(NativeFormat::BC1_UNORM),
            PixelFormat::DXT3 => Some(NativeFormat::BC2_UNORM),
            PixelFormat::DXT5 => Some(NativeFormat::BC3_UNORM),
            PixelFormat::DEPTH => Some(NativeFormat::D16_UNORM),
            PixelFormat::DEPTHSTENCIL => Some(NativeFormat::D24_UNORM_S8_UINT),
            PixelFormat::RGB8
            | PixelFormat::PVRTC4_RGBA
            | PixelFormat::ETC2_RGB8
            | PixelFormat::None => None,
        }
    }
}

/// Native GPU format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum NativeFormat {
    R8G8B8A8_UNORM,
    B4G4R4A4_UNORM,
    B5G6R5_UNORM,
    B5G5R5A1_UNORM,
    R10G10B10A2_UNORM,
    R32G32B32A32_FLOAT,
    R16G16B16A16_FLOAT,
    R32_FLOAT,
    R16_FLOAT,
    R8_UNORM,
    BC1_UNORM,
    BC2_UNORM,
    BC3_UNORM,
    D16_UNORM,
    D24_UNORM_S8_UINT,
}

impl NativeFormat {
    /// Bytes per pixel, or per 4x4 block for block-compressed formats
    pub fn bytes_per_block(self) -> u32 {
        match self {
            NativeFormat::R8_UNORM => 1,
            NativeFormat::B4G4R4A4_UNORM
            | NativeFormat::B5G6R5_UNORM
            | NativeFormat::B5G5R5A1_UNORM
            | NativeFormat::R16_FLOAT
            | NativeFormat::D16_UNORM => 2,
            NativeFormat::R8G8B8A8_UNORM
            | NativeFormat::R10G10B10A2_UNORM
            | NativeFormat::R32_FLOAT
            | NativeFormat::D24_UNORM_S8_UINT => 4,
            NativeFormat::R16G16B16A16_FLOAT | NativeFormat::BC1_UNORM => 8,
            NativeFormat::R32G32B32A32_FLOAT
            | NativeFormat::BC2_UNORM
            | NativeFormat::BC3_UNORM => 16,
        }
    }

    pub fn is_block_compressed(self) -> bool {
        matches!(
            self,
            NativeFormat::BC1_UNORM | NativeFormat::BC2_UNORM | NativeFormat::BC3_UNORM
        )
    }

    pub fn is_depth(self) -> bool {
        matches!(self, NativeFormat::D16_UNORM | NativeFormat::D24_UNORM_S8_UINT)
    }

    /// Tightly packed size in bytes of one row (or one row of blocks)
    pub fn row_size(self, width: u32) -> u64 {
        let blocks = if self.is_block_compressed() { width.div_ceil(4).max(1) } else { width };
        blocks as u64 * self.bytes_per_block() as u64
    }

    /// Number of rows (or rows of blocks) for the given height
    pub fn num_rows(self, height: u32) -> u32 {
        if self.is_block_compressed() {
            height.div_ceil(4).max(1)
        } else {
            height
        }
    }
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;

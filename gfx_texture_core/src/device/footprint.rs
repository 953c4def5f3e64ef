/// Copy footprint computation for texture uploads
///
/// A staging buffer holds every subresource of a texture one after another.
/// Each subresource starts at a placement-aligned offset and each row inside
/// it starts at a pitch-aligned offset.

use super::graphics_device::{DeviceLimits, ResourceDesc, ResourceDimension, SubresourceFootprint};

/// Footprints of all subresources of one resource
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyableFootprints {
    /// One entry per subresource, in subresource-index order
    pub layouts: Vec<SubresourceFootprint>,
    /// Byte size a staging buffer needs to hold every subresource
    pub total_bytes: u64,
}

impl CopyableFootprints {
    /// Size of the same data tightly packed (no row or placement padding)
    pub fn packed_size(&self) -> u64 {
        self.layouts
            .iter()
            .map(|fp| (fp.row_size_in_bytes as u64).saturating_mul(fp.num_rows as u64 * fp.depth as u64))
            .fold(0u64, u64::saturating_add)
    }
}

fn align_up(value: u64, alignment: u64) -> u64 {
    value.div_ceil(alignment).saturating_mul(alignment)
}

/// Compute the footprints of `desc` under the alignment rules in `limits`
///
/// Subresource index is `mip + slice * mip_levels`, which matches the
/// face-major, mip-minor order of pixel data.
pub fn compute_copyable_footprints(desc: &ResourceDesc, limits: &DeviceLimits) -> CopyableFootprints {
    let Some(format) = desc.format else {
        return CopyableFootprints::default();
    };
    if desc.dimension == ResourceDimension::Buffer {
        return CopyableFootprints::default();
    }

    let (num_slices, base_depth) = match desc.dimension {
        ResourceDimension::Texture3D => (1, desc.depth_or_array_size),
        _ => (desc.depth_or_array_size, 1),
    };

    let mut layouts = Vec::with_capacity((num_slices * desc.mip_levels) as usize);
    let mut cursor = 0u64;
    for _slice in 0..num_slices {
        for mip in 0..desc.mip_levels {
            let width = ((desc.width >> mip) as u32).max(1);
            let height = (desc.height >> mip).max(1);
            let depth = (base_depth >> mip).max(1);

            // Sizes past u32 saturate; the factory rejects such textures first
            let row_size = format.row_size(width);
            let num_rows = format.num_rows(height);
            let row_pitch = align_up(row_size, limits.texture_data_pitch_alignment as u64);
            let row_size = u32::try_from(row_size).unwrap_or(u32::MAX);
            let row_pitch = u32::try_from(row_pitch).unwrap_or(u32::MAX);

            let offset = align_up(cursor, limits.texture_data_placement_alignment);
            cursor = offset.saturating_add(
                (row_pitch as u64)
                    .saturating_mul(num_rows as u64)
                    .saturating_mul(depth as u64),
            );

            layouts.push(SubresourceFootprint {
                offset,
                format,
                width,
                height,
                depth,
                row_pitch,
                num_rows,
                row_size_in_bytes: row_size,
            });
        }
    }

    CopyableFootprints {
        layouts,
        total_bytes: cursor,
    }
}

#[cfg(test)]
#[path = "footprint_tests.rs"]
mod tests;

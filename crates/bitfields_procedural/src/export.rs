//! # Field Export
//!
//! Plain-text table of a built field:
//!
//! ```text
//! palette_name,<name>
//! palette_colors,#rrggbb,#rrggbb,...
//! transparent,<n>
//! filled,<n>
//! total_states,<n>
//!
//! x,y,z,palette_index
//! 2,0,0,0
//! ...
//! ```
//!
//! Rows follow the field's grid iteration order, so the output depends only
//! on the pattern, the grid, `transparent` and the palette.

use std::fmt::Write as _;

use crate::field::VoxelField;

/// Column header preceding the voxel rows.
pub const ROW_HEADER: &str = "x,y,z,palette_index";

/// Serializes a field.
#[must_use]
pub fn export_table(field: &VoxelField) -> String {
    let palette = field.palette();
    // ~12 bytes per row is typical for three-digit coordinates
    let mut out = String::with_capacity(256 + field.len() * 12);

    // Writing into a String cannot fail.
    let _ = writeln!(out, "palette_name,{}", palette.name);
    let _ = writeln!(out, "palette_colors,{}", palette.joined_hex());
    let _ = writeln!(out, "transparent,{}", field.transparent());
    let _ = writeln!(out, "filled,{}", palette.len());
    let _ = writeln!(out, "total_states,{}", field.total_states());
    out.push('\n');
    out.push_str(ROW_HEADER);
    out.push('\n');

    for v in field.voxels() {
        let _ = writeln!(out, "{},{},{},{}", v.x, v.y, v.z, v.palette_index);
    }
    out
}

/// `<palette>_<X>x<Y>x<Z>.csv`, with path separators in the palette name
/// replaced by `_`.
#[must_use]
pub fn export_file_name(field: &VoxelField) -> String {
    let name: String = field
        .palette()
        .name
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect();
    format!("{name}_{}.csv", field.dims())
}

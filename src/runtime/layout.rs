//! Texture layout negotiation
//!
//! Maps a tensor's logical shape onto a 2D texture layout. Layouts keep the
//! trailing dimension as columns where possible so that row-major reads on
//! the accelerator stay coherent; anything that does not fit falls back to a
//! near-square layout.

use super::TexLayout;
use crate::error::{Error, Result};
use crate::tensor::size;

/// Maximum texture dimension assumed when a manager does not say otherwise
pub const DEFAULT_MAX_TEXTURE_SIZE: usize = 16384;

/// Choose a texture layout for `shape`
///
/// - a `preferred` layout is used as-is when it holds the tensor and fits;
/// - rank 0 and 1 map to a single row, rank 2 to its own shape, ranks 3 and
///   4 fold their leading dimensions into rows;
/// - otherwise (or if the folded layout exceeds `max_texture_size`), a
///   squarish layout of `ceil(sqrt(n))` rows is used.
///
/// Fails with `TextureTooLarge` when even the squarish layout exceeds
/// `max_texture_size`.
///
/// # Example
/// ```
/// use ndtex::runtime::{TexLayout, layout::texture_layout};
/// let layout = texture_layout(&[2, 3, 4], None, 16384).unwrap();
/// assert_eq!(layout, TexLayout::new(6, 4));
/// ```
pub fn texture_layout(
    shape: &[usize],
    preferred: Option<TexLayout>,
    max_texture_size: usize,
) -> Result<TexLayout> {
    let n = size(shape);
    let fits = |layout: TexLayout| layout.rows <= max_texture_size && layout.cols <= max_texture_size;

    if let Some(layout) = preferred {
        if layout.capacity() >= n && fits(layout) {
            return Ok(layout);
        }
    }

    let folded = match *shape {
        [] => Some(TexLayout::new(1, 1)),
        [d0] => Some(TexLayout::new(1, d0)),
        [d0, d1] => Some(TexLayout::new(d0, d1)),
        [d0, d1, d2] => Some(TexLayout::new(d0 * d1, d2)),
        [d0, d1, d2, d3] => Some(TexLayout::new(d0 * d1 * d2, d3)),
        _ => None,
    };
    if let Some(layout) = folded {
        if fits(layout) {
            return Ok(layout);
        }
    }

    let squarish = squarish_layout(n);
    if fits(squarish) {
        Ok(squarish)
    } else {
        Err(Error::TextureTooLarge {
            shape: shape.to_vec(),
            max: max_texture_size,
        })
    }
}

/// Near-square layout holding `n` elements
pub fn squarish_layout(n: usize) -> TexLayout {
    if n == 0 {
        return TexLayout::new(0, 0);
    }
    let rows = (n as f64).sqrt().ceil() as usize;
    TexLayout::new(rows, n.div_ceil(rows))
}

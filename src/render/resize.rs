//! Quicklook resizing and padding.
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer, images::Image};
use tracing::warn;

/// Dimensions after scaling the long side to `target_size`, keeping the
/// aspect ratio. Upscaling is refused; the original dimensions are kept.
pub fn calculate_resize_dimensions(
    original_cols: usize,
    original_rows: usize,
    target_size: usize,
) -> (usize, usize) {
    let short_side = original_rows.min(original_cols);
    let long_side = original_rows.max(original_cols);

    if target_size > long_side {
        warn!(
            "Target size {} is larger than original long side {}. Keeping original dimensions {}x{}",
            target_size, long_side, original_cols, original_rows
        );
        return (original_cols, original_rows);
    }

    let scale_factor = target_size as f64 / long_side as f64;
    let new_short_side = (short_side as f64 * scale_factor).round() as usize;

    if original_cols > original_rows {
        (target_size, new_short_side)
    } else {
        (new_short_side, target_size)
    }
}

fn resize_bytes(
    src_bytes: Vec<u8>,
    pixel_type: PixelType,
    original_cols: usize,
    original_rows: usize,
    target_cols: usize,
    target_rows: usize,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let resize_options =
        ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3));
    let mut resizer = Resizer::new();

    let src_image = Image::from_vec_u8(
        original_cols as u32,
        original_rows as u32,
        src_bytes,
        pixel_type,
    )?;
    let mut dst_image = Image::new(target_cols as u32, target_rows as u32, pixel_type);
    resizer.resize(&src_image, &mut dst_image, &resize_options)?;

    Ok(dst_image.into_vec())
}

pub fn resize_u8_image(
    data: &[u8],
    original_cols: usize,
    original_rows: usize,
    target_cols: usize,
    target_rows: usize,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    resize_bytes(
        data.to_vec(),
        PixelType::U8,
        original_cols,
        original_rows,
        target_cols,
        target_rows,
    )
}

pub fn resize_rgb_image(
    data: &[u8],
    original_cols: usize,
    original_rows: usize,
    target_cols: usize,
    target_rows: usize,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    resize_bytes(
        data.to_vec(),
        PixelType::U8x3,
        original_cols,
        original_rows,
        target_cols,
        target_rows,
    )
}

pub fn resize_u16_image(
    data: &[u16],
    original_cols: usize,
    original_rows: usize,
    target_cols: usize,
    target_rows: usize,
) -> Result<Vec<u16>, Box<dyn std::error::Error>> {
    // fast_image_resize works on little-endian bytes for U16
    let mut src_bytes = Vec::with_capacity(data.len() * 2);
    for &v in data {
        let b = v.to_le_bytes();
        src_bytes.push(b[0]);
        src_bytes.push(b[1]);
    }

    let dst_bytes = resize_bytes(
        src_bytes,
        PixelType::U16,
        original_cols,
        original_rows,
        target_cols,
        target_rows,
    )?;

    let mut out = Vec::with_capacity(dst_bytes.len() / 2);
    for chunk in dst_bytes.chunks_exact(2) {
        out.push(u16::from_le_bytes([chunk[0], chunk[1]]));
    }
    Ok(out)
}

/// Zero-pad an interleaved buffer to a centered square.
///
/// Returns the padded buffer, the square dimension, and the left/top
/// offsets of the original image inside it.
pub fn pad_to_square<T: Copy + Default>(
    data: &[T],
    cols: usize,
    rows: usize,
    channels: usize,
) -> (Vec<T>, usize, usize, usize) {
    let max_dim = cols.max(rows);
    let pad_cols = (max_dim - cols) / 2;
    let pad_rows = (max_dim - rows) / 2;

    let mut padded = vec![T::default(); max_dim * max_dim * channels];
    // Copy per row using slice copies to minimize per-pixel indexing
    for row in 0..rows {
        let src_offset = row * cols * channels;
        let dst_offset = ((row + pad_rows) * max_dim + pad_cols) * channels;
        let src_slice = &data[src_offset..src_offset + cols * channels];
        let dst_slice = &mut padded[dst_offset..dst_offset + cols * channels];
        dst_slice.copy_from_slice(src_slice);
    }
    (padded, max_dim, pad_cols, pad_rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_dimensions_keep_aspect_ratio() {
        assert_eq!(calculate_resize_dimensions(1000, 500, 100), (100, 50));
        assert_eq!(calculate_resize_dimensions(500, 1000, 100), (50, 100));
    }

    #[test]
    fn resize_dimensions_refuse_upscaling() {
        assert_eq!(calculate_resize_dimensions(100, 50, 1000), (100, 50));
    }

    #[test]
    fn padding_centers_the_image() {
        let data = vec![7u8; 2 * 4]; // 4 cols x 2 rows
        let (padded, dim, pad_left, pad_top) = pad_to_square(&data, 4, 2, 1);
        assert_eq!(dim, 4);
        assert_eq!((pad_left, pad_top), (0, 1));
        assert_eq!(padded.len(), 16);
        // First padded row is zeros, second carries the data
        assert!(padded[0..4].iter().all(|&v| v == 0));
        assert!(padded[4..8].iter().all(|&v| v == 7));
    }

    #[test]
    fn padding_interleaved_rgb() {
        let data = vec![9u8; 1 * 2 * 3]; // 2 cols x 1 row RGB
        let (padded, dim, pad_left, pad_top) = pad_to_square(&data, 2, 1, 3);
        assert_eq!(dim, 2);
        assert_eq!((pad_left, pad_top), (0, 0));
        assert_eq!(padded.len(), 2 * 2 * 3);
        assert!(padded[0..6].iter().all(|&v| v == 9));
        assert!(padded[6..].iter().all(|&v| v == 0));
    }
}

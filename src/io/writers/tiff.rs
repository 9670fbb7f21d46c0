use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tiff::encoder::{TiffEncoder, colortype};

pub fn write_tiff_gray_u8(
    output: &Path,
    cols: usize,
    rows: usize,
    data: &[u8],
) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(output)?;
    let mut encoder = TiffEncoder::new(BufWriter::new(file))?;
    encoder.write_image::<colortype::Gray8>(cols as u32, rows as u32, data)?;
    Ok(())
}

pub fn write_tiff_gray_u16(
    output: &Path,
    cols: usize,
    rows: usize,
    data: &[u16],
) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(output)?;
    let mut encoder = TiffEncoder::new(BufWriter::new(file))?;
    encoder.write_image::<colortype::Gray16>(cols as u32, rows as u32, data)?;
    Ok(())
}

pub fn write_tiff_rgb(
    output: &Path,
    cols: usize,
    rows: usize,
    rgb_data: &[u8],
) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(output)?;
    let mut encoder = TiffEncoder::new(BufWriter::new(file))?;
    encoder.write_image::<colortype::RGB8>(cols as u32, rows as u32, rgb_data)?;
    Ok(())
}

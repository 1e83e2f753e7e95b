use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::{DynamicImage, GenericImageView, ImageError};
use ndarray::IxDyn;
use tiff::decoder::DecodingResult;

use crate::err::{ProviderError, Result};
use crate::util::{Float, RawImage};

/// Turns an image file into an array of raw pixel values.
///
/// Single channel images come out as `[h, w]`, everything else channel-last
/// as `[h, w, c]`.
pub trait ImageDecoder {
    fn decode(&self, path: &Path) -> Result<RawImage>;
}

/// Decoder backed by the `image` crate, no caching, every call reads the file.
///
/// Palette PNGs are read as their 2-D index plane instead of the expanded
/// colors. TIFFs `image` can't handle (float samples) go through `tiff`.
#[derive(Default, Clone, Copy, Debug)]
pub struct FileImageDecoder;

impl ImageDecoder for FileImageDecoder {
    fn decode(&self, path: &Path) -> Result<RawImage> {
        if has_extension(path, &["png"]) {
            if let Some(indices) = decode_indexed_png(path)? {
                return Ok(indices);
            }
        }

        match image::open(path) {
            Ok(img) => dynamic_to_array(img),
            Err(ImageError::Unsupported(_)) if has_extension(path, &["tif", "tiff"]) => decode_tiff(path),
            Err(e) => Err(ProviderError::Image {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }
}

fn has_extension(path: &Path, exts: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| exts.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

fn open_file(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|e| ProviderError::Image {
        path: path.to_path_buf(),
        source: ImageError::IoError(e),
    })?;

    Ok(BufReader::new(file))
}

/// Index plane of a palette PNG, `None` for any other color type
pub fn decode_indexed_png(path: &Path) -> Result<Option<RawImage>> {
    let png_err = |e: png::DecodingError| ProviderError::Png {
        path: path.to_path_buf(),
        source: e,
    };

    let mut decoder = png::Decoder::new(open_file(path)?);
    decoder.set_transformations(png::Transformations::IDENTITY);

    let mut reader = decoder.read_info().map_err(png_err)?;

    if reader.info().color_type != png::ColorType::Indexed {
        return Ok(None);
    }

    let mut buf = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buf).map_err(png_err)?;

    let (h, w) = (frame.height as usize, frame.width as usize);
    // 1, 2, 4 or 8 bits per index, packed from the most significant bit
    let bits = frame.bit_depth as u8 as usize;
    let idx_mask = ((1u16 << bits) - 1) as u8;

    let mut pixels = Vec::with_capacity(h * w);

    for row in buf.chunks(frame.line_size).take(h) {
        for x in 0..w {
            let bit = x * bits;
            let shift = 8 - bits - bit % 8;
            pixels.push(((row[bit / 8] >> shift) & idx_mask) as Float);
        }
    }

    Ok(Some(RawImage::from_shape_vec(IxDyn(&[h, w]), pixels)?))
}

/// TIFF through the `tiff` crate, covers float sample formats
pub fn decode_tiff(path: &Path) -> Result<RawImage> {
    let tiff_err = |e: tiff::TiffError| ProviderError::Tiff {
        path: path.to_path_buf(),
        source: e,
    };

    let mut decoder = tiff::decoder::Decoder::new(open_file(path)?).map_err(tiff_err)?;
    let (width, height) = decoder.dimensions().map_err(tiff_err)?;

    let pixels: Vec<Float> = match decoder.read_image().map_err(tiff_err)? {
        DecodingResult::U8(v) => widen(v),
        DecodingResult::U16(v) => widen(v),
        DecodingResult::U32(v) => v.into_iter().map(|p| p as Float).collect(),
        DecodingResult::I8(v) => widen(v),
        DecodingResult::I16(v) => widen(v),
        DecodingResult::I32(v) => v.into_iter().map(|p| p as Float).collect(),
        DecodingResult::F32(v) => v,
        DecodingResult::F64(v) => v.into_iter().map(|p| p as Float).collect(),
        _ => {
            return Err(ProviderError::Tiff {
                path: path.to_path_buf(),
                source: tiff::TiffError::UnsupportedError(tiff::TiffUnsupportedError::UnknownInterpretation),
            })
        }
    };

    let (h, w) = (height as usize, width as usize);
    let channels = if h * w == 0 { 1 } else { pixels.len() / (h * w) };
    let shape = if channels == 1 {
        vec![h, w]
    } else {
        vec![h, w, channels]
    };

    Ok(RawImage::from_shape_vec(IxDyn(&shape), pixels)?)
}

pub fn dynamic_to_array(img: DynamicImage) -> Result<RawImage> {
    let (width, height) = img.dimensions();

    let (channels, pixels) = match img {
        DynamicImage::ImageLuma8(buf) => (1, widen(buf.into_raw())),
        DynamicImage::ImageLumaA8(buf) => (2, widen(buf.into_raw())),
        DynamicImage::ImageRgb8(buf) => (3, widen(buf.into_raw())),
        DynamicImage::ImageRgba8(buf) => (4, widen(buf.into_raw())),
        DynamicImage::ImageLuma16(buf) => (1, widen(buf.into_raw())),
        DynamicImage::ImageLumaA16(buf) => (2, widen(buf.into_raw())),
        DynamicImage::ImageRgb16(buf) => (3, widen(buf.into_raw())),
        DynamicImage::ImageRgba16(buf) => (4, widen(buf.into_raw())),
        DynamicImage::ImageRgb32F(buf) => (3, buf.into_raw()),
        DynamicImage::ImageRgba32F(buf) => (4, buf.into_raw()),
        other => (4, widen(other.to_rgba8().into_raw())),
    };

    let (h, w) = (height as usize, width as usize);
    let shape = if channels == 1 {
        vec![h, w]
    } else {
        vec![h, w, channels]
    };

    Ok(RawImage::from_shape_vec(IxDyn(&shape), pixels)?)
}

fn widen<P: Into<Float>>(raw: Vec<P>) -> Vec<Float> {
    raw.into_iter().map(Into::into).collect()
}

use std::path::Path;

use image::{imageops, DynamicImage, GrayImage, Luma};
use tracing::debug;

use super::crop::CropRect;
use crate::error::Result;

/// CLAHE clip limit
pub const DEFAULT_CLIP_LIMIT: f32 = 3.0;
/// CLAHE tiles per side
pub const DEFAULT_TILE_GRID: u32 = 8;
/// Sigma matching a 15x15 Gaussian kernel
pub const DEFAULT_BLUR_SIGMA: f32 = 2.6;

/// Turns a full photograph into the single-channel frame the detector diffs:
/// crop, grayscale, local contrast enhancement, blur.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    crop: CropRect,
    clip_limit: f32,
    tile_grid: u32,
    blur_sigma: f32,
}

impl Preprocessor {
    pub fn new(crop: CropRect) -> Self {
        Preprocessor {
            crop,
            clip_limit: DEFAULT_CLIP_LIMIT,
            tile_grid: DEFAULT_TILE_GRID,
            blur_sigma: DEFAULT_BLUR_SIGMA,
        }
    }

    pub fn with_clip_limit(mut self, clip_limit: f32) -> Self {
        self.clip_limit = clip_limit;
        self
    }

    pub fn with_tile_grid(mut self, tile_grid: u32) -> Self {
        self.tile_grid = tile_grid.max(1);
        self
    }

    pub fn with_blur_sigma(mut self, sigma: f32) -> Self {
        self.blur_sigma = sigma;
        self
    }

    /// Loads and preprocesses one photograph
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<GrayImage> {
        let path = path.as_ref();
        debug!("Loading frame {}", path.display());
        let image = image::open(path)?;
        self.process(&image)
    }

    pub fn process(&self, image: &DynamicImage) -> Result<GrayImage> {
        self.crop.validate(image.width(), image.height())?;
        let cropped = image.crop_imm(
            self.crop.x_min,
            self.crop.y_min,
            self.crop.width(),
            self.crop.height(),
        );
        let grey = cropped.to_luma8();
        let enhanced = equalize_adaptive(&grey, self.clip_limit, self.tile_grid);
        if self.blur_sigma > 0.0 {
            Ok(imageops::blur(&enhanced, self.blur_sigma))
        } else {
            Ok(enhanced)
        }
    }
}

/// Contrast-limited adaptive histogram equalisation.
///
/// Each tile gets its own clipped-histogram lookup table; pixels blend the
/// tables of the four nearest tile centres bilinearly.
pub fn equalize_adaptive(image: &GrayImage, clip_limit: f32, grid: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let tile_w = width.div_ceil(grid.clamp(1, width));
    let tile_h = height.div_ceil(grid.clamp(1, height));
    let tiles_x = width.div_ceil(tile_w);
    let tiles_y = height.div_ceil(tile_h);

    let mut luts = Vec::with_capacity((tiles_x * tiles_y) as usize);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            let x1 = (x0 + tile_w).min(width);
            let y1 = (y0 + tile_h).min(height);
            luts.push(tile_lut(image, x0, y0, x1, y1, clip_limit));
        }
    }

    // Position of a pixel relative to the tile centres, as (low tile, high tile, weight of high)
    let axis = |p: u32, tile: u32, count: u32| -> (usize, usize, f32) {
        let f = (p as f32 + 0.5) / tile as f32 - 0.5;
        if f <= 0.0 {
            return (0, 0, 0.0);
        }
        let low = (f.floor() as u32).min(count - 1);
        let high = (low + 1).min(count - 1);
        (low as usize, high as usize, (f - low as f32).clamp(0.0, 1.0))
    };

    let stride = tiles_x as usize;
    GrayImage::from_fn(width, height, |x, y| {
        let value = image.get_pixel(x, y).0[0] as usize;
        let (x0, x1, ax) = axis(x, tile_w, tiles_x);
        let (y0, y1, ay) = axis(y, tile_h, tiles_y);

        let top = luts[y0 * stride + x0][value] as f32 * (1.0 - ax)
            + luts[y0 * stride + x1][value] as f32 * ax;
        let bottom = luts[y1 * stride + x0][value] as f32 * (1.0 - ax)
            + luts[y1 * stride + x1][value] as f32 * ax;
        let blended = top * (1.0 - ay) + bottom * ay;
        Luma([blended.round().clamp(0.0, 255.0) as u8])
    })
}

fn tile_lut(image: &GrayImage, x0: u32, y0: u32, x1: u32, y1: u32, clip_limit: f32) -> [u8; 256] {
    let mut histogram = [0u32; 256];
    for y in y0..y1 {
        for x in x0..x1 {
            histogram[image.get_pixel(x, y).0[0] as usize] += 1;
        }
    }

    let area = (x1 - x0) * (y1 - y0);
    if clip_limit > 0.0 {
        let limit = ((clip_limit * area as f32 / 256.0) as u32).max(1);
        let mut excess = 0u32;
        for bin in histogram.iter_mut() {
            if *bin > limit {
                excess += *bin - limit;
                *bin = limit;
            }
        }
        let share = excess / 256;
        let remainder = (excess % 256) as usize;
        for (i, bin) in histogram.iter_mut().enumerate() {
            *bin += share + u32::from(i < remainder);
        }
    }

    let scale = 255.0 / area.max(1) as f32;
    let mut lut = [0u8; 256];
    let mut cumulative = 0u32;
    for (i, bin) in histogram.iter().enumerate() {
        cumulative += bin;
        lut[i] = (cumulative as f32 * scale).round().min(255.0) as u8;
    }
    lut
}

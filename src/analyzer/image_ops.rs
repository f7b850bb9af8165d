//! Pixel-level operations behind the teeth heuristics
//!
//! Grayscale and HSV follow the 8-bit conventions of common vision toolkits:
//! luma uses BT.601 weights, hue is halved into `0..=180`, saturation and
//! value span `0..=255`.

use image::{GrayImage, Luma, RgbImage};
use imageproc::contours::{find_contours, BorderType};
use imageproc::filter::{gaussian_blur_f32, median_filter};
use imageproc::geometry::contour_area;

/// Sigma a 5x5 Gaussian kernel gets when none is given
pub const BLUR_SIGMA_5X5: f32 = 1.1;
/// Sigma of the weighting window for an 11x11 adaptive threshold block
pub const ADAPTIVE_SIGMA_11: f32 = 2.0;
/// Offset subtracted from the local mean in the adaptive threshold
pub const ADAPTIVE_OFFSET: f32 = 2.0;

/// Convert RGB to 8-bit luma with BT.601 weights
pub fn to_gray(rgb: &RgbImage) -> GrayImage {
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
        Luma([luma.round().clamp(0.0, 255.0) as u8])
    })
}

/// Noise reduction before thresholding
pub fn gaussian_blur(gray: &GrayImage) -> GrayImage {
    gaussian_blur_f32(gray, BLUR_SIGMA_5X5)
}

/// 5x5 median filter
pub fn median_blur(gray: &GrayImage) -> GrayImage {
    median_filter(gray, 2, 2)
}

/// Contrast-limited adaptive histogram equalization
///
/// The image is split into a `tiles x tiles` grid; each tile gets a clipped
/// histogram-equalization lookup table and pixels are mapped by bilinear
/// interpolation between the four nearest tables. Sizes that do not divide
/// evenly are padded by mirroring (without repeating the edge pixel) so every
/// tile covers the same number of pixels.
pub fn clahe(gray: &GrayImage, clip_limit: f32, tiles: u32) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return gray.clone();
    }

    let tiles = tiles.max(1);
    let tile_w = width.div_ceil(tiles);
    let tile_h = height.div_ceil(tiles);
    let padded = reflect_pad(gray, tile_w * tiles, tile_h * tiles);

    let mut luts = vec![[0u8; 256]; (tiles * tiles) as usize];
    for ty in 0..tiles {
        for tx in 0..tiles {
            luts[(ty * tiles + tx) as usize] =
                tile_lut(&padded, tx * tile_w, ty * tile_h, tile_w, tile_h, clip_limit);
        }
    }

    GrayImage::from_fn(width, height, |x, y| {
        let (tx0, tx1, wx) = tile_neighbours(x, tile_w, tiles);
        let (ty0, ty1, wy) = tile_neighbours(y, tile_h, tiles);
        let v = gray.get_pixel(x, y).0[0] as usize;

        let lut = |tx: u32, ty: u32| luts[(ty * tiles + tx) as usize][v] as f32;
        let top = lut(tx0, ty0) * (1.0 - wx) + lut(tx1, ty0) * wx;
        let bottom = lut(tx0, ty1) * (1.0 - wx) + lut(tx1, ty1) * wx;
        let value = top * (1.0 - wy) + bottom * wy;
        Luma([value.round().clamp(0.0, 255.0) as u8])
    })
}

/// Grow `gray` to `width x height`, mirroring rows and columns past the edge
fn reflect_pad(gray: &GrayImage, width: u32, height: u32) -> GrayImage {
    if gray.dimensions() == (width, height) {
        return gray.clone();
    }
    GrayImage::from_fn(width, height, |x, y| {
        *gray.get_pixel(reflect_101(x, gray.width()), reflect_101(y, gray.height()))
    })
}

/// Mirror index for `0..len` that does not repeat the edge: `.. 3 4 | 3 2 ..`
fn reflect_101(i: u32, len: u32) -> u32 {
    if len <= 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let r = i % period;
    if r < len {
        r
    } else {
        period - r
    }
}

fn tile_lut(gray: &GrayImage, x0: u32, y0: u32, tile_w: u32, tile_h: u32, clip_limit: f32) -> [u8; 256] {
    let mut hist = [0u32; 256];
    for y in y0..y0 + tile_h {
        for x in x0..x0 + tile_w {
            hist[gray.get_pixel(x, y).0[0] as usize] += 1;
        }
    }
    let area = (tile_w * tile_h).max(1);

    if clip_limit > 0.0 {
        let limit = ((clip_limit * area as f32 / 256.0) as u32).max(1);
        let mut excess = 0u32;
        for bin in hist.iter_mut() {
            if *bin > limit {
                excess += *bin - limit;
                *bin = limit;
            }
        }

        let batch = excess / 256;
        for bin in hist.iter_mut() {
            *bin += batch;
        }
        // leftover counts go to evenly spaced bins across the whole range
        let mut residual = excess % 256;
        if residual > 0 {
            let step = (256 / residual).max(1) as usize;
            for bin in hist.iter_mut().step_by(step) {
                if residual == 0 {
                    break;
                }
                *bin += 1;
                residual -= 1;
            }
        }
    }

    let mut lut = [0u8; 256];
    let mut cumulative = 0u32;
    let scale = 255.0 / area as f32;
    for (i, count) in hist.iter().enumerate() {
        cumulative += count;
        lut[i] = (cumulative as f32 * scale).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Neighbouring tile indices and interpolation weight along one axis
fn tile_neighbours(pos: u32, tile_size: u32, tile_count: u32) -> (u32, u32, f32) {
    let f = pos as f32 / tile_size as f32 - 0.5;
    let lower = f.floor();
    let last = (tile_count - 1) as f32;
    (
        lower.clamp(0.0, last) as u32,
        (lower + 1.0).clamp(0.0, last) as u32,
        f - lower,
    )
}

/// Gaussian-weighted adaptive threshold, inverted: dark-on-local-mean pixels become 255
pub fn adaptive_threshold_inv(gray: &GrayImage) -> GrayImage {
    let local_mean = gaussian_blur_f32(gray, ADAPTIVE_SIGMA_11);
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let value = gray.get_pixel(x, y).0[0] as f32;
        let limit = local_mean.get_pixel(x, y).0[0] as f32 - ADAPTIVE_OFFSET;
        Luma([if value > limit { 0 } else { 255 }])
    })
}

/// Areas of outermost contours in a binary image
pub fn external_contour_areas(binary: &GrayImage) -> Vec<f64> {
    find_contours::<i32>(binary)
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .map(|c| contour_area(&c.points))
        .collect()
}

fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

/// Number of pixels at or below `level`
pub fn count_at_or_below(gray: &GrayImage, level: u8) -> u64 {
    gray.pixels().filter(|p| p.0[0] <= level).count() as u64
}

/// Number of non-zero pixels
pub fn count_nonzero(gray: &GrayImage) -> u64 {
    gray.pixels().filter(|p| p.0[0] > 0).count() as u64
}

/// Mean of all pixels, `None` for an empty image
pub fn mean(gray: &GrayImage) -> Option<f64> {
    let n = pixel_count(gray.width(), gray.height());
    if n == 0 {
        return None;
    }
    let sum: u64 = gray.pixels().map(|p| p.0[0] as u64).sum();
    Some(sum as f64 / n as f64)
}

/// Mean of the pixels strictly above `level`
pub fn mean_above(gray: &GrayImage, level: u8) -> Option<f64> {
    let (sum, n) = gray
        .pixels()
        .map(|p| p.0[0])
        .filter(|v| *v > level)
        .fold((0u64, 0u64), |(sum, n), v| (sum + v as u64, n + 1));
    (n > 0).then(|| sum as f64 / n as f64)
}

/// Population variance of all pixels
pub fn variance(gray: &GrayImage) -> Option<f64> {
    let mean = mean(gray)?;
    let n = pixel_count(gray.width(), gray.height()) as f64;
    let sum_sq: f64 = gray
        .pixels()
        .map(|p| {
            let d = p.0[0] as f64 - mean;
            d * d
        })
        .sum();
    Some(sum_sq / n)
}

/// OpenCV-style 8-bit HSV of one pixel
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let s = if max > 0.0 { delta / max * 255.0 } else { 0.0 };
    let mut h = if delta == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (gf - bf) / delta
    } else if max == gf {
        120.0 + 60.0 * (bf - rf) / delta
    } else {
        240.0 + 60.0 * (rf - gf) / delta
    };
    if h < 0.0 {
        h += 360.0;
    }

    (
        (h / 2.0).round().min(180.0) as u8,
        s.round().min(255.0) as u8,
        max as u8,
    )
}

/// Fraction of pixels whose hue is red with enough saturation and value
pub fn red_fraction(rgb: &RgbImage) -> f64 {
    let total = pixel_count(rgb.width(), rgb.height());
    if total == 0 {
        return 0.0;
    }
    let red = rgb
        .pixels()
        .filter(|p| {
            let [r, g, b] = p.0;
            let (h, s, v) = rgb_to_hsv(r, g, b);
            let red_hue = h <= 10 || (170..=180).contains(&h);
            red_hue && s >= 70 && v >= 50
        })
        .count();
    red as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn flat(width: u32, height: u32, value: u8) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([value]))
    }

    #[test]
    fn test_to_gray_weights() {
        let rgb = RgbImage::from_pixel(1, 1, Rgb([255, 0, 0]));
        assert_eq!(to_gray(&rgb).get_pixel(0, 0).0[0], 76);
        let white = RgbImage::from_pixel(1, 1, Rgb([255, 255, 255]));
        assert_eq!(to_gray(&white).get_pixel(0, 0).0[0], 255);
    }

    #[test]
    fn test_hsv_conventions() {
        assert_eq!(rgb_to_hsv(255, 0, 0), (0, 255, 255));
        assert_eq!(rgb_to_hsv(0, 255, 0), (60, 255, 255));
        assert_eq!(rgb_to_hsv(0, 0, 255), (120, 255, 255));
        assert_eq!(rgb_to_hsv(128, 128, 128), (0, 0, 128));
    }

    #[test]
    fn test_red_fraction() {
        let mut rgb = RgbImage::from_pixel(10, 10, Rgb([240, 240, 240]));
        for x in 0..10 {
            rgb.put_pixel(x, 0, Rgb([200, 20, 20]));
        }
        assert!((red_fraction(&rgb) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_clahe_keeps_flat_image_flat() {
        let out = clahe(&flat(32, 32, 90), 2.0, 8);
        let first = out.get_pixel(0, 0).0[0];
        assert!(out.pixels().all(|p| p.0[0] == first));
    }

    #[test]
    fn test_clahe_handles_uneven_sizes() {
        for (w, h) in [(9, 9), (10, 10), (17, 25), (33, 57), (41, 41), (34, 3)] {
            let out = clahe(&flat(w, h, 200), 2.0, 8);
            assert_eq!(out.dimensions(), (w, h));
            let first = out.get_pixel(0, 0).0[0];
            assert!(out.pixels().all(|p| p.0[0] == first), "{}x{} not flat", w, h);
        }
    }

    #[test]
    fn test_reflect_101() {
        let mirrored: Vec<u32> = (0..9).map(|i| reflect_101(i, 5)).collect();
        assert_eq!(mirrored, vec![0, 1, 2, 3, 4, 3, 2, 1, 0]);
        assert_eq!(reflect_101(7, 1), 0);
    }

    #[test]
    fn test_residual_spread_across_range() {
        // 272 pixels in one bin, limit 2: one count per bin plus 14 spread every 18 bins
        let img = GrayImage::from_pixel(16, 17, Luma([255]));
        let lut = tile_lut(&img, 0, 0, 16, 17, 2.0);
        assert_eq!(lut[100], 100);
        assert_eq!(lut[255], 255);
    }

    #[test]
    fn test_clahe_tiny_image() {
        let out = clahe(&flat(3, 2, 10), 2.0, 8);
        assert_eq!(out.dimensions(), (3, 2));
    }

    #[test]
    fn test_statistics() {
        let mut img = flat(2, 2, 100);
        img.put_pixel(0, 0, Luma([200]));
        assert_eq!(mean(&img), Some(125.0));
        assert_eq!(variance(&img), Some(1875.0));
        assert_eq!(mean_above(&img, 180), Some(200.0));
        assert_eq!(mean_above(&img, 220), None);
        assert_eq!(count_at_or_below(&img, 100), 3);
        assert_eq!(count_nonzero(&img), 4);
    }

    #[test]
    fn test_external_contours_ignore_holes() {
        let mut img = flat(40, 40, 0);
        for y in 5..25 {
            for x in 5..25 {
                img.put_pixel(x, y, Luma([255]));
            }
        }
        for y in 10..15 {
            for x in 10..15 {
                img.put_pixel(x, y, Luma([0]));
            }
        }
        let areas = external_contour_areas(&img);
        assert_eq!(areas.len(), 1);
        assert!((areas[0] - 361.0).abs() < 1.0);
    }
}

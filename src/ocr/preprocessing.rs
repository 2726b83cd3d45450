/// Image preprocessing for OCR
///
/// Prepares captured frames for Tesseract: grayscale conversion followed by
/// Gaussian-weighted adaptive thresholding. Local thresholding copes with
/// the mixed backgrounds of real screen content far better than one global
/// cutoff.
use image::{GrayImage, Luma};
use rayon::prelude::*;

use crate::capture::Frame;

/// Adaptive binarizer for OCR input.
///
/// Each pixel is compared against the Gaussian-weighted mean of its local
/// neighborhood minus a constant offset. Pixels above the local mean come
/// out white, the rest black.
pub struct AdaptiveThreshold {
    block_size: usize,
    offset: f32,
}

impl AdaptiveThreshold {
    /// # Arguments
    /// * `block_size` - Neighborhood size in pixels (odd, e.g. 11)
    /// * `offset` - Constant subtracted from the local mean
    pub fn new(block_size: usize, offset: f32) -> Self {
        Self { block_size, offset }
    }

    /// Convert a captured frame to a binary image ready for OCR.
    pub fn binarize(&self, frame: &Frame) -> GrayImage {
        let gray = rgba_to_grayscale(frame);
        self.threshold(&gray)
    }

    fn threshold(&self, gray: &GrayImage) -> GrayImage {
        let (width, height) = gray.dimensions();
        let width = width as usize;
        let local_mean = gaussian_blur(gray, self.block_size);
        let src = gray.as_raw();
        let offset = self.offset;

        let mut binary = GrayImage::new(width as u32, height);
        binary
            .as_flat_samples_mut()
            .samples
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for x in 0..width {
                    let idx = y * width + x;
                    row[x] = if src[idx] as f32 > local_mean[idx] - offset {
                        255
                    } else {
                        0
                    };
                }
            });

        binary
    }
}

impl Default for AdaptiveThreshold {
    fn default() -> Self {
        // 11x11 neighborhood with offset 2 works well for on-screen text
        Self::new(11, 2.0)
    }
}

/// Convert RGBA to grayscale using integer fixed-point arithmetic
///
/// Standard luma weights 0.299*R + 0.587*G + 0.114*B rewritten as
/// (77*R + 150*G + 29*B) / 256 to avoid float math per pixel.
fn rgba_to_grayscale(frame: &Frame) -> GrayImage {
    let (width, height) = frame.dimensions();
    let mut gray = GrayImage::new(width, height);

    for (x, y, pixel) in frame.enumerate_pixels() {
        let r = pixel[0] as u32;
        let g = pixel[1] as u32;
        let b = pixel[2] as u32;
        let value = ((77 * r + 150 * g + 29 * b) >> 8) as u8;
        gray.put_pixel(x, y, Luma([value]));
    }

    gray
}

/// Separable Gaussian blur, rows processed in parallel.
///
/// Sigma is derived from the kernel size the same way OpenCV derives it
/// when none is given, so an 11-pixel block uses sigma 2.0. Borders are
/// replicated.
fn gaussian_blur(gray: &GrayImage, size: usize) -> Vec<f32> {
    let width = gray.width() as usize;
    let height = gray.height() as usize;
    let kernel = gaussian_kernel(size);
    let radius = (size / 2) as isize;
    let src = gray.as_raw();

    // Horizontal pass
    let mut horizontal = vec![0f32; width * height];
    horizontal
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, out) in row.iter_mut().enumerate() {
                let mut acc = 0f32;
                for (k, weight) in kernel.iter().enumerate() {
                    let sx = (x as isize + k as isize - radius).clamp(0, width as isize - 1);
                    acc += src[y * width + sx as usize] as f32 * weight;
                }
                *out = acc;
            }
        });

    // Vertical pass
    let mut blurred = vec![0f32; width * height];
    blurred
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, out) in row.iter_mut().enumerate() {
                let mut acc = 0f32;
                for (k, weight) in kernel.iter().enumerate() {
                    let sy = (y as isize + k as isize - radius).clamp(0, height as isize - 1);
                    acc += horizontal[sy as usize * width + x] * weight;
                }
                *out = acc;
            }
        });

    blurred
}

fn gaussian_kernel(size: usize) -> Vec<f32> {
    let sigma = 0.3 * ((size - 1) as f32 * 0.5 - 1.0) + 0.8;
    let center = (size / 2) as isize;

    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let d = (i as isize - center) as f32;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();

    let sum: f32 = kernel.iter().sum();
    for weight in &mut kernel {
        *weight /= sum;
    }
    kernel
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_rgba_to_grayscale() {
        let mut img = RgbaImage::new(5, 1);
        img.put_pixel(0, 0, Rgba([255, 255, 255, 255])); // White
        img.put_pixel(1, 0, Rgba([0, 0, 0, 255])); // Black
        img.put_pixel(2, 0, Rgba([255, 0, 0, 255])); // Red

        let gray = rgba_to_grayscale(&img);

        assert_eq!(gray.get_pixel(0, 0)[0], 255);
        assert_eq!(gray.get_pixel(1, 0)[0], 0);
        // Red luma is ~76
        let red = gray.get_pixel(2, 0)[0];
        assert!(red > 70 && red < 82);
    }

    #[test]
    fn test_gaussian_kernel_normalized() {
        let kernel = gaussian_kernel(11);
        assert_eq!(kernel.len(), 11);

        let sum: f32 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);

        // Symmetric, peaked at the center
        assert!((kernel[0] - kernel[10]).abs() < 1e-6);
        assert!(kernel[5] > kernel[0]);
    }

    #[test]
    fn test_uniform_image_binarizes_white() {
        // On a flat image every pixel sits exactly at its local mean, so the
        // offset pushes everything above threshold.
        let img = RgbaImage::from_pixel(32, 32, Rgba([100, 100, 100, 255]));
        let binary = AdaptiveThreshold::default().binarize(&img);

        assert!(binary.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn test_dark_text_pixel_goes_black() {
        // A lone dark pixel on a light background falls well below the local
        // mean and must binarize to black.
        let mut img = RgbaImage::from_pixel(32, 32, Rgba([230, 230, 230, 255]));
        img.put_pixel(16, 16, Rgba([0, 0, 0, 255]));

        let binary = AdaptiveThreshold::default().binarize(&img);

        assert_eq!(binary.get_pixel(16, 16)[0], 0);
        assert_eq!(binary.get_pixel(2, 2)[0], 255);
    }

    #[test]
    fn test_output_dimensions_match() {
        let img = RgbaImage::from_pixel(17, 9, Rgba([50, 80, 120, 255]));
        let binary = AdaptiveThreshold::new(11, 2.0).binarize(&img);

        assert_eq!(binary.width(), 17);
        assert_eq!(binary.height(), 9);
    }
}

use image::DynamicImage;
use rayon::prelude::*;

/// Replaces square blocks of side `round(scale)` with their mean colour.
pub fn apply(img: DynamicImage, scale: f32) -> DynamicImage {
    let block = scale.round().max(0.0) as u32;
    if block <= 1 {
        return img;
    }

    let mut rgba = img.to_rgba8();
    let w = rgba.width();
    if w == 0 || rgba.height() == 0 {
        return DynamicImage::ImageRgba8(rgba);
    }
    let row_len = w as usize * 4;
    let band_len = row_len * block as usize;

    let buf: &mut [u8] = &mut rgba;
    buf.par_chunks_mut(band_len).for_each(|band| {
        let rows = band.len() / row_len;
        for bx in (0..w).step_by(block as usize) {
            let bw = block.min(w - bx) as usize;
            let mut sum = [0u64; 4];
            for r in 0..rows {
                for x in bx as usize..bx as usize + bw {
                    let i = r * row_len + x * 4;
                    for c in 0..4 {
                        sum[c] += band[i + c] as u64;
                    }
                }
            }
            let n = (rows * bw) as u64;
            let mean = sum.map(|s| ((s + n / 2) / n) as u8);
            for r in 0..rows {
                for x in bx as usize..bx as usize + bw {
                    let i = r * row_len + x * 4;
                    band[i..i + 4].copy_from_slice(&mean);
                }
            }
        }
    });

    DynamicImage::ImageRgba8(rgba)
}

#[cfg(test)]
mod tests {
    use image::{DynamicImage, ImageBuffer, Rgba};

    use super::apply;

    #[test]
    fn scale_of_one_is_identity() {
        let img = DynamicImage::ImageRgba8(ImageBuffer::from_fn(5, 5, |x, y| {
            Rgba([(x * 40) as u8, (y * 40) as u8, 0, 255])
        }));
        assert_eq!(apply(img.clone(), 1.0).to_rgba8(), img.to_rgba8());
    }

    #[test]
    fn block_takes_mean_colour() {
        let mut buf = ImageBuffer::from_pixel(2, 2, Rgba([0u8, 0, 0, 255]));
        buf.put_pixel(1, 0, Rgba([200, 100, 40, 255]));
        let out = apply(DynamicImage::ImageRgba8(buf), 2.0).to_rgba8();
        for px in out.pixels() {
            assert_eq!(px.0, [50, 25, 10, 255]);
        }
    }

    #[test]
    fn partial_blocks_at_border_are_filled() {
        let img = DynamicImage::ImageRgba8(ImageBuffer::from_fn(5, 3, |x, _| {
            Rgba([if x == 4 { 255 } else { 0 }, 0, 0, 255])
        }));
        let out = apply(img, 4.0).to_rgba8();
        assert_eq!(out.get_pixel(0, 0)[0], 0);
        assert_eq!(out.get_pixel(4, 2)[0], 255);
    }
}

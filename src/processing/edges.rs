use image::{DynamicImage, RgbaImage};

/// Per-channel Sobel edge magnitude scaled by `intensity`.
///
/// A full black-to-white step maps to 255 at intensity 1.0. Flat regions go
/// black; alpha is kept from the source.
pub fn apply(img: DynamicImage, intensity: f32) -> DynamicImage {
    let src = img.to_rgba8();
    let (w, h) = src.dimensions();
    let gain = intensity.max(0.0) / 4.0;

    let mut out = RgbaImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let sample = |dx: i64, dy: i64, c: usize| -> f32 {
                let sx = (x as i64 + dx).clamp(0, w as i64 - 1) as u32;
                let sy = (y as i64 + dy).clamp(0, h as i64 - 1) as u32;
                src.get_pixel(sx, sy)[c] as f32
            };

            let px = out.get_pixel_mut(x, y);
            for c in 0..3 {
                let gx = sample(1, -1, c) + 2.0 * sample(1, 0, c) + sample(1, 1, c)
                    - sample(-1, -1, c)
                    - 2.0 * sample(-1, 0, c)
                    - sample(-1, 1, c);
                let gy = sample(-1, 1, c) + 2.0 * sample(0, 1, c) + sample(1, 1, c)
                    - sample(-1, -1, c)
                    - 2.0 * sample(0, -1, c)
                    - sample(1, -1, c);
                let mag = (gx * gx + gy * gy).sqrt() * gain;
                px[c] = mag.round().clamp(0.0, 255.0) as u8;
            }
            px[3] = src.get_pixel(x, y)[3];
        }
    }

    DynamicImage::ImageRgba8(out)
}

#[cfg(test)]
mod tests {
    use image::{DynamicImage, ImageBuffer, Rgba};

    use super::apply;

    fn step() -> DynamicImage {
        let mut buf = ImageBuffer::from_pixel(6, 3, Rgba([255u8, 255, 255, 255]));
        for y in 0..3 {
            for x in 0..3 {
                buf.put_pixel(x, y, Rgba([0, 0, 0, 255]));
            }
        }
        DynamicImage::ImageRgba8(buf)
    }

    #[test]
    fn flat_image_turns_black() {
        let img =
            DynamicImage::ImageRgba8(ImageBuffer::from_pixel(5, 5, Rgba([180, 60, 30, 200])));
        let out = apply(img, 1.0).to_rgba8();
        assert!(out.pixels().all(|p| p.0 == [0, 0, 0, 200]));
    }

    #[test]
    fn step_edge_is_bright_and_interior_dark() {
        let out = apply(step(), 1.0).to_rgba8();
        assert_eq!(out.get_pixel(2, 1)[0], 255);
        assert_eq!(out.get_pixel(0, 1)[0], 0);
        assert_eq!(out.get_pixel(5, 1)[0], 0);
    }

    #[test]
    fn intensity_scales_response() {
        let full = apply(step(), 1.0).to_rgba8().get_pixel(3, 1)[0];
        let half = apply(step(), 0.5).to_rgba8().get_pixel(3, 1)[0];
        assert!(half < full);
        assert!(half > 0);
    }

    #[test]
    fn zero_intensity_is_black() {
        let out = apply(step(), 0.0).to_rgba8();
        assert!(out.pixels().all(|p| p[0] == 0 && p[3] == 255));
    }
}

use image::{DynamicImage, Rgba, RgbaImage};
use rayon::prelude::*;

/// Voronoi "crystal" effect. Seeds sit on a jittered grid with pitch `radius`
/// and every pixel takes the colour found under its nearest seed.
pub fn apply(img: DynamicImage, radius: f32) -> DynamicImage {
    if radius < 1.0 {
        return img;
    }

    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();
    if w == 0 || h == 0 {
        return img;
    }

    let grid = SeedGrid::new(&rgba, radius);
    let row_len = w as usize * 4;
    let mut data = vec![0u8; row_len * h as usize];

    data.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..w as usize {
                let px = grid.nearest(x as f32 + 0.5, y as f32 + 0.5);
                row[x * 4..x * 4 + 4].copy_from_slice(&px.0);
            }
        });

    match RgbaImage::from_raw(w, h, data) {
        Some(out) => DynamicImage::ImageRgba8(out),
        None => img,
    }
}

struct Seed {
    x: f32,
    y: f32,
    color: Rgba<u8>,
}

struct SeedGrid {
    pitch: f32,
    cols: usize,
    rows: usize,
    seeds: Vec<Seed>,
}

impl SeedGrid {
    fn new(src: &RgbaImage, pitch: f32) -> Self {
        let (w, h) = src.dimensions();
        let cols = (w as f32 / pitch).ceil().max(1.0) as usize;
        let rows = (h as f32 / pitch).ceil().max(1.0) as usize;

        let mut seeds = Vec::with_capacity(cols * rows);
        for gy in 0..rows {
            for gx in 0..cols {
                let x = (gx as f32 + jitter(gx as u32, gy as u32, 0)) * pitch;
                let y = (gy as f32 + jitter(gx as u32, gy as u32, 1)) * pitch;
                let sx = (x as u32).min(w - 1);
                let sy = (y as u32).min(h - 1);
                seeds.push(Seed {
                    x,
                    y,
                    color: *src.get_pixel(sx, sy),
                });
            }
        }

        Self {
            pitch,
            cols,
            rows,
            seeds,
        }
    }

    fn nearest(&self, x: f32, y: f32) -> Rgba<u8> {
        let gx = ((x / self.pitch) as usize).min(self.cols - 1);
        let gy = ((y / self.pitch) as usize).min(self.rows - 1);

        let mut best = &self.seeds[gy * self.cols + gx];
        let mut best_d = f32::MAX;
        // Each seed stays inside its own cell, so the 3x3 neighbourhood is enough.
        for ny in gy.saturating_sub(1)..=(gy + 1).min(self.rows - 1) {
            for nx in gx.saturating_sub(1)..=(gx + 1).min(self.cols - 1) {
                let seed = &self.seeds[ny * self.cols + nx];
                let d = (seed.x - x).powi(2) + (seed.y - y).powi(2);
                if d < best_d {
                    best_d = d;
                    best = seed;
                }
            }
        }
        best.color
    }
}

/// Deterministic offset in [0, 1) for a grid cell.
fn jitter(cx: u32, cy: u32, salt: u32) -> f32 {
    let mut h = cx.wrapping_mul(0x9E37_79B1)
        ^ cy.wrapping_mul(0x85EB_CA77)
        ^ salt.wrapping_mul(0xC2B2_AE3D);
    h ^= h >> 15;
    h = h.wrapping_mul(0x2C1B_3C6D);
    h ^= h >> 12;
    h = h.wrapping_mul(0x297A_2D39);
    h ^= h >> 15;
    (h & 0xFFFF) as f32 / 65536.0
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use image::{DynamicImage, ImageBuffer, Rgba};

    use super::{apply, jitter};

    fn gradient(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(ImageBuffer::from_fn(w, h, |x, y| {
            Rgba([(x * 255 / w) as u8, (y * 255 / h) as u8, 128, 255])
        }))
    }

    #[test]
    fn sub_pixel_radius_is_identity() {
        let img = gradient(8, 8);
        assert_eq!(apply(img.clone(), 0.5).to_rgba8(), img.to_rgba8());
    }

    #[test]
    fn flat_image_stays_flat() {
        let img =
            DynamicImage::ImageRgba8(ImageBuffer::from_pixel(20, 20, Rgba([40, 80, 120, 255])));
        assert_eq!(apply(img.clone(), 6.0).to_rgba8(), img.to_rgba8());
    }

    #[test]
    fn output_collapses_to_one_colour_per_cell() {
        let out = apply(gradient(40, 40), 10.0).to_rgba8();
        let colours: HashSet<[u8; 4]> = out.pixels().map(|p| p.0).collect();
        // 4x4 grid of cells
        assert!(colours.len() <= 16);
        assert!(colours.len() > 1);
    }

    #[test]
    fn result_is_deterministic() {
        let a = apply(gradient(30, 17), 7.0).to_rgba8();
        let b = apply(gradient(30, 17), 7.0).to_rgba8();
        assert_eq!(a, b);
    }

    #[test]
    fn jitter_stays_in_unit_range() {
        for cx in 0..50 {
            for cy in 0..50 {
                let j = jitter(cx, cy, cx % 2);
                assert!((0.0..1.0).contains(&j));
            }
        }
    }
}

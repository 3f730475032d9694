use std::path::{Path, PathBuf};
use std::sync::mpsc;

use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareFormat {
    Jpg,
    Png,
    Webp,
}

impl ShareFormat {
    pub const ALL: [ShareFormat; 3] = [ShareFormat::Jpg, ShareFormat::Png, ShareFormat::Webp];

    pub fn label(self) -> &'static str {
        match self {
            ShareFormat::Jpg => "JPG",
            ShareFormat::Png => "PNG",
            ShareFormat::Webp => "WebP",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ShareFormat::Jpg => "jpg",
            ShareFormat::Png => "png",
            ShareFormat::Webp => "webp",
        }
    }

    /// Parses a persisted format name; unknown names fall back to JPG.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "png" => ShareFormat::Png,
            "webp" => ShareFormat::Webp,
            _ => ShareFormat::Jpg,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ShareOptions {
    pub format: ShareFormat,
    pub jpg_quality: u8,
}

impl Default for ShareOptions {
    fn default() -> Self {
        Self {
            format: ShareFormat::Jpg,
            jpg_quality: 90,
        }
    }
}

/// Writes `img` into `dir` as `<stem>.<ext>` without overwriting anything.
pub fn share_image(
    img: &DynamicImage,
    dir: &Path,
    stem: &str,
    options: ShareOptions,
) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let output_path = build_output_path(dir, stem, options.format);
    write_image(img, &output_path, options)?;
    tracing::info!(path = %output_path.display(), "shared image");
    Ok(output_path)
}

/// Runs [`share_image`] on a background thread. The receiver yields a single
/// result once the file is written.
pub fn spawn_share(
    img: DynamicImage,
    dir: PathBuf,
    stem: String,
    options: ShareOptions,
    ctx: &egui::Context,
) -> mpsc::Receiver<Result<PathBuf, String>> {
    let (tx, rx) = mpsc::channel();
    let ctx2 = ctx.clone();
    std::thread::spawn(move || {
        let result = share_image(&img, &dir, &stem, options).map_err(|err| {
            tracing::warn!(%err, "share failed");
            err.to_string()
        });
        let _ = tx.send(result);
        ctx2.request_repaint();
    });
    rx
}

pub fn default_share_dir() -> PathBuf {
    dirs::picture_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Instafilter")
}

pub fn expand_home_prefix(raw: &str) -> PathBuf {
    if raw == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(raw)
}

fn build_output_path(dir: &Path, stem: &str, format: ShareFormat) -> PathBuf {
    let base = dir.join(format!("{}.{}", stem, format.extension()));
    if !base.exists() {
        return base;
    }
    for n in 2..10000 {
        let candidate = dir.join(format!("{}-{}.{}", stem, n, format.extension()));
        if !candidate.exists() {
            return candidate;
        }
    }
    dir.join(format!("{}-final.{}", stem, format.extension()))
}

fn write_image(
    img: &DynamicImage,
    output_path: &Path,
    options: ShareOptions,
) -> anyhow::Result<()> {
    let file = std::fs::File::create(output_path)?;
    let writer = std::io::BufWriter::new(file);
    match options.format {
        ShareFormat::Jpg => {
            // JPEG has no alpha channel.
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            let quality = options.jpg_quality.clamp(1, 100);
            let encoder = JpegEncoder::new_with_quality(writer, quality);
            rgb.write_with_encoder(encoder)?;
        }
        ShareFormat::Png => {
            let encoder = PngEncoder::new_with_quality(
                writer,
                CompressionType::Default,
                PngFilterType::Adaptive,
            );
            img.write_with_encoder(encoder)?;
        }
        ShareFormat::Webp => {
            let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
            rgba.write_with_encoder(WebPEncoder::new_lossless(writer))?;
        }
    }
    Ok(())
}

use std::{
    io::Cursor,
    path::{Path, PathBuf},
    sync::mpsc,
};

use image::DynamicImage;

/// Downscale loaded photos to this longest-edge size before filtering.
pub const PREVIEW_MAX: u32 = 1920;

static SUPPORTED_IMAGE_EXTS: &[&str] = &[
    "jpg", "jpeg", "png", "tiff", "tif", "webp", "bmp", "gif",
];

/// Returns `true` if the path has a supported image extension.
pub fn is_supported_image(path: &Path) -> bool {
    let Some(ext) = path.extension().map(|e| e.to_string_lossy()) else {
        return false;
    };
    SUPPORTED_IMAGE_EXTS
        .iter()
        .any(|known| ext.eq_ignore_ascii_case(known))
}

/// Reads the raw bytes behind a picked photo. `None` means nothing usable was
/// picked.
pub fn read_bytes(path: &Path) -> Option<Vec<u8>> {
    match std::fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(err) => {
            tracing::debug!(path = %path.display(), %err, "photo read failed");
            None
        }
    }
}

/// Decodes photo bytes and rotates them upright according to EXIF.
pub fn decode(bytes: &[u8]) -> anyhow::Result<DynamicImage> {
    let img = image::load_from_memory(bytes)?;
    Ok(match exif_orientation(bytes) {
        Some(orientation) => apply_orientation(img, orientation),
        None => img,
    })
}

fn exif_orientation(bytes: &[u8]) -> Option<u32> {
    let mut cursor = Cursor::new(bytes);
    let exif = exif::Reader::new()
        .read_from_container(&mut cursor)
        .ok()?;
    exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?
        .value
        .get_uint(0)
}

/// Applies an EXIF orientation value (1-8). Unknown values leave the image as is.
pub fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

pub fn fit_preview(img: DynamicImage, max: u32) -> DynamicImage {
    if max > 0 && (img.width() > max || img.height() > max) {
        img.thumbnail(max, max)
    } else {
        img
    }
}

/// Full load path for a picked photo: read, decode, shrink for preview.
pub fn load_photo(path: &Path, preview_max: u32) -> Option<DynamicImage> {
    let bytes = read_bytes(path)?;
    match decode(&bytes) {
        Ok(img) => Some(fit_preview(img, preview_max)),
        Err(err) => {
            tracing::debug!(path = %path.display(), %err, "photo decode failed");
            None
        }
    }
}

enum LoadEvent {
    Loaded { request: u64, img: DynamicImage },
    Failed { request: u64 },
}

/// Loads picked photos off the UI thread. Only the most recent request's
/// result is ever handed back.
pub struct PhotoLoader {
    preview_max: u32,
    latest: u64,
    loading: bool,
    tx: mpsc::SyncSender<LoadEvent>,
    rx: mpsc::Receiver<LoadEvent>,
}

impl PhotoLoader {
    pub fn new(preview_max: u32) -> Self {
        let (tx, rx) = mpsc::sync_channel(8);
        Self {
            preview_max,
            latest: 0,
            loading: false,
            tx,
            rx,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn request(&mut self, path: PathBuf, ctx: &egui::Context) {
        tracing::debug!(path = %path.display(), "loading photo");
        let max = self.preview_max;
        let ctx2 = ctx.clone();
        self.spawn(move || load_photo(&path, max), move || ctx2.request_repaint());
    }

    fn spawn<L, N>(&mut self, load: L, notify: N)
    where
        L: FnOnce() -> Option<DynamicImage> + Send + 'static,
        N: FnOnce() + Send + 'static,
    {
        self.latest += 1;
        self.loading = true;
        let request = self.latest;
        let tx = self.tx.clone();
        std::thread::spawn(move || {
            let event = match load() {
                Some(img) => LoadEvent::Loaded { request, img },
                None => LoadEvent::Failed { request },
            };
            let _ = tx.send(event);
            notify();
        });
    }

    /// Drains finished loads. Returns the newest request's image, if it has
    /// arrived and succeeded.
    pub fn poll(&mut self) -> Option<DynamicImage> {
        let mut newest = None;
        while let Ok(event) = self.rx.try_recv() {
            match event {
                LoadEvent::Loaded { request, img } if request == self.latest => {
                    self.loading = false;
                    newest = Some(img);
                }
                LoadEvent::Failed { request } if request == self.latest => {
                    self.loading = false;
                }
                LoadEvent::Loaded { request, .. } | LoadEvent::Failed { request } => {
                    tracing::debug!(request, latest = self.latest, "dropping superseded load");
                }
            }
        }
        newest
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::path::Path;
    use std::sync::mpsc;
    use std::time::Duration;

    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};

    use super::{
        PhotoLoader, apply_orientation, decode, fit_preview, is_supported_image, read_bytes,
    };

    const WAIT: Duration = Duration::from_secs(5);

    fn solid(px: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(ImageBuffer::from_pixel(2, 2, Rgba(px)))
    }

    fn two_by_one() -> DynamicImage {
        let mut buf = ImageBuffer::from_pixel(2, 1, Rgba([0u8, 0, 0, 255]));
        buf.put_pixel(1, 0, Rgba([255, 255, 255, 255]));
        DynamicImage::ImageRgba8(buf)
    }

    #[test]
    fn decodes_png_bytes() {
        let mut bytes = Vec::new();
        two_by_one()
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        let img = decode(&bytes).expect("png should decode");
        assert_eq!((img.width(), img.height()), (2, 1));
        assert_eq!(img.to_rgba8().get_pixel(1, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(decode(b"definitely not an image").is_err());
    }

    #[test]
    fn missing_file_reads_as_absent() {
        assert!(read_bytes(Path::new("/nonexistent/instafilter/photo.jpg")).is_none());
    }

    #[test]
    fn orientation_six_turns_landscape_to_portrait() {
        let out = apply_orientation(two_by_one(), 6);
        assert_eq!((out.width(), out.height()), (1, 2));
        assert_eq!(out.to_rgba8().get_pixel(0, 1)[0], 255);
    }

    #[test]
    fn orientation_two_mirrors() {
        let out = apply_orientation(two_by_one(), 2);
        assert_eq!(out.to_rgba8().get_pixel(0, 0)[0], 255);
    }

    #[test]
    fn unknown_orientation_is_ignored() {
        let out = apply_orientation(two_by_one(), 42);
        assert_eq!(out.to_rgba8(), two_by_one().to_rgba8());
    }

    #[test]
    fn preview_caps_long_edge() {
        let img = DynamicImage::new_rgba8(400, 100);
        let out = fit_preview(img, 200);
        assert_eq!((out.width(), out.height()), (200, 50));
        let small = fit_preview(DynamicImage::new_rgba8(20, 10), 200);
        assert_eq!((small.width(), small.height()), (20, 10));
    }

    #[test]
    fn extension_detection_is_case_insensitive() {
        assert!(is_supported_image(Path::new("/tmp/a.JPG")));
        assert!(is_supported_image(Path::new("/tmp/a.png")));
        assert!(!is_supported_image(Path::new("/tmp/a.txt")));
        assert!(!is_supported_image(Path::new("/tmp/noext")));
    }

    #[test]
    fn later_request_supersedes_earlier_one() {
        let mut loader = PhotoLoader::new(1920);
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let (done_tx, done_rx) = mpsc::channel::<()>();
        let done_second = done_tx.clone();

        loader.spawn(
            move || {
                let _ = release_rx.recv();
                Some(solid([255, 0, 0, 255]))
            },
            move || {
                let _ = done_tx.send(());
            },
        );
        loader.spawn(
            || Some(solid([0, 0, 255, 255])),
            move || {
                let _ = done_second.send(());
            },
        );

        done_rx.recv_timeout(WAIT).unwrap();
        let img = loader.poll().expect("second load should be delivered");
        assert_eq!(img.to_rgba8().get_pixel(0, 0).0, [0, 0, 255, 255]);
        assert!(!loader.is_loading());

        release_tx.send(()).unwrap();
        done_rx.recv_timeout(WAIT).unwrap();
        assert!(loader.poll().is_none());
    }

    #[test]
    fn failed_load_clears_loading_without_image() {
        let mut loader = PhotoLoader::new(1920);
        let (done_tx, done_rx) = mpsc::channel::<()>();
        loader.spawn(
            || None,
            move || {
                let _ = done_tx.send(());
            },
        );
        assert!(loader.is_loading());
        done_rx.recv_timeout(WAIT).unwrap();
        assert!(loader.poll().is_none());
        assert!(!loader.is_loading());
    }
}

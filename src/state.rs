use image::DynamicImage;

use crate::adapter;
use crate::filter::{Filter, FilterKind};

pub const DEFAULT_INTENSITY: f32 = 0.5;

/// The main screen's editing model: one input image, one active filter and
/// the intensity slider value, plus the image derived from them.
pub struct EditSession {
    filter: Filter,
    intensity: f32,
    processed: Option<DynamicImage>,
    revision: u64,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditSession {
    pub fn new() -> Self {
        Self {
            filter: Filter::new(FilterKind::default()),
            intensity: DEFAULT_INTENSITY,
            processed: None,
            revision: 0,
        }
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn filter_kind(&self) -> FilterKind {
        self.filter.kind()
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn processed(&self) -> Option<&DynamicImage> {
        self.processed.as_ref()
    }

    /// Bumped every time `processed` is replaced.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn load_image(&mut self, img: DynamicImage) {
        self.filter.set_input(img);
        self.apply_processing();
    }

    pub fn set_intensity(&mut self, value: f32) {
        self.intensity = value.clamp(0.0, 1.0);
        self.apply_processing();
    }

    /// Switches the active filter, carrying the current input image over.
    pub fn set_filter(&mut self, kind: FilterKind) {
        let input = self.filter.input().cloned();
        self.filter = Filter::new(kind);
        if let Some(img) = input {
            self.load_image(img);
        }
    }

    /// Re-derives the processed image. Leaves the previous result in place if
    /// nothing can be rendered.
    pub fn apply_processing(&mut self) {
        adapter::apply_intensity(&mut self.filter, self.intensity);
        let Some(out) = self.filter.output_image() else {
            tracing::debug!(filter = self.filter.kind().label(), "nothing to render");
            return;
        };
        self.processed = Some(out);
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use image::{DynamicImage, ImageBuffer, Rgba};

    use crate::filter::{FilterKind, ParamKey};

    use super::{DEFAULT_INTENSITY, EditSession};

    fn photo() -> DynamicImage {
        DynamicImage::ImageRgba8(ImageBuffer::from_fn(12, 8, |x, y| {
            Rgba([(x * 20) as u8, (y * 30) as u8, 90, 255])
        }))
    }

    #[test]
    fn starts_with_sepia_at_half_intensity() {
        let session = EditSession::new();
        assert_eq!(session.filter_kind(), FilterKind::SepiaTone);
        assert_eq!(session.intensity(), DEFAULT_INTENSITY);
        assert!(session.processed().is_none());
    }

    #[test]
    fn no_photo_means_no_output_after_slider_and_filter_changes() {
        let mut session = EditSession::new();
        session.set_intensity(0.9);
        session.set_filter(FilterKind::Pixellate);
        session.set_intensity(0.1);
        session.set_filter(FilterKind::Vignette);
        assert!(session.processed().is_none());
        assert_eq!(session.revision(), 0);
    }

    #[test]
    fn loading_a_photo_produces_output() {
        let mut session = EditSession::new();
        session.load_image(photo());
        let out = session.processed().expect("processed image");
        assert_eq!((out.width(), out.height()), (12, 8));
        assert_eq!(session.revision(), 1);
    }

    #[test]
    fn intensity_is_clamped_into_unit_range() {
        let mut session = EditSession::new();
        session.set_intensity(3.0);
        assert_eq!(session.intensity(), 1.0);
        session.set_intensity(-0.5);
        assert_eq!(session.intensity(), 0.0);
    }

    #[test]
    fn slider_change_recomputes_output() {
        let mut session = EditSession::new();
        session.load_image(photo());
        session.set_intensity(0.0);
        let plain = session.processed().unwrap().to_rgba8();
        session.set_intensity(1.0);
        let toned = session.processed().unwrap().to_rgba8();
        assert_ne!(plain, toned);
        assert_eq!(plain, photo().to_rgba8());
    }

    #[test]
    fn switching_filter_keeps_input_and_applies_intensity() {
        let mut session = EditSession::new();
        session.load_image(photo());
        session.set_intensity(0.4);
        session.set_filter(FilterKind::Pixellate);

        assert_eq!(session.filter_kind(), FilterKind::Pixellate);
        assert!(session.filter().input().is_some());
        assert_eq!(session.filter().value(ParamKey::Scale), Some(4.0));
        assert_eq!(session.revision(), 3);
    }

    #[test]
    fn unrenderable_input_keeps_previous_output() {
        let mut session = EditSession::new();
        session.load_image(photo());
        let before = session.processed().unwrap().to_rgba8();
        session.load_image(DynamicImage::new_rgba8(0, 0));
        assert_eq!(session.processed().unwrap().to_rgba8(), before);
        assert_eq!(session.revision(), 1);
    }
}

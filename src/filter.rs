use std::collections::BTreeMap;

use image::DynamicImage;

use crate::processing::{blur, crystallize, edges, pixellate, sepia, unsharp, vignette};

/// Numeric inputs a filter can expose to the intensity slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParamKey {
    Intensity,
    Radius,
    Scale,
}

impl ParamKey {
    pub const ALL: [ParamKey; 3] = [ParamKey::Intensity, ParamKey::Radius, ParamKey::Scale];

    pub fn name(self) -> &'static str {
        match self {
            ParamKey::Intensity => "intensity",
            ParamKey::Radius => "radius",
            ParamKey::Scale => "scale",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterKind {
    #[default]
    SepiaTone,
    Crystallize,
    Edges,
    GaussianBlur,
    Pixellate,
    UnsharpMask,
    Vignette,
}

impl FilterKind {
    pub const ALL: [FilterKind; 7] = [
        FilterKind::Crystallize,
        FilterKind::Edges,
        FilterKind::GaussianBlur,
        FilterKind::Pixellate,
        FilterKind::SepiaTone,
        FilterKind::UnsharpMask,
        FilterKind::Vignette,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterKind::SepiaTone => "Sepia Tone",
            FilterKind::Crystallize => "Crystallize",
            FilterKind::Edges => "Edges",
            FilterKind::GaussianBlur => "Gaussian Blur",
            FilterKind::Pixellate => "Pixellate",
            FilterKind::UnsharpMask => "Unsharp Mask",
            FilterKind::Vignette => "Vignette",
        }
    }

    /// Parameter keys this variant accepts.
    pub fn params(self) -> &'static [ParamKey] {
        match self {
            FilterKind::SepiaTone | FilterKind::Edges | FilterKind::Vignette => {
                &[ParamKey::Intensity]
            }
            FilterKind::Crystallize | FilterKind::GaussianBlur | FilterKind::UnsharpMask => {
                &[ParamKey::Radius]
            }
            FilterKind::Pixellate => &[ParamKey::Scale],
        }
    }

    pub fn supports(self, key: ParamKey) -> bool {
        self.params().contains(&key)
    }

    fn default_value(self, key: ParamKey) -> Option<f32> {
        if !self.supports(key) {
            return None;
        }
        let value = match self {
            FilterKind::SepiaTone => 1.0,
            FilterKind::Crystallize => 20.0,
            FilterKind::Edges => 1.0,
            FilterKind::GaussianBlur => 10.0,
            FilterKind::Pixellate => 8.0,
            FilterKind::UnsharpMask => unsharp::DEFAULT_RADIUS,
            FilterKind::Vignette => 0.0,
        };
        Some(value)
    }
}

/// A filter variant holding its input image and current parameter values.
#[derive(Clone)]
pub struct Filter {
    kind: FilterKind,
    input: Option<DynamicImage>,
    values: BTreeMap<ParamKey, f32>,
}

impl Filter {
    pub fn new(kind: FilterKind) -> Self {
        let values = kind
            .params()
            .iter()
            .filter_map(|&key| kind.default_value(key).map(|v| (key, v)))
            .collect();
        Self {
            kind,
            input: None,
            values,
        }
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    pub fn input_keys(&self) -> &'static [ParamKey] {
        self.kind.params()
    }

    pub fn set_input(&mut self, img: DynamicImage) {
        self.input = Some(img);
    }

    pub fn input(&self) -> Option<&DynamicImage> {
        self.input.as_ref()
    }

    pub fn value(&self, key: ParamKey) -> Option<f32> {
        self.values.get(&key).copied()
    }

    /// Sets `key` if this variant declares it. Returns `false` and leaves the
    /// filter unchanged otherwise.
    pub fn set_value(&mut self, key: ParamKey, value: f32) -> bool {
        if !self.kind.supports(key) {
            return false;
        }
        self.values.insert(key, value);
        true
    }

    /// Renders the current input with the current parameters.
    ///
    /// Returns `None` when there is no input or the input has no pixels.
    pub fn output_image(&self) -> Option<DynamicImage> {
        let input = self.input.as_ref()?;
        if input.width() == 0 || input.height() == 0 {
            return None;
        }
        let img = input.clone();
        let param = |key| self.value(key).unwrap_or_default();

        let out = match self.kind {
            FilterKind::SepiaTone => sepia::apply(img, param(ParamKey::Intensity)),
            FilterKind::Crystallize => crystallize::apply(img, param(ParamKey::Radius)),
            FilterKind::Edges => edges::apply(img, param(ParamKey::Intensity)),
            FilterKind::GaussianBlur => blur::apply(img, param(ParamKey::Radius)),
            FilterKind::Pixellate => pixellate::apply(img, param(ParamKey::Scale)),
            FilterKind::UnsharpMask => {
                unsharp::apply(img, param(ParamKey::Radius), unsharp::DEFAULT_AMOUNT)
            }
            FilterKind::Vignette => vignette::apply(
                img,
                param(ParamKey::Intensity),
                vignette::DEFAULT_RADIUS,
            ),
        };
        Some(out)
    }
}

use crate::filter::{Filter, ParamKey};

/// Radius range used for blur-like filters at full intensity.
pub const RADIUS_RANGE: f32 = 200.0;
/// Scale range used for pixellation-like filters at full intensity.
pub const SCALE_RANGE: f32 = 10.0;

impl ParamKey {
    /// Maps a normalized slider value onto this parameter's range.
    pub fn scaled(self, intensity: f32) -> f32 {
        match self {
            ParamKey::Intensity => intensity,
            ParamKey::Radius => intensity * RADIUS_RANGE,
            ParamKey::Scale => intensity * SCALE_RANGE,
        }
    }
}

/// Pushes `intensity` into every recognized parameter the filter declares.
/// Undeclared parameters are left as they are.
pub fn apply_intensity(filter: &mut Filter, intensity: f32) {
    for key in ParamKey::ALL {
        if filter.input_keys().contains(&key) {
            let value = key.scaled(intensity);
            tracing::trace!(param = key.name(), value, "adapting filter");
            filter.set_value(key, value);
        }
    }
}

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Value a host can pass for any key to ask for its default.
pub const UNSET: f64 = -1.0;

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
const AREA_PER_PARTICLE: f64 = 4000.0;
const MULTIPLIER_FLOOR: f64 = 0.001;
const DEFAULT_MULTIPLIER_IN: f64 = 1.5;
const DEFAULT_MULTIPLIER_OUT: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoundaryError {
    #[error("the surface has a width of 0")]
    ZeroWidth,
    #[error("the surface has a height of 0")]
    ZeroHeight,
    #[error("the surface is unavailable: {0}")]
    Unavailable(String),
}

/// Size of the drawable surface, in pixels. Never zero on either axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    width: u32,
    height: u32,
}

impl Bounds {
    pub fn new(width: u32, height: u32) -> Result<Self, BoundaryError> {
        if width == 0 {
            return Err(BoundaryError::ZeroWidth);
        }
        if height == 0 {
            return Err(BoundaryError::ZeroHeight);
        }
        Ok(Bounds { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Settings as supplied by a host. Absent keys, `-1` and NaN all mean "use the default".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialSettings {
    pub amount: Option<f64>,
    pub tolerance: Option<f64>,
    pub line_width: Option<f64>,
    pub size_min: Option<f64>,
    pub size_max: Option<f64>,
    pub position_x_min: Option<f64>,
    pub position_x_max: Option<f64>,
    pub position_y_min: Option<f64>,
    pub position_y_max: Option<f64>,
    pub speed_min: Option<f64>,
    pub speed_max: Option<f64>,
    pub direction_min: Option<f64>,
    pub direction_max: Option<f64>,
    pub color_min: Option<f64>,
    pub color_max: Option<f64>,
    pub multiplier_in: Option<f64>,
    pub multiplier_out: Option<f64>,
}

/// Fully resolved settings: every value finite and inside its documented range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub amount: f64,
    pub tolerance: f64,
    pub line_width: f64,
    pub size_min: f64,
    pub size_max: f64,
    pub position_x_min: f64,
    pub position_x_max: f64,
    pub position_y_min: f64,
    pub position_y_max: f64,
    /// Thousandths of a pixel per tick.
    pub speed_min: f64,
    pub speed_max: f64,
    /// Radians.
    pub direction_min: f64,
    pub direction_max: f64,
    /// Hue in degrees.
    pub color_min: f64,
    pub color_max: f64,
    pub multiplier_in: f64,
    pub multiplier_out: f64,
}

impl Settings {
    /// Number of particles to create. Fractional amounts are truncated.
    pub fn particle_count(&self) -> usize {
        self.amount.trunc() as usize
    }

    pub fn set_multiplier_in(&mut self, value: f64) {
        self.multiplier_in = resolve_key(
            "multiplierIn",
            Some(value),
            DEFAULT_MULTIPLIER_IN,
            MULTIPLIER_FLOOR,
            MAX_SAFE_INTEGER,
        );
    }

    pub fn set_multiplier_out(&mut self, value: f64) {
        self.multiplier_out = resolve_key(
            "multiplierOut",
            Some(value),
            DEFAULT_MULTIPLIER_OUT,
            MULTIPLIER_FLOOR,
            MAX_SAFE_INTEGER,
        );
    }
}

impl From<&Settings> for PartialSettings {
    fn from(settings: &Settings) -> Self {
        PartialSettings {
            amount: Some(settings.amount),
            tolerance: Some(settings.tolerance),
            line_width: Some(settings.line_width),
            size_min: Some(settings.size_min),
            size_max: Some(settings.size_max),
            position_x_min: Some(settings.position_x_min),
            position_x_max: Some(settings.position_x_max),
            position_y_min: Some(settings.position_y_min),
            position_y_max: Some(settings.position_y_max),
            speed_min: Some(settings.speed_min),
            speed_max: Some(settings.speed_max),
            direction_min: Some(settings.direction_min),
            direction_max: Some(settings.direction_max),
            color_min: Some(settings.color_min),
            color_max: Some(settings.color_max),
            multiplier_in: Some(settings.multiplier_in),
            multiplier_out: Some(settings.multiplier_out),
        }
    }
}

/// Completes `partial` against the defaults and ranges for a `width` x `height` surface.
///
/// Keys are resolved in a fixed order because the position ranges depend on the
/// resolved maximum size. Out of range values are clamped silently; the only
/// failure is a zero-sized surface.
pub fn resolve(partial: &PartialSettings, width: u32, height: u32) -> Result<Settings, BoundaryError> {
    let bounds = Bounds::new(width, height)?;
    let width = f64::from(bounds.width());
    let height = f64::from(bounds.height());

    let amount = resolve_key(
        "amount",
        partial.amount,
        width * height / AREA_PER_PARTICLE,
        0.0,
        MAX_SAFE_INTEGER,
    );
    let tolerance = resolve_key("tolerance", partial.tolerance, 150.0, 0.0, MAX_SAFE_INTEGER);
    let line_width = resolve_key("lineWidth", partial.line_width, 3.0, 0.0, MAX_SAFE_INTEGER);

    let size_min = resolve_key("sizeMin", partial.size_min, 2.0, 0.0, MAX_SAFE_INTEGER);
    let size_max = resolve_key("sizeMax", partial.size_max, 6.0, 0.0, MAX_SAFE_INTEGER);

    // Inverted size ranges are sampled swapped, so the larger of the two is the real maximum.
    let largest_size = size_min.max(size_max);
    let (x_low, x_high) = position_range(width, largest_size);
    let position_x_min = resolve_key("positionXMin", partial.position_x_min, x_low, x_low, x_high);
    let position_x_max = resolve_key("positionXMax", partial.position_x_max, x_high, x_low, x_high);
    let (y_low, y_high) = position_range(height, largest_size);
    let position_y_min = resolve_key("positionYMin", partial.position_y_min, y_low, y_low, y_high);
    let position_y_max = resolve_key("positionYMax", partial.position_y_max, y_high, y_low, y_high);

    let speed_min = resolve_key("speedMin", partial.speed_min, 200.0, 0.0, MAX_SAFE_INTEGER);
    let speed_max = resolve_key("speedMax", partial.speed_max, 400.0, 0.0, MAX_SAFE_INTEGER);
    let direction_min = resolve_key("directionMin", partial.direction_min, 0.0, 0.0, TAU);
    let direction_max = resolve_key("directionMax", partial.direction_max, TAU, 0.0, TAU);
    let color_min = resolve_key("colorMin", partial.color_min, 0.0, 0.0, 360.0);
    let color_max = resolve_key("colorMax", partial.color_max, 360.0, 0.0, 360.0);

    let multiplier_in = resolve_key(
        "multiplierIn",
        partial.multiplier_in,
        DEFAULT_MULTIPLIER_IN,
        MULTIPLIER_FLOOR,
        MAX_SAFE_INTEGER,
    );
    let multiplier_out = resolve_key(
        "multiplierOut",
        partial.multiplier_out,
        DEFAULT_MULTIPLIER_OUT,
        MULTIPLIER_FLOOR,
        MAX_SAFE_INTEGER,
    );

    Ok(Settings {
        amount,
        tolerance,
        line_width,
        size_min,
        size_max,
        position_x_min,
        position_x_max,
        position_y_min,
        position_y_max,
        speed_min,
        speed_max,
        direction_min,
        direction_max,
        color_min,
        color_max,
        multiplier_in,
        multiplier_out,
    })
}

/// Start positions keep a particle of `largest_size` one pixel clear of each edge.
/// On a surface too small for that, the range collapses onto its lower end.
fn position_range(extent: f64, largest_size: f64) -> (f64, f64) {
    let low = largest_size + 1.0;
    let high = extent - largest_size - 1.0;
    (low, high.max(low))
}

fn resolve_key(name: &str, value: Option<f64>, default: f64, min: f64, max: f64) -> f64 {
    let (resolved, status) = match value {
        None => (default, "unset"),
        Some(value) if value.is_nan() => (default, "unset"),
        Some(value) if value == UNSET => (default, "default"),
        Some(value) if value < min => (min, "too low"),
        Some(value) if value > max => (max, "too high"),
        Some(value) => (value, "ok"),
    };
    // Surface-derived defaults can land outside their own range.
    let resolved = if resolved < min {
        min
    } else if resolved > max {
        max
    } else {
        resolved
    };
    log::debug!("loaded setting '{name}' = {resolved}, status: {status}");
    resolved
}

/// Identifier handed out by the touch tracker
pub type TouchId = usize;

/// Angular position in radians
pub type Angle = f64;

pub type Rgb = [u8; 3];

/// Raster buffer, (height, width, channel)
pub type RgbArray = ndarray::Array3<u8>;

/// Number of touch slots reported by the knob per sample
pub const TOUCH_SLOTS: usize = 5;

use crate::tracker::DEFAULT_MATCH_THRESHOLD;

/// How a touch angle is placed on the image row
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum RenderMode {
    /// Raw sensor angle
    Normal,
    /// Angle measured in the opposite direction of rotation
    Distance,
}

impl RenderMode {
    pub fn name(&self) -> &'static str {
        match self {
            RenderMode::Normal => "normal",
            RenderMode::Distance => "distance",
        }
    }
}

#[derive(Debug, Clone)]
#[derive(clap::Parser)]
pub struct Config {
    /// Max angular distance (radians) between samples for the same touch
    #[clap(long, default_value = "0.39269908169872414")]
    pub match_threshold: f64,

    /// Raw pressure that maps to full color intensity
    #[clap(long, default_value = "2000")]
    pub pressure_full_scale: f64,

    #[clap(long, value_enum, default_value = "normal")]
    pub mode: RenderMode,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            pressure_full_scale: 2000.,
            mode: RenderMode::Normal,
        }
    }
}

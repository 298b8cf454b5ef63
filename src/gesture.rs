use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as AnyhowContext, Result};
use log::{debug, info};

use crate::config::Config;
use crate::dataset::{SensorSample, SessionTask, TaskMarker};
use crate::feature::TrackedTouch;
use crate::my_types::*;
use crate::store::Store;
use crate::tracker::TouchTracker;
use crate::visualization::*;

/// Renders every session task of a store to one image per task
pub struct GestureRenderer<'a> {
    config: &'a Config,
    output_dir: PathBuf,
}

impl<'a> GestureRenderer<'a> {
    pub fn new(config: &'a Config, output_dir: &Path) -> Self {
        GestureRenderer {
            config,
            output_dir: output_dir.to_path_buf(),
        }
    }

    /// Path of the image for a task
    pub fn image_path(&self, task: &SessionTask) -> PathBuf {
        self.output_dir.join(&task.participant_id).join(format!(
            "gesture_{}_{}.png",
            task.gesture_name(),
            self.config.mode.name()
        ))
    }

    /// Render one task. Returns the written path, or None if the task has no samples.
    pub fn process_task(&self, store: &Store, task: &SessionTask) -> Result<Option<PathBuf>> {
        let samples = store.samples(&task.id);
        if samples.is_empty() {
            debug!("session task {} has no samples", task.id);
            return Ok(None);
        }
        let markers = store.markers(&task.id);

        // ids restart at 0 for every task
        let mut tracker = TouchTracker::new(self.config.match_threshold);
        let image = render_samples(&mut tracker, &samples, &markers, self.config);

        let path = self.image_path(task);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        save_png(&image, &path)?;
        info!(
            "Saved image for participant {}, sessionTask {}, gesture {} at {}",
            task.participant_id,
            task.id,
            task.gesture_name(),
            path.display()
        );
        Ok(Some(path))
    }
}

/// Track touches through the samples of one task and paint one row per sample
pub fn render_samples(
    tracker: &mut TouchTracker,
    samples: &[&SensorSample],
    markers: &[&TaskMarker],
    config: &Config,
) -> RgbArray {
    let mut image = black_image(samples.len());
    for (row, sample) in samples.iter().enumerate() {
        let touches: Vec<TrackedTouch> = tracker.assign(&sample.touches);
        draw_touches(
            &mut image,
            row,
            &touches,
            config.mode,
            config.pressure_full_scale,
        );
        draw_motor(&mut image, row, sample.motor_angle);
        if sample.button_pressed {
            draw_button(&mut image, row);
        }
        for marker in markers.iter().filter(|m| m.timestamp == sample.timestamp) {
            draw_marker(&mut image, row, marker);
        }
    }
    image
}

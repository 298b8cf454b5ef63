use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{anyhow, bail, Context as AnyhowContext, Result};
use log::{debug, warn};
use serde::{Deserialize, Deserializer};

use crate::feature::TouchObservation;
use crate::my_types::*;

/// File holding the records inside a recording folder
pub const DATA_FILE: &str = "data.jsonl";

/// Reads the records of one recording, one JSON object per line
pub struct Dataset<R = BufReader<File>> {
    reader: R,
    line: String,
    line_number: usize,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SessionTask {
    pub id: String,
    pub participant_id: String,
    #[serde(default)]
    pub gesture: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl SessionTask {
    /// Name used for the rendered image
    pub fn gesture_name(&self) -> String {
        if let Some(gesture) = self.gesture.as_ref().filter(|g| !g.is_empty()) {
            return gesture.clone();
        }
        match &self.title {
            Some(title) if !title.is_empty() => title.to_lowercase().replace(' ', "_"),
            _ => self.id.clone(),
        }
    }
}

/// One row of sensor data
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SensorSample {
    pub id: String,
    pub session_task_id: String,
    pub timestamp: i64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub motor_angle: Option<Angle>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub button_pressed: bool,
    #[serde(default)]
    pub touches: Vec<TouchObservation>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TaskMarker {
    pub id: String,
    pub session_task_id: String,
    pub timestamp: i64,
    pub marker: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Record {
    Task(SessionTask),
    Sample(SensorSample),
    Marker(TaskMarker),
}

const RECORD_KINDS: [&str; 3] = ["task", "sample", "marker"];

impl Dataset {
    pub fn new(path: &Path) -> Result<Dataset> {
        let file_path = path.join(DATA_FILE);
        let file = File::open(&file_path)
            .with_context(|| format!("Failed to open {}", file_path.display()))?;
        debug!("reading {}", file_path.display());
        Ok(Dataset::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> Dataset<R> {
    pub fn from_reader(reader: R) -> Dataset<R> {
        Dataset {
            reader,
            line: String::new(),
            line_number: 0,
        }
    }

    pub fn next(&mut self) -> Result<Option<Record>> {
        loop {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => return Ok(None),
                Err(err) => bail!("Failed to read line {}: {}", self.line_number + 1, err),
                _ => {}
            }
            self.line_number += 1;

            let line = self.line.trim();
            if line.is_empty() {
                continue;
            }

            let value: serde_json::Value = serde_json::from_str(line).context(format!(
                "JSON deserialization failed for line {}: {}",
                self.line_number, line
            ))?;
            let object = value
                .as_object()
                .ok_or(anyhow!("JSON line {} is not a map", self.line_number))?;

            if !object.keys().any(|k| RECORD_KINDS.contains(&k.as_str())) {
                warn!("Unrecognised data format on line {}: {}", self.line_number, line);
                continue;
            }

            let record: Record = serde_json::from_value(value)
                .context(format!("Invalid record on line {}", self.line_number))?;
            if let Record::Sample(sample) = &record {
                if sample.touches.len() > TOUCH_SLOTS {
                    bail!(
                        "Sample {} on line {} has {} touches, at most {} are supported",
                        sample.id,
                        self.line_number,
                        sample.touches.len(),
                        TOUCH_SLOTS
                    );
                }
            }
            return Ok(Some(record));
        }
    }

    pub fn read_all(&mut self) -> Result<Vec<Record>> {
        let mut records = vec![];
        while let Some(record) = self.next()? {
            records.push(record);
        }
        Ok(records)
    }
}

/// Numbers and numeric strings parse, anything else is treated as missing
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Accepts booleans and the 0/1 integers of the recording app
pub fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::Number(n) => n.as_f64().map_or(false, |x| x != 0.),
        serde_json::Value::String(s) => matches!(s.trim(), "1" | "true"),
        _ => false,
    })
}

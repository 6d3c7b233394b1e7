//! SignalData: epoched or continuous multichannel recordings
//!
//! `x` is stored `[samples, channels, epochs]` in column-major order, so the
//! samples of one channel in one epoch are contiguous. Continuous data is a
//! single epoch with shape `[samples, channels]`.

use crate::error::{BspError, BspResult};
use crate::history::HistoryEntry;
use crate::signal_error;
use crate::type_check::{check_named, check_type};
use crate::value::{Array, Shape, StructArray, Value};
use tracing::warn;

/// Container for epoched biosignal data
#[derive(Debug, Clone, PartialEq)]
pub struct SignalData {
    /// Samples, `[samples, channels, epochs]`
    pub x: Array<f64>,
    /// Sampling rate in Hz
    pub fs: f64,
    /// Channel labels, one per channel
    pub clab: Vec<String>,
    /// Time of each sample in ms
    pub t: Option<Vec<f64>>,
    /// Class membership, `[classes, epochs]`
    pub y: Option<Array<f64>>,
    /// Class names, one per row of `y`
    pub class_name: Option<Vec<String>>,
    /// Processing steps applied so far
    pub history: Vec<HistoryEntry>,
}

impl SignalData {
    /// Create signal data, checking the layout against `fs` and `clab`
    pub fn new(x: Array<f64>, fs: f64, clab: Vec<String>) -> BspResult<Self> {
        if !(fs.is_finite() && fs > 0.0) {
            return Err(signal_error!("sampling rate must be positive, got {}", fs));
        }
        if x.shape().rank() > 3 {
            return Err(signal_error!(
                "data must be [samples channels epochs], got size {}",
                x.shape()
            ));
        }
        let channels = x.shape().dim(1);
        if clab.len() != channels {
            return Err(signal_error!(
                "{} channel labels for {} channels",
                clab.len(),
                channels
            ));
        }

        Ok(SignalData {
            x,
            fs,
            clab,
            t: None,
            y: None,
            class_name: None,
            history: Vec::new(),
        })
    }

    /// Continuous data from per-channel sample vectors of equal length
    pub fn continuous(channels: Vec<Vec<f64>>, fs: f64, clab: Vec<String>) -> BspResult<Self> {
        let samples = channels.first().map_or(0, Vec::len);
        if let Some(channel) = channels.iter().find(|c| c.len() != samples) {
            return Err(signal_error!(
                "channels differ in length: {} and {} samples",
                samples,
                channel.len()
            ));
        }
        let shape = Shape::new([samples, channels.len()]);
        let data = channels.into_iter().flatten().collect();
        SignalData::new(Array::new(shape, data)?, fs, clab)
    }

    /// Attach a time axis (ms), one entry per sample
    pub fn with_time(mut self, t: Vec<f64>) -> BspResult<Self> {
        if t.len() != self.samples() {
            return Err(signal_error!(
                "time axis has {} entries for {} samples",
                t.len(),
                self.samples()
            ));
        }
        self.t = Some(t);
        Ok(self)
    }

    /// Attach class labels `[classes, epochs]` and optional class names
    pub fn with_labels(mut self, y: Array<f64>, class_name: Option<Vec<String>>) -> BspResult<Self> {
        if y.shape().rank() != 2 || y.shape().dim(1) != self.epochs() {
            return Err(signal_error!(
                "labels must be [classes {}], got size {}",
                self.epochs(),
                y.shape()
            ));
        }
        if let Some(names) = &class_name {
            if names.len() != y.shape().dim(0) {
                return Err(signal_error!(
                    "{} class names for {} classes",
                    names.len(),
                    y.shape().dim(0)
                ));
            }
        }
        self.y = Some(y);
        self.class_name = class_name;
        Ok(self)
    }

    /// Time axis derived from the sampling rate, starting at 0 ms
    pub fn default_time_axis(&self) -> Vec<f64> {
        (0..self.samples())
            .map(|i| i as f64 * 1000.0 / self.fs)
            .collect()
    }

    pub fn samples(&self) -> usize {
        self.x.shape().dim(0)
    }

    pub fn channels(&self) -> usize {
        self.x.shape().dim(1)
    }

    pub fn epochs(&self) -> usize {
        self.x.shape().dim(2)
    }

    /// Samples of one channel in one epoch
    pub fn trace(&self, channel: usize, epoch: usize) -> BspResult<&[f64]> {
        let offset = self.trace_offset(channel, epoch)?;
        Ok(&self.x.data()[offset..offset + self.samples()])
    }

    pub fn trace_mut(&mut self, channel: usize, epoch: usize) -> BspResult<&mut [f64]> {
        let offset = self.trace_offset(channel, epoch)?;
        let samples = self.samples();
        Ok(&mut self.x.data_mut()[offset..offset + samples])
    }

    fn trace_offset(&self, channel: usize, epoch: usize) -> BspResult<usize> {
        if channel >= self.channels() || epoch >= self.epochs() {
            return Err(signal_error!(
                "trace ({}, {}) out of bounds for {} channels and {} epochs",
                channel,
                epoch,
                self.channels(),
                self.epochs()
            ));
        }
        Ok(self.samples() * (channel + self.channels() * epoch))
    }

    /// Re-check the layout invariants; fields are public and may have been
    /// replaced after construction
    pub fn check_layout(&self) -> BspResult<()> {
        if self.x.shape().rank() > 3 {
            return Err(signal_error!(
                "data must be [samples channels epochs], got size {}",
                self.x.shape()
            ));
        }
        if self.clab.len() != self.channels() {
            return Err(signal_error!(
                "{} channel labels for {} channels",
                self.clab.len(),
                self.channels()
            ));
        }
        if let Some(t) = &self.t {
            if t.len() != self.samples() {
                return Err(signal_error!(
                    "time axis has {} entries for {} samples",
                    t.len(),
                    self.samples()
                ));
            }
        }
        Ok(())
    }

    /// Record a processing step
    pub fn push_history(&mut self, operation: &str, parameters: serde_json::Value) {
        self.history.push(HistoryEntry::new(operation, parameters));
    }
}

impl From<&SignalData> for Value {
    fn from(dat: &SignalData) -> Self {
        let mut record = StructArray::new()
            .with("x", dat.x.clone())
            .with("fs", dat.fs)
            .with("clab", Value::text_cell(&dat.clab));
        if let Some(t) = &dat.t {
            record.set("t", Value::row(t.clone()));
        }
        if let Some(y) = &dat.y {
            record.set("y", Value::Numeric(y.clone()));
        }
        if let Some(names) = &dat.class_name {
            record.set("className", Value::text_cell(names));
        }
        if !dat.history.is_empty() {
            let entries = dat
                .history
                .iter()
                .filter_map(|entry| match serde_json::to_string(entry) {
                    Ok(text) => Some(Value::text(text)),
                    Err(e) => {
                        warn!(operation = %entry.operation, "dropping history entry: {}", e);
                        None
                    }
                })
                .collect();
            record.set("history", Value::cell_row(entries));
        }
        Value::Struct(record)
    }
}

impl TryFrom<&Value> for SignalData {
    type Error = BspError;

    fn try_from(value: &Value) -> BspResult<Self> {
        check_type(value, "!STRUCT(x fs)", "dat")?;
        let record = value
            .as_struct()
            .ok_or_else(|| signal_error!("expected a struct"))?;

        check_type(field(record, "x")?, "!DOUBLE[- -]|DOUBLE[- - -]", "dat.x")?;
        check_named(record, "fs", "!DOUBLE[1]")?;
        let x = match field(record, "x")? {
            Value::Numeric(array) => array.clone(),
            _ => return Err(signal_error!("dat.x must be numeric")),
        };
        let fs = field(record, "fs")?.as_f64().unwrap_or(f64::NAN);

        let clab = match record.get("clab") {
            Some(labels) => {
                check_type(labels, "CELL{CHAR}", "dat.clab")?;
                labels.to_text_list().unwrap_or_default()
            }
            None => (1..=x.shape().dim(1)).map(|ch| format!("Ch{}", ch)).collect(),
        };
        let mut dat = SignalData::new(x, fs, clab)?;

        if let Some(t) = record.get("t").filter(|t| !t.is_empty()) {
            check_type(t, "DOUBLE[-]", "dat.t")?;
            let t = t.as_numeric().map(|a| a.data().to_vec()).unwrap_or_default();
            dat = dat.with_time(t)?;
        }
        if let Some(y) = record.get("y").filter(|y| !y.is_empty()) {
            check_type(y, "DOUBLE[- -]|BOOL[- -]", "dat.y")?;
            let y = match y {
                Value::Numeric(array) => array.clone(),
                Value::Logical(array) => Array::new(
                    array.shape().clone(),
                    array.iter().map(|&b| if b { 1.0 } else { 0.0 }).collect(),
                )?,
                _ => return Err(signal_error!("dat.y must be numeric")),
            };
            let class_name = match record.get("className") {
                Some(names) => {
                    check_type(names, "CELL{CHAR}", "dat.className")?;
                    names.to_text_list()
                }
                None => None,
            };
            dat = dat.with_labels(y, class_name)?;
        }
        if let Some(history) = record.get("history") {
            check_type(history, "CELL{CHAR}", "dat.history")?;
            for text in history.to_text_list().unwrap_or_default() {
                let entry = serde_json::from_str(&text).map_err(|e| BspError::SerializationError {
                    reason: format!("Failed to parse history entry: {}", e),
                })?;
                dat.history.push(entry);
            }
        }
        Ok(dat)
    }
}

fn field<'a>(record: &'a StructArray, name: &str) -> BspResult<&'a Value> {
    record
        .get(name)
        .ok_or_else(|| signal_error!("missing field '{}'", name))
}

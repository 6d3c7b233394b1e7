//! Z-scoring of each channel and epoch against a reference interval

use crate::options::{set_defaults, PropSpec};
use crate::stats::{mean, sample_std};
use bsp_core::{option_error, BspResult, SignalData, Value};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

/// Options of [`proc_z_score`]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ZScoreOptions {
    /// Reference interval `[start end]` in ms; the whole epoch when unset
    pub ival: Option<[f64; 2]>,
}

impl ZScoreOptions {
    pub fn prop_specs() -> Vec<PropSpec> {
        vec![PropSpec::new("Ival", Value::empty(), "DOUBLE[2]")]
    }

    pub fn from_proplist(props: &Value) -> BspResult<Self> {
        let opt = set_defaults(props, &Self::prop_specs())?;
        let options = ZScoreOptions {
            ival: opt.interval("Ival")?,
        };
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> BspResult<()> {
        if let Some([start, end]) = self.ival {
            if !(start.is_finite() && end.is_finite()) || start > end {
                return Err(option_error!("Ival", "invalid interval [{} {}] ms", start, end));
            }
        }
        Ok(())
    }
}

/// Indices of the samples used for mean and standard deviation
fn reference_samples(dat: &SignalData, ival: Option<[f64; 2]>) -> BspResult<Vec<usize>> {
    let selected: Vec<usize> = match ival {
        None => (0..dat.samples()).collect(),
        Some([start, end]) => {
            let t = dat
                .t
                .as_ref()
                .ok_or_else(|| option_error!("Ival", "a reference interval requires a time axis"))?;
            t.iter()
                .enumerate()
                .filter(|(_, &time)| time >= start && time <= end)
                .map(|(index, _)| index)
                .collect()
        }
    };
    if selected.is_empty() {
        return Err(option_error!("Ival", "reference interval selects no samples"));
    }
    Ok(selected)
}

/// Replace every sample by `(x - mean) / std` of its channel and epoch
///
/// Mean and standard deviation come from the reference interval. A constant
/// reference leaves the data centred but unscaled.
pub fn proc_z_score(dat: &SignalData, opts: &ZScoreOptions) -> BspResult<SignalData> {
    opts.validate()?;
    dat.check_layout()?;
    let reference = reference_samples(dat, opts.ival)?;

    debug!(
        reference_samples = reference.len(),
        channels = dat.channels(),
        epochs = dat.epochs(),
        "proc_z_score"
    );

    let mut result = dat.clone();
    let mut selected = Vec::with_capacity(reference.len());
    for epoch in 0..dat.epochs() {
        for channel in 0..dat.channels() {
            let trace = result.trace_mut(channel, epoch)?;
            selected.clear();
            selected.extend(reference.iter().map(|&i| trace[i]));

            let mu = mean(&selected);
            let sigma = sample_std(&selected);
            for x in trace.iter_mut() {
                *x = if sigma > 0.0 { (*x - mu) / sigma } else { *x - mu };
            }
        }
    }

    result.push_history("proc_z_score", json!({ "ival": opts.ival }));
    Ok(result)
}

/// [`proc_z_score`] with options given as a property list
pub fn proc_z_score_with(dat: &SignalData, props: &Value) -> BspResult<SignalData> {
    proc_z_score(dat, &ZScoreOptions::from_proplist(props)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bsp_core::{proplist, Array, BspError, Shape};

    fn single_trace(samples: Vec<f64>) -> SignalData {
        let n = samples.len();
        let dat = SignalData::new(Array::column(samples), 100.0, vec!["Cz".to_string()]).unwrap();
        dat.with_time((0..n).map(|i| i as f64 * 10.0).collect()).unwrap()
    }

    #[test]
    fn test_whole_epoch_z_score() {
        let dat = single_trace(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let out = proc_z_score(&dat, &ZScoreOptions::default()).unwrap();
        let trace = out.trace(0, 0).unwrap();

        assert!(mean(trace).abs() < 1e-12);
        assert!((sample_std(trace) - 1.0).abs() < 1e-12);
        assert_eq!(out.history.last().map(|h| h.operation.as_str()), Some("proc_z_score"));
    }

    #[test]
    fn test_reference_interval() {
        // reference samples at 0 and 10 ms: values 1 and 3, mean 2, std sqrt(2)
        let dat = single_trace(vec![1.0, 3.0, 8.0]);
        let opts = ZScoreOptions { ival: Some([0.0, 10.0]) };
        let out = proc_z_score(&dat, &opts).unwrap();
        let trace = out.trace(0, 0).unwrap();
        let sigma = 2.0f64.sqrt();

        assert!((trace[0] + 1.0 / sigma).abs() < 1e-12);
        assert!((trace[1] - 1.0 / sigma).abs() < 1e-12);
        assert!((trace[2] - 6.0 / sigma).abs() < 1e-12);
    }

    #[test]
    fn test_constant_reference_is_centred() {
        let dat = single_trace(vec![2.0, 2.0, 5.0]);
        let out = proc_z_score(&dat, &ZScoreOptions { ival: Some([0.0, 10.0]) }).unwrap();
        assert_eq!(out.trace(0, 0).unwrap(), &[0.0, 0.0, 3.0]);
    }

    #[test]
    fn test_channels_and_epochs_are_independent() {
        let shape = Shape::new([3, 2, 2]);
        let data = vec![
            1.0, 2.0, 3.0, // ch0 ep0
            10.0, 20.0, 30.0, // ch1 ep0
            -1.0, 0.0, 1.0, // ch0 ep1
            5.0, 5.0, 8.0, // ch1 ep1
        ];
        let clab = vec!["C3".to_string(), "C4".to_string()];
        let dat = SignalData::new(Array::new(shape, data).unwrap(), 100.0, clab).unwrap();
        let out = proc_z_score(&dat, &ZScoreOptions::default()).unwrap();

        for epoch in 0..2 {
            for channel in 0..2 {
                let trace = out.trace(channel, epoch).unwrap();
                assert!(mean(trace).abs() < 1e-12);
                assert!((sample_std(trace) - 1.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_interval_errors() {
        let dat = single_trace(vec![1.0, 2.0, 3.0]);
        assert!(proc_z_score(&dat, &ZScoreOptions { ival: Some([100.0, 200.0]) }).is_err());
        assert!(proc_z_score(&dat, &ZScoreOptions { ival: Some([20.0, 0.0]) }).is_err());

        let mut without_time = dat.clone();
        without_time.t = None;
        assert!(proc_z_score(&without_time, &ZScoreOptions { ival: Some([0.0, 10.0]) }).is_err());
        assert!(proc_z_score(&without_time, &ZScoreOptions::default()).is_ok());
    }

    #[test]
    fn test_mismatched_time_axis_is_an_error() {
        let mut dat = single_trace(vec![1.0, 2.0, 3.0]);
        dat.t = Some(vec![0.0, 10.0, 20.0, 30.0, 40.0]);
        let result = proc_z_score(&dat, &ZScoreOptions { ival: Some([0.0, 40.0]) });
        assert!(matches!(result, Err(BspError::InvalidSignalData { .. })));

        dat.t = None;
        dat.clab.push("Pz".to_string());
        assert!(proc_z_score(&dat, &ZScoreOptions::default()).is_err());
    }

    #[test]
    fn test_property_list_entry_point() {
        let dat = single_trace(vec![1.0, 3.0, 8.0]);
        let out = proc_z_score_with(&dat, &proplist!["Ival" => vec![0.0, 10.0]]).unwrap();
        let expected = proc_z_score(&dat, &ZScoreOptions { ival: Some([0.0, 10.0]) }).unwrap();
        assert_eq!(out.x, expected.x);

        assert!(proc_z_score_with(&dat, &proplist!["Ival" => 5.0]).is_err());
        assert!(proc_z_score_with(&dat, &proplist![]).is_ok());
    }
}

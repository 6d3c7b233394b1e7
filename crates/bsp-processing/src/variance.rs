//! Variance of epoched data in consecutive time sections

use crate::options::{set_defaults, PropSpec};
use crate::stats::{sample_std, sample_variance};
use bsp_core::{option_error, Array, BspResult, Shape, SignalData, Value};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

/// Options of [`proc_variance`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VarianceOptions {
    /// Number of equally sized time sections
    pub n_sections: usize,
    /// Standard deviation instead of variance
    pub calc_std: bool,
}

impl Default for VarianceOptions {
    fn default() -> Self {
        VarianceOptions {
            n_sections: 1,
            calc_std: false,
        }
    }
}

impl VarianceOptions {
    pub fn prop_specs() -> Vec<PropSpec> {
        vec![
            PropSpec::new("nSections", 1.0, "!INT[1]"),
            PropSpec::new("CalcStd", false, "!BOOL[1]"),
        ]
    }

    /// Options from a `{nSections, n, CalcStd, flag}` property list
    pub fn from_proplist(props: &Value) -> BspResult<Self> {
        let opt = set_defaults(props, &Self::prop_specs())?;
        let options = VarianceOptions {
            n_sections: opt.usize("nSections")?,
            calc_std: opt.bool("CalcStd")?,
        };
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> BspResult<()> {
        if self.n_sections == 0 {
            return Err(option_error!("nSections", "at least one section is required"));
        }
        Ok(())
    }
}

/// Sample boundaries `round(linspace(0, samples, n + 1))`
fn section_bounds(samples: usize, n_sections: usize) -> Vec<usize> {
    (0..=n_sections)
        .map(|s| (samples as f64 * s as f64 / n_sections as f64).round() as usize)
        .collect()
}

/// Variance (or standard deviation) per section, channel and epoch
///
/// The result has `x` of size `[n_sections channels epochs]`; its time axis,
/// when present, holds the time of the last sample of each section.
pub fn proc_variance(dat: &SignalData, opts: &VarianceOptions) -> BspResult<SignalData> {
    opts.validate()?;
    dat.check_layout()?;
    let samples = dat.samples();
    if opts.n_sections > samples {
        return Err(option_error!(
            "nSections",
            "{} sections requested for {} samples",
            opts.n_sections,
            samples
        ));
    }

    debug!(
        n_sections = opts.n_sections,
        calc_std = opts.calc_std,
        channels = dat.channels(),
        epochs = dat.epochs(),
        "proc_variance"
    );

    let bounds = section_bounds(samples, opts.n_sections);
    let reduce = if opts.calc_std { sample_std::<f64> } else { sample_variance::<f64> };

    let mut data = Vec::with_capacity(opts.n_sections * dat.channels() * dat.epochs());
    for epoch in 0..dat.epochs() {
        for channel in 0..dat.channels() {
            let trace = dat.trace(channel, epoch)?;
            data.extend(bounds.windows(2).map(|w| reduce(&trace[w[0]..w[1]])));
        }
    }
    let x = Array::new(Shape::new([opts.n_sections, dat.channels(), dat.epochs()]), data)?;

    let t = dat
        .t
        .as_ref()
        .map(|t| bounds[1..].iter().map(|&end| t[end - 1]).collect());

    let mut result = SignalData {
        x,
        fs: dat.fs,
        clab: dat.clab.clone(),
        t,
        y: dat.y.clone(),
        class_name: dat.class_name.clone(),
        history: dat.history.clone(),
    };
    result.push_history(
        "proc_variance",
        json!({ "n_sections": opts.n_sections, "calc_std": opts.calc_std }),
    );
    Ok(result)
}

/// [`proc_variance`] with options given as a property list
pub fn proc_variance_with(dat: &SignalData, props: &Value) -> BspResult<SignalData> {
    proc_variance(dat, &VarianceOptions::from_proplist(props)?)
}

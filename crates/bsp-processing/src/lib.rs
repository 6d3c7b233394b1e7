//! BSP-Processing: Processing functions for epoched biosignals
//!
//! Every function checks its arguments with the type checker from
//! `bsp-core`, returns new data and records itself in the data's history.

pub mod config;
pub mod options;
pub mod stats;
pub mod variance;
pub mod z_score;

pub use config::ProcessingConfig;
pub use options::{set_defaults, Options, PropSpec};
pub use variance::{proc_variance, proc_variance_with, VarianceOptions};
pub use z_score::{proc_z_score, proc_z_score_with, ZScoreOptions};

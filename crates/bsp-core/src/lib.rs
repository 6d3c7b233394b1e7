//! BSP-Core: Foundation types for biosignal processing
//!
//! Dynamic values, the type-expression checker used to validate function
//! arguments, and the epoched signal data structure shared by the
//! processing functions.

pub mod error;
pub mod history;
mod json;
pub mod signal_data;
pub mod type_check;
pub mod value;

pub use error::{BspError, BspResult};
pub use history::HistoryEntry;
pub use signal_data::SignalData;
pub use type_check::{check_named, check_type, validate, Rejection, RejectionKind, Scope, TypeExpr, Verdict};
pub use value::{Array, FunctionHandle, Shape, StructArray, Value};

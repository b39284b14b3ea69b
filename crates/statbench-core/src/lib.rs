//! Core types for the statbench statistical computation engine
//!
//! This crate holds everything the component crates share:
//!
//! - **Errors**: one taxonomy of local, recoverable validation failures
//! - **Samples**: validated [`Sample`] and [`WeightedSample`] inputs
//! - **Dataset views**: the read-only [`DatasetView`] trait, an in-memory
//!   [`Dataset`], and the caller-owned [`Session`]
//! - **Validation**: column, weight, group and text-field checks
//! - **Outputs**: full-precision [`ResultTable`]s and renderable [`Figure`]s
//!
//! # Precision
//!
//! Engine outputs are never rounded. Display precision lives on the session
//! and is applied by presentation code to the returned tables only.
//!
//! # Example
//!
//! ```rust
//! use statbench_core::{validation, Dataset, DatasetView, Session};
//!
//! let dataset = Dataset::new()
//!     .with_optional_numeric("x", vec![Some(1.0), None, Some(3.0)])
//!     .unwrap();
//! let session = Session::with_dataset(dataset);
//!
//! let sample = validation::numeric_sample(session.working_dataset().unwrap(), "x").unwrap();
//! assert_eq!(sample.values(), &[1.0, 3.0]);
//! ```

pub mod dataset;
pub mod error;
pub mod figure;
pub mod level;
pub mod math;
pub mod sample;
pub mod session;
pub mod table;
pub mod validation;

pub use dataset::{Column, ColumnData, Dataset, DatasetView};
pub use error::{Error, Result};
pub use figure::{Annotation, BoxSummary, Figure, Histogram, HistogramBin, Layer, LineStyle};
pub use level::ConfidenceLevel;
pub use sample::{Sample, WeightedSample};
pub use session::{Session, DEFAULT_DISPLAY_PRECISION};
pub use table::{ResultTable, TableRow};

//! assetgate QA report schema.
//!
//! This crate provides the types that every pipeline stage produces and the
//! builder that aggregates them into a single [`QaReport`] with one overall
//! verdict. Reports are JSON documents written as sidecars next to the
//! submitted asset.
//!
//! # Example
//!
//! ```
//! use assetgate_report::{
//!     AssetMetadata, CheckResult, CheckStatus, ReportBuilder, OverallStatus, StageResult,
//! };
//!
//! let metadata = AssetMetadata {
//!     asset_id: "asset-0123456789abcdef0123456789abcdef".to_string(),
//!     source: "dropbox/incoming".to_string(),
//!     category: "env_prop".to_string(),
//!     submission_date: "2024-03-11".to_string(),
//!     processing_timestamp: "2024-03-11T14:02:55Z".to_string(),
//!     submitter: "artist01".to_string(),
//! };
//!
//! let mut builder = ReportBuilder::new(metadata);
//! builder.add_stage(StageResult::from_checks(
//!     "geometry",
//!     vec![CheckResult::new(
//!         "polycount_budget",
//!         CheckStatus::Pass,
//!         1200,
//!         5000,
//!         "Triangle count 1200 within budget (500, 5000)",
//!     )],
//! ));
//!
//! let report = builder.finalize();
//! assert_eq!(report.overall_status, OverallStatus::Pass);
//! ```
//!
//! # Modules
//!
//! - [`error`]: Error type for report (de)serialization and I/O
//! - [`measured`]: The dynamic measured-value/threshold payload
//! - [`report`]: Report entity types and the [`ReportBuilder`]
//! - [`status`]: Check, stage, report, and severity status vocabularies

pub mod error;
pub mod measured;
pub mod report;
pub mod status;

pub use error::ReportError;
pub use measured::Measured;
pub use report::{
    AssetMetadata, CheckResult, ExportInfo, FixAction, FixEntry, PerformanceEstimates, QaReport,
    ReportBuilder, ReviewFlag, StageResult,
};
pub use status::{CheckStatus, OverallStatus, Severity, StageStatus};

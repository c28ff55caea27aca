//! assetgate Blender bridge.
//!
//! Runs Blender headless with an extraction script that imports a submitted
//! asset and dumps the scene facts (topology, UV layers, materials, images,
//! armatures, weights) as a snapshot JSON document. All analysis happens on
//! the Rust side; this crate only manages the subprocess and the snapshot
//! envelope.
//!
//! # Example
//!
//! ```no_run
//! use assetgate_blender::{ProbeConfig, SnapshotRunner};
//! use std::path::Path;
//!
//! let config = ProbeConfig::with_script("tools/extract_snapshot.py");
//! let runner = SnapshotRunner::with_config(config);
//! let envelope = runner.probe_to_temp(Path::new("incoming/crate.glb")).unwrap();
//! println!("snapshot has {} bytes of facts", envelope.snapshot.to_string().len());
//! ```

pub mod error;
pub mod runner;

pub use error::{ProbeError, ProbeResult};
pub use runner::{ProbeConfig, SnapshotEnvelope, SnapshotRunner, DEFAULT_TIMEOUT_SECS};

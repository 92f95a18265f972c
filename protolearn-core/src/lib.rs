//! Core algorithms for distilling a classifier's prototype library from
//! labelled feature-space samples: k-d tree indexing, agglomerative
//! clustering, statistical prototype distillation, and per-class
//! prototype merging.
//!
//! See `SPEC_FULL.md` at the workspace root for the full design.

pub mod bitvec;
pub mod cluster;
pub mod config;
pub mod distill;
pub mod error;
pub mod io;
pub mod kdtree;
pub mod merge;
pub mod param;

pub use cluster::{Cluster, ClusterBuilder, ClusterForest};
pub use config::{ClusterConfig, ClusterConfigBuilder, ProtoStyle};
pub use distill::{Distribution, ProtoDistiller, ProtoShape, Prototype};
pub use error::{ClassifierError, Result};
pub use kdtree::KdIndex;
pub use merge::{ClassLibrary, GeometricProto, ProtoMerger};
pub use param::ParamDesc;

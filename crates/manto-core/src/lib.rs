//! # mantoQSAR Core Library
//!
//! A library for quantitative structure-activity relationship (QSAR) modeling of
//! biomolecules: it computes shape and electrostatic descriptors from molecular
//! surfaces and relates them to an observed biological response through
//! ensemble-validated multivariate linear models.
//!
//! ## Architectural Philosophy
//!
//! The library is organized in three layers with a strict dependency direction:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Molecule`,
//!   `Observation`, `DescriptorGroup`), dense linear algebra (`Matrix`,
//!   singular values), sphere orientation sampling, static lookup tables, and
//!   structure import.
//!
//! - **[`engine`]: The Logic Core.** The geometric projection engine (reference
//!   planes, distance-weighted kernels), per-kind descriptor aggregation with
//!   orientation search, batch orchestration with checkpointed resume, and the
//!   Enhanced-Replacement-Method regression with its model ensemble.
//!
//! - **[`workflows`]: The Public API.** Complete procedures tying the engine
//!   together: descriptor screening across all observations and ensemble model
//!   fitting with aggregate statistics.
pub mod core;
pub mod engine;
pub mod workflows;

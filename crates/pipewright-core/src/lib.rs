//! Pipewright Core Types and Definitions
//!
//! This crate provides the foundational types for the Pipewright PCF import
//! pipeline. It includes:
//!
//! - **Elements**: the in-memory element model parsed from a PCF file
//!   ([`element`] module)
//! - **Geometry**: coordinate and end-point types ([`geometry`] module)
//! - **Host**: the narrow capability interface to the target model
//!   ([`host`] module), including an in-memory implementation for tests
//!   and dry runs
//! - **Report**: the end-of-run report type ([`report`] module)

pub mod element;
pub mod geometry;
pub mod host;
pub mod report;

//! Metrics collection and export for strongbox.
//!
//! This crate provides a unified metrics interface using the `metrics` crate facade.
//! When the `prometheus` feature is enabled, metrics are exported in Prometheus format.
//! Without an installed recorder every macro call is a no-op.
//!
//! # Usage
//!
//! ```rust,ignore
//! use strongbox_metrics::{counter, crypto};
//!
//! counter!(crypto::ENCRYPTIONS_TOTAL, "cipher" => "aes-gcm").increment(1);
//! ```
//!
//! # Features
//!
//! - `prometheus`: Enable Prometheus text rendering via [`MetricsHandle::render`]

mod definitions;
mod error;
mod recorder;

pub use {
    definitions::*,
    error::{Error, Result},
    recorder::{MetricsHandle, MetricsRecorderConfig, init_metrics},
};

// Re-export metrics macros for convenience
pub use metrics::{counter, gauge, histogram};

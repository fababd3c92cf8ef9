//! LinkProbe: discover the URI routes an Android package declares and fuzz
//! them on a connected device.
//!
//! Pipeline:
//! 1. [`android::Decompiler`] decodes the package with apktool
//! 2. [`manifest::load_manifest`] builds a [`manifest::ManifestModel`]
//! 3. [`links::classify`] splits declared URIs into deep, web, and app links
//! 4. [`candidates`] turns links (or an explicit URL plus activities) into
//!    concrete URIs
//! 5. [`orchestrator::FuzzSession`] sends each one through adb under a
//!    deadline enforced by [`runner::ProcessRunner`]

pub mod android;
pub mod candidates;
pub mod config;
pub mod error;
pub mod links;
pub mod manifest;
pub mod mutate;
pub mod orchestrator;
pub mod runner;
pub mod ui;

pub use error::{LinkProbeError, Result};

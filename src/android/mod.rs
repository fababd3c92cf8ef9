//! External Android tooling: apktool for decoding packages and adb for
//! driving the device.

pub mod adb;
pub mod apktool;

pub use adb::{quote_for_device_shell, AdbBridge, VIEW_ACTION};
pub use apktool::{expect_manifest, Decompiler, OutputDir, MANIFEST_FILE};

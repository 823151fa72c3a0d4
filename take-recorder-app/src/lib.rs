//! # take-recorder-app
//!
//! Console front end for take-recorder-core.
//!
//! Provides:
//! - `CpalProvider`: `CaptureProvider` backed by cpal input streams
//! - `DeviceEnumerator`: input device listing and lookup by name
//! - `ConsoleStatusSink`: prints session and auto-mode status lines
//! - `Controller`: applies console commands to the session and scheduler

pub mod cli;
pub mod commands;
pub mod console_sink;
pub mod controller;
pub mod cpal_provider;
pub mod device_enumerator;

pub use console_sink::ConsoleStatusSink;
pub use controller::{Controller, Flow};
pub use cpal_provider::CpalProvider;
pub use device_enumerator::DeviceEnumerator;

//! Console report lines
//!
//! Stdout carries only these lines; diagnostics go through `tracing` to stderr.

use crate::monitor::ServerResult;
use crate::readings::{Channel, ProcessSample};
use chrono::{DateTime, Local};
use std::fmt::Display;

pub const START_BANNER: &str = "Starting process data simulation...";
pub const STOP_HINT: &str = "Press Ctrl+C to stop";

/// `[HH:MM:SS] Temp: ..°C, Vib: ..mm/s, Flow: ..m³/h`
pub fn sample_line(at: DateTime<Local>, sample: &ProcessSample) -> String {
    format!(
        "[{}] Temp: {}, Vib: {}, Flow: {}",
        at.format("%H:%M:%S"),
        channel_value(sample, Channel::Temperature),
        channel_value(sample, Channel::Vibration),
        channel_value(sample, Channel::Flow),
    )
}

/// `  → Processed: n, Triggers: n, Notifications: n`
pub fn result_line(result: &ServerResult) -> String {
    format!(
        "  → Processed: {}, Triggers: {}, Notifications: {}",
        result.processed, result.triggers_detected, result.es_notifications
    )
}

pub fn error_line(err: &impl Display) -> String {
    format!("Error: {}", err)
}

fn channel_value(sample: &ProcessSample, channel: Channel) -> String {
    format!(
        "{:.*}{}",
        channel.decimals() as usize,
        sample.value(channel),
        channel.unit()
    )
}

//! Synthetic process readings for the monitoring API
//!
//! Provides the simulated DCS channels:
//! - Temperature indicator `TI-101-01` (°C)
//! - Vibration indicator `VI-100-01` (mm/s)
//! - Flow indicator `FI-100-01` (m³/h)
//!
//! Each channel draws a uniform offset around a fixed baseline. The offsets are
//! wide enough to push values outside the normal operating band now and then.

use chrono::{DateTime, Local};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Simulated sensor channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Temperature,
    Vibration,
    Flow,
}

impl Channel {
    /// Channels in envelope order
    pub const ALL: [Channel; 3] = [Channel::Temperature, Channel::Vibration, Channel::Flow];

    pub fn parameter_id(self) -> &'static str {
        match self {
            Channel::Temperature => "TI-101-01",
            Channel::Vibration => "VI-100-01",
            Channel::Flow => "FI-100-01",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Channel::Temperature => "°C",
            Channel::Vibration => "mm/s",
            Channel::Flow => "m³/h",
        }
    }

    fn baseline(self) -> f64 {
        match self {
            Channel::Temperature => 45.0,
            Channel::Vibration => 1.2,
            Channel::Flow => 125.0,
        }
    }

    /// Inclusive bounds of the random offset added to the baseline
    fn offset_bounds(self) -> (f64, f64) {
        match self {
            Channel::Temperature => (-5.0, 50.0),  // 40-95 °C
            Channel::Vibration => (-0.5, 3.8),     // 0.7-5.0 mm/s
            Channel::Flow => (-110.0, 100.0),      // 15-225 m³/h
        }
    }

    /// Decimal places kept on the wire and on screen
    pub fn decimals(self) -> i32 {
        match self {
            Channel::Vibration => 2,
            Channel::Temperature | Channel::Flow => 1,
        }
    }

    /// Draw one rounded value for this channel
    pub fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> f64 {
        let (low, high) = self.offset_bounds();
        let raw = self.baseline() + rng.gen_range(low..=high);
        round_to(raw, self.decimals())
    }
}

/// Round half away from zero to the given number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Reading quality flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Quality {
    Good,
}

/// Reading origin tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Source {
    Dcs,
}

/// One sensor reading (matches the monitor API `data[]` item)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    pub parameter_id: String,
    pub timestamp: DateTime<Local>,
    pub value: f64,
    pub quality: Quality,
    pub source: Source,
}

/// Request envelope posted once per cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub data: Vec<Reading>,
}

/// The three values generated for one cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSample {
    pub temperature: f64,
    pub vibration: f64,
    pub flow: f64,
}

impl ProcessSample {
    /// Generate a fresh sample from the given random source
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let sample = ProcessSample {
            temperature: Channel::Temperature.sample(rng),
            vibration: Channel::Vibration.sample(rng),
            flow: Channel::Flow.sample(rng),
        };
        debug!("Generated sample: {:?}", sample);
        sample
    }

    pub fn value(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Temperature => self.temperature,
            Channel::Vibration => self.vibration,
            Channel::Flow => self.flow,
        }
    }
}

impl Batch {
    /// Package a sample as three GOOD/DCS readings stamped with `timestamp`
    pub fn from_sample(sample: &ProcessSample, timestamp: DateTime<Local>) -> Self {
        let data = Channel::ALL
            .iter()
            .map(|&channel| Reading {
                parameter_id: channel.parameter_id().to_string(),
                timestamp,
                value: sample.value(channel),
                quality: Quality::Good,
                source: Source::Dcs,
            })
            .collect();

        Batch { data }
    }
}

//! Conversion event reporting.
//!
//! The tree converter never logs through ambient global state directly;
//! it hands each event to the `Reporter` it was built with.

use std::path::PathBuf;
use tracing::{error, info, warn};

/// Something that happened to one filesystem entry during a conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionEvent {
    Converted {
        source: PathBuf,
        output: PathBuf,
        rows: usize,
    },
    Extracted {
        archive: PathBuf,
        directory: PathBuf,
    },
    Skipped {
        path: PathBuf,
    },
    Failed {
        path: PathBuf,
        reason: String,
    },
}

/// Receiver for conversion events
pub trait Reporter {
    fn report(&mut self, event: &ConversionEvent);
}

/// Emits every event as a `tracing` event
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&mut self, event: &ConversionEvent) {
        match event {
            ConversionEvent::Converted {
                source,
                output,
                rows,
            } => info!(
                "Converted {} -> {} ({} rows)",
                source.display(),
                output.display(),
                rows
            ),
            ConversionEvent::Extracted { archive, directory } => info!(
                "Extracted {} into {}",
                archive.display(),
                directory.display()
            ),
            ConversionEvent::Skipped { path } => warn!(
                "{} is not a text file or zipped folder, skipping",
                path.display()
            ),
            ConversionEvent::Failed { path, reason } => {
                error!("Failed to convert {}: {}", path.display(), reason)
            }
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Default, Clone)]
pub struct RecordingReporter {
    pub events: Vec<ConversionEvent>,
}

impl RecordingReporter {
    pub fn failures(&self) -> impl Iterator<Item = &ConversionEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, ConversionEvent::Failed { .. }))
    }

    pub fn skipped(&self) -> impl Iterator<Item = &ConversionEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, ConversionEvent::Skipped { .. }))
    }
}

impl Reporter for RecordingReporter {
    fn report(&mut self, event: &ConversionEvent) {
        self.events.push(event.clone());
    }
}

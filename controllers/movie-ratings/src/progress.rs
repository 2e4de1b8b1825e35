// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::loader::LoadSummary;

/// Observability hook for long loads, it never affects what gets stored
pub trait Progress {
    /// Called every `progress_every` records with the number read so far
    fn tick(&mut self, table: &'static str, records: u64);

    /// Called once a file has been fully loaded
    fn finish(&mut self, _summary: &LoadSummary) {}
}

/// Reports progress through the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl Progress for LogProgress {
    fn tick(&mut self, table: &'static str, records: u64) {
        log::info!("{}: {} records", table, records);
    }

    fn finish(&mut self, summary: &LoadSummary) {
        log::info!(
            "{}: {} records read, {} inserted, {} skipped, {} commits",
            summary.table,
            summary.read,
            summary.inserted,
            summary.skipped,
            summary.commits
        );
    }
}

/// Swallows every signal
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Progress for Silent {
    fn tick(&mut self, _table: &'static str, _records: u64) {}
}

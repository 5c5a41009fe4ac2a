//! Gameplay telemetry
//!
//! The world owns a boxed [`Telemetry`] handed to it at construction.

use crate::sim::weapons::WeaponKind;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TelemetryEvent {
    Kill,
    DamageTaken(f32),
    LevelUp(u32),
    WeaponPickup(WeaponKind),
    /// One simulated tick of `dt` seconds
    Frame(f32),
}

pub trait Telemetry: Send {
    fn record(&mut self, event: TelemetryEvent);
}

/// Discards everything
#[derive(Debug, Default)]
pub struct NoopTelemetry;

impl Telemetry for NoopTelemetry {
    fn record(&mut self, _event: TelemetryEvent) {}
}

/// Running totals for one batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryBatch {
    pub frames: u32,
    pub total_dt: f32,
    pub kills: u32,
    pub damage_taken: f32,
    pub level_ups: u32,
    pub weapon_pickups: u32,
}

impl TelemetryBatch {
    pub fn avg_dt(&self) -> f32 {
        if self.frames == 0 {
            0.0
        } else {
            self.total_dt / self.frames as f32
        }
    }
}

/// Aggregates events and logs one line every `interval_frames` frames
#[derive(Debug)]
pub struct LogTelemetry {
    interval_frames: u32,
    batch: TelemetryBatch,
    batches_flushed: u64,
}

impl LogTelemetry {
    pub fn new(interval_frames: u32) -> Self {
        Self {
            interval_frames: interval_frames.max(1),
            batch: TelemetryBatch::default(),
            batches_flushed: 0,
        }
    }

    pub fn current(&self) -> &TelemetryBatch {
        &self.batch
    }

    pub fn batches_flushed(&self) -> u64 {
        self.batches_flushed
    }

    fn flush(&mut self) {
        let b = std::mem::take(&mut self.batch);
        log::info!(
            "telemetry: frames={} avg_dt={:.5} kills={} damage={:.1} level_ups={} pickups={}",
            b.frames,
            b.avg_dt(),
            b.kills,
            b.damage_taken,
            b.level_ups,
            b.weapon_pickups
        );
        self.batches_flushed += 1;
    }
}

impl Telemetry for LogTelemetry {
    fn record(&mut self, event: TelemetryEvent) {
        match event {
            TelemetryEvent::Kill => self.batch.kills += 1,
            TelemetryEvent::DamageTaken(amount) => self.batch.damage_taken += amount,
            TelemetryEvent::LevelUp(_) => self.batch.level_ups += 1,
            TelemetryEvent::WeaponPickup(_) => self.batch.weapon_pickups += 1,
            TelemetryEvent::Frame(dt) => {
                self.batch.frames += 1;
                self.batch.total_dt += dt;
                if self.batch.frames >= self.interval_frames {
                    self.flush();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_telemetry_batches() {
        let mut t = LogTelemetry::new(3);
        t.record(TelemetryEvent::Kill);
        t.record(TelemetryEvent::DamageTaken(4.0));
        t.record(TelemetryEvent::Frame(0.5));
        t.record(TelemetryEvent::Frame(0.5));
        assert_eq!(t.current().kills, 1);
        assert_eq!(t.current().frames, 2);
        assert!((t.current().avg_dt() - 0.5).abs() < 1e-6);

        t.record(TelemetryEvent::Frame(0.5));
        assert_eq!(t.batches_flushed(), 1);
        assert_eq!(t.current(), &TelemetryBatch::default());
    }
}

//! Realtime monitor tap: transport position and voice activity snapshots
//! pushed from the audio callback, drained by the UI thread. Non-blocking
//! on both sides; if the ring fills, old frames are simply dropped.

use rtrb::{Consumer, Producer, RingBuffer};

use crate::voices::VoiceKind;

const MONITOR_QUEUE_SIZE: usize = 64;

/// One snapshot of the playing engine. Copy type, safe to push per block.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonitorFrame {
    pub position_secs: f64,
    pub loop_end_secs: f64,
    pub is_playing: bool,
    /// Sounding-note counts, indexed in [`VoiceKind::ALL`] order.
    pub active_notes: [u8; 6],
}

impl MonitorFrame {
    pub fn active(&self, kind: VoiceKind) -> u8 {
        let idx = VoiceKind::ALL.iter().position(|k| *k == kind).unwrap_or(0);
        self.active_notes[idx]
    }
}

pub struct MonitorTx {
    tx: Producer<MonitorFrame>,
}

impl MonitorTx {
    /// Push a frame; silently drops when the UI is behind.
    pub fn push(&mut self, frame: MonitorFrame) {
        let _ = self.tx.push(frame);
    }
}

pub struct MonitorRx {
    rx: Consumer<MonitorFrame>,
}

impl MonitorRx {
    /// Drain the ring and return the most recent frame, if any arrived.
    pub fn latest(&mut self) -> Option<MonitorFrame> {
        let mut latest = None;
        while let Ok(frame) = self.rx.pop() {
            latest = Some(frame);
        }
        latest
    }
}

pub fn monitor_channel() -> (MonitorTx, MonitorRx) {
    let (tx, rx) = RingBuffer::new(MONITOR_QUEUE_SIZE);
    (MonitorTx { tx }, MonitorRx { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_wins() {
        let (mut tx, mut rx) = monitor_channel();
        for i in 0..5 {
            tx.push(MonitorFrame {
                position_secs: f64::from(i),
                ..Default::default()
            });
        }
        assert_eq!(rx.latest().unwrap().position_secs, 4.0);
        assert!(rx.latest().is_none());
    }

    #[test]
    fn overflow_drops_rather_than_blocks() {
        let (mut tx, mut rx) = monitor_channel();
        for i in 0..200 {
            tx.push(MonitorFrame {
                position_secs: f64::from(i),
                ..Default::default()
            });
        }
        assert!(rx.latest().is_some());
    }
}

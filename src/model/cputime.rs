//! Cumulative CPU time across restarts of the monitored process.
//!
//! The OS reports user and system time per process, and those counters only
//! grow while the process lives. The workload exits and comes back under a new
//! pid many times during a run, so the total at time T is the sum over every
//! pid seen so far of the largest counter it reported at or before T.
//!
//! Algorithm:
//!
//!  group samples by pid, sort each group by timestamp
//!  collect the distinct timestamps of all groups, sorted ascending
//!  keep a cursor and a running maximum per pid
//!  for each timestamp T
//!     advance every cursor past the samples at or before T, updating its maximum
//!     emit (T, sum of maxima)
//!
//! This is O(N log N) for the sorts plus O(T * P) for the sweep.

use crate::logs::{ProcessSample, ScalarSample, Series};
use std::collections::BTreeMap;

struct PidTrack {
    // (timestamp, utime + stime), sorted by timestamp
    samples: Vec<(f64, f64)>,
    cursor: usize,
    max_cpu: f64,
}

/// Reconstruct `(timestamp, cumulative cpu seconds)` from raw per-process samples.
///
/// The result is sorted by timestamp, has one point per distinct timestamp, and
/// never decreases. No samples yields an empty series.
pub fn cumulative_cpu_time(samples: &[ProcessSample]) -> Series {
    let mut by_pid: BTreeMap<u32, PidTrack> = BTreeMap::new();
    for s in samples {
        by_pid
            .entry(s.pid)
            .or_insert_with(|| PidTrack {
                samples: Vec::new(),
                cursor: 0,
                max_cpu: 0.0,
            })
            .samples
            .push((s.timestamp, s.total_cpu()));
    }

    let mut timeline: Vec<f64> = Vec::with_capacity(samples.len());
    for track in by_pid.values_mut() {
        // Stable, so equal timestamps keep their order in the log.
        track.samples.sort_by(|a, b| a.0.total_cmp(&b.0));
        timeline.extend(track.samples.iter().map(|(t, _)| *t));
    }
    timeline.sort_by(f64::total_cmp);
    timeline.dedup();

    let mut out = Series::new();
    for t in timeline {
        let mut total = 0.0;
        for track in by_pid.values_mut() {
            while let Some(&(ts, cpu)) = track.samples.get(track.cursor) {
                if ts > t {
                    break;
                }
                track.max_cpu = track.max_cpu.max(cpu);
                track.cursor += 1;
            }
            total += track.max_cpu;
        }
        out.push(ScalarSample {
            timestamp: t,
            value: total,
        });
    }
    out
}

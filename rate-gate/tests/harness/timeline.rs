// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Records admission instants and checks them against a window.

use rate_gate::RateGate;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Admissions observed during a run, tagged with the caller's spawn index.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    entries: Arc<Mutex<Vec<(usize, Instant)>>>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that caller `id` was admitted now.
    pub fn record(&self, id: usize) {
        self.entries.lock().unwrap().push((id, Instant::now()));
    }

    /// All admissions ordered by instant (stable for equal instants).
    pub fn admissions(&self) -> Vec<(usize, Instant)> {
        let mut entries = self.entries.lock().unwrap().clone();
        entries.sort_by_key(|(_, at)| *at);
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Ids admitted at exactly `at`.
    pub fn admitted_at(&self, at: Instant) -> Vec<usize> {
        self.admissions()
            .into_iter()
            .filter(|(_, t)| *t == at)
            .map(|(id, _)| id)
            .collect()
    }

    /// Largest number of admissions inside any half-open interval of length `window`.
    pub fn max_in_any_window(&self, window: Duration) -> usize {
        let instants: Vec<Instant> = self.admissions().into_iter().map(|(_, t)| t).collect();
        let mut best = 0;
        let mut lo = 0;
        for hi in 0..instants.len() {
            while instants[hi] >= instants[lo] + window {
                lo += 1;
            }
            best = best.max(hi - lo + 1);
        }
        best
    }
}

/// Spawn `callers` tasks in order, each acquiring `gate` once and recording the admission.
pub fn spawn_callers(gate: &RateGate, timeline: &Timeline, callers: usize) -> Vec<JoinHandle<()>> {
    (0..callers)
        .map(|id| {
            let gate = gate.clone();
            let timeline = timeline.clone();
            tokio::spawn(async move {
                gate.acquire().await;
                timeline.record(id);
            })
        })
        .collect()
}

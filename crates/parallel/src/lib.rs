// This software is licensed under a dual license model:
//
// GNU Affero General Public License v3 (AGPLv3): You may use, modify, and
// distribute this software under the terms of the AGPLv3.
//
// Elastic License v2 (ELv2): You may also use, modify, and distribute this
// software under the Elastic License v2, which has specific restrictions.
//
// We welcome any commercial collaboration or support. For inquiries
// regarding the licenses, please contact us at:
// vectorchord-inquiry@tensorchord.ai
//
// Copyright (c) 2025 TensorChord Inc.

//! Contiguous-range fan-out and in-order fan-in.
//!
//! `[0, n)` is cut into one [`WorkRange`] per worker. Every worker runs on its
//! own thread of a pool that lives only for the duration of the call, reads
//! shared inputs immutably, and returns a private partial result. Partials
//! are combined on the calling thread in range order, so the outcome for a
//! fixed concurrency level never depends on scheduling.

use serde::{Deserialize, Serialize};
use std::num::NonZero;

pub use rayon::ThreadPoolBuildError;

/// Half-open interval `[start, end)` of row indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkRange {
    pub start: usize,
    pub end: usize,
}

impl WorkRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
    pub fn iter(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// What happens to the last `n % concurrency` items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Remainder {
    /// Every range has exactly `n / concurrency` items and the tail is not
    /// processed at all.
    #[default]
    Drop,
    /// The last range is extended to `n`.
    LastWorker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reducer {
    concurrency: NonZero<usize>,
    remainder: Remainder,
}

impl Default for Reducer {
    fn default() -> Self {
        Self::sequential()
    }
}

impl Reducer {
    pub fn new(concurrency: NonZero<usize>, remainder: Remainder) -> Self {
        Self {
            concurrency,
            remainder,
        }
    }

    /// A single range covering everything, run on the calling thread.
    pub fn sequential() -> Self {
        Self {
            concurrency: NonZero::<usize>::MIN,
            remainder: Remainder::Drop,
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency.get()
    }

    pub fn remainder(&self) -> Remainder {
        self.remainder
    }

    pub fn with_remainder(self, remainder: Remainder) -> Self {
        Self { remainder, ..self }
    }

    pub fn ranges(&self, n: usize) -> Vec<WorkRange> {
        let p = self.concurrency.get();
        if p == 1 {
            return vec![WorkRange { start: 0, end: n }];
        }
        let step = n / p;
        let mut ranges = (0..p)
            .map(|i| WorkRange {
                start: step * i,
                end: step * (i + 1),
            })
            .collect::<Vec<_>>();
        if let (Remainder::LastWorker, Some(last)) = (self.remainder, ranges.last_mut()) {
            last.end = n;
        }
        ranges
    }

    /// Number of items in `[0, n)` that some range covers.
    pub fn covered(&self, n: usize) -> usize {
        self.ranges(n).iter().map(WorkRange::len).sum()
    }

    /// Runs `f` once per range and returns the partials in range order.
    pub fn map<T, F>(&self, n: usize, f: F) -> Result<Vec<T>, ThreadPoolBuildError>
    where
        T: Send,
        F: Fn(WorkRange) -> T + Sync,
    {
        let ranges = self.ranges(n);
        if let [range] = ranges.as_slice() {
            return Ok(vec![f(*range)]);
        }
        log::trace!("splitting {n} items into {ranges:?}");
        rayon::ThreadPoolBuilder::new()
            .num_threads(ranges.len())
            .build_scoped(
                |thread| thread.run(),
                |pool| pool.broadcast(|ctx| f(ranges[ctx.index()])),
            )
    }

    /// Runs `f` once per range, then folds the partials in range order,
    /// starting from `identity`.
    pub fn reduce<T, F, C>(
        &self,
        n: usize,
        identity: T,
        f: F,
        combine: C,
    ) -> Result<T, ThreadPoolBuildError>
    where
        T: Send,
        F: Fn(WorkRange) -> T + Sync,
        C: FnMut(T, T) -> T,
    {
        Ok(self.map(n, f)?.into_iter().fold(identity, combine))
    }
}

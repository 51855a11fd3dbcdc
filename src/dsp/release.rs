//! Release Shaper
//!
//! Holds a per-bin release envelope that acts as a ceiling on the
//! "steady" part of each bin:
//! - **Attack** (transient bin): the envelope may snap down to the previous
//!   short-term average, so most of the bin's energy lands above it.
//! - **Release** (steady bin): the envelope decays by `beta` per frame.
//!
//! Both branches are floored at [`FLOOR_EPSILON`]. The gain is the share of the
//! bin at or below the envelope (residual) or above it (extract).
//!
//! ## Audio Thread Safety
//! - Envelope allocated in `new()`
//! - No allocations in `apply()`

use super::history::HistoryStore;
use super::segmenter::TransientSegmenter;
use super::utils::{ring_prev, FLOOR_EPSILON};

/// Envelope value before the first frame.
const ENVELOPE_INIT: f32 = 1.0;

pub struct ReleaseShaper {
    envelope: Vec<f32>,
}

impl ReleaseShaper {
    pub fn new(num_bins: usize) -> Self {
        Self {
            envelope: vec![ENVELOPE_INIT; num_bins],
        }
    }

    /// Advance one bin's envelope and return the new value.
    #[inline]
    pub fn step(&mut self, bin: usize, transient: bool, decay: f32, recent_average: f32) -> f32 {
        let decayed = decay * self.envelope[bin];
        let next = if transient {
            decayed.min(recent_average)
        } else {
            decayed
        };
        let next = next.max(FLOOR_EPSILON);
        self.envelope[bin] = next;
        next
    }

    /// Shape `frame` in place.
    ///
    /// Must run before the history indices advance: the attack target is the
    /// average slot preceding the current one.
    pub fn apply(
        &mut self,
        frame: &mut [f32],
        segmenter: &TransientSegmenter,
        history: &HistoryStore,
        cutoff: usize,
        decay: f32,
        extract: bool,
    ) {
        let n = self.envelope.len();
        debug_assert_eq!(frame.len(), n, "Release frame size mismatch");
        let cutoff = cutoff.min(n);

        // Transient-only output carries nothing below the cut
        if extract {
            frame[..cutoff].fill(0.0);
        }

        let prev_slot = ring_prev(history.omega_index(), history.omega_depth());
        for k in cutoff..n {
            let env = self.step(
                k,
                segmenter.is_transient(k),
                decay,
                history.average(prev_slot, k),
            );
            frame[k] *= shaping_gain(env, frame[k], extract);
        }
    }

    pub fn envelope(&self) -> &[f32] {
        &self.envelope
    }

    pub fn reset(&mut self) {
        self.envelope.fill(ENVELOPE_INIT);
    }
}

/// Gain for one bin given its envelope and magnitude.
///
/// Silent bins get a ratio of 0 rather than dividing by zero.
#[inline]
pub fn shaping_gain(envelope: f32, magnitude: f32, extract: bool) -> f32 {
    let ratio = if magnitude == 0.0 {
        0.0
    } else {
        envelope.min(magnitude) / magnitude
    };
    if extract {
        1.0 - ratio
    } else {
        ratio
    }
}

//! Fixed partition of scroll progress and the per-page slots inside it
//!
//! The phase boundaries never depend on the page count; only the page window
//! width does (`0.84 / N`).

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// End of the cover-opening phase
pub const COVER_END: f64 = 0.08;
/// Contact panel starts fading in (overlaps the tail of the page phase)
pub const CONTACT_FADE_START: f64 = 0.85;
/// Contact panel fully settled; forward scroll is clamped here
pub const CONTACT_SETTLED: f64 = 0.92;
/// Progress span shared by all pages
pub const PAGES_SPAN: f64 = CONTACT_SETTLED - COVER_END;

/// Flip starts this fraction of the content phase after the content phase ends
pub const COMPLETION_BUFFER: f64 = 0.1;

const RATIO_TOLERANCE: f64 = 1e-9;

/// Clamp any value into the normalized progress range
#[inline]
pub fn clamp_progress(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

/// Named interval of the phase map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Cover,
    Pages,
    ContactFade,
    ContactSettled,
}

impl Phase {
    /// Phase containing `p`; the contact fade wins over the page phase it overlaps
    pub fn at(p: f64) -> Self {
        let p = clamp_progress(p);
        if p < COVER_END {
            Phase::Cover
        } else if p < CONTACT_FADE_START {
            Phase::Pages
        } else if p < CONTACT_SETTLED {
            Phase::ContactFade
        } else {
            Phase::ContactSettled
        }
    }
}

/// Split of each page window between content reveal and page turn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseRatios {
    pub content: f64,
    pub flip: f64,
}

impl Default for PhaseRatios {
    fn default() -> Self {
        Self {
            content: 0.6,
            flip: 0.4,
        }
    }
}

/// Artifact dimensions measured by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BookLayout {
    pub width: f64,
    pub height: f64,
}

impl Default for BookLayout {
    fn default() -> Self {
        Self {
            width: 48.0,
            height: 20.0,
        }
    }
}

/// One page's progress window and its content/flip split
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSlot {
    pub index: usize,
    pub start: f64,
    pub window: f64,
    pub content_phase: f64,
    pub flip_phase: f64,
}

impl PageSlot {
    #[inline]
    pub fn end(&self) -> f64 {
        self.start + self.window
    }

    /// Coordinate where the page turn begins (content phase plus buffer)
    #[inline]
    pub fn flip_start(&self) -> f64 {
        self.start + self.content_phase + self.content_phase * COMPLETION_BUFFER
    }

    pub fn contains(&self, p: f64) -> bool {
        p >= self.start && p < self.end()
    }
}

/// Ordered page slots for a given page count
#[derive(Debug, Clone, PartialEq)]
pub struct PageSlots {
    slots: Vec<PageSlot>,
    window: f64,
    ratios: PhaseRatios,
}

impl PageSlots {
    /// Compute slots, failing fast on an empty book or ratios that do not fill the window
    pub fn new(page_count: usize, ratios: PhaseRatios) -> Result<Self> {
        if page_count == 0 {
            return Err(Error::InvalidPageCount(page_count));
        }

        let window = page_window(page_count);
        let content_phase = window * ratios.content;
        let flip_phase = window * ratios.flip;

        // Written so NaN ratios fail the check
        let valid = ratios.content >= 0.0
            && ratios.flip >= 0.0
            && (content_phase + flip_phase - window).abs() <= RATIO_TOLERANCE;
        if !valid {
            return Err(Error::PhaseRatio {
                content: content_phase,
                flip: flip_phase,
                window,
            });
        }

        let slots = (0..page_count)
            .map(|index| PageSlot {
                index,
                start: COVER_END + index as f64 * window,
                window,
                content_phase,
                flip_phase,
            })
            .collect();

        Ok(Self {
            slots,
            window,
            ratios,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    pub fn window(&self) -> f64 {
        self.window
    }

    pub fn ratios(&self) -> PhaseRatios {
        self.ratios
    }

    pub fn get(&self, index: usize) -> Option<&PageSlot> {
        self.slots.get(index)
    }

    /// Slot for a page index, or `PageOutOfRange`
    pub fn slot(&self, index: usize) -> Result<&PageSlot> {
        self.slots.get(index).ok_or(Error::PageOutOfRange {
            index,
            total: self.slots.len(),
        })
    }

    pub fn last(&self) -> &PageSlot {
        // Construction guarantees at least one slot
        &self.slots[self.slots.len() - 1]
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageSlot> {
        self.slots.iter()
    }
}

/// Width of one page window for `page_count` pages
#[inline]
pub fn page_window(page_count: usize) -> f64 {
    PAGES_SPAN / page_count.max(1) as f64
}

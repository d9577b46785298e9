//! Style writes produced each tick
//!
//! Hosts implement [`StyleSink`] to push state into whatever renders the
//! book (DOM, terminal, test recorder).

use serde::Serialize;

use crate::engine::FrameSample;

/// Contact panel style for one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContactStyle {
    pub opacity: f64,
    pub visible: bool,
    /// Pointer events enabled
    pub interactive: bool,
}

impl ContactStyle {
    pub const HIDDEN: Self = Self {
        opacity: 0.0,
        visible: false,
        interactive: false,
    };
}

pub trait StyleSink {
    fn apply_contact(&mut self, style: ContactStyle);

    /// One opacity per page indicator
    fn apply_indicators(&mut self, opacities: &[f64]);

    fn apply_page_index(&mut self, index: usize);

    /// Scrubbed artifact properties
    fn apply_sample(&mut self, _sample: &FrameSample) {}
}

/// Keeps the last value of every write and counts passive writes
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub contact: Option<ContactStyle>,
    pub indicators: Vec<f64>,
    pub page_index: Option<usize>,
    pub sample: Option<FrameSample>,
    /// Contact/indicator/page writes (the passive surface)
    pub passive_writes: usize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StyleSink for RecordingSink {
    fn apply_contact(&mut self, style: ContactStyle) {
        self.contact = Some(style);
        self.passive_writes += 1;
    }

    fn apply_indicators(&mut self, opacities: &[f64]) {
        self.indicators.clear();
        self.indicators.extend_from_slice(opacities);
        self.passive_writes += 1;
    }

    fn apply_page_index(&mut self, index: usize) {
        self.page_index = Some(index);
        self.passive_writes += 1;
    }

    fn apply_sample(&mut self, sample: &FrameSample) {
        self.sample = Some(sample.clone());
    }
}

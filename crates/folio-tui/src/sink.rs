use folio_core::engine::FrameSample;
use folio_core::{ContactStyle, StyleSink};

/// Keeps the last written state for the next draw
#[derive(Debug, Clone)]
pub struct TerminalSink {
    pub contact: ContactStyle,
    pub indicators: Vec<f64>,
    pub page_index: usize,
    pub sample: FrameSample,
}

impl Default for TerminalSink {
    fn default() -> Self {
        Self {
            contact: ContactStyle::HIDDEN,
            indicators: Vec::new(),
            page_index: 0,
            sample: FrameSample::default(),
        }
    }
}

impl StyleSink for TerminalSink {
    fn apply_contact(&mut self, style: ContactStyle) {
        self.contact = style;
    }

    fn apply_indicators(&mut self, opacities: &[f64]) {
        self.indicators.clear();
        self.indicators.extend_from_slice(opacities);
    }

    fn apply_page_index(&mut self, index: usize) {
        self.page_index = index;
    }

    fn apply_sample(&mut self, sample: &FrameSample) {
        self.sample.clone_from(sample);
    }
}

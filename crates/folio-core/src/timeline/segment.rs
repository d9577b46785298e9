use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::easing::{EasingType, EasingTypeExt};
use crate::engine::timing::lerp;

/// Named content slot on a page, revealed in this order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentRole {
    Badge,
    Title,
    Subtitle,
    Image,
    Body,
    Attribution,
    PageNumber,
}

impl ContentRole {
    pub const ALL: [ContentRole; 7] = [
        ContentRole::Badge,
        ContentRole::Title,
        ContentRole::Subtitle,
        ContentRole::Image,
        ContentRole::Body,
        ContentRole::Attribution,
        ContentRole::PageNumber,
    ];

    /// Start offset inside the content phase, as a fraction of it
    pub fn offset(self) -> f64 {
        match self {
            ContentRole::Badge => 0.0,
            ContentRole::Title => 0.1,
            ContentRole::Subtitle => 0.2,
            ContentRole::Image => 0.3,
            ContentRole::Body => 0.4,
            ContentRole::Attribution => 0.5,
            ContentRole::PageNumber => 0.6,
        }
    }
}

/// Typed animation target, resolved once when the timeline is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handle {
    Cover,
    /// The whole book (closing collapse)
    Artifact,
    PageFront(usize),
    /// Reverse face of a page, shown only late in the turn
    PageBack(usize),
    PageShadow(usize),
    Content(usize, ContentRole),
    Contact,
    Indicator(usize),
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handle::Cover => write!(f, "cover"),
            Handle::Artifact => write!(f, "artifact"),
            Handle::PageFront(i) => write!(f, "page[{}].front", i),
            Handle::PageBack(i) => write!(f, "page[{}].back", i),
            Handle::PageShadow(i) => write!(f, "page[{}].shadow", i),
            Handle::Content(i, role) => write!(f, "page[{}].{:?}", i, role),
            Handle::Contact => write!(f, "contact"),
            Handle::Indicator(i) => write!(f, "indicator[{}]", i),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    /// Degrees around the spine
    RotateY,
    /// Secondary corner lift in degrees
    Curl,
    Opacity,
    TranslateY,
    Scale,
    /// 0.0 hidden, 1.0 visible
    Visible,
}

/// One scheduled property animation on the progress axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSegment {
    pub target: Handle,
    pub property: Property,
    pub from: f64,
    pub to: f64,
    /// Progress coordinate where the segment begins
    pub start: f64,
    /// Progress span; zero makes the segment a step
    pub duration: f64,
    pub easing: EasingType,
}

impl TimelineSegment {
    pub fn new(target: Handle, property: Property, from: f64, to: f64) -> Self {
        Self {
            target,
            property,
            from,
            to,
            start: 0.0,
            duration: 0.0,
            easing: EasingType::Linear,
        }
    }

    pub fn at(mut self, start: f64, duration: f64) -> Self {
        self.start = start;
        self.duration = duration.max(0.0);
        self
    }

    pub fn eased(mut self, easing: EasingType) -> Self {
        self.easing = easing;
        self
    }

    /// A zero-length step that switches to `value` at `start`
    pub fn step(target: Handle, property: Property, value: f64, start: f64) -> Self {
        Self::new(target, property, value, value)
            .at(start, 0.0)
            .eased(EasingType::None)
    }

    #[inline]
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Value of the property at progress `p`, assuming this segment owns it
    pub fn value_at(&self, p: f64) -> f64 {
        if p < self.start {
            return self.from;
        }
        if self.duration <= 0.0 || p >= self.end() {
            return self.to;
        }
        let t = (p - self.start) / self.duration;
        lerp(self.from, self.to, self.easing.apply(t))
    }
}

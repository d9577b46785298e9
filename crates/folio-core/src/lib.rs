pub mod arbiter;
pub mod config;
pub mod engine;
pub mod error;
pub mod mapper;
pub mod navigation;
pub mod phase;
pub mod session;
pub mod sink;
pub mod source;
pub mod timeline;

pub use arbiter::{ModeArbiter, SessionFlags};
pub use config::{EasingType, FolioConfig, ScrollConfig};
pub use error::{Error, Result};
pub use navigation::{NavState, NavStage, NavigationHandle, NavigationOutcome, NavigationRequest};
pub use phase::{BookLayout, PageSlot, PageSlots, Phase, PhaseRatios};
pub use session::{FlipbookSession, FrameReport};
pub use sink::{ContactStyle, StyleSink};
pub use source::{PinnedRegion, ScrollBounds, ScrollProgressSource};

//! Smooth scrolling of raw user input
//!
//! Key presses become eased offset animations over the pinned region. Easing
//! and timing come from `folio_core::engine`; this module only adds the
//! animator and its config helpers.
//!
//! # Usage
//!
//! ```ignore
//! use folio_tui::scroll::{ScrollAnimator, ScrollConfig};
//!
//! let mut animator = ScrollAnimator::new(ScrollConfig::default());
//! animator.scroll_by(10.0, max_offset);
//!
//! // Once per frame
//! let offset = animator.update(dt, max_offset);
//! ```

pub mod animation;
pub mod config;

pub use animation::ScrollAnimator;
pub use config::{ScrollConfig, ScrollConfigExt};
pub use folio_core::engine::{EasingType, EasingTypeExt};

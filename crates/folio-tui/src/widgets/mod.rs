mod book;
mod contact;
mod indicators;
mod status_bar;

pub use book::{BookView, BookWidget, Turn};
pub use contact::ContactWidget;
pub use indicators::IndicatorsWidget;
pub use status_bar::StatusBarWidget;

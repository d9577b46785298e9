pub mod app;
pub mod event;
pub mod input;
pub mod region;
pub mod scroll;
pub mod sink;
pub mod theme;
pub mod widgets;

pub use app::App;
pub use region::TerminalRegion;
pub use sink::TerminalSink;
pub use theme::Theme;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid page count: {0} (at least one page is required)")]
    InvalidPageCount(usize),

    #[error("Phase ratios do not fill the page window: content {content} + flip {flip} != {window}")]
    PhaseRatio { content: f64, flip: f64, window: f64 },

    #[error("Page index {index} out of range (book has {total} pages)")]
    PageOutOfRange { index: usize, total: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

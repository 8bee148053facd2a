use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetPackerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    /// A sprite (or a geometry primitive) has a zero or unrepresentable side.
    #[error("Invalid dimension for '{key}': {width}x{height}")]
    InvalidDimension { key: String, width: u32, height: u32 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// The canvas could not hold every unit. Retried internally by the sizing search
    /// except in Manual mode and when MinMax runs out of room at its maximum size.
    #[error("Insufficient space: {placed}/{total} units fit into {width}x{height}")]
    InsufficientSpace {
        width: u32,
        height: u32,
        placed: usize,
        total: usize,
    },
    /// Automatic sizing ran past the maximum canvas. `key` names a sprite that fits in
    /// no orientation; `width x height` is the canvas the search stopped at (its lower
    /// bound when that already exceeds the maximum).
    #[error(
        "Atlas too large: {} cannot be packed within {max_width}x{max_height} (search stopped at {width}x{height})",
        culprit(.key, .required_area)
    )]
    AtlasTooLarge {
        key: Option<String>,
        width: u32,
        height: u32,
        max_width: u32,
        max_height: u32,
        required_area: u64,
    },
    /// Cooperative abort requested through a `CancelToken`.
    #[error("Packing cancelled")]
    Cancelled,
    #[error("Nothing to pack")]
    Empty,
}

impl SheetPackerError {
    /// True for `Cancelled`, which callers usually treat as a normal termination.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

fn culprit(key: &Option<String>, required_area: &u64) -> String {
    match key {
        Some(k) => format!("sprite '{}'", k),
        None => format!("{} px² of sprites", required_area),
    }
}

pub type Result<T> = std::result::Result<T, SheetPackerError>;

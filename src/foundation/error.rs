pub type ViewerResult<T> = Result<T, ViewerError>;

#[derive(thiserror::Error, Debug)]
pub enum ViewerError {
    #[error("decode error: {0}")]
    Decode(String),

    #[error("page {index} out of range (document has {count} pages)")]
    PageOutOfRange { index: i64, count: u32 },

    #[error("animation error: {0}")]
    Animation(String),

    #[error("surface error: {0}")]
    Surface(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("renderer was disposed")]
    Disposed,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ViewerError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<image::ImageError> for ViewerError {
    fn from(err: image::ImageError) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<tiff::TiffError> for ViewerError {
    fn from(err: tiff::TiffError) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

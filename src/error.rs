use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export: the diagram is empty")]
    EmptyScene,
    #[error("cannot export a {width}x{height} surface")]
    ZeroSizedSurface { width: u32, height: u32 },
    #[error("failed to parse generated SVG: {0}")]
    Svg(#[from] resvg::usvg::Error),
    #[error("failed to allocate {width}x{height} pixmap")]
    Pixmap { width: u32, height: u32 },
    #[error("failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("failed to serialize TOML settings: {0}")]
    Toml(#[from] toml::ser::Error),
    #[error("failed to serialize JSON settings: {0}")]
    Json(#[from] serde_json::Error),
}

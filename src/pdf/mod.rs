mod document;
pub mod images;
pub mod merge;
mod tree;
pub mod watermark;

#[cfg(test)]
pub(crate) mod testing;

pub use document::{PdfDocument, PdfInfo, Rotation};
pub use images::ImageSource;
pub use watermark::WatermarkStyle;

pub mod filler;
pub mod invoice;
pub mod profile_store;
pub mod tax;

pub use crate::domain::model::{Document, Paragraph, ReplacementRequest};
pub use crate::domain::ports::{
    ConfigProvider, PdfConverter, Storage, TemplateDocument, TemplateFormat,
};
pub use crate::utils::error::Result;

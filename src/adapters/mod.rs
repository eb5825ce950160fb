// Adapters layer: concrete implementations for external systems (storage, template formats, pdf).

pub mod docx;
pub mod pdf;
pub mod storage;
pub mod text;

use crate::core::TemplateFormat;
use crate::utils::error::{InvoiceError, Result};
use std::path::Path;

/// 依副檔名選擇範本格式
pub fn template_format_for(path: &Path) -> Result<Box<dyn TemplateFormat>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("docx") => Ok(Box::new(docx::DocxFormat)),
        Some("txt") => Ok(Box::new(text::TextFormat)),
        _ => Err(InvoiceError::TemplateLoadError {
            path: path.display().to_string(),
            reason: "unsupported template format (expected .docx or .txt)".to_string(),
        }),
    }
}

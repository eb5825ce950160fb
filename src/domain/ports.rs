use crate::domain::model::{Document, PlaceholderTable};
use crate::utils::error::Result;
use std::path::Path;

/// 公司資料檔的讀寫介面；檔案不存在時回傳 `None`
pub trait Storage {
    fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
}

/// 已載入的範本；段落可修改，並能寫回原格式
pub trait TemplateDocument {
    fn document(&self) -> &Document;
    fn document_mut(&mut self) -> &mut Document;
    fn save(&self, path: &Path) -> Result<()>;
}

pub trait TemplateFormat {
    fn open(&self, path: &Path) -> Result<Box<dyn TemplateDocument>>;
}

pub trait PdfConverter {
    fn convert(&self, input: &Path, output: &Path) -> Result<()>;
}

pub trait ConfigProvider {
    fn template_path(&self) -> &str;
    fn companies_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn tax_rate(&self) -> f64;
    fn placeholders(&self) -> &PlaceholderTable;
}

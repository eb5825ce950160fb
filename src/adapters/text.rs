use crate::core::{Document, TemplateDocument, TemplateFormat};
use crate::utils::error::{InvoiceError, Result};
use std::path::Path;

/// 純文字範本，每行一個段落
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFormat;

impl TemplateFormat for TextFormat {
    fn open(&self, path: &Path) -> Result<Box<dyn TemplateDocument>> {
        let content =
            std::fs::read_to_string(path).map_err(|e| InvoiceError::TemplateLoadError {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let line_ending = if content.contains("\r\n") { "\r\n" } else { "\n" };
        Ok(Box::new(TextTemplate {
            line_ending,
            trailing_newline: content.ends_with('\n'),
            document: Document::from_texts(content.lines()),
        }))
    }
}

pub struct TextTemplate {
    document: Document,
    /// 寫回時沿用範本的換行
    line_ending: &'static str,
    trailing_newline: bool,
}

impl TemplateDocument for TextTemplate {
    fn document(&self) -> &Document {
        &self.document
    }

    fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    fn save(&self, path: &Path) -> Result<()> {
        let mut content = self.document.texts().join(self.line_ending);
        if self.trailing_newline {
            content.push_str(self.line_ending);
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lines_become_paragraphs() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("template.txt");
        std::fs::write(&input, "Invoice\nTimc\n\nTotal 1.300,00\n").unwrap();

        let mut template = TextFormat.open(&input).unwrap();
        assert_eq!(
            template.document().texts(),
            vec!["Invoice", "Timc", "", "Total 1.300,00"]
        );

        template.document_mut().paragraphs[1].text = "Design".to_string();
        let output = dir.path().join("invoice.txt");
        template.save(&output).unwrap();

        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "Invoice\nDesign\n\nTotal 1.300,00\n"
        );
    }

    #[test]
    fn test_crlf_line_endings_are_kept() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("template.txt");
        std::fs::write(&input, "Invoice\r\nService: Timc\r\nTotal 1.300,00").unwrap();

        let mut template = TextFormat.open(&input).unwrap();
        assert_eq!(
            template.document().texts(),
            vec!["Invoice", "Service: Timc", "Total 1.300,00"]
        );

        template.document_mut().paragraphs[1].text = "Service: Design".to_string();
        let output = dir.path().join("invoice.txt");
        template.save(&output).unwrap();

        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "Invoice\r\nService: Design\r\nTotal 1.300,00"
        );
    }

    #[test]
    fn test_missing_template() {
        let dir = TempDir::new().unwrap();
        let err = TextFormat.open(&dir.path().join("nope.txt")).err().unwrap();
        assert!(matches!(err, InvoiceError::TemplateLoadError { .. }));
    }
}

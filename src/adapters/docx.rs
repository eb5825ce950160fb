use crate::core::{Document, TemplateDocument, TemplateFormat};
use crate::utils::error::{InvoiceError, Result};
use std::fs::File;
use std::io::{Read, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

const WORD_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const DOCUMENT_XML: &str = "word/document.xml";

#[derive(Debug, Clone, Copy, Default)]
pub struct DocxFormat;

impl TemplateFormat for DocxFormat {
    fn open(&self, path: &Path) -> Result<Box<dyn TemplateDocument>> {
        Ok(Box::new(DocxTemplate::open(path)?))
    }
}

struct PackageEntry {
    name: String,
    data: Vec<u8>,
    is_dir: bool,
}

/// `w:body` 下一個 `w:p` 在 document.xml 中的位置與可保留的格式
#[derive(Debug, Clone)]
struct ParagraphSpan {
    range: Range<usize>,
    open_tag: String,
    close_tag: String,
    prefix: String,
    properties: String,
    run_properties: String,
}

/// 已解開的 .docx；只追蹤本文段落的文字
pub struct DocxTemplate {
    entries: Vec<PackageEntry>,
    xml: String,
    spans: Vec<ParagraphSpan>,
    original: Document,
    document: Document,
}

fn load_error(path: &Path, reason: impl std::fmt::Display) -> InvoiceError {
    InvoiceError::TemplateLoadError {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

fn is_word(node: &roxmltree::Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name && node.tag_name().namespace() == Some(WORD_NS)
}

impl DocxTemplate {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| load_error(path, e))?;
        let mut archive = ZipArchive::new(file).map_err(|e| load_error(path, e))?;

        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i).map_err(|e| load_error(path, e))?;
            let mut data = Vec::new();
            file.read_to_end(&mut data).map_err(|e| load_error(path, e))?;
            entries.push(PackageEntry {
                name: file.name().to_string(),
                data,
                is_dir: file.is_dir(),
            });
        }

        let xml_bytes = entries
            .iter()
            .find(|entry| entry.name == DOCUMENT_XML)
            .map(|entry| entry.data.clone())
            .ok_or_else(|| load_error(path, format!("missing {}", DOCUMENT_XML)))?;
        let xml = String::from_utf8(xml_bytes).map_err(|e| load_error(path, e))?;

        let (spans, texts) = parse_paragraphs(&xml).map_err(|e| load_error(path, e))?;
        let original = Document::from_texts(texts);

        tracing::debug!(
            "Opened {} with {} paragraphs",
            path.display(),
            original.paragraphs.len()
        );

        Ok(Self {
            entries,
            xml,
            spans,
            document: original.clone(),
            original,
        })
    }

    /// 只重寫文字有變動的段落，其餘 XML 原樣保留
    fn render_xml(&self) -> String {
        if self.document.paragraphs.len() != self.spans.len() {
            tracing::warn!(
                "Paragraph count changed from {} to {}; extra paragraphs are ignored",
                self.spans.len(),
                self.document.paragraphs.len()
            );
        }

        let mut out = String::with_capacity(self.xml.len());
        let mut cursor = 0;
        for ((span, current), original) in self
            .spans
            .iter()
            .zip(&self.document.paragraphs)
            .zip(&self.original.paragraphs)
        {
            if current.text == original.text {
                continue;
            }
            out.push_str(&self.xml[cursor..span.range.start]);
            out.push_str(&render_paragraph(span, &current.text));
            cursor = span.range.end;
        }
        out.push_str(&self.xml[cursor..]);
        out
    }
}

impl TemplateDocument for DocxTemplate {
    fn document(&self) -> &Document {
        &self.document
    }

    fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    fn save(&self, path: &Path) -> Result<()> {
        let xml = self.render_xml();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(path)?;
        let mut writer = ZipWriter::new(file);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        for entry in &self.entries {
            if entry.is_dir {
                writer.add_directory(entry.name.as_str(), options)?;
                continue;
            }
            writer.start_file(entry.name.as_str(), options)?;
            if entry.name == DOCUMENT_XML {
                writer.write_all(xml.as_bytes())?;
            } else {
                writer.write_all(&entry.data)?;
            }
        }
        writer.finish()?;

        tracing::debug!("Wrote {}", path.display());
        Ok(())
    }
}

fn parse_paragraphs(xml: &str) -> std::result::Result<(Vec<ParagraphSpan>, Vec<String>), String> {
    let doc = roxmltree::Document::parse(xml).map_err(|e| e.to_string())?;
    let body = doc
        .descendants()
        .find(|n| is_word(n, "body"))
        .ok_or_else(|| "document has no w:body element".to_string())?;

    let mut spans = Vec::new();
    let mut texts = Vec::new();
    for p in body.children().filter(|n| is_word(n, "p")) {
        let range = p.range();
        let raw = &xml[range.clone()];

        let qname = raw[1..]
            .split(|c: char| c.is_whitespace() || c == '>' || c == '/')
            .next()
            .unwrap_or("w:p");
        let prefix = qname
            .split_once(':')
            .map(|(prefix, _)| format!("{}:", prefix))
            .unwrap_or_default();

        let open_tag = match p.first_child() {
            Some(first) => xml[range.start..first.range().start].to_string(),
            None if raw.ends_with("/>") => format!("{}>", raw.trim_end_matches("/>").trim_end()),
            None => raw[..=raw.find('>').unwrap_or(raw.len() - 1)].to_string(),
        };

        let properties = p
            .children()
            .find(|n| is_word(n, "pPr"))
            .map(|n| xml[n.range()].to_string())
            .unwrap_or_default();

        let run_properties = paragraph_runs(p)
            .next()
            .and_then(|r| r.children().find(|n| is_word(n, "rPr")))
            .map(|n| xml[n.range()].to_string())
            .unwrap_or_default();

        spans.push(ParagraphSpan {
            range,
            open_tag,
            close_tag: format!("</{}>", qname),
            prefix,
            properties,
            run_properties,
        });
        texts.push(paragraph_text(p));
    }

    Ok((spans, texts))
}

/// 段落本身的 run：直接子節點，以及直接 `w:hyperlink` 內的 run。
/// 繪圖、文字方塊等巢狀內容中的 run 不屬於此段落。
fn paragraph_runs<'a, 'input>(
    p: roxmltree::Node<'a, 'input>,
) -> impl Iterator<Item = roxmltree::Node<'a, 'input>> {
    p.children().flat_map(|child| {
        if is_word(&child, "r") {
            vec![child]
        } else if is_word(&child, "hyperlink") {
            child.children().filter(|n| is_word(n, "r")).collect()
        } else {
            Vec::new()
        }
    })
}

/// 段落文字：run 內的 `w:t`，`w:tab` 視為 `\t`，`w:br`/`w:cr` 視為 `\n`
fn paragraph_text(p: roxmltree::Node) -> String {
    let mut text = String::new();
    for run in paragraph_runs(p) {
        for child in run.children() {
            if is_word(&child, "t") {
                text.push_str(child.text().unwrap_or(""));
            } else if is_word(&child, "tab") {
                text.push('\t');
            } else if is_word(&child, "br") || is_word(&child, "cr") {
                text.push('\n');
            }
        }
    }
    text
}

/// 重建段落：保留段落屬性與第一個 run 的屬性，文字放進單一 run
fn render_paragraph(span: &ParagraphSpan, text: &str) -> String {
    let w = &span.prefix;
    let mut out = String::new();
    out.push_str(&span.open_tag);
    out.push_str(&span.properties);

    if !text.is_empty() {
        out.push_str(&format!("<{}r>", w));
        out.push_str(&span.run_properties);
        let mut segment = String::new();
        for c in text.chars() {
            match c {
                '\t' | '\n' => {
                    push_text(&mut out, w, &segment);
                    segment.clear();
                    let tag = if c == '\t' { "tab" } else { "br" };
                    out.push_str(&format!("<{}{}/>", w, tag));
                }
                _ => segment.push(c),
            }
        }
        push_text(&mut out, w, &segment);
        out.push_str(&format!("</{}r>", w));
    }

    out.push_str(&span.close_tag);
    out
}

fn push_text(out: &mut String, w: &str, segment: &str) {
    if segment.is_empty() {
        return;
    }
    out.push_str(&format!("<{}t xml:space=\"preserve\">", w));
    out.push_str(&escape_text(segment));
    out.push_str(&format!("</{}t>", w));
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Paragraph;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn body(paragraphs: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{}"><w:body>{}<w:sectPr/></w:body></w:document>"#,
            WORD_NS, paragraphs
        )
    }

    fn write_docx(dir: &TempDir, name: &str, xml: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut writer = ZipWriter::new(File::create(&path).unwrap());
        let options = SimpleFileOptions::default();
        writer.start_file("[Content_Types].xml", options).unwrap();
        writer.write_all(b"<Types/>").unwrap();
        writer.start_file(DOCUMENT_XML, options).unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap();
        path
    }

    fn read_entry(path: &Path, name: &str) -> String {
        let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_paragraph_text_joins_runs() {
        let xml = body(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>The NU</w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve"> B.V</w:t></w:r></w:p><w:p/><w:p><w:r><w:t>A</w:t><w:tab/><w:t>B &amp; C</w:t></w:r></w:p>"#,
        );
        let (spans, texts) = parse_paragraphs(&xml).unwrap();

        assert_eq!(texts, vec!["The NU B.V", "", "A\tB & C"]);
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[1].open_tag, "<w:p>");
        assert_eq!(spans[1].close_tag, "</w:p>");
    }

    #[test]
    fn test_hyperlink_runs_count_but_text_boxes_do_not() {
        let xml = body(concat!(
            r#"<w:p><w:r><w:t>See </w:t></w:r><w:hyperlink><w:r><w:t>Timc</w:t></w:r></w:hyperlink></w:p>"#,
            r#"<w:p><w:r><w:rPr><w:i/></w:rPr><w:t xml:space="preserve">Logo </w:t></w:r>"#,
            r#"<w:r><w:rPr><w:b/></w:rPr><w:drawing><w:txbxContent><w:p><w:r><w:t>Timc</w:t></w:r></w:p></w:txbxContent></w:drawing></w:r></w:p>"#,
            r#"<w:p><w:r><w:drawing><w:txbxContent><w:p><w:r><w:rPr><w:b/></w:rPr><w:t>Inner</w:t></w:r></w:p></w:txbxContent></w:drawing></w:r><w:r><w:t>Outer</w:t></w:r></w:p>"#,
        ));
        let (spans, texts) = parse_paragraphs(&xml).unwrap();

        assert_eq!(texts, vec!["See Timc", "Logo ", "Outer"]);
        assert_eq!(spans[1].run_properties, "<w:rPr><w:i/></w:rPr>");
        assert_eq!(spans[2].run_properties, "");
    }

    #[test]
    fn test_fill_leaves_text_box_paragraph_intact() {
        let dir = TempDir::new().unwrap();
        let logo = concat!(
            r#"<w:p><w:r><w:t xml:space="preserve">Logo </w:t></w:r>"#,
            r#"<w:r><w:drawing><w:txbxContent><w:p><w:r><w:t>Timc</w:t></w:r></w:p></w:txbxContent></w:drawing></w:r></w:p>"#
        );
        let xml = body(&format!(r#"{}<w:p><w:r><w:t>Service: Timc</w:t></w:r></w:p>"#, logo));
        let input = write_docx(&dir, "template.docx", &xml);

        let mut template = DocxTemplate::open(&input).unwrap();
        let mut request = crate::core::ReplacementRequest::new();
        request.push(crate::domain::model::Field::ChargingTask, "Timc", "Design");
        let changed = crate::core::filler::TemplateFiller::apply(template.document_mut(), &request);
        assert_eq!(changed, 1);

        let output = dir.path().join("invoice.docx");
        template.save(&output).unwrap();

        let saved = read_entry(&output, DOCUMENT_XML);
        assert!(saved.contains(logo));
        assert!(saved.contains("Service: Design"));
    }

    #[test]
    fn test_missing_body_is_rejected() {
        let xml = format!(r#"<w:document xmlns:w="{}"/>"#, WORD_NS);
        assert!(parse_paragraphs(&xml).is_err());
        assert!(parse_paragraphs("<w:document").is_err());
    }

    #[test]
    fn test_render_keeps_paragraph_and_run_properties() {
        let xml = body(
            r#"<w:p w:rsidR="00A1"><w:pPr><w:jc w:val="right"/></w:pPr><w:r><w:rPr><w:b/></w:rPr><w:t>Total 1.300,00</w:t></w:r></w:p>"#,
        );
        let (spans, _) = parse_paragraphs(&xml).unwrap();

        assert_eq!(
            render_paragraph(&spans[0], "Total <5>\tEUR"),
            concat!(
                r#"<w:p w:rsidR="00A1"><w:pPr><w:jc w:val="right"/></w:pPr>"#,
                r#"<w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Total &lt;5&gt;</w:t>"#,
                r#"<w:tab/><w:t xml:space="preserve">EUR</w:t></w:r></w:p>"#
            )
        );
    }

    #[test]
    fn test_save_rewrites_only_changed_paragraphs() {
        let dir = TempDir::new().unwrap();
        let untouched = r#"<w:p><w:r><w:rPr><w:i/></w:rPr><w:t>Invoice</w:t></w:r></w:p>"#;
        let xml = body(&format!(
            r#"{}<w:p><w:r><w:t>Bill to The NU B.V</w:t></w:r></w:p>"#,
            untouched
        ));
        let input = write_docx(&dir, "template.docx", &xml);

        let mut template = DocxTemplate::open(&input).unwrap();
        assert_eq!(template.document().texts(), vec!["Invoice", "Bill to The NU B.V"]);
        template.document_mut().paragraphs[1] = Paragraph::new("Bill to Acme");

        let output = dir.path().join("out/invoice.docx");
        template.save(&output).unwrap();

        let saved = read_entry(&output, DOCUMENT_XML);
        assert!(saved.contains(untouched));
        assert_eq!(read_entry(&output, "[Content_Types].xml"), "<Types/>");

        let reopened = DocxTemplate::open(&output).unwrap();
        assert_eq!(reopened.document().texts(), vec!["Invoice", "Bill to Acme"]);
    }

    #[test]
    fn test_open_errors_are_template_load_errors() {
        let dir = TempDir::new().unwrap();

        let missing = dir.path().join("missing.docx");
        assert!(matches!(
            DocxTemplate::open(&missing),
            Err(InvoiceError::TemplateLoadError { .. })
        ));

        let not_zip = dir.path().join("plain.docx");
        std::fs::write(&not_zip, "hello").unwrap();
        assert!(matches!(
            DocxTemplate::open(&not_zip),
            Err(InvoiceError::TemplateLoadError { .. })
        ));

        let path = dir.path().join("empty.docx");
        let mut writer = ZipWriter::new(File::create(&path).unwrap());
        writer.start_file("other.xml", SimpleFileOptions::default()).unwrap();
        writer.finish().unwrap();
        assert!(matches!(
            DocxTemplate::open(&path),
            Err(InvoiceError::TemplateLoadError { reason, .. }) if reason.contains(DOCUMENT_XML)
        ));
    }
}

use crate::core::PdfConverter;
use crate::utils::error::{InvoiceError, Result};
use std::path::Path;
use std::process::Command;

/// 呼叫 LibreOffice (`soffice --headless --convert-to pdf`) 轉檔
#[derive(Debug, Clone)]
pub struct SofficeConverter {
    program: String,
}

impl SofficeConverter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

fn conversion_error(message: impl Into<String>) -> InvoiceError {
    InvoiceError::ConversionError {
        message: message.into(),
    }
}

impl PdfConverter for SofficeConverter {
    fn convert(&self, input: &Path, output: &Path) -> Result<()> {
        if !input.exists() {
            return Err(conversion_error(format!(
                "input document {} does not exist",
                input.display()
            )));
        }

        let out_dir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => Path::new(".").to_path_buf(),
        };
        std::fs::create_dir_all(&out_dir)
            .map_err(|e| conversion_error(format!("cannot create {}: {}", out_dir.display(), e)))?;

        tracing::debug!(
            "Running {} to convert {} into {}",
            self.program,
            input.display(),
            out_dir.display()
        );
        let result = Command::new(&self.program)
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(&out_dir)
            .arg(input)
            .output()
            .map_err(|e| conversion_error(format!("failed to start '{}': {}", self.program, e)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(conversion_error(format!(
                "'{}' exited with {}: {}",
                self.program,
                result.status,
                stderr.trim()
            )));
        }

        // 轉檔器以輸入檔名命名輸出
        let stem = input
            .file_stem()
            .ok_or_else(|| conversion_error("input document has no file name"))?;
        let produced = out_dir.join(format!("{}.pdf", stem.to_string_lossy()));
        if !produced.exists() {
            return Err(conversion_error(format!(
                "'{}' did not produce {}",
                self.program,
                produced.display()
            )));
        }

        if produced != output {
            std::fs::rename(&produced, output).map_err(|e| {
                conversion_error(format!("cannot move PDF to {}: {}", output.display(), e))
            })?;
        }

        Ok(())
    }
}

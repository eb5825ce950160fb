#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::domain::model::PlaceholderTable;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use toml_config::TomlConfig;

pub const DEFAULT_TEMPLATE_PATH: &str = "template.docx";
pub const DEFAULT_COMPANIES_PATH: &str = "companies.json";
pub const DEFAULT_OUTPUT_PATH: &str = "invoice.docx";
pub const DEFAULT_TAX_RATE: f64 = 0.095;
pub const DEFAULT_PDF_CONVERTER: &str = "soffice";

/// 合併設定檔與命令列之後的最終設定
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub template_path: String,
    pub companies_path: String,
    pub output_path: String,
    pub tax_rate: f64,
    pub pdf_converter: String,
    pub placeholders: PlaceholderTable,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            template_path: DEFAULT_TEMPLATE_PATH.to_string(),
            companies_path: DEFAULT_COMPANIES_PATH.to_string(),
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            tax_rate: DEFAULT_TAX_RATE,
            pdf_converter: DEFAULT_PDF_CONVERTER.to_string(),
            placeholders: PlaceholderTable::default(),
        }
    }
}

impl AppConfig {
    pub fn from_toml(file: &TomlConfig) -> Result<Self> {
        file.validate()?;

        let mut config = AppConfig::default();
        if let Some(template) = &file.paths.template {
            config.template_path = template.clone();
        }
        if let Some(companies) = &file.paths.companies {
            config.companies_path = companies.clone();
        }
        if let Some(output) = &file.paths.output {
            config.output_path = output.clone();
        }
        if let Some(rate) = file.tax.rate {
            config.tax_rate = rate;
        }
        if let Some(converter) = &file.pdf.converter {
            config.pdf_converter = converter.clone();
        }
        for (field, text) in file.placeholder_overrides()? {
            config.placeholders.set(field, text);
        }

        Ok(config)
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("template", &self.template_path)?;
        validation::validate_file_extension("template", &self.template_path, &["docx", "txt"])?;
        validation::validate_path("companies", &self.companies_path)?;
        validation::validate_path("output", &self.output_path)?;
        validation::validate_range("tax.rate", self.tax_rate, 0.0, 1.0)?;
        validation::validate_non_empty_string("pdf.converter", &self.pdf_converter)?;
        Ok(())
    }
}

impl ConfigProvider for AppConfig {
    fn template_path(&self) -> &str {
        &self.template_path
    }

    fn companies_path(&self) -> &str {
        &self.companies_path
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn tax_rate(&self) -> f64 {
        self.tax_rate
    }

    fn placeholders(&self) -> &PlaceholderTable {
        &self.placeholders
    }
}

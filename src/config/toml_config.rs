use crate::domain::model::Field;
use crate::utils::error::{InvoiceError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "invoice-maker.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub tax: TaxConfig,
    #[serde(default)]
    pub pdf: PdfConfig,
    /// 以欄位名稱（如 "Company Name"）為鍵的佔位文字覆寫
    #[serde(default)]
    pub placeholders: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    pub template: Option<String>,
    pub companies: Option<String>,
    pub output: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaxConfig {
    pub rate: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PdfConfig {
    pub converter: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(InvoiceError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 預設設定檔存在時才載入
    pub fn from_default_location() -> Result<Option<Self>> {
        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            tracing::debug!("Loading configuration from {}", DEFAULT_CONFIG_FILE);
            Self::from_file(DEFAULT_CONFIG_FILE).map(Some)
        } else {
            Ok(None)
        }
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| InvoiceError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${INVOICE_DIR})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| InvoiceError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 將 `[placeholders]` 的鍵轉成欄位
    pub fn placeholder_overrides(&self) -> Result<Vec<(Field, String)>> {
        self.placeholders
            .iter()
            .map(|(label, text)| {
                let field = label
                    .parse::<Field>()
                    .map_err(|reason| InvoiceError::InvalidConfigValueError {
                        field: "placeholders".to_string(),
                        value: label.clone(),
                        reason,
                    })?;
                Ok((field, text.clone()))
            })
            .collect()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        if let Some(template) = &self.paths.template {
            validation::validate_path("paths.template", template)?;
            validation::validate_file_extension("paths.template", template, &["docx", "txt"])?;
        }
        if let Some(companies) = &self.paths.companies {
            validation::validate_path("paths.companies", companies)?;
        }
        if let Some(output) = &self.paths.output {
            validation::validate_path("paths.output", output)?;
        }
        if let Some(rate) = self.tax.rate {
            validation::validate_range("tax.rate", rate, 0.0, 1.0)?;
        }
        if let Some(converter) = &self.pdf.converter {
            validation::validate_non_empty_string("pdf.converter", converter)?;
        }

        for (field, text) in self.placeholder_overrides()? {
            validation::validate_non_empty_string(&format!("placeholders.{}", field), &text)?;
        }

        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[paths]
template = "templates/invoice.docx"
companies = "data/companies.json"
output = "out/invoice.docx"

[tax]
rate = 0.22

[pdf]
converter = "libreoffice"

[placeholders]
"Company Name" = "{{company}}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.paths.template.as_deref(), Some("templates/invoice.docx"));
        assert_eq!(config.tax.rate, Some(0.22));
        assert_eq!(config.pdf.converter.as_deref(), Some("libreoffice"));
        assert_eq!(
            config.placeholder_overrides().unwrap(),
            vec![(Field::CompanyName, "{{company}}".to_string())]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_is_valid() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert!(config.paths.template.is_none());
        assert!(config.placeholders.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("INVOICE_MAKER_TEST_DIR", "/srv/invoices");

        let toml_content = r#"
[paths]
output = "${INVOICE_MAKER_TEST_DIR}/invoice.docx"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.paths.output.as_deref(), Some("/srv/invoices/invoice.docx"));

        std::env::remove_var("INVOICE_MAKER_TEST_DIR");
    }

    #[test]
    fn test_config_validation() {
        let bad_rate = TomlConfig::from_toml_str("[tax]\nrate = 9.5\n").unwrap();
        assert!(bad_rate.validate().is_err());

        let bad_template = TomlConfig::from_toml_str("[paths]\ntemplate = \"invoice.pdf\"\n").unwrap();
        assert!(bad_template.validate().is_err());

        let bad_label = TomlConfig::from_toml_str("[placeholders]\nTotal = \"x\"\n").unwrap();
        assert!(bad_label.validate().is_err());

        let blank_placeholder =
            TomlConfig::from_toml_str("[placeholders]\nAmount = \"  \"\n").unwrap();
        assert!(blank_placeholder.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[paths\ntemplate = 1").unwrap_err();
        assert!(matches!(err, InvoiceError::ConfigError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[paths]\ncompanies = \"clients.json\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.paths.companies.as_deref(), Some("clients.json"));
    }
}

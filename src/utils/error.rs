use thiserror::Error;

#[derive(Error, Debug)]
pub enum InvoiceError {
    #[error("Template could not be loaded from {path}: {reason}")]
    TemplateLoadError { path: String, reason: String },

    #[error("Invalid amount '{amount}': {reason}")]
    InvalidAmountError { amount: String, reason: String },

    #[error("Company store {path} is corrupt: {reason}")]
    StoreCorruptError { path: String, reason: String },

    #[error("PDF conversion failed: {message}")]
    ConversionError { message: String },

    #[error("Company not found: {name}")]
    NotFoundError { name: String },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Template,
    Amount,
    Store,
    Conversion,
    Lookup,
    System,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// 已在本地恢復，流程繼續
    Low,
    Medium,
    High,
    Critical,
}

impl InvoiceError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            InvoiceError::TemplateLoadError { .. } => ErrorCategory::Template,
            InvoiceError::InvalidAmountError { .. } => ErrorCategory::Amount,
            InvoiceError::StoreCorruptError { .. } => ErrorCategory::Store,
            InvoiceError::ConversionError { .. } => ErrorCategory::Conversion,
            InvoiceError::NotFoundError { .. } => ErrorCategory::Lookup,
            InvoiceError::ZipError(_)
            | InvoiceError::IoError(_)
            | InvoiceError::SerializationError(_) => ErrorCategory::System,
            InvoiceError::ConfigError { .. }
            | InvoiceError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Amount | ErrorCategory::Store => ErrorSeverity::Low,
            ErrorCategory::Conversion | ErrorCategory::Lookup => ErrorSeverity::Medium,
            ErrorCategory::Template | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            InvoiceError::TemplateLoadError { path, .. } => {
                format!("The invoice template '{}' could not be opened", path)
            }
            InvoiceError::InvalidAmountError { amount, .. } => {
                format!(
                    "Invalid amount format '{}'. Please enter a valid numeric amount",
                    amount
                )
            }
            InvoiceError::StoreCorruptError { path, .. } => {
                format!("Saved companies in '{}' could not be read", path)
            }
            InvoiceError::ConversionError { .. } => {
                "Error saving the document as PDF".to_string()
            }
            InvoiceError::NotFoundError { name } => {
                format!("No saved company named '{}'", name)
            }
            InvoiceError::ConfigError { .. }
            | InvoiceError::InvalidConfigValueError { .. } => {
                format!("Configuration problem: {}", self)
            }
            _ => format!("Unexpected error: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            InvoiceError::TemplateLoadError { .. } => {
                "Check that the template path points to a valid .docx or .txt file"
            }
            InvoiceError::InvalidAmountError { .. } => {
                "Use the format 1.300,00 (dot for thousands, comma for decimals)"
            }
            InvoiceError::StoreCorruptError { .. } => {
                "The company list starts empty; fix or remove the JSON file to restore it"
            }
            InvoiceError::ConversionError { .. } => {
                "Install LibreOffice or set [pdf] converter in the config file"
            }
            InvoiceError::NotFoundError { .. } => {
                "Run `invoice-maker companies list` to see saved companies"
            }
            InvoiceError::ConfigError { .. }
            | InvoiceError::InvalidConfigValueError { .. } => {
                "Review the configuration file and command line flags"
            }
            InvoiceError::ZipError(_) => "The document archive may be damaged",
            InvoiceError::IoError(_) => "Check file permissions and free disk space",
            InvoiceError::SerializationError(_) => "Check the JSON content",
        }
    }
}

pub type Result<T> = std::result::Result<T, InvoiceError>;

use crate::core::filler::TemplateFiller;
use crate::core::profile_store::ProfileStore;
use crate::core::tax;
use crate::core::{ConfigProvider, PdfConverter, ReplacementRequest, Storage, TemplateFormat};
use crate::domain::model::{Field, ProfileUpdate};
use crate::utils::error::{InvoiceError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// 單次開立發票所需的輸入
#[derive(Debug, Clone, Default)]
pub struct InvoiceInput {
    /// 已儲存的公司；提供三個公司欄位
    pub company: Option<String>,
    /// 明確輸入的欄位值，優先於已儲存的公司資料
    pub values: BTreeMap<Field, String>,
    pub apply_tax: bool,
    /// 未指定時使用設定檔中的輸出路徑
    pub output_path: Option<PathBuf>,
    pub export_pdf: bool,
}

#[derive(Debug)]
pub enum TaxOutcome {
    NotRequested,
    /// 請求中沒有金額欄位
    NoAmount,
    Applied { gross: String, tax: String },
    /// 金額無法解析，保留原文字
    Rejected(InvoiceError),
}

#[derive(Debug)]
pub struct InvoiceReport {
    pub document_path: PathBuf,
    pub pdf_path: Option<PathBuf>,
    pub paragraphs_changed: usize,
    pub profile_saved: bool,
    pub tax: TaxOutcome,
    /// PDF 失敗不影響已輸出的文件
    pub conversion_error: Option<InvoiceError>,
}

pub struct InvoiceEngine<C: ConfigProvider, S: Storage> {
    config: C,
    store: ProfileStore<S>,
    format: Box<dyn TemplateFormat>,
    converter: Box<dyn PdfConverter>,
}

impl<C: ConfigProvider, S: Storage> InvoiceEngine<C, S> {
    pub fn new(
        config: C,
        store: ProfileStore<S>,
        format: Box<dyn TemplateFormat>,
        converter: Box<dyn PdfConverter>,
    ) -> Self {
        Self {
            config,
            store,
            format,
            converter,
        }
    }

    pub fn store(&self) -> &ProfileStore<S> {
        &self.store
    }

    /// 依欄位順序組出替換清單；沒有值的欄位不列入
    pub fn build_request(&self, input: &InvoiceInput) -> Result<ReplacementRequest> {
        let profile = input
            .company
            .as_deref()
            .map(|name| self.store.get(name))
            .transpose()?;

        let placeholders = self.config.placeholders();
        let mut request = ReplacementRequest::new();
        for field in Field::ALL {
            let value = input
                .values
                .get(&field)
                .map(String::as_str)
                .or_else(|| profile.and_then(|p| p.value(field)));

            if let Some(value) = value {
                request.push(field, placeholders.get(field), value);
            }
        }

        tracing::debug!("Built replacement request with {} fields", request.len());
        Ok(request)
    }

    /// 將金額欄位換成稅額；失敗時保留原金額並繼續
    pub fn apply_tax(&self, request: &mut ReplacementRequest, apply: bool) -> TaxOutcome {
        if !apply {
            return TaxOutcome::NotRequested;
        }

        let Some(amount) = request.get_mut(Field::Amount) else {
            tracing::warn!("⚠️ Tax requested but no amount was given");
            return TaxOutcome::NoAmount;
        };

        match tax::adjust_amount(&amount.replacement, true, self.config.tax_rate()) {
            Ok(tax) => {
                tracing::info!("💶 Tax applied: {} -> {}", amount.replacement, tax);
                let gross = std::mem::replace(&mut amount.replacement, tax.clone());
                TaxOutcome::Applied { gross, tax }
            }
            Err(e) => {
                tracing::warn!("⚠️ {}", e);
                TaxOutcome::Rejected(e)
            }
        }
    }

    pub fn run(&mut self, input: &InvoiceInput) -> Result<InvoiceReport> {
        let mut request = self.build_request(input)?;

        let template_path = Path::new(self.config.template_path());
        tracing::info!("📄 Loading template {}", template_path.display());
        let mut template = self.format.open(template_path)?;

        let tax = self.apply_tax(&mut request, input.apply_tax);

        let paragraphs_changed = TemplateFiller::apply(template.document_mut(), &request);
        tracing::info!("✏️ Updated {} paragraphs", paragraphs_changed);

        let profile_saved = self.store.upsert(&ProfileUpdate::from_request(&request))?;

        let output_path = input
            .output_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.config.output_path()));
        template.save(&output_path)?;
        tracing::info!("📁 Invoice saved to {}", output_path.display());

        let mut report = InvoiceReport {
            document_path: output_path.clone(),
            pdf_path: None,
            paragraphs_changed,
            profile_saved,
            tax,
            conversion_error: None,
        };

        if input.export_pdf {
            let pdf_path = output_path.with_extension("pdf");
            match self.converter.convert(&output_path, &pdf_path) {
                Ok(()) => {
                    tracing::info!("📁 PDF saved to {}", pdf_path.display());
                    report.pdf_path = Some(pdf_path);
                }
                Err(e) => {
                    tracing::error!("❌ {}", e);
                    report.conversion_error = Some(e);
                }
            }
        }

        Ok(report)
    }
}

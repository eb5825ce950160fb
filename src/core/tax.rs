use crate::utils::error::{InvoiceError, Result};

/// 將 "1.300,00" 這類金額轉成稅額字串（只回傳稅額本身，不含原金額）
pub fn tax_amount(amount: &str, rate: f64) -> Result<String> {
    let normalized = amount.trim().replace('.', "").replace(',', ".");

    let value: f64 = normalized
        .parse()
        .map_err(|e: std::num::ParseFloatError| InvoiceError::InvalidAmountError {
            amount: amount.to_string(),
            reason: e.to_string(),
        })?;

    // "inf" / "NaN" 也能被 f64 解析
    if !value.is_finite() {
        return Err(InvoiceError::InvalidAmountError {
            amount: amount.to_string(),
            reason: "amount is not a finite number".to_string(),
        });
    }

    Ok(format!("{:.2}", value * rate))
}

/// 未勾選稅額時原樣返回
pub fn adjust_amount(amount: &str, apply_tax: bool, rate: f64) -> Result<String> {
    if !apply_tax {
        return Ok(amount.to_string());
    }
    tax_amount(amount, rate)
}

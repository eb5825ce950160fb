use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// 發票範本中可替換的欄位，順序即替換順序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    CompanyName,
    CompanyAddress,
    CompanyPostCode,
    ChargingTask,
    Amount,
    DateRange,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::CompanyName,
        Field::CompanyAddress,
        Field::CompanyPostCode,
        Field::ChargingTask,
        Field::Amount,
        Field::DateRange,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Field::CompanyName => "Company Name",
            Field::CompanyAddress => "Company Address",
            Field::CompanyPostCode => "Company Post Code",
            Field::ChargingTask => "Charging Task",
            Field::Amount => "Amount",
            Field::DateRange => "Date Range",
        }
    }

    /// 內建範本中對應欄位的原始文字
    pub fn default_placeholder(&self) -> &'static str {
        match self {
            Field::CompanyName => "The NU B.V",
            Field::CompanyAddress => "J.H Oortweg 21",
            Field::CompanyPostCode => "2333CH Leiden, Netherlands",
            Field::ChargingTask => "Timc",
            Field::Amount => "1.300,00",
            Field::DateRange => "29.11.2023-31.12.2023",
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(
            self,
            Field::CompanyName | Field::CompanyAddress | Field::CompanyPostCode
        )
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown field '{}'", s))
    }
}

/// 欄位 → 範本佔位文字 的對照表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderTable {
    entries: BTreeMap<Field, String>,
}

impl PlaceholderTable {
    pub fn get(&self, field: Field) -> &str {
        self.entries
            .get(&field)
            .map(String::as_str)
            .unwrap_or_else(|| field.default_placeholder())
    }

    pub fn set(&mut self, field: Field, placeholder: impl Into<String>) {
        self.entries.insert(field, placeholder.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> + '_ {
        Field::ALL.into_iter().map(move |field| (field, self.get(field)))
    }
}

impl Default for PlaceholderTable {
    fn default() -> Self {
        let entries = Field::ALL
            .iter()
            .map(|field| (*field, field.default_placeholder().to_string()))
            .collect();
        Self { entries }
    }
}

/// 公司資料，以 `name` 作為儲存鍵
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "Company Name", default)]
    pub name: String,
    #[serde(rename = "Company Address", default)]
    pub address: String,
    #[serde(rename = "Company Post Code", default)]
    pub post_code: String,
}

impl Profile {
    pub fn value(&self, field: Field) -> Option<&str> {
        match field {
            Field::CompanyName => Some(self.name.as_str()),
            Field::CompanyAddress => Some(self.address.as_str()),
            Field::CompanyPostCode => Some(self.post_code.as_str()),
            _ => None,
        }
    }
}

/// 部分更新；只有帶值的欄位會覆寫既有資料
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub post_code: Option<String>,
}

impl ProfileUpdate {
    pub fn from_request(request: &ReplacementRequest) -> Self {
        let mut update = ProfileUpdate::default();
        for item in request.iter() {
            let slot = match item.field {
                Field::CompanyName => &mut update.name,
                Field::CompanyAddress => &mut update.address,
                Field::CompanyPostCode => &mut update.post_code,
                _ => continue,
            };
            *slot = Some(item.replacement.clone());
        }
        update
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub field: Field,
    pub placeholder: String,
    pub replacement: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementRequest {
    items: Vec<Replacement>,
}

impl ReplacementRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        field: Field,
        placeholder: impl Into<String>,
        replacement: impl Into<String>,
    ) {
        self.items.push(Replacement {
            field,
            placeholder: placeholder.into(),
            replacement: replacement.into(),
        });
    }

    pub fn get(&self, field: Field) -> Option<&Replacement> {
        self.items.iter().find(|item| item.field == field)
    }

    pub fn get_mut(&mut self, field: Field) -> Option<&mut Replacement> {
        self.items.iter_mut().find(|item| item.field == field)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Replacement> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    pub text: String,
}

impl Paragraph {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub paragraphs: Vec<Paragraph>,
}

impl Document {
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paragraphs: texts.into_iter().map(Paragraph::new).collect(),
        }
    }

    pub fn texts(&self) -> Vec<&str> {
        self.paragraphs.iter().map(|p| p.text.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_order_and_identity() {
        let identity: Vec<Field> = Field::ALL.iter().copied().filter(Field::is_identity).collect();
        assert_eq!(
            identity,
            vec![Field::CompanyName, Field::CompanyAddress, Field::CompanyPostCode]
        );
        assert_eq!(Field::ALL[4], Field::Amount);
    }

    #[test]
    fn test_field_from_label() {
        assert_eq!("Company Post Code".parse::<Field>().unwrap(), Field::CompanyPostCode);
        assert_eq!("amount".parse::<Field>().unwrap(), Field::Amount);
        assert!("Total".parse::<Field>().is_err());
    }

    #[test]
    fn test_placeholder_table_override() {
        let mut table = PlaceholderTable::default();
        assert_eq!(table.get(Field::Amount), "1.300,00");
        table.set(Field::Amount, "{{amount}}");
        assert_eq!(table.get(Field::Amount), "{{amount}}");
        assert_eq!(table.get(Field::ChargingTask), "Timc");
    }

    #[test]
    fn test_profile_json_keys() {
        let profile = Profile {
            name: "Acme".to_string(),
            address: "1 Main St".to_string(),
            post_code: "1000".to_string(),
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["Company Name"], "Acme");
        assert_eq!(json["Company Address"], "1 Main St");
        assert_eq!(json["Company Post Code"], "1000");
    }

    #[test]
    fn test_profile_update_takes_identity_fields_only() {
        let mut request = ReplacementRequest::new();
        request.push(Field::CompanyName, "The NU B.V", "Acme");
        request.push(Field::Amount, "1.300,00", "500,00");
        request.push(Field::CompanyPostCode, "2333CH Leiden, Netherlands", "1000");

        let update = ProfileUpdate::from_request(&request);
        assert_eq!(update.name.as_deref(), Some("Acme"));
        assert_eq!(update.address, None);
        assert_eq!(update.post_code.as_deref(), Some("1000"));
    }
}

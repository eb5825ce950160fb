use crate::core::Storage;
use crate::domain::model::{Profile, ProfileUpdate};
use crate::utils::error::{InvoiceError, Result};
use std::collections::BTreeMap;

/// 公司名稱 → 公司資料；每次變更都會整份寫回儲存
pub struct ProfileStore<S: Storage> {
    storage: S,
    path: String,
    profiles: BTreeMap<String, Profile>,
}

impl<S: Storage> ProfileStore<S> {
    /// 讀取整份資料；檔案不存在或為空時回傳空集合
    pub fn load(storage: S, path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let profiles = Self::read_profiles(&storage, &path)?;

        tracing::debug!("Loaded {} companies from {}", profiles.len(), path);
        Ok(Self {
            storage,
            path,
            profiles,
        })
    }

    /// 無法讀取或資料損毀時記錄警告並以空集合啟動
    pub fn load_or_default(storage: S, path: impl Into<String>) -> Self {
        let path = path.into();
        let profiles = match Self::read_profiles(&storage, &path) {
            Ok(profiles) => profiles,
            Err(e) => {
                tracing::warn!("⚠️ {}", e);
                tracing::warn!("💡 {}", e.recovery_suggestion());
                BTreeMap::new()
            }
        };

        Self {
            storage,
            path,
            profiles,
        }
    }

    fn read_profiles(storage: &S, path: &str) -> Result<BTreeMap<String, Profile>> {
        let bytes = storage
            .read_file(path)
            .map_err(|e| InvoiceError::StoreCorruptError {
                path: path.to_string(),
                reason: e.to_string(),
            })?;

        match bytes {
            None => {
                tracing::debug!("No company store at {}, starting empty", path);
                Ok(BTreeMap::new())
            }
            Some(bytes) => Self::parse(path, &bytes),
        }
    }

    fn parse(path: &str, bytes: &[u8]) -> Result<BTreeMap<String, Profile>> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }

        let mut profiles: BTreeMap<String, Profile> =
            serde_json::from_slice(bytes).map_err(|e| InvoiceError::StoreCorruptError {
                path: path.to_string(),
                reason: e.to_string(),
            })?;

        // 每筆資料都以鍵為名稱
        for (key, profile) in profiles.iter_mut() {
            if profile.name != *key {
                if !profile.name.is_empty() {
                    tracing::warn!(
                        "⚠️ Company stored as '{}' is named '{}'; using '{}'",
                        key,
                        profile.name,
                        key
                    );
                }
                profile.name = key.clone();
            }
        }
        Ok(profiles)
    }

    /// 合併或新增一筆資料；沒有公司名稱時不做任何事。
    /// 回傳是否有寫入儲存。
    pub fn upsert(&mut self, update: &ProfileUpdate) -> Result<bool> {
        let Some(name) = update.name.as_ref() else {
            tracing::debug!("Profile update without company name skipped");
            return Ok(false);
        };

        let profile = self.profiles.entry(name.clone()).or_insert_with(|| {
            tracing::info!("➕ New company saved: {}", name);
            Profile {
                name: name.clone(),
                ..Profile::default()
            }
        });

        profile.name = name.clone();
        if let Some(address) = &update.address {
            profile.address = address.clone();
        }
        if let Some(post_code) = &update.post_code {
            profile.post_code = post_code.clone();
        }

        self.save()?;
        Ok(true)
    }

    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.profiles)?;
        self.storage.write_file(&self.path, json.as_bytes())?;
        tracing::debug!("Saved {} companies to {}", self.profiles.len(), self.path);
        Ok(())
    }

    pub fn list(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }

    pub fn get(&self, name: &str) -> Result<&Profile> {
        self.profiles
            .get(name)
            .ok_or_else(|| InvoiceError::NotFoundError {
                name: name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

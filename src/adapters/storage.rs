use crate::core::Storage;
use crate::utils::error::Result;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::rc::Rc;

#[derive(Debug, Clone, Default)]
pub struct LocalStorage {
    base_path: Option<String>,
}

impl LocalStorage {
    pub fn new() -> Self {
        Self { base_path: None }
    }

    /// 相對路徑以 `base_path` 為根
    pub fn with_base_path(base_path: impl Into<String>) -> Self {
        Self {
            base_path: Some(base_path.into()),
        }
    }

    fn resolve(&self, path: &str) -> std::path::PathBuf {
        match &self.base_path {
            Some(base) => Path::new(base).join(path),
            None => Path::new(path).to_path_buf(),
        }
    }
}

impl Storage for LocalStorage {
    fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let full_path = self.resolve(path);
        match fs::read(&full_path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);

        if let Some(parent) = full_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}

/// 記憶體中的儲存，複製後共用同一份內容
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    files: Rc<RefCell<HashMap<String, Vec<u8>>>>,
    writes: Rc<Cell<usize>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: &str, data: &[u8]) {
        self.files.borrow_mut().insert(path.to_string(), data.to_vec());
    }

    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        self.files.borrow().get(path).cloned()
    }

    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl Storage for MemoryStorage {
    fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.contents(path))
    }

    fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        self.insert(path, data);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

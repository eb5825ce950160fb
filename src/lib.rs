pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::storage::{LocalStorage, MemoryStorage};
pub use config::AppConfig;
pub use core::{
    filler::TemplateFiller,
    invoice::{InvoiceEngine, InvoiceInput, InvoiceReport, TaxOutcome},
    profile_store::ProfileStore,
};
pub use domain::model::{Field, Profile, ProfileUpdate};
pub use utils::error::{InvoiceError, Result};

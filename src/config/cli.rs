use super::AppConfig;
use crate::core::invoice::InvoiceInput;
use crate::domain::model::Field;
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "invoice-maker")]
#[command(about = "Fill an invoice template and keep a list of billed companies")]
pub struct CliConfig {
    /// Path to TOML configuration file (defaults to ./invoice-maker.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override the template path
    #[arg(long, global = true)]
    pub template: Option<String>,

    /// Override the company store path
    #[arg(long, global = true)]
    pub store: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Fill the template and export the invoice
    Fill(FillArgs),

    /// Inspect saved companies
    #[command(subcommand)]
    Companies(CompaniesCommand),

    /// Show each field with the placeholder text it replaces
    Fields,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CompaniesCommand {
    List,
    Show { name: String },
}

#[derive(Debug, Clone, Default, Args)]
pub struct FillArgs {
    /// Use the identity fields of a saved company
    #[arg(long)]
    pub company: Option<String>,

    #[arg(long)]
    pub company_name: Option<String>,

    #[arg(long)]
    pub company_address: Option<String>,

    #[arg(long)]
    pub post_code: Option<String>,

    #[arg(long)]
    pub task: Option<String>,

    /// Amount in 1.300,00 format
    #[arg(long)]
    pub amount: Option<String>,

    #[arg(long)]
    pub date_range: Option<String>,

    /// Replace the amount with its tax portion
    #[arg(long)]
    pub tax: bool,

    /// Output document path
    #[arg(short, long)]
    pub output: Option<String>,

    /// Also export a PDF next to the document
    #[arg(long)]
    pub pdf: bool,
}

impl CliConfig {
    /// 命令列覆寫設定檔
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(template) = &self.template {
            config.template_path = template.clone();
        }
        if let Some(store) = &self.store {
            config.companies_path = store.clone();
        }
        if let Command::Fill(args) = &self.command {
            if let Some(output) = &args.output {
                config.output_path = output.clone();
            }
        }
    }
}

impl FillArgs {
    pub fn to_input(&self) -> InvoiceInput {
        let values: BTreeMap<Field, String> = [
            (Field::CompanyName, &self.company_name),
            (Field::CompanyAddress, &self.company_address),
            (Field::CompanyPostCode, &self.post_code),
            (Field::ChargingTask, &self.task),
            (Field::Amount, &self.amount),
            (Field::DateRange, &self.date_range),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.clone().map(|v| (field, v)))
        .collect();

        InvoiceInput {
            company: self.company.clone(),
            values,
            apply_tax: self.tax,
            output_path: self.output.as_ref().map(PathBuf::from),
            export_pdf: self.pdf,
        }
    }
}

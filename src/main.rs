use clap::Parser;
use invoice_maker::adapters::{pdf::SofficeConverter, template_format_for};
use invoice_maker::config::cli::{CliConfig, Command, CompaniesCommand};
use invoice_maker::config::toml_config::TomlConfig;
use invoice_maker::core::ConfigProvider;
use invoice_maker::utils::error::ErrorSeverity;
use invoice_maker::utils::{logger, validation::Validate};
use invoice_maker::{
    AppConfig, Field, InvoiceEngine, LocalStorage, ProfileStore, Result, TaxOutcome,
};
use std::path::Path;

fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting invoice-maker");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(&cli) {
        tracing::error!(
            "❌ {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(exit_code(e.severity()));
    }
}

fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn load_config(cli: &CliConfig) -> Result<AppConfig> {
    let file = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            Some(TomlConfig::from_file(path)?)
        }
        None => TomlConfig::from_default_location()?,
    };

    let mut config = match file {
        Some(file) => AppConfig::from_toml(&file)?,
        None => AppConfig::default(),
    };
    cli.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

fn run(cli: &CliConfig) -> Result<()> {
    let config = load_config(cli)?;
    let store = ProfileStore::load_or_default(LocalStorage::new(), config.companies_path());

    match &cli.command {
        Command::Fields => {
            for (field, placeholder) in config.placeholders.iter() {
                println!("{:<18} {}", field.label(), placeholder);
            }
        }
        Command::Companies(CompaniesCommand::List) => {
            if store.is_empty() {
                println!("No saved companies in {}", store.path());
            }
            for name in store.list() {
                println!("{}", name);
            }
        }
        Command::Companies(CompaniesCommand::Show { name }) => {
            let profile = store.get(name)?;
            for field in Field::ALL.iter().filter(|f| f.is_identity()) {
                println!("{}: {}", field.label(), profile.value(*field).unwrap_or_default());
            }
        }
        Command::Fill(args) => {
            let input = args.to_input();
            let format = template_format_for(Path::new(&config.template_path))?;
            let converter = Box::new(SofficeConverter::new(config.pdf_converter.clone()));
            let mut engine = InvoiceEngine::new(config, store, format, converter);

            let report = engine.run(&input)?;

            match &report.tax {
                TaxOutcome::Applied { gross, tax } => {
                    println!("✅ Tax applied: {} -> {}", gross, tax);
                }
                TaxOutcome::Rejected(e) => {
                    eprintln!("⚠️ {}", e.user_friendly_message());
                }
                TaxOutcome::NoAmount => eprintln!("⚠️ Tax requested but no --amount given"),
                TaxOutcome::NotRequested => {}
            }

            println!("✅ Invoice saved to: {}", report.document_path.display());
            if let Some(pdf) = &report.pdf_path {
                println!("✅ PDF saved to: {}", pdf.display());
            }
            if let Some(e) = report.conversion_error {
                return Err(e);
            }
        }
    }

    Ok(())
}

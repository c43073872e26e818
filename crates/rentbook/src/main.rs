//! `rentbook` - CLI for the rentbook ledger
//!
//! This binary provides the command-line interface for recording apartments,
//! tenants, transactions, and documents, and for reading the dashboard.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};
use clap::Parser;
use serde::Serialize;
use tracing::{debug, warn};

use rentbook::analytics::{
    apartment_profit, expense_breakdown, monthly_rollup, sort_chronologically, summarize,
    ApartmentDirectory,
};
use rentbook::cli::{
    ApartmentCommand, Cli, Command, ConfigCommand, DashboardCommand, DocumentCommand,
    DocumentFields, OutputFormat, TenantCommand, TransactionCommand,
};
use rentbook::model::{ApartmentPatch, DocumentPatch, TenantPatch, TransactionPatch};
use rentbook::storage::{Collection, MemoryMedium, SqliteMedium, StorageMedium, Store};
use rentbook::{init_logging, Config, DocumentFile, Entity, Error, RecordId};

type CliStore = Store<Box<dyn StorageMedium>>;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
        Command::Status(status_cmd) => handle_status(&config, cli.ephemeral, status_cmd.json),
        command => {
            let store = open_store(&config, cli.ephemeral)?;
            match command {
                Command::Apartment(cmd) => handle_apartment(&store, cmd),
                Command::Tenant(cmd) => handle_tenant(&store, cmd),
                Command::Transaction(cmd) => handle_transaction(&store, cmd),
                Command::Document(cmd) => handle_document(&store, cmd),
                Command::Dashboard(cmd) => handle_dashboard(&store, &config, cmd),
                Command::Config(_) | Command::Status(_) => Ok(()),
            }
        }
    }
}

fn open_store(config: &Config, ephemeral: bool) -> anyhow::Result<CliStore> {
    let medium: Box<dyn StorageMedium> = if ephemeral {
        debug!("Using in-memory medium");
        Box::new(MemoryMedium::new())
    } else {
        Box::new(SqliteMedium::open(config.database_path())?)
    };
    Ok(Store::from_config(medium, &config.storage))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn warn_if_dangling(store: &CliStore, apartment_id: Option<&RecordId>) -> anyhow::Result<()> {
    if let Some(id) = apartment_id {
        if store.apartments().get(id.as_str())?.is_none() {
            warn!(apartment_id = %id, "no such apartment, storing the reference anyway");
        }
    }
    Ok(())
}

fn delete_record<T: Entity>(
    collection: &Collection<'_, Box<dyn StorageMedium>, T>,
    id: &str,
) -> anyhow::Result<()> {
    if !collection.delete(id)? {
        bail!(Error::not_found(T::KIND, id));
    }
    println!("Deleted {} {id}", T::KIND);
    Ok(())
}

fn handle_apartment(store: &CliStore, cmd: ApartmentCommand) -> anyhow::Result<()> {
    let apartments = store.apartments();
    match cmd {
        ApartmentCommand::List(args) => {
            let records = apartments.get_all()?;
            if args.format == OutputFormat::Json {
                return print_json(&records);
            }
            if records.is_empty() {
                println!("No apartments.");
            }
            for a in &records {
                println!(
                    "{}  {:<24} {:<32} {:>7.1} m²  {} rooms  floor {}",
                    a.id, a.name, a.address, a.size, a.rooms, a.floor
                );
                if !a.notes.is_empty() {
                    println!("           {}", a.notes);
                }
            }
        }
        ApartmentCommand::Add(fields) => {
            let record = apartments.add_checked(fields.into())?;
            println!("Added apartment {} ({})", record.id, record.name);
        }
        ApartmentCommand::Update { id, fields } => {
            let record = apartments.update_checked(&id, &ApartmentPatch::from(fields))?;
            println!("Updated apartment {} ({})", record.id, record.name);
        }
        ApartmentCommand::Delete { id } => delete_record(&apartments, &id)?,
    }
    Ok(())
}

fn handle_tenant(store: &CliStore, cmd: TenantCommand) -> anyhow::Result<()> {
    let tenants = store.tenants();
    match cmd {
        TenantCommand::List(args) => {
            let records = tenants.get_all()?;
            if args.format == OutputFormat::Json {
                return print_json(&records);
            }
            if records.is_empty() {
                println!("No tenants.");
            }
            let directory = ApartmentDirectory::new(&store.apartments().get_all()?);
            for t in &records {
                println!(
                    "{}  {:<24} {:<20} {:>10.2} {:<9}  since {}",
                    t.id,
                    t.name,
                    directory.tenant_label(t.apartment_id.as_ref()),
                    t.rent_amount,
                    t.payment_frequency,
                    t.move_in_date
                );
            }
        }
        TenantCommand::Add(fields) => {
            let tenant = fields.into_tenant(today());
            warn_if_dangling(store, tenant.apartment_id.as_ref())?;
            let record = tenants.add_checked(tenant)?;
            println!("Added tenant {} ({})", record.id, record.name);
        }
        TenantCommand::Update { id, fields } => {
            let patch = TenantPatch::from(fields);
            if let Some(Some(apartment_id)) = &patch.apartment_id {
                warn_if_dangling(store, Some(apartment_id))?;
            }
            let record = tenants.update_checked(&id, &patch)?;
            println!("Updated tenant {} ({})", record.id, record.name);
        }
        TenantCommand::Delete { id } => delete_record(&tenants, &id)?,
    }
    Ok(())
}

fn handle_transaction(store: &CliStore, cmd: TransactionCommand) -> anyhow::Result<()> {
    let transactions = store.transactions();
    match cmd {
        TransactionCommand::List { view, format } => {
            let records = view.apply(&transactions.get_all()?);
            if format == OutputFormat::Json {
                return print_json(&records);
            }
            println!("{}", view.title());
            if records.is_empty() {
                println!("No transactions.");
            }
            let directory = ApartmentDirectory::new(&store.apartments().get_all()?);
            for tx in &records {
                let sign = if tx.is_income() { '+' } else { '-' };
                println!(
                    "{}  {}  {:<14} {:<20} {sign}{:>10.2}  {}{}{}",
                    tx.id,
                    tx.date,
                    tx.category,
                    directory.transaction_label(tx.apartment_id.as_ref()),
                    tx.amount,
                    tx.description,
                    if tx.is_recurring { " [recurring]" } else { "" },
                    if tx.is_paid { "" } else { " [unpaid]" },
                );
            }
        }
        TransactionCommand::Add(fields) => {
            let view = fields.view;
            let tx = fields.into_transaction(today());
            if !view.allowed_categories().contains(&tx.category) {
                warn!(category = %tx.category, view = %view, "category is not offered by this view");
            }
            warn_if_dangling(store, tx.apartment_id.as_ref())?;
            let record = transactions.add_checked(tx)?;
            println!(
                "Recorded {} {} {:.2} on {}",
                record.kind, record.category, record.amount, record.date
            );
            println!("Id: {}", record.id);
        }
        TransactionCommand::Update { id, fields } => {
            let patch = TransactionPatch::from(fields);
            if let Some(Some(apartment_id)) = &patch.apartment_id {
                warn_if_dangling(store, Some(apartment_id))?;
            }
            let record = transactions.update_checked(&id, &patch)?;
            println!("Updated transaction {}", record.id);
        }
        TransactionCommand::Delete { id } => delete_record(&transactions, &id)?,
        TransactionCommand::Categories { view } => {
            println!(
                "{} (default {} / {})",
                view.title(),
                view.default_type(),
                view.default_category()
            );
            for category in view.allowed_categories() {
                println!("  {category}");
            }
        }
    }
    Ok(())
}

fn new_document(fields: DocumentFields) -> anyhow::Result<DocumentFile> {
    let (size, file_name) = match &fields.file {
        Some(path) => {
            let metadata = std::fs::metadata(path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned());
            (metadata.len(), name)
        }
        None => (0, None),
    };

    let name = fields.name.or(file_name).unwrap_or_default();
    let apartment_id = fields
        .apartment
        .filter(|id| !id.is_empty())
        .map(RecordId::from);
    Ok(DocumentFile::new(name, fields.kind, apartment_id, size))
}

fn handle_document(store: &CliStore, cmd: DocumentCommand) -> anyhow::Result<()> {
    let documents = store.documents();
    match cmd {
        DocumentCommand::List(args) => {
            let records = documents.get_all()?;
            if args.format == OutputFormat::Json {
                return print_json(&records);
            }
            if records.is_empty() {
                println!("No documents.");
            }
            let directory = ApartmentDirectory::new(&store.apartments().get_all()?);
            for d in &records {
                println!(
                    "{}  {:<32} {:<8} {:<20} {:>10} B  {}",
                    d.id,
                    d.name,
                    d.kind,
                    directory.document_label(d.apartment_id.as_ref()),
                    d.size,
                    d.upload_date.format("%Y-%m-%d %H:%M")
                );
            }
        }
        DocumentCommand::Add(fields) => {
            let document = new_document(fields)?;
            warn_if_dangling(store, document.apartment_id.as_ref())?;
            let record = documents.add_checked(document)?;
            println!("Registered document {} ({})", record.id, record.name);
        }
        DocumentCommand::Update { id, fields } => {
            let patch = DocumentPatch::from(fields);
            if let Some(Some(apartment_id)) = &patch.apartment_id {
                warn_if_dangling(store, Some(apartment_id))?;
            }
            let record = documents.update_checked(&id, &patch)?;
            println!("Updated document {} ({})", record.id, record.name);
        }
        DocumentCommand::Delete { id } => delete_record(&documents, &id)?,
    }
    Ok(())
}

fn handle_dashboard(store: &CliStore, config: &Config, cmd: DashboardCommand) -> anyhow::Result<()> {
    let transactions = store.transactions().get_all()?;
    match cmd {
        DashboardCommand::Summary(args) => {
            let stats = summarize(
                &store.apartments().get_all()?,
                &store.tenants().get_all()?,
                &transactions,
                config.allocation_ratio(),
            );
            if args.format == OutputFormat::Json {
                return print_json(&stats);
            }
            println!("Dashboard");
            println!("---------");
            println!("Total income:        {:>12.2}", stats.total_income);
            println!("Total expenses:      {:>12.2}", stats.total_expenses);
            println!("Net profit:          {:>12.2}", stats.net_profit);
            println!("Occupancy:           {:>11.1}%", stats.occupancy_rate);
            println!("Apartments:          {:>12}", stats.total_apartments);
            println!("Tenants:             {:>12}", stats.total_tenants);
            println!(
                "Proposed allocation: {:>12.2}  ({}% of income)",
                stats.proposed_allocation, config.dashboard.allocation_percent
            );
        }
        DashboardCommand::Monthly {
            chronological,
            format,
        } => {
            let mut months = monthly_rollup(&transactions);
            if chronological {
                sort_chronologically(&mut months);
            }
            if format == OutputFormat::Json {
                return print_json(&months);
            }
            if months.is_empty() {
                println!("No transactions.");
            }
            for m in &months {
                println!(
                    "{:<9} income {:>12.2}  expense {:>12.2}  net {:>12.2}",
                    m.label,
                    m.income,
                    m.expense,
                    m.net()
                );
            }
        }
        DashboardCommand::Apartments(args) => {
            let rows = apartment_profit(&store.apartments().get_all()?, &transactions);
            if args.format == OutputFormat::Json {
                return print_json(&rows);
            }
            if rows.is_empty() {
                println!("No apartments.");
            }
            for row in &rows {
                println!("{}  {:<24} {:>12.2}", row.apartment_id, row.name, row.profit);
            }
        }
        DashboardCommand::Expenses(args) => {
            let breakdown = expense_breakdown(&transactions);
            if args.format == OutputFormat::Json {
                return print_json(&breakdown);
            }
            if breakdown.is_empty() {
                println!("No expenses.");
            }
            for (category, total) in &breakdown {
                println!("{:<16} {:>12.2}", category.to_string(), total);
            }
        }
    }
    Ok(())
}

fn handle_status(config: &Config, ephemeral: bool, json: bool) -> anyhow::Result<()> {
    if ephemeral {
        let store = open_store(config, true)?;
        let counts = store.stats()?;
        if json {
            return print_json(&serde_json::json!({ "ephemeral": true, "records": counts }));
        }
        println!("rentbook status");
        println!("---------------");
        println!("Storage:       in memory");
        println!();
        println!("{counts}");
        return Ok(());
    }

    let medium = SqliteMedium::open(config.database_path())?;
    let medium_stats = medium.stats()?;
    let store = Store::from_config(&medium, &config.storage);
    let counts = store.stats()?;

    if json {
        let status = serde_json::json!({
            "database_path": medium.path(),
            "schema_version": medium_stats.schema_version,
            "db_size_bytes": medium_stats.db_size_bytes,
            "keys": medium_stats.keys,
            "records": counts,
        });
        return print_json(&status);
    }

    println!("rentbook status");
    println!("---------------");
    println!("Database:      {}", medium.path().display());
    println!("Schema:        v{}", medium_stats.schema_version);
    println!("Size:          {} bytes", medium_stats.db_size_bytes);
    println!("Generation:    {}", store.keys().generation());
    println!();
    println!("{counts}");

    let live = vec![
        store.apartments().key().to_string(),
        store.tenants().key().to_string(),
        store.transactions().key().to_string(),
        store.documents().key().to_string(),
    ];
    let stale: Vec<_> = medium_stats
        .keys
        .iter()
        .filter(|k| !live.contains(&k.key))
        .collect();
    if !stale.is_empty() {
        println!();
        println!("Keys from other generations:");
        for k in stale {
            println!("  {:<32} {} bytes", k.key, k.value_bytes);
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                return print_json(config);
            }
            println!("Current Configuration");
            println!("=====================");
            println!();
            println!("[Storage]");
            println!("  Database path:      {}", config.database_path().display());
            println!("  Key prefix:         {}", config.storage.key_prefix);
            println!("  Generation:         {}", config.storage.generation);
            println!("  Id length:          {}", config.storage.id_length);
            println!();
            println!("[Dashboard]");
            println!(
                "  Allocation:         {}%",
                config.dashboard.allocation_percent
            );
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

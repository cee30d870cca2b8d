use anyhow::{anyhow, Result};
use clap::Parser;
use serde::Serialize;
use std::env;
use std::path::PathBuf;

mod allocator;
mod audit;
mod category;
mod cli;
mod errors;
mod paths;
mod repository;
mod store;

use allocator::ReferenceAllocator;
use audit::AuditLog;
use category::Category;
use cli::{
    AllocateArgs, Command, HistoryArgs, ListArgs, OverrideArgs, QueryArgs, RaiseArgs, RootArgs,
    STORE_ENV_VAR,
};
use paths::StorePaths;
use store::ReferenceRecord;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = RootArgs::parse();
    let paths = StorePaths::new(resolve_store_path(args.store)?);
    match args.command {
        Command::Allocate(cmd) => cmd_allocate(paths, &cmd),
        Command::Override(cmd) => cmd_override(paths, &cmd),
        Command::Raise(cmd) => cmd_raise(paths, &cmd),
        Command::Query(cmd) => cmd_query(paths, &cmd),
        Command::List(cmd) => cmd_list(paths, &cmd),
        Command::History(cmd) => cmd_history(paths, &cmd),
    }
}

/// Resolve the store file: flag, then environment, then the platform data
/// directory.
fn resolve_store_path(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path);
    }
    if let Some(path) = env::var_os(STORE_ENV_VAR) {
        return Ok(PathBuf::from(path));
    }
    let base = dirs::data_dir()
        .ok_or_else(|| anyhow!("no data directory; pass --store or set {STORE_ENV_VAR}"))?;
    Ok(base.join("refclerk").join("references.json"))
}

fn cmd_allocate(paths: StorePaths, args: &AllocateArgs) -> Result<()> {
    let category = Category::parse(&args.category)?;
    let allocator = ReferenceAllocator::open(paths);
    let record = allocator.allocate(category)?;
    print_record(&record, args.json)
}

fn cmd_override(paths: StorePaths, args: &OverrideArgs) -> Result<()> {
    let category = Category::parse(&args.category)?;
    let allocator = ReferenceAllocator::open(paths);
    let record = allocator.override_number(category, args.number)?;
    print_record(&record, args.json)
}

fn cmd_raise(paths: StorePaths, args: &RaiseArgs) -> Result<()> {
    let category = Category::parse(&args.category)?;
    let allocator = ReferenceAllocator::open(paths);
    let record = allocator.raise_floor(category, args.number)?;
    print_record(&record, args.json)
}

fn cmd_query(paths: StorePaths, args: &QueryArgs) -> Result<()> {
    let category = Category::parse(&args.category)?;
    let allocator = ReferenceAllocator::open(paths);
    match allocator.query(category)? {
        Some(record) => print_record(&record, args.json),
        None => Err(anyhow!("no reference issued yet for category {category}")),
    }
}

fn cmd_list(paths: StorePaths, args: &ListArgs) -> Result<()> {
    let allocator = ReferenceAllocator::open(paths);
    let records = allocator.list()?;
    if args.json {
        return print_json(&records);
    }
    if records.is_empty() {
        println!("no references issued yet");
        return Ok(());
    }
    for record in records {
        println!("{:8} {}", record.category.label(), record.number);
    }
    Ok(())
}

fn cmd_history(paths: StorePaths, args: &HistoryArgs) -> Result<()> {
    let filter = args.category.as_deref().map(Category::parse).transpose()?;
    let log = AuditLog::new(paths.audit_path());
    let entries: Vec<_> = log
        .read_all()?
        .into_iter()
        .filter(|entry| match filter {
            Some(category) => entry.category == category,
            None => true,
        })
        .collect();
    if args.json {
        return print_json(&entries);
    }
    for entry in &entries {
        let previous = match entry.previous {
            Some(number) => format!(" (was {number})"),
            None => String::new(),
        };
        println!(
            "{} {} {} {}{}",
            entry.at_epoch_ms,
            entry.action,
            entry.category.label(),
            entry.number,
            previous
        );
    }
    Ok(())
}

fn print_record(record: &ReferenceRecord, json: bool) -> Result<()> {
    if json {
        print_json(record)
    } else {
        println!("{}", record.reference());
        Ok(())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

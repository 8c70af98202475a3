use anyhow::Result;
use colored::Colorize;
use leaply_admin::Route;
use leaply_admin::views::ListEntity;
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// `Leaply Admin › Universities`
pub fn print_heading(route: &Route) {
    println!("{}", route.breadcrumb().join(" › ").cyan().bold());
}

pub fn print_table<I, R>(header: &[&str], rows: I)
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = String>,
{
    let mut builder = Builder::default();
    builder.push_record(header.iter().copied());
    for row in rows {
        builder.push_record(row);
    }
    let table = builder.build().with(Style::rounded()).to_string();
    println!("{table}");
}

pub fn print_rows<E: ListEntity + Serialize>(rows: &[E], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(rows)?,
        OutputFormat::Table => {
            print_table(E::columns(), rows.iter().map(ListEntity::cells));
            println!("Total: {}", rows.len());
        }
    }
    Ok(())
}

#![cfg(not(tarpaulin_include))]

use inventory_dashboard::dashboard::{Dashboard, DashboardView};
use inventory_dashboard::{config, downloader, loader, sample};
use std::env;
use std::path::{Path, PathBuf};
use std::process;

struct Args {
    config: Option<PathBuf>,
    inventory: Option<PathBuf>,
    out: Option<PathBuf>,
    sales: Vec<PathBuf>,
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {} [--config FILE] [--inventory FILE] [--out FILE.csv|FILE.xlsx] SALES_FILE...",
        program
    )
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let program = args.first().map(String::as_str).unwrap_or("inventory-cli");
    let mut parsed = Args {
        config: None,
        inventory: None,
        out: None,
        sales: Vec::new(),
    };

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .map(PathBuf::from)
                .ok_or_else(|| format!("{} needs a value\n{}", flag, usage(program)))
        };
        match arg.as_str() {
            "--config" => parsed.config = Some(value("--config")?),
            "--inventory" => parsed.inventory = Some(value("--inventory")?),
            "--out" => parsed.out = Some(value("--out")?),
            "-h" | "--help" => return Err(usage(program)),
            other if other.starts_with("--") => {
                return Err(format!("Unknown option {}\n{}", other, usage(program)));
            }
            file => parsed.sales.push(PathBuf::from(file)),
        }
    }
    Ok(parsed)
}

fn print_view(view: &DashboardView) {
    println!("\nAs of: {}", view.last_updated);
    println!(
        "Distinct items: {}  Total quantity: {}  Locations: {}  Warehouses: {}",
        view.kpis.distinct_items, view.kpis.total_quantity, view.kpis.locations, view.kpis.warehouses
    );

    for card in &view.country_cards {
        println!("  {:<20} {:>10}", card.country, card.quantity);
    }

    println!("\nTop items by quantity:");
    for item in &view.top_items {
        println!("  {:<20} {:>10}", item.item_name, item.quantity);
    }

    println!("\nTop item per category:");
    for top in &view.top_per_category {
        println!(
            "  {:<15} {:<20} {}",
            top.category,
            top.top.item_name,
            top.top.warehouse.as_deref().unwrap_or("-")
        );
    }

    println!(
        "\nAvailable: {}  Running out (1-10): {}  Out of stock: {}",
        view.stock_summary.available, view.stock_summary.low, view.stock_summary.out
    );
    for record in &view.stock.low {
        println!("  low  {:<20} {:>6}", record.item_name, record.quantity);
    }
    for record in &view.stock.out {
        println!("  out  {}", record.item_name);
    }
}

fn write_inventory(path: &Path, dashboard: &Dashboard) -> Result<(), Box<dyn std::error::Error>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());
    match extension.as_deref() {
        Some("xlsx") => std::fs::write(path, downloader::inventory_to_xlsx(dashboard.inventory())?)?,
        Some("csv") => std::fs::write(path, downloader::inventory_to_csv(dashboard.inventory())?)?,
        _ => return Err(format!("Unsupported output file: {}", path.display()).into()),
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            process::exit(2);
        }
    };

    let config = config::load_config(args.config.as_deref())?;
    let inventory = match &args.inventory {
        Some(path) => loader::load_inventory_file(path)?,
        None => sample::sample_inventory(),
    };
    let mut dashboard = Dashboard::new(config.dashboard, inventory);

    for path in &args.sales {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();
        let status = match std::fs::read(path) {
            Ok(bytes) => dashboard.apply_upload(&file_name, &bytes),
            Err(e) => {
                eprintln!("Failed to read '{}': {}", path.display(), e);
                continue;
            }
        };
        println!("[{:?}] {}", status.kind, status.message);
    }

    print_view(&dashboard.view());

    if let Some(out) = &args.out {
        write_inventory(out, &dashboard)?;
        println!("\nWrote {} records to {}", dashboard.inventory().len(), out.display());
    }

    Ok(())
}

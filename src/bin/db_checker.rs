use anyhow::Context;
use clap::Parser;
use csv2db::tools::{ToolChecker, ToolStatus};
use csv2db::utils::logger;

#[derive(Parser)]
#[command(name = "db_checker")]
#[command(about = "Check which database client tools are installed")]
struct Args {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Print the results as JSON
    #[arg(long)]
    json: bool,
}

// ANSI 顏色
const GREEN: &str = "\x1b[92m";
const RED: &str = "\x1b[91m";
const YELLOW: &str = "\x1b[93m";
const BLUE: &str = "\x1b[94m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let checker = ToolChecker::default();
    let results = checker.check_all();

    if args.json {
        let json: serde_json::Map<String, serde_json::Value> = results
            .iter()
            .map(|(spec, status)| Ok((spec.name.to_string(), serde_json::to_value(status)?)))
            .collect::<Result<_, serde_json::Error>>()
            .context("failed to serialize tool status")?;
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    println!("{BOLD}Starting database tool checks...{RESET}");
    for (spec, status) in &results {
        println!(
            "{BOLD}{BLUE}Checking for: {} ({}){RESET}",
            spec.description, spec.name
        );
        match status {
            ToolStatus::OnPath { path } => {
                println!("  {GREEN}[ FOUND ]{RESET} Found at: {}", path.display())
            }
            ToolStatus::InKnownLocation { path } => {
                println!("  {YELLOW}[ NOT IN PATH ]{RESET} Searching common directories...");
                println!("  {GREEN}[ FOUND ]{RESET} Found at: {}", path.display());
            }
            ToolStatus::NotFound => {
                println!("  {YELLOW}[ NOT IN PATH ]{RESET} Searching common directories...");
                println!(
                    "  {RED}[ NOT FOUND ]{RESET} Could not find {} in PATH or common directories.",
                    spec.name
                );
            }
        }
    }
    println!("\n{BOLD}Checks complete.{RESET}");

    Ok(())
}

//! royalty-runner: compute a royalty report for one agreement file.
//!
//! Usage:
//!   royalty-runner --agreement agreement.json
//!   royalty-runner --agreement agreement.json --db royalties.db --json

use anyhow::{Context, Result};
use royalty_core::{
    config::AgreementConfig,
    report::{render_text, ReportSummary},
    store::RoyaltyStore,
    types::new_run_id,
    ReportItem,
};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let json_mode = args.iter().any(|a| a == "--json");
    let agreement_path = flag_value(&args, "--agreement")
        .context("missing --agreement <path>")?;
    let db = flag_value(&args, "--db").unwrap_or(":memory:");

    let config = AgreementConfig::load(agreement_path)?;
    let mut agreement = config.build()?;
    let items = agreement.report()?;
    let summary = ReportSummary::from_items(agreement.advance(), &items);

    let store = RoyaltyStore::open(db)?;
    store.migrate()?;
    let run_id = new_run_id();
    store.insert_run(
        &run_id,
        config.name.as_deref(),
        agreement.advance(),
        env!("CARGO_PKG_VERSION"),
    )?;
    store.save_statements(&run_id, agreement.statements())?;
    store.save_report_items(&run_id, &items)?;
    log::info!("run {run_id}: {} report items persisted to {db}", items.len());

    if json_mode {
        print_json(&items, &summary)?;
    } else {
        print_text(&config, &run_id, db, &items, &summary);
    }

    Ok(())
}

fn print_json(items: &[ReportItem], summary: &ReportSummary) -> Result<()> {
    for item in items {
        println!("{}", serde_json::to_string(item)?);
    }
    println!("{}", serde_json::to_string(summary)?);
    Ok(())
}

fn print_text(
    config: &AgreementConfig,
    run_id: &str,
    db: &str,
    items: &[ReportItem],
    summary: &ReportSummary,
) {
    println!("royalty-runner");
    println!("  agreement:  {}", config.name.as_deref().unwrap_or("(unnamed)"));
    println!("  run_id:     {run_id}");
    println!("  db:         {db}");
    println!();
    print!("{}", render_text(items));
    println!();
    println!("=== SUMMARY ===");
    println!("  items:        {}", summary.items);
    println!("  net copies:   {}", summary.net_copies);
    println!("  total due:    {}", summary.total_due);
    println!("  advance:      {}", summary.advance);
    println!("  advance left: {}", summary.advance_left);
    if summary.earned_out {
        println!("  earned out:   yes, payable {}", summary.payable);
    } else {
        println!("  earned out:   no");
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

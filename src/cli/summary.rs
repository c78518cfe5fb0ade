use crate::analyzer::Analyzer;
use crate::cli::ui;
use crate::scoring::RankedSector;
use anyhow::Result;
use comfy_table::Cell;
use std::collections::HashMap;

fn ranked_table(sectors: &[RankedSector]) -> comfy_table::Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Rank"),
        ui::header_cell("Sector"),
        ui::header_cell("Score"),
    ]);
    for entry in sectors {
        table.add_row(vec![
            Cell::new(entry.rank),
            Cell::new(&entry.sector),
            ui::score_cell(entry.score),
        ]);
    }
    table
}

pub async fn run(analyzer: &Analyzer, weights: &HashMap<String, f64>) -> Result<()> {
    let pb = ui::new_spinner("Fetching sector data...");
    let summary = analyzer.get_summary(weights).await;
    pb.finish_and_clear();
    let summary = summary?;

    println!(
        "{}\n\n{}",
        ui::style_text("Top Sectors", ui::StyleType::Title),
        ranked_table(&summary.top_sectors)
    );
    println!(
        "\n{}\n\n{}",
        ui::style_text("Bottom Sectors", ui::StyleType::Title),
        ranked_table(&summary.bottom_sectors)
    );

    let dist = &summary.score_distribution;
    println!(
        "\n{} avg {:.1}, max {:.1}, min {:.1}, spread {:.1}",
        ui::style_text("Distribution:", ui::StyleType::Label),
        dist.average,
        dist.max,
        dist.min,
        dist.spread
    );

    println!("\n{}", ui::style_text("Drivers", ui::StyleType::Title));
    for (sector, driver) in &summary.top_sector_drivers {
        println!(
            "  {}: {}",
            ui::style_text(sector, ui::StyleType::Label),
            driver
        );
    }

    println!(
        "\n{}",
        ui::style_text(
            &format!("As of {}", summary.timestamp),
            ui::StyleType::Subtle
        )
    );

    Ok(())
}

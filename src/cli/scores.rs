use crate::analyzer::Analyzer;
use crate::cli::ui;
use anyhow::Result;
use comfy_table::Cell;
use std::collections::HashMap;

pub async fn run(
    analyzer: &Analyzer,
    weights: &HashMap<String, f64>,
    refresh: bool,
) -> Result<()> {
    let pb = ui::new_spinner("Fetching sector data...");
    let response = analyzer.get_scores(weights, refresh).await;
    pb.finish_and_clear();
    let response = response?;

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Rank"),
        ui::header_cell("Sector"),
        ui::header_cell("Score"),
        ui::header_cell("Momentum"),
        ui::header_cell("Valuation"),
        ui::header_cell("Growth"),
        ui::header_cell("Innovation"),
        ui::header_cell("Macro"),
        ui::header_cell("12M Ret"),
        ui::header_cell("Fwd P/E"),
    ]);

    for score in &response.scores {
        table.add_row(vec![
            Cell::new(score.rank),
            Cell::new(&score.sector),
            ui::score_cell(score.opportunity_score),
            ui::score_cell(score.momentum_score),
            ui::score_cell(score.valuation_score),
            ui::score_cell(score.growth_score),
            ui::score_cell(score.innovation_score),
            ui::score_cell(score.macro_score),
            ui::format_optional_cell(score.metrics.return_12mo, |r| format!("{r:.1}%")),
            ui::format_optional_cell(score.metrics.forward_pe, |pe| format!("{pe:.1}")),
        ]);
    }

    println!(
        "{}\n\n{table}",
        ui::style_text("Sector Opportunity Ranking", ui::StyleType::Title)
    );

    let weights_line = response
        .weights_used
        .iter()
        .map(|(name, weight)| format!("{name} {weight:.2}"))
        .collect::<Vec<_>>()
        .join(", ");
    println!(
        "\n{} {}",
        ui::style_text("Weights:", ui::StyleType::Label),
        weights_line
    );
    println!(
        "{}",
        ui::style_text(
            &format!("As of {}", response.timestamp),
            ui::StyleType::Subtle
        )
    );

    Ok(())
}

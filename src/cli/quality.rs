use crate::analyzer::Analyzer;
use crate::cli::ui;
use crate::core::status::HealthState;
use anyhow::Result;
use comfy_table::Cell;

pub async fn run(analyzer: &Analyzer) -> Result<()> {
    let pb = ui::new_spinner("Checking data sources...");
    let report = analyzer.data_quality().await;
    pb.finish_and_clear();

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Source"),
        ui::header_cell("Status"),
        ui::header_cell("Detail"),
    ]);
    for status in &report.sources {
        table.add_row(vec![
            Cell::new(status.source.name()),
            ui::status_cell(status.state),
            Cell::new(status.message.as_deref().unwrap_or("-")),
        ]);
    }

    println!(
        "{}\n\n{table}",
        ui::style_text("Data Quality", ui::StyleType::Title)
    );

    let overall = report.overall_status.to_string();
    let styled = match report.overall_status {
        HealthState::Ok => ui::style_text(&overall, ui::StyleType::Highlight),
        HealthState::Warning => ui::style_text(&overall, ui::StyleType::Label),
        HealthState::Error => ui::style_text(&overall, ui::StyleType::Error),
    };
    println!(
        "\n{} {}",
        ui::style_text("Overall:", ui::StyleType::Label),
        styled
    );

    Ok(())
}

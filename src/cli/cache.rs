use crate::analyzer::Analyzer;
use crate::cli::ui;
use anyhow::Result;
use comfy_table::Cell;

pub async fn info(analyzer: &Analyzer) -> Result<()> {
    let info = analyzer.cache_info().await;

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Total"),
        ui::header_cell("Valid"),
        ui::header_cell("Expired"),
        ui::header_cell("Size (MB)"),
    ]);
    table.add_row(vec![
        Cell::new(info.total_files),
        Cell::new(info.valid_files),
        Cell::new(info.expired_files),
        Cell::new(format!("{:.2}", info.total_size_mb)),
    ]);

    println!(
        "{}\n\n{table}",
        ui::style_text("Cache", ui::StyleType::Title)
    );
    Ok(())
}

pub async fn clear(analyzer: &Analyzer) -> Result<()> {
    let result = analyzer.clear_cache().await;
    println!(
        "{}",
        ui::style_text(&result.message, ui::StyleType::Highlight)
    );
    Ok(())
}

use comfy_table::{Cell, CellAlignment, Table, modifiers, presets};

use crate::{catalog::MetricCatalog, sample::RawSample};

/// Render one poll as a terminal table in catalog order.
///
/// A failed metric shows as `--`, never as a stale or fabricated number.
pub fn build_sample_table(catalog: &MetricCatalog, sample: &RawSample) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.set_header(vec!["Metric", "Value", "Unit"]);
    for metric in catalog {
        let value = sample.values.get(&metric.name).copied().flatten();
        table.add_row(vec![
            Cell::new(&metric.name),
            Cell::new(value.map_or_else(|| "--".to_owned(), |value| format_value(value, metric.register.factor)))
                .set_alignment(CellAlignment::Right),
            Cell::new(&metric.register.unit),
        ]);
    }
    table
}

/// Whole registers print as integers, scaled ones keep two decimals.
fn format_value(value: f64, factor: f64) -> String {
    if factor >= 1.0 { format!("{value:.0}") } else { format!("{value:.2}") }
}

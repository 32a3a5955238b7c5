use adops_core::canonical;
use adops_model::{format_number, FieldRead, FieldRegistry};
use adops_query::Aggregates;
use serde_json::Value;

#[derive(Clone, Copy)]
pub struct OutputMode {
    pub json: bool,
    pub quiet: bool,
}

pub fn emit_ok(output_mode: OutputMode, payload: &Value) -> Result<(), String> {
    if output_mode.json {
        let bytes = canonical::stable_json_bytes(payload).map_err(|e| e.to_string())?;
        let text = String::from_utf8(bytes).map_err(|e| e.to_string())?;
        println!("{text}");
    } else if !output_mode.quiet {
        println!(
            "{}",
            serde_json::to_string_pretty(payload).map_err(|e| e.to_string())?
        );
    }
    Ok(())
}

fn cell(read: FieldRead) -> String {
    match read {
        FieldRead::Value(value) => value.key(),
        FieldRead::Missing => String::new(),
        FieldRead::Malformed(_) => "?".to_string(),
    }
}

/// Fixed-width table of every declared field, one line per row.
pub fn table<R>(registry: &FieldRegistry<R>, rows: &[&R]) -> String {
    let headers: Vec<String> = registry.fields().map(|d| d.name().to_string()).collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| registry.fields().map(|d| cell(d.read(row))).collect())
        .collect();
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();
    let line = |values: &[String]| {
        values
            .iter()
            .zip(&widths)
            .map(|(v, &w)| format!("{v:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };
    let mut out = vec![line(&headers)];
    out.extend(cells.iter().map(|r| line(r)));
    out.join("\n")
}

pub fn aggregate_lines(aggregates: &Aggregates) -> String {
    aggregates
        .iter()
        .map(|(name, value)| format!("{name}: {}", format_number(value)))
        .collect::<Vec<_>>()
        .join("\n")
}

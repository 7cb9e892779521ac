//! Show the key bindings.

use serde::Serialize;

use mousekeys_input_capture::{platform_name, raw_code, LogicalKey};
use mousekeys_key_model::BINDINGS;

#[derive(Serialize)]
struct KeyRow {
    key: LogicalKey,
    label: &'static str,
    action: &'static str,
    raw_code: Option<i64>,
}

pub fn run(json: bool) -> anyhow::Result<()> {
    let rows: Vec<KeyRow> = BINDINGS
        .iter()
        .map(|b| KeyRow {
            key: b.key,
            label: b.label,
            action: b.action,
            raw_code: raw_code(b.key),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("MouseKeys bindings ({})", platform_name());
    println!("{}", "=".repeat(50));
    for row in &rows {
        let code = row
            .raw_code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("  {:<12} {:>5}  {}", row.label, code, row.action);
    }
    println!();
    println!("Keys other than these always reach other applications.");
    Ok(())
}

//! Export command implementation

use std::path::Path;

use anyhow::Result;
use outlay_core::{
    Clock, DirectorySink, EngineConfig, ExportFormat, ExportResult, ExpenseStore,
};

use super::current_records;

pub fn cmd_export(
    store: &dyn ExpenseStore,
    config: &EngineConfig,
    clock: &dyn Clock,
    format: &str,
    out: Option<&Path>,
) -> Result<()> {
    let format: ExportFormat = format.parse()?;
    let records = current_records(store)?;
    let formatter = config.export_formatter();

    let Some(dir) = out else {
        let contents = match format {
            ExportFormat::Csv => formatter.to_csv(&records),
            ExportFormat::Text => formatter.to_plain_text_report(&records, clock.now()),
        };
        print!("{}", contents);
        return Ok(());
    };

    match formatter.export_to(&records, format, clock.now(), &DirectorySink::new(dir)) {
        ExportResult::Success { path, format } => {
            println!("📤 Exported {} expense(s) as {} to {}", records.len(), format, path);
            Ok(())
        }
        ExportResult::Error { message } => anyhow::bail!(message),
    }
}

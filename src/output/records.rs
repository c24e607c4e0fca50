//! JSON-lines export of extracted records

use crate::page::FieldExtractor;
use crate::storage::PageStore;
use crate::HarvestError;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Outcome of an export pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Records written to the output file
    pub written: usize,

    /// Stored pages that could not be read or that the extractor rejected
    pub skipped: usize,
}

/// Runs `extractor` over every stored page and writes one JSON object per line
///
/// Each line carries the item id alongside the extracted fields. Pages that
/// cannot be loaded or fail extraction are logged and skipped.
pub fn export_records<E>(
    store: &dyn PageStore,
    extractor: &E,
    output_path: &Path,
) -> Result<ExportReport, HarvestError>
where
    E: FieldExtractor,
{
    #[derive(Serialize)]
    struct Line<'a, R> {
        item_id: &'a str,
        #[serde(flatten)]
        record: R,
    }

    let mut ids = store.list_saved_ids()?;
    ids.sort_by_key(|id| id.parse::<u128>().unwrap_or(u128::MAX));

    let mut writer = BufWriter::new(File::create(output_path)?);
    let mut report = ExportReport::default();

    for id in &ids {
        let content = match store.load(id) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Skipping item {}, failed to load: {}", id, e);
                report.skipped += 1;
                continue;
            }
        };

        match extractor.extract(&content) {
            Ok(record) => {
                serde_json::to_writer(
                    &mut writer,
                    &Line {
                        item_id: id,
                        record,
                    },
                )?;
                writer.write_all(b"\n")?;
                report.written += 1;
            }
            Err(e) => {
                tracing::warn!("Skipping item {}: {}", id, e);
                report.skipped += 1;
            }
        }
    }

    writer.flush()?;
    tracing::info!(
        "Exported {} records to {} ({} skipped)",
        report.written,
        output_path.display(),
        report.skipped
    );

    Ok(report)
}

use std::io::{Cursor, Read, Seek};

use calamine::{Cell, DataRef, Reader, Sheets, open_workbook_auto_from_rs};

use crate::error::ParseError;
use crate::extractor::{Extractor, SourceBlob};
use crate::limits::Limits;
use crate::shared_utils::implicit_unit_name;
use crate::table_renderer::{CellValue, TabularUnit};
use crate::transcript::{RenderedBlock, Transcript, TranscriptAssembler, UnitOutcome};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Workbook backend (xlsx, xlsm, xlsb, xls, ods) built on calamine
pub struct SpreadsheetExtractor;

/// CSV backend: the whole file is one implicit unit
pub struct DelimitedTextExtractor;

impl Extractor for SpreadsheetExtractor {
    fn extract(&self, blob: &SourceBlob, limits: &Limits) -> Result<Transcript, ParseError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(blob.bytes()))?;
        let sheet_names = workbook.sheet_names();
        log::debug!("Workbook {} has {} sheets", blob.file_name(), sheet_names.len());

        process_units(&sheet_names, limits, |name| read_sheet(&mut workbook, name, limits))
    }
}

/// Read one sheet under the row and column caps.
///
/// xlsx and xlsb sheets are streamed cell by cell and reading stops after the
/// last row that is kept. xls and ods have no cell reader in calamine, so
/// their range is loaded whole and walked the same way.
fn read_sheet<RS>(workbook: &mut Sheets<RS>, name: &str, limits: &Limits) -> Result<TabularUnit, ParseError>
where
    RS: Read + Seek,
{
    let max_rows = limits.max_rows_per_unit;
    let max_columns = limits.max_columns_per_unit;

    match workbook {
        Sheets::Xlsx(xlsx) => {
            let mut reader = xlsx.worksheet_cells_reader(name)?;
            let cells = std::iter::from_fn(move || match reader.next_cell() {
                Ok(Some(cell)) => Some(Ok(positioned(&cell))),
                Ok(None) => None,
                Err(e) => Some(Err(ParseError::from(e))),
            });
            TabularUnit::from_cells(cells, max_rows, max_columns)
        }
        Sheets::Xlsb(xlsb) => {
            let mut reader = xlsb.worksheet_cells_reader(name)?;
            let cells = std::iter::from_fn(move || match reader.next_cell() {
                Ok(Some(cell)) => Some(Ok(positioned(&cell))),
                Ok(None) => None,
                Err(e) => Some(Err(ParseError::from(e))),
            });
            TabularUnit::from_cells(cells, max_rows, max_columns)
        }
        Sheets::Xls(_) | Sheets::Ods(_) => {
            let range = workbook.worksheet_range(name)?;
            let (start_row, start_col) = range.start().unwrap_or((0, 0));
            let cells = range.used_cells().map(|(row, col, value)| {
                Ok::<_, ParseError>((
                    start_row + row as u32,
                    start_col + col as u32,
                    CellValue::from(value),
                ))
            });
            TabularUnit::from_cells(cells, max_rows, max_columns)
        }
    }
}

fn positioned(cell: &Cell<DataRef<'_>>) -> (u32, u32, CellValue) {
    let (row, col) = cell.get_position();
    (row, col, CellValue::from(cell.get_value()))
}

impl Extractor for DelimitedTextExtractor {
    fn extract(&self, blob: &SourceBlob, limits: &Limits) -> Result<Transcript, ParseError> {
        let unit_name = implicit_unit_name(blob.file_name());
        process_units(&[unit_name], limits, |_| read_csv_unit(blob.bytes(), limits))
    }
}

/// Read the header record plus at most `max_rows_per_unit` data records
fn read_csv_unit(bytes: &[u8], limits: &Limits) -> Result<TabularUnit, ParseError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let records = reader
        .byte_records()
        .take(limits.max_rows_per_unit.saturating_add(1))
        .collect::<Result<Vec<_>, _>>()?;

    let rows = records.iter().map(|record| {
        record
            .iter()
            .map(|field| CellValue::infer(&String::from_utf8_lossy(field)))
    });

    Ok(TabularUnit::from_rows(
        rows,
        limits.max_rows_per_unit,
        limits.max_columns_per_unit,
    ))
}

/// Walk units in order, one at a time.
///
/// `read_unit` hands over ownership of a unit's data; it is rendered and
/// dropped before the next unit is read.
fn process_units<F>(
    unit_names: &[String],
    limits: &Limits,
    mut read_unit: F,
) -> Result<Transcript, ParseError>
where
    F: FnMut(&str) -> Result<TabularUnit, ParseError>,
{
    let mut assembler = TranscriptAssembler::new();

    for name in unit_names.iter().take(limits.max_units_per_document) {
        let unit = read_unit(name)?;
        assembler.absorb(render_unit(name, unit, limits));
    }

    let skipped = unit_names.len().saturating_sub(limits.max_units_per_document);
    if skipped > 0 {
        log::info!(
            "Skipping {} of {} sheets (limit: {})",
            skipped,
            unit_names.len(),
            limits.max_units_per_document
        );
        assembler.append_note(format!(
            "[Note: {} additional sheet(s) skipped (limit: {})]",
            skipped, limits.max_units_per_document
        ));
        assembler.mark_truncated();
    }

    Ok(assembler.finish())
}

/// Render one unit and note any limit it ran into.
///
/// Reaching exactly `max_rows_per_unit` rows counts as truncation: the reader
/// stops there and does not look further.
pub fn render_unit(name: &str, unit: TabularUnit, limits: &Limits) -> UnitOutcome {
    let mut body = unit.render();
    let mut truncated = false;

    if unit.rows.len() == limits.max_rows_per_unit {
        push_note(
            &mut body,
            &format!("[Note: Sheet truncated at {} rows]", limits.max_rows_per_unit),
        );
        truncated = true;
    }

    if unit.source_width > limits.max_columns_per_unit {
        push_note(
            &mut body,
            &format!("[Note: Columns beyond {} omitted]", limits.max_columns_per_unit),
        );
        truncated = true;
    }

    log::debug!(
        "Rendered sheet '{}': {} rows, {} columns, truncated: {}",
        name,
        unit.rows.len(),
        unit.width(),
        truncated
    );

    UnitOutcome {
        name: Some(name.to_string()),
        block: RenderedBlock::sheet(name, body),
        truncated,
    }
}

fn push_note(body: &mut String, note: &str) {
    if !body.is_empty() {
        body.push('\n');
    }
    body.push_str(note);
}

//! Tagged cell values and the fixed-width table layout shared by the
//! spreadsheet and CSV backends.

use std::fmt;

use calamine::{Data, DataRef};
use unicode_width::UnicodeWidthStr;

/// Token used for every empty or missing cell
pub const EMPTY_TOKEN: &str = "NaN";

const COLUMN_SEPARATOR: &str = "  ";

/// A scalar cell whose type is only known at runtime
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    Empty,
}

impl CellValue {
    /// Type a raw delimited-text field.
    pub fn infer(raw: &str) -> Self {
        if raw.is_empty() {
            return CellValue::Empty;
        }

        if raw.eq_ignore_ascii_case("true") {
            return CellValue::Boolean(true);
        }
        if raw.eq_ignore_ascii_case("false") {
            return CellValue::Boolean(false);
        }

        // "inf" and "NaN" parse as f64 but are words, not numbers
        if raw.bytes().any(|b| b.is_ascii_digit()) {
            if let Ok(number) = raw.trim().parse::<f64>() {
                return CellValue::Number(number);
            }
        }

        CellValue::Text(raw.to_string())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(text) => f.write_str(text),
            CellValue::Number(number) => write!(f, "{}", format_number(*number)),
            CellValue::Boolean(true) => f.write_str("True"),
            CellValue::Boolean(false) => f.write_str("False"),
            CellValue::Empty => f.write_str(EMPTY_TOKEN),
        }
    }
}

impl From<&DataRef<'_>> for CellValue {
    fn from(data: &DataRef<'_>) -> Self {
        match data {
            DataRef::SharedString(s) if s.is_empty() => CellValue::Empty,
            DataRef::SharedString(s) => CellValue::Text(s.to_string()),
            DataRef::String(s) => CellValue::from(&Data::String(s.clone())),
            DataRef::Int(i) => CellValue::Number(*i as f64),
            DataRef::Float(f) => CellValue::Number(*f),
            DataRef::Bool(b) => CellValue::Boolean(*b),
            DataRef::DateTime(dt) => CellValue::from(&Data::DateTime(dt.clone())),
            DataRef::DateTimeIso(s) | DataRef::DurationIso(s) => CellValue::Text(s.clone()),
            DataRef::Error(e) => CellValue::Text(e.to_string()),
            DataRef::Empty => CellValue::Empty,
        }
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => CellValue::Empty,
            Data::String(s) if s.is_empty() => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::Bool(b) => CellValue::Boolean(*b),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(datetime) if !dt.is_duration() => CellValue::Text(format_datetime(datetime)),
                _ => CellValue::Number(dt.as_f64()),
            },
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(e) => CellValue::Text(e.to_string()),
        }
    }
}

fn format_number(number: f64) -> String {
    if number.is_nan() {
        return EMPTY_TOKEN.to_string();
    }
    if number.is_finite() && number.fract() == 0.0 && number.abs() < 1e15 {
        return format!("{}", number as i64);
    }
    format!("{}", number)
}

fn format_datetime(datetime: chrono::NaiveDateTime) -> String {
    if datetime.time() == chrono::NaiveTime::MIN {
        datetime.format("%Y-%m-%d").to_string()
    } else {
        datetime.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// One sheet or CSV table after limits were applied.
///
/// `source_width` is the widest row seen while reading, before any
/// columns were dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularUnit {
    pub header: Vec<CellValue>,
    pub rows: Vec<Vec<CellValue>>,
    pub source_width: usize,
}

impl TabularUnit {
    /// Assemble a unit from source rows: the first row labels the columns,
    /// the following `max_rows` rows are data. Only the first `max_columns`
    /// cells of any row are kept.
    pub fn from_rows<R, C>(rows: R, max_rows: usize, max_columns: usize) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = CellValue>,
    {
        let mut unit = TabularUnit::default();
        let mut rows = rows.into_iter();

        if let Some(header) = rows.next() {
            unit.header = unit.keep_columns(header, max_columns);
        }
        for row in rows.take(max_rows) {
            let cells = unit.keep_columns(row, max_columns);
            unit.rows.push(cells);
        }

        unit
    }

    /// Assemble a unit from positioned cells in row-major order, as a
    /// streaming sheet reader yields them.
    ///
    /// Columns count from the sheet's first column, so blank leading columns
    /// show up as `Unnamed: <i>`. Rows start at the first row holding a value.
    /// The source is consumed only up to the first cell past the header plus
    /// `max_rows` data rows.
    pub fn from_cells<I, E>(cells: I, max_rows: usize, max_columns: usize) -> Result<Self, E>
    where
        I: IntoIterator<Item = Result<(u32, u32, CellValue), E>>,
    {
        let row_budget = max_rows.saturating_add(1);
        let mut grid: Vec<Vec<CellValue>> = Vec::new();
        let mut first_row = None;
        let mut source_width = 0;

        for cell in cells {
            let (row, col, value) = cell?;
            if value.is_empty() {
                continue;
            }

            let first = *first_row.get_or_insert(row);
            let offset = row.saturating_sub(first) as usize;
            if offset >= row_budget {
                break;
            }

            let col = col as usize;
            source_width = source_width.max(col + 1);
            if col >= max_columns {
                continue;
            }

            if grid.len() <= offset {
                grid.resize_with(offset + 1, Vec::new);
            }
            let row_cells = &mut grid[offset];
            if row_cells.len() <= col {
                row_cells.resize(col + 1, CellValue::Empty);
            }
            row_cells[col] = value;
        }

        let mut rows = grid.into_iter();
        Ok(TabularUnit {
            header: rows.next().unwrap_or_default(),
            rows: rows.collect(),
            source_width,
        })
    }

    fn keep_columns<C>(&mut self, row: C, max_columns: usize) -> Vec<CellValue>
    where
        C: IntoIterator<Item = CellValue>,
    {
        let mut kept = Vec::new();
        let mut width = 0;
        for cell in row {
            width += 1;
            if kept.len() < max_columns {
                kept.push(cell);
            }
        }
        self.source_width = self.source_width.max(width);
        kept
    }

    /// Number of rendered columns
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0)
    }

    fn column_labels(&self) -> Vec<String> {
        (0..self.width())
            .map(|col| match self.header.get(col) {
                None | Some(CellValue::Empty) => format!("Unnamed: {}", col),
                Some(label) => label.to_string(),
            })
            .collect()
    }

    /// Render as a fixed-width table with a zero-based row index.
    ///
    /// Columns are right-aligned to their widest value, the index column is
    /// left-aligned. A unit without rows renders its column labels only, and
    /// one without rows or columns renders nothing.
    pub fn render(&self) -> String {
        let labels = self.column_labels();

        if self.rows.is_empty() {
            return labels.join(COLUMN_SEPARATOR);
        }

        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                (0..labels.len())
                    .map(|col| row.get(col).unwrap_or(&CellValue::Empty).to_string())
                    .collect()
            })
            .collect();

        let index_width = (self.rows.len() - 1).to_string().len();
        let column_widths: Vec<usize> = labels
            .iter()
            .enumerate()
            .map(|(col, label)| {
                cells
                    .iter()
                    .map(|row| display_width(&row[col]))
                    .fold(display_width(label), usize::max)
            })
            .collect();

        let mut lines = Vec::with_capacity(cells.len() + 1);

        if !labels.is_empty() {
            let mut line = " ".repeat(index_width);
            for (label, &width) in labels.iter().zip(&column_widths) {
                line.push_str(COLUMN_SEPARATOR);
                line.push_str(&pad_left(label, width));
            }
            lines.push(line);
        }

        for (index, row) in cells.iter().enumerate() {
            let mut line = pad_right(&index.to_string(), index_width);
            for (value, &width) in row.iter().zip(&column_widths) {
                line.push_str(COLUMN_SEPARATOR);
                line.push_str(&pad_left(value, width));
            }
            lines.push(line.trim_end().to_string());
        }

        lines.join("\n")
    }
}

fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

fn pad_left(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(display_width(text));
    format!("{}{}", " ".repeat(padding), text)
}

fn pad_right(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(display_width(text));
    format!("{}{}", text, " ".repeat(padding))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_infer_cell_types() {
        assert_eq!(CellValue::infer(""), CellValue::Empty);
        assert_eq!(CellValue::infer("42"), CellValue::Number(42.0));
        assert_eq!(CellValue::infer("-1.5"), CellValue::Number(-1.5));
        assert_eq!(CellValue::infer("1e3"), CellValue::Number(1000.0));
        assert_eq!(CellValue::infer("TRUE"), CellValue::Boolean(true));
        assert_eq!(CellValue::infer("false"), CellValue::Boolean(false));
        assert_eq!(CellValue::infer("inf"), text("inf"));
        assert_eq!(CellValue::infer("NaN"), text("NaN"));
        assert_eq!(CellValue::infer("12 apples"), text("12 apples"));
        assert_eq!(CellValue::infer(" "), text(" "));
    }

    #[test]
    fn test_cell_rendering() {
        assert_eq!(CellValue::Number(3.0).to_string(), "3");
        assert_eq!(CellValue::Number(-0.25).to_string(), "-0.25");
        assert_eq!(CellValue::Number(1e20).to_string(), "100000000000000000000");
        assert_eq!(CellValue::Number(f64::NAN).to_string(), "NaN");
        assert_eq!(CellValue::Boolean(true).to_string(), "True");
        assert_eq!(CellValue::Empty.to_string(), EMPTY_TOKEN);
        assert_eq!(text("abc").to_string(), "abc");
    }

    #[test]
    fn test_calamine_conversion() {
        assert_eq!(CellValue::from(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(CellValue::from(&Data::Float(2.5)), CellValue::Number(2.5));
        assert_eq!(CellValue::from(&Data::Bool(false)), CellValue::Boolean(false));
        assert_eq!(CellValue::from(&Data::String(String::new())), CellValue::Empty);
        assert_eq!(CellValue::from(&Data::String("x".into())), text("x"));
        assert_eq!(CellValue::from(&Data::Empty), CellValue::Empty);
        assert_eq!(
            CellValue::from(&Data::Error(calamine::CellErrorType::Div0)),
            text("#DIV/0!")
        );
    }

    #[test]
    fn test_render_aligns_columns() {
        let unit = TabularUnit::from_rows(
            vec![
                vec![text("name"), text("qty")],
                vec![text("apple"), CellValue::Number(3.0)],
                vec![text("kiwi"), CellValue::Number(12.0)],
            ],
            100,
            100,
        );

        let expected = [
            "    name  qty",
            "0  apple    3",
            "1   kiwi   12",
        ]
        .join("\n");
        assert_eq!(unit.render(), expected);
    }

    #[test]
    fn test_render_empty_cells_and_unnamed_columns() {
        let unit = TabularUnit::from_rows(
            vec![
                vec![text("a"), CellValue::Empty],
                vec![CellValue::Empty, CellValue::Boolean(true)],
                vec![text("x")],
            ],
            100,
            100,
        );

        let expected = [
            "     a  Unnamed: 1",
            "0  NaN        True",
            "1    x         NaN",
        ]
        .join("\n");
        assert_eq!(unit.render(), expected);
    }

    #[test]
    fn test_index_column_grows() {
        let mut rows = vec![vec![text("v")]];
        for i in 0..11 {
            rows.push(vec![CellValue::Number(i as f64)]);
        }
        let rendered = TabularUnit::from_rows(rows, 100, 100).render();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "     v");
        assert_eq!(lines[1], "0    0");
        assert_eq!(lines[11], "10  10");
    }

    #[test]
    fn test_header_only_unit() {
        let unit = TabularUnit::from_rows(vec![vec![text("a"), text("b")]], 10, 10);
        assert!(unit.rows.is_empty());
        assert_eq!(unit.render(), "a  b");
    }

    #[test]
    fn test_empty_unit_renders_nothing() {
        let unit = TabularUnit::from_rows(Vec::<Vec<CellValue>>::new(), 10, 10);
        assert_eq!(unit.width(), 0);
        assert_eq!(unit.render(), "");
    }

    #[test]
    fn test_zero_columns_renders_index_only() {
        let rows: Vec<Vec<CellValue>> = vec![vec![], vec![], vec![]];
        let unit = TabularUnit::from_rows(rows, 10, 10);
        assert_eq!(unit.rows.len(), 2);
        assert_eq!(unit.render(), "0\n1");
    }

    #[test]
    fn test_row_and_column_limits() {
        let rows: Vec<Vec<CellValue>> = (0..10)
            .map(|r| (0..6).map(|c| CellValue::Number((r * 10 + c) as f64)).collect())
            .collect();
        let unit = TabularUnit::from_rows(rows, 4, 3);

        assert_eq!(unit.header.len(), 3);
        assert_eq!(unit.rows.len(), 4);
        assert!(unit.rows.iter().all(|row| row.len() == 3));
        assert_eq!(unit.source_width, 6);
        // First columns are kept in order
        assert_eq!(unit.rows[0], vec![
            CellValue::Number(10.0),
            CellValue::Number(11.0),
            CellValue::Number(12.0),
        ]);
    }

    #[test]
    fn test_shared_string_conversion() {
        assert_eq!(CellValue::from(&DataRef::SharedString("s")), text("s"));
        assert_eq!(CellValue::from(&DataRef::SharedString("")), CellValue::Empty);
        assert_eq!(CellValue::from(&DataRef::Int(4)), CellValue::Number(4.0));
        assert_eq!(CellValue::from(&DataRef::Empty), CellValue::Empty);
    }

    #[test]
    fn test_from_cells_stops_reading_at_row_cap() {
        // Endless sheet: only terminates if reading stops at the cap
        let cells = (0u32..).map(|row| Ok::<_, ()>((row, 0, CellValue::Number(row as f64))));
        let unit = TabularUnit::from_cells(cells, 5, 10).unwrap();

        assert_eq!(unit.header, vec![CellValue::Number(0.0)]);
        assert_eq!(unit.rows.len(), 5);
        assert_eq!(unit.rows[4], vec![CellValue::Number(5.0)]);
    }

    #[test]
    fn test_from_cells_pads_leading_columns() {
        let cells = vec![
            Ok::<_, ()>((2, 2, text("name"))),
            Ok((2, 3, text("qty"))),
            Ok((3, 2, text("apple"))),
            Ok((3, 3, CellValue::Number(3.0))),
        ];
        let unit = TabularUnit::from_cells(cells, 10, 10).unwrap();

        let expected = [
            "   Unnamed: 0  Unnamed: 1   name  qty",
            "0         NaN         NaN  apple    3",
        ]
        .join("\n");
        assert_eq!(unit.render(), expected);
    }

    #[test]
    fn test_from_cells_column_cap_and_gaps() {
        let cells = vec![
            Ok::<_, ()>((0, 0, text("a"))),
            Ok((0, 4, text("e"))),
            Ok((1, 0, CellValue::Empty)),
            Ok((2, 1, CellValue::Number(7.0))),
        ];
        let unit = TabularUnit::from_cells(cells, 10, 2).unwrap();

        assert_eq!(unit.header, vec![text("a")]);
        assert_eq!(unit.source_width, 5);
        // Row 1 holds no value but still occupies its position
        assert_eq!(unit.rows.len(), 2);
        assert!(unit.rows[0].is_empty());
        assert_eq!(unit.rows[1], vec![CellValue::Empty, CellValue::Number(7.0)]);
    }

    #[test]
    fn test_from_cells_propagates_errors() {
        let cells = vec![Ok((0, 0, text("a"))), Err("broken xml")];
        assert_eq!(TabularUnit::from_cells(cells, 10, 10), Err("broken xml"));
    }

    #[test]
    fn test_wide_characters_align_by_display_width() {
        let unit = TabularUnit::from_rows(
            vec![vec![text("city")], vec![text("東京")], vec![text("Oslo")]],
            10,
            10,
        );
        let expected = ["   city", "0  東京", "1  Oslo"].join("\n");
        assert_eq!(unit.render(), expected);
    }
}

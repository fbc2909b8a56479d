#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use rust_xlsxwriter::Workbook;

/// Build a PDF with one page per entry; an empty entry yields a page with
/// no text operators at all.
pub fn build_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let operations = if text.is_empty() {
            Vec::new()
        } else {
            vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ]
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Build an xlsx workbook; each sheet is a name plus rows of strings
pub fn build_xlsx(sheets: &[(&str, Vec<Vec<&str>>)]) -> Vec<u8> {
    let mut workbook = Workbook::new();

    for (name, rows) in sheets {
        write_rows(&mut workbook, name, rows, 0, 0);
    }

    workbook.save_to_buffer().unwrap()
}

/// Build a single-sheet workbook whose table starts at (`first_row`, `first_col`)
pub fn build_xlsx_at(rows: Vec<Vec<&str>>, first_row: u32, first_col: u16) -> Vec<u8> {
    let mut workbook = Workbook::new();
    write_rows(&mut workbook, "Sheet1", &rows, first_row, first_col);
    workbook.save_to_buffer().unwrap()
}

fn write_rows(workbook: &mut Workbook, name: &str, rows: &[Vec<&str>], first_row: u32, first_col: u16) {
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(name).unwrap();
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            let (r, c) = (first_row + r as u32, first_col + c as u16);
            match value.parse::<f64>() {
                Ok(number) => worksheet.write_number(r, c, number).unwrap(),
                Err(_) => worksheet.write_string(r, c, *value).unwrap(),
            };
        }
    }
}

/// CSV with a header row and `rows` numbered data rows
pub fn build_csv(rows: usize) -> Vec<u8> {
    let mut content = String::from("id,label\n");
    for i in 0..rows {
        content.push_str(&format!("{},item-{}\n", i, i));
    }
    content.into_bytes()
}

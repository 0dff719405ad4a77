//! Download encodings: CSV text and a single-sheet xlsx workbook.

use crate::domain::model::{
    Cell, CleaningOperation, CleaningResult, Dataset, ExportFormat, ExportedFile,
};
use crate::utils::error::{EtlError, Result};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const SHEET_NAME: &str = "Sheet1";

/// Standard download name for each operation and encoding.
pub fn output_filename(operation: CleaningOperation, format: ExportFormat) -> &'static str {
    match (operation, format) {
        (CleaningOperation::RemoveMissing, ExportFormat::Csv) => "cleaned_missing_removed.csv",
        (CleaningOperation::HandleMissing, ExportFormat::Csv) => "cleaned_missing_filled.csv",
        (CleaningOperation::RemoveDuplicates, ExportFormat::Csv) => {
            "cleaned_duplicates_removed.csv"
        }
        (CleaningOperation::RemoveMissing, ExportFormat::Xlsx) => "cleaned_data.xlsx",
        (CleaningOperation::HandleMissing, ExportFormat::Xlsx) => "filled_data.xlsx",
        (CleaningOperation::RemoveDuplicates, ExportFormat::Xlsx) => "deduplicated_data.xlsx",
    }
}

pub fn package(
    dataset: Dataset,
    operation: CleaningOperation,
    format: ExportFormat,
    name_override: Option<&str>,
) -> CleaningResult {
    let filename = name_override
        .map(str::to_string)
        .unwrap_or_else(|| output_filename(operation, format).to_string());

    CleaningResult {
        dataset,
        operation,
        format,
        filename,
        content_type: format.content_type(),
    }
}

pub fn export(result: &CleaningResult) -> Result<ExportedFile> {
    let bytes = encode(&result.dataset, result.format)?;
    Ok(ExportedFile {
        filename: result.filename.clone(),
        content_type: result.content_type,
        bytes,
    })
}

pub fn encode(data: &Dataset, format: ExportFormat) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Csv => to_csv(data),
        ExportFormat::Xlsx => to_xlsx(data),
    }
}

/// Header row plus one line per row. Missing cells are written as empty fields.
pub fn to_csv(data: &Dataset) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(data.column_names())?;

    for i in 0..data.n_rows() {
        writer.write_record(data.row(i).map(Cell::to_string))?;
    }

    writer
        .into_inner()
        .map_err(|e| EtlError::processing(format!("Failed to flush CSV output: {}", e)))
}

/// Minimal Office Open XML package: one worksheet, shared strings for text,
/// numeric cells for numbers, nothing written for missing cells.
pub fn to_xlsx(data: &Dataset) -> Result<Vec<u8>> {
    let mut strings = SharedStrings::default();
    let sheet = sheet_xml(data, &mut strings);

    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    let parts: [(&str, String); 7] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.to_string()),
        ("_rels/.rels", ROOT_RELS_XML.to_string()),
        ("xl/workbook.xml", workbook_xml()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS_XML.to_string()),
        ("xl/styles.xml", STYLES_XML.to_string()),
        ("xl/sharedStrings.xml", strings.to_xml()),
        ("xl/worksheets/sheet1.xml", sheet),
    ];

    for (name, body) in parts {
        zip.start_file(name, options)?;
        zip.write_all(body.as_bytes())?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

#[derive(Default)]
struct SharedStrings {
    index: HashMap<String, usize>,
    values: Vec<String>,
    references: usize,
}

impl SharedStrings {
    fn intern(&mut self, value: &str) -> usize {
        self.references += 1;
        if let Some(&idx) = self.index.get(value) {
            return idx;
        }
        let idx = self.values.len();
        self.values.push(value.to_string());
        self.index.insert(value.to_string(), idx);
        idx
    }

    fn to_xml(&self) -> String {
        let mut xml = String::from(XML_DECLARATION);
        let _ = write!(
            xml,
            r#"<sst xmlns="{}" count="{}" uniqueCount="{}">"#,
            SPREADSHEET_NS,
            self.references,
            self.values.len()
        );
        for value in &self.values {
            let _ = write!(xml, r#"<si><t xml:space="preserve">{}</t></si>"#, escape_xml(value));
        }
        xml.push_str("</sst>");
        xml
    }
}

fn sheet_xml(data: &Dataset, strings: &mut SharedStrings) -> String {
    let mut xml = String::from(XML_DECLARATION);
    let _ = write!(xml, r#"<worksheet xmlns="{}">"#, SPREADSHEET_NS);

    let last_col = column_letter(data.n_cols().saturating_sub(1));
    let _ = write!(xml, r#"<dimension ref="A1:{}{}"/>"#, last_col, data.n_rows() + 1);
    xml.push_str("<sheetData>");

    xml.push_str(r#"<row r="1">"#);
    for (col, name) in data.column_names().into_iter().enumerate() {
        let idx = strings.intern(name);
        let _ = write!(xml, r#"<c r="{}1" t="s"><v>{}</v></c>"#, column_letter(col), idx);
    }
    xml.push_str("</row>");

    for row in 0..data.n_rows() {
        let r = row + 2;
        let _ = write!(xml, r#"<row r="{}">"#, r);
        for (col, cell) in data.row(row).enumerate() {
            let reference = format!("{}{}", column_letter(col), r);
            match cell {
                Cell::Missing => {}
                Cell::Number(n) if n.is_finite() => {
                    let _ = write!(xml, r#"<c r="{}"><v>{}</v></c>"#, reference, n);
                }
                other => {
                    let idx = strings.intern(&other.to_string());
                    let _ = write!(xml, r#"<c r="{}" t="s"><v>{}</v></c>"#, reference, idx);
                }
            }
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

fn workbook_xml() -> String {
    format!(
        r#"{}<workbook xmlns="{}" xmlns:r="{}"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        XML_DECLARATION, SPREADSHEET_NS, RELATIONSHIP_NS, SHEET_NAME
    )
}

/// Zero-based column index to spreadsheet letters: 0 -> A, 25 -> Z, 26 -> AA.
pub fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(char::from(b'A' + (index % 26) as u8));
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().collect()
}

fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // XML 1.0 不允許的控制字元
            c if (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r') => {}
            c => out.push(c),
        }
    }
    out
}

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const SPREADSHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const RELATIONSHIP_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CONTENT_TYPES_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
    r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
    r#"<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#,
    r#"</Types>"#
);

const ROOT_RELS_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
    r#"</Relationships>"#
);

const WORKBOOK_RELS_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>"#,
    r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
    r#"<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>"#,
    r#"</Relationships>"#
);

const STYLES_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    r#"<fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>"#,
    r#"<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>"#,
    r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#,
    r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
    r#"<cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs>"#,
    r#"</styleSheet>"#
);

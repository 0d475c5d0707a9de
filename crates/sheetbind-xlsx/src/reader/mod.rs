//! XLSX reader

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::read_styles_xml;
use sheetbind_core::{CellAddress, CellRange, CellValue, Style, Workbook, Worksheet};

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// Excel uses this format to encode special characters in XML:
/// - `_x000d_` = CR (carriage return)
/// - `_x000a_` = LF (line feed)
/// - `_x005f_` = Underscore (escaped underscore)
fn decode_excel_escapes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find("_x") {
        result.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()))
            .filter(|_| candidate.as_bytes().get(6) == Some(&b'_'))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);

        match decoded {
            Some(c) => {
                result.push(c);
                rest = &candidate[7..];
            }
            None => {
                result.push_str("_x");
                rest = &candidate[2..];
            }
        }
    }
    result.push_str(rest);
    result
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.to_string()))
}

fn attr_flag(e: &BytesStart<'_>, key: &[u8]) -> Option<bool> {
    attr_value(e, key).map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

fn open_xml<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
) -> Option<Reader<Cursor<Vec<u8>>>> {
    let mut file = archive.by_name(name).ok()?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).ok()?;
    let mut reader = Reader::from_reader(Cursor::new(bytes));
    reader.trim_text(true);
    Some(reader)
}

/// Parsing state for one worksheet part
#[derive(Default)]
struct SheetState {
    cell_ref: Option<String>,
    cell_type: Option<String>,
    cell_style: u32,
    value: Option<String>,
    formula: Option<String>,
    in_value: bool,
    in_formula: bool,
    in_inline_text: bool,
    links: Vec<(String, String)>,
}

impl SheetState {
    fn open(&mut self, e: &BytesStart<'_>, worksheet: &mut Worksheet) -> XlsxResult<()> {
        match e.name().as_ref() {
            b"outlinePr" => {
                let below = attr_flag(e, b"summaryBelow").unwrap_or(true);
                let right = attr_flag(e, b"summaryRight").unwrap_or(true);
                worksheet.set_outline_summary(below, right);
            }
            b"pane" => {
                if attr_value(e, b"state").as_deref() == Some("frozen") {
                    let split = |key: &[u8]| {
                        attr_value(e, key)
                            .and_then(|v| v.parse::<f64>().ok())
                            .unwrap_or(0.0)
                    };
                    worksheet.set_freeze_pane(split(b"ySplit") as u32, split(b"xSplit") as u16);
                }
            }
            b"col" => {
                let min: u16 = attr_value(e, b"min").and_then(|v| v.parse().ok()).unwrap_or(1);
                let max: u16 = attr_value(e, b"max").and_then(|v| v.parse().ok()).unwrap_or(min);
                let width: Option<f64> = attr_value(e, b"width").and_then(|v| v.parse().ok());
                let custom = attr_flag(e, b"customWidth").unwrap_or(false);
                let best_fit = attr_flag(e, b"bestFit").unwrap_or(false);
                let level: u8 = attr_value(e, b"outlineLevel")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0);
                for n in min.max(1)..=max {
                    let col = n - 1;
                    if level > 0 {
                        worksheet.set_column_outline_level(col, level)?;
                    }
                    if best_fit {
                        worksheet.set_column_auto_size(col, true)?;
                    } else if let (true, Some(w)) = (custom, width) {
                        worksheet.set_column_width(col, w)?;
                    }
                }
            }
            b"row" => {
                let row: Option<u32> = attr_value(e, b"r").and_then(|v| v.parse().ok());
                let level: Option<u8> = attr_value(e, b"outlineLevel").and_then(|v| v.parse().ok());
                if let (Some(row), Some(level)) = (row, level) {
                    if row > 0 && level > 0 {
                        worksheet.set_row_outline_level(row - 1, level)?;
                    }
                }
            }
            b"c" => {
                self.cell_ref = attr_value(e, b"r");
                self.cell_type = attr_value(e, b"t");
                self.cell_style = attr_value(e, b"s").and_then(|v| v.parse().ok()).unwrap_or(0);
                self.value = None;
                self.formula = None;
            }
            b"v" => self.in_value = true,
            b"f" => self.in_formula = true,
            b"t" => self.in_inline_text = true,
            b"autoFilter" => {
                if let Some(range) = attr_value(e, b"ref") {
                    let parsed = CellRange::parse(&range).map_err(|err| {
                        XlsxError::Parse(format!("Invalid autoFilter '{}': {}", range, err))
                    })?;
                    worksheet.set_auto_filter(parsed);
                }
            }
            b"hyperlink" => {
                if let (Some(cell_ref), Some(r_id)) = (attr_value(e, b"ref"), attr_value(e, b"r:id"))
                {
                    self.links.push((cell_ref, r_id));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        if self.in_value || self.in_inline_text {
            self.value.get_or_insert_with(String::new).push_str(text);
        } else if self.in_formula {
            self.formula.get_or_insert_with(String::new).push_str(text);
        }
    }

    fn close(
        &mut self,
        name: &[u8],
        worksheet: &mut Worksheet,
        shared_strings: &[String],
        styles: &[Style],
    ) -> XlsxResult<()> {
        match name {
            b"c" => {
                if let Some(cell_ref) = self.cell_ref.take() {
                    XlsxReader::process_cell(
                        worksheet,
                        &cell_ref,
                        self.cell_type.as_deref(),
                        self.value.take().as_deref(),
                        self.formula.take().as_deref(),
                        self.cell_style,
                        shared_strings,
                        styles,
                    )?;
                }
            }
            b"v" => self.in_value = false,
            b"f" => self.in_formula = false,
            b"t" => self.in_inline_text = false,
            _ => {}
        }
        Ok(())
    }
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let file = File::open(path)?;
        Self::read(BufReader::new(file))
    }

    /// Read a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = zip::ZipArchive::new(reader)?;

        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let styles = match archive.by_name("xl/styles.xml") {
            Ok(file) => read_styles_xml(file)?,
            Err(_) => vec![Style::default()],
        };
        let (sheet_info, active_tab) = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_rels(&mut archive, "xl/_rels/workbook.xml.rels", "xl/")?
            .ok_or_else(|| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let mut workbook = Workbook::empty();
        for (name, r_id) in &sheet_info {
            let Some((path, _)) = sheet_paths.get(r_id) else {
                continue;
            };
            let index = workbook.add_worksheet_with_name(name)?;
            let sheet = workbook
                .worksheet_mut(index)
                .ok_or(XlsxError::Core(sheetbind_core::Error::SheetOutOfBounds(index, index)))?;
            Self::read_worksheet(&mut archive, path, sheet, &shared_strings, &styles)?;
        }

        if workbook.is_empty() {
            workbook.add_worksheet()?;
        }
        if active_tab < workbook.sheet_count() {
            workbook.set_active_sheet(active_tab)?;
        }
        Self::read_doc_props(&mut archive, &mut workbook)?;

        Ok(workbook)
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();
        let Some(mut xml_reader) = open_xml(archive, "xl/sharedStrings.xml") else {
            return Ok(strings);
        };

        let mut buf = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
                    }
                    b"t" if in_si => in_t = true,
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current_string));
                        in_si = false;
                    }
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    if let Ok(text) = e.unescape() {
                        current_string.push_str(&text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    /// Sheet names with their relationship ids, plus the active tab
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<(Vec<(String, String)>, usize)> {
        let mut xml_reader = open_xml(archive, "xl/workbook.xml")
            .ok_or_else(|| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let mut buf = Vec::new();
        let mut sheets = Vec::new();
        let mut active_tab = 0;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"sheet" => {
                        if let (Some(name), Some(r_id)) =
                            (attr_value(&e, b"name"), attr_value(&e, b"r:id"))
                        {
                            sheets.push((name, r_id));
                        }
                    }
                    b"workbookView" => {
                        active_tab = attr_value(&e, b"activeTab")
                            .and_then(|v| v.parse().ok())
                            .unwrap_or(0);
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok((sheets, active_tab))
    }

    /// Relationship id -> (resolved target, type suffix)
    ///
    /// Internal targets are resolved against `base`; external ones are kept verbatim.
    fn read_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        part: &str,
        base: &str,
    ) -> XlsxResult<Option<HashMap<String, (String, String)>>> {
        let Some(mut xml_reader) = open_xml(archive, part) else {
            return Ok(None);
        };

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let id = attr_value(&e, b"Id");
                    let target = attr_value(&e, b"Target");
                    let rel_type = attr_value(&e, b"Type");
                    let external = attr_value(&e, b"TargetMode").as_deref() == Some("External");

                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        let kind = rel_type.rsplit('/').next().unwrap_or_default().to_string();
                        let full = if external {
                            target
                        } else if let Some(stripped) = target.strip_prefix('/') {
                            stripped.to_string()
                        } else {
                            format!("{}{}", base, target)
                        };
                        rels.insert(id, (full, kind));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(Some(rels))
    }

    /// Read a worksheet from the archive
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        worksheet: &mut Worksheet,
        shared_strings: &[String],
        styles: &[Style],
    ) -> XlsxResult<()> {
        let mut xml_reader =
            open_xml(archive, path).ok_or_else(|| XlsxError::MissingPart(path.to_string()))?;

        let mut buf = Vec::new();
        let mut state = SheetState::default();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => state.open(&e, worksheet)?,
                Ok(Event::Empty(e)) => {
                    state.open(&e, worksheet)?;
                    state.close(e.name().as_ref(), worksheet, shared_strings, styles)?;
                }
                Ok(Event::End(e)) => {
                    state.close(e.name().as_ref(), worksheet, shared_strings, styles)?
                }
                Ok(Event::Text(t)) => state.text(&t.unescape()?),
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        if !state.links.is_empty() {
            let (dir, file) = path.rsplit_once('/').unwrap_or(("", path));
            let rels_part = format!("{}/_rels/{}.rels", dir, file);
            let rels = Self::read_rels(archive, &rels_part, "")?.unwrap_or_default();
            for (cell_ref, r_id) in state.links {
                let (Some((url, _)), Ok(addr)) = (rels.get(&r_id), CellAddress::parse(&cell_ref))
                else {
                    continue;
                };
                worksheet.set_hyperlink_at(addr.row, addr.col, url.clone())?;
            }
        }

        Ok(())
    }

    /// Process a cell and add it to the worksheet
    #[allow(clippy::too_many_arguments)]
    fn process_cell(
        worksheet: &mut Worksheet,
        cell_ref: &str,
        cell_type: Option<&str>,
        value: Option<&str>,
        formula: Option<&str>,
        style_idx: u32,
        shared_strings: &[String],
        styles: &[Style],
    ) -> XlsxResult<()> {
        let addr = CellAddress::parse(cell_ref).map_err(|e| {
            XlsxError::Parse(format!("Invalid cell reference '{}': {}", cell_ref, e))
        })?;

        let cell_value = if let Some(f) = formula {
            CellValue::formula(f)
        } else if let Some(value) = value {
            match cell_type {
                Some("s") => {
                    let idx: usize = value.parse().map_err(|_| {
                        XlsxError::Parse(format!("Invalid shared string index: {}", value))
                    })?;
                    let s = shared_strings.get(idx).ok_or_else(|| {
                        XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                    })?;
                    CellValue::String(s.clone())
                }
                Some("b") => CellValue::Boolean(value == "1" || value.eq_ignore_ascii_case("true")),
                Some("e") => CellValue::Error(value.to_string()),
                Some("inlineStr") | Some("str") => CellValue::String(decode_excel_escapes(value)),
                None | Some("n") => match value.parse::<f64>() {
                    Ok(n) => CellValue::Number(n),
                    Err(_) => CellValue::String(value.to_string()),
                },
                Some(_) => CellValue::String(value.to_string()),
            }
        } else {
            CellValue::Empty
        };

        if !cell_value.is_empty() {
            worksheet.set_cell_value_at(addr.row, addr.col, cell_value)?;
        }

        if style_idx != 0 {
            let style = styles.get(style_idx as usize).ok_or_else(|| {
                XlsxError::Parse(format!("Style index {} out of bounds", style_idx))
            })?;
            worksheet.set_cell_style_at(addr.row, addr.col, style)?;
        }

        Ok(())
    }

    fn read_doc_props<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        workbook: &mut Workbook,
    ) -> XlsxResult<()> {
        for part in ["docProps/core.xml", "docProps/app.xml"] {
            let Some(mut xml_reader) = open_xml(archive, part) else {
                continue;
            };
            let mut buf = Vec::new();
            let mut current: Option<Vec<u8>> = None;

            loop {
                match xml_reader.read_event_into(&mut buf) {
                    Ok(Event::Start(e)) => current = Some(e.name().as_ref().to_vec()),
                    Ok(Event::End(_)) => current = None,
                    Ok(Event::Text(t)) => {
                        let text = t.unescape().map_err(XlsxError::Xml)?.to_string();
                        let props = workbook.properties_mut();
                        match current.as_deref() {
                            Some(b"dc:title") => props.title = Some(text),
                            Some(b"dc:creator") => props.creator = Some(text),
                            Some(b"Company") => props.company = Some(text),
                            _ => {}
                        }
                    }
                    Ok(Event::Eof) => break,
                    Err(e) => return Err(XlsxError::Xml(e)),
                    _ => {}
                }
                buf.clear();
            }
        }
        Ok(())
    }
}

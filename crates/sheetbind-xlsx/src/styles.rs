//! XLSX styles (styles.xml) read/write helpers

use std::collections::HashMap;
use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::xml::escape_xml;
use sheetbind_core::style::{
    Alignment, Color, FillStyle, FontStyle, HorizontalAlignment, NumberFormat, Style,
    VerticalAlignment,
};
use sheetbind_core::Workbook;

// === Writing ===

/// Workbook-wide cellXfs table built from the per-sheet style pools
#[derive(Debug)]
pub(crate) struct XlsxStyleTable {
    /// Global, deduplicated styles. Index corresponds to the cellXfs index (xfId).
    styles: Vec<Style>,
    /// Per-worksheet mapping: local worksheet style index -> global xfId.
    sheet_maps: Vec<HashMap<u32, u32>>,
}

impl XlsxStyleTable {
    pub(crate) fn build(workbook: &Workbook) -> Self {
        let mut styles: Vec<Style> = vec![Style::default()];
        let mut style_to_xf: HashMap<Style, u32> = HashMap::new();
        style_to_xf.insert(Style::default(), 0);

        let mut sheet_maps = Vec::with_capacity(workbook.sheet_count());
        for sheet in workbook.worksheets() {
            let mut map: HashMap<u32, u32> = HashMap::new();
            for (local_idx, style) in sheet.style_pool().iter() {
                let xf_id = match style_to_xf.get(style) {
                    Some(&id) => id,
                    None => {
                        let id = styles.len() as u32;
                        styles.push(style.clone());
                        style_to_xf.insert(style.clone(), id);
                        id
                    }
                };
                map.insert(local_idx, xf_id);
            }
            sheet_maps.push(map);
        }

        Self { styles, sheet_maps }
    }

    pub(crate) fn xf_id_for(&self, sheet_index: usize, local_style_index: u32) -> u32 {
        self.sheet_maps
            .get(sheet_index)
            .and_then(|m| m.get(&local_style_index).copied())
            .unwrap_or(0)
    }

    pub(crate) fn to_styles_xml(&self) -> String {
        styles_xml(&self.styles)
    }
}

#[derive(Debug, Clone, Copy)]
struct ResolvedXfIds {
    font_id: u32,
    fill_id: u32,
    num_fmt_id: u32,
}

/// Render styles.xml where `styles[i]` becomes cellXfs entry `i`
pub(crate) fn styles_xml(styles: &[Style]) -> String {
    let mut font_ids: HashMap<FontStyle, u32> = HashMap::new();
    let mut fonts: Vec<FontStyle> = vec![FontStyle::default()];
    font_ids.insert(FontStyle::default(), 0);

    // Excel requires the first two fills to be: none and gray125
    let mut fill_ids: HashMap<FillStyle, u32> = HashMap::new();
    let mut fills: Vec<FillStyle> = Vec::new();

    let mut numfmt_ids: HashMap<String, u32> = HashMap::new();
    let mut numfmts: Vec<(u32, String)> = Vec::new();
    let mut next_numfmt_id = NumberFormat::FIRST_CUSTOM_ID;

    let mut resolved: Vec<ResolvedXfIds> = Vec::with_capacity(styles.len().max(1));
    let default_style = [Style::default()];
    let styles = if styles.is_empty() { &default_style[..] } else { styles };

    for style in styles {
        let font_id = match font_ids.get(&style.font) {
            Some(&id) => id,
            None => {
                let id = fonts.len() as u32;
                fonts.push(style.font.clone());
                font_ids.insert(style.font.clone(), id);
                id
            }
        };

        let fill_id = match style.fill {
            FillStyle::None => 0,
            other => match fill_ids.get(&other) {
                Some(&id) => id,
                None => {
                    let id = fills.len() as u32 + 2;
                    fills.push(other);
                    fill_ids.insert(other, id);
                    id
                }
            },
        };

        let num_fmt_id = match &style.number_format {
            NumberFormat::General => 0,
            NumberFormat::BuiltIn(id) => *id,
            NumberFormat::Custom(code) => match numfmt_ids.get(code) {
                Some(&id) => id,
                None => {
                    let id = next_numfmt_id;
                    next_numfmt_id += 1;
                    numfmt_ids.insert(code.clone(), id);
                    numfmts.push((id, code.clone()));
                    id
                }
            },
        };

        resolved.push(ResolvedXfIds {
            font_id,
            fill_id,
            num_fmt_id,
        });
    }

    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    );

    if !numfmts.is_empty() {
        xml.push_str(&format!("\n  <numFmts count=\"{}\">", numfmts.len()));
        for (id, code) in &numfmts {
            xml.push_str(&format!(
                "\n    <numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
                id,
                escape_xml(code)
            ));
        }
        xml.push_str("\n  </numFmts>");
    }

    xml.push_str(&format!("\n  <fonts count=\"{}\">", fonts.len()));
    for font in &fonts {
        xml.push_str("\n    ");
        xml.push_str(&write_font(font));
    }
    xml.push_str("\n  </fonts>");

    xml.push_str(&format!("\n  <fills count=\"{}\">", fills.len() + 2));
    xml.push_str("\n    <fill><patternFill patternType=\"none\"/></fill>");
    xml.push_str("\n    <fill><patternFill patternType=\"gray125\"/></fill>");
    for fill in &fills {
        xml.push_str("\n    ");
        xml.push_str(&write_fill(fill));
    }
    xml.push_str("\n  </fills>");

    xml.push_str(
        r#"
  <borders count="1">
    <border><left/><right/><top/><bottom/><diagonal/></border>
  </borders>
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
  </cellStyleXfs>"#,
    );

    xml.push_str(&format!("\n  <cellXfs count=\"{}\">", styles.len()));
    for (style, ids) in styles.iter().zip(&resolved) {
        xml.push_str("\n    ");
        xml.push_str(&write_xf(style, *ids));
    }
    xml.push_str("\n  </cellXfs>");

    xml.push_str(
        r#"
  <cellStyles count="1">
    <cellStyle name="Normal" xfId="0" builtinId="0"/>
  </cellStyles>
  <dxfs count="0"/>
  <tableStyles count="0" defaultTableStyle="TableStyleMedium9" defaultPivotStyle="PivotStyleLight16"/>
</styleSheet>"#,
    );
    xml
}

fn write_color(tag: &str, color: &Color) -> String {
    match color {
        Color::Auto => format!("<{tag} indexed=\"64\"/>"),
        Color::Rgb { .. } => format!("<{tag} rgb=\"{}\"/>", color.to_argb_hex()),
    }
}

fn write_font(font: &FontStyle) -> String {
    let mut s = String::from("<font>");
    if font.bold {
        s.push_str("<b/>");
    }
    if font.italic {
        s.push_str("<i/>");
    }
    if font.underline {
        s.push_str("<u/>");
    }
    s.push_str(&format!("<sz val=\"{}\"/>", font.size));
    if !font.color.is_auto() {
        s.push_str(&write_color("color", &font.color));
    }
    s.push_str(&format!("<name val=\"{}\"/>", escape_xml(&font.name)));
    s.push_str("</font>");
    s
}

fn write_fill(fill: &FillStyle) -> String {
    match fill {
        FillStyle::None => "<fill><patternFill patternType=\"none\"/></fill>".to_string(),
        FillStyle::Solid(color) => format!(
            "<fill><patternFill patternType=\"solid\">{}<bgColor indexed=\"64\"/></patternFill></fill>",
            write_color("fgColor", color)
        ),
    }
}

fn write_alignment(al: &Alignment) -> String {
    let default = Alignment::default();
    if al == &default {
        return String::new();
    }

    let mut s = String::from("<alignment");
    if al.horizontal != default.horizontal {
        s.push_str(&format!(" horizontal=\"{}\"", al.horizontal.as_str()));
    }
    if al.vertical != default.vertical {
        s.push_str(&format!(" vertical=\"{}\"", al.vertical.as_str()));
    }
    if al.wrap_text {
        s.push_str(" wrapText=\"1\"");
    }
    s.push_str("/>");
    s
}

fn write_xf(style: &Style, ids: ResolvedXfIds) -> String {
    let mut attrs = String::new();
    if ids.num_fmt_id != 0 {
        attrs.push_str(" applyNumberFormat=\"1\"");
    }
    if style.font != FontStyle::default() {
        attrs.push_str(" applyFont=\"1\"");
    }
    if !style.fill.is_none() {
        attrs.push_str(" applyFill=\"1\"");
    }
    if style.alignment != Alignment::default() {
        attrs.push_str(" applyAlignment=\"1\"");
    }

    let mut s = format!(
        "<xf numFmtId=\"{}\" fontId=\"{}\" fillId=\"{}\" borderId=\"0\" xfId=\"0\"{}",
        ids.num_fmt_id, ids.font_id, ids.fill_id, attrs
    );

    let alignment_xml = write_alignment(&style.alignment);
    if alignment_xml.is_empty() {
        s.push_str("/>");
    } else {
        s.push('>');
        s.push_str(&alignment_xml);
        s.push_str("</xf>");
    }
    s
}

// === Reading ===

#[derive(Default)]
struct StylesParser {
    numfmts: HashMap<u32, String>,
    fonts: Vec<FontStyle>,
    fills: Vec<FillStyle>,
    cell_xfs: Vec<Style>,

    current_font: Option<FontStyle>,
    current_fill: Option<FillStyle>,
    solid_pattern: bool,
    current_xf: Option<Style>,
    in_cell_xfs: bool,
}

impl StylesParser {
    fn open(&mut self, e: &BytesStart<'_>) {
        match e.name().as_ref() {
            b"numFmt" => {
                let id = attr_value(e, b"numFmtId").and_then(|v| v.parse().ok());
                let code = attr_value(e, b"formatCode");
                if let (Some(id), Some(code)) = (id, code) {
                    self.numfmts.insert(id, code);
                }
            }
            b"font" => self.current_font = Some(FontStyle::default()),
            b"b" => self.with_font(|f| f.bold = true),
            b"i" => self.with_font(|f| f.italic = true),
            b"u" => self.with_font(|f| f.underline = true),
            b"sz" => {
                if let Some(size) = attr_value(e, b"val").and_then(|v| v.parse().ok()) {
                    self.with_font(|f| f.size = size);
                }
            }
            b"name" => {
                if let Some(name) = attr_value(e, b"val") {
                    self.with_font(|f| f.name = name);
                }
            }
            b"color" => {
                let color = parse_color(e);
                self.with_font(|f| f.color = color);
            }
            b"fill" => {
                self.current_fill = Some(FillStyle::None);
                self.solid_pattern = false;
            }
            b"patternFill" => {
                self.solid_pattern = attr_value(e, b"patternType").as_deref() == Some("solid");
            }
            b"fgColor" if self.solid_pattern => {
                self.current_fill = Some(FillStyle::Solid(parse_color(e)));
            }
            b"cellXfs" => self.in_cell_xfs = true,
            b"xf" if self.in_cell_xfs => {
                let id = |key: &[u8]| {
                    attr_value(e, key)
                        .and_then(|v| v.parse::<u32>().ok())
                        .unwrap_or(0)
                };
                let num_fmt_id = id(b"numFmtId");
                let mut style = Style::default();
                style.font = self.fonts.get(id(b"fontId") as usize).cloned().unwrap_or_default();
                style.fill = self.fills.get(id(b"fillId") as usize).copied().unwrap_or_default();
                style.number_format = if num_fmt_id == 0 {
                    NumberFormat::General
                } else if let Some(code) = self.numfmts.get(&num_fmt_id) {
                    NumberFormat::Custom(code.clone())
                } else {
                    NumberFormat::BuiltIn(num_fmt_id)
                };
                self.current_xf = Some(style);
            }
            b"alignment" => {
                if let Some(style) = self.current_xf.as_mut() {
                    let al = &mut style.alignment;
                    if let Some(h) = attr_value(e, b"horizontal").and_then(|v| HorizontalAlignment::parse(&v)) {
                        al.horizontal = h;
                    }
                    if let Some(v) = attr_value(e, b"vertical").and_then(|v| VerticalAlignment::parse(&v)) {
                        al.vertical = v;
                    }
                    al.wrap_text = attr_value(e, b"wrapText").as_deref() == Some("1");
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"font" => {
                if let Some(font) = self.current_font.take() {
                    self.fonts.push(font);
                }
            }
            b"fill" => {
                if let Some(fill) = self.current_fill.take() {
                    self.fills.push(fill);
                }
            }
            b"xf" => {
                if let Some(style) = self.current_xf.take() {
                    self.cell_xfs.push(style);
                }
            }
            b"cellXfs" => self.in_cell_xfs = false,
            _ => {}
        }
    }

    fn with_font(&mut self, f: impl FnOnce(&mut FontStyle)) {
        if let Some(font) = self.current_font.as_mut() {
            f(font);
        }
    }
}

/// Parse styles.xml into the cellXfs list (index = `s` attribute of a cell)
pub(crate) fn read_styles_xml<R: Read>(reader: R) -> XlsxResult<Vec<Style>> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut parser = StylesParser::default();

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => parser.open(&e),
            Ok(Event::Empty(e)) => {
                parser.open(&e);
                parser.close(e.name().as_ref());
            }
            Ok(Event::End(e)) => parser.close(e.name().as_ref()),
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    if parser.cell_xfs.is_empty() {
        parser.cell_xfs.push(Style::default());
    }
    Ok(parser.cell_xfs)
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.to_string()))
}

fn parse_color(e: &BytesStart<'_>) -> Color {
    attr_value(e, b"rgb")
        .and_then(|v| Color::from_hex(&v))
        .unwrap_or(Color::Auto)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn header_style() -> Style {
        Style::new()
            .font_name("Arial")
            .font_size(8.0)
            .bold(true)
            .font_color(Color::rgb(0, 0, 0))
            .fill_color(Color::rgb(0xB8, 0xCC, 0xE4))
            .wrap_text(true)
            .horizontal_alignment(HorizontalAlignment::Center)
            .vertical_alignment(VerticalAlignment::Center)
    }

    #[test]
    fn test_styles_xml_structure() {
        let styles = vec![
            Style::default(),
            header_style(),
            Style::new().number_format("#,##0.00"),
            Style::new().number_format("#,##0.00"),
        ];
        let xml = styles_xml(&styles);

        assert!(xml.contains("<numFmts count=\"1\">"));
        assert!(xml.contains("<numFmt numFmtId=\"164\" formatCode=\"#,##0.00\"/>"));
        assert!(xml.contains("<fills count=\"3\">"));
        assert!(xml.contains("<fgColor rgb=\"FFB8CCE4\"/>"));
        assert!(xml.contains("<cellXfs count=\"4\">"));
        assert!(xml.contains("<alignment horizontal=\"center\" vertical=\"center\" wrapText=\"1\"/>"));
    }

    #[test]
    fn test_styles_roundtrip() {
        let styles = vec![
            Style::default(),
            header_style(),
            Style::new().number_format("m/d/yyyy"),
            Style::new().fill_color(Color::rgb(255, 0, 0)).italic(true),
        ];
        let xml = styles_xml(&styles);
        let parsed = read_styles_xml(xml.as_bytes()).unwrap();
        assert_eq!(parsed, styles);
    }

    #[test]
    fn test_empty_styles_xml() {
        let parsed = read_styles_xml(&b"<styleSheet/>"[..]).unwrap();
        assert_eq!(parsed, vec![Style::default()]);
    }
}

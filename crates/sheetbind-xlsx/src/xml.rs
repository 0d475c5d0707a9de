//! Worksheet XML fragments shared by both writers

use sheetbind_core::{CellAddress, CellValue, Column, FreezePane};

// Characters XML 1.0 does not allow, even as character references
fn is_xml_forbidden(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}')
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&apos;"),
        c => out.push(c),
    }
}

/// Escape markup characters; characters XML cannot carry are dropped
pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars().filter(|c| !is_xml_forbidden(*c)) {
        push_escaped(&mut out, c);
    }
    out
}

/// Escape cell text, writing characters XML cannot carry as Excel's
/// `_xHHHH_` sequences. An underscore that would start such a sequence is
/// itself written as `_x005F_`.
pub(crate) fn escape_cell_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '_' if chars.peek() == Some(&'x') => out.push_str("_x005F_"),
            c if is_xml_forbidden(c) => out.push_str(&format!("_x{:04X}_", c as u32)),
            c => push_escaped(&mut out, c),
        }
    }
    out
}

pub(crate) const WORKSHEET_OPEN: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#;

/// Append a `<c>` element. Empty unstyled cells are skipped.
pub(crate) fn push_cell(content: &mut String, row: u32, col: u16, value: &CellValue, xf_id: u32) {
    let cell_ref = CellAddress::new(row, col).to_a1_string();
    let style_attr = if xf_id != 0 {
        format!(" s=\"{}\"", xf_id)
    } else {
        String::new()
    };

    match value {
        CellValue::Number(n) => {
            content.push_str(&format!(
                "\n            <c r=\"{}\"{}><v>{}</v></c>",
                cell_ref, style_attr, n
            ));
        }
        CellValue::String(s) => {
            content.push_str(&format!(
                "\n            <c r=\"{}\"{} t=\"inlineStr\"><is><t xml:space=\"preserve\">{}</t></is></c>",
                cell_ref,
                style_attr,
                escape_cell_text(s)
            ));
        }
        CellValue::Boolean(b) => {
            content.push_str(&format!(
                "\n            <c r=\"{}\"{} t=\"b\"><v>{}</v></c>",
                cell_ref,
                style_attr,
                if *b { 1 } else { 0 }
            ));
        }
        CellValue::Formula(text) => {
            content.push_str(&format!(
                "\n            <c r=\"{}\"{}><f>{}</f></c>",
                cell_ref,
                style_attr,
                escape_xml(text)
            ));
        }
        CellValue::Error(e) => {
            content.push_str(&format!(
                "\n            <c r=\"{}\"{} t=\"e\"><v>{}</v></c>",
                cell_ref,
                style_attr,
                escape_xml(e)
            ));
        }
        CellValue::Empty => {
            if xf_id != 0 {
                content.push_str(&format!("\n            <c r=\"{}\"{}/>", cell_ref, style_attr));
            }
        }
    }
}

/// `<sheetPr>` carrying the outline summary placement, if not the default
pub(crate) fn push_sheet_pr(content: &mut String, summary_below: bool, summary_right: bool) {
    if summary_below && summary_right {
        return;
    }
    content.push_str(&format!(
        "\n    <sheetPr><outlinePr summaryBelow=\"{}\" summaryRight=\"{}\"/></sheetPr>",
        summary_below as u8, summary_right as u8
    ));
}

pub(crate) fn push_sheet_views(content: &mut String, selected: bool, pane: Option<&FreezePane>) {
    let tab_selected = if selected { " tabSelected=\"1\"" } else { "" };
    let Some(pane) = pane else {
        content.push_str(&format!(
            "\n    <sheetViews>\n        <sheetView workbookViewId=\"0\"{}/>\n    </sheetViews>",
            tab_selected
        ));
        return;
    };

    let mut attrs = String::new();
    if pane.col > 0 {
        attrs.push_str(&format!(" xSplit=\"{}\"", pane.col));
    }
    if pane.row > 0 {
        attrs.push_str(&format!(" ySplit=\"{}\"", pane.row));
    }
    let active = match (pane.row > 0, pane.col > 0) {
        (true, true) => "bottomRight",
        (true, false) => "bottomLeft",
        _ => "topRight",
    };
    let top_left = CellAddress::new(pane.row, pane.col).to_a1_string();
    content.push_str(&format!(
        "\n    <sheetViews>\n        <sheetView workbookViewId=\"0\"{}>\n            <pane{} topLeftCell=\"{}\" activePane=\"{}\" state=\"frozen\"/>\n            <selection pane=\"{}\" activeCell=\"{}\" sqref=\"{}\"/>\n        </sheetView>\n    </sheetViews>",
        tab_selected, attrs, top_left, active, active, top_left, top_left
    ));
}

pub(crate) fn push_sheet_format(content: &mut String, outline_row: u8, outline_col: u8) {
    let mut attrs = String::new();
    if outline_row > 0 {
        attrs.push_str(&format!(" outlineLevelRow=\"{}\"", outline_row));
    }
    if outline_col > 0 {
        attrs.push_str(&format!(" outlineLevelCol=\"{}\"", outline_col));
    }
    content.push_str(&format!(
        "\n    <sheetFormatPr defaultRowHeight=\"15\"{}/>",
        attrs
    ));
}

/// `<cols>` for columns with custom settings; `width` supplies the emitted width
pub(crate) fn push_cols<'a, I, F>(content: &mut String, columns: I, width: F)
where
    I: IntoIterator<Item = &'a Column>,
    F: Fn(&Column) -> f64,
{
    let mut body = String::new();
    for column in columns {
        if !column.has_custom_settings() {
            continue;
        }
        let n = column.index as u32 + 1;
        let mut attrs = format!(" min=\"{}\" max=\"{}\" width=\"{}\"", n, n, width(column));
        if column.width.is_some() || column.best_fit {
            attrs.push_str(" customWidth=\"1\"");
        }
        if column.best_fit {
            attrs.push_str(" bestFit=\"1\"");
        }
        if column.hidden {
            attrs.push_str(" hidden=\"1\"");
        }
        if column.outline_level > 0 {
            attrs.push_str(&format!(" outlineLevel=\"{}\"", column.outline_level));
        }
        body.push_str(&format!("\n        <col{}/>", attrs));
    }
    if !body.is_empty() {
        content.push_str("\n    <cols>");
        content.push_str(&body);
        content.push_str("\n    </cols>");
    }
}

/// Open a `<row>` element
pub(crate) fn push_row_open(content: &mut String, row: u32, outline_level: u8) {
    if outline_level > 0 {
        content.push_str(&format!(
            "\n        <row r=\"{}\" outlineLevel=\"{}\">",
            row + 1,
            outline_level
        ));
    } else {
        content.push_str(&format!("\n        <row r=\"{}\">", row + 1));
    }
}

/// `<hyperlinks>`; link `i` points at relationship `rId{i+1}`
pub(crate) fn push_hyperlinks<'a, I>(content: &mut String, links: I)
where
    I: IntoIterator<Item = (u32, u16, &'a str)>,
{
    let mut body = String::new();
    for (i, (row, col, _)) in links.into_iter().enumerate() {
        body.push_str(&format!(
            "\n        <hyperlink ref=\"{}\" r:id=\"rId{}\"/>",
            CellAddress::new(row, col).to_a1_string(),
            i + 1
        ));
    }
    if !body.is_empty() {
        content.push_str("\n    <hyperlinks>");
        content.push_str(&body);
        content.push_str("\n    </hyperlinks>");
    }
}

/// Relationship part for a sheet's external hyperlinks
pub(crate) fn hyperlink_rels<'a, I>(links: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut content = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (i, url) in links.into_iter().enumerate() {
        content.push_str(&format!(
            "\n    <Relationship Id=\"rId{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink\" Target=\"{}\" TargetMode=\"External\"/>",
            i + 1,
            escape_xml(url)
        ));
    }
    content.push_str("\n</Relationships>");
    content
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
        assert_eq!(escape_xml("bell\u{7}"), "bell");
    }

    #[test]
    fn test_escape_cell_text() {
        assert_eq!(escape_cell_text("line\u{1}\u{b}tab\t"), "line_x0001__x000B_tab\t");
        assert_eq!(escape_cell_text("a\r\nb"), "a\r\nb");
        assert_eq!(escape_cell_text("_x0041_ & snake_case"), "_x005F_x0041_ &amp; snake_case");
    }

    #[test]
    fn test_cells() {
        let mut out = String::new();
        push_cell(&mut out, 0, 0, &CellValue::Number(1.5), 0);
        push_cell(&mut out, 0, 1, &CellValue::string("x<y"), 2);
        push_cell(&mut out, 0, 2, &CellValue::Boolean(true), 0);
        push_cell(&mut out, 0, 3, &CellValue::formula("=A1*2"), 0);
        push_cell(&mut out, 0, 4, &CellValue::Empty, 0);

        assert!(out.contains("<c r=\"A1\"><v>1.5</v></c>"));
        assert!(out.contains("<c r=\"B1\" s=\"2\" t=\"inlineStr\"><is><t xml:space=\"preserve\">x&lt;y</t></is></c>"));
        assert!(out.contains("<c r=\"C1\" t=\"b\"><v>1</v></c>"));
        assert!(out.contains("<c r=\"D1\"><f>A1*2</f></c>"));
        assert!(!out.contains("E1"));
    }

    #[test]
    fn test_frozen_pane() {
        let mut out = String::new();
        push_sheet_views(&mut out, true, Some(&FreezePane { row: 1, col: 0 }));
        assert!(out.contains("tabSelected=\"1\""));
        assert!(out.contains("<pane ySplit=\"1\" topLeftCell=\"A2\" activePane=\"bottomLeft\" state=\"frozen\"/>"));
    }
}

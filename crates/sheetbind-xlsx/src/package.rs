//! Package-level parts: content types, relationships, workbook.xml, docProps

use std::io::{Seek, Write};

use sheetbind_core::DocumentProperties;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::XlsxResult;
use crate::xml::escape_xml;

/// What the package parts need to know about one sheet
pub(crate) struct SheetEntry<'a> {
    pub name: &'a str,
}

/// Write every part except styles.xml and the worksheets themselves
pub(crate) fn write_package_parts<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    sheets: &[SheetEntry<'_>],
    active_sheet: usize,
    properties: Option<&DocumentProperties>,
) -> XlsxResult<()> {
    let properties = properties.filter(|p| !p.is_empty());
    write_content_types(zip, sheets.len(), properties.is_some())?;
    write_root_rels(zip, properties.is_some())?;
    write_workbook_xml(zip, sheets, active_sheet)?;
    write_workbook_rels(zip, sheets.len())?;
    if let Some(props) = properties {
        write_doc_props(zip, props)?;
    }
    Ok(())
}

pub(crate) fn write_sheet_rels<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    index: usize,
    rels: &str,
) -> XlsxResult<()> {
    zip.start_file(
        format!("xl/worksheets/_rels/sheet{}.xml.rels", index + 1),
        SimpleFileOptions::default(),
    )?;
    zip.write_all(rels.as_bytes())?;
    Ok(())
}

fn write_content_types<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    sheet_count: usize,
    doc_props: bool,
) -> XlsxResult<()> {
    zip.start_file("[Content_Types].xml", SimpleFileOptions::default())?;

    let mut content = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
    );

    for i in 0..sheet_count {
        content.push_str(&format!(
            r#"
    <Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            i + 1
        ));
    }

    if doc_props {
        content.push_str(
            r#"
    <Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
    <Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#,
        );
    }

    content.push_str("\n</Types>");
    zip.write_all(content.as_bytes())?;
    Ok(())
}

fn write_root_rels<W: Write + Seek>(zip: &mut ZipWriter<W>, doc_props: bool) -> XlsxResult<()> {
    zip.start_file("_rels/.rels", SimpleFileOptions::default())?;

    let mut content = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
    );
    if doc_props {
        content.push_str(
            r#"
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
    <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>"#,
        );
    }
    content.push_str("\n</Relationships>");

    zip.write_all(content.as_bytes())?;
    Ok(())
}

fn write_workbook_xml<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    sheets: &[SheetEntry<'_>],
    active_sheet: usize,
) -> XlsxResult<()> {
    zip.start_file("xl/workbook.xml", SimpleFileOptions::default())?;

    let mut content = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <bookViews>
        <workbookView activeTab="{}"/>
    </bookViews>
    <sheets>"#,
        active_sheet
    );

    for (i, sheet) in sheets.iter().enumerate() {
        content.push_str(&format!(
            r#"
        <sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            escape_xml(sheet.name),
            i + 1,
            i + 1
        ));
    }

    content.push_str(
        r#"
    </sheets>
</workbook>"#,
    );

    zip.write_all(content.as_bytes())?;
    Ok(())
}

fn write_workbook_rels<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    sheet_count: usize,
) -> XlsxResult<()> {
    zip.start_file("xl/_rels/workbook.xml.rels", SimpleFileOptions::default())?;

    let mut content = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );

    for i in 0..sheet_count {
        content.push_str(&format!(
            r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            i + 1,
            i + 1
        ));
    }

    content.push_str(&format!(
        r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#,
        sheet_count + 1
    ));

    zip.write_all(content.as_bytes())?;
    Ok(())
}

fn write_doc_props<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    props: &DocumentProperties,
) -> XlsxResult<()> {
    let options = SimpleFileOptions::default();

    zip.start_file("docProps/core.xml", options)?;
    let mut core = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
    );
    if let Some(title) = &props.title {
        core.push_str(&format!("\n    <dc:title>{}</dc:title>", escape_xml(title)));
    }
    if let Some(creator) = &props.creator {
        core.push_str(&format!("\n    <dc:creator>{}</dc:creator>", escape_xml(creator)));
    }
    core.push_str("\n</cp:coreProperties>");
    zip.write_all(core.as_bytes())?;

    zip.start_file("docProps/app.xml", options)?;
    let mut app = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">
    <Application>sheetbind</Application>"#,
    );
    if let Some(company) = &props.company {
        app.push_str(&format!("\n    <Company>{}</Company>", escape_xml(company)));
    }
    app.push_str("\n</Properties>");
    zip.write_all(app.as_bytes())?;

    Ok(())
}

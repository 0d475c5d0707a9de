//! XLSX writer for in-memory workbooks

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use sheetbind_core::worksheet::DEFAULT_COLUMN_WIDTH;
use sheetbind_core::{Workbook, Worksheet};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::{XlsxError, XlsxResult};
use crate::package::{write_package_parts, write_sheet_rels, SheetEntry};
use crate::styles::XlsxStyleTable;
use crate::xml;

/// XLSX file writer
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write a workbook to a file path
    pub fn write_file<P: AsRef<Path>>(workbook: &Workbook, path: P) -> XlsxResult<()> {
        let file = File::create(path)?;
        Self::write(workbook, BufWriter::new(file))
    }

    /// Write a workbook to a writer
    pub fn write<W: Write + Seek>(workbook: &Workbook, writer: W) -> XlsxResult<()> {
        if workbook.is_empty() {
            return Err(XlsxError::InvalidFormat("workbook has no sheets".into()));
        }

        let mut zip = ZipWriter::new(writer);
        let style_table = XlsxStyleTable::build(workbook);

        let entries: Vec<SheetEntry<'_>> = workbook
            .worksheets()
            .map(|sheet| SheetEntry { name: sheet.name() })
            .collect();
        write_package_parts(
            &mut zip,
            &entries,
            workbook.active_sheet(),
            Some(workbook.properties()),
        )?;

        zip.start_file("xl/styles.xml", SimpleFileOptions::default())?;
        zip.write_all(style_table.to_styles_xml().as_bytes())?;

        for (i, sheet) in workbook.worksheets().enumerate() {
            let selected = i == workbook.active_sheet();
            Self::write_worksheet(&mut zip, sheet, i, selected, &style_table)?;

            if sheet.hyperlinks().next().is_some() {
                let rels = xml::hyperlink_rels(sheet.hyperlinks().map(|(_, _, url)| url));
                write_sheet_rels(&mut zip, i, &rels)?;
            }
        }

        let mut writer = zip.finish()?;
        writer.flush()?;
        Ok(())
    }

    fn write_worksheet<W: Write + Seek>(
        zip: &mut ZipWriter<W>,
        sheet: &Worksheet,
        index: usize,
        selected: bool,
        style_table: &XlsxStyleTable,
    ) -> XlsxResult<()> {
        zip.start_file(
            format!("xl/worksheets/sheet{}.xml", index + 1),
            SimpleFileOptions::default(),
        )?;

        let mut content = String::from(xml::WORKSHEET_OPEN);
        xml::push_sheet_pr(&mut content, sheet.summary_below(), sheet.summary_right());
        xml::push_sheet_views(&mut content, selected, sheet.freeze_pane());

        let outline_row = sheet.rows().map(|r| r.outline_level).max().unwrap_or(0);
        let outline_col = sheet.columns().map(|c| c.outline_level).max().unwrap_or(0);
        xml::push_sheet_format(&mut content, outline_row, outline_col);
        xml::push_cols(&mut content, sheet.columns(), |column| {
            sheet
                .effective_column_width(column.index)
                .unwrap_or(DEFAULT_COLUMN_WIDTH)
        });

        content.push_str("\n    <sheetData>");
        for row in sheet.used_row_indices() {
            xml::push_row_open(&mut content, row, sheet.row_outline_level(row));
            for (col, cell) in sheet.iter_row(row) {
                let xf_id = style_table.xf_id_for(index, cell.style_index);
                xml::push_cell(&mut content, row, col, &cell.value, xf_id);
            }
            content.push_str("\n        </row>");
        }
        content.push_str("\n    </sheetData>");

        if let Some(range) = sheet.auto_filter() {
            content.push_str(&format!("\n    <autoFilter ref=\"{}\"/>", range));
        }
        xml::push_hyperlinks(&mut content, sheet.hyperlinks());

        content.push_str("\n</worksheet>");
        zip.write_all(content.as_bytes())?;
        Ok(())
    }
}

//! Documents: the sheets of one output file and its backend

use std::cell::RefCell;
use std::fmt;
use std::io::{Seek, Write};
use std::path::Path;
use std::rc::Rc;

use log::{debug, warn};
use sheetbind_core::{sanitize_sheet_name, DocumentProperties, Workbook};
use sheetbind_xlsx::{StreamWriter, XlsxWriter};

use crate::config::{DocumentKind, SheetDefaults};
use crate::error::{Error, Result};
use crate::sheet::{ConfiguredSheet, Target};
use crate::translate::Translator;

/// Create a document of the given kind
///
/// ```
/// use sheetbind::{create_document, ColumnBinding, DocumentKind, Value};
///
/// let mut doc = create_document(DocumentKind::RandomAccess, None).unwrap();
/// let sheet = doc.add_sheet("Guests").unwrap();
/// sheet.add_column_binding(ColumnBinding::new("Name", "[0]"));
/// sheet.set_data(vec![vec![Value::from("Ada")]]);
/// assert_eq!(sheet.apply_data(1, 1).unwrap(), 1);
/// ```
pub fn create_document(kind: DocumentKind, translator: Option<Rc<dyn Translator>>) -> Result<Document> {
    let mut doc = Document::new(kind)?;
    doc.translator = translator;
    Ok(doc)
}

/// An output spreadsheet under construction
///
/// Writing consumes the document; a streaming document's temp storage is
/// released when it is written or dropped.
pub struct Document {
    target: Target,
    sheets: Vec<ConfiguredSheet>,
    translator: Option<Rc<dyn Translator>>,
    defaults: SheetDefaults,
}

impl Document {
    /// Empty document rendering into `kind`
    pub fn new(kind: DocumentKind) -> Result<Self> {
        let target = match kind {
            DocumentKind::RandomAccess => Target::Grid(Rc::new(RefCell::new(Workbook::empty()))),
            DocumentKind::Streaming => Target::Stream(Rc::new(RefCell::new(StreamWriter::new()?))),
        };
        debug!("created {:?} document", kind);
        Ok(Self {
            target,
            sheets: Vec::new(),
            translator: None,
            defaults: SheetDefaults::default(),
        })
    }

    /// Empty document whose header labels go through `translator`
    pub fn with_translator(kind: DocumentKind, translator: Rc<dyn Translator>) -> Result<Self> {
        create_document(kind, Some(translator))
    }

    /// Set the defaults that sheets added from now on start with
    pub fn with_defaults(mut self, defaults: SheetDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Backend of the document
    pub fn kind(&self) -> DocumentKind {
        self.target.kind()
    }

    /// Add a sheet; the title is sanitized into a valid sheet name
    pub fn add_sheet(&mut self, title: &str) -> Result<&mut ConfiguredSheet> {
        let mut name = sanitize_sheet_name(title);
        if name.trim().is_empty() {
            name = format!("Sheet{}", self.sheets.len() + 1);
        }

        let index = match &self.target {
            Target::Grid(book) => book.borrow_mut().add_worksheet_with_name(&name)?,
            Target::Stream(writer) => {
                let mut writer = writer.borrow_mut();
                let index = writer.add_sheet(&name)?;
                writer.set_active_sheet(index)?;
                index
            }
        };
        debug!("added sheet '{}' ({:?})", name, self.kind());

        self.sheets.push(ConfiguredSheet::new(
            name,
            index,
            self.target.clone(),
            self.defaults.clone(),
            self.translator.clone(),
        ));
        let position = self.sheets.len() - 1;
        Ok(&mut self.sheets[position])
    }

    /// Sheets in insertion order
    pub fn sheets(&self) -> &[ConfiguredSheet] {
        &self.sheets
    }

    /// A sheet by position
    pub fn sheet(&self, index: usize) -> Option<&ConfiguredSheet> {
        self.sheets.get(index)
    }

    /// A sheet by position, mutably
    pub fn sheet_mut(&mut self, index: usize) -> Option<&mut ConfiguredSheet> {
        self.sheets.get_mut(index)
    }

    /// Number of sheets
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Select the tab shown when the file is opened
    pub fn set_active_sheet(&mut self, index: usize) -> Result<()> {
        match &self.target {
            Target::Grid(book) => book.borrow_mut().set_active_sheet(index)?,
            Target::Stream(writer) => writer.borrow_mut().set_active_sheet(index)?,
        }
        Ok(())
    }

    /// Index of the selected tab
    pub fn active_sheet(&self) -> usize {
        match &self.target {
            Target::Grid(book) => book.borrow().active_sheet(),
            Target::Stream(writer) => writer.borrow().active_sheet(),
        }
    }

    fn set_property(&mut self, name: &str, set: impl FnOnce(&mut DocumentProperties)) {
        match &self.target {
            Target::Grid(book) => set(book.borrow_mut().properties_mut()),
            Target::Stream(_) => warn!("document {} is not written by the streaming backend", name),
        }
    }

    fn property(&self, get: impl FnOnce(&DocumentProperties) -> Option<String>) -> Option<String> {
        match &self.target {
            Target::Grid(book) => get(book.borrow().properties()),
            Target::Stream(_) => None,
        }
    }

    /// Set the document title
    pub fn set_title<S: Into<String>>(&mut self, title: S) {
        let title = title.into();
        self.set_property("title", |p| p.title = Some(title));
    }

    /// Document title; always `None` when streaming
    pub fn title(&self) -> Option<String> {
        self.property(|p| p.title.clone())
    }

    /// Set the author
    pub fn set_creator<S: Into<String>>(&mut self, creator: S) {
        let creator = creator.into();
        self.set_property("creator", |p| p.creator = Some(creator));
    }

    /// Author; always `None` when streaming
    pub fn creator(&self) -> Option<String> {
        self.property(|p| p.creator.clone())
    }

    /// Set the company
    pub fn set_company<S: Into<String>>(&mut self, company: S) {
        let company = company.into();
        self.set_property("company", |p| p.company = Some(company));
    }

    /// Company; always `None` when streaming
    pub fn company(&self) -> Option<String> {
        self.property(|p| p.company.clone())
    }

    fn log_unapplied(&self) {
        for sheet in self.sheets.iter().filter(|s| !s.is_applied()) {
            debug!("sheet '{}' is written without data", sheet.title());
        }
    }

    /// Write the .xlsx file
    pub fn write_to_file<P: AsRef<Path>>(self, path: P) -> Result<()> {
        self.log_unapplied();
        let path = path.as_ref();
        match &self.target {
            Target::Grid(book) => XlsxWriter::write_file(&book.borrow(), path)?,
            Target::Stream(writer) => writer.borrow_mut().finish(path)?,
        }
        debug!("wrote {} sheet(s) to {}", self.sheets.len(), path.display());
        Ok(())
    }

    /// Write the .xlsx package to `writer`; random-access documents only
    pub fn write_to<W: Write + Seek>(self, writer: W) -> Result<()> {
        self.log_unapplied();
        match &self.target {
            Target::Grid(book) => Ok(XlsxWriter::write(&book.borrow(), writer)?),
            Target::Stream(_) => Err(Error::config(
                "streaming documents can only be written to a file",
            )),
        }
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("kind", &self.kind())
            .field("sheets", &self.sheets)
            .field("has_translator", &self.translator.is_some())
            .field("defaults", &self.defaults)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::MessageCatalog;
    use sheetbind_xlsx::XlsxReader;
    use std::io::Cursor;

    #[test]
    fn test_sheet_names() {
        let mut doc = Document::new(DocumentKind::RandomAccess).unwrap();
        assert_eq!(doc.add_sheet("Q1/Q2 [draft]").unwrap().title(), "Q1_Q2 _draft_");
        assert_eq!(doc.add_sheet("").unwrap().title(), "Sheet2");
        let long = "x".repeat(40);
        assert_eq!(doc.add_sheet(&long).unwrap().title().len(), 31);
        assert!(doc.add_sheet("q1_q2 _DRAFT_").is_err());
        assert_eq!(doc.sheet_count(), 3);
        assert_eq!(doc.active_sheet(), 0);
    }

    #[test]
    fn test_streaming_activates_new_sheets() {
        let mut doc = Document::new(DocumentKind::Streaming).unwrap();
        doc.add_sheet("One").unwrap();
        doc.add_sheet("Two").unwrap();
        assert_eq!(doc.active_sheet(), 1);
        doc.set_active_sheet(0).unwrap();
        assert_eq!(doc.active_sheet(), 0);
        assert!(doc.set_active_sheet(5).is_err());
    }

    #[test]
    fn test_metadata() {
        let mut doc = Document::new(DocumentKind::RandomAccess).unwrap();
        doc.set_title("Report");
        doc.set_creator("Finance");
        doc.set_company("ACME");
        assert_eq!(doc.title().as_deref(), Some("Report"));
        assert_eq!(doc.company().as_deref(), Some("ACME"));

        let mut stream = Document::new(DocumentKind::Streaming).unwrap();
        stream.set_creator("Finance");
        assert_eq!(stream.creator(), None);
    }

    #[test]
    fn test_write_to_memory() {
        let catalog = MessageCatalog::new().with("messages", "name", "Name");
        let mut doc = Document::with_translator(DocumentKind::RandomAccess, Rc::new(catalog)).unwrap();
        let sheet = doc.add_sheet("Data").unwrap();
        sheet.add_column_binding(crate::ColumnBinding::new("name", "[0]"));
        sheet.set_data(vec![vec!["Ada"]]);
        sheet.apply_data(1, 1).unwrap();

        let mut buf = Cursor::new(Vec::new());
        doc.write_to(&mut buf).unwrap();
        buf.set_position(0);
        let book = XlsxReader::read(buf).unwrap();
        let sheet = book.worksheet(0).unwrap();
        assert_eq!(sheet.get_value_at(0, 0).to_string(), "Name");
        assert_eq!(sheet.get_value_at(1, 0).to_string(), "Ada");
    }

    #[test]
    fn test_stream_cannot_write_to_memory() {
        let mut doc = Document::new(DocumentKind::Streaming).unwrap();
        doc.add_sheet("S").unwrap();
        assert!(doc.write_to(Cursor::new(Vec::new())).is_err());
    }
}

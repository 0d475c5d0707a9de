//! A sheet of a document: its column bindings, data and render settings

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::debug;
use sheetbind_core::{Error as CoreError, Workbook, MAX_COLS, MAX_ROWS};
use sheetbind_xlsx::StreamWriter;

use crate::backend::grid::GridBackend;
use crate::backend::stream::StreamBackend;
use crate::binding::ColumnBinding;
use crate::config::{DocumentKind, SheetDefaults};
use crate::engine::{RenderContext, RenderEngine};
use crate::error::{Error, Result};
use crate::translate::Translator;
use crate::value::{ExtraData, Record};

/// Per-item side-channel data, read by `!key` paths
pub type ExtraDataFn = Box<dyn Fn(&dyn Record) -> ExtraData>;

type DataSource = Box<dyn Iterator<Item = Box<dyn Record>>>;

/// Handle of a binding within its sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(usize);

impl BindingId {
    /// Position of the binding (0-based column offset)
    pub fn index(self) -> usize {
        self.0
    }
}

/// Physical writer shared by the sheets of one document
#[derive(Clone)]
pub(crate) enum Target {
    Grid(Rc<RefCell<Workbook>>),
    Stream(Rc<RefCell<StreamWriter>>),
}

impl Target {
    pub(crate) fn kind(&self) -> DocumentKind {
        match self {
            Target::Grid(_) => DocumentKind::RandomAccess,
            Target::Stream(_) => DocumentKind::Streaming,
        }
    }
}

/// A sheet being configured for rendering
///
/// Bindings are rendered in the order they were added. Data is consumed by
/// [`apply_data`](Self::apply_data), which may run once per sheet.
pub struct ConfiguredSheet {
    title: String,
    index: usize,
    target: Target,
    bindings: Vec<ColumnBinding>,
    data: Option<DataSource>,
    extra_data: Option<ExtraDataFn>,
    group_by: Option<usize>,
    defaults: SheetDefaults,
    translator: Option<Rc<dyn Translator>>,
    applied: bool,
}

impl ConfiguredSheet {
    pub(crate) fn new(
        title: String,
        index: usize,
        target: Target,
        defaults: SheetDefaults,
        translator: Option<Rc<dyn Translator>>,
    ) -> Self {
        Self {
            title,
            index,
            target,
            bindings: Vec::new(),
            data: None,
            extra_data: None,
            group_by: None,
            defaults,
            translator,
            applied: false,
        }
    }

    /// Sheet name as written to the file
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Position of the sheet in its document
    pub fn index(&self) -> usize {
        self.index
    }

    /// Backend the sheet renders into
    pub fn kind(&self) -> DocumentKind {
        self.target.kind()
    }

    /// Append a column
    pub fn add_column_binding(&mut self, binding: ColumnBinding) -> BindingId {
        self.bindings.push(binding);
        BindingId(self.bindings.len() - 1)
    }

    /// All bindings, in column order
    pub fn column_bindings(&self) -> &[ColumnBinding] {
        &self.bindings
    }

    /// A binding by id
    pub fn column_binding(&self, id: BindingId) -> Option<&ColumnBinding> {
        self.bindings.get(id.0)
    }

    /// A binding by id, for changes before rendering
    pub fn column_binding_mut(&mut self, id: BindingId) -> Option<&mut ColumnBinding> {
        self.bindings.get_mut(id.0)
    }

    /// First binding with the given label
    pub fn index_of(&self, label: &str) -> Option<BindingId> {
        self.bindings
            .iter()
            .position(|b| b.label() == label)
            .map(BindingId)
    }

    /// Attach the rows to render; any iterator works, it is read once
    pub fn set_data<I, R>(&mut self, data: I)
    where
        I: IntoIterator<Item = R>,
        I::IntoIter: 'static,
        R: Record + 'static,
    {
        self.data = Some(Box::new(
            data.into_iter().map(|r| Box::new(r) as Box<dyn Record>),
        ));
    }

    /// Set the producer of per-item extra data
    pub fn set_extra_data<F>(&mut self, producer: F)
    where
        F: Fn(&dyn Record) -> ExtraData + 'static,
    {
        self.extra_data = Some(Box::new(producer));
    }

    /// Group consecutive rows repeating this column's value
    pub fn set_group_by(&mut self, id: Option<BindingId>) -> Result<()> {
        if let Some(id) = id {
            if id.0 >= self.bindings.len() {
                return Err(Error::config(format!(
                    "binding {} does not belong to sheet '{}'",
                    id.0, self.title
                )));
            }
        }
        self.group_by = id.map(|id| id.0);
        Ok(())
    }

    /// The grouping column, if any
    pub fn group_by(&self) -> Option<BindingId> {
        self.group_by.map(BindingId)
    }

    /// Styling defaults of this sheet
    pub fn defaults(&self) -> &SheetDefaults {
        &self.defaults
    }

    /// Mutable styling defaults
    pub fn defaults_mut(&mut self) -> &mut SheetDefaults {
        &mut self.defaults
    }

    /// Whether [`apply_data`](Self::apply_data) already ran
    pub fn is_applied(&self) -> bool {
        self.applied
    }

    /// Render the header at `header_row` and one row per data item below
    /// it, starting at `start_column`. Both are 1-based.
    ///
    /// Returns the number of data rows written.
    pub fn apply_data(&mut self, start_column: u32, header_row: u32) -> Result<usize> {
        if self.applied {
            return Err(Error::AlreadyApplied(self.title.clone()));
        }
        if start_column == 0 || header_row == 0 {
            return Err(Error::config("start column and header row are 1-based"));
        }
        if start_column > MAX_COLS as u32 {
            return Err(CoreError::ColumnOutOfBounds(start_column - 1, MAX_COLS - 1).into());
        }
        if header_row > MAX_ROWS {
            return Err(CoreError::RowOutOfBounds(header_row - 1, MAX_ROWS - 1).into());
        }
        let data = self
            .data
            .take()
            .ok_or_else(|| Error::NoData(self.title.clone()))?;
        self.applied = true;

        debug!(
            "applying data to sheet '{}' at column {}, header row {}",
            self.title, start_column, header_row
        );
        let ctx = RenderContext {
            title: &self.title,
            bindings: &self.bindings,
            defaults: &self.defaults,
            translator: self.translator.as_deref(),
            extra_data: self.extra_data.as_deref(),
            group_by: self.group_by,
            start_col: (start_column - 1) as u16,
            header_row: header_row - 1,
        };
        match &self.target {
            Target::Grid(book) => {
                RenderEngine::new(GridBackend::new(book.clone(), self.index), ctx)?.render(data)
            }
            Target::Stream(writer) => {
                RenderEngine::new(StreamBackend::new(writer.clone(), self.index), ctx)?.render(data)
            }
        }
    }
}

impl fmt::Debug for ConfiguredSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfiguredSheet")
            .field("title", &self.title)
            .field("index", &self.index)
            .field("kind", &self.kind())
            .field("bindings", &self.bindings)
            .field("has_data", &self.data.is_some())
            .field("group_by", &self.group_by)
            .field("defaults", &self.defaults)
            .field("applied", &self.applied)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::value::Value;

    fn rows() -> Vec<Vec<Value>> {
        vec![vec![Value::from("a"), Value::Int(1)], vec![Value::from("b"), Value::Int(2)]]
    }

    #[test]
    fn test_apply_once() {
        let mut doc = Document::new(DocumentKind::RandomAccess).unwrap();
        let sheet = doc.add_sheet("Data").unwrap();
        sheet.add_column_binding(ColumnBinding::new("Name", "[0]"));
        sheet.set_data(rows());
        assert_eq!(sheet.apply_data(1, 1).unwrap(), 2);
        assert!(sheet.is_applied());

        sheet.set_data(rows());
        assert!(matches!(sheet.apply_data(1, 1), Err(Error::AlreadyApplied(t)) if t == "Data"));
    }

    #[test]
    fn test_apply_needs_data_and_1_based_position() {
        let mut doc = Document::new(DocumentKind::RandomAccess).unwrap();
        let sheet = doc.add_sheet("Data").unwrap();
        assert!(matches!(sheet.apply_data(1, 1), Err(Error::NoData(_))));
        sheet.set_data(rows());
        assert!(matches!(sheet.apply_data(0, 1), Err(Error::Configuration(_))));
        assert!(!sheet.is_applied());
    }

    #[test]
    fn test_bindings_and_group_by() {
        let mut doc = Document::new(DocumentKind::Streaming).unwrap();
        let sheet = doc.add_sheet("S").unwrap();
        let name = sheet.add_column_binding(ColumnBinding::new("Name", "[0]"));
        let count = sheet.add_column_binding(ColumnBinding::new("Count", "[1]"));
        assert_eq!(count.index(), 1);
        assert_eq!(sheet.index_of("Name"), Some(name));
        assert_eq!(sheet.index_of("Nope"), None);

        sheet.column_binding_mut(count).unwrap().set_label("Total");
        assert_eq!(sheet.column_binding(count).unwrap().label(), "Total");

        sheet.set_group_by(Some(name)).unwrap();
        assert_eq!(sheet.group_by(), Some(name));
        assert!(sheet.set_group_by(Some(BindingId(7))).is_err());
        assert_eq!(sheet.group_by(), Some(name));
    }
}

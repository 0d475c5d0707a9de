//! Column bindings: what a column shows and how it looks

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::backend::CellHandle;
use crate::data_type::DataType;
use crate::error::{Error, Result};
use crate::translate::LabelDomain;
use crate::value::{ExtraData, Record, Value};

/// Callback form of a [`PathExpr`]
pub type BindingFn = dyn Fn(&ColumnBinding, &dyn Record, &ExtraData) -> Result<Value>;

/// Post-resolution transform of a cell value
pub type Formatter = Rc<dyn Fn(Value) -> Value>;

/// Low-level hook run on the finished cell
pub type CellModifier =
    Rc<dyn Fn(&ColumnBinding, &mut dyn CellHandle, &dyn Record, &ExtraData) -> Result<()>>;

/// Computes a hyperlink target for a row
pub type LinkFn = dyn Fn(&ColumnBinding, &dyn Record, &ExtraData) -> Option<String>;

/// How a value is obtained from a data item
///
/// Path strings are read against the item, except that `$text` yields the
/// literal `text` and `!key.rest` reads `rest` from the row's extra data.
#[derive(Clone)]
pub enum PathExpr {
    /// A fixed value, returned as is
    Literal(Value),
    /// A path string
    Path(String),
    /// A callback receiving the binding, the item and the extra data
    Fn(Rc<BindingFn>),
}

impl PathExpr {
    /// Fixed value
    pub fn literal<V: Into<Value>>(value: V) -> Self {
        PathExpr::Literal(value.into())
    }

    /// Path string
    pub fn path<S: Into<String>>(path: S) -> Self {
        PathExpr::Path(path.into())
    }

    /// Infallible callback
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&ColumnBinding, &dyn Record, &ExtraData) -> Value + 'static,
    {
        PathExpr::Fn(Rc::new(
            move |binding: &ColumnBinding, item: &dyn Record, extra: &ExtraData| -> Result<Value> {
                Ok(f(binding, item, extra))
            },
        ))
    }

    /// Callback whose errors abort rendering
    pub fn try_from_fn<F>(f: F) -> Self
    where
        F: Fn(&ColumnBinding, &dyn Record, &ExtraData) -> Result<Value> + 'static,
    {
        PathExpr::Fn(Rc::new(f))
    }
}

impl fmt::Debug for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathExpr::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            PathExpr::Path(p) => f.debug_tuple("Path").field(p).finish(),
            PathExpr::Fn(_) => f.write_str("Fn(..)"),
        }
    }
}

impl From<&str> for PathExpr {
    fn from(path: &str) -> Self {
        PathExpr::Path(path.to_string())
    }
}

impl From<String> for PathExpr {
    fn from(path: String) -> Self {
        PathExpr::Path(path)
    }
}

impl From<Value> for PathExpr {
    fn from(value: Value) -> Self {
        PathExpr::Literal(value)
    }
}

/// Column width setting
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnWidth {
    /// Size the column to its content
    Auto,
    /// Fixed width in characters
    Fixed(f64),
}

impl ColumnWidth {
    /// Fixed width; must be finite and positive
    pub fn fixed(width: f64) -> Result<Self> {
        let width = ColumnWidth::Fixed(width);
        width.validate()?;
        Ok(width)
    }

    /// Parse `"auto"` or a positive number
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(ColumnWidth::Auto);
        }
        let width: f64 = s
            .parse()
            .map_err(|_| Error::config(format!("invalid column width '{}'", s)))?;
        Self::fixed(width)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match *self {
            ColumnWidth::Fixed(w) if !w.is_finite() || w <= 0.0 => {
                Err(Error::config(format!("column width must be positive, got {}", w)))
            }
            _ => Ok(()),
        }
    }
}

impl FromStr for ColumnWidth {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Hyperlink target of a column's cells
#[derive(Clone)]
pub enum LinkUrl {
    /// The same URL on every row, used verbatim
    Fixed(String),
    /// URL computed per row; `None` leaves the cell unlinked
    Computed(Rc<LinkFn>),
}

impl LinkUrl {
    /// Per-row URL callback
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&ColumnBinding, &dyn Record, &ExtraData) -> Option<String> + 'static,
    {
        LinkUrl::Computed(Rc::new(f))
    }
}

impl fmt::Debug for LinkUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkUrl::Fixed(url) => f.debug_tuple("Fixed").field(url).finish(),
            LinkUrl::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<&str> for LinkUrl {
    fn from(url: &str) -> Self {
        LinkUrl::Fixed(url.to_string())
    }
}

impl From<String> for LinkUrl {
    fn from(url: String) -> Self {
        LinkUrl::Fixed(url)
    }
}

/// Declarative description of one output column
///
/// ```
/// use sheetbind::{ColumnBinding, ColumnWidth, LabelDomain};
///
/// let binding = ColumnBinding::new("Name", "person.name")
///     .with_label_translation_domain(LabelDomain::Disabled)
///     .with_column_width(ColumnWidth::Auto)
///     .with_outline(1);
/// assert_eq!(binding.label(), "Name");
/// ```
#[derive(Clone, Default)]
pub struct ColumnBinding {
    label: String,
    label_translation_domain: LabelDomain,
    binding: Option<PathExpr>,
    formatter: Option<Formatter>,
    decode_html: bool,
    link_url: Option<LinkUrl>,
    data_styling: Option<PathExpr>,
    data_font_color: Option<PathExpr>,
    data_background_color: Option<PathExpr>,
    header_font_color: Option<String>,
    header_background_color: Option<String>,
    column_width: Option<ColumnWidth>,
    wrap_text: bool,
    outline: u8,
    forced_cell_type: Option<DataType>,
    internal_cell_modifier: Option<CellModifier>,
}

impl ColumnBinding {
    /// Binding with a header label and a value expression
    pub fn new<L: Into<String>, P: Into<PathExpr>>(label: L, binding: P) -> Self {
        Self {
            label: label.into(),
            binding: Some(binding.into()),
            ..Self::default()
        }
    }

    /// Binding without a value expression; every cell gets the empty default
    pub fn unbound<L: Into<String>>(label: L) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    // === Builders ===

    /// Set the translation domain of the label
    pub fn with_label_translation_domain(mut self, domain: LabelDomain) -> Self {
        self.label_translation_domain = domain;
        self
    }

    /// Set the value expression
    pub fn with_binding<P: Into<PathExpr>>(mut self, binding: P) -> Self {
        self.binding = Some(binding.into());
        self
    }

    /// Transform resolved values
    pub fn with_formatter<F: Fn(Value) -> Value + 'static>(mut self, formatter: F) -> Self {
        self.formatter = Some(Rc::new(formatter));
        self
    }

    /// Share an existing formatter
    pub fn with_shared_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// HTML-decode string values
    pub fn with_decode_html(mut self, decode: bool) -> Self {
        self.decode_html = decode;
        self
    }

    /// Link every cell of the column
    pub fn with_link_url<L: Into<LinkUrl>>(mut self, link: L) -> Self {
        self.link_url = Some(link.into());
        self
    }

    /// Style expression; must yield a [`Value::Style`] (or a style map on the
    /// random-access backend)
    pub fn with_data_styling<P: Into<PathExpr>>(mut self, styling: P) -> Self {
        self.data_styling = Some(styling.into());
        self
    }

    /// Font color expression (`"RRGGBB"`)
    pub fn with_data_font_color<P: Into<PathExpr>>(mut self, color: P) -> Self {
        self.data_font_color = Some(color.into());
        self
    }

    /// Background color expression (`"RRGGBB"`)
    pub fn with_data_background_color<P: Into<PathExpr>>(mut self, color: P) -> Self {
        self.data_background_color = Some(color.into());
        self
    }

    /// Header font color override
    pub fn with_header_font_color<S: Into<String>>(mut self, color: S) -> Self {
        self.header_font_color = Some(color.into());
        self
    }

    /// Header background color override
    pub fn with_header_background_color<S: Into<String>>(mut self, color: S) -> Self {
        self.header_background_color = Some(color.into());
        self
    }

    /// Column width
    pub fn with_column_width(mut self, width: ColumnWidth) -> Self {
        self.column_width = Some(width);
        self
    }

    /// Wrap text in data cells
    pub fn with_wrap_text(mut self, wrap: bool) -> Self {
        self.wrap_text = wrap;
        self
    }

    /// Column outline level (0 = none)
    pub fn with_outline(mut self, level: u8) -> Self {
        self.outline = level;
        self
    }

    /// Write values with an explicit cell type
    pub fn with_forced_cell_type(mut self, data_type: DataType) -> Self {
        self.forced_cell_type = Some(data_type);
        self
    }

    /// Hook run on each finished data cell
    pub fn with_internal_cell_modifier(mut self, modifier: CellModifier) -> Self {
        self.internal_cell_modifier = Some(modifier);
        self
    }

    // === Accessors ===

    /// Header label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Set the header label
    pub fn set_label<S: Into<String>>(&mut self, label: S) {
        self.label = label.into();
    }

    /// Translation domain of the label
    pub fn label_translation_domain(&self) -> &LabelDomain {
        &self.label_translation_domain
    }

    /// Set the translation domain of the label
    pub fn set_label_translation_domain(&mut self, domain: LabelDomain) {
        self.label_translation_domain = domain;
    }

    /// Value expression
    pub fn binding(&self) -> Option<&PathExpr> {
        self.binding.as_ref()
    }

    /// Set or clear the value expression
    pub fn set_binding(&mut self, binding: Option<PathExpr>) {
        self.binding = binding;
    }

    /// Value formatter
    pub fn formatter(&self) -> Option<&Formatter> {
        self.formatter.as_ref()
    }

    /// Set or clear the value formatter
    pub fn set_formatter(&mut self, formatter: Option<Formatter>) {
        self.formatter = formatter;
    }

    /// Whether string values are HTML-decoded
    pub fn decode_html(&self) -> bool {
        self.decode_html
    }

    /// Toggle HTML decoding
    pub fn set_decode_html(&mut self, decode: bool) {
        self.decode_html = decode;
    }

    /// Hyperlink target
    pub fn link_url(&self) -> Option<&LinkUrl> {
        self.link_url.as_ref()
    }

    /// Set or clear the hyperlink target
    pub fn set_link_url(&mut self, link: Option<LinkUrl>) {
        self.link_url = link;
    }

    /// Style expression
    pub fn data_styling(&self) -> Option<&PathExpr> {
        self.data_styling.as_ref()
    }

    /// Set or clear the style expression
    pub fn set_data_styling(&mut self, styling: Option<PathExpr>) {
        self.data_styling = styling;
    }

    /// Font color expression
    pub fn data_font_color(&self) -> Option<&PathExpr> {
        self.data_font_color.as_ref()
    }

    /// Set or clear the font color expression
    pub fn set_data_font_color(&mut self, color: Option<PathExpr>) {
        self.data_font_color = color;
    }

    /// Background color expression
    pub fn data_background_color(&self) -> Option<&PathExpr> {
        self.data_background_color.as_ref()
    }

    /// Set or clear the background color expression
    pub fn set_data_background_color(&mut self, color: Option<PathExpr>) {
        self.data_background_color = color;
    }

    /// Header font color override
    pub fn header_font_color(&self) -> Option<&str> {
        self.header_font_color.as_deref()
    }

    /// Set or clear the header font color override
    pub fn set_header_font_color(&mut self, color: Option<String>) {
        self.header_font_color = color;
    }

    /// Header background color override
    pub fn header_background_color(&self) -> Option<&str> {
        self.header_background_color.as_deref()
    }

    /// Set or clear the header background color override
    pub fn set_header_background_color(&mut self, color: Option<String>) {
        self.header_background_color = color;
    }

    /// Column width
    pub fn column_width(&self) -> Option<ColumnWidth> {
        self.column_width
    }

    /// Set or clear the column width; fixed widths are validated
    pub fn set_column_width(&mut self, width: Option<ColumnWidth>) -> Result<()> {
        if let Some(w) = &width {
            w.validate()?;
        }
        self.column_width = width;
        Ok(())
    }

    /// Whether data cells wrap text
    pub fn wrap_text(&self) -> bool {
        self.wrap_text
    }

    /// Toggle text wrapping
    pub fn set_wrap_text(&mut self, wrap: bool) {
        self.wrap_text = wrap;
    }

    /// Column outline level
    pub fn outline(&self) -> u8 {
        self.outline
    }

    /// Set the column outline level
    pub fn set_outline(&mut self, level: u8) {
        self.outline = level;
    }

    /// Forced cell type
    pub fn forced_cell_type(&self) -> Option<DataType> {
        self.forced_cell_type
    }

    /// Set or clear the forced cell type
    pub fn set_forced_cell_type(&mut self, data_type: Option<DataType>) {
        self.forced_cell_type = data_type;
    }

    /// Cell modifier hook
    pub fn internal_cell_modifier(&self) -> Option<&CellModifier> {
        self.internal_cell_modifier.as_ref()
    }

    /// Set or clear the cell modifier hook
    pub fn set_internal_cell_modifier(&mut self, modifier: Option<CellModifier>) {
        self.internal_cell_modifier = modifier;
    }
}

impl fmt::Debug for ColumnBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnBinding")
            .field("label", &self.label)
            .field("label_translation_domain", &self.label_translation_domain)
            .field("binding", &self.binding)
            .field("decode_html", &self.decode_html)
            .field("link_url", &self.link_url)
            .field("column_width", &self.column_width)
            .field("wrap_text", &self.wrap_text)
            .field("outline", &self.outline)
            .field("forced_cell_type", &self.forced_cell_type)
            .finish_non_exhaustive()
    }
}

//! Header and data row rendering, shared by both backends

use log::{debug, trace};
use sheetbind_core::{
    Color, Error as CoreError, HorizontalAlignment, Style, VerticalAlignment, MAX_COLS,
};

use crate::backend::{Backend, CellHandle, SheetLayout};
use crate::binding::{ColumnBinding, LinkUrl};
use crate::config::{DocumentKind, SheetDefaults};
use crate::error::{Error, Result};
use crate::html::decode_html_entities;
use crate::resolve::ValuePathResolver;
use crate::style_map::{apply_style_map, color_value, parse_color};
use crate::translate::{translate_label, Translator};
use crate::value::{ExtraData, Record, Value};

/// Everything the engine reads from the sheet
pub(crate) struct RenderContext<'a> {
    pub(crate) title: &'a str,
    pub(crate) bindings: &'a [ColumnBinding],
    pub(crate) defaults: &'a SheetDefaults,
    pub(crate) translator: Option<&'a dyn Translator>,
    pub(crate) extra_data: Option<&'a dyn Fn(&dyn Record) -> ExtraData>,
    pub(crate) group_by: Option<usize>,
    /// First column (0-based)
    pub(crate) start_col: u16,
    /// Header row (0-based)
    pub(crate) header_row: u32,
}

/// Resolved color; blank values leave the base style alone
fn color_of(value: &Value) -> Result<Option<Color>> {
    if value.is_truthy() {
        color_value(value).map(Some)
    } else {
        Ok(None)
    }
}

/// Renders one sheet through a backend
pub(crate) struct RenderEngine<'a, B: Backend> {
    ctx: RenderContext<'a>,
    backend: B,
    header_style: Style,
    data_style: Style,
    last_group_value: Option<Value>,
    current_row: u32,
}

impl<'a, B: Backend> RenderEngine<'a, B> {
    pub(crate) fn new(backend: B, ctx: RenderContext<'a>) -> Result<Self> {
        let last_col = ctx.start_col as usize + ctx.bindings.len();
        if last_col > MAX_COLS as usize {
            return Err(CoreError::ColumnOutOfBounds(last_col as u32 - 1, MAX_COLS - 1).into());
        }
        if let Some(index) = ctx.group_by {
            if index >= ctx.bindings.len() {
                return Err(Error::config(format!(
                    "group-by binding {} is not on sheet '{}'",
                    index, ctx.title
                )));
            }
        }
        for binding in ctx.bindings {
            if let Some(width) = binding.column_width() {
                width.validate()?;
            }
        }

        let defaults = ctx.defaults;
        let header_style = Style::new()
            .font_name(defaults.font_family.as_str())
            .font_size(defaults.header_font_size)
            .bold(true)
            .font_color(parse_color(&defaults.header_font_color)?)
            .fill_color(parse_color(&defaults.header_background_color)?)
            .wrap_text(true)
            .horizontal_alignment(HorizontalAlignment::Center)
            .vertical_alignment(VerticalAlignment::Center);

        let mut data_style = Style::new()
            .font_name(defaults.font_family.as_str())
            .font_size(defaults.data_font_size);
        if let Some(color) = &defaults.data_font_color {
            data_style = data_style.font_color(parse_color(color)?);
        }
        if let Some(color) = &defaults.data_background_color {
            data_style = data_style.fill_color(parse_color(color)?);
        }

        let current_row = ctx.header_row;
        Ok(Self {
            ctx,
            backend,
            header_style,
            data_style,
            last_group_value: None,
            current_row,
        })
    }

    /// Render header, data rows and table post-processing; returns the
    /// number of data rows
    pub(crate) fn render<I>(mut self, data: I) -> Result<usize>
    where
        I: Iterator<Item = Box<dyn Record>>,
    {
        debug!(
            "rendering sheet '{}' ({} columns, {:?} backend)",
            self.ctx.title,
            self.ctx.bindings.len(),
            self.backend.kind()
        );
        self.render_header()?;

        let mut rows = 0;
        for item in data {
            self.current_row += 1;
            self.render_row(&*item)?;
            rows += 1;
        }

        let layout = SheetLayout {
            bindings: self.ctx.bindings,
            start_col: self.ctx.start_col,
            header_row: self.ctx.header_row,
            last_row: self.current_row,
        };
        self.backend.finish(&layout)?;
        debug!("sheet '{}': rendered {} data rows", self.ctx.title, rows);
        Ok(rows)
    }

    fn header_style_for(&self, binding: &ColumnBinding) -> Result<Style> {
        let mut style = self.header_style.clone();
        if let Some(color) = binding.header_font_color().filter(|c| !c.is_empty()) {
            style = style.font_color(parse_color(color)?);
        }
        if let Some(color) = binding.header_background_color().filter(|c| !c.is_empty()) {
            style = style.fill_color(parse_color(color)?);
        }
        Ok(style)
    }

    fn render_header(&mut self) -> Result<()> {
        let row = self.ctx.header_row;
        let bindings = self.ctx.bindings;
        let mut cells = Vec::with_capacity(bindings.len());
        for (i, binding) in bindings.iter().enumerate() {
            let col = self.ctx.start_col + i as u16;
            let label = translate_label(
                self.ctx.translator,
                binding.label(),
                binding.label_translation_domain(),
            );
            let mut cell = self.backend.new_cell(row, col, self.header_style_for(binding)?);
            cell.set_value(&Value::String(decode_html_entities(&label)))?;
            if binding.outline() > 0 {
                self.backend.set_column_outline(col, binding.outline())?;
            }
            cells.push(cell);
        }
        self.backend.write_row(row, cells)
    }

    fn render_row(&mut self, item: &dyn Record) -> Result<()> {
        let extra = self.ctx.extra_data.map(|f| f(item)).unwrap_or_default();
        let row = self.current_row;
        trace!("sheet '{}': row {}", self.ctx.title, row + 1);

        let bindings = self.ctx.bindings;
        let mut grouped = false;
        let mut cells = Vec::with_capacity(bindings.len());
        for (i, binding) in bindings.iter().enumerate() {
            let col = self.ctx.start_col + i as u16;
            let (cell, value) = self.render_cell(binding, row, col, item, &extra)?;
            if self.ctx.group_by == Some(i) {
                if self.last_group_value.as_ref() == Some(&value) {
                    grouped = true;
                } else {
                    self.last_group_value = Some(value);
                }
            }
            cells.push(cell);
        }

        self.backend.write_row(row, cells)?;
        if grouped {
            self.backend.mark_row_outline(row, 1)?;
        }
        Ok(())
    }

    fn render_cell(
        &self,
        binding: &ColumnBinding,
        row: u32,
        col: u16,
        item: &dyn Record,
        extra: &ExtraData,
    ) -> Result<(B::Cell, Value)> {
        let mut value =
            ValuePathResolver::resolve(item, binding, binding.binding(), Value::from(""), extra)?;
        let style = self.cell_style(binding, item, extra)?;

        if let Some(formatter) = binding.formatter() {
            value = formatter(value);
        }
        if binding.decode_html() {
            if let Value::String(text) = &value {
                value = Value::String(decode_html_entities(text));
            }
        }
        let url = match binding.link_url() {
            Some(LinkUrl::Fixed(url)) => Some(url.clone()),
            Some(LinkUrl::Computed(f)) => f(binding, item, extra),
            None => None,
        };
        let value = self.backend.native_date(value);

        let mut cell = self.backend.new_cell(row, col, style);
        match binding.forced_cell_type() {
            Some(data_type) => cell.set_value_explicit(&value, data_type)?,
            None => cell.set_value(&value)?,
        }
        if let Some(url) = url.filter(|u| !u.is_empty()) {
            cell.set_hyperlink(Some(url));
        }
        if let Some(modifier) = binding.internal_cell_modifier() {
            modifier(binding, &mut cell, item, extra)?;
        }
        Ok((cell, value))
    }

    fn cell_style(&self, binding: &ColumnBinding, item: &dyn Record, extra: &ExtraData) -> Result<Style> {
        let styling =
            ValuePathResolver::resolve(item, binding, binding.data_styling(), Value::Null, extra)?;

        if styling.is_truthy() {
            return match styling {
                Value::Style(style) => Ok(*style),
                Value::Map(map) if self.backend.kind() == DocumentKind::RandomAccess => {
                    apply_style_map(self.data_style.clone(), &map)
                }
                other => Err(Error::config(format!(
                    "data styling of column '{}' must resolve to a style on the {:?} backend, got {}",
                    binding.label(),
                    self.backend.kind(),
                    other.type_name()
                ))),
            };
        }

        let defaults = self.ctx.defaults;
        let font_default = Value::from(defaults.data_font_color.clone());
        let fill_default = Value::from(defaults.data_background_color.clone());
        let font = ValuePathResolver::resolve(item, binding, binding.data_font_color(), font_default, extra)?;
        let fill = ValuePathResolver::resolve(item, binding, binding.data_background_color(), fill_default, extra)?;

        let mut style = self.data_style.clone();
        if let Some(color) = color_of(&font)? {
            style = style.font_color(color);
        }
        if let Some(color) = color_of(&fill)? {
            style = style.fill_color(color);
        }
        Ok(style)
    }
}

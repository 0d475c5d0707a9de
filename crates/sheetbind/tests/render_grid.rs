//! End-to-end tests for the random-access backend (bind -> render -> write -> read -> verify)

use std::collections::BTreeMap;
use std::io::Cursor;
use std::rc::Rc;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use sheetbind::prelude::*;
use sheetbind::{currency_modifier, date_modifier, MessageCatalog};
use sheetbind_core::{CellValue, Workbook};
use sheetbind_xlsx::XlsxReader;

struct Guest {
    name: &'static str,
    city: &'static str,
    tickets: i64,
    paid: f64,
    arrival: NaiveDate,
}

impl Record for Guest {
    fn property(&self, name: &str) -> Option<Value> {
        match name {
            "name" => Some(self.name.into()),
            "city" => Some(self.city.into()),
            "tickets" => Some(self.tickets.into()),
            "paid" => Some(self.paid.into()),
            "arrival" => Some(self.arrival.into()),
            _ => None,
        }
    }
}

fn guests() -> Vec<Guest> {
    let day = |d| NaiveDate::from_ymd_opt(2024, 5, d).unwrap();
    vec![
        Guest { name: "Ada", city: "London", tickets: 2, paid: 40.0, arrival: day(1) },
        Guest { name: "Alan", city: "London", tickets: 1, paid: 20.0, arrival: day(2) },
        Guest { name: "Grace", city: "New York", tickets: 3, paid: 60.5, arrival: day(3) },
        Guest { name: "Linus", city: "New York", tickets: 1, paid: 20.0, arrival: day(4) },
        Guest { name: "Ken", city: "New York", tickets: 4, paid: 80.0, arrival: day(5) },
    ]
}

fn write_and_read(doc: Document) -> Workbook {
    let mut buf = Vec::new();
    doc.write_to(Cursor::new(&mut buf)).unwrap();
    XlsxReader::read(Cursor::new(&buf)).unwrap()
}

fn row_text(book: &Workbook, row: u32, cols: u16) -> Vec<String> {
    let sheet = book.worksheet(0).unwrap();
    (0..cols).map(|c| sheet.get_value_at(row, c).to_string()).collect()
}

#[test]
fn test_header_labels_in_order_untranslated() {
    let catalog = MessageCatalog::new().with("messages", "City", "Stadt");
    let mut doc = Document::with_translator(DocumentKind::RandomAccess, Rc::new(catalog)).unwrap();
    let sheet = doc.add_sheet("Guests").unwrap();
    for (label, path) in [("Name", "name"), ("City", "city"), ("Tickets", "tickets")] {
        sheet.add_column_binding(
            ColumnBinding::new(label, path).with_label_translation_domain(LabelDomain::Disabled),
        );
    }
    sheet.add_column_binding(ColumnBinding::new("City", "city"));
    sheet.set_data(guests());
    sheet.apply_data(1, 1).unwrap();

    let book = write_and_read(doc);
    assert_eq!(row_text(&book, 0, 4), vec!["Name", "City", "Tickets", "Stadt"]);
    assert_eq!(row_text(&book, 3, 4), vec!["Grace", "New York", "3", "New York"]);
}

#[test]
fn test_grouping_marks_repeated_values() {
    let mut doc = Document::new(DocumentKind::RandomAccess).unwrap();
    let sheet = doc.add_sheet("Guests").unwrap();
    sheet.add_column_binding(ColumnBinding::new("Name", "name"));
    let city = sheet.add_column_binding(ColumnBinding::new("City", "city"));
    sheet.set_group_by(Some(city)).unwrap();
    sheet.set_data(guests());
    assert_eq!(sheet.apply_data(1, 1).unwrap(), 5);

    let book = write_and_read(doc);
    let ws = book.worksheet(0).unwrap();
    let levels: Vec<u8> = (1..=5).map(|r| ws.row_outline_level(r)).collect();
    assert_eq!(levels, vec![0, 1, 0, 1, 1]);
    assert!(!ws.summary_below());
    assert!(!ws.summary_right());
}

#[test]
fn test_post_processing_follows_start_position() {
    let mut doc = Document::new(DocumentKind::RandomAccess).unwrap();
    let sheet = doc.add_sheet("Offset").unwrap();
    sheet.add_column_binding(ColumnBinding::new("Name", "name").with_wrap_text(true));
    sheet.add_column_binding(
        ColumnBinding::new("Tickets", "tickets").with_column_width(ColumnWidth::Fixed(18.0)),
    );
    sheet.add_column_binding(ColumnBinding::new("City", "city").with_column_width(ColumnWidth::Auto));
    sheet.set_data(guests());
    sheet.apply_data(2, 3).unwrap();

    let book = write_and_read(doc);
    let ws = book.worksheet(0).unwrap();
    assert_eq!(ws.get_value_at(2, 1), CellValue::string("Name"));
    assert_eq!(ws.get_value_at(0, 0), CellValue::Empty);
    assert_eq!(ws.auto_filter().map(|r| r.to_string()), Some("B3:D8".to_string()));
    assert_eq!(ws.freeze_pane().map(|p| (p.row, p.col)), Some((3, 1)));
    assert_eq!(ws.column_width(2), 18.0);
    assert!(ws.cell_style_at(4, 1).unwrap().alignment.wrap_text);
    assert!(ws.effective_column_width(3).is_some());
}

#[test]
fn test_forced_numeric_and_number_formats() {
    let mut doc = Document::new(DocumentKind::RandomAccess).unwrap();
    let sheet = doc.add_sheet("Types").unwrap();
    sheet.add_column_binding(ColumnBinding::new("Code", "$42").with_forced_cell_type(DataType::Numeric));
    sheet.add_column_binding(ColumnBinding::new("Plain", "$42"));
    sheet.add_column_binding(ColumnBinding::new("Paid", "paid").with_internal_cell_modifier(currency_modifier()));
    sheet.add_column_binding(ColumnBinding::new("Arrival", "arrival").with_internal_cell_modifier(date_modifier()));
    sheet.set_data(guests().into_iter().take(1));
    sheet.apply_data(1, 1).unwrap();

    let book = write_and_read(doc);
    let ws = book.worksheet(0).unwrap();
    assert_eq!(ws.get_value_at(1, 0), CellValue::Number(42.0));
    assert_eq!(ws.get_value_at(1, 1), CellValue::string("42"));
    assert_eq!(
        ws.cell_style_at(1, 2).unwrap().number_format.format_string(),
        FormatCode::Currency.code_for(DocumentKind::RandomAccess)
    );
    // 2024-05-01
    assert_eq!(ws.get_value_at(1, 3), CellValue::Number(45413.0));
    assert_eq!(ws.cell_style_at(1, 3).unwrap().number_format.format_string(), "m/d/yyyy");
}

#[test]
fn test_links_extra_data_and_html() {
    let mut doc = Document::new(DocumentKind::RandomAccess).unwrap();
    let sheet = doc.add_sheet("Links").unwrap();
    sheet.add_column_binding(
        ColumnBinding::new("Name", "name").with_link_url(LinkUrl::computed(|_, item, _| {
            item.property("name").map(|n| format!("https://example.com/{}", n))
        })),
    );
    sheet.add_column_binding(ColumnBinding::new("Rank", "!stats.rank"));
    sheet.add_column_binding(ColumnBinding::new("Missing", "!nothing.here"));
    sheet.add_column_binding(
        ColumnBinding::new("Note", "$Caf&eacute; &amp; bar").with_decode_html(true),
    );
    sheet.set_extra_data(|item| {
        let tickets = item.property("tickets").and_then(|t| t.as_f64()).unwrap_or(0.0);
        let mut stats = BTreeMap::new();
        stats.insert("rank".to_string(), Value::from(if tickets > 1.0 { "gold" } else { "silver" }));
        let mut extra = ExtraData::new();
        extra.insert("stats".to_string(), Value::Map(stats));
        extra
    });
    sheet.set_data(guests().into_iter().take(2));
    sheet.apply_data(1, 1).unwrap();

    let book = write_and_read(doc);
    let ws = book.worksheet(0).unwrap();
    assert_eq!(ws.hyperlink_at(1, 0), Some("https://example.com/Ada"));
    assert_eq!(row_text(&book, 1, 4), vec!["Ada", "gold", "", "Café & bar"]);
    assert_eq!(row_text(&book, 2, 4), vec!["Alan", "silver", "", "Café & bar"]);
}

#[test]
fn test_data_driven_colors_and_metadata() {
    let mut doc = Document::new(DocumentKind::RandomAccess)
        .unwrap()
        .with_defaults(SheetDefaults::default().with_font_family("Calibri"));
    doc.set_title("Guest list");
    doc.set_creator("Events");
    let sheet = doc.add_sheet("Colors").unwrap();
    sheet.add_column_binding(ColumnBinding::new("Name", "name").with_data_background_color(
        PathExpr::from_fn(|_, item, _| {
            let many = item.property("tickets").and_then(|t| t.as_f64()).unwrap_or(0.0) > 2.0;
            Value::from(if many { "FFFF00" } else { "" })
        }),
    ));
    sheet.set_data(guests());
    sheet.apply_data(1, 1).unwrap();

    let book = write_and_read(doc);
    assert_eq!(book.properties().title.as_deref(), Some("Guest list"));
    let ws = book.worksheet(0).unwrap();
    let highlighted = ws.cell_style_at(3, 0).unwrap();
    assert_eq!(highlighted.font.name, "Calibri");
    assert_eq!(highlighted.fill, sheetbind_core::FillStyle::solid(Color::rgb(255, 255, 0)));
    assert_eq!(ws.cell_style_at(1, 0).unwrap().fill, sheetbind_core::FillStyle::None);
}

#[test]
fn test_unrepresentable_values_still_render() {
    let early = NaiveDate::from_ymd_opt(1899, 6, 1).unwrap();
    for kind in [DocumentKind::RandomAccess, DocumentKind::Streaming] {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("odd.xlsx");
        let mut doc = Document::new(kind).unwrap();
        let sheet = doc.add_sheet("Odd").unwrap();
        sheet.add_column_binding(ColumnBinding::new("Value", "[0]"));
        sheet.set_data(vec![
            vec![Value::from("ok")],
            vec![Value::Date(early)],
            vec![Value::Float(f64::NAN)],
            vec![Value::Float(f64::INFINITY)],
        ]);
        assert_eq!(sheet.apply_data(1, 1).unwrap(), 4);
        doc.write_to_file(&path).unwrap();

        let book = XlsxReader::read_file(&path).unwrap();
        assert_eq!(
            row_text(&book, 2, 1),
            vec!["1899-06-01 00:00:00"],
            "{:?}",
            kind
        );
        assert_eq!(book.worksheet(0).unwrap().get_value_at(3, 0), CellValue::string("NaN"));
        assert_eq!(book.worksheet(0).unwrap().get_value_at(4, 0), CellValue::string("inf"));
    }
}

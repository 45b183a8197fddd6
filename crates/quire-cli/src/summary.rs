use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use quire_cli::commands::{InspectReport, TypeRow};
use quire_document::SavedDocument;
use quire_model::TypeRole;

pub fn print_inspect(report: &InspectReport) {
    println!("Document: {}", report.display_name);
    println!("Path: {}", report.path.display());

    let mut table = Table::new();
    table.set_header(vec![header_cell("Property"), header_cell("Value")]);
    apply_table_style(&mut table);

    table.add_row(vec![label_cell("Class"), Cell::new(report.class)]);
    table.add_row(vec![
        label_cell("Type"),
        Cell::new(format!("{} ({})", report.type_name, report.type_tag)),
    ]);
    table.add_row(vec![label_cell("Role"), role_cell(report.role)]);
    table.add_row(vec![label_cell("Form"), Cell::new(report.form.label())]);
    table.add_row(vec![label_cell("Size"), Cell::new(format_size(report.size))]);
    for (label, value) in &report.details {
        table.add_row(vec![label_cell(label), Cell::new(value)]);
    }

    println!("{table}");
}

pub fn print_saved(saved: &SavedDocument) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Operation"),
        header_cell("Path"),
        header_cell("Type"),
        header_cell("Backup"),
    ]);
    apply_table_style(&mut table);

    table.add_row(vec![
        Cell::new(saved.kind.label())
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        Cell::new(saved.path.display()),
        Cell::new(&saved.type_tag),
        match &saved.backup_path {
            Some(path) => Cell::new(path.display()),
            None => dim_cell("-"),
        },
    ]);

    println!("{table}");
}

pub fn print_types(rows: &[TypeRow]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Class"),
        header_cell("Tag"),
        header_cell("Name"),
        header_cell("Role"),
        header_cell("Form"),
        header_cell("Extensions"),
    ]);
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    align_column(&mut table, 3, CellAlignment::Center);

    let mut previous_class: Option<&str> = None;
    for row in rows {
        let class_cell = if previous_class == Some(row.class.as_str()) {
            dim_cell("")
        } else {
            Cell::new(&row.class)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold)
        };
        previous_class = Some(&row.class);

        let extensions = if row.extensions.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(
                row.extensions
                    .iter()
                    .map(|ext| format!(".{ext}"))
                    .collect::<Vec<_>>()
                    .join(" "),
            )
        };

        table.add_row(vec![
            class_cell,
            Cell::new(&row.tag),
            Cell::new(&row.name),
            role_cell(row.role),
            Cell::new(row.form.label()),
            extensions,
        ]);
    }

    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;
    match bytes {
        b if b >= MIB => format!("{:.1} MiB", b as f64 / MIB as f64),
        b if b >= KIB => format!("{:.1} KiB", b as f64 / KIB as f64),
        b => format!("{b} B"),
    }
}

fn role_cell(role: TypeRole) -> Cell {
    match role {
        TypeRole::Native => Cell::new("native").fg(Color::Green),
        TypeRole::Import => Cell::new("import").fg(Color::Yellow),
        TypeRole::Export => Cell::new("export").fg(Color::Magenta),
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn label_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

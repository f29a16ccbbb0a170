// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use shopfloor_app::{
    ColumnSpec, ResourceId, ResourceItem, SortDirection, SortState, ViewConfig, display_at,
};

const COLUMN_GAP: &str = "  ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub id: Option<ResourceId>,
    pub cells: Vec<String>,
}

/// Rendered snapshot of the visible rows, one cell per configured column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableProjection {
    pub title: String,
    pub column_keys: Vec<String>,
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
    pub sort: SortState,
    pub empty_message: String,
}

impl TableProjection {
    pub fn build(view: &ViewConfig, items: &[ResourceItem], sort: &SortState) -> Self {
        let rows = items
            .iter()
            .map(|item| TableRow {
                id: ResourceId::of(item),
                cells: view
                    .columns
                    .iter()
                    .map(|column| render_cell(item, column, view))
                    .collect(),
            })
            .collect();
        Self {
            title: view.page_title.clone(),
            column_keys: view.columns.iter().map(|column| column.key.clone()).collect(),
            columns: view.columns.iter().map(|column| column.label.clone()).collect(),
            rows,
            sort: sort.clone(),
            empty_message: format!("No {} found", view.page_title.to_lowercase()),
        }
    }

    /// Column labels with an arrow on the active sort column.
    pub fn header_labels(&self) -> Vec<String> {
        self.columns
            .iter()
            .zip(&self.column_keys)
            .map(|(label, key)| {
                if *key != self.sort.key {
                    return label.clone();
                }
                let arrow = match self.sort.direction {
                    SortDirection::Asc => "↑",
                    SortDirection::Desc => "↓",
                };
                format!("{label} {arrow}")
            })
            .collect()
    }

    pub fn render_plain(&self) -> String {
        let headers = self.header_labels();
        let mut widths: Vec<usize> = headers.iter().map(|label| width(label)).collect();
        for row in &self.rows {
            for (index, cell) in row.cells.iter().enumerate() {
                if let Some(slot) = widths.get_mut(index) {
                    *slot = (*slot).max(width(&single_line(cell)));
                }
            }
        }

        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        push_line(&mut out, &headers, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        push_line(&mut out, &rule, &widths);
        if self.rows.is_empty() {
            out.push_str(&self.empty_message);
            out.push('\n');
            return out;
        }
        for row in &self.rows {
            let cells: Vec<String> = row.cells.iter().map(|cell| single_line(cell)).collect();
            push_line(&mut out, &cells, &widths);
        }
        out
    }
}

pub fn render_cell(item: &ResourceItem, column: &ColumnSpec, view: &ViewConfig) -> String {
    match column.render {
        Some(render) => render(item, view),
        None => display_at(item, &column.key),
    }
}

/// Card blocks for views that define one; `None` means render a table.
pub fn render_cards(view: &ViewConfig, items: &[ResourceItem]) -> Option<Vec<String>> {
    let render = view.card_view?;
    Some(items.iter().map(|item| render(item, view)).collect())
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{cell}{}", " ".repeat(w.saturating_sub(width(cell)))))
        .collect();
    out.push_str(padded.join(COLUMN_GAP).trim_end());
    out.push('\n');
}

fn single_line(cell: &str) -> String {
    cell.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn width(text: &str) -> usize {
    text.chars().count()
}

use std::fmt::Write as _;

use textwrap::wrap;
use unicode_width::UnicodeWidthStr;

use crate::form::{CollectionView, Control, DictionaryView, FormView, InputView, RowView};

const MIN_COLUMN: usize = 8;

/// Render a view model as a plain-text page no wider than `width` columns.
pub fn render_text(view: &DictionaryView, width: usize) -> String {
    let width = width.max(40);
    let mut out = String::new();
    render_input(&mut out, &view.identifier, width, "");
    render_input(&mut out, &view.title, width, "");
    for collection in [&view.fields, &view.indexes] {
        out.push('\n');
        render_collection(&mut out, collection, width);
    }
    out.push('\n');
    let _ = writeln!(out, "status: {}", view.status);
    for notice in &view.notices {
        for line in wrap(&format!("! {notice}"), width) {
            let _ = writeln!(out, "{line}");
        }
    }
    out
}

fn render_collection(out: &mut String, view: &CollectionView, width: usize) {
    let _ = writeln!(out, "== {} ==", view.title);
    if view.table_visible {
        let columns = column_widths(view, width);
        write_row(out, &view.header, &columns);
        let _ = writeln!(out, "{}", "-".repeat(columns.iter().sum::<usize>() + 3 * columns.len()));
        for row in &view.rows {
            match row {
                RowView::EditButton { cells, button, .. } => {
                    let mut cells = cells.clone();
                    if let Some(last) = cells.last_mut() {
                        let _ = write!(last, "\n[{}: {}]", button.label, button.token);
                    }
                    write_row(out, &cells, &columns);
                }
                RowView::InlineForm { form, .. } => render_form(out, form, width, "  "),
            }
        }
    }
    if let Some(trigger) = &view.add_trigger {
        let _ = writeln!(out, "[{}: {}]", trigger.label, trigger.token);
    }
    if let Some(form) = &view.add_form {
        render_form(out, form, width, "  ");
    }
    if view.cancelled {
        let _ = writeln!(out, "(add cancelled)");
    }
}

fn render_form(out: &mut String, form: &FormView, width: usize, indent: &str) {
    let _ = writeln!(out, "{indent}-- {} --", form.title);
    for input in form.inputs.iter().filter(|input| input.visible) {
        render_input(out, input, width, indent);
    }
    let actions = form
        .actions
        .iter()
        .map(|action| format!("[{}: {}]", action.label, action.token))
        .collect::<Vec<_>>()
        .join(" ");
    let _ = writeln!(out, "{indent}{actions}");
}

fn render_input(out: &mut String, input: &InputView, width: usize, indent: &str) {
    let marker = if input.required { "*" } else { "" };
    let _ = writeln!(out, "{indent}{}{marker} ({}): {}", input.label, input.name, input.value);
    let inner = width.saturating_sub(indent.width() + 4).max(MIN_COLUMN);
    if let Control::Select { options, trigger } = &input.control {
        let choices = options.keys().cloned().collect::<Vec<_>>().join(" | ");
        for line in wrap(&format!("options: {choices}"), inner) {
            let _ = writeln!(out, "{indent}    {line}");
        }
        if let Some(token) = trigger {
            let _ = writeln!(out, "{indent}    on change: {token}");
        }
    }
    if let Some(error) = &input.error {
        for line in wrap(&format!("error: {error}"), inner) {
            let _ = writeln!(out, "{indent}    {line}");
        }
    }
}

fn column_widths(view: &CollectionView, width: usize) -> Vec<usize> {
    let count = view.header.len().max(1);
    let mut widths: Vec<usize> = view.header.iter().map(|cell| cell.width()).collect();
    for row in &view.rows {
        if let RowView::EditButton { cells, .. } = row {
            for (idx, cell) in cells.iter().enumerate().take(count) {
                let longest = cell.lines().map(UnicodeWidthStr::width).max().unwrap_or(0);
                widths[idx] = widths[idx].max(longest);
            }
        }
    }
    let budget = width.saturating_sub(3 * count);
    let total: usize = widths.iter().sum();
    if total > budget {
        let share = (budget / count).max(MIN_COLUMN);
        for width in &mut widths {
            *width = (*width).min(share);
        }
    }
    widths
}

fn write_row(out: &mut String, cells: &[String], columns: &[usize]) {
    let wrapped: Vec<Vec<String>> = cells
        .iter()
        .zip(columns)
        .map(|(cell, width)| {
            cell.lines()
                .flat_map(|line| wrap(line, (*width).max(1)))
                .map(|line| line.into_owned())
                .collect()
        })
        .collect();
    let height = wrapped.iter().map(Vec::len).max().unwrap_or(0);
    for line in 0..height {
        let mut text = String::new();
        for (cell, width) in wrapped.iter().zip(columns) {
            let part = cell.get(line).map(String::as_str).unwrap_or("");
            let pad = width.saturating_sub(part.width());
            let _ = write!(text, "{part}{} | ", " ".repeat(pad));
        }
        let _ = writeln!(out, "{}", text.trim_end_matches([' ', '|']).trim_end());
    }
}

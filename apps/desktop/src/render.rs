//! Plain-text rendering of controller views. Column labels live here and
//! nowhere else.

use std::fmt::{self, Write};

use client_core::{
    controller::ViewState,
    view::EMPTY_HISTORY_MESSAGE,
    AppView, HistoryPanel, HistoryRow, LoginView, Notice, NoticeLevel, View,
};
use shared::domain::Measurement;

pub const TITLE: &str = "Iris Species Predictor";

const MEASUREMENT_LABELS: [&str; 4] = [
    "Sepal length (cm)",
    "Sepal width (cm)",
    "Petal length (cm)",
    "Petal width (cm)",
];
const DATE_LABEL: &str = "Date";
const SPECIES_LABEL: &str = "Predicted species";

pub fn render(view: &View) -> String {
    let mut out = String::new();
    write_view(&mut out, view).expect("writing to a String cannot fail");
    out
}

fn write_view(out: &mut impl Write, view: &View) -> fmt::Result {
    writeln!(out)?;
    for notice in view.notices() {
        writeln!(out, "{}", notice_line(notice))?;
    }
    match view {
        View::Login(login) => write_login(out, login),
        View::App(app) => write_app(out, app),
    }
}

pub fn help_text(state: ViewState) -> String {
    let lines: &[&str] = match state {
        ViewState::LoggedOut => &[
            "login <username> <password>     sign in",
            "register <username> <password>  create an account",
            "quit                            leave",
        ],
        ViewState::LoggedIn => &[
            "set <sl> <sw> <pl> <pw>   measurements in cm, 0.0 to 10.0",
            "predict                   classify the current measurements",
            "history <limit> [offset]  choose the history page (limit 1 to 50)",
            "next | prev               move the history offset by 10",
            "refresh                   redraw the current view",
            "logout                    end the session",
            "quit                      leave",
        ],
    };
    lines.join("\n")
}

pub fn prompt(state: ViewState) -> &'static str {
    match state {
        ViewState::LoggedOut => "iris (logged out)> ",
        ViewState::LoggedIn => "iris> ",
    }
}

fn notice_line(notice: &Notice) -> String {
    let tag = match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Success => "ok",
        NoticeLevel::Error => "error",
    };
    format!("[{tag}] {}", notice.text)
}

fn write_login(out: &mut impl Write, view: &LoginView) -> fmt::Result {
    writeln!(out, "{TITLE}")?;
    writeln!(out)?;
    writeln!(out, "{}", help_text(ViewState::LoggedOut))?;
    writeln!(out)?;
    writeln!(out, "API base URL: {}", view.api_url)
}

fn write_app(out: &mut impl Write, view: &AppView) -> fmt::Result {
    writeln!(out, "{TITLE}")?;
    writeln!(out, "Logged in as: {}", view.username)?;
    writeln!(out)?;

    writeln!(out, "Provided data")?;
    write_table(
        out,
        &MEASUREMENT_LABELS,
        &[measurement_cells(&view.measurement)],
    )?;
    if let Some(species) = &view.last_prediction {
        writeln!(out, "Predicted Iris species: {species}")?;
    }
    writeln!(out)?;

    writeln!(
        out,
        "Prediction history (limit {}, offset {})",
        view.query.limit(),
        view.query.offset()
    )?;
    match &view.history {
        HistoryPanel::Rows(rows) => {
            let headers: Vec<&str> = std::iter::once(DATE_LABEL)
                .chain(MEASUREMENT_LABELS)
                .chain(std::iter::once(SPECIES_LABEL))
                .collect();
            let cells: Vec<Vec<String>> = rows.iter().map(history_cells).collect();
            write_table(out, &headers, &cells)
        }
        HistoryPanel::Empty => writeln!(out, "{EMPTY_HISTORY_MESSAGE}"),
    }
}

fn measurement_cells(measurement: &Measurement) -> Vec<String> {
    [
        measurement.sepal_length(),
        measurement.sepal_width(),
        measurement.petal_length(),
        measurement.petal_width(),
    ]
    .iter()
    .map(|value| format!("{value:.1}"))
    .collect()
}

fn history_cells(row: &HistoryRow) -> Vec<String> {
    vec![
        row.created_at.clone(),
        format!("{:.1}", row.sepal_length),
        format!("{:.1}", row.sepal_width),
        format!("{:.1}", row.petal_length),
        format!("{:.1}", row.petal_width),
        row.predicted_species.clone(),
    ]
}

fn write_table(out: &mut impl Write, headers: &[&str], rows: &[Vec<String>]) -> fmt::Result {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    write_table_line(out, headers.iter().copied(), &widths)?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    writeln!(out, "|-{}-|", rule.join("-|-"))?;
    for row in rows {
        write_table_line(out, row.iter().map(String::as_str), &widths)?;
    }
    Ok(())
}

fn write_table_line<'a>(
    out: &mut impl Write,
    cells: impl Iterator<Item = &'a str>,
    widths: &[usize],
) -> fmt::Result {
    let padded: Vec<String> = cells
        .zip(widths.iter().copied())
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    writeln!(out, "| {} |", padded.join(" | "))
}

//! Text frames for the terminal session.

use handset_core::applets::Banner;
use handset_core::settings::{AppIconStyle, HomeButtonStyle};
use handset_core::shell::DeviceShell;

use crate::app_state::AppState;

const WIDTH: usize = 44;

fn rule() -> String {
    "-".repeat(WIDTH)
}

fn centred(text: &str) -> String {
    format!("{text:^width$}", width = WIDTH)
}

fn icon(label: &str, style: AppIconStyle) -> String {
    let (open, close) = match style {
        AppIconStyle::Rounded => ('(', ')'),
        AppIconStyle::Square => ('[', ']'),
        AppIconStyle::Circle => ('<', '>'),
        AppIconStyle::Glass => ('{', '}'),
    };
    format!("{open}{label}{close}")
}

fn home_button(style: HomeButtonStyle) -> &'static str {
    match style {
        HomeButtonStyle::Circle => "( )",
        HomeButtonStyle::Square => "[ ]",
        HomeButtonStyle::Pill => "(====)",
    }
}

fn lock_screen(shell: &DeviceShell) -> Vec<String> {
    let status = shell.status();
    vec![
        rule(),
        String::new(),
        centred(status.clock()),
        centred(status.date()),
        String::new(),
        centred("Locked. :unlock or :key power"),
        rule(),
    ]
}

fn home_screen(shell: &DeviceShell, elapsed: f64) -> Vec<String> {
    let settings = shell.settings();
    let grid = shell.grid();
    let cols = shell.geometry().cols.max(1) as usize;
    let mut lines = vec![shell.status().line(), rule()];
    for (row, chunk) in grid.order().chunks(cols).enumerate() {
        let cells: String = chunk
            .iter()
            .enumerate()
            .map(|(col, id)| {
                let index = row * cols + col;
                let (dx, _) = grid.jiggle_offset(index, elapsed);
                let pad = if dx > 0.25 { " " } else { "" };
                let cell = format!("{pad}{index:>2} {}", icon(id.label(), settings.app_icon_style));
                format!("{cell:<16}")
            })
            .collect();
        lines.push(cells.trim_end().to_string());
    }
    lines.push(rule());
    if grid.is_editing() {
        lines.push("Editing layout: :drag <from> <to>, :edit when done".into());
    } else {
        lines.push(format!(
            "dock {}   {}",
            settings.taskbar_color.label(),
            home_button(settings.home_button_style)
        ));
    }
    lines
}

fn applet_screen(shell: &DeviceShell) -> Vec<String> {
    let settings = shell.settings();
    let mut lines = vec![shell.status().line(), rule()];
    if let Some(app) = shell.active_app() {
        lines.push(centred(app.label()));
    }
    match shell.banner() {
        Some(Banner::Permission(msg)) => lines.push(format!("!! Permission needed: {msg}")),
        Some(Banner::Failure(msg)) => lines.push(format!("!! {msg}")),
        None => {},
    }
    lines.extend(shell.applet_view());
    if let Some(notice) = shell.notice() {
        lines.push(format!("> {notice}"));
    }
    lines.push(rule());
    lines.push(centred(home_button(settings.home_button_style)));
    lines
}

/// The current screen, one string per row, followed by pending messages.
pub fn frame(state: &mut AppState) -> Vec<String> {
    let elapsed = state.edit_elapsed();
    let shell = &state.shell;
    let mut lines = if shell.is_locked() {
        lock_screen(shell)
    } else if shell.active_app().is_some() {
        applet_screen(shell)
    } else {
        home_screen(shell, elapsed)
    };
    lines.append(&mut state.messages);
    lines
}

use std::io;
use std::io::Write;

use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::style::Color;
use crossterm::style::StyledContent;
use crossterm::style::Stylize;
use crossterm::terminal::Clear;
use crossterm::terminal::ClearType;

use patchbay_core::catalog::PRESETS;
use patchbay_core::state::menu_rows;
use patchbay_core::state::PatchStatus;
use patchbay_core::state::RowStatus;
use patchbay_core::state::SessionMode;
use patchbay_core::state::SessionState;
use patchbay_exec::contracts::DaemonReport;
use patchbay_exec::contracts::OutcomeStatus;
use patchbay_exec::contracts::PatchOutcome;
use patchbay_exec::patcher::BatchVariant;

const EXPERIMENTAL_COLOR: Color = Color::Rgb {
    r: 255,
    g: 99,
    b: 71,
};

pub fn clear_screen() {
    let _ = execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0));
}

pub fn banner() {
    println!(
        "{} {}\n",
        "patchbay".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
}

pub fn render_menu(state: &SessionState) {
    println!("Applications that can be patched:");
    let rows = menu_rows(state);
    if rows.is_empty() {
        println!("  (none found)");
    }
    for row in rows {
        println!("{}. {} [{}]", row.index, row.name, styled_status(row.status));
    }
    println!();

    match state.mode {
        SessionMode::Normal => {
            println!("(A) Patch all apps");
        }
        SessionMode::BatchSelect => {
            let active = BatchVariant::from_gpu_toggle(state.gpu_variant);
            let other = BatchVariant::from_gpu_toggle(!state.gpu_variant);
            println!(
                "(G) Use the {} patch instead of {}",
                other.label(),
                active.label()
            );
            if !state.selection.is_empty() {
                println!("(P) Patch selected apps.");
            }
            println!("(R) Remove batch patch");
        }
    }

    let mode_verb = match state.mode {
        SessionMode::Normal => "Enter",
        SessionMode::BatchSelect => "Exit",
    };
    println!(
        "(C) {mode_verb} batch select mode ({})",
        "EXPERIMENTAL".with(EXPERIMENTAL_COLOR)
    );
    println!(
        "(O) Power presets ({})",
        "EXPERIMENTAL".with(EXPERIMENTAL_COLOR)
    );
    println!("(Q) Quit");
}

fn styled_status(status: RowStatus) -> StyledContent<&'static str> {
    match status {
        RowStatus::Disk(PatchStatus::Patched) => status.label().green(),
        RowStatus::Disk(PatchStatus::Unpatched) => status.label().red(),
        RowStatus::Disk(PatchStatus::StalePatch) => status.label().blue(),
        RowStatus::Disk(PatchStatus::Experimental) => status.label().with(EXPERIMENTAL_COLOR),
        RowStatus::Selected => status.label().cyan(),
    }
}

pub fn render_preset_menu(daemon_enabled: bool) {
    println!("Power preset scenarios:\n");
    for (idx, preset) in PRESETS.iter().enumerate() {
        println!("{}. {}:", idx + 1, preset.title.bold());
        println!("   - {}", preset.scenario);
        println!("   - Max temperature: {}C", preset.max_temp_c);
        println!("   - Power limits: {}\n", preset.limits);
    }
    println!(
        "Daemon: {}",
        if daemon_enabled {
            "installed".green()
        } else {
            "not installed".red()
        }
    );
    println!("(R) Remove daemon");
    println!("(B) Back");
}

/// Reads one operator line. None means the input stream closed (EOF), which
/// the session treats like quit.
pub fn read_command() -> io::Result<Option<String>> {
    print!("Select option: ");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

pub fn print_outcome(outcome: &PatchOutcome) {
    let status = match outcome.status {
        OutcomeStatus::Succeeded => outcome.status.label().green(),
        OutcomeStatus::Failed => outcome.status.label().red(),
        OutcomeStatus::Skipped => outcome.status.label().yellow(),
    };
    match &outcome.detail {
        Some(detail) => println!("{}: {status} ({detail})", outcome.app),
        None => println!("{}: {status}", outcome.app),
    }
}

pub fn print_daemon_report(report: &DaemonReport) {
    let subject = match report.preset.as_deref() {
        Some(preset) => format!("daemon {} ({preset})", report.operation.label()),
        None => format!("daemon {}", report.operation.label()),
    };
    let status = match report.status {
        OutcomeStatus::Succeeded => report.status.label().green(),
        OutcomeStatus::Failed => report.status.label().red(),
        OutcomeStatus::Skipped => report.status.label().yellow(),
    };
    match &report.detail {
        Some(detail) => println!("{subject}: {status} ({detail})"),
        None => println!("{subject}: {status}"),
    }
}

pub fn warn(message: &str) {
    println!("{} {message}", "warning:".yellow());
}

pub fn error(message: &str) {
    println!("{} {message}", "error:".red());
}

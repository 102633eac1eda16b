mod config;
mod ui;

use std::env;
use std::path::Path;

use patchbay_core::actions::PresetChoice;
use patchbay_core::actions::RuntimeAction;
use patchbay_core::actions::SessionAction;
use patchbay_core::actions::SessionEffect;
use patchbay_core::catalog::resolve_preset;
use patchbay_core::command::parse_command;
use patchbay_core::command::parse_preset_choice;
use patchbay_core::discovery::discover;
use patchbay_core::discovery::BundleInspector;
use patchbay_core::journal::JournalEvent;
use patchbay_core::journal::JournalOutcome;
use patchbay_core::journal::JournalStore;
use patchbay_core::reducer::reduce;
use patchbay_core::state::LogEntry;
use patchbay_core::state::LogLevel;
use patchbay_core::state::PatchStatus;
use patchbay_core::state::SessionState;
use patchbay_exec::contracts::BatchReport;
use patchbay_exec::contracts::DaemonReport;
use patchbay_exec::contracts::OutcomeStatus;
use patchbay_exec::contracts::PatchOutcome;
use patchbay_exec::daemon::DaemonManager;
use patchbay_exec::patcher::write_finisher_script;
use patchbay_exec::patcher::AppPatcher;
use patchbay_exec::patcher::BatchVariant;
use patchbay_exec::patcher::BundleState;
use patchbay_exec::patcher::MarkerPatcher;
use patchbay_exec::preflight;
use patchbay_exec::runner::CommandRunner;
use patchbay_exec::runner::ShellRunner;
use patchbay_exec::update;

use crate::config::Config;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut update_requested = false;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            "--version" | "-V" | "version" => {
                println!("patchbay {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--update" | "-u" => update_requested = true,
            other => {
                print_help();
                return Err(format!("unknown argument: {other}").into());
            }
        }
    }

    if !cfg!(target_os = "macos") {
        return Err("patchbay patches macOS application bundles; this host is not macOS".into());
    }

    let runner = ShellRunner;
    let brand = preflight::cpu_brand(&runner)?;
    if !preflight::is_amd_cpu(brand.as_str()) {
        return Err(format!("an AMD CPU is required (found: {brand})").into());
    }
    println!("CPU: {brand}");

    if update_requested {
        let output = update::run_installer(&runner)?;
        if !output.success() {
            return Err(format!("update failed: {}", output.stderr.trim()).into());
        }
        println!("update complete");
        return Ok(());
    }

    if let Some(latest) = update::latest_version(&runner) {
        if update::is_newer(latest.as_str(), env!("CARGO_PKG_VERSION")) {
            ui::warn(&format!(
                "version {latest} is available; run `patchbay --update`"
            ));
        }
    }
    if !preflight::is_root(&runner) {
        ui::warn("not running as root; patching and daemon management may fail");
    }

    let (config, config_warning) = Config::load();
    if let Some(warning) = config_warning {
        ui::warn(warning.as_str());
    }

    let mut journal = open_journal();
    if let Some(journal) = journal.as_mut() {
        let _ = journal.append(JournalEvent::SessionStarted {
            version: env!("CARGO_PKG_VERSION").to_string(),
        });
    }

    let patcher = MarkerPatcher::default();
    let daemon = DaemonManager::new(runner, config.daemon_paths(), config.daemon.fetch_url.clone());

    session_loop(&config, &runner, &patcher, &daemon, &mut journal)
}

/// The interactive loop: one command is fully resolved, including every
/// external invocation it triggers, before the next line is read. Plain
/// iteration, never recursion; the only exits are quit and EOF.
fn session_loop(
    config: &Config,
    runner: &ShellRunner,
    patcher: &MarkerPatcher,
    daemon: &DaemonManager<ShellRunner>,
    journal: &mut Option<JournalStore>,
) -> Result<(), Box<dyn std::error::Error>> {
    let inspector = PatcherInspector { patcher };
    let mut state = SessionState::new();

    loop {
        let apps = discover(config.applications_root.as_path(), &inspector);
        reduce(&mut state, SessionAction::Runtime(RuntimeAction::SetApps(apps)));

        ui::banner();
        ui::render_menu(&state);

        let Some(line) = ui::read_command()? else {
            println!("Bye!");
            return Ok(());
        };
        ui::clear_screen();

        let command = parse_command(line.as_str(), state.mode, state.apps.len());
        let effects = reduce(&mut state, SessionAction::User(command));

        for effect in effects {
            match effect {
                SessionEffect::Quit => {
                    println!("Bye!");
                    return Ok(());
                }
                SessionEffect::PatchApp { bundle_path, .. } => {
                    let outcome = patcher.patch(bundle_path.as_path());
                    report_patch(&mut state, journal, &outcome);
                }
                SessionEffect::PatchAll { targets } => {
                    // Per-item failures are reported and never stop the rest
                    // of the batch.
                    for app in targets {
                        let outcome = patcher.patch(app.bundle_path.as_path());
                        report_patch(&mut state, journal, &outcome);
                    }
                }
                SessionEffect::ApplyBatchPatch {
                    targets,
                    gpu_variant,
                } => {
                    if let Some(version) = preflight::macos_version(runner) {
                        if preflight::needs_relaunch_warning(version) {
                            ui::warn(
                                "this macOS release may need a restart before relaunched apps pick up the new flags",
                            );
                        }
                    }
                    println!("Applying batch patch...");
                    let variant = BatchVariant::from_gpu_toggle(gpu_variant);
                    let mut report = BatchReport::default();
                    for target in &targets {
                        let outcome = patcher.write_batch_flags(target.as_path(), variant);
                        report_patch(&mut state, journal, &outcome);
                        report.push(outcome);
                    }
                    if let Some(journal) = journal.as_mut() {
                        let _ = journal.append(JournalEvent::BatchPatchApplied {
                            count: report.succeeded_count(),
                            gpu_variant,
                        });
                    }
                    if let Err(err) =
                        write_finisher_script(config.finisher_script.as_path(), &targets)
                    {
                        note(
                            &mut state,
                            LogLevel::Error,
                            format!("write finisher script: {err}"),
                        );
                    }
                }
                SessionEffect::SpawnFinisher => {
                    let script = config.finisher_script.to_string_lossy().into_owned();
                    if let Err(err) = runner.spawn_detached("bash", &[script.as_str()]) {
                        note(&mut state, LogLevel::Error, format!("spawn finisher: {err}"));
                    }
                }
                SessionEffect::RemoveBatchPatch { targets } => {
                    println!("Removing batch patch...");
                    let mut removed = 0;
                    for target in &targets {
                        let outcome = patcher.remove_batch_flags(target.as_path());
                        // Bundles that never carried flags are uninteresting.
                        if outcome.status == OutcomeStatus::Skipped {
                            continue;
                        }
                        if outcome.status == OutcomeStatus::Succeeded {
                            removed += 1;
                        }
                        report_patch(&mut state, journal, &outcome);
                    }
                    if let Some(journal) = journal.as_mut() {
                        let _ = journal.append(JournalEvent::BatchPatchRemoved { count: removed });
                    }
                }
                SessionEffect::OpenPresetMenu => {
                    preset_flow(&mut state, daemon, journal)?;
                }
            }
        }
    }
}

fn preset_flow(
    state: &mut SessionState,
    daemon: &DaemonManager<ShellRunner>,
    journal: &mut Option<JournalStore>,
) -> Result<(), Box<dyn std::error::Error>> {
    ui::clear_screen();
    ui::banner();
    ui::render_preset_menu(daemon.enabled());

    let Some(line) = ui::read_command()? else {
        return Ok(());
    };
    ui::clear_screen();

    match parse_preset_choice(line.as_str()) {
        PresetChoice::Apply(key) => {
            let lookup = resolve_preset(key);
            if lookup.is_fallback() {
                note(
                    state,
                    LogLevel::Warn,
                    format!("unknown preset '{key}'; using '{}'", lookup.preset().key),
                );
            }
            let preset = lookup.preset();
            println!("Applying {} power limits...", preset.title);
            let report = daemon.apply(preset.key, preset.args);
            report_daemon(state, &report);
            if let Some(journal) = journal.as_mut() {
                let _ = journal.append(JournalEvent::DaemonApplied {
                    preset: preset.key.to_string(),
                    outcome: journal_outcome(report.status),
                    detail: report.detail.clone(),
                });
            }
        }
        PresetChoice::Remove => {
            println!("Removing power daemon...");
            let report = daemon.remove();
            report_daemon(state, &report);
            if let Some(journal) = journal.as_mut() {
                let _ = journal.append(JournalEvent::DaemonRemoved {
                    outcome: journal_outcome(report.status),
                });
            }
        }
        PresetChoice::Back => {}
    }
    Ok(())
}

struct PatcherInspector<'a> {
    patcher: &'a MarkerPatcher,
}

impl BundleInspector for PatcherInspector<'_> {
    fn supported(&self, bundle: &Path) -> bool {
        self.patcher.supported(bundle)
    }

    fn classify(&self, bundle: &Path) -> PatchStatus {
        match self.patcher.inspect(bundle) {
            BundleState::Unpatched => PatchStatus::Unpatched,
            BundleState::Patched => PatchStatus::Patched,
            BundleState::Stale => PatchStatus::StalePatch,
            BundleState::Experimental => PatchStatus::Experimental,
        }
    }
}

fn report_patch(
    state: &mut SessionState,
    journal: &mut Option<JournalStore>,
    outcome: &PatchOutcome,
) {
    ui::print_outcome(outcome);
    let level = match outcome.status {
        OutcomeStatus::Succeeded => LogLevel::Info,
        OutcomeStatus::Skipped => LogLevel::Warn,
        OutcomeStatus::Failed => LogLevel::Error,
    };
    let message = match outcome.detail.as_deref() {
        Some(detail) => format!("{} {}: {detail}", outcome.app, outcome.status.label()),
        None => format!("{} {}", outcome.app, outcome.status.label()),
    };
    reduce(
        state,
        SessionAction::Runtime(RuntimeAction::AppendLog(LogEntry::new(level, message))),
    );
    if let Some(journal) = journal.as_mut() {
        let _ = journal.append(JournalEvent::AppPatched {
            name: outcome.app.clone(),
            bundle_path: outcome.bundle_path.clone(),
            outcome: journal_outcome(outcome.status),
            detail: outcome.detail.clone(),
        });
    }
}

fn report_daemon(state: &mut SessionState, report: &DaemonReport) {
    ui::print_daemon_report(report);
    let level = if report.status == OutcomeStatus::Failed {
        LogLevel::Error
    } else {
        LogLevel::Info
    };
    let message = match report.detail.as_deref() {
        Some(detail) => format!(
            "daemon {} {}: {detail}",
            report.operation.label(),
            report.status.label()
        ),
        None => format!(
            "daemon {} {}",
            report.operation.label(),
            report.status.label()
        ),
    };
    reduce(
        state,
        SessionAction::Runtime(RuntimeAction::AppendLog(LogEntry::new(level, message))),
    );
}

fn note(state: &mut SessionState, level: LogLevel, message: String) {
    match level {
        LogLevel::Info => println!("{message}"),
        LogLevel::Warn => ui::warn(message.as_str()),
        LogLevel::Error => ui::error(message.as_str()),
    }
    reduce(
        state,
        SessionAction::Runtime(RuntimeAction::AppendLog(LogEntry::new(level, message))),
    );
}

fn journal_outcome(status: OutcomeStatus) -> JournalOutcome {
    match status {
        OutcomeStatus::Succeeded => JournalOutcome::Succeeded,
        OutcomeStatus::Failed => JournalOutcome::Failed,
        OutcomeStatus::Skipped => JournalOutcome::Skipped,
    }
}

fn open_journal() -> Option<JournalStore> {
    let path = Config::journal_path()?;
    match JournalStore::open(path.as_path()) {
        Ok(store) => Some(store),
        Err(err) => {
            ui::warn(&format!("session journal disabled: {err}"));
            None
        }
    }
}

fn print_help() {
    println!("patchbay {}", env!("CARGO_PKG_VERSION"));
    println!("Usage:");
    println!("  patchbay            start the interactive session");
    println!("  patchbay --update   update patchbay itself");
    println!("  patchbay --help");
    println!("  patchbay --version");
}

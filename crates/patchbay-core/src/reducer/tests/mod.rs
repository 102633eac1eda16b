use std::path::PathBuf;

pub(super) use super::reduce;
pub(super) use crate::actions::RuntimeAction;
pub(super) use crate::actions::SessionAction;
pub(super) use crate::actions::SessionEffect;
pub(super) use crate::actions::UserCommand;
pub(super) use crate::state::AppRecord;
pub(super) use crate::state::LogEntry;
pub(super) use crate::state::LogLevel;
pub(super) use crate::state::PatchStatus;
pub(super) use crate::state::SessionMode;
pub(super) use crate::state::SessionState;

mod mode_transitions;

fn state() -> SessionState {
    SessionState::new()
}

fn app(name: &str) -> AppRecord {
    AppRecord {
        name: name.to_string(),
        bundle_path: PathBuf::from(format!("/Applications/{name}.app")),
        status: PatchStatus::Unpatched,
    }
}

fn loaded_state(names: &[&str]) -> SessionState {
    let mut session = state();
    reduce(
        &mut session,
        SessionAction::Runtime(RuntimeAction::SetApps(
            names.iter().map(|name| app(name)).collect(),
        )),
    );
    session
}

fn batch_state(names: &[&str]) -> SessionState {
    let mut session = loaded_state(names);
    reduce(&mut session, SessionAction::User(UserCommand::ToggleMode));
    session
}

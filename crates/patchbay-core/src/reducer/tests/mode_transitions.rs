use pretty_assertions::assert_eq;

use super::*;

#[test]
fn quit_is_an_effect_not_a_state_change() {
    let mut session = state();
    let effects = reduce(&mut session, SessionAction::User(UserCommand::Quit));
    assert_eq!(effects, vec![SessionEffect::Quit]);
    assert_eq!(session.mode, SessionMode::Normal);
}

#[test]
fn toggle_mode_round_trips() {
    let mut session = state();
    assert_eq!(session.mode, SessionMode::Normal);

    reduce(&mut session, SessionAction::User(UserCommand::ToggleMode));
    assert_eq!(session.mode, SessionMode::BatchSelect);

    reduce(&mut session, SessionAction::User(UserCommand::ToggleMode));
    assert_eq!(session.mode, SessionMode::Normal);
}

#[test]
fn variant_only_flips_in_batch_mode() {
    let mut session = state();
    reduce(&mut session, SessionAction::User(UserCommand::ToggleVariant));
    assert!(!session.gpu_variant);

    reduce(&mut session, SessionAction::User(UserCommand::ToggleMode));
    reduce(&mut session, SessionAction::User(UserCommand::ToggleVariant));
    assert!(session.gpu_variant);

    reduce(&mut session, SessionAction::User(UserCommand::ToggleVariant));
    assert!(!session.gpu_variant);
}

#[test]
fn batch_only_commands_produce_nothing_in_normal_mode() {
    let mut session = loaded_state(&["Alpha", "Beta"]);
    session.selection.insert(session.apps[0].bundle_path.clone());

    for command in [UserCommand::PatchSelected, UserCommand::RemoveBatchPatch] {
        let effects = reduce(&mut session, SessionAction::User(command));
        assert_eq!(effects, Vec::new(), "{command:?} must fail closed");
    }
    // The stray selection is untouched: nothing executed against it.
    assert_eq!(session.selection.len(), 1);
}

#[test]
fn patch_all_produces_nothing_in_batch_mode() {
    let mut session = batch_state(&["Alpha", "Beta"]);
    let effects = reduce(&mut session, SessionAction::User(UserCommand::PatchAll));
    assert_eq!(effects, Vec::new());
}

#[test]
fn preset_menu_opens_from_either_mode() {
    let mut session = state();
    assert_eq!(
        reduce(&mut session, SessionAction::User(UserCommand::PresetMenu)),
        vec![SessionEffect::OpenPresetMenu]
    );

    reduce(&mut session, SessionAction::User(UserCommand::ToggleMode));
    assert_eq!(
        reduce(&mut session, SessionAction::User(UserCommand::PresetMenu)),
        vec![SessionEffect::OpenPresetMenu]
    );
}

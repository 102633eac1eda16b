use super::actions::PresetChoice;
use super::actions::UserCommand;
use super::catalog::PRESETS;
use super::state::SessionMode;

/// Resolves one operator input token against the current session mode.
///
/// Tokens are single words, case-insensitive. The same literal token can mean
/// different things in different modes, so the mode is consulted before the
/// token is mapped, and any token whose mode precondition does not hold
/// resolves to `Noop` rather than to the other mode's command.
pub fn parse_command(input: &str, mode: SessionMode, app_count: usize) -> UserCommand {
    let token = input.trim().to_ascii_lowercase();

    match token.as_str() {
        "q" => UserCommand::Quit,
        "c" => UserCommand::ToggleMode,
        "g" if mode == SessionMode::BatchSelect => UserCommand::ToggleVariant,
        "a" if mode == SessionMode::Normal => UserCommand::PatchAll,
        "p" if mode == SessionMode::BatchSelect => UserCommand::PatchSelected,
        "r" if mode == SessionMode::BatchSelect => UserCommand::RemoveBatchPatch,
        "o" => UserCommand::PresetMenu,
        _ => parse_index(token.as_str(), app_count),
    }
}

fn parse_index(token: &str, app_count: usize) -> UserCommand {
    match token.parse::<usize>() {
        Ok(position) if position >= 1 && position <= app_count => {
            UserCommand::Select(position - 1)
        }
        _ => UserCommand::Noop,
    }
}

/// Resolves one token inside the preset sub-flow: a catalog position applies
/// that preset, `r` removes the daemon, anything else backs out.
pub fn parse_preset_choice(input: &str) -> PresetChoice {
    let token = input.trim().to_ascii_lowercase();

    if token == "r" {
        return PresetChoice::Remove;
    }
    match token.parse::<usize>() {
        Ok(position) if position >= 1 && position <= PRESETS.len() => {
            PresetChoice::Apply(PRESETS[position - 1].key)
        }
        _ => PresetChoice::Back,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn tokens_are_case_insensitive_and_trimmed() {
        assert_eq!(
            parse_command("  Q \n", SessionMode::Normal, 0),
            UserCommand::Quit
        );
        assert_eq!(
            parse_command("C", SessionMode::BatchSelect, 0),
            UserCommand::ToggleMode
        );
        assert_eq!(
            parse_command("O", SessionMode::Normal, 0),
            UserCommand::PresetMenu
        );
    }

    #[test]
    fn mode_gated_tokens_fail_closed() {
        // Batch-only tokens are no-ops in normal mode, not the other branch.
        assert_eq!(
            parse_command("g", SessionMode::Normal, 3),
            UserCommand::Noop
        );
        assert_eq!(
            parse_command("p", SessionMode::Normal, 3),
            UserCommand::Noop
        );
        assert_eq!(
            parse_command("r", SessionMode::Normal, 3),
            UserCommand::Noop
        );
        // And patch-all never fires from batch-select mode.
        assert_eq!(
            parse_command("a", SessionMode::BatchSelect, 3),
            UserCommand::Noop
        );
    }

    #[test]
    fn mode_gated_tokens_resolve_in_their_mode() {
        assert_eq!(
            parse_command("g", SessionMode::BatchSelect, 0),
            UserCommand::ToggleVariant
        );
        assert_eq!(
            parse_command("p", SessionMode::BatchSelect, 0),
            UserCommand::PatchSelected
        );
        assert_eq!(
            parse_command("r", SessionMode::BatchSelect, 0),
            UserCommand::RemoveBatchPatch
        );
        assert_eq!(
            parse_command("a", SessionMode::Normal, 0),
            UserCommand::PatchAll
        );
    }

    #[test]
    fn numeric_tokens_respect_bounds() {
        assert_eq!(
            parse_command("1", SessionMode::Normal, 3),
            UserCommand::Select(0)
        );
        assert_eq!(
            parse_command("3", SessionMode::BatchSelect, 3),
            UserCommand::Select(2)
        );
        assert_eq!(
            parse_command("0", SessionMode::Normal, 3),
            UserCommand::Noop
        );
        assert_eq!(
            parse_command("4", SessionMode::Normal, 3),
            UserCommand::Noop
        );
        assert_eq!(
            parse_command("2", SessionMode::Normal, 0),
            UserCommand::Noop
        );
    }

    #[test]
    fn garbage_tokens_are_noops() {
        for input in ["", "  ", "x", "patch", "-1", "1.5", "q q"] {
            assert_eq!(
                parse_command(input, SessionMode::Normal, 5),
                UserCommand::Noop,
                "input {input:?} should be a no-op"
            );
        }
    }

    #[test]
    fn preset_choices_map_catalog_positions() {
        assert_eq!(parse_preset_choice("1"), PresetChoice::Apply("balanced"));
        assert_eq!(parse_preset_choice("4"), PresetChoice::Apply("gaming"));
        assert_eq!(parse_preset_choice("R"), PresetChoice::Remove);
        assert_eq!(parse_preset_choice("5"), PresetChoice::Back);
        assert_eq!(parse_preset_choice("back"), PresetChoice::Back);
        assert_eq!(parse_preset_choice(""), PresetChoice::Back);
    }
}

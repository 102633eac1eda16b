/// A named power-limit scenario for the background daemon. `args` is the
/// ordered argument list substituted into the service descriptor; descriptor
/// order must match catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerPreset {
    pub key: &'static str,
    pub title: &'static str,
    pub scenario: &'static str,
    pub max_temp_c: u32,
    pub limits: &'static str,
    pub args: &'static [&'static str],
}

pub const DEFAULT_PRESET: &str = "balanced";

pub static PRESETS: [PowerPreset; 4] = [
    PowerPreset {
        key: "balanced",
        title: "Balanced",
        scenario: "Everyday use, browsing, and light work.",
        max_temp_c: 75,
        limits: "7W (STAPM), 8W (SLOW), 9W (FAST)",
        args: &[
            "--stapm-limit=7000",
            "--slow-limit=8000",
            "--fast-limit=9000",
            "--tctl-temp=75",
            "--apu-skin-temp=75",
        ],
    },
    PowerPreset {
        key: "performance",
        title: "Performance",
        scenario: "Heavy tasks such as video rendering or compiling.",
        max_temp_c: 85,
        limits: "12W (STAPM), 13W (SLOW), 15W (FAST)",
        args: &[
            "--stapm-limit=12000",
            "--slow-limit=13000",
            "--fast-limit=15000",
            "--tctl-temp=85",
            "--apu-skin-temp=85",
        ],
    },
    PowerPreset {
        key: "silent",
        title: "Silent",
        scenario: "Media playback or work in quiet environments.",
        max_temp_c: 60,
        limits: "5W (STAPM), 5.5W (SLOW), 6W (FAST)",
        args: &[
            "--stapm-limit=5000",
            "--slow-limit=5500",
            "--fast-limit=6000",
            "--tctl-temp=60",
            "--apu-skin-temp=60",
        ],
    },
    PowerPreset {
        key: "gaming",
        title: "Gaming",
        scenario: "Gaming, for maximum sustained performance.",
        max_temp_c: 90,
        limits: "20W (STAPM), 22W (SLOW), 25W (FAST)",
        args: &[
            "--stapm-limit=20000",
            "--slow-limit=22000",
            "--fast-limit=25000",
            "--tctl-temp=90",
            "--apu-skin-temp=90",
        ],
    },
];

/// Outcome of a catalog lookup. An unknown name is never fatal: it resolves
/// to the default preset and the caller decides how loudly to warn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetLookup {
    Exact(&'static PowerPreset),
    Fallback(&'static PowerPreset),
}

impl PresetLookup {
    pub fn preset(self) -> &'static PowerPreset {
        match self {
            Self::Exact(preset) | Self::Fallback(preset) => preset,
        }
    }

    pub fn is_fallback(self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

pub fn find_preset(key: &str) -> Option<&'static PowerPreset> {
    let key = key.trim().to_ascii_lowercase();
    PRESETS.iter().find(|preset| preset.key == key)
}

pub fn resolve_preset(key: &str) -> PresetLookup {
    match find_preset(key) {
        Some(preset) => PresetLookup::Exact(preset),
        None => {
            let fallback = find_preset(DEFAULT_PRESET)
                .unwrap_or(&PRESETS[0]);
            PresetLookup::Fallback(fallback)
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn catalog_covers_the_required_presets() {
        let keys: Vec<&str> = PRESETS.iter().map(|preset| preset.key).collect();
        assert_eq!(keys, vec!["balanced", "performance", "silent", "gaming"]);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let lookup = resolve_preset("Gaming");
        assert!(!lookup.is_fallback());
        assert_eq!(lookup.preset().key, "gaming");
    }

    #[test]
    fn unknown_names_fall_back_to_balanced() {
        let lookup = resolve_preset("turbo-ludicrous");
        assert!(lookup.is_fallback());
        assert_eq!(lookup.preset().args, resolve_preset("balanced").preset().args);
    }

    #[test]
    fn argument_lists_are_ordered_and_disjoint_per_preset() {
        for preset in &PRESETS {
            assert_eq!(preset.args.len(), 5, "{} argument count", preset.key);
            assert!(preset.args[0].starts_with("--stapm-limit="));
            assert!(preset.args[4].starts_with("--apu-skin-temp="));
        }
        // No argument value is shared between balanced and gaming, so a
        // descriptor rendered for one can never be mistaken for the other.
        let balanced = resolve_preset("balanced").preset();
        let gaming = resolve_preset("gaming").preset();
        for arg in balanced.args {
            assert!(!gaming.args.contains(arg));
        }
    }
}

//! Pallet loading: a JSON file, then command-line overrides on top.

use std::path::{Path, PathBuf};

use frankentest_core::{DisplayMode, Pallet, Theme, Verbosity};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed reading '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid pallet json in '{}': {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid seed '{raw}': expected decimal or 0x-prefixed hex")]
    Seed { raw: String },
}

/// Read a pallet from a JSON file. Missing sections take their defaults.
pub fn load_pallet(path: &Path) -> Result<Pallet, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a seed given as decimal or `0x` hex; `_` separators are allowed.
pub fn parse_seed(raw: &str) -> Result<u64, ConfigError> {
    let s = raw.trim();
    let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u64::from_str_radix(&hex.replace('_', ""), 16)
    } else {
        s.replace('_', "").parse::<u64>()
    };
    parsed.map_err(|_| ConfigError::Seed {
        raw: raw.to_string(),
    })
}

/// Command-line values layered over a loaded pallet. `None` leaves the field alone.
#[derive(Debug, Clone, Default)]
pub struct PalletOverrides {
    pub filter_name: Option<String>,
    pub filter_suite: Option<String>,
    pub filter_tag: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub shuffle: bool,
    pub seed: Option<u64>,
    pub shuffle_by: Option<String>,
    pub only: Option<String>,
    pub skip: Option<String>,
    pub repeat: Option<u32>,
    pub fail_fast: bool,
    pub theme: Option<String>,
    pub mode: Option<String>,
    pub verbose: Option<String>,
    pub show_result: Option<String>,
    pub timeout_secs: Option<u64>,
    pub author: Option<String>,
    pub origin: Option<String>,
    pub timestamp: Option<i64>,
    pub run_id: Option<String>,
}

fn set<T>(slot: &mut Option<T>, value: &Option<T>)
where
    T: Clone,
{
    if let Some(v) = value {
        *slot = Some(v.clone());
    }
}

impl PalletOverrides {
    /// Apply onto `pallet`. Boolean switches can only turn a setting on; an explicit
    /// seed also enables shuffling.
    pub fn apply(&self, pallet: &mut Pallet) {
        set(&mut pallet.filter.name, &self.filter_name);
        set(&mut pallet.filter.suite, &self.filter_suite);
        set(&mut pallet.filter.tag, &self.filter_tag);
        set(&mut pallet.sort.by, &self.sort_by);
        set(&mut pallet.sort.order, &self.sort_order);
        set(&mut pallet.shuffle.by, &self.shuffle_by);
        set(&mut pallet.run.only, &self.only);
        set(&mut pallet.run.skip, &self.skip);
        set(&mut pallet.show.result, &self.show_result);
        set(&mut pallet.timeout_secs, &self.timeout_secs);
        set(&mut pallet.author, &self.author);
        set(&mut pallet.origin, &self.origin);
        set(&mut pallet.fixed_timestamp, &self.timestamp);
        set(&mut pallet.run_id, &self.run_id);

        if self.shuffle || self.seed.is_some() {
            pallet.shuffle.enabled = true;
        }
        if let Some(seed) = self.seed {
            pallet.shuffle.seed = Some(seed);
        }
        if let Some(repeat) = self.repeat {
            pallet.run.repeat = repeat;
        }
        if self.fail_fast {
            pallet.run.fail_fast = true;
        }
        if let Some(theme) = &self.theme {
            pallet.theme = Theme::from_str_loose(theme);
        }
        if let Some(mode) = &self.mode {
            pallet.show.mode = DisplayMode::from_str_loose(mode);
        }
        if let Some(verbose) = &self.verbose {
            pallet.show.verbose = Verbosity::from_str_loose(verbose);
        }
    }
}

/// Load `path` when given, otherwise start from defaults, then apply `overrides`.
pub fn resolve_pallet(
    path: Option<&Path>,
    overrides: &PalletOverrides,
) -> Result<Pallet, ConfigError> {
    let mut pallet = match path {
        Some(path) => load_pallet(path)?,
        None => Pallet::default(),
    };
    overrides.apply(&mut pallet);
    Ok(pallet)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_seed_accepts_hex_and_decimal() {
        assert_eq!(parse_seed("42").unwrap(), 42);
        assert_eq!(parse_seed("0xDEAD_BEEF").unwrap(), 0xDEAD_BEEF);
        assert_eq!(parse_seed(" 1_000 ").unwrap(), 1000);
        assert!(matches!(parse_seed("0xZZ"), Err(ConfigError::Seed { .. })));
        assert!(parse_seed("-1").is_err());
    }

    #[test]
    fn overrides_layer_on_defaults() {
        let overrides = PalletOverrides {
            only: Some("adds".to_string()),
            seed: Some(9),
            repeat: Some(4),
            theme: Some("tap".to_string()),
            mode: Some("tree".to_string()),
            ..PalletOverrides::default()
        };
        let pallet = resolve_pallet(None, &overrides).unwrap();
        assert_eq!(pallet.run.only.as_deref(), Some("adds"));
        assert!(pallet.shuffle.enabled);
        assert_eq!(pallet.shuffle.seed, Some(9));
        assert_eq!(pallet.run.repeat, 4);
        assert_eq!(pallet.theme, Theme::Tap);
        assert_eq!(pallet.show.mode, DisplayMode::Tree);
        assert!(!pallet.run.fail_fast);
    }

    #[test]
    fn empty_overrides_keep_loaded_values() {
        let mut pallet = Pallet::default();
        pallet.run.fail_fast = true;
        pallet.filter.tag = Some("db".to_string());
        PalletOverrides::default().apply(&mut pallet);
        assert!(pallet.run.fail_fast);
        assert_eq!(pallet.filter.tag.as_deref(), Some("db"));
        assert!(!pallet.shuffle.enabled);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_pallet(Path::new("/nonexistent/pallet.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/pallet.json"));
    }
}

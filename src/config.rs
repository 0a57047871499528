//! Layered application configuration.
//!
//! Settings are resolved in this order, later layers winning:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. The TOML file (`--config PATH`, or `config.toml` in the platform
//!    config directory)
//! 3. The `[profile.<name>]` table selected with `--profile`
//! 4. `DUPEFINDER_*` environment variables (`DUPEFINDER_IO_THREADS=8`)
//! 5. Command-line flags ([`Config::merge_cli`], [`Config::merge_scan_args`])
//!
//! Loading never fails: a missing file means defaults, and a malformed one
//! is reported with a warning before falling back to defaults. Unknown keys
//! are warned about with the closest known key as a suggestion.
//!
//! ```toml
//! mode = "fuzzy"
//! threshold = 20
//! skip_hidden = true
//! ignore_patterns = ["*.tmp", "node_modules"]
//!
//! [profile.notes]
//! threshold = 5
//! strategy = "linked"
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::{Cli, ScanArgs};
use crate::duplicates::{levenshtein, ClusterStrategy, FinderConfig, DEFAULT_THRESHOLD};
use crate::scanner::{FingerprintMode, WalkerConfig};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "DUPEFINDER_";

/// File name of the configuration file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// File name of the default rules document inside the config directory.
pub const RULES_FILE_NAME: &str = "categorization-rules.json";

/// Keys accepted at the top level and inside profiles.
const KNOWN_KEYS: &[&str] = &[
    "mode",
    "threshold",
    "strategy",
    "io_threads",
    "follow_symlinks",
    "skip_hidden",
    "ignore_patterns",
    "rules_path",
    "no_color",
];

/// Maximum edit distance for a "did you mean" suggestion.
const SUGGESTION_DISTANCE: usize = 3;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fingerprint mode
    pub mode: FingerprintMode,
    /// Edit-distance threshold for fuzzy mode
    pub threshold: usize,
    /// Clustering strategy for fuzzy mode
    pub strategy: ClusterStrategy,
    /// Fingerprinting threads
    pub io_threads: usize,
    /// Follow symbolic links while walking
    pub follow_symlinks: bool,
    /// Skip dot-files and dot-directories
    pub skip_hidden: bool,
    /// Gitignore-style patterns to skip
    pub ignore_patterns: Vec<String>,
    /// Rules document; [`default_rules_path`] when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules_path: Option<PathBuf>,
    /// Disable ANSI colors in text output
    pub no_color: bool,
    /// Named overrides selectable with `--profile`
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub profile: HashMap<String, ProfileConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: FingerprintMode::Exact,
            threshold: DEFAULT_THRESHOLD,
            strategy: ClusterStrategy::Anchor,
            io_threads: 4,
            follow_symlinks: false,
            skip_hidden: false,
            ignore_patterns: Vec::new(),
            rules_path: None,
            no_color: false,
            profile: HashMap::new(),
        }
    }
}

/// A `[profile.<name>]` table; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<FingerprintMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<ClusterStrategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub io_threads: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_symlinks: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_hidden: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_patterns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_color: Option<bool>,
}

impl Config {
    /// Load from `path` (or the platform default) with an optional profile.
    #[must_use]
    pub fn load(path: Option<&Path>, profile: Option<&str>) -> Self {
        match path.map(Path::to_path_buf).or_else(default_config_path) {
            Some(path) => Self::load_from_path(path, profile),
            None => {
                log::debug!("No config directory available; using defaults");
                Self::apply_env(Self::default())
            }
        }
    }

    /// Load from a specific TOML file with an optional profile.
    ///
    /// A missing file is not an error.
    #[must_use]
    pub fn load_from_path(path: PathBuf, profile: Option<&str>) -> Self {
        if path.exists() {
            warn_unknown_keys(&path);
        } else {
            log::debug!("Config file {} not found; using defaults", path.display());
        }

        let figment =
            Figment::from(Serialized::defaults(Self::default())).merge(Toml::file(&path));
        let mut config: Self = match figment.extract() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring invalid config file {}: {}", path.display(), e);
                Self::default()
            }
        };

        if let Some(name) = profile {
            match config.profile.get(name).cloned() {
                Some(overrides) => {
                    log::debug!("Applying config profile '{name}'");
                    config.apply_profile(overrides);
                }
                None => log::warn!(
                    "Profile '{}' not found in {}; available: [{}]",
                    name,
                    path.display(),
                    config.profile_names().join(", ")
                ),
            }
        }

        Self::apply_env(config)
    }

    /// Profile names, sorted.
    #[must_use]
    pub fn profile_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.profile.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn apply_profile(&mut self, p: ProfileConfig) {
        if let Some(v) = p.mode {
            self.mode = v;
        }
        if let Some(v) = p.threshold {
            self.threshold = v;
        }
        if let Some(v) = p.strategy {
            self.strategy = v;
        }
        if let Some(v) = p.io_threads {
            self.io_threads = v;
        }
        if let Some(v) = p.follow_symlinks {
            self.follow_symlinks = v;
        }
        if let Some(v) = p.skip_hidden {
            self.skip_hidden = v;
        }
        if let Some(v) = p.ignore_patterns {
            self.ignore_patterns = v;
        }
        if let Some(v) = p.rules_path {
            self.rules_path = Some(v);
        }
        if let Some(v) = p.no_color {
            self.no_color = v;
        }
    }

    fn apply_env(config: Self) -> Self {
        let figment = Figment::from(Serialized::defaults(config.clone()))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["profile", "config"]));
        match figment.extract() {
            Ok(merged) => merged,
            Err(e) => {
                log::warn!("Ignoring invalid {ENV_PREFIX}* environment variable: {e}");
                config
            }
        }
    }

    /// Apply global CLI flags.
    pub fn merge_cli(&mut self, cli: &Cli) {
        if cli.no_color {
            self.no_color = true;
        }
    }

    /// Apply `scan` flags that were given explicitly.
    pub fn merge_scan_args(&mut self, args: &ScanArgs) {
        if let Some(mode) = args.mode {
            self.mode = mode;
        }
        if let Some(threshold) = args.threshold {
            self.threshold = threshold;
        }
        if let Some(strategy) = args.strategy {
            self.strategy = strategy;
        }
        if let Some(threads) = args.io_threads {
            self.io_threads = threads;
        }
        if args.follow_symlinks {
            self.follow_symlinks = true;
        } else if args.no_follow_symlinks {
            self.follow_symlinks = false;
        }
        if args.skip_hidden {
            self.skip_hidden = true;
        } else if args.no_skip_hidden {
            self.skip_hidden = false;
        }
        self.ignore_patterns.extend(args.ignore_patterns.iter().cloned());
        if let Some(rules) = &args.rules {
            self.rules_path = Some(rules.clone());
        }
    }

    /// Rules document location.
    #[must_use]
    pub fn rules_path(&self) -> PathBuf {
        self.rules_path.clone().unwrap_or_else(default_rules_path)
    }

    /// Walker settings.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::new(
            self.follow_symlinks,
            self.skip_hidden,
            self.ignore_patterns.clone(),
        )
    }

    /// Finder settings, without shutdown flag or progress callback.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig::default()
            .with_mode(self.mode)
            .with_threshold(self.threshold)
            .with_strategy(self.strategy)
            .with_io_threads(self.io_threads)
            .with_walker_config(self.walker_config())
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "dupefinder")
}

/// `config.toml` in the platform config directory.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// `categorization-rules.json` in the platform config directory, or in the
/// working directory when no home directory is known.
#[must_use]
pub fn default_rules_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.config_dir().join(RULES_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(RULES_FILE_NAME))
}

/// Closest known key within [`SUGGESTION_DISTANCE`] edits.
fn suggest_key(unknown: &str) -> Option<&'static str> {
    KNOWN_KEYS
        .iter()
        .map(|known| (levenshtein(unknown, known), *known))
        .filter(|(distance, _)| *distance <= SUGGESTION_DISTANCE)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, known)| known)
}

/// Unknown keys in a parsed config table, as `(dotted_key, suggestion)`.
fn unknown_keys(table: &toml::Table) -> Vec<(String, Option<&'static str>)> {
    let mut found = Vec::new();
    for (key, value) in table {
        if key == "profile" {
            let Some(profiles) = value.as_table() else {
                continue;
            };
            for (name, profile) in profiles {
                let Some(profile) = profile.as_table() else {
                    continue;
                };
                for inner in profile.keys() {
                    if !KNOWN_KEYS.contains(&inner.as_str()) {
                        found.push((format!("profile.{name}.{inner}"), suggest_key(inner)));
                    }
                }
            }
        } else if !KNOWN_KEYS.contains(&key.as_str()) {
            found.push((key.clone(), suggest_key(key)));
        }
    }
    found
}

fn warn_unknown_keys(path: &Path) {
    let Ok(content) = std::fs::read_to_string(path) else {
        return;
    };
    let Ok(table) = content.parse::<toml::Table>() else {
        return;
    };
    for (key, suggestion) in unknown_keys(&table) {
        match suggestion {
            Some(known) => log::warn!(
                "Unknown config key '{}' in {}. Did you mean '{}'?",
                key,
                path.display(),
                known
            ),
            None => log::warn!("Unknown config key '{}' in {}", key, path.display()),
        }
    }
}

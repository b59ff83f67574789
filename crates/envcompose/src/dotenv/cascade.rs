//! Resolves a dotenv base path into an ordered cascade of files and
//! populates the process environment from them, Symfony-`Dotenv`-style.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::error::Error;
use super::lexer::DotenvLexer;

/// Process-wide sentinel recording which keys this system has populated.
///
/// Only keys in this set (or written under `override=true`) may be
/// overwritten by a later cascade; everything else is a host-owned value
/// the cascade must never clobber.
pub const VARS_SENTINEL: &str = "NODE_DOTENV_VARS";

/// Process-wide sentinel recording the last base path a cascade resolved.
pub const PATH_SENTINEL: &str = "NODE_DOTENV_PATH";

/// Options controlling one [`DotenvCascade::load_env`] or
/// [`DotenvCascade::boot_env`] call.
#[derive(Debug, Clone)]
pub struct CascadeOptions {
    /// Base `.env` path; cascade members are derived by suffix.
    pub base: PathBuf,
    /// Process-env key holding the active environment name (e.g. `APP_ENV`).
    pub env_key: String,
    /// Value assigned to `env_key` when it is unset.
    pub default_env: String,
    /// Environments for which `base.local` is skipped.
    pub test_envs: Vec<String>,
    /// Environments considered production, for [`DotenvCascade::boot_env`]'s
    /// debug-key default.
    pub prod_envs: Vec<String>,
    /// Process-env key written by [`DotenvCascade::boot_env`].
    pub debug_key: String,
    /// Whether a cascade write may clobber a host-owned (non-sentinel) key.
    pub r#override: bool,
}

impl Default for CascadeOptions {
    fn default() -> Self {
        CascadeOptions {
            base: PathBuf::from(".env"),
            env_key: "APP_ENV".to_string(),
            default_env: "dev".to_string(),
            test_envs: vec!["test".to_string()],
            prod_envs: vec!["prod".to_string()],
            debug_key: "APP_DEBUG".to_string(),
            r#override: false,
        }
    }
}

/// Implements the multi-file `.env` precedence cascade and its
/// override-aware population into process environment.
pub struct DotenvCascade;

impl DotenvCascade {
    /// Runs the multi-file precedence cascade, writing into process
    /// environment as it goes.
    pub fn load_env(options: &CascadeOptions) -> Result<(), Error> {
        let base = &options.base;
        let primary = if base.exists() {
            base.clone()
        } else {
            dist_path(base)
        };
        if !primary.exists() {
            return Err(Error::Path {
                path: base.display().to_string(),
                reason: "neither the base path nor its .dist counterpart exists".to_string(),
            });
        }

        set_sentinel_path(base);

        let values = read_dotenv(&primary)?;
        Self::populate(&values, options.r#override);

        if std::env::var(&options.env_key).is_err() {
            let mut defaulted = indexmap::IndexMap::new();
            defaulted.insert(options.env_key.clone(), options.default_env.clone());
            Self::populate(&defaulted, options.r#override);
        }

        let current_env = std::env::var(&options.env_key).unwrap_or_else(|_| options.default_env.clone());

        if !options.test_envs.iter().any(|e| e == &current_env) {
            let local = suffixed(base, "local");
            if local.exists() {
                let values = read_dotenv(&local)?;
                Self::populate(&values, options.r#override);
            }
        }

        if current_env == "local" {
            return Ok(());
        }

        let per_env = suffixed(base, &current_env);
        if per_env.exists() {
            let values = read_dotenv(&per_env)?;
            Self::populate(&values, options.r#override);
        }

        let per_env_local = suffixed_twice(base, &current_env, "local");
        if per_env_local.exists() {
            let values = read_dotenv(&per_env_local)?;
            Self::populate(&values, options.r#override);
        }

        Ok(())
    }

    /// Runs [`Self::load_env`], then establishes `options.debug_key`.
    pub fn boot_env(options: &CascadeOptions) -> Result<(), Error> {
        Self::load_env(options)?;

        let current_env = std::env::var(&options.env_key).unwrap_or_else(|_| options.default_env.clone());
        let is_prod = options.prod_envs.iter().any(|e| e == &current_env);

        match std::env::var(&options.debug_key) {
            Err(_) => {
                let value = if is_prod { "0" } else { "1" };
                // SAFETY: single-threaded bootstrap phase; mutating process
                // environment here is a documented, deliberate effect.
                unsafe { std::env::set_var(&options.debug_key, value) };
            }
            Ok(existing) => {
                // Normalize to a canonical "0"/"1" the way a boolean cast
                // would, so downstream readers never have to re-parse it.
                let normalized = if parse_bool_cast(&existing) { "1" } else { "0" };
                if normalized != existing {
                    // SAFETY: see above.
                    unsafe { std::env::set_var(&options.debug_key, normalized) };
                }
            }
        }

        Ok(())
    }

    /// Writes `values` into process env under the override rule: a key is
    /// written when `override` is true, it is already in the loaded-by-us
    /// sentinel, or it is currently unset.
    pub fn populate(values: &indexmap::IndexMap<String, String>, r#override: bool) {
        let mut loaded = loaded_by_us();
        let mut changed = false;

        for (key, value) in values {
            let owned_by_us = loaded.contains(key);
            let currently_unset = std::env::var(key).is_err();

            if r#override || owned_by_us || currently_unset {
                // SAFETY: single-threaded bootstrap phase; mutating process
                // environment here is a documented, deliberate effect.
                unsafe { std::env::set_var(key, value) };
                if loaded.insert(key.clone()) {
                    changed = true;
                }
            }
        }

        if changed {
            persist_loaded_by_us(&loaded);
        }
    }
}

/// Returns the set of names in [`VARS_SENTINEL`]: the "loaded-by-us" set.
pub fn loaded_by_us() -> HashSet<String> {
    std::env::var(VARS_SENTINEL)
        .ok()
        .map(|raw| raw.split(',').filter(|s| !s.is_empty()).map(str::to_string).collect())
        .unwrap_or_default()
}

fn persist_loaded_by_us(names: &HashSet<String>) {
    let mut sorted: Vec<&str> = names.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    // SAFETY: single-threaded bootstrap phase; mutating process
    // environment here is a documented, deliberate effect.
    unsafe { std::env::set_var(VARS_SENTINEL, sorted.join(",")) };
}

fn set_sentinel_path(base: &Path) {
    // SAFETY: see persist_loaded_by_us.
    unsafe { std::env::set_var(PATH_SENTINEL, base.display().to_string()) };
}

fn read_dotenv(path: &Path) -> Result<indexmap::IndexMap<String, String>, Error> {
    let text = std::fs::read_to_string(path).map_err(|err| Error::Path {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;
    let loaded = loaded_by_us();
    DotenvLexer::parse_with_loaded(&text, &path.display().to_string(), &loaded)
}

fn dist_path(base: &Path) -> PathBuf {
    append_suffix(base, ".dist")
}

fn suffixed(base: &Path, suffix: &str) -> PathBuf {
    append_suffix(base, &format!(".{suffix}"))
}

fn suffixed_twice(base: &Path, first: &str, second: &str) -> PathBuf {
    append_suffix(base, &format!(".{first}.{second}"))
}

fn append_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Boolean cast used for the debug key: `"1"`, `"true"`, `"yes"`, `"on"`
/// are true; `"0"`, `"false"`, `"no"`, `"off"`, and the empty string are
/// false; anything else non-empty is true.
fn parse_bool_cast(value: &str) -> bool {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" | "" => false,
        _ => true,
    }
}

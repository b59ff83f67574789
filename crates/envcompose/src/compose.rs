//! The top-level orchestrator: normalises options, runs the cascade, loads
//! and merges sources, resolves placeholders, and validates.

use std::path::{Path, PathBuf};

use crate::dotenv::{CascadeOptions, DotenvCascade, Error as DotenvError};
use crate::env_accessor::EnvAccessor;
use crate::error::ConfigError;
use crate::loader::SourceLoader;
use crate::merge;
use crate::placeholder::PlaceholderResolver;
use crate::schema::Schema;
use crate::source::{ConfigSources, SourceDescriptor, SourceOrigin};
use crate::tree::{self, Tree};

/// Controls [`DotenvCascade`] bootstrapping within a [`ConfigComposer`] run.
///
/// `enabled` defaults to `true`: the env cascade runs unless the caller
/// opts out with [`ComposeOptions::no_env`].
#[derive(Debug, Clone)]
pub struct EnvOptions {
    pub enabled: bool,
    pub path: PathBuf,
    pub env_key: String,
    pub debug_key: String,
    pub default_env: String,
    pub test_envs: Vec<String>,
    pub prod_envs: Vec<String>,
    pub r#override: bool,
    /// If the base file (and its `.dist`) is absent, tolerate it rather
    /// than raising a *Path* error.
    pub optional: bool,
    /// If set, force-assigned to `env_key` before the cascade runs.
    pub environment: Option<String>,
    /// Names pre-registered on the accessor, independent of any cascade.
    pub known_keys: Vec<String>,
}

impl Default for EnvOptions {
    fn default() -> Self {
        EnvOptions {
            enabled: true,
            path: PathBuf::from(".env"),
            env_key: "APP_ENV".to_string(),
            debug_key: "APP_DEBUG".to_string(),
            default_env: "dev".to_string(),
            test_envs: vec!["test".to_string()],
            prod_envs: vec!["prod".to_string()],
            r#override: false,
            optional: true,
            environment: None,
            known_keys: Vec::new(),
        }
    }
}

impl EnvOptions {
    fn to_cascade_options(&self) -> CascadeOptions {
        CascadeOptions {
            base: self.path.clone(),
            env_key: self.env_key.clone(),
            default_env: self.default_env.clone(),
            test_envs: self.test_envs.clone(),
            prod_envs: self.prod_envs.clone(),
            debug_key: self.debug_key.clone(),
            r#override: self.r#override,
        }
    }
}

/// Builder for one [`ConfigComposer::compose`] run.
#[derive(Debug, Clone, Default)]
pub struct ComposeOptions {
    env: Option<EnvOptions>,
    sources: Vec<SourceDescriptor>,
    defaults: Option<Tree>,
    cwd: Option<PathBuf>,
    track_sources: bool,
}

impl ComposeOptions {
    pub fn new() -> Self {
        ComposeOptions::default()
    }

    /// Sets env-cascade behaviour. Omit to use [`EnvOptions::default`].
    #[must_use]
    pub fn env(mut self, env: EnvOptions) -> Self {
        self.env = Some(env);
        self
    }

    /// Disables dotenv bootstrapping entirely.
    #[must_use]
    pub fn no_env(mut self) -> Self {
        self.env = Some(EnvOptions {
            enabled: false,
            ..EnvOptions::default()
        });
        self
    }

    /// Appends one source, evaluated after all previously added sources.
    #[must_use]
    pub fn source(mut self, descriptor: SourceDescriptor) -> Self {
        self.sources.push(descriptor);
        self
    }

    /// Appends many sources, in order.
    #[must_use]
    pub fn sources(mut self, descriptors: impl IntoIterator<Item = SourceDescriptor>) -> Self {
        self.sources.extend(descriptors);
        self
    }

    /// Sets the starting tree merged before any source. Must be a plain
    /// object.
    #[must_use]
    pub fn defaults(mut self, defaults: Tree) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Overrides the working directory sources resolve relative to.
    /// Defaults to the process's current directory.
    #[must_use]
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Records, per source, which [`SourceOrigin`] contributed the merged
    /// tree. Read back via [`Composed::sources`].
    #[must_use]
    pub fn track_sources(mut self) -> Self {
        self.track_sources = true;
        self
    }
}

/// The result of a successful [`ConfigComposer::compose`] call.
#[derive(Debug)]
pub struct Composed<T> {
    pub config: T,
    pub env: EnvAccessor,
    pub sources: ConfigSources,
}

/// Orchestrates a full configuration load.
pub struct ConfigComposer;

impl ConfigComposer {
    /// Runs the full pipeline: cascade (if enabled) -> load+merge sources
    /// -> resolve placeholders -> `schema.safe_parse`.
    pub fn compose<S: Schema>(options: &ComposeOptions, schema: &S) -> Result<Composed<S::Output>, ConfigError> {
        let cwd = options
            .cwd
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));

        let mut env = EnvAccessor::new();
        let env_options = options.env.clone().unwrap_or_default();
        Self::bootstrap_env(&env_options, &mut env, &cwd)?;

        let mut sources = ConfigSources::new();
        let mut accumulator = tree::clone_or_empty_object(options.defaults.as_ref());
        if options.track_sources {
            sources.push(SourceOrigin::Defaults);
        }

        for descriptor in &options.sources {
            let loaded = SourceLoader::load(descriptor, &cwd)?;
            if options.track_sources {
                sources.push(describe(descriptor, loaded.is_some()));
            }
            accumulator = merge::merge(&accumulator, loaded.as_ref());
        }

        let mut resolver = PlaceholderResolver::new(&mut env);
        let resolved = resolver.resolve(&accumulator)?;

        schema
            .safe_parse(&resolved)
            .map(|config| Composed { config, env, sources })
            .map_err(|issues| ConfigError::Validation { issues })
    }

    fn bootstrap_env(options: &EnvOptions, env: &mut EnvAccessor, cwd: &Path) -> Result<(), ConfigError> {
        if !options.enabled {
            return Ok(());
        }

        env.register(options.known_keys.iter().cloned());
        env.register(std::env::vars().map(|(k, _)| k));

        if let Some(environment) = &options.environment {
            // SAFETY: single-threaded bootstrap phase; mutating process
            // environment here is a documented, deliberate effect.
            unsafe { std::env::set_var(&options.env_key, environment) };
        }

        let mut cascade_options = options.to_cascade_options();
        cascade_options.base = cwd.join(&cascade_options.base);

        match DotenvCascade::boot_env(&cascade_options) {
            Ok(()) => {}
            Err(DotenvError::Path { .. }) if options.optional => {}
            Err(other) => return Err(other.into()),
        }

        for name in crate::dotenv::cascade::loaded_by_us() {
            env.register([name]);
        }
        env.register([options.env_key.clone()]);

        Ok(())
    }
}

fn describe(descriptor: &SourceDescriptor, loaded: bool) -> SourceOrigin {
    match descriptor {
        SourceDescriptor::FilePath(path) => SourceOrigin::File(path.clone()),
        SourceDescriptor::FileRecord { path, optional, .. } => {
            if loaded || !optional {
                SourceOrigin::File(path.clone())
            } else {
                SourceOrigin::MissingOptionalFile(path.clone())
            }
        }
        SourceDescriptor::Inline(_) => SourceOrigin::Inline,
    }
}

//! `InterpreterBuilder` for creating Interpreter instances with various configurations.

use rill_value::{Environment, EvalError};

use super::Interpreter;
use crate::config::RuntimeConfig;
use crate::packages;

/// Builder for creating Interpreter instances.
///
/// Starts from [`RuntimeConfig::default`]; embedders that honor environment
/// overrides pass [`RuntimeConfig::from_env`] to [`config`](Self::config).
pub struct InterpreterBuilder {
    config: RuntimeConfig,
    env: Option<Environment>,
    prelude: bool,
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            env: None,
            prelude: true,
        }
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the call-depth limit (`None` for unlimited).
    #[must_use]
    pub fn max_call_depth(mut self, depth: Option<usize>) -> Self {
        self.config.max_call_depth = depth;
        self
    }

    /// Enable or disable signal polling on every invocation.
    #[must_use]
    pub fn signal_polling(mut self, enabled: bool) -> Self {
        self.config.signal_polling = enabled;
        self
    }

    /// Set the initial global environment.
    #[must_use]
    pub fn env(mut self, env: Environment) -> Self {
        self.env = Some(env);
        self
    }

    /// Whether to define the prelude bindings in the global scope.
    #[must_use]
    pub fn prelude(mut self, enabled: bool) -> Self {
        self.prelude = enabled;
        self
    }

    /// Build the interpreter, installing the prelude when enabled.
    pub fn build(self) -> Result<Interpreter, EvalError> {
        let globals = self.env.unwrap_or_default();
        if self.prelude {
            for (name, value) in packages::ensure_package(packages::PRELUDE)?.iter() {
                globals.define(name.clone(), value.clone());
            }
        }
        Ok(Interpreter::from_parts(globals, self.config))
    }
}

impl Default for InterpreterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

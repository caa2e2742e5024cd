//! Runtime configuration.
//!
//! Policies that vary per embedding: the call-depth limit and whether
//! pending OS signals are polled on every invocation. Defaults suit a
//! native command-line run; [`RuntimeConfig::from_env`] layers environment
//! overrides on top.

/// Environment variable holding the call-depth limit.
pub const MAX_CALL_DEPTH_VAR: &str = "RILL_MAX_CALL_DEPTH";

/// Environment variable toggling signal polling at each invocation.
pub const SIGNAL_POLLING_VAR: &str = "RILL_SIGNAL_POLLING";

/// Call-depth limit on WASM, which cannot grow its stack.
const WASM_MAX_CALL_DEPTH: usize = 200;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Maximum number of nested invocations, or `None` for unlimited.
    ///
    /// Unlimited is only safe where `stacker` can grow the stack.
    pub max_call_depth: Option<usize>,
    /// Poll pending OS signals at the start of every invocation.
    pub signal_polling: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            max_call_depth: if cfg!(target_arch = "wasm32") {
                Some(WASM_MAX_CALL_DEPTH)
            } else {
                None
            },
            signal_polling: true,
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by `RILL_MAX_CALL_DEPTH` and `RILL_SIGNAL_POLLING`.
    pub fn from_env() -> Self {
        Self::default().with_overrides(
            std::env::var(MAX_CALL_DEPTH_VAR).ok().as_deref(),
            std::env::var(SIGNAL_POLLING_VAR).ok().as_deref(),
        )
    }

    /// Apply raw override values. Invalid values are ignored with a warning.
    #[must_use]
    pub fn with_overrides(
        mut self,
        max_call_depth: Option<&str>,
        signal_polling: Option<&str>,
    ) -> Self {
        if let Some(raw) = max_call_depth {
            match raw.trim().parse::<usize>() {
                Ok(depth) if depth > 0 => self.max_call_depth = Some(depth),
                _ => tracing::warn!(
                    value = raw,
                    "ignoring {MAX_CALL_DEPTH_VAR}: expected a positive integer"
                ),
            }
        }
        if let Some(raw) = signal_polling {
            match raw.trim().to_ascii_lowercase().as_str() {
                "0" | "false" | "off" | "no" => self.signal_polling = false,
                "1" | "true" | "on" | "yes" => self.signal_polling = true,
                _ => tracing::warn!(
                    value = raw,
                    "ignoring {SIGNAL_POLLING_VAR}: expected a boolean"
                ),
            }
        }
        self
    }
}

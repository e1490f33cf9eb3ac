// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Pass configuration.

/// Environment variable that turns on the debug dump.
pub const DEBUG_ENV: &str = "OPTLESS_DEBUG";

/// Options for one pass run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassOptions {
    /// Print each rewritten unit to stderr. Never changes the rewrite.
    pub debug: bool,
}

impl PassOptions {
    /// Parse plugin-style arguments. `debug` is matched case-insensitively;
    /// anything else is ignored.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Self {
        Self {
            debug: args.iter().any(|a| a.as_ref().eq_ignore_ascii_case("debug")),
        }
    }

    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(DEBUG_ENV).ok().as_deref())
    }

    fn from_env_value(value: Option<&str>) -> Self {
        let debug = matches!(
            value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
            Some("1") | Some("true") | Some("debug")
        );
        Self { debug }
    }
}

// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Error code registry.
//!
//! Maps the pass's error codes (E09xx) to titles and categories.

use std::collections::HashMap;

use optless_desugar::ErrorCategory as PassCategory;

/// Registry of all known error codes.
pub struct ErrorCodeRegistry {
    codes: HashMap<&'static str, ErrorCodeInfo>,
}

/// Information about a single error code.
pub struct ErrorCodeInfo {
    pub code: &'static str,
    pub title: &'static str,
    pub category: ErrorCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Inference,
    HostInterop,
}

impl From<PassCategory> for ErrorCategory {
    fn from(category: PassCategory) -> Self {
        match category {
            PassCategory::Configuration => ErrorCategory::Configuration,
            PassCategory::Inference => ErrorCategory::Inference,
            PassCategory::HostInterop => ErrorCategory::HostInterop,
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "Configuration"),
            ErrorCategory::Inference => write!(f, "Inference"),
            ErrorCategory::HostInterop => write!(f, "Host interop"),
        }
    }
}

macro_rules! register_codes {
    ($($code:literal => ($title:literal, $cat:expr)),* $(,)?) => {{
        let mut map = HashMap::new();
        $(
            map.insert($code, ErrorCodeInfo {
                code: $code,
                title: $title,
                category: $cat,
            });
        )*
        map
    }};
}

impl Default for ErrorCodeRegistry {
    fn default() -> Self {
        use ErrorCategory::*;

        Self {
            codes: register_codes! {
                // Transformer set (E090x)
                "E0900" => ("unsupported wrapper operation", Configuration),
                "E0901" => ("operation claimed twice", Configuration),
                "E0902" => ("operation not claimed", Configuration),

                // Element type inference (E091x)
                "E0910" => ("cannot infer wrapper element type", Inference),

                // Tree and symbol table shape (E092x)
                "E0920" => ("library member not declared", HostInterop),
                "E0921" => ("unexpected tree node", HostInterop),
                "E0922" => ("missing wrapper call argument", HostInterop),
                "E0923" => ("synthesized methods not committed", HostInterop),
            },
        }
    }
}

impl ErrorCodeRegistry {
    pub fn get(&self, code: &str) -> Option<&ErrorCodeInfo> {
        self.codes.get(code)
    }

    pub fn all(&self) -> impl Iterator<Item = &ErrorCodeInfo> {
        self.codes.values()
    }
}

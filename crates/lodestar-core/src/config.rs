//! Backend configuration
//!
//! Every field has a default, so an empty TOML document is a valid configuration:
//!
//! ```toml
//! [platform]
//! function_arity_bound = 23
//!
//! [naming]
//! root_package = "_"
//! runtime_global = "Kotlin"
//! builtins_module = "kotlin"
//! private_suffix = "_0"
//!
//! [naming.standard_objects]
//! "kotlin.Any" = "Any"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LodestarConfig {
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(default)]
    pub naming: NamingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Number of generated function arities (`Function0` up to `Function{bound - 1}`)
    #[serde(default = "default_function_arity_bound")]
    pub function_arity_bound: usize,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            function_arity_bound: default_function_arity_bound(),
        }
    }
}

fn default_function_arity_bound() -> usize {
    23
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Identifier of the current module's root package object
    #[serde(default = "default_root_package")]
    pub root_package: String,
    /// Identifier of the runtime support object
    #[serde(default = "default_runtime_global")]
    pub runtime_global: String,
    /// Module key used when referencing the built-ins module
    #[serde(default = "default_builtins_module")]
    pub builtins_module: String,
    /// Appended to private and backing-field names before fresh declaration
    #[serde(default = "default_private_suffix")]
    pub private_suffix: String,
    /// Built-in classes implemented as fixed members of the runtime object
    #[serde(default = "default_standard_objects")]
    pub standard_objects: BTreeMap<String, String>,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            root_package: default_root_package(),
            runtime_global: default_runtime_global(),
            builtins_module: default_builtins_module(),
            private_suffix: default_private_suffix(),
            standard_objects: default_standard_objects(),
        }
    }
}

fn default_root_package() -> String {
    "_".to_string()
}

fn default_runtime_global() -> String {
    "Kotlin".to_string()
}

fn default_builtins_module() -> String {
    "kotlin".to_string()
}

fn default_private_suffix() -> String {
    "_0".to_string()
}

fn default_standard_objects() -> BTreeMap<String, String> {
    [
        ("kotlin.Any", "Any"),
        ("kotlin.Comparable", "Comparable"),
        ("kotlin.Enum", "Enum"),
        ("kotlin.Throwable", "Throwable"),
        ("kotlin.collections.Iterator", "Iterator"),
        ("kotlin.collections.Iterable", "Iterable"),
        ("kotlin.collections.Collection", "Collection"),
    ]
    .into_iter()
    .map(|(fq, name)| (fq.to_string(), name.to_string()))
    .collect()
}

impl LodestarConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, CoreError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        tracing::debug!("Loading configuration from {}", path.display());
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.platform.function_arity_bound == 0 {
            return Err(CoreError::InvalidConfig(
                "platform.function_arity_bound must be at least 1".to_string(),
            ));
        }
        let tokens = [
            ("naming.root_package", &self.naming.root_package),
            ("naming.runtime_global", &self.naming.runtime_global),
            ("naming.builtins_module", &self.naming.builtins_module),
        ];
        for (key, value) in tokens {
            if value.is_empty() {
                return Err(CoreError::InvalidConfig(format!("{} must not be empty", key)));
            }
        }
        for (fq, name) in &self.naming.standard_objects {
            if fq.is_empty() || name.is_empty() {
                return Err(CoreError::InvalidConfig(format!(
                    "standard object entry {:?} = {:?} is incomplete",
                    fq, name
                )));
            }
        }
        Ok(())
    }
}

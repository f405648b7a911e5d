//! Loader options
//!
//! Options arrive either as Rust values built with the `with_*` methods, or as
//! an untyped configuration object (JSON value, JSON text, or a `.json` /
//! `.toml` file). Untyped options are checked against a static JSON Schema
//! before anything else happens; unknown keys and wrong types are rejected.
//!
//! Functions cannot travel through a configuration file, so in the untyped
//! form `defaultExtractor` and each binding's `extractor` are regular
//! expressions whose matches become selector candidates.

use figment::{
    Figment,
    providers::{Format, Json, Toml},
};
use fob_purgecss::{Extractor, ExtractorBinding, PurgeOptions, RawContent, RawCss};
use regex::Regex;
use serde::Deserialize;
use serde_json::{Value, json};
use std::path::Path;
use std::sync::LazyLock;

use crate::error::{PurgeLoaderError, Result};

static SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["content"],
        "properties": {
            "content": {
                "description": "HTML / Twig / Handlebars etc.",
                "type": "array",
                "items": { "type": "string" }
            },
            "defaultExtractor": {
                "description": "Use a default custom extractor (regular expression)",
                "type": "string"
            },
            "extractors": {
                "description": "Use a custom extractor by type/extension of file",
                "type": "array",
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["extractor", "extensions"],
                    "properties": {
                        "extractor": { "type": "string" },
                        "extensions": { "type": "array", "items": { "type": "string" } }
                    }
                }
            },
            "whitelist": {
                "description": "Whitelist to allow css selectors",
                "type": "array",
                "items": { "type": "string" }
            },
            "whitelistPatterns": {
                "description": "Whitelist pattern to allow css selectors",
                "type": "array",
                "items": { "type": "string" }
            },
            "whitelistPatternsChildren": {
                "description": "Whitelist pattern of children to allow css selectors",
                "type": "array",
                "items": { "type": "string" }
            },
            "fontFace": {
                "description": "Remove any unused @font-face rules in your css",
                "type": "boolean"
            },
            "keyframes": {
                "description": "Remove any unused keyframes in your css",
                "type": "boolean"
            },
            "variables": {
                "description": "Remove any unused variables in your css",
                "type": "boolean"
            },
            "rejected": {
                "description": "Report the selectors removed from your css",
                "type": "boolean"
            }
        }
    })
});

static VALIDATOR: LazyLock<jsonschema::Validator> = LazyLock::new(|| {
    jsonschema::validator_for(&SCHEMA).expect("loader options schema is valid")
});

/// The JSON Schema untyped options are validated against
pub fn schema() -> &'static Value {
    &SCHEMA
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawLoaderOptions {
    content: Vec<String>,
    #[serde(default)]
    default_extractor: Option<String>,
    #[serde(default)]
    extractors: Vec<RawExtractorBinding>,
    #[serde(default)]
    whitelist: Vec<String>,
    #[serde(default)]
    whitelist_patterns: Vec<String>,
    #[serde(default)]
    whitelist_patterns_children: Vec<String>,
    #[serde(default)]
    font_face: bool,
    #[serde(default)]
    keyframes: bool,
    #[serde(default)]
    variables: bool,
    #[serde(default)]
    rejected: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawExtractorBinding {
    extractor: String,
    extensions: Vec<String>,
}

fn compile(option: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| PurgeLoaderError::invalid_option(option, e))
}

fn compile_all(option: &str, patterns: &[String]) -> Result<Vec<Regex>> {
    patterns.iter().map(|p| compile(option, p)).collect()
}

/// Validated configuration of the PurgeCSS loader
#[derive(Debug, Clone, Default)]
pub struct PurgeLoaderOptions {
    /// Content files to scan for used selectors, relative to the working directory
    pub content: Vec<String>,
    pub default_extractor: Option<Extractor>,
    pub extractors: Vec<ExtractorBinding>,
    pub whitelist: Vec<String>,
    pub whitelist_patterns: Vec<Regex>,
    pub whitelist_patterns_children: Vec<Regex>,
    pub font_face: bool,
    pub keyframes: bool,
    pub variables: bool,
    pub rejected: bool,
}

impl PurgeLoaderOptions {
    /// Options scanning the given content files
    ///
    /// # Example
    ///
    /// ```rust
    /// use fob_plugin_purgecss::PurgeLoaderOptions;
    ///
    /// let options = PurgeLoaderOptions::new(["index.html"])
    ///     .with_whitelist("active")
    ///     .with_keyframes(true);
    /// assert!(options.validate().is_ok());
    /// ```
    pub fn new<I, S>(content: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            content: content.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Validate an untyped configuration object and convert it
    pub fn from_value(value: Value) -> Result<Self> {
        let errors: Vec<String> = VALIDATOR
            .iter_errors(&value)
            .map(|error| error.to_string())
            .collect();
        if !errors.is_empty() {
            return Err(PurgeLoaderError::Schema { errors });
        }

        let raw: RawLoaderOptions = serde_json::from_value(value)
            .map_err(|e| PurgeLoaderError::Schema {
                errors: vec![e.to_string()],
            })?;

        let options = Self {
            content: raw.content,
            default_extractor: raw
                .default_extractor
                .as_deref()
                .map(|pattern| compile("defaultExtractor", pattern).map(Extractor::Pattern))
                .transpose()?,
            extractors: raw
                .extractors
                .into_iter()
                .map(|binding| {
                    let extractor = compile("extractors", &binding.extractor)?;
                    Ok(ExtractorBinding::new(
                        binding.extensions,
                        Extractor::Pattern(extractor),
                    ))
                })
                .collect::<Result<_>>()?,
            whitelist: raw.whitelist,
            whitelist_patterns: compile_all("whitelistPatterns", &raw.whitelist_patterns)?,
            whitelist_patterns_children: compile_all(
                "whitelistPatternsChildren",
                &raw.whitelist_patterns_children,
            )?,
            font_face: raw.font_face,
            keyframes: raw.keyframes,
            variables: raw.variables,
            rejected: raw.rejected,
        };

        options.validate()?;
        Ok(options)
    }

    /// Parse JSON text and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json).map_err(|e| PurgeLoaderError::Schema {
            errors: vec![e.to_string()],
        })?;
        Self::from_value(value)
    }

    /// Load options from a `.json` or `.toml` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_error = |message: String| PurgeLoaderError::ConfigFile {
            path: path.to_path_buf(),
            message,
        };

        if !path.is_file() {
            return Err(config_error("file not found".to_string()));
        }

        let figment = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Figment::from(Json::file(path)),
            Some("toml") => Figment::from(Toml::file(path)),
            other => {
                return Err(config_error(format!(
                    "unsupported format {:?}",
                    other.unwrap_or_default()
                )));
            }
        };

        let value: Value = figment
            .extract()
            .map_err(|e| config_error(e.to_string()))?;
        Self::from_value(value)
    }

    /// Check invariants that hold for typed and untyped options alike
    pub fn validate(&self) -> Result<()> {
        if self.content.is_empty() {
            return Err(PurgeLoaderError::EmptyContent);
        }
        Ok(())
    }

    pub fn with_content(mut self, path: impl Into<String>) -> Self {
        self.content.push(path.into());
        self
    }

    pub fn with_default_extractor(mut self, extractor: Extractor) -> Self {
        self.default_extractor = Some(extractor);
        self
    }

    /// Use `extractor` for content files with one of `extensions`
    pub fn with_extractor<I, S>(mut self, extensions: I, extractor: Extractor) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extractors
            .push(ExtractorBinding::new(extensions, extractor));
        self
    }

    pub fn with_whitelist(mut self, selector: impl Into<String>) -> Self {
        self.whitelist.push(selector.into());
        self
    }

    pub fn with_whitelist_pattern(mut self, pattern: Regex) -> Self {
        self.whitelist_patterns.push(pattern);
        self
    }

    pub fn with_whitelist_pattern_children(mut self, pattern: Regex) -> Self {
        self.whitelist_patterns_children.push(pattern);
        self
    }

    pub fn with_font_face(mut self, enabled: bool) -> Self {
        self.font_face = enabled;
        self
    }

    pub fn with_keyframes(mut self, enabled: bool) -> Self {
        self.keyframes = enabled;
        self
    }

    pub fn with_variables(mut self, enabled: bool) -> Self {
        self.variables = enabled;
        self
    }

    pub fn with_rejected(mut self, enabled: bool) -> Self {
        self.rejected = enabled;
        self
    }

    /// Engine request for one stylesheet; every option passes through unchanged
    pub(crate) fn to_purge_options(&self, content: Vec<RawContent>, css: RawCss) -> PurgeOptions {
        PurgeOptions {
            content,
            css: vec![css],
            default_extractor: self.default_extractor.clone(),
            extractors: self.extractors.clone(),
            whitelist: self.whitelist.clone(),
            whitelist_patterns: self.whitelist_patterns.clone(),
            whitelist_patterns_children: self.whitelist_patterns_children.clone(),
            font_face: self.font_face,
            keyframes: self.keyframes,
            variables: self.variables,
            rejected: self.rejected,
        }
    }
}

// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Config errors as miette diagnostics.
//!
//! Figment reports where a value came from but not the byte offset, so
//! unknown keys are located by scanning the TOML text section by section.
//! Typos get a "did you mean" hint from Jaro-Winkler similarity.

#![allow(unused_assignments)] // emitted by the miette Diagnostic derive

use std::path::Path;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Similarity a known key needs before it is offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown key `{key}` in [{section}]")]
    #[diagnostic(code(murmur::config::unknown_key))]
    UnknownKey {
        key: String,
        /// Table the key appeared in (`root` for top-level keys).
        section: String,
        suggestion: Option<String>,
        valid_keys: Vec<String>,
        #[help]
        help: String,
        #[label("not a recognized key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: found {found}")]
    #[diagnostic(code(murmur::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        found: String,
        expected: String,
    },

    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(murmur::config::missing_key),
        help("add `{key} = <value>` to murmur.toml")
    )]
    MissingKey { key: String },

    /// A value that parsed but makes no sense (see `validation`).
    #[error("invalid configuration: {message}")]
    #[diagnostic(code(murmur::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(murmur::config::other))]
    Other(String),
}

/// A TOML document that may have contributed to the loaded config.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub name: String,
    pub content: String,
}

impl ConfigSource {
    pub fn inline(content: &str) -> Self {
        Self {
            name: "<inline>".to_string(),
            content: content.to_string(),
        }
    }

    /// Read `path`, or `None` if it does not exist or is unreadable.
    pub fn read(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        Some(Self {
            name: path.display().to_string(),
            content,
        })
    }
}

/// Turn every error figment collected into a diagnostic.
pub fn from_figment(err: figment::Error, sources: &[ConfigSource]) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| match &error.kind {
            Kind::UnknownField(key, expected) => {
                let section = error
                    .path
                    .first()
                    .cloned()
                    .unwrap_or_else(|| "root".to_string());
                let suggestion = closest_key(key, expected.iter().copied());
                let valid_keys: Vec<String> = expected.iter().map(|k| k.to_string()).collect();
                let help = match &suggestion {
                    Some(s) => format!("did you mean `{s}`? valid keys: {}", valid_keys.join(", ")),
                    None => format!("valid keys: {}", valid_keys.join(", ")),
                };
                let (span, src) = match source_for(&error, sources)
                    .and_then(|s| locate_key(&s.content, error.path.first(), key).map(|o| (s, o)))
                {
                    Some((source, offset)) => (
                        Some(SourceSpan::new(offset.into(), key.len())),
                        Some(NamedSource::new(&source.name, source.content.clone())),
                    ),
                    None => (None, None),
                };
                ConfigError::UnknownKey {
                    key: key.clone(),
                    section,
                    suggestion,
                    valid_keys,
                    help,
                    span,
                    src,
                }
            }
            Kind::MissingField(key) => ConfigError::MissingKey {
                key: key.to_string(),
            },
            Kind::InvalidType(found, expected) => ConfigError::InvalidType {
                key: error.path.join("."),
                found: found.to_string(),
                expected: expected.clone(),
            },
            _ => ConfigError::Other(error.to_string()),
        })
        .collect()
}

/// The source the failing value came from. Inline strings carry no file
/// metadata, so a lone source is assumed.
fn source_for<'a>(
    error: &figment::error::Error,
    sources: &'a [ConfigSource],
) -> Option<&'a ConfigSource> {
    let file = error.metadata.as_ref().and_then(|m| match &m.source {
        Some(figment::Source::File(path)) => Some(path.display().to_string()),
        _ => None,
    });
    match file {
        Some(name) => sources.iter().find(|s| s.name == name),
        None if sources.len() == 1 => sources.first(),
        None => None,
    }
}

/// Byte offset of `key` inside table `section` (top level when `None`).
pub fn locate_key(content: &str, section: Option<&String>, key: &str) -> Option<usize> {
    let mut current: Option<&str> = None;
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();

        if let Some(header) = trimmed.strip_prefix('[') {
            current = header.split(']').next().map(str::trim);
        } else if current == section.map(String::as_str)
            && let Some(rest) = trimmed.strip_prefix(key)
            && rest.trim_start().starts_with('=')
        {
            return Some(offset + indent);
        }
        offset += line.len();
    }
    None
}

/// The known key most similar to `unknown`, if similar enough.
pub fn closest_key<'a>(unknown: &str, known: impl IntoIterator<Item = &'a str>) -> Option<String> {
    known
        .into_iter()
        .map(|k| (strsim::jaro_winkler(unknown, k), k))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, k)| k.to_string())
}

/// Print every error to stderr as a miette report.
pub fn render_errors(errors: Vec<ConfigError>) {
    for error in errors {
        eprintln!("{:?}", miette::Report::new(error));
    }
}

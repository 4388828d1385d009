//! Resolver directive parsing.
//!
//! A directive is `kind:path` or `kind:path, fallback`. The path may hold
//! unresolved `${...}` markers, which can themselves contain `:` and `,`;
//! only a comma outside every marker starts the fallback.

use crate::error::{Result, ServiceConfigError};
use std::fmt;
use std::str::FromStr;

/// Kind of value a directive asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    /// Plain value from the configuration store
    ServiceConfig,
    /// Vault secret, encrypted with KMS
    SecretConfig,
}

impl DirectiveKind {
    /// Name used in directives.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ServiceConfig => "serviceConfig",
            Self::SecretConfig => "secretConfig",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "serviceConfig" => Some(Self::ServiceConfig),
            "secretConfig" => Some(Self::SecretConfig),
            _ => None,
        }
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parsed directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Requested kind
    pub kind: DirectiveKind,
    /// Lookup path, trimmed
    pub path: String,
    /// Literal fallback, trimmed; `Some("")` is a real fallback
    pub fallback: Option<String>,
}

impl Directive {
    /// Parse a directive, optionally wrapped in `${...}`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceConfigError::InvalidDirective`] for an unknown kind or an empty path.
    pub fn parse(input: &str) -> Result<Self> {
        let input = unwrap_marker(input.trim());
        let (name, rest) = input
            .split_once(':')
            .ok_or_else(|| ServiceConfigError::invalid_directive(format!("missing kind in '{input}'")))?;
        let kind = DirectiveKind::from_name(name.trim()).ok_or_else(|| {
            ServiceConfigError::invalid_directive(format!("unknown kind '{}'", name.trim()))
        })?;

        let (path, fallback) = split_fallback(rest);
        let path = path.trim();
        if path.is_empty() {
            return Err(ServiceConfigError::invalid_directive(format!(
                "empty path in '{input}'"
            )));
        }

        Ok(Self {
            kind,
            path: path.to_string(),
            fallback: fallback.map(|f| f.trim().to_string()),
        })
    }

    /// Parse a directive that must be of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceConfigError::InvalidDirective`] if parsing fails or the kind differs.
    pub fn parse_as(kind: DirectiveKind, input: &str) -> Result<Self> {
        let directive = Self::parse(input)?;
        if directive.kind != kind {
            return Err(ServiceConfigError::invalid_directive(format!(
                "expected {kind} directive, got {}",
                directive.kind
            )));
        }
        Ok(directive)
    }
}

impl FromStr for Directive {
    type Err = ServiceConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Strip one `${...}` wrapper around a whole directive.
fn unwrap_marker(input: &str) -> &str {
    input
        .strip_prefix("${")
        .and_then(|inner| inner.strip_suffix('}'))
        .filter(|inner| {
            inner
                .split_once(':')
                .is_some_and(|(name, _)| DirectiveKind::from_name(name.trim()).is_some())
        })
        .unwrap_or(input)
}

/// Split at the first comma outside `${...}` markers.
fn split_fallback(rest: &str) -> (&str, Option<&str>) {
    let bytes = rest.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'$' if bytes.get(i + 1) == Some(&b'{') => {
                depth += 1;
                i += 1;
            }
            b'}' if depth > 0 => depth -= 1,
            b',' if depth == 0 => return (&rest[..i], Some(&rest[i + 1..])),
            _ => {}
        }
        i += 1;
    }

    (rest, None)
}

//! Component identifiers and configuration sections

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Component identifier of the form `kind` or `kind/name`
///
/// The `kind` selects the component implementation (`otlp`, `batch`, ...);
/// the optional `name` qualifies multiple instances of the same kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId {
    kind: String,
    name: Option<String>,
}

impl ComponentId {
    /// Create identifier from kind and optional qualifier
    #[inline]
    #[must_use]
    pub fn new(kind: impl Into<String>, name: Option<String>) -> Self {
        Self {
            kind: kind.into(),
            name,
        }
    }

    /// Base kind (text before the first `/`)
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Qualifier (text after the first `/`), if any
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Same identifier with a different base kind
    ///
    /// # Examples
    /// ```
    /// # use otelcol_api::ComponentId;
    /// let id: ComponentId = "otlp/production".parse().unwrap();
    /// assert_eq!(id.with_kind("otlp_grpc").to_string(), "otlp_grpc/production");
    /// ```
    #[inline]
    #[must_use]
    pub fn with_kind(&self, kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            name: self.name.clone(),
        }
    }

    /// Base kind of a raw identifier without allocating
    #[inline]
    #[must_use]
    pub fn kind_of(id: &str) -> &str {
        id.split_once('/').map_or(id, |(kind, _)| kind)
    }
}

impl FromStr for ComponentId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.split_once('/') {
            Some((kind, name)) => Self::new(kind, Some(name.to_string())),
            None => Self::new(s, None),
        })
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}/{}", self.kind, name),
            None => f.write_str(&self.kind),
        }
    }
}

/// Top-level component sections of a collector configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// `receivers`
    Receivers,
    /// `processors`
    Processors,
    /// `exporters`
    Exporters,
    /// `extensions`
    Extensions,
    /// `connectors`
    Connectors,
}

impl Section {
    /// All sections in document order
    pub const ALL: [Section; 5] = [
        Section::Receivers,
        Section::Processors,
        Section::Exporters,
        Section::Extensions,
        Section::Connectors,
    ];

    /// Key of the section in the configuration document
    #[inline]
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Section::Receivers => "receivers",
            Section::Processors => "processors",
            Section::Exporters => "exporters",
            Section::Extensions => "extensions",
            Section::Connectors => "connectors",
        }
    }

    /// Pipeline lists that may reference components of this section
    ///
    /// Connectors act as exporter of one pipeline and receiver of another.
    /// Extensions are not referenced from pipelines but from `service.extensions`.
    #[inline]
    #[must_use]
    pub const fn pipeline_lists(self) -> &'static [&'static str] {
        match self {
            Section::Receivers => &["receivers"],
            Section::Processors => &["processors"],
            Section::Exporters => &["exporters"],
            Section::Connectors => &["receivers", "exporters"],
            Section::Extensions => &[],
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_bare_kind() {
        let id: ComponentId = "otlp".parse().unwrap();
        assert_eq!(id.kind(), "otlp");
        assert_eq!(id.name(), None);
    }

    #[test]
    fn parse_qualified_kind() {
        let id: ComponentId = "otlp/production/eu".parse().unwrap();
        assert_eq!(id.kind(), "otlp");
        assert_eq!(id.name(), Some("production/eu"));
        assert_eq!(id.to_string(), "otlp/production/eu");
    }

    #[test]
    fn kind_of_matches_parse() {
        assert_eq!(ComponentId::kind_of("httpd/mtls"), "httpd");
        assert_eq!(ComponentId::kind_of("httpd"), "httpd");
    }

    #[test]
    fn connectors_are_referenced_from_both_sides() {
        assert_eq!(Section::Connectors.pipeline_lists(), &["receivers", "exporters"]);
        assert!(Section::Extensions.pipeline_lists().is_empty());
    }

    proptest! {
        #[test]
        fn display_roundtrips(kind in "[a-z_]{1,12}", name in proptest::option::of("[a-z0-9/_-]{1,12}")) {
            let raw = match &name {
                Some(name) => format!("{kind}/{name}"),
                None => kind.clone(),
            };
            let id: ComponentId = raw.parse().unwrap();
            prop_assert_eq!(id.kind(), kind.as_str());
            prop_assert_eq!(id.to_string(), raw);
        }
    }
}

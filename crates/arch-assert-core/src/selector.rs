//! Matchers over code elements.
//!
//! A [`Selector`] identifies a set of code elements by fully-qualified
//! name, interface kind, or namespace prefix. Wildcard patterns are
//! compiled once into an anchored regex at construction time; plain
//! patterns match as exact literals. The match predicate is handed to
//! the external verification engine — this crate never inspects real
//! source code.

use std::fmt;

use crate::error::CompileError;

/// Separator between namespace segments in fully-qualified names.
pub const NAMESPACE_SEPARATOR: char = '\\';

/// The kind of code element a selector matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// A concrete class-like element, matched by name.
    Class,
    /// An interface element, matched by name.
    Interface,
    /// Every element under a namespace prefix.
    Namespace,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class => write!(f, "class"),
            Self::Interface => write!(f, "interface"),
            Self::Namespace => write!(f, "namespace"),
        }
    }
}

/// A name pattern, compiled once at construction.
///
/// Patterns containing `*` are regex-backed: one leading separator is
/// stripped, literal pieces are escaped, and each `*` matches one or
/// more characters. Patterns without `*` are exact-match literals.
#[derive(Debug, Clone)]
pub struct NamePattern {
    raw: String,
    matcher: Matcher,
}

#[derive(Debug, Clone)]
enum Matcher {
    Exact(String),
    Wildcard(regex::Regex),
}

impl NamePattern {
    fn compile(pattern: &str) -> Result<Self, CompileError> {
        let matcher = if pattern.contains('*') {
            let trimmed = strip_leading_separator(pattern);
            let source = trimmed
                .split('*')
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(".+");
            let regex = regex::Regex::new(&format!("^{source}$")).map_err(|_| {
                CompileError::InvalidPattern {
                    pattern: pattern.to_string(),
                }
            })?;
            Matcher::Wildcard(regex)
        } else {
            Matcher::Exact(strip_leading_separator(pattern).to_string())
        };
        Ok(Self {
            raw: pattern.to_string(),
            matcher,
        })
    }

    /// Tests a fully-qualified name against this pattern.
    #[must_use]
    pub fn matches(&self, fqn: &str) -> bool {
        let fqn = strip_leading_separator(fqn);
        match &self.matcher {
            Matcher::Exact(literal) => literal == fqn,
            Matcher::Wildcard(regex) => regex.is_match(fqn),
        }
    }

    /// Returns the original, uncompiled pattern.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn is_wildcard(&self) -> bool {
        matches!(self.matcher, Matcher::Wildcard(_))
    }
}

impl PartialEq for NamePattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for NamePattern {}

fn strip_leading_separator(name: &str) -> &str {
    name.strip_prefix(NAMESPACE_SEPARATOR).unwrap_or(name)
}

/// A matcher identifying a set of code elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// A single element matched by fully-qualified name.
    Class(NamePattern),
    /// As [`Selector::Class`], additionally constrained to interfaces.
    Interface(NamePattern),
    /// All elements under a namespace prefix.
    Namespace(NamePattern),
}

impl Selector {
    /// Compiles a pattern into a selector of the given kind.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::InvalidPattern`] for an empty namespace
    /// pattern or a pattern that fails wildcard compilation.
    pub fn compile(pattern: &str, kind: ElementKind) -> Result<Self, CompileError> {
        if kind == ElementKind::Namespace && pattern.is_empty() {
            return Err(CompileError::InvalidPattern {
                pattern: String::new(),
            });
        }
        let inner = NamePattern::compile(pattern)?;
        Ok(match kind {
            ElementKind::Class => Self::Class(inner),
            ElementKind::Interface => Self::Interface(inner),
            ElementKind::Namespace => Self::Namespace(inner),
        })
    }

    /// Returns the element kind this selector matches.
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Class(_) => ElementKind::Class,
            Self::Interface(_) => ElementKind::Interface,
            Self::Namespace(_) => ElementKind::Namespace,
        }
    }

    /// Returns the original pattern, for diagnostics.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.pattern().as_str()
    }

    /// Tests a fully-qualified name against this selector.
    ///
    /// A non-wildcard namespace selector matches every element *inside*
    /// the named namespace, not the namespace name itself.
    #[must_use]
    pub fn matches(&self, fqn: &str) -> bool {
        match self {
            Self::Class(pattern) | Self::Interface(pattern) => pattern.matches(fqn),
            Self::Namespace(pattern) => {
                if pattern.is_wildcard() {
                    pattern.matches(fqn)
                } else {
                    let fqn = strip_leading_separator(fqn);
                    let prefix = strip_leading_separator(pattern.as_str());
                    fqn.strip_prefix(prefix)
                        .is_some_and(|rest| rest.starts_with(NAMESPACE_SEPARATOR))
                }
            }
        }
    }

    fn pattern(&self) -> &NamePattern {
        match self {
            Self::Class(p) | Self::Interface(p) | Self::Namespace(p) => p,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Returns the terminal name segment of a token.
#[must_use]
pub fn terminal_segment(token: &str) -> &str {
    token
        .rsplit(NAMESPACE_SEPARATOR)
        .next()
        .unwrap_or(token)
}

/// Tests whether a raw token names an interface.
///
/// Interfaces follow the `*Interface` suffix naming convention; the
/// check applies to the terminal name segment only.
#[must_use]
pub fn is_interface_token(token: &str) -> bool {
    terminal_segment(token).ends_with("Interface")
}

/// Infers the element kind of a raw token from its shape: a wildcard
/// with a namespace separator is a namespace prefix, an
/// interface-named token is an interface, anything else a class.
#[must_use]
pub fn token_kind(token: &str) -> ElementKind {
    if token.contains('*') && token.contains(NAMESPACE_SEPARATOR) {
        ElementKind::Namespace
    } else if is_interface_token(token) {
        ElementKind::Interface
    } else {
        ElementKind::Class
    }
}

/// Compiles a raw token into a selector of its inferred kind.
///
/// # Errors
///
/// Returns [`CompileError::InvalidPattern`] if compilation fails.
pub fn classify(token: &str) -> Result<Selector, CompileError> {
    Selector::compile(token, token_kind(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- compilation --

    #[test]
    fn exact_pattern_matches_literal_only() {
        let sel = Selector::compile(r"App\Domain\Order", ElementKind::Class).unwrap();
        assert!(sel.matches(r"App\Domain\Order"));
        assert!(sel.matches(r"\App\Domain\Order"));
        assert!(!sel.matches(r"App\Domain\OrderLine"));
    }

    #[test]
    fn wildcard_pattern_matches_one_or_more_chars() {
        let sel = Selector::compile(r"App\Domain\*", ElementKind::Namespace).unwrap();
        assert!(sel.matches(r"App\Domain\Order"));
        assert!(sel.matches(r"App\Domain\Sub\Deep"));
        // `*` is one-or-more, never zero
        assert!(!sel.matches(r"App\Domain\"));
        assert!(!sel.matches(r"App\Infra\Db"));
    }

    #[test]
    fn wildcard_strips_single_leading_separator() {
        let sel = Selector::compile(r"\App\*\Repository", ElementKind::Class).unwrap();
        assert!(sel.matches(r"App\Domain\Repository"));
        assert_eq!(sel.display_name(), r"\App\*\Repository");
    }

    #[test]
    fn empty_namespace_pattern_rejected() {
        let result = Selector::compile("", ElementKind::Namespace);
        assert!(matches!(
            result,
            Err(CompileError::InvalidPattern { pattern }) if pattern.is_empty()
        ));
    }

    #[test]
    fn empty_class_pattern_allowed() {
        assert!(Selector::compile("", ElementKind::Class).is_ok());
    }

    // -- namespace prefix semantics --

    #[test]
    fn plain_namespace_matches_members_not_itself() {
        let sel = Selector::compile(r"App\Domain", ElementKind::Namespace).unwrap();
        assert!(sel.matches(r"App\Domain\Order"));
        assert!(!sel.matches(r"App\Domain"));
        assert!(!sel.matches(r"App\DomainModel\Order"));
    }

    // -- display --

    #[test]
    fn display_name_is_uncompiled_pattern() {
        let sel = Selector::compile(r"App\*", ElementKind::Namespace).unwrap();
        assert_eq!(sel.display_name(), r"App\*");
        assert_eq!(sel.to_string(), r"App\*");
    }

    // -- classification --

    #[test]
    fn classify_namespace_wildcard() {
        let sel = classify(r"App\Domain\*").unwrap();
        assert_eq!(sel.kind(), ElementKind::Namespace);
    }

    #[test]
    fn classify_interface_by_convention() {
        let sel = classify(r"App\Domain\RepositoryInterface").unwrap();
        assert_eq!(sel.kind(), ElementKind::Interface);
        assert!(is_interface_token("RepositoryInterface"));
        assert!(!is_interface_token(r"App\InterfaceKit\Button"));
    }

    #[test]
    fn classify_plain_class() {
        let sel = classify(r"App\Domain\Order").unwrap();
        assert_eq!(sel.kind(), ElementKind::Class);
    }

    #[test]
    fn bare_wildcard_without_separator_is_class() {
        // A lone `*` has no namespace separator, so it stays a
        // wildcard class selector matching any single name.
        let sel = classify("*").unwrap();
        assert_eq!(sel.kind(), ElementKind::Class);
        assert!(sel.matches("Anything"));
    }
}

//! Fully-resolved structural assertions, the compiler's output unit.

use std::fmt;

use crate::selector::Selector;

/// The eight relation kinds an assertion can express.
///
/// A closed sum so that consumers and tests can match exhaustively;
/// a missing case is a build-time error, not a silent fall-through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssertionKind {
    /// Subjects must extend the object set.
    MustExtend,
    /// Subjects must implement the object set.
    MustImplement,
    /// Subjects must be declared final.
    MustBeFinal,
    /// Subjects must be declared readonly.
    MustBeReadonly,
    /// Subjects may depend on the object set and nothing else.
    MustOnlyDependOn,
    /// Subjects must not depend on the object set.
    MustNotDependOn,
    /// Subjects must expose exactly one public method, with this name.
    MustHaveSolePublicMethod(String),
    /// Subjects may only depend on their whitelisted object set.
    MustOnlyDependOnWhitelist,
}

impl fmt::Display for AssertionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MustExtend => write!(f, "must extend its declared parent"),
            Self::MustImplement => write!(f, "must implement its declared interfaces"),
            Self::MustBeFinal => write!(f, "must be final"),
            Self::MustBeReadonly => write!(f, "must be readonly"),
            Self::MustOnlyDependOn => write!(f, "may only depend on its declared targets"),
            Self::MustNotDependOn => write!(f, "must not depend on its forbidden targets"),
            Self::MustHaveSolePublicMethod(name) => {
                write!(f, "must have exactly one public method named `{name}`")
            }
            Self::MustOnlyDependOnWhitelist => {
                write!(f, "may only depend on its whitelisted targets")
            }
        }
    }
}

/// One fully-resolved structural constraint, ready for the external
/// verification engine.
///
/// Produced once, immutable, consumed exactly once. Groups survive
/// only as already-flattened selector sets; the justification string is
/// the sole trace back to the authoring group.
#[derive(Debug, Clone)]
pub struct Assertion {
    subjects: Vec<Selector>,
    subject_excludes: Option<Vec<Selector>>,
    kind: AssertionKind,
    objects: Vec<Selector>,
    object_excludes: Option<Vec<Selector>>,
    justification: String,
}

impl Assertion {
    /// Creates a new assertion for the named group.
    ///
    /// The exclusion lists are tri-state at the type level: `None`
    /// means no exclusion filter at all, and a `Some` list is expected
    /// to be non-empty.
    #[must_use]
    pub fn new(
        group_name: &str,
        kind: AssertionKind,
        subjects: Vec<Selector>,
        subject_excludes: Option<Vec<Selector>>,
        objects: Vec<Selector>,
        object_excludes: Option<Vec<Selector>>,
    ) -> Self {
        let justification = format!("group `{group_name}` {kind}");
        Self {
            subjects,
            subject_excludes,
            kind,
            objects,
            object_excludes,
            justification,
        }
    }

    /// Selectors for the elements the constraint applies to.
    #[must_use]
    pub fn subjects(&self) -> &[Selector] {
        &self.subjects
    }

    /// Exclusion filter over the subject set, if any.
    #[must_use]
    pub fn subject_excludes(&self) -> Option<&[Selector]> {
        self.subject_excludes.as_deref()
    }

    /// The relation this assertion checks.
    #[must_use]
    pub fn kind(&self) -> &AssertionKind {
        &self.kind
    }

    /// Selectors for the related elements, empty for intrinsic rules
    /// such as finality.
    #[must_use]
    pub fn objects(&self) -> &[Selector] {
        &self.objects
    }

    /// Exclusion filter over the object set, if any.
    #[must_use]
    pub fn object_excludes(&self) -> Option<&[Selector]> {
        self.object_excludes.as_deref()
    }

    /// Human-readable rationale naming the group and the constraint,
    /// used by the external engine for diagnostic reporting.
    #[must_use]
    pub fn justification(&self) -> &str {
        &self.justification
    }
}

//! RSpec public API vocabulary.
//!
//! Every selector the rule recognizes lives here, grouped into the semantic
//! categories RSpec itself documents. The tables are built once behind
//! `LazyLock` and never mutated afterwards.

use std::collections::BTreeSet;
use std::ops::Add;
use std::sync::LazyLock;

use crate::matcher::NamePred;

/// The property-shorthand opener: `its(:size) { is_expected.to eq(0) }`
/// implicitly asserts on a named property of the subject.
pub const PROPERTY_SHORTHAND: &str = "its";

/// Frozen set of method selectors.
///
/// Equality is set equality and `+` is set union, so category unions like
/// "all example openers" are plain expressions over the base sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorSet {
    names: BTreeSet<&'static str>,
}

impl SelectorSet {
    #[must_use]
    pub fn new(names: &[&'static str]) -> Self {
        Self {
            names: names.iter().copied().collect(),
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Selector names in lexical order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.names.iter().copied()
    }

    /// Renders this set as a matcher-layer name predicate: an alternation
    /// over the selectors, consumed by call patterns.
    #[must_use]
    pub fn name_pred(&'static self) -> NamePred {
        NamePred::In(self)
    }
}

impl Add<&SelectorSet> for &SelectorSet {
    type Output = SelectorSet;

    fn add(self, other: &SelectorSet) -> SelectorSet {
        SelectorSet {
            names: self.names.union(&other.names).copied().collect(),
        }
    }
}

impl Add<&SelectorSet> for SelectorSet {
    type Output = SelectorSet;

    fn add(self, other: &SelectorSet) -> SelectorSet {
        &self + other
    }
}

pub mod example_groups {
    use super::{LazyLock, SelectorSet};

    pub static GROUPS: LazyLock<SelectorSet> =
        LazyLock::new(|| SelectorSet::new(&["describe", "context", "feature", "example_group"]));
    pub static SKIPPED: LazyLock<SelectorSet> =
        LazyLock::new(|| SelectorSet::new(&["xdescribe", "xcontext", "xfeature"]));
    pub static FOCUSED: LazyLock<SelectorSet> =
        LazyLock::new(|| SelectorSet::new(&["fdescribe", "fcontext", "ffeature"]));

    pub static ALL: LazyLock<SelectorSet> = LazyLock::new(|| &*GROUPS + &*SKIPPED + &*FOCUSED);
}

pub mod shared_groups {
    use super::{LazyLock, SelectorSet};

    pub static EXAMPLES: LazyLock<SelectorSet> =
        LazyLock::new(|| SelectorSet::new(&["shared_examples", "shared_examples_for"]));
    pub static CONTEXT: LazyLock<SelectorSet> =
        LazyLock::new(|| SelectorSet::new(&["shared_context"]));

    pub static ALL: LazyLock<SelectorSet> = LazyLock::new(|| &*EXAMPLES + &*CONTEXT);
}

pub mod includes {
    use super::{LazyLock, SelectorSet};

    pub static EXAMPLES: LazyLock<SelectorSet> = LazyLock::new(|| {
        SelectorSet::new(&["it_behaves_like", "it_should_behave_like", "include_examples"])
    });
    pub static CONTEXT: LazyLock<SelectorSet> =
        LazyLock::new(|| SelectorSet::new(&["include_context"]));

    pub static ALL: LazyLock<SelectorSet> = LazyLock::new(|| &*EXAMPLES + &*CONTEXT);
}

pub mod examples {
    use super::{LazyLock, SelectorSet};

    pub static EXAMPLES: LazyLock<SelectorSet> =
        LazyLock::new(|| SelectorSet::new(&["it", "specify", "example", "scenario", "its"]));
    pub static FOCUSED: LazyLock<SelectorSet> =
        LazyLock::new(|| SelectorSet::new(&["fit", "fspecify", "fexample", "fscenario", "focus"]));
    pub static SKIPPED: LazyLock<SelectorSet> =
        LazyLock::new(|| SelectorSet::new(&["xit", "xspecify", "xexample", "xscenario", "skip"]));
    pub static PENDING: LazyLock<SelectorSet> = LazyLock::new(|| SelectorSet::new(&["pending"]));
    pub static API_DOC: LazyLock<SelectorSet> =
        LazyLock::new(|| SelectorSet::new(&["example_request"]));

    pub static ALL: LazyLock<SelectorSet> =
        LazyLock::new(|| &*EXAMPLES + &*FOCUSED + &*SKIPPED + &*PENDING + &*API_DOC);
}

pub mod hooks {
    use super::{LazyLock, SelectorSet};

    pub static ALL: LazyLock<SelectorSet> = LazyLock::new(|| {
        SelectorSet::new(&[
            "prepend_before",
            "before",
            "append_before",
            "around",
            "prepend_after",
            "after",
            "append_after",
        ])
    });

    pub mod scopes {
        use super::{LazyLock, SelectorSet};

        pub static ALL: LazyLock<SelectorSet> =
            LazyLock::new(|| SelectorSet::new(&["each", "example", "context", "all", "suite"]));
    }
}

pub mod helpers {
    use super::{LazyLock, SelectorSet};

    pub static ALL: LazyLock<SelectorSet> = LazyLock::new(|| SelectorSet::new(&["let", "let!"]));
}

pub mod subject {
    use super::{LazyLock, SelectorSet};

    pub static ALL: LazyLock<SelectorSet> =
        LazyLock::new(|| SelectorSet::new(&["subject", "subject!"]));
}

pub mod expectations {
    use super::{LazyLock, SelectorSet};

    pub static ALL: LazyLock<SelectorSet> =
        LazyLock::new(|| SelectorSet::new(&["expect", "is_expected", "expect_any_instance_of"]));
}

pub mod runners {
    use super::{LazyLock, SelectorSet};

    pub static ALL: LazyLock<SelectorSet> =
        LazyLock::new(|| SelectorSet::new(&["to", "to_not", "not_to"]));
}

/// Every recognized RSpec call, for generic "is this RSpec DSL" guards.
pub static ALL: LazyLock<SelectorSet> = LazyLock::new(|| {
    &*example_groups::ALL
        + &*shared_groups::ALL
        + &*includes::ALL
        + &*examples::ALL
        + &*hooks::ALL
        + &*helpers::ALL
        + &*subject::ALL
        + &*expectations::ALL
        + &*runners::ALL
});

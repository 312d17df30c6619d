//! Clause groups: the tree a query is built from.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::predicate::Predicate;

/// How the members of a [`ClauseGroup`] combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupMode {
    /// Every member must match.
    #[default]
    And,
    /// At least one member must match.
    Or,
    /// Excludes documents matching all members together.
    Not,
}

impl GroupMode {
    pub fn as_str(self) -> &'static str {
        match self {
            GroupMode::And => "and",
            GroupMode::Or => "or",
            GroupMode::Not => "not",
        }
    }
}

impl fmt::Display for GroupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry in a clause group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Member {
    Predicate(Predicate),
    Group(ClauseGroup),
}

impl From<Predicate> for Member {
    fn from(p: Predicate) -> Self {
        Member::Predicate(p)
    }
}

impl From<ClauseGroup> for Member {
    fn from(g: ClauseGroup) -> Self {
        Member::Group(g)
    }
}

/// An ordered list of predicates and nested groups combined by one
/// [`GroupMode`].
///
/// Member order only affects the rendered text, except for the bounds inside
/// a range predicate.
///
/// # Example
///
/// ```
/// use quarry::{ClauseGroup, GroupMode, Predicate};
///
/// let mut either = ClauseGroup::new(GroupMode::Or);
/// either.push(Predicate::equals("featured", true)?);
/// either.push(Predicate::equals("pinned", true)?);
///
/// let mut root = ClauseGroup::default();
/// root.push(Predicate::equals("contentType", "blog")?);
/// root.push(either);
///
/// assert_eq!(root.len(), 2);
/// assert_eq!(root.predicate_count(), 3);
/// # Ok::<(), quarry::QueryError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClauseGroup {
    mode: GroupMode,
    #[serde(default)]
    members: Vec<Member>,
}

impl ClauseGroup {
    pub fn new(mode: GroupMode) -> Self {
        ClauseGroup {
            mode,
            members: Vec::new(),
        }
    }

    pub fn mode(&self) -> GroupMode {
        self.mode
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Appends a predicate or nested group.
    pub fn push(&mut self, member: impl Into<Member>) {
        self.members.push(member.into());
    }

    /// Returns the most recently appended predicate, if the last member is one.
    pub fn last_predicate_mut(&mut self) -> Option<&mut Predicate> {
        match self.members.last_mut() {
            Some(Member::Predicate(p)) => Some(p),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Direct member predicates, skipping nested groups.
    pub fn predicates(&self) -> impl Iterator<Item = &Predicate> {
        self.members.iter().filter_map(|m| match m {
            Member::Predicate(p) => Some(p),
            Member::Group(_) => None,
        })
    }

    /// Direct nested groups.
    pub fn groups(&self) -> impl Iterator<Item = &ClauseGroup> {
        self.members.iter().filter_map(|m| match m {
            Member::Group(g) => Some(g),
            Member::Predicate(_) => None,
        })
    }

    /// Total number of predicates in this group and all nested groups.
    pub fn predicate_count(&self) -> usize {
        self.members
            .iter()
            .map(|m| match m {
                Member::Predicate(_) => 1,
                Member::Group(g) => g.predicate_count(),
            })
            .sum()
    }
}

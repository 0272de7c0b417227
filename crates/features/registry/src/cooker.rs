//! # Cooking
//!
//! Cooking turns the ordered declarations into delivery groups. Adjacent enabled
//! declarations that render alike (same visibility expression and embedding mode) are
//! merged into one synthetic delivery unit, so a page fetches one composite script
//! instead of several.
//!
//! The result is a pure function of its inputs. A synthetic id is derived from what the
//! group holds (its ordered member ids, expression and inline flag), so cooking unchanged
//! state twice yields identical groups and membership, and a group with different
//! content gets a different id.

use fxhash::{FxHashMap, FxHashSet, FxHasher64};
use sreg_domain::constants::{SYNTHETIC_DIGITS, SYNTHETIC_PREFIX, SYNTHETIC_SUFFIX};
use sreg_domain::script::ScriptDeclaration;
use std::hash::{Hash, Hasher};

/// One delivery unit.
///
/// `expression` and `inline` are those of the group's first declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookedGroup {
    pub id: String,
    pub expression: String,
    pub inline: bool,
    /// Whether `id` is synthetic (two or more merged declarations).
    pub merged: bool,
}

impl CookedGroup {
    fn seed(declaration: &ScriptDeclaration) -> Self {
        Self {
            id: declaration.id.clone(),
            expression: declaration.expression.clone(),
            inline: declaration.inline,
            merged: false,
        }
    }

    /// Merge predicate: exactly `{expression, inline}`, never `id` or `enabled`.
    fn renders_like(&self, declaration: &ScriptDeclaration) -> bool {
        self.expression == declaration.expression && self.inline == declaration.inline
    }
}

/// Groups plus the membership of every effective id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookedState {
    groups: Vec<CookedGroup>,
    membership: FxHashMap<String, Vec<String>>,
}

impl CookedState {
    /// Delivery units in cook order.
    #[must_use]
    pub fn groups(&self) -> &[CookedGroup] {
        &self.groups
    }

    /// Ordered member ids an effective id expands to.
    #[must_use]
    pub fn members(&self, id: &str) -> Option<&[String]> {
        self.membership.get(id).map(Vec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.membership.contains_key(id)
    }

    /// Every membership entry, sorted by effective id.
    #[must_use]
    pub fn membership(&self) -> Vec<(&str, &[String])> {
        let mut entries: Vec<_> =
            self.membership.iter().map(|(id, members)| (id.as_str(), members.as_slice())).collect();
        entries.sort_unstable_by_key(|(id, _)| *id);
        entries
    }

    /// Groups in cook order, each with the ids it delivers.
    #[must_use]
    pub fn composition(&self) -> Vec<(&CookedGroup, &[String])> {
        self.groups
            .iter()
            .map(|group| (group, self.members(&group.id).unwrap_or_default()))
            .collect()
    }
}

/// Naming scheme of synthetic group ids: `prefix` + zero-padded content digest + `suffix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticIds {
    prefix: String,
    suffix: String,
}

impl Default for SyntheticIds {
    fn default() -> Self {
        Self::new(SYNTHETIC_PREFIX, SYNTHETIC_SUFFIX)
    }
}

const DIGEST_SPACE: u64 = 10u64.pow(SYNTHETIC_DIGITS);

impl SyntheticIds {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), suffix: suffix.into() }
    }

    #[must_use]
    pub fn format(&self, n: u64) -> String {
        let width = SYNTHETIC_DIGITS as usize;
        format!("{}{:0width$}{}", self.prefix, n % DIGEST_SPACE, self.suffix)
    }

    /// The id a group with these members and rendering attributes is named by, unless
    /// that name is already taken by a declaration or an earlier group of the same cook.
    #[must_use]
    pub fn for_group(&self, members: &[String], expression: &str, inline: bool) -> String {
        self.format(digest(members, expression, inline))
    }

    fn minter(&self, taken: FxHashSet<String>) -> Minter<'_> {
        Minter { ids: self, taken }
    }
}

/// `FxHasher64` keeps the digest identical across runs and platforms.
fn digest(members: &[String], expression: &str, inline: bool) -> u64 {
    let mut hasher = FxHasher64::default();
    members.hash(&mut hasher);
    expression.hash(&mut hasher);
    inline.hash(&mut hasher);
    hasher.finish() % DIGEST_SPACE
}

struct Minter<'a> {
    ids: &'a SyntheticIds,
    taken: FxHashSet<String>,
}

impl Minter<'_> {
    /// Starts at the group's digest and steps forward past taken names.
    fn mint(&mut self, group: &CookedGroup, members: &[String]) -> String {
        let mut n = digest(members, &group.expression, group.inline);
        loop {
            let candidate = self.ids.format(n);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n = (n + 1) % DIGEST_SPACE;
        }
    }
}

/// Recomputes groups and membership from scratch.
///
/// With `debug_mode` set every enabled declaration becomes its own group; the
/// self-mapping pass still runs.
#[must_use]
pub fn cook(
    declarations: &[ScriptDeclaration],
    debug_mode: bool,
    ids: &SyntheticIds,
) -> CookedState {
    let mut runs: Vec<(CookedGroup, Vec<String>)> = Vec::new();
    for declaration in declarations.iter().filter(|d| d.enabled) {
        let extends = !debug_mode && runs.last().is_some_and(|(group, _)| group.renders_like(declaration));
        if let Some((_, members)) = runs.last_mut().filter(|_| extends) {
            members.push(declaration.id.clone());
        } else {
            runs.push((CookedGroup::seed(declaration), vec![declaration.id.clone()]));
        }
    }

    let mut minter = ids.minter(declarations.iter().map(|d| d.id.clone()).collect());
    let mut groups = Vec::with_capacity(runs.len());
    let mut membership: FxHashMap<String, Vec<String>> = FxHashMap::default();

    for (mut group, members) in runs {
        if members.len() > 1 {
            group.id = minter.mint(&group, &members);
            group.merged = true;
            membership.insert(group.id.clone(), members);
        }
        groups.push(group);
    }

    for declaration in declarations {
        membership.entry(declaration.id.clone()).or_insert_with(|| vec![declaration.id.clone()]);
    }

    CookedState { groups, membership }
}

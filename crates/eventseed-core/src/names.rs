//! Username sources and de-duplication.
//!
//! A [`NameSource`] produces one candidate name per call from the run RNG.
//! [`draw_unique_names`] turns a source into a list of distinct names,
//! either by de-duplicating a fixed number of candidates
//! ([`NameMode::Pool`]) or by drawing until enough distinct names exist
//! ([`NameMode::Exact`]).

use std::collections::BTreeSet;

use fake::Fake;
use fake::faker::internet::en::Username;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::population::PopulationError;

/// Draw attempts allowed per requested name in [`NameMode::Exact`].
pub const EXACT_ATTEMPTS_PER_NAME: usize = 20;

/// Produces candidate usernames.
pub trait NameSource {
    /// Produce the next candidate. Candidates may repeat.
    fn next_name(&mut self, rng: &mut dyn RngCore) -> String;
}

impl<F> NameSource for F
where
    F: FnMut(&mut dyn RngCore) -> String,
{
    fn next_name(&mut self, rng: &mut dyn RngCore) -> String {
        self(rng)
    }
}

/// Plausible internet usernames from the `fake` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeUsernames;

impl NameSource for FakeUsernames {
    fn next_name(&mut self, rng: &mut dyn RngCore) -> String {
        Username().fake_with_rng(rng)
    }
}

/// How distinct names are obtained from a [`NameSource`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameMode {
    /// Draw the requested number of candidates and keep the first
    /// occurrence of each. The population may come out smaller.
    #[default]
    Pool,
    /// Keep drawing until the requested number of distinct names exists.
    Exact,
}

/// Draw `count` candidates (pool) or `count` distinct names (exact).
///
/// Names keep first-seen order.
///
/// # Errors
///
/// Returns [`PopulationError::NamesExhausted`] in [`NameMode::Exact`] when
/// the source keeps repeating itself for
/// `count * EXACT_ATTEMPTS_PER_NAME` draws.
pub fn draw_unique_names<S>(
    source: &mut S,
    rng: &mut dyn RngCore,
    count: usize,
    mode: NameMode,
) -> Result<Vec<String>, PopulationError>
where
    S: NameSource + ?Sized,
{
    let mut seen = BTreeSet::new();
    let mut names = Vec::with_capacity(count);

    let attempts = match mode {
        NameMode::Pool => count,
        NameMode::Exact => count.saturating_mul(EXACT_ATTEMPTS_PER_NAME),
    };

    let mut drawn: usize = 0;
    while drawn < attempts && names.len() < count {
        drawn = drawn.saturating_add(1);
        let name = source.next_name(rng);
        if seen.insert(name.clone()) {
            names.push(name);
        }
    }

    if mode == NameMode::Exact && names.len() < count {
        return Err(PopulationError::NamesExhausted {
            requested: count,
            unique: names.len(),
            attempts: drawn,
        });
    }

    let duplicates = drawn.saturating_sub(names.len());
    if duplicates > 0 {
        debug!(duplicates, "Duplicate candidate names discarded");
    }
    info!(
        requested = count,
        unique = names.len(),
        mode = ?mode,
        "Usernames drawn"
    );
    Ok(names)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    /// Cycles through `width` names: user0, user1, ...
    fn cycling(width: u32) -> impl FnMut(&mut dyn RngCore) -> String {
        let mut next: u32 = 0;
        move |_rng: &mut dyn RngCore| {
            let name = format!("user{}", next.checked_rem(width).unwrap_or(0));
            next = next.wrapping_add(1);
            name
        }
    }

    #[test]
    fn fake_usernames_are_non_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut source = FakeUsernames;
        for _ in 0..20 {
            assert!(!source.next_name(&mut rng).is_empty());
        }
    }

    #[test]
    fn fake_usernames_repeat_under_same_seed() {
        let draw = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            draw_unique_names(&mut FakeUsernames, &mut rng, 25, NameMode::Pool).unwrap()
        };
        assert_eq!(draw(9), draw(9));
    }

    #[test]
    fn pool_mode_dedupes_and_may_shrink() {
        let mut rng = StdRng::seed_from_u64(1);
        let names = draw_unique_names(&mut cycling(3), &mut rng, 10, NameMode::Pool).unwrap();
        assert_eq!(names, vec!["user0", "user1", "user2"]);
    }

    #[test]
    fn exact_mode_reaches_count() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut calls: u32 = 0;
        // Every name is produced twice in a row.
        let mut doubled = |_rng: &mut dyn RngCore| {
            let name = format!("user{}", calls.checked_div(2).unwrap_or(0));
            calls = calls.wrapping_add(1);
            name
        };
        let names = draw_unique_names(&mut doubled, &mut rng, 5, NameMode::Exact).unwrap();
        assert_eq!(names.len(), 5);
        let distinct: BTreeSet<&String> = names.iter().collect();
        assert_eq!(distinct.len(), 5);
    }

    #[test]
    fn exact_mode_gives_up_on_exhausted_source() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = draw_unique_names(&mut cycling(3), &mut rng, 10, NameMode::Exact);
        assert!(matches!(
            result,
            Err(PopulationError::NamesExhausted {
                requested: 10,
                unique: 3,
                ..
            })
        ));
    }

    #[test]
    fn zero_names_is_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        let names = draw_unique_names(&mut FakeUsernames, &mut rng, 0, NameMode::Exact).unwrap();
        assert!(names.is_empty());
    }
}

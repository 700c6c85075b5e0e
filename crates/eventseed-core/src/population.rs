//! Population simulator: users, their registrations, and derived
//! participation.
//!
//! Each user is interested in `k` distinct categories, `k` drawn uniformly
//! from `[min_categories, max_categories]` and clamped to the number of
//! categories available. From every chosen category the user samples past
//! events with replacement (between one and all of them) and future
//! events with replacement (between one and `max_future_per_category`).
//! Registration is idempotent, so repeated draws collapse.
//!
//! Scripted users from the catalog document keep their listed
//! registrations and are placed ahead of the sampled population.
//!
//! Participation is derived once all of a user's registrations exist,
//! against one as-of time for the whole run.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use eventseed_catalog::{EventCatalog, UserDefinition};
use eventseed_types::{Bucket, EventId, ParticipationOutcome, RelationError, User};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Errors raised while building the population.
#[derive(Debug, thiserror::Error)]
pub enum PopulationError {
    /// The name source could not supply enough distinct names.
    #[error("needed {requested} unique names but found only {unique} after {attempts} draws")]
    NamesExhausted {
        /// Names requested.
        requested: usize,
        /// Distinct names obtained.
        unique: usize,
        /// Draws performed.
        attempts: usize,
    },

    /// The per-user category range is empty or starts at zero.
    #[error("invalid category range {min}..={max}")]
    CategoryRange {
        /// Minimum categories per user.
        min: usize,
        /// Maximum categories per user.
        max: usize,
    },

    /// A scripted user registers to an event name the catalog lacks.
    #[error("scripted user '{user}' registers to unknown event '{event}'")]
    UnknownScriptedEvent {
        /// The scripted user.
        user: String,
        /// The event name that matched nothing.
        event: String,
    },

    /// Two scripted users share a name.
    #[error("scripted user '{name}' is defined more than once")]
    DuplicateScriptedUser {
        /// The repeated name.
        name: String,
    },
}

/// Which chosen categories feed a user's registrations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryMode {
    /// Events sampled from every chosen category are registered.
    #[default]
    Union,
    /// Only the events sampled from the last chosen category are
    /// registered; earlier samples are discarded.
    LastOnly,
}

/// Per-user sampling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingSettings {
    /// Fewest categories per user.
    pub min_categories: usize,
    /// Most categories per user.
    pub max_categories: usize,
    /// Cap on future events drawn per category.
    pub max_future_per_category: usize,
    /// Accumulation across chosen categories.
    pub category_mode: CategoryMode,
}

impl SamplingSettings {
    const fn check(&self) -> Result<(), PopulationError> {
        if self.min_categories == 0 || self.min_categories > self.max_categories {
            return Err(PopulationError::CategoryRange {
                min: self.min_categories,
                max: self.max_categories,
            });
        }
        Ok(())
    }
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            min_categories: 1,
            max_categories: 3,
            max_future_per_category: 3,
            category_mode: CategoryMode::Union,
        }
    }
}

/// Totals of one participation pass over the population.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParticipationSummary {
    /// The evaluation time used for every user.
    pub as_of: Option<NaiveDateTime>,
    /// Participation edges created.
    pub added: usize,
    /// Registered events that had not started by `as_of`.
    pub not_yet_started: usize,
    /// Any other rejection. Nonzero means the model is inconsistent.
    pub other_rejections: usize,
}

impl ParticipationSummary {
    fn record(&mut self, user: &str, outcome: ParticipationOutcome) {
        self.added = self.added.saturating_add(outcome.added);
        for rejection in outcome.rejected {
            if let RelationError::NotYetStarted { event, start, .. } = &rejection {
                debug!(user, event = %event, start = %start, "Registration not yet started, no participation");
                self.not_yet_started = self.not_yet_started.saturating_add(1);
            } else {
                warn!(user, error = %rejection, "Participation rejected");
                self.other_rejections = self.other_rejections.saturating_add(1);
            }
        }
    }
}

/// Sample the event ids one user registers to, in registration order
/// (duplicates included).
pub fn sample_registrations<R: Rng + ?Sized>(
    catalog: &EventCatalog,
    categories: &[&str],
    settings: &SamplingSettings,
    rng: &mut R,
) -> Vec<EventId> {
    let upper = settings.max_categories.min(categories.len());
    let lower = settings.min_categories.min(upper);
    let k = rng.random_range(lower..=upper);

    let chosen: Vec<&str> = categories.choose_multiple(rng, k).copied().collect();

    let mut candidates = Vec::new();
    for name in chosen {
        let Some(buckets) = catalog.category(name) else {
            continue;
        };
        let mut sampled = draw_with_replacement(buckets.bucket(Bucket::Past), usize::MAX, rng);
        sampled.extend(draw_with_replacement(
            buckets.bucket(Bucket::Future),
            settings.max_future_per_category,
            rng,
        ));
        match settings.category_mode {
            CategoryMode::Union => candidates.extend(sampled),
            CategoryMode::LastOnly => candidates = sampled,
        }
    }
    candidates
}

/// Draw between one and `min(cap, pool.len())` ids with replacement.
/// An empty pool or a zero cap yields nothing.
fn draw_with_replacement<R: Rng + ?Sized>(pool: &[EventId], cap: usize, rng: &mut R) -> Vec<EventId> {
    let upper = cap.min(pool.len());
    if upper == 0 {
        return Vec::new();
    }
    let count = rng.random_range(1..=upper);
    (0..count).filter_map(|_| pool.choose(rng).copied()).collect()
}

/// Create one user and register the sampled events.
pub fn simulate_user<R: Rng + ?Sized>(
    name: String,
    catalog: &EventCatalog,
    categories: &[&str],
    settings: &SamplingSettings,
    rng: &mut R,
) -> User {
    let mut user = User::new(name);
    let sampled = sample_registrations(catalog, categories, settings, rng);
    let drawn = sampled.len();
    for event in sampled.into_iter().filter_map(|id| catalog.get(id)) {
        user.add_registered(event);
    }
    debug!(
        user = user.name(),
        drawn,
        registered = user.registered_to().len(),
        "User registrations sampled"
    );
    user
}

/// Create one user per name, in name order.
///
/// # Errors
///
/// Returns [`PopulationError::CategoryRange`] if the settings ask for
/// zero categories or an inverted range.
pub fn populate<R: Rng + ?Sized>(
    catalog: &EventCatalog,
    names: Vec<String>,
    settings: &SamplingSettings,
    rng: &mut R,
) -> Result<Vec<User>, PopulationError> {
    settings.check()?;
    let categories = catalog.category_names();

    let users: Vec<User> = names
        .into_iter()
        .map(|name| simulate_user(name, catalog, &categories, settings, rng))
        .collect();

    let registrations: usize = users.iter().map(|u| u.registered_to().len()).sum();
    let idle = users.iter().filter(|u| u.registered_to().is_empty()).count();
    info!(
        users = users.len(),
        registrations,
        users_without_registrations = idle,
        categories = categories.len(),
        category_mode = ?settings.category_mode,
        "Population simulated"
    );
    Ok(users)
}

/// Create the scripted users of a catalog document, each registered to
/// its listed events in order. Event names resolve to the first event
/// with that name.
///
/// # Errors
///
/// Returns [`PopulationError::DuplicateScriptedUser`] if a name repeats,
/// or [`PopulationError::UnknownScriptedEvent`] if an event name matches
/// nothing in the catalog.
pub fn scripted_users(catalog: &EventCatalog, definitions: &[UserDefinition]) -> Result<Vec<User>, PopulationError> {
    let mut seen = BTreeSet::new();
    let mut users = Vec::with_capacity(definitions.len());

    for definition in definitions {
        if !seen.insert(definition.name.as_str()) {
            return Err(PopulationError::DuplicateScriptedUser {
                name: definition.name.clone(),
            });
        }
        let mut user = User::new(definition.name.as_str());
        for event_name in &definition.registered_to {
            let event = catalog
                .find_by_name(event_name)
                .ok_or_else(|| PopulationError::UnknownScriptedEvent {
                    user: definition.name.clone(),
                    event: event_name.clone(),
                })?;
            user.add_registered(event);
        }
        debug!(
            user = user.name(),
            registered = user.registered_to().len(),
            "Scripted user registered"
        );
        users.push(user);
    }

    if !users.is_empty() {
        let registrations: usize = users.iter().map(|u| u.registered_to().len()).sum();
        info!(users = users.len(), registrations, "Scripted users loaded");
    }
    Ok(users)
}

/// Derive participation for every user against one as-of time.
pub fn derive_participation(users: &mut [User], catalog: &EventCatalog, as_of: NaiveDateTime) -> ParticipationSummary {
    let mut summary = ParticipationSummary {
        as_of: Some(as_of),
        ..ParticipationSummary::default()
    };
    for user in users.iter_mut() {
        let outcome = user.derive_participation(|id| catalog.get(id), as_of);
        summary.record(user.name(), outcome);
    }
    info!(
        as_of = %as_of,
        added = summary.added,
        not_yet_started = summary.not_yet_started,
        other_rejections = summary.other_rejections,
        "Participation derived"
    );
    summary
}

/// Number of registered users per category, counting a user once per
/// category they registered into.
pub fn category_reach(users: &[User], catalog: &EventCatalog) -> BTreeMap<String, usize> {
    let mut reach = BTreeMap::new();
    for name in catalog.category_names() {
        let Some(buckets) = catalog.category(name) else {
            continue;
        };
        let count = users
            .iter()
            .filter(|user| {
                user.registered_to()
                    .iter()
                    .any(|id| buckets.past.contains(id) || buckets.future.contains(id))
            })
            .count();
        reach.insert(name.to_owned(), count);
    }
    reach
}

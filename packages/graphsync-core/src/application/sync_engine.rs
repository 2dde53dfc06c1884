//! Sync engine
//!
//! Turns entity transitions into ordered backend actions by fanning each
//! snapshot out to the mapper set for its kind.
//!
//! # Failure isolation
//!
//! A `MappingError` only drops the failing mapper's contribution for that
//! one transition. It is logged and returned in [`SyncOutcome::failures`];
//! the operations themselves never fail.
//!
//! # Update reconciliation
//!
//! `update(before, after)` upserts every document produced for `after`, then
//! deletes each `before` document whose (index, type) location is not
//! covered by `after`. The diff is keyed on location, not on the full
//! (index, type, id) triple: a `before` document is kept whenever `after`
//! writes to the same location, even under a different id.
//!
//! ```text
//! after  ──map──►  Upsert ... (mapper order)      ──┐
//!                      │ locations seen              ├──► [Upserts.., Deletes..]
//! before ──locate──► Delete if location unseen  ───┘
//! ```

use rayon::prelude::*;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::config::MappingConfig;
use crate::domain::{Action, DocumentLocation, EntitySnapshot, GraphDocumentMapper, MappingDefaults};
use crate::error::{MappingError, MappingResult};

/// Graph change handed over by the change-event source
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Created(EntitySnapshot),
    Updated {
        before: EntitySnapshot,
        after: EntitySnapshot,
    },
    Deleted(EntitySnapshot),
}

impl Transition {
    /// The snapshot that identifies the entity (the `after` side for updates)
    pub fn entity(&self) -> &EntitySnapshot {
        match self {
            Transition::Created(entity) | Transition::Deleted(entity) => entity,
            Transition::Updated { after, .. } => after,
        }
    }
}

/// Engine operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOperation {
    CreateOrUpdate,
    Delete,
    Update,
}

impl SyncOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncOperation::CreateOrUpdate => "create_or_update",
            SyncOperation::Delete => "delete",
            SyncOperation::Update => "update",
        }
    }
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One mapper that could not contribute to one transition
#[derive(Debug)]
pub struct MappingFailure {
    /// Mapper name
    pub mapper: String,
    /// Entity identity (`node#42:Person`)
    pub entity: String,
    pub operation: SyncOperation,
    pub error: MappingError,
}

impl fmt::Display for MappingFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} failed in mapper '{}': {}",
            self.operation, self.entity, self.mapper, self.error
        )
    }
}

/// Result of one engine call: the actions to send plus any per-mapper failures
#[derive(Debug, Default)]
pub struct SyncOutcome {
    /// Actions in emission order
    pub actions: Vec<Action>,
    pub failures: Vec<MappingFailure>,
}

impl SyncOutcome {
    /// True when no mapper failed
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn upserts(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter().filter(|a| a.is_upsert())
    }

    pub fn deletes(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter().filter(|a| a.is_delete())
    }

    pub fn into_actions(self) -> Vec<Action> {
        self.actions
    }
}

/// Mapping and reconciliation engine
///
/// Holds only shared, read-only configuration, so one engine can serve any
/// number of threads. Ordering between transitions of the same entity is the
/// caller's responsibility.
#[derive(Debug, Clone)]
pub struct SyncEngine {
    config: Arc<MappingConfig>,
}

impl SyncEngine {
    pub fn new(config: Arc<MappingConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MappingConfig {
        &self.config
    }

    /// One `Upsert` per supporting mapper that maps successfully, in mapper order
    pub fn create_or_update(&self, entity: &EntitySnapshot) -> SyncOutcome {
        let mut outcome = SyncOutcome::default();
        let documents = self.resolve(entity, SyncOperation::CreateOrUpdate, &mut outcome.failures, |m, e, d| {
            m.map(e, d)
        });
        warn_shared_locations(entity, documents.iter().map(|(name, doc)| (*name, doc.location())));

        outcome
            .actions
            .extend(documents.into_iter().map(|(_, doc)| doc.into_upsert()));

        tracing::debug!(
            "create_or_update {}: {} upserts, {} failures",
            entity,
            outcome.actions.len(),
            outcome.failures.len()
        );
        outcome
    }

    /// One `Delete` per supporting mapper whose target resolves, in mapper order
    pub fn delete(&self, entity: &EntitySnapshot) -> SyncOutcome {
        let mut outcome = SyncOutcome::default();
        let targets = self.resolve(entity, SyncOperation::Delete, &mut outcome.failures, |m, e, d| {
            m.locate(e, d)
        });
        warn_shared_locations(entity, targets.iter().map(|(name, target)| (*name, target.location())));

        outcome
            .actions
            .extend(targets.into_iter().map(|(_, target)| target.into_delete()));

        tracing::debug!(
            "delete {}: {} deletes, {} failures",
            entity,
            outcome.actions.len(),
            outcome.failures.len()
        );
        outcome
    }

    /// Upserts for `after`, then deletes for `before` locations `after` no longer covers
    ///
    /// Known gap: when the id changes but the (index, type) location does not,
    /// the document at the old id is left behind in the index.
    pub fn update(&self, before: &EntitySnapshot, after: &EntitySnapshot) -> SyncOutcome {
        if before.kind() != after.kind() || before.id() != after.id() {
            tracing::warn!("update pairs different entities: {} -> {}", before, after);
        }

        let mut outcome = SyncOutcome::default();

        let documents = self.resolve(after, SyncOperation::Update, &mut outcome.failures, |m, e, d| {
            m.map(e, d)
        });
        warn_shared_locations(after, documents.iter().map(|(name, doc)| (*name, doc.location())));
        let mut seen: HashSet<DocumentLocation> = HashSet::with_capacity(documents.len());
        for (_, doc) in documents {
            seen.insert(doc.location());
            outcome.actions.push(doc.into_upsert());
        }
        let upserts = outcome.actions.len();

        let previous = self.resolve(before, SyncOperation::Update, &mut outcome.failures, |m, e, d| {
            m.locate(e, d)
        });
        warn_shared_locations(before, previous.iter().map(|(name, target)| (*name, target.location())));

        for (mapper, target) in previous {
            if seen.contains(&target.location()) {
                continue;
            }
            tracing::trace!("{} left {} (mapper '{}')", after, target, mapper);
            outcome.actions.push(target.into_delete());
        }

        tracing::debug!(
            "update {}: {} upserts, {} deletes, {} failures",
            after,
            upserts,
            outcome.actions.len() - upserts,
            outcome.failures.len()
        );
        outcome
    }

    /// Dispatch a transition to the matching operation
    pub fn process(&self, transition: &Transition) -> SyncOutcome {
        match transition {
            Transition::Created(entity) => self.create_or_update(entity),
            Transition::Updated { before, after } => self.update(before, after),
            Transition::Deleted(entity) => self.delete(entity),
        }
    }

    /// Process independent transitions in parallel; outcomes keep input order
    pub fn process_batch(&self, transitions: &[Transition]) -> Vec<SyncOutcome> {
        transitions.par_iter().map(|t| self.process(t)).collect()
    }

    /// Run `resolve` for every supporting mapper, collecting successes with the
    /// mapper name and recording failures
    fn resolve<'a, T>(
        &'a self,
        entity: &'a EntitySnapshot,
        operation: SyncOperation,
        failures: &mut Vec<MappingFailure>,
        resolve: impl Fn(&dyn GraphDocumentMapper, &EntitySnapshot, &MappingDefaults) -> MappingResult<T>,
    ) -> Vec<(&'a str, T)> {
        let defaults = self.config.defaults();
        let mut resolved = Vec::new();

        for mapper in self.config.mappers_for(entity.kind()).applicable(entity) {
            match resolve(&**mapper, entity, defaults) {
                Ok(value) => resolved.push((mapper.name(), value)),
                Err(error) => {
                    tracing::error!(
                        mapper = mapper.name(),
                        entity = %entity,
                        operation = %operation,
                        "Mapping failed: {}",
                        error
                    );
                    failures.push(MappingFailure {
                        mapper: mapper.name().to_string(),
                        entity: entity.to_string(),
                        operation,
                        error,
                    });
                }
            }
        }
        resolved
    }
}

/// Warn when two mappers route one snapshot to the same location
fn warn_shared_locations<'a>(
    entity: &EntitySnapshot,
    locations: impl Iterator<Item = (&'a str, DocumentLocation)>,
) {
    for (first, second, location) in shared_locations(locations) {
        tracing::warn!(
            "mappers '{}' and '{}' both route {} to {}; check the mapping configuration",
            first,
            second,
            entity,
            location
        );
    }
}

/// Pairs of (first owner, later mapper, location) for every repeated location
fn shared_locations<'a>(
    locations: impl Iterator<Item = (&'a str, DocumentLocation)>,
) -> Vec<(&'a str, &'a str, DocumentLocation)> {
    let mut owners: HashMap<DocumentLocation, &'a str> = HashMap::new();
    let mut shared = Vec::new();
    for (mapper, location) in locations {
        match owners.entry(location) {
            Entry::Occupied(first) => shared.push((*first.get(), mapper, first.key().clone())),
            Entry::Vacant(slot) => {
                slot.insert(mapper);
            }
        }
    }
    shared
}

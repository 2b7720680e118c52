//! Slate store
//!
//! Ordered collection of matches. Insertion order defines the 1-based match
//! index used in prediction requests and echoed back by the service.

use tracing::debug;

use crate::error::AppError;
use crate::models::{Match, MatchFields, MatchId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slate {
    matches: Vec<Match>,
}

impl Slate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a match; its id must not already be on the slate
    pub fn add(&mut self, m: Match) -> Result<(), AppError> {
        if self.contains(m.id) {
            return Err(AppError::DuplicateMatchId(m.id));
        }

        debug!("Adding match {} ({})", m.id, m);
        self.matches.push(m);
        Ok(())
    }

    /// Remove a match by id; absent ids are a no-op
    pub fn remove(&mut self, id: MatchId) -> Option<Match> {
        let pos = self.matches.iter().position(|m| m.id == id)?;
        let removed = self.matches.remove(pos);
        debug!("Removed match {} ({})", removed.id, removed);
        Some(removed)
    }

    /// Replace a match's fields in place, keeping its id and position.
    /// Returns false when the id is absent.
    pub fn update(&mut self, id: MatchId, fields: MatchFields) -> bool {
        match self.matches.iter_mut().find(|m| m.id == id) {
            Some(slot) => {
                *slot = Match::from_fields(id, fields);
                debug!("Updated match {} ({})", id, slot);
                true
            }
            None => false,
        }
    }

    pub fn list(&self) -> &[Match] {
        &self.matches
    }

    pub fn get(&self, id: MatchId) -> Option<&Match> {
        self.matches.iter().find(|m| m.id == id)
    }

    /// Match at a 1-based index
    pub fn at_index(&self, match_index: usize) -> Option<&Match> {
        match_index.checked_sub(1).and_then(|i| self.matches.get(i))
    }

    /// 1-based index of a match
    pub fn index_of(&self, id: MatchId) -> Option<usize> {
        self.matches.iter().position(|m| m.id == id).map(|i| i + 1)
    }

    pub fn contains(&self, id: MatchId) -> bool {
        self.matches.iter().any(|m| m.id == id)
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Match> {
        self.matches.iter()
    }
}

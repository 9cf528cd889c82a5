//! Tournament selection made before a game starts.

use crate::error::SelectionError;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// A validated choice of question data set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentSelection {
    /// Questions from one tournament.
    Single(String),
    /// Questions mixed from two distinct tournaments.
    Mix(String, String),
}

impl TournamentSelection {
    /// First (or only) tournament.
    pub fn primary(&self) -> &str {
        match self {
            TournamentSelection::Single(name) | TournamentSelection::Mix(name, _) => name,
        }
    }

    /// Second tournament of a custom mix.
    pub fn secondary(&self) -> Option<&str> {
        match self {
            TournamentSelection::Single(_) => None,
            TournamentSelection::Mix(_, second) => Some(second),
        }
    }
}

impl std::fmt::Display for TournamentSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentSelection::Single(name) => write!(f, "{}", name),
            TournamentSelection::Mix(a, b) => write!(f, "{} + {}", a, b),
        }
    }
}

/// How the player wants to pick tournaments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionKind {
    /// One tournament.
    Single,
    /// Two tournaments mixed together.
    Custom,
}

/// Raw, unvalidated selection input.
///
/// Mirrors a start screen: a type dropdown plus the tournament fields for
/// each type. Empty strings count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionForm {
    /// Chosen selection type, if any.
    pub kind: Option<SelectionKind>,
    /// Tournament for single mode.
    #[serde(default)]
    pub single: String,
    /// First tournament for custom mixing.
    #[serde(default)]
    pub mix_1: String,
    /// Second tournament for custom mixing.
    #[serde(default)]
    pub mix_2: String,
}

impl SelectionForm {
    /// A filled-in single tournament form.
    pub fn single(name: impl Into<String>) -> Self {
        Self {
            kind: Some(SelectionKind::Single),
            single: name.into(),
            ..Self::default()
        }
    }

    /// A filled-in custom mixing form.
    pub fn custom(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            kind: Some(SelectionKind::Custom),
            mix_1: first.into(),
            mix_2: second.into(),
            ..Self::default()
        }
    }

    /// Validates the form against the tournaments on offer.
    ///
    /// An empty `available` list disables the membership check.
    #[instrument(skip(available))]
    pub fn validate(&self, available: &[String]) -> Result<TournamentSelection, SelectionError> {
        let selection = match self.kind {
            None => return Err(SelectionError::MissingType),
            Some(SelectionKind::Single) => {
                let name = self.single.trim();
                if name.is_empty() {
                    return Err(SelectionError::MissingSingle);
                }
                TournamentSelection::Single(name.to_string())
            }
            Some(SelectionKind::Custom) => {
                let (a, b) = (self.mix_1.trim(), self.mix_2.trim());
                if a.is_empty() || b.is_empty() || a == b {
                    return Err(SelectionError::InvalidMix);
                }
                TournamentSelection::Mix(a.to_string(), b.to_string())
            }
        };

        if !available.is_empty() {
            let names = std::iter::once(selection.primary()).chain(selection.secondary());
            for name in names {
                if !available.iter().any(|t| t == name) {
                    warn!(tournament = name, "Tournament not on offer");
                    return Err(SelectionError::UnknownTournament(name.to_string()));
                }
            }
        }

        debug!(%selection, "Selection accepted");
        Ok(selection)
    }
}

//! Difficulty marker for extra-time questions.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Difficulty requested for a sudden-death extra-time question.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    /// Standard extra-time question.
    Normal,
    /// Harder extra-time question.
    Hard,
}

impl Difficulty {
    /// Picks `Normal` or `Hard` with equal probability.
    pub fn pick<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            Difficulty::Normal
        } else {
            Difficulty::Hard
        }
    }

    /// Wire value used in question requests.
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

//! Tournament stages and the rules attached to each of them.

use super::error::RulesError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use strum::IntoEnumIterator;
use tracing::{instrument, warn};

/// Number of questions in one scored batch (a group match or a knockout stage).
pub const BATCH_SIZE: usize = 8;

/// Group-stage matches played before the group is evaluated.
pub const GROUP_MATCHES: u32 = 4;

/// Group points strictly above this go straight to the Round of 16.
pub const ROUND_OF_16_THRESHOLD: u32 = 25;

/// Group points strictly above this (and below the Round of 16 line) go to the Play-off.
pub const PLAYOFF_THRESHOLD: u32 = 18;

/// One elimination round of the tournament.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::EnumIter,
    strum::Display,
    strum::IntoStaticStr,
)]
pub enum Stage {
    /// Four matches, scored on accumulated points.
    #[serde(rename = "Group Stage")]
    #[strum(serialize = "Group Stage")]
    GroupStage,
    /// Second chance for mid-table group finishers.
    #[serde(rename = "Play-off for Round of 16")]
    #[strum(serialize = "Play-off for Round of 16")]
    PlayOff,
    /// Last sixteen.
    #[serde(rename = "Round of 16")]
    #[strum(serialize = "Round of 16")]
    RoundOf16,
    /// Last eight.
    #[serde(rename = "Quarter-final")]
    #[strum(serialize = "Quarter-final")]
    QuarterFinal,
    /// Last four.
    #[serde(rename = "Semi-final")]
    #[strum(serialize = "Semi-final")]
    SemiFinal,
    /// Winner takes the tournament.
    #[serde(rename = "The Final")]
    #[strum(serialize = "The Final")]
    Final,
}

impl Stage {
    /// Returns the stage name as sent to the question supply.
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Returns true for the group stage, which has its own rule set.
    pub fn is_group(self) -> bool {
        matches!(self, Stage::GroupStage)
    }

    /// Default pass threshold for knockout stages.
    pub fn default_pass_threshold(self) -> Option<u32> {
        match self {
            Stage::GroupStage => None,
            Stage::PlayOff => Some(3),
            Stage::RoundOf16 => Some(4),
            Stage::QuarterFinal => Some(5),
            Stage::SemiFinal => Some(6),
            Stage::Final => Some(7),
        }
    }

    /// Default per-question countdown in seconds.
    pub fn default_timer_secs(self) -> u32 {
        match self {
            Stage::GroupStage | Stage::PlayOff => 90,
            Stage::RoundOf16 | Stage::QuarterFinal | Stage::SemiFinal => 75,
            Stage::Final => 60,
        }
    }
}

/// A stage together with its threshold and countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDefinition {
    /// Which stage this entry describes.
    pub stage: Stage,
    /// Correct answers that force extra time; one more passes outright.
    /// `None` for the group stage.
    #[serde(default)]
    pub pass_threshold: Option<u32>,
    /// Seconds allowed per regular question.
    pub timer_secs: u32,
}

impl StageDefinition {
    /// Creates the definition with the stage's default threshold and timer.
    pub fn standard(stage: Stage) -> Self {
        Self {
            stage,
            pass_threshold: stage.default_pass_threshold(),
            timer_secs: stage.default_timer_secs(),
        }
    }

    /// Countdown for a regular question.
    pub fn timer(&self) -> Duration {
        Duration::from_secs(u64::from(self.timer_secs))
    }

    /// Countdown for an extra-time question: half the regular timer, at least a second.
    pub fn extra_time(&self) -> Duration {
        Duration::from_millis(u64::from(self.timer_secs) * 500).max(Duration::from_secs(1))
    }
}

/// Thresholds that decide where four group matches lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRules {
    /// Matches played before evaluation.
    pub matches: u32,
    /// Points above this reach the Round of 16; exactly this forces extra time.
    pub round_of_16_threshold: u32,
    /// Points above this reach the Play-off; exactly this forces extra time.
    pub playoff_threshold: u32,
}

impl Default for GroupRules {
    fn default() -> Self {
        Self {
            matches: GROUP_MATCHES,
            round_of_16_threshold: ROUND_OF_16_THRESHOLD,
            playoff_threshold: PLAYOFF_THRESHOLD,
        }
    }
}

/// The fixed, ordered list of stages a tournament runs through.
///
/// Construction validates the order once; afterwards the sequence is
/// read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageSequence {
    stages: Vec<StageDefinition>,
    group: GroupRules,
}

impl StageSequence {
    /// Builds a sequence from explicit definitions.
    ///
    /// # Errors
    ///
    /// Returns `RulesError::InvalidConfiguration` if the list is empty,
    /// repeats a stage, is out of tournament order, leaves a knockout stage
    /// without a pass threshold, includes the group stage without both of
    /// its routes (Play-off and Round of 16), or the group thresholds are
    /// inverted.
    #[instrument(skip(stages), fields(count = stages.len()))]
    pub fn new(stages: Vec<StageDefinition>, group: GroupRules) -> Result<Self, RulesError> {
        if stages.is_empty() {
            return Err(RulesError::InvalidConfiguration(
                "stage sequence is empty".to_string(),
            ));
        }

        if stages.windows(2).any(|pair| pair[0].stage >= pair[1].stage) {
            warn!(?stages, "Stage sequence out of order");
            return Err(RulesError::InvalidConfiguration(
                "stages must be unique and in tournament order".to_string(),
            ));
        }

        if let Some(def) = stages
            .iter()
            .find(|def| !def.stage.is_group() && def.pass_threshold.is_none())
        {
            return Err(RulesError::InvalidConfiguration(format!(
                "{} has no pass threshold",
                def.stage
            )));
        }

        if stages.iter().any(|def| def.stage.is_group()) {
            let missing: Vec<&str> = [Stage::PlayOff, Stage::RoundOf16]
                .into_iter()
                .filter(|route| stages.iter().all(|def| def.stage != *route))
                .map(Stage::name)
                .collect();
            if !missing.is_empty() {
                warn!(?missing, "Group stage routes missing");
                return Err(RulesError::InvalidConfiguration(format!(
                    "group stage needs {} in the sequence",
                    missing.join(" and ")
                )));
            }
        }

        if group.matches == 0 {
            return Err(RulesError::InvalidConfiguration(
                "group stage needs at least one match".to_string(),
            ));
        }

        if group.round_of_16_threshold <= group.playoff_threshold {
            return Err(RulesError::InvalidConfiguration(format!(
                "Round of 16 threshold ({}) must exceed Play-off threshold ({})",
                group.round_of_16_threshold, group.playoff_threshold
            )));
        }

        Ok(Self { stages, group })
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always false for a constructed sequence.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Index of the last stage; passing it wins the tournament.
    pub fn last_index(&self) -> usize {
        self.stages.len() - 1
    }

    /// Returns the definition at `index`.
    pub fn get(&self, index: usize) -> Option<&StageDefinition> {
        self.stages.get(index)
    }

    /// Returns the definition at `index` or a configuration error.
    pub fn definition(&self, index: usize) -> Result<&StageDefinition, RulesError> {
        self.stages.get(index).ok_or_else(|| {
            RulesError::InvalidConfiguration(format!("no stage at index {}", index))
        })
    }

    /// Position of `stage` in the sequence.
    pub fn index_of(&self, stage: Stage) -> Result<usize, RulesError> {
        self.stages
            .iter()
            .position(|def| def.stage == stage)
            .ok_or_else(|| {
                RulesError::InvalidConfiguration(format!("{} is not part of the sequence", stage))
            })
    }

    /// Pass threshold for the stage at `index`.
    pub fn pass_threshold(&self, index: usize) -> Result<u32, RulesError> {
        let def = self.definition(index)?;
        def.pass_threshold.ok_or_else(|| {
            RulesError::InvalidConfiguration(format!("{} has no pass threshold", def.stage))
        })
    }

    /// Group-stage rules.
    pub fn group(&self) -> &GroupRules {
        &self.group
    }

    /// All definitions in order.
    pub fn stages(&self) -> &[StageDefinition] {
        &self.stages
    }
}

impl Default for StageSequence {
    fn default() -> Self {
        Self {
            stages: Stage::iter().map(StageDefinition::standard).collect(),
            group: GroupRules::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sequence_matches_tournament_order() {
        let seq = StageSequence::default();
        let names: Vec<&str> = seq.stages().iter().map(|d| d.stage.name()).collect();
        assert_eq!(
            names,
            [
                "Group Stage",
                "Play-off for Round of 16",
                "Round of 16",
                "Quarter-final",
                "Semi-final",
                "The Final"
            ]
        );
        assert_eq!(seq.last_index(), 5);
    }

    #[test]
    fn test_group_stage_has_no_threshold() {
        let seq = StageSequence::default();
        assert!(matches!(
            seq.pass_threshold(0),
            Err(RulesError::InvalidConfiguration(_))
        ));
        assert_eq!(seq.pass_threshold(2), Ok(4));
    }

    #[test]
    fn test_extra_time_timer_is_half() {
        assert_eq!(
            StageDefinition::standard(Stage::Final).extra_time(),
            Duration::from_secs(30)
        );
        assert_eq!(
            StageDefinition::standard(Stage::RoundOf16).extra_time(),
            Duration::from_millis(37_500)
        );
        let short = StageDefinition {
            stage: Stage::Final,
            pass_threshold: Some(7),
            timer_secs: 1,
        };
        assert_eq!(short.extra_time(), Duration::from_secs(1));
    }

    #[test]
    fn test_rejects_knockout_without_threshold() {
        let mut stages: Vec<StageDefinition> = Stage::iter().map(StageDefinition::standard).collect();
        stages[2].pass_threshold = None;
        assert!(matches!(
            StageSequence::new(stages, GroupRules::default()),
            Err(RulesError::InvalidConfiguration(m)) if m.contains("Round of 16")
        ));
    }

    #[test]
    fn test_rejects_group_without_routes() {
        let stages = vec![
            StageDefinition::standard(Stage::GroupStage),
            StageDefinition::standard(Stage::RoundOf16),
            StageDefinition::standard(Stage::Final),
        ];
        assert!(matches!(
            StageSequence::new(stages, GroupRules::default()),
            Err(RulesError::InvalidConfiguration(m)) if m.contains("Play-off")
        ));
    }

    #[test]
    fn test_knockout_only_sequence_needs_no_routes() {
        let stages = vec![
            StageDefinition::standard(Stage::SemiFinal),
            StageDefinition::standard(Stage::Final),
        ];
        assert!(StageSequence::new(stages, GroupRules::default()).is_ok());
    }

    #[test]
    fn test_rejects_out_of_order_stages() {
        let stages = vec![
            StageDefinition::standard(Stage::Final),
            StageDefinition::standard(Stage::SemiFinal),
        ];
        assert!(StageSequence::new(stages, GroupRules::default()).is_err());
    }

    #[test]
    fn test_rejects_inverted_group_thresholds() {
        let group = GroupRules {
            matches: 4,
            round_of_16_threshold: 10,
            playoff_threshold: 12,
        };
        let stages = Stage::iter().map(StageDefinition::standard).collect();
        assert!(StageSequence::new(stages, group).is_err());
    }

    #[test]
    fn test_stage_serializes_with_display_name() {
        let json = serde_json::to_string(&Stage::PlayOff).expect("serialize");
        assert_eq!(json, "\"Play-off for Round of 16\"");
        assert_eq!(Stage::Final.to_string(), "The Final");
    }
}

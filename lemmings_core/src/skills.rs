use bevy::prelude::*;
use bitflags::bitflags;
use lemmings_runtime::{SkillKind, SKILL_KINDS};

use crate::{
    agent::Agent,
    levels::SkillAllotment,
    sinks::{SoundCue, SoundSink},
};

bitflags! {
    /// Skills granted to a single agent.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SkillSet: u8 {
        const DIGGER = 1 << 0;
        const BUILDER = 1 << 1;
        const CLIMBER = 1 << 2;
        const BLOCKER = 1 << 3;
    }
}

impl SkillSet {
    pub fn of(kind: SkillKind) -> Self {
        match kind {
            SkillKind::Digger => SkillSet::DIGGER,
            SkillKind::Builder => SkillSet::BUILDER,
            SkillKind::Climber => SkillSet::CLIMBER,
            SkillKind::Blocker => SkillSet::BLOCKER,
        }
    }

    pub fn has(self, kind: SkillKind) -> bool {
        self.contains(Self::of(kind))
    }
}

/// Why a skill assignment was refused. Refusals never change any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AssignError {
    #[error("no agent is selected")]
    NoAgentSelected,
    #[error("no {0} skills remain")]
    Exhausted(SkillKind),
    #[error("skills can only be assigned while playing")]
    NotPlaying,
}

/// Remaining uses of each skill for the active level.
#[derive(Resource, Debug, Clone, PartialEq, Eq, Default)]
pub struct SkillLedger {
    remaining: [u32; SkillKind::COUNT],
}

impl SkillLedger {
    pub fn new(remaining: [u32; SkillKind::COUNT]) -> Self {
        Self { remaining }
    }

    pub fn from_allotment(allotment: &SkillAllotment) -> Self {
        Self::new(allotment.as_table())
    }

    pub fn reset(&mut self, allotment: &SkillAllotment) {
        self.remaining = allotment.as_table();
    }

    pub fn remaining(&self, kind: SkillKind) -> u32 {
        self.remaining[kind.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (SkillKind, u32)> + '_ {
        SKILL_KINDS.into_iter().zip(self.remaining.iter().copied())
    }

    /// Spend one `skill` on `agent`.
    ///
    /// Returns the count left after the assignment. A blocker takes effect
    /// immediately; other skills wait for the next ground contact.
    pub fn try_assign(
        &mut self,
        skill: SkillKind,
        agent: Option<&mut Agent>,
        sound: &mut dyn SoundSink,
    ) -> Result<u32, AssignError> {
        let agent = agent
            .filter(|agent| agent.is_alive())
            .ok_or(AssignError::NoAgentSelected)?;
        let slot = &mut self.remaining[skill.index()];
        if *slot == 0 {
            return Err(AssignError::Exhausted(skill));
        }
        *slot -= 1;

        agent.grant(skill);
        if skill == SkillKind::Blocker {
            agent.start_blocking();
        }
        sound.play(SoundCue::Select);

        tracing::debug!(
            target: "lemmings::skills",
            agent = %agent.id,
            skill = skill.as_str(),
            remaining = *slot,
            "skill.assigned"
        );
        Ok(*slot)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        agent::{AgentId, AgentState, AgentTuning},
        hazards::HazardSet,
        heightfield::HeightField,
        sinks::RecordingSink,
    };
    use bevy::math::Vec2;

    fn ledger(count: u32) -> SkillLedger {
        SkillLedger::new([count; SkillKind::COUNT])
    }

    fn walker() -> Agent {
        Agent::new(AgentId(7), Vec2::new(100.0, 480.0), &AgentTuning::default())
    }

    #[test]
    fn assignment_grants_and_decrements() {
        let mut ledger = ledger(3);
        let mut agent = walker();
        let mut sink = RecordingSink::new();
        let left = ledger
            .try_assign(SkillKind::Digger, Some(&mut agent), &mut sink)
            .unwrap();
        assert_eq!(left, 2);
        assert!(agent.has_skill(SkillKind::Digger));
        assert_eq!(agent.state(), AgentState::Walking);
        assert_eq!(ledger.remaining(SkillKind::Digger), 2);
        assert_eq!(ledger.remaining(SkillKind::Builder), 3);
        assert_eq!(sink.sounds(), vec![SoundCue::Select]);
    }

    #[test]
    fn exhausted_skill_is_a_silent_no_op() {
        let mut ledger = SkillLedger::new([0, 1, 1, 1]);
        let mut agent = walker();
        let mut sink = RecordingSink::new();
        let err = ledger
            .try_assign(SkillKind::Digger, Some(&mut agent), &mut sink)
            .unwrap_err();
        assert_eq!(err, AssignError::Exhausted(SkillKind::Digger));
        assert!(agent.skills().is_empty());
        assert_eq!(ledger, SkillLedger::new([0, 1, 1, 1]));
        assert!(sink.sounds().is_empty());
    }

    #[test]
    fn missing_agent_is_a_silent_no_op() {
        let mut ledger = ledger(2);
        let mut sink = RecordingSink::new();
        let err = ledger
            .try_assign(SkillKind::Builder, None, &mut sink)
            .unwrap_err();
        assert_eq!(err, AssignError::NoAgentSelected);
        assert_eq!(ledger, self::ledger(2));
        assert!(sink.sounds().is_empty());
    }

    #[test]
    fn blocker_freezes_immediately() {
        let mut ledger = ledger(1);
        let mut agent = walker();
        let mut sink = RecordingSink::new();
        ledger
            .try_assign(SkillKind::Blocker, Some(&mut agent), &mut sink)
            .unwrap();
        assert!(agent.has_skill(SkillKind::Blocker));
        assert_eq!(agent.state(), AgentState::Blocking);

        let before = agent.position;
        let mut terrain = HeightField::flat(800, 600.0, 500.0);
        agent.update(
            &mut terrain,
            &HazardSet::default(),
            &AgentTuning::default(),
            Duration::from_millis(16),
            &mut sink,
        );
        assert_eq!(agent.position, before);
    }

    #[test]
    fn regranting_still_spends_a_use() {
        let mut ledger = ledger(2);
        let mut agent = walker();
        let mut sink = RecordingSink::new();
        ledger
            .try_assign(SkillKind::Climber, Some(&mut agent), &mut sink)
            .unwrap();
        let left = ledger
            .try_assign(SkillKind::Climber, Some(&mut agent), &mut sink)
            .unwrap();
        assert_eq!(left, 0);
        assert_eq!(agent.skills(), SkillSet::CLIMBER);
    }

    #[test]
    fn reset_restores_allotment() {
        let allotment = SkillAllotment {
            digger: 4,
            builder: 3,
            climber: 2,
            blocker: 1,
        };
        let mut ledger = SkillLedger::from_allotment(&allotment);
        let mut agent = walker();
        let mut sink = RecordingSink::new();
        ledger
            .try_assign(SkillKind::Digger, Some(&mut agent), &mut sink)
            .unwrap();
        ledger.reset(&allotment);
        let counts: Vec<_> = ledger.iter().collect();
        assert_eq!(
            counts,
            vec![
                (SkillKind::Digger, 4),
                (SkillKind::Builder, 3),
                (SkillKind::Climber, 2),
                (SkillKind::Blocker, 1),
            ]
        );
    }
}

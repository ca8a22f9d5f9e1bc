//! Enemy roster: the stat blocks world combatants are created from.

use std::collections::BTreeMap;

use battle_core::{
    AbilityKind, BattleConfig, Behavior, BossArchetype, Classification, CombatantSnapshot,
    DiceNotation, EntityFlags,
};

/// Stat block for one kind of enemy.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyTemplate {
    pub id: String,
    pub name: String,
    pub hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub luck: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub initiative_bonus: i32,
    /// Dice notation such as `1d8+1`.
    pub damage: String,
    pub abilities: Vec<AbilityKind>,
    pub behavior: Behavior,
    #[cfg_attr(feature = "serde", serde(default))]
    pub boss: Option<BossArchetype>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub elite: bool,
}

/// Invalid roster entries.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    #[error("enemy {0}: hp must be positive, attack and defense non-negative")]
    InvalidStats(String),

    #[error("enemy {id}: {count} abilities, at most {max} allowed")]
    TooManyAbilities { id: String, count: usize, max: usize },

    #[error("enemy {0}: no abilities")]
    NoAbilities(String),

    #[error("enemy {id}: bad damage dice {damage:?}")]
    BadDamage { id: String, damage: String },

    #[error("duplicate enemy id {0}")]
    Duplicate(String),
}

impl EnemyTemplate {
    /// Checks the entry without building anything.
    pub fn validate(&self) -> Result<(), RosterError> {
        if self.hp <= 0 || self.attack < 0 || self.defense < 0 {
            return Err(RosterError::InvalidStats(self.id.clone()));
        }
        if self.abilities.is_empty() {
            return Err(RosterError::NoAbilities(self.id.clone()));
        }
        if self.abilities.len() > BattleConfig::MAX_ABILITIES {
            return Err(RosterError::TooManyAbilities {
                id: self.id.clone(),
                count: self.abilities.len(),
                max: BattleConfig::MAX_ABILITIES,
            });
        }
        if self.damage.parse::<DiceNotation>().is_err() {
            return Err(RosterError::BadDamage {
                id: self.id.clone(),
                damage: self.damage.clone(),
            });
        }
        Ok(())
    }

    /// Fresh, full-health combat stats.
    pub fn to_snapshot(&self) -> Result<CombatantSnapshot, RosterError> {
        self.validate()?;

        let mut flags = EntityFlags::empty();
        flags.set(EntityFlags::ELITE, self.elite);
        flags.set(EntityFlags::BOSS, self.boss.is_some());
        let classification = match self.boss {
            Some(archetype) => Classification::boss(self.behavior, archetype),
            None => Classification::new(self.behavior),
        };

        Ok(CombatantSnapshot {
            name: self.name.clone(),
            hp: self.hp,
            max_hp: self.hp,
            attack: self.attack,
            defense: self.defense,
            speed: self.speed,
            luck: self.luck,
            initiative_bonus: self.initiative_bonus,
            damage: DiceNotation::parse_or_default(&self.damage),
            abilities: self.abilities.iter().copied().collect(),
            flags,
            classification,
        })
    }
}

/// Enemy templates keyed by id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Roster {
    templates: BTreeMap<String, EnemyTemplate>,
}

impl Roster {
    pub fn new(templates: Vec<EnemyTemplate>) -> Result<Self, RosterError> {
        let mut roster = Self::default();
        for template in templates {
            template.validate()?;
            if roster.templates.contains_key(&template.id) {
                return Err(RosterError::Duplicate(template.id));
            }
            roster.templates.insert(template.id.clone(), template);
        }
        Ok(roster)
    }

    pub fn get(&self, id: &str) -> Option<&EnemyTemplate> {
        self.templates.get(id)
    }

    /// Templates in id order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemyTemplate> {
        self.templates.values()
    }

    pub fn regulars(&self) -> impl Iterator<Item = &EnemyTemplate> {
        self.iter().filter(|t| t.boss.is_none())
    }

    pub fn boss(&self, archetype: BossArchetype) -> Option<&EnemyTemplate> {
        self.iter().find(|t| t.boss == Some(archetype))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(id: &str) -> EnemyTemplate {
        EnemyTemplate {
            id: id.to_owned(),
            name: "Goblin".to_owned(),
            hp: 12,
            attack: 3,
            defense: 1,
            speed: 4,
            luck: 0,
            initiative_bonus: 1,
            damage: "1d6+1".to_owned(),
            abilities: vec![AbilityKind::BasicAttack, AbilityKind::PowerStrike],
            behavior: Behavior::Aggressive,
            boss: None,
            elite: true,
        }
    }

    #[test]
    fn snapshot_copies_stats_and_flags() {
        let snapshot = template("goblin").to_snapshot().unwrap();
        assert_eq!(snapshot.hp, snapshot.max_hp);
        assert_eq!(snapshot.damage, DiceNotation::new(1, 6, 1));
        assert!(snapshot.flags.contains(EntityFlags::ELITE));
        assert!(!snapshot.is_boss());
        assert_eq!(snapshot.abilities.len(), 2);
    }

    #[test]
    fn rejects_bad_entries() {
        let mut bad = template("goblin");
        bad.damage = "lots".to_owned();
        assert!(matches!(bad.validate(), Err(RosterError::BadDamage { .. })));

        let mut bad = template("goblin");
        bad.abilities = vec![AbilityKind::BasicAttack; 7];
        assert!(matches!(
            bad.validate(),
            Err(RosterError::TooManyAbilities { count: 7, .. })
        ));

        assert_eq!(
            Roster::new(vec![template("a"), template("a")]),
            Err(RosterError::Duplicate("a".to_owned()))
        );
    }

    #[test]
    fn boss_lookup_by_archetype() {
        let mut boss = template("wyrm");
        boss.boss = Some(BossArchetype::Apex);
        let roster = Roster::new(vec![template("goblin"), boss]).unwrap();
        assert_eq!(roster.boss(BossArchetype::Apex).unwrap().id, "wyrm");
        assert_eq!(roster.regulars().count(), 1);
        assert!(roster.boss(BossArchetype::Conjurer).is_none());
    }
}

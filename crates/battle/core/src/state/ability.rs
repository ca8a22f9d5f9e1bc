//! Ability reference data.
//!
//! Every ability is a variant of the closed [`AbilityKind`] enum. Its static
//! definition comes from an exhaustive match in [`AbilityKind::def`], so adding
//! an ability is a compile-checked change in one place.

use super::status::StatusKind;

/// Identifier for every ability in the game.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AbilityKind {
    BasicAttack,
    PowerStrike,
    Cleave,
    Shortbow,
    Firebolt,
    FrostLance,
    VenomBite,
    ShadowLeap,
    SummonMinions,
    BindingChains,
    Blink,
    ArcaneBolt,
    TerrorRoar,
    TailSweep,
    ShieldWall,
}

/// What an ability does once its targeting is resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AbilityEffect {
    /// Attack roll and damage against the target (and AoE neighbors).
    Strike,
    /// Teleport the user to the safest free tile within `max_distance`.
    Reposition { max_distance: u32 },
    /// Call minions next to the user.
    Summon { count: u32 },
    /// Only applies the status effect to the user.
    Buff,
}

/// Immutable per-ability data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AbilityDef {
    pub kind: AbilityKind,
    /// Rounds before the ability can be used again (0 = every turn).
    pub cooldown: u32,
    /// 0 = self, 1 = melee, 2+ = ranged.
    pub range: u32,
    /// Damage multiplier in percent of the user's base damage.
    pub damage_percent: u32,
    /// Radius around the primary target that is also hit (0 = single target).
    pub aoe_radius: u32,
    /// Status inflicted on every hit target (or the user, when self-targeted).
    pub status: Option<(StatusKind, u32)>,
    pub self_target: bool,
    pub effect: AbilityEffect,
}

/// Reach of abilities heard across the whole arena; exceeds the span of the
/// largest arena size.
pub const ARENA_WIDE_RANGE: u32 = 64;

impl AbilityDef {
    const fn strike(kind: AbilityKind, cooldown: u32, range: u32, damage_percent: u32) -> Self {
        Self {
            kind,
            cooldown,
            range,
            damage_percent,
            aoe_radius: 0,
            status: None,
            self_target: false,
            effect: AbilityEffect::Strike,
        }
    }

    const fn on_self(kind: AbilityKind, cooldown: u32, effect: AbilityEffect) -> Self {
        Self {
            kind,
            cooldown,
            range: 0,
            damage_percent: 0,
            aoe_radius: 0,
            status: None,
            self_target: true,
            effect,
        }
    }

    const fn with_aoe(mut self, radius: u32) -> Self {
        self.aoe_radius = radius;
        self
    }

    const fn inflicting(mut self, status: StatusKind, duration: u32) -> Self {
        self.status = Some((status, duration));
        self
    }

    pub const fn deals_damage(&self) -> bool {
        matches!(self.effect, AbilityEffect::Strike) && self.damage_percent > 0
    }

    pub const fn is_melee(&self) -> bool {
        self.range == 1
    }
}

impl AbilityKind {
    pub const fn def(self) -> AbilityDef {
        use AbilityKind::*;

        match self {
            BasicAttack => AbilityDef::strike(self, 0, 1, 100),
            PowerStrike => AbilityDef::strike(self, 3, 1, 160),
            Cleave => AbilityDef::strike(self, 2, 1, 80).with_aoe(1),
            Shortbow => AbilityDef::strike(self, 0, 5, 90),
            Firebolt => AbilityDef::strike(self, 2, 5, 120).inflicting(StatusKind::Burning, 2),
            FrostLance => AbilityDef::strike(self, 3, 4, 100).inflicting(StatusKind::Slowed, 2),
            VenomBite => AbilityDef::strike(self, 2, 1, 80).inflicting(StatusKind::Poisoned, 3),
            ShadowLeap => {
                AbilityDef::on_self(self, 4, AbilityEffect::Reposition { max_distance: 4 })
                    .inflicting(StatusKind::Cloaked, 2)
            }
            SummonMinions => AbilityDef::on_self(self, 4, AbilityEffect::Summon { count: 2 }),
            BindingChains => {
                AbilityDef::strike(self, 3, 4, 50).inflicting(StatusKind::Rooted, 2)
            }
            Blink => AbilityDef::on_self(self, 3, AbilityEffect::Reposition { max_distance: 5 }),
            ArcaneBolt => AbilityDef::strike(self, 0, 6, 110),
            TerrorRoar => AbilityDef::strike(self, 5, ARENA_WIDE_RANGE, 60)
                .with_aoe(2)
                .inflicting(StatusKind::Feared, 2),
            TailSweep => AbilityDef::strike(self, 2, 1, 120)
                .with_aoe(1)
                .inflicting(StatusKind::Sundered, 2),
            ShieldWall => AbilityDef::on_self(self, 4, AbilityEffect::Buff)
                .inflicting(StatusKind::Shielded, 2),
        }
    }
}

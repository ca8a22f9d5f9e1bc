//! Turning actions into state mutations.

use super::outbox::{BattleEvent, DamageSource, Outbox};
use super::targeting::{is_valid_target, reposition_destination, summon_tiles};
use super::{BattleAction, CommandError, PlayerCommand};
use crate::combat::roll_strike;
use crate::dice::{BattleRng, DiceEngine, DiceNotation};
use crate::pathing::reachable_tiles;
use crate::state::{
    AbilityEffect, AbilityKind, BattleEntity, BattleOutcome, BattlePhase, BattleState, Behavior,
    Classification, CombatantSnapshot, EntityFlags, EntityId, HazardKind, Position, Side,
};

/// Healing potion strength.
const POTION_HEAL: DiceNotation = DiceNotation::new(2, 4, 2);
/// Base difficulty of a flee attempt.
const FLEE_BASE_DC: i32 = 10;
/// Added to the flee difficulty per adjacent hostile.
const FLEE_DC_PER_ADJACENT: i32 = 2;

/// A command that passed validation.
enum Plan {
    Act(BattleAction),
    DrinkPotion,
    Flee,
}

fn plan_command(state: &BattleState, command: &PlayerCommand) -> Result<Plan, CommandError> {
    if state.outcome.is_terminal() || state.phase == BattlePhase::Pending {
        return Err(CommandError::NoActiveBattle);
    }
    if state.phase != BattlePhase::PlayerTurn {
        return Err(CommandError::NotPlayerTurn);
    }

    let player = &state.player;
    match *command {
        PlayerCommand::Move { to } => {
            let reach = reachable_tiles(state, player.position, player.move_range(), player.id);
            if !reach.contains(to) {
                return Err(CommandError::Unreachable(to));
            }
            Ok(Plan::Act(BattleAction::Move { to }))
        }
        PlayerCommand::Attack { target } => {
            check_target(state, AbilityKind::BasicAttack, target)?;
            Ok(Plan::Act(BattleAction::Attack { target }))
        }
        PlayerCommand::UseAbility { ability, target } => {
            if !player.knows(ability) {
                return Err(CommandError::AbilityNotKnown(ability));
            }
            let cooldown = player.cooldown(ability);
            if cooldown > 0 {
                return Err(CommandError::AbilityOnCooldown(ability, cooldown));
            }
            let def = ability.def();
            if def.self_target {
                if !is_valid_target(state, player, player.position, ability, player) {
                    return Err(CommandError::AbilityUnavailable(ability));
                }
                let at = match def.effect {
                    AbilityEffect::Reposition { max_distance } => {
                        reposition_destination(state, player, max_distance)
                    }
                    _ => None,
                };
                return Ok(Plan::Act(BattleAction::UseAbility {
                    ability,
                    target: player.id,
                    at,
                }));
            }
            let target = match target {
                Some(target) => target,
                None => super::valid_targets(state, player, ability)
                    .first()
                    .copied()
                    .ok_or(CommandError::AbilityUnavailable(ability))?,
            };
            check_target(state, ability, target)?;
            Ok(Plan::Act(BattleAction::UseAbility {
                ability,
                target,
                at: None,
            }))
        }
        PlayerCommand::UseItem => {
            if state.potions == 0 {
                return Err(CommandError::NoItemsLeft);
            }
            Ok(Plan::DrinkPotion)
        }
        PlayerCommand::Wait => Ok(Plan::Act(BattleAction::Wait)),
        PlayerCommand::Flee => {
            if state.is_boss {
                return Err(CommandError::FleeForbidden);
            }
            Ok(Plan::Flee)
        }
    }
}

fn check_target(
    state: &BattleState,
    ability: AbilityKind,
    target_id: EntityId,
) -> Result<(), CommandError> {
    let player = &state.player;
    if !player.knows(ability) {
        return Err(CommandError::AbilityNotKnown(ability));
    }
    let target = state
        .entity(target_id)
        .filter(|t| t.is_hostile_to(player))
        .ok_or(CommandError::UnknownTarget(target_id))?;
    if !target.is_alive() {
        return Err(CommandError::TargetDefeated(target_id));
    }
    if !is_valid_target(state, player, player.position, ability, target) {
        return Err(CommandError::OutOfRange {
            target: target_id,
            distance: player.position.manhattan(target.position),
            range: if target.statuses.is_hidden() {
                1
            } else {
                ability.def().range
            },
        });
    }
    Ok(())
}

/// Checks `command` against the current state without mutating it.
pub fn validate_command(state: &BattleState, command: &PlayerCommand) -> Result<(), CommandError> {
    plan_command(state, command).map(|_| ())
}

/// Validates and executes the player's command.
///
/// On error nothing in `state` has changed. Phase transitions are left to
/// the caller.
pub fn execute_player_command(
    state: &mut BattleState,
    command: &PlayerCommand,
    out: &mut Outbox,
) -> Result<(), CommandError> {
    let plan = plan_command(state, command)?;

    let noise = &state.config.noise;
    state.noise += match command {
        PlayerCommand::Attack { .. } => noise.attack,
        PlayerCommand::UseAbility { .. } => noise.ability,
        PlayerCommand::UseItem => noise.item,
        PlayerCommand::Move { .. } => noise.movement,
        PlayerCommand::Wait | PlayerCommand::Flee => 0,
    };

    if state.player.statuses.prevents_action() {
        out.narrate(format!("{} is frozen solid and cannot act.", state.player.stats.name));
        return Ok(());
    }

    match plan {
        Plan::Act(action) => execute_action(state, EntityId::PLAYER, action, out),
        Plan::DrinkPotion => {
            state.potions -= 1;
            let luck = state.player.stats.luck;
            let heal = DiceEngine::new(&mut state.rng).roll_notation(POTION_HEAL, luck).sum;
            let restored = state.player.heal(heal);
            out.narrate(format!(
                "{} drinks a potion and recovers {restored} hp ({} left).",
                state.player.stats.name, state.potions
            ));
        }
        Plan::Flee => {
            let adjacent = state.adjacent_hostiles(state.player.position, Side::Player) as i32;
            let dc = FLEE_BASE_DC + FLEE_DC_PER_ADJACENT * adjacent;
            let modifier = state.player.stats.initiative_bonus;
            let luck = state.player.stats.luck;
            let save = DiceEngine::new(&mut state.rng).make_saving_throw(modifier, dc, luck);
            if save.success {
                state.outcome = BattleOutcome::Flee;
                out.narrate(format!(
                    "{} escapes the fight ({} vs DC {dc}).",
                    state.player.stats.name, save.total
                ));
            } else {
                out.narrate(format!(
                    "{} fails to break away ({} vs DC {dc}).",
                    state.player.stats.name, save.total
                ));
            }
        }
    }
    Ok(())
}

/// Executes `action` for `actor`.
///
/// Actions that are no longer legal when executed (the target died, the
/// path closed) degrade to waiting rather than failing.
pub fn execute_action(state: &mut BattleState, actor: EntityId, action: BattleAction, out: &mut Outbox) {
    let Some(entity) = state.entity(actor).filter(|e| e.is_alive()).cloned() else {
        return;
    };

    match action {
        BattleAction::Move { to } => move_entity(state, &entity, to, out),
        BattleAction::Attack { target } => {
            use_ability(state, &entity, AbilityKind::BasicAttack, target, None, out)
        }
        BattleAction::UseAbility {
            ability,
            target,
            at,
        } => use_ability(state, &entity, ability, target, at, out),
        BattleAction::Wait => {}
    }
}

fn move_entity(state: &mut BattleState, entity: &BattleEntity, to: Position, out: &mut Outbox) {
    let reach = reachable_tiles(state, entity.position, entity.move_range(), entity.id);
    let Some(path) = reach.path_to(to).filter(|p| !p.is_empty()) else {
        out.narrate(format!("{} cannot reach {to} and holds position.", entity.stats.name));
        return;
    };

    let from = entity.position;
    let mut last = from;
    for step in path {
        if let Some(mover) = state.entity_mut(entity.id) {
            mover.position = step;
        }
        last = step;
        if let Some(hazard) = state.arena.grid.get(step).and_then(|t| t.hazard()) {
            apply_hazard(state, entity.id, hazard, out);
            if !state.entity(entity.id).is_some_and(BattleEntity::is_alive) {
                break;
            }
        }
    }

    if entity.side == Side::Enemy {
        out.emit(BattleEvent::EnemyMoved {
            entity: entity.id,
            from,
            to: last,
        });
    }
}

fn use_ability(
    state: &mut BattleState,
    entity: &BattleEntity,
    ability: AbilityKind,
    target: EntityId,
    at: Option<Position>,
    out: &mut Outbox,
) {
    let legal = entity.is_ready(ability)
        && state
            .entity(target)
            .is_some_and(|t| is_valid_target(state, entity, entity.position, ability, t));
    if !legal {
        out.narrate(format!("{}'s {ability} finds no target.", entity.stats.name));
        return;
    }

    if let Some(user) = state.entity_mut(entity.id) {
        user.trigger_cooldown(ability);
    }

    let def = ability.def();
    match def.effect {
        AbilityEffect::Strike => strike(state, entity, ability, target, out),
        AbilityEffect::Reposition { max_distance } => {
            let landing = at
                .filter(|&p| {
                    p.manhattan(entity.position) <= max_distance
                        && state.is_free(p, Some(entity.id))
                })
                .or_else(|| reposition_destination(state, entity, max_distance));
            if let Some(landing) = landing {
                if let Some(user) = state.entity_mut(entity.id) {
                    user.position = landing;
                }
                out.narrate(format!("{} uses {ability} and reappears at {landing}.", entity.stats.name));
                if entity.side == Side::Enemy {
                    out.emit(BattleEvent::EnemyMoved {
                        entity: entity.id,
                        from: entity.position,
                        to: landing,
                    });
                }
            }
            apply_self_status(state, entity.id, ability);
        }
        AbilityEffect::Summon { count } => summon(state, entity, count, out),
        AbilityEffect::Buff => {
            apply_self_status(state, entity.id, ability);
            out.narrate(format!("{} uses {ability}.", entity.stats.name));
        }
    }
}

fn apply_self_status(state: &mut BattleState, id: EntityId, ability: AbilityKind) {
    if let (Some((status, duration)), Some(user)) = (ability.def().status, state.entity_mut(id)) {
        user.statuses.apply(status, duration);
    }
}

fn strike(
    state: &mut BattleState,
    attacker: &BattleEntity,
    ability: AbilityKind,
    primary: EntityId,
    out: &mut Outbox,
) {
    let def = ability.def();
    let Some(center) = state.entity(primary).map(|t| t.position) else {
        return;
    };

    let mut splash: Vec<&BattleEntity> = state
        .hostiles_of(attacker)
        .filter(|t| t.id != primary && t.position.manhattan(center) <= def.aoe_radius)
        .collect();
    splash.sort_by_key(|t| (t.position.raster_key(), t.id));
    let targets: Vec<EntityId> = std::iter::once(primary)
        .chain(splash.into_iter().map(|t| t.id))
        .collect();

    let proficiency = state.config.proficiency_bonus;
    for target_id in targets {
        let Some(target) = state.entity(target_id).filter(|t| t.is_alive()).cloned() else {
            continue;
        };
        let roll = roll_strike(
            &mut DiceEngine::new(&mut state.rng),
            attacker,
            &target,
            &def,
            proficiency,
        );

        if attacker.side == Side::Enemy {
            out.emit(BattleEvent::EnemyAttacked {
                entity: attacker.id,
                target: target_id,
                ability,
                hit: roll.attack.is_hit,
                critical: roll.attack.is_critical,
            });
        }

        if !roll.attack.is_hit {
            let reason = if roll.attack.is_fumble { "fumbles" } else { "misses" };
            out.narrate(format!(
                "{} {reason} {} with {ability}.",
                attacker.stats.name, target.stats.name
            ));
            continue;
        }

        let crit = if roll.attack.is_critical { " Critical!" } else { "" };
        out.narrate(format!(
            "{} hits {} with {ability} for {}.{crit}",
            attacker.stats.name, target.stats.name, roll.damage
        ));
        let defeated = apply_damage(
            state,
            target_id,
            roll.damage,
            DamageSource::Ability {
                attacker: attacker.id,
                ability,
            },
            out,
        );
        if !defeated
            && let Some((status, duration)) = def.status
            && let Some(victim) = state.entity_mut(target_id)
        {
            victim.statuses.apply(status, duration);
        }
    }
}

fn summon(state: &mut BattleState, summoner: &BattleEntity, count: u32, out: &mut Outbox) {
    let room = state
        .config
        .summon_cap
        .saturating_sub(state.minion_count(summoner.id));
    let tiles = summon_tiles(state, summoner, count.min(room));

    for tile in &tiles {
        let id = state.allocate_id();
        let stats = minion_stats(summoner);
        let initiative = roll_initiative(&mut state.rng, &stats);
        let mut minion = BattleEntity::new(id, summoner.side, *tile, summoner.world_position, stats);
        minion.initiative = initiative;
        minion.summoner = Some(summoner.id);
        state.enemies.push(minion);
    }

    if !tiles.is_empty() {
        state.recompute_turn_order();
    }
    out.narrate(format!(
        "{} summons {} minion(s).",
        summoner.stats.name,
        tiles.len()
    ));
}

fn minion_stats(summoner: &BattleEntity) -> CombatantSnapshot {
    let hp = (summoner.max_hp() / 6).max(4);
    CombatantSnapshot {
        name: format!("{}'s thrall", summoner.stats.name),
        hp,
        max_hp: hp,
        attack: (summoner.stats.attack / 2).max(1),
        defense: 1,
        speed: 4,
        luck: 0,
        initiative_bonus: 0,
        damage: DiceNotation::new(1, 4, 0),
        abilities: [AbilityKind::BasicAttack].into_iter().collect(),
        flags: EntityFlags::SUMMONED,
        classification: Classification::new(Behavior::Aggressive),
    }
}

/// d20 plus the combatant's initiative bonus.
pub(crate) fn roll_initiative(rng: &mut BattleRng, stats: &CombatantSnapshot) -> i32 {
    rng.roll_die(20) as i32 + stats.initiative_bonus
}

/// Deals `amount` to `target`. Returns true when this defeats it.
pub(crate) fn apply_damage(
    state: &mut BattleState,
    target: EntityId,
    amount: i32,
    source: DamageSource,
    out: &mut Outbox,
) -> bool {
    let Some(entity) = state.entity_mut(target).filter(|e| e.is_alive()) else {
        return false;
    };
    let dealt = entity.take_damage(amount);
    let remaining_hp = entity.hp();
    let name = entity.stats.name.clone();
    let world_id = entity.world_id;

    out.emit(BattleEvent::DamageApplied {
        target,
        amount: dealt,
        remaining_hp,
        source,
    });
    if remaining_hp > 0 {
        return false;
    }

    out.emit(BattleEvent::EntityDefeated {
        entity: target,
        world_id,
    });
    out.narrate(format!("{name} is defeated."));
    state.recompute_turn_order();
    true
}

/// Applies a hazard's on-step effect to `id` once.
pub(crate) fn apply_hazard(state: &mut BattleState, id: EntityId, hazard: HazardKind, out: &mut Outbox) {
    let effect = hazard.on_step();
    if let Some(name) = state.entity(id).map(|e| e.stats.name.clone()) {
        out.narrate(format!("{name} steps into {hazard}."));
    }
    if effect.damage > 0 && apply_damage(state, id, effect.damage, DamageSource::Hazard(hazard), out) {
        return;
    }
    if let (Some((status, duration)), Some(entity)) = (effect.status, state.entity_mut(id)) {
        entity.statuses.apply(status, duration);
    }
}

//! Reveal resolution for both sides of the board.
//!
//! Both entry points take an [`Encounter`] by value and hand back the updated
//! one, so the caller always replaces its state with the result before the
//! next phase reads it.

use alloc::collections::VecDeque;
use alloc::format;
use alloc::vec::Vec;
use hashbrown::HashSet;
use rand::Rng;

use crate::*;

/// Damage a player-revealed hazard deals before modifiers.
pub const HAZARD_BASE_DAMAGE: u32 = 1;
/// Damage an opponent-revealed hazard deals to the player.
pub const OPPONENT_HAZARD_DAMAGE: u32 = 1;
pub const TRAP_DAMAGE: u32 = 1;
pub const CURRENCY_UNIT: u32 = 1;
/// Streak length at which combo echoes kick in.
pub const COMBO_STREAK: u32 = 2;

#[derive(Clone, Debug, PartialEq)]
pub struct RevealOutcome {
    pub encounter: Encounter,
    pub revealed: CellCount,
    pub events: Vec<GameEvent>,
}

impl RevealOutcome {
    fn unchanged(encounter: Encounter) -> Self {
        Self {
            encounter,
            revealed: 0,
            events: Vec::new(),
        }
    }

    pub const fn has_update(&self) -> bool {
        self.revealed > 0
    }
}

/// Bonus damage from the best combo echo, zero below [`COMBO_STREAK`].
pub fn combo_bonus(streak: u32, echoes: &ActiveEchoes) -> u32 {
    if streak < COMBO_STREAK {
        return 0;
    }
    echoes
        .get(EchoFamily::ChainReaction)
        .or_else(|| echoes.get(EchoFamily::ComboStrike))
        .map_or(0, Echo::strength)
}

/// Hazard damage for the current streak, consuming a crit charge if one is
/// available. Returns `(damage, crit)`.
pub fn hazard_damage(player: &mut Player, echoes: &ActiveEchoes) -> (u32, bool) {
    let mut damage = HAZARD_BASE_DAMAGE
        .saturating_sub(player.blunt_reduction())
        .max(1);
    damage += combo_bonus(player.hazard_streak, echoes);

    let crit = player.crit_charges > 0;
    if crit {
        player.crit_charges -= 1;
        damage *= 2;
    }
    (damage, crit)
}

fn chance<R: Rng + ?Sized>(rng: &mut R, percent: u32) -> bool {
    match percent {
        0 => false,
        100.. => true,
        p => rng.random_ratio(p, 100),
    }
}

/// Breadth-first player reveal starting at `origin`.
///
/// Revealed or out-of-bounds origins are ignored: nothing changes and no
/// player action is counted.
pub fn resolve_player_reveal<R: Rng + ?Sized>(
    encounter: Encounter,
    origin: Coord2,
    echoes: &ActiveEchoes,
    rng: &mut R,
) -> RevealOutcome {
    if encounter.board.get(origin).is_none_or(|cell| cell.revealed) {
        log::trace!("Ignoring player reveal at {:?}", origin);
        return RevealOutcome::unchanged(encounter);
    }

    let Encounter {
        mut board,
        mut player,
        mut opponent,
        mut stats,
    } = encounter;
    let mut events = Vec::new();
    let mut revealed: CellCount = 0;

    let budget = u32::from(player.cascade_budget());
    let disarm_chance = echoes.strength(EchoFamily::Defuser);
    let mut visited: HashSet<Coord2> = HashSet::new();
    let mut to_visit: VecDeque<(Coord2, u32)> = VecDeque::from([(origin, 0)]);

    while let Some((coords, depth)) = to_visit.pop_front() {
        if !board.contains(coords) || !visited.insert(coords) || board[coords].revealed {
            continue;
        }

        let cell = &mut board[coords];
        cell.revealed = true;
        cell.mark = None;
        let kind = cell.kind;
        let counts = cell.counts;
        revealed += 1;
        events.push(GameEvent::new(EventKind::CellRevealed, format!("Revealed {:?}", kind)).at(coords));

        match kind {
            CellKind::Hazard => {
                player.hazard_streak += 1;
                stats.hazards_by_player += 1;
                let (damage, crit) = hazard_damage(&mut player, echoes);
                let report = opponent.vitals.take_damage(damage);
                stats.damage_dealt += report.total();
                let text = if crit {
                    format!("Critical hit for {} ({} absorbed by armor)", damage, report.absorbed)
                } else {
                    format!("Hit for {} ({} absorbed by armor)", damage, report.absorbed)
                };
                events.push(GameEvent::new(EventKind::HazardStruck, text).at(coords));

                if let Some(thorns) = player.thorns() {
                    let recoil = player.vitals.take_damage(thorns);
                    stats.damage_taken += recoil.total();
                    events.push(
                        GameEvent::new(EventKind::ThornsRecoil, format!("Thorns recoil for {}", thorns))
                            .at(coords),
                    );
                }
            }
            CellKind::Currency => {
                player.hazard_streak = 0;
                let mut amount = CURRENCY_UNIT;
                if chance(rng, echoes.strength(EchoFamily::GoldenTouch)) {
                    amount *= 2;
                }
                player.gold += amount;
                stats.currency_collected += amount;
                events.push(
                    GameEvent::new(EventKind::CurrencyCollected, format!("Collected {} gold", amount))
                        .at(coords),
                );
            }
            CellKind::Trap => {
                player.hazard_streak = 0;
                if player.trap_wards > 0 {
                    player.trap_wards -= 1;
                    events.push(GameEvent::new(EventKind::TrapWarded, "Trap ignored").at(coords));
                } else {
                    let report = player.vitals.take_damage(TRAP_DAMAGE);
                    stats.traps_sprung += 1;
                    stats.damage_taken += report.total();
                    player.crit_charges += echoes.strength(EchoFamily::Adrenaline);
                    events.push(
                        GameEvent::new(EventKind::TrapSprung, format!("Trap dealt {}", TRAP_DAMAGE))
                            .at(coords),
                    );
                }
            }
            CellKind::Clue | CellKind::Empty => {
                player.hazard_streak = 0;
                let can_spread = budget == 0 || depth < budget;
                if counts.total != 0 || !can_spread {
                    continue;
                }
                log::trace!("Cascading from {:?} at depth {}", coords, depth);

                let neighbors: Vec<Coord2> = board.iter_neighbors(coords).collect();
                for pos in neighbors {
                    let neighbor = &mut board[pos];
                    if neighbor.revealed || visited.contains(&pos) {
                        continue;
                    }
                    if neighbor.kind != CellKind::Hazard {
                        to_visit.push_back((pos, depth + 1));
                        continue;
                    }
                    // a hazard gets exactly one disarm roll per action
                    visited.insert(pos);
                    if chance(rng, disarm_chance) {
                        neighbor.kind = CellKind::Clue;
                        neighbor.revealed = true;
                        neighbor.mark = None;
                        neighbor.flags.insert(CellFlags::DISARMED);
                        revealed += 1;
                        stats.hazards_disarmed += 1;
                        events.push(GameEvent::new(EventKind::HazardDisarmed, "Hazard disarmed").at(pos));
                    }
                }
            }
        }
    }

    board.recompute_clues();

    opponent.add_charge(opponent.charge_model.per_player_action);
    for effect in player.tick_statuses() {
        events.push(GameEvent::new(EventKind::StatusExpired, format!("{:?} wore off", effect)));
    }
    board.apply_overlays(Overlays::for_state(echoes, &player));
    stats.cells_revealed += u32::from(revealed);

    log::debug!(
        "Player reveal at {:?} opened {} cells, opponent hp {} armor {}",
        origin,
        revealed,
        opponent.vitals.hp,
        opponent.armor()
    );

    RevealOutcome {
        encounter: Encounter {
            board,
            player,
            opponent,
            stats,
        },
        revealed,
        events,
    }
}

/// Single-cell opponent reveal, effects pointed the other way and no cascade.
pub fn resolve_opponent_reveal(
    encounter: Encounter,
    target: Coord2,
    echoes: &ActiveEchoes,
) -> RevealOutcome {
    if encounter.board.get(target).is_none_or(|cell| cell.revealed) {
        log::trace!("Ignoring opponent reveal at {:?}", target);
        return RevealOutcome::unchanged(encounter);
    }

    let Encounter {
        mut board,
        mut player,
        mut opponent,
        mut stats,
    } = encounter;
    let mut events = Vec::new();

    let cell = &mut board[target];
    cell.revealed = true;
    cell.mark = None;
    let kind = cell.kind;
    events.push(
        GameEvent::new(EventKind::CellRevealed, format!("Opponent revealed {:?}", kind)).at(target),
    );

    match kind {
        CellKind::Hazard => {
            let report = player.vitals.take_damage(OPPONENT_HAZARD_DAMAGE);
            stats.hazards_by_opponent += 1;
            stats.damage_taken += report.total();
            events.push(
                GameEvent::new(
                    EventKind::PlayerStruck,
                    format!(
                        "Opponent hit for {} ({} absorbed by shield)",
                        OPPONENT_HAZARD_DAMAGE, report.absorbed
                    ),
                )
                .at(target),
            );
        }
        CellKind::Currency => {
            let gained = opponent.charge_model.per_currency;
            opponent.add_charge(gained);
            events.push(
                GameEvent::new(EventKind::ChargeGained, format!("Opponent gained {} charge", gained))
                    .at(target),
            );
        }
        CellKind::Trap => {
            let report = opponent.vitals.take_damage(TRAP_DAMAGE);
            stats.damage_dealt += report.total();
            events.push(
                GameEvent::new(
                    EventKind::OpponentTrapped,
                    format!("Opponent trapped for {}", TRAP_DAMAGE),
                )
                .at(target),
            );
        }
        CellKind::Clue | CellKind::Empty => {}
    }

    board.apply_overlays(Overlays::for_state(echoes, &player));
    stats.cells_revealed += 1;

    RevealOutcome {
        encounter: Encounter {
            board,
            player,
            opponent,
            stats,
        },
        revealed: 1,
        events,
    }
}

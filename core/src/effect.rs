use alloc::format;
use alloc::vec::Vec;
use rand::Rng;
use rand::seq::index;

use crate::*;

/// Upper bound on how much of a fury's damage echoes can cancel.
pub const MAX_MITIGATION_PERCENT: u32 = 90;

pub fn mitigation_percent(echoes: &ActiveEchoes) -> u32 {
    echoes
        .strength(EchoFamily::Bulwark)
        .min(MAX_MITIGATION_PERCENT)
}

/// Scales `base` by the remaining share after mitigation, rounding half up.
/// Any non-zero base still lands for at least 1.
pub fn mitigate(base: u32, echoes: &ActiveEchoes) -> u32 {
    if base == 0 {
        return 0;
    }
    let kept = 100 - mitigation_percent(echoes);
    (base.saturating_mul(kept).saturating_add(50) / 100).max(1)
}

#[derive(Clone, Debug, PartialEq)]
pub struct AbilityOutcome {
    pub encounter: Encounter,
    pub events: Vec<GameEvent>,
    /// Echo to switch off and for how many player actions. Echoes belong to
    /// the run rather than the encounter, so the caller applies this.
    pub suppressed: Option<(EchoId, u8)>,
}

/// Applies `fury` on behalf of the opponent. Charge bookkeeping stays with the
/// caller.
pub fn apply_fury<R: Rng + ?Sized>(
    fury: &Fury,
    encounter: Encounter,
    echoes: &ActiveEchoes,
    rng: &mut R,
) -> AbilityOutcome {
    let Encounter {
        mut board,
        mut player,
        mut opponent,
        mut stats,
    } = encounter;
    let mut events = Vec::from([GameEvent::new(
        EventKind::FuryUnleashed,
        format!("Opponent unleashed {}", fury.name),
    )]);
    let mut suppressed = None;

    match fury.effect {
        FuryEffect::Strike { damage } => {
            let damage = mitigate(damage, echoes);
            let report = player.vitals.take_damage(damage);
            stats.damage_taken += report.total();
            events.push(GameEvent::new(
                EventKind::PlayerStruck,
                format!("{} hit for {} ({} absorbed by shield)", fury.name, damage, report.absorbed),
            ));
        }
        FuryEffect::Drain { gold } => {
            let drained = mitigate(gold, echoes).min(player.gold);
            player.gold -= drained;
            events.push(GameEvent::new(
                EventKind::GoldDrained,
                format!("{} gold drained", drained),
            ));
        }
        FuryEffect::Seed { hazards } => {
            let candidates: Vec<Coord2> = board
                .iter_coords()
                .filter(|&coords| {
                    let cell = &board[coords];
                    cell.is_hidden() && cell.kind == CellKind::Clue
                })
                .collect();
            let amount = usize::from(hazards).min(candidates.len());
            for picked in index::sample(rng, candidates.len(), amount) {
                let coords = candidates[picked];
                board[coords].kind = CellKind::Hazard;
                events.push(GameEvent::new(EventKind::HazardsSeeded, "Hazard seeded").at(coords));
            }
            if amount > 0 {
                board.recompute_clues();
            }
            log::debug!("Seeded {} of {} hazards", amount, hazards);
        }
        FuryEffect::Shroud { clicks } => {
            player.apply_status(StatusEffect::Shroud, clicks);
            events.push(GameEvent::new(
                EventKind::StatusApplied,
                format!("Clues shrouded for {} actions", clicks),
            ));
        }
        FuryEffect::Blunt { reduction, clicks } => {
            player.apply_status(StatusEffect::Blunt { reduction }, clicks);
            events.push(GameEvent::new(
                EventKind::StatusApplied,
                format!("Hits blunted by {} for {} actions", reduction, clicks),
            ));
        }
        FuryEffect::Thorns { damage, clicks } => {
            player.apply_status(StatusEffect::Thorns { damage }, clicks);
            events.push(GameEvent::new(
                EventKind::StatusApplied,
                format!("Thorns of {} for {} actions", damage, clicks),
            ));
        }
        FuryEffect::Mire { depth, clicks } => {
            player.apply_status(StatusEffect::Mire { depth }, clicks);
            events.push(GameEvent::new(
                EventKind::StatusApplied,
                format!("Cascades limited to depth {} for {} actions", depth.max(1), clicks),
            ));
        }
        FuryEffect::Mend { hp } => {
            let restored = opponent.vitals.heal(hp);
            events.push(GameEvent::new(
                EventKind::OpponentHealed,
                format!("Opponent healed {}", restored),
            ));
        }
        FuryEffect::Harden { armor } => {
            opponent.vitals.guard = opponent.vitals.guard.saturating_add(armor);
            events.push(GameEvent::new(
                EventKind::ArmorGained,
                format!("Opponent gained {} armor", armor),
            ));
        }
        FuryEffect::Silence { clicks } => match echoes.strongest() {
            Some(target) if clicks > 0 => {
                suppressed = Some((target.id, clicks));
                let name = target.def().map_or("echo", |def| def.name);
                events.push(GameEvent::new(
                    EventKind::EchoSilenced,
                    format!("{} silenced for {} actions", name, clicks),
                ));
            }
            _ => log::debug!("{} found nothing to silence", fury.name),
        },
    }

    board.apply_overlays(Overlays::for_state(echoes, &player));

    AbilityOutcome {
        encounter: Encounter {
            board,
            player,
            opponent,
            stats,
        },
        events,
        suppressed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn encounter(layout: &str) -> Encounter {
        Encounter::new(
            Board::from_layout(layout).unwrap(),
            Player::new(10),
            Opponent::new(10, 0, ChargeModel::default()),
        )
    }

    fn unleash(id: u8, start: Encounter, echoes: &ActiveEchoes) -> AbilityOutcome {
        let fury = Fury::by_id(FuryId(id)).unwrap();
        apply_fury(fury, start, echoes, &mut SmallRng::seed_from_u64(7))
    }

    fn strike(damage: u32) -> Fury {
        Fury {
            effect: FuryEffect::Strike { damage },
            ..FURIES[0]
        }
    }

    #[test]
    fn bulwark_halves_strike_rounding_up() {
        let echoes = ActiveEchoes::from_keys(["bulwark-2"]).unwrap();

        let outcome = apply_fury(&strike(5), encounter(".."), &echoes, &mut SmallRng::seed_from_u64(0));

        assert_eq!(outcome.encounter.player.vitals.hp, 7);
        assert_eq!(outcome.encounter.stats.damage_taken, 3);
    }

    #[test]
    fn mitigation_is_capped_and_floored() {
        let mut echoes = ActiveEchoes::from_keys(["bulwark-2"]).unwrap();
        for _ in 0..4 {
            echoes.install(Echo::from_key("bulwark-2").unwrap());
        }
        assert_eq!(echoes.strength(EchoFamily::Bulwark), 150);
        assert_eq!(mitigation_percent(&echoes), MAX_MITIGATION_PERCENT);

        assert_eq!(mitigate(5, &echoes), 1);
        assert_eq!(mitigate(20, &echoes), 2);
        assert_eq!(mitigate(0, &echoes), 0);
        assert_eq!(mitigate(4, &ActiveEchoes::new()), 4);
    }

    #[test]
    fn strike_hits_shield_first() {
        let mut start = encounter("..");
        start.player.vitals.guard = 1;

        let outcome = unleash(0, start, &ActiveEchoes::new());

        assert_eq!(outcome.encounter.player.vitals.guard, 0);
        assert_eq!(outcome.encounter.player.vitals.hp, 9);
        assert_eq!(outcome.events[0].kind, EventKind::FuryUnleashed);
        assert_eq!(outcome.events[1].kind, EventKind::PlayerStruck);
    }

    #[test]
    fn drain_cannot_go_negative() {
        let mut start = encounter("..");
        start.player.gold = 2;

        let outcome = unleash(1, start, &ActiveEchoes::new());

        assert_eq!(outcome.encounter.player.gold, 0);
    }

    #[test]
    fn seed_turns_hidden_clues_into_counted_hazards() {
        let mut start = encounter("...\n...\n...");
        start.board[(1, 1)].revealed = true;

        let outcome = unleash(2, start, &ActiveEchoes::new());
        let board = &outcome.encounter.board;

        assert_eq!(board.count_kind(CellKind::Hazard), 2);
        assert_eq!(board[(1, 1)].kind, CellKind::Clue);
        for coords in board.iter_coords() {
            if board[coords].kind == CellKind::Clue {
                assert_eq!(board[coords].counts, board.tally_neighbors(coords));
            }
        }
        assert_eq!(board[(1, 1)].counts.hazards, 2);
    }

    #[test]
    fn seed_on_exhausted_board_is_harmless() {
        let mut start = encounter("H.");
        start.board[(0, 1)].revealed = true;

        let outcome = unleash(2, start.clone(), &ActiveEchoes::new());

        assert_eq!(outcome.encounter.board, start.board);
    }

    #[test]
    fn shroud_hides_revealed_clues() {
        let mut start = encounter("H..");
        start.board[(0, 1)].revealed = true;

        let outcome = unleash(3, start, &ActiveEchoes::new());

        assert!(outcome.encounter.player.is_shrouded());
        let cell = &outcome.encounter.board[(0, 1)];
        assert!(cell.flags.contains(CellFlags::CLUE_HIDDEN));
        assert_eq!(cell.visible_counts(), None);
    }

    #[test]
    fn statuses_land_on_player() {
        let blunt = unleash(4, encounter(".."), &ActiveEchoes::new());
        assert_eq!(blunt.encounter.player.blunt_reduction(), 1);

        let thorns = unleash(5, encounter(".."), &ActiveEchoes::new());
        assert_eq!(thorns.encounter.player.thorns(), Some(1));

        let mire = unleash(9, encounter(".."), &ActiveEchoes::new());
        assert_eq!(mire.encounter.player.cascade_budget(), 1);
    }

    #[test]
    fn mend_and_harden_buff_opponent() {
        let mut start = encounter("..");
        start.opponent.vitals.take_damage(5);

        let mended = unleash(6, start.clone(), &ActiveEchoes::new());
        assert_eq!(mended.encounter.opponent.vitals.hp, 8);

        let hardened = unleash(7, start, &ActiveEchoes::new());
        assert_eq!(hardened.encounter.opponent.armor(), 2);
    }

    #[test]
    fn silence_targets_strongest_echo() {
        let echoes = ActiveEchoes::from_keys(["golden-touch-1", "bulwark-2"]).unwrap();

        let outcome = unleash(8, encounter(".."), &echoes);

        let bulwark = Echo::from_key("bulwark-2").unwrap();
        assert_eq!(outcome.suppressed, Some((bulwark.id, 4)));
        assert_eq!(outcome.events.last().unwrap().kind, EventKind::EchoSilenced);

        let nothing = unleash(8, encounter(".."), &ActiveEchoes::new());
        assert_eq!(nothing.suppressed, None);
    }
}

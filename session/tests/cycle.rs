use std::sync::{Arc, Mutex};
use std::time::Duration;

use furysweep_core::{
    ActiveEchoes, Board, BoardView, ChargeModel, Coord2, EventKind, Fury, FuryId, LevelOutcome,
    Opponent, OpponentProfile, PlayerPublic, level_config,
};
use furysweep_session::{
    CycleOutcome, EnemyDecisionPolicy, HeuristicPolicy, PhaseStateMachine, RandomPolicy,
    SessionConfig, SessionError, SessionHooks, TurnPhase,
};

#[derive(Clone, Default)]
struct Recorder {
    phases: Arc<Mutex<Vec<TurnPhase>>>,
    furies: Arc<Mutex<Vec<(TurnPhase, FuryId)>>>,
    outcomes: Arc<Mutex<Vec<LevelOutcome>>>,
}

impl SessionHooks for Recorder {
    fn on_phase(&mut self, phase: TurnPhase) {
        self.phases.lock().unwrap().push(phase);
    }

    fn on_fury(&mut self, phase: TurnPhase, fury: &Fury) {
        self.furies.lock().unwrap().push((phase, fury.id));
    }

    fn on_outcome(&mut self, outcome: LevelOutcome) {
        self.outcomes.lock().unwrap().push(outcome);
    }
}

/// Every clue borders currency, so no reveal cascades.
const STRIPES: &str = "
    $$$$$$$$$$
    ..........
    $$$$$$$$$$
    ..........
    $$$$$$$$$$
    ..........
";

fn first_hidden(machine: &PhaseStateMachine) -> Coord2 {
    machine.view().hidden_cells()[0]
}

fn sturdy(loadout: &[u8], threshold: u32) -> OpponentProfile {
    OpponentProfile {
        hp: 50,
        armor: 0,
        charge: ChargeModel {
            threshold,
            ..ChargeModel::default()
        },
        loadout: loadout.iter().copied().map(FuryId).collect(),
    }
}

#[tokio::test(start_paused = true)]
async fn phase_trace_follows_fixed_cycle() {
    let recorder = Recorder::default();
    let mut machine = PhaseStateMachine::new(
        SessionConfig::default(),
        Arc::new(RandomPolicy::new(1)),
        ActiveEchoes::new(),
    )
    .with_hooks(recorder.clone());
    machine
        .begin_with_board(Board::from_layout(STRIPES).unwrap(), &sturdy(&[6], 3))
        .unwrap();

    let cycles = 4;
    for _ in 0..cycles {
        let outcome = machine.play(first_hidden(&machine)).await;
        assert_eq!(outcome, Ok(CycleOutcome::Completed));
    }

    let mut expected = vec![TurnPhase::PlayerTurn];
    for _ in 0..cycles {
        expected.extend([
            TurnPhase::PlayerActionResolving,
            TurnPhase::OpponentThinking,
            TurnPhase::OpponentActionPendingReveal,
            TurnPhase::OpponentActionResolving,
            TurnPhase::PlayerTurn,
        ]);
    }
    assert_eq!(machine.trace(), expected.as_slice());
    assert_eq!(*recorder.phases.lock().unwrap(), expected);

    let furies = recorder.furies.lock().unwrap();
    assert!(!furies.is_empty());
    assert!(
        furies
            .iter()
            .all(|(phase, _)| *phase == TurnPhase::OpponentActionResolving)
    );
}

#[tokio::test(start_paused = true)]
async fn loadout_rotates_after_intro_script() {
    let recorder = Recorder::default();
    let mut machine = PhaseStateMachine::new(
        SessionConfig::default(),
        Arc::new(RandomPolicy::new(2)),
        ActiveEchoes::new(),
    )
    .with_hooks(recorder.clone())
    .with_intro_script([FuryId(7)]);
    machine
        .begin_with_board(Board::from_layout(STRIPES).unwrap(), &sturdy(&[6, 3], 1))
        .unwrap();

    for _ in 0..4 {
        machine.play(first_hidden(&machine)).await.unwrap();
    }

    let used: Vec<FuryId> = recorder
        .furies
        .lock()
        .unwrap()
        .iter()
        .map(|&(_, id)| id)
        .collect();
    assert_eq!(used, [FuryId(7), FuryId(6), FuryId(3), FuryId(6)]);
    assert_eq!(machine.encounter().opponent.charge, 0);
}

#[tokio::test(start_paused = true)]
async fn cancelling_the_clock_interrupts_the_cycle() {
    let mut machine = PhaseStateMachine::new(
        SessionConfig::default(),
        Arc::new(RandomPolicy::new(3)),
        ActiveEchoes::new(),
    );
    machine
        .begin_with_board(Board::from_layout(STRIPES).unwrap(), &sturdy(&[], 5))
        .unwrap();

    let clock = machine.clock();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        clock.cancel();
    });

    assert_eq!(machine.play((1, 0)).await, Ok(CycleOutcome::Interrupted));
    assert_eq!(machine.phase(), TurnPhase::PlayerActionResolving);
    assert_eq!(
        machine.play((1, 1)).await,
        Err(SessionError::WrongPhase {
            expected: TurnPhase::PlayerTurn,
            actual: TurnPhase::PlayerActionResolving,
        })
    );
}

struct Sleepy;

#[async_trait::async_trait]
impl EnemyDecisionPolicy for Sleepy {
    async fn decide(&self, _: &BoardView, _: &Opponent, _: &PlayerPublic) -> Option<Coord2> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Some((0, 0))
    }
}

#[tokio::test(start_paused = true)]
async fn slow_policy_times_out_with_hints() {
    let config = SessionConfig {
        decision_ceiling_ms: 1000,
        hint_interval_ms: 300,
        ..SessionConfig::default()
    };
    let mut machine = PhaseStateMachine::new(config, Arc::new(Sleepy), ActiveEchoes::new());
    machine
        .begin_with_board(Board::from_layout(STRIPES).unwrap(), &sturdy(&[], 5))
        .unwrap();

    assert_eq!(machine.play((1, 0)).await, Ok(CycleOutcome::Completed));

    let events = machine.drain_events();
    let hints = events
        .iter()
        .filter(|event| event.kind == EventKind::Considering)
        .count();
    assert_eq!(hints, 3);
    assert!(
        events
            .iter()
            .any(|event| event.kind == EventKind::DecisionFallback)
    );
}

#[tokio::test(start_paused = true)]
async fn heuristic_session_finishes_first_level() {
    let config = SessionConfig {
        seed: 11,
        ..SessionConfig::default()
    };
    let recorder = Recorder::default();
    let mut machine = PhaseStateMachine::new(
        config,
        Arc::new(HeuristicPolicy::new(11)),
        ActiveEchoes::from_keys(["combo-strike-1", "vitality-1"]).unwrap(),
    )
    .with_hooks(recorder.clone());
    let level = level_config(1).unwrap();
    machine.begin_level(&level).unwrap();
    let autopilot = HeuristicPolicy::new(12);

    let mut outcome = None;
    for _ in 0..500 {
        let view = machine.view();
        let opponent = machine.encounter().opponent.clone();
        let player = machine.encounter().player.public();
        let Some(target) = autopilot.decide(&view, &opponent, &player).await else {
            break;
        };
        if let CycleOutcome::LevelEnded(ended) = machine.play(target).await.unwrap() {
            outcome = Some(ended);
            break;
        }
    }

    let outcome = outcome.expect("level should end");
    assert_eq!(machine.outcome(), Some(outcome));
    assert_eq!(machine.phase(), TurnPhase::terminal(outcome));
    assert_eq!(*recorder.outcomes.lock().unwrap(), [outcome]);
    let snapshot = machine.snapshot();
    assert_eq!(snapshot.get("run.level"), Some(1));
    assert_eq!(snapshot.get("run.floor"), Some(1));
    assert_eq!(snapshot.get("player.max_hp"), Some(13));
}

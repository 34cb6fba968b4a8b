//! Integration tests for the training session lifecycle

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use gridlearn::{
    Error,
    app::{App, HyperParameters, SessionConfig},
    gridworld::GridConfig,
    pipeline::{
        EpisodeReport, HISTORY_CAPACITY, JsonlObserver, MetricsObserver, SchedulerState,
        StartOutcome, TrainingMode, TrainingSession, convergence_threshold,
    },
    ports::Observer,
    types::{Action, StrategyKind},
};
use tempfile::tempdir;

fn seeded(config: SessionConfig, seed: u64) -> TrainingSession {
    App::for_testing()
        .with_default_seed(seed)
        .build()
        .create_session(config)
        .unwrap()
}

fn drive(session: &mut TrainingSession) -> SchedulerState {
    loop {
        let state = session.tick().unwrap();
        if state != SchedulerState::Running {
            return state;
        }
    }
}

/// Forwards events to a shared metrics observer so the test can read them back
struct SharedMetrics(Arc<Mutex<MetricsObserver>>);

impl Observer for SharedMetrics {
    fn on_episode_end(&mut self, episode: usize, report: &EpisodeReport) -> gridlearn::Result<()> {
        self.0.lock().unwrap().on_episode_end(episode, report)
    }

    fn on_converged(&mut self, kind: StrategyKind, episode: usize) -> gridlearn::Result<()> {
        self.0.lock().unwrap().on_converged(kind, episode)
    }

    fn on_tick_end(&mut self, total: usize, exploration_rate: f64) -> gridlearn::Result<()> {
        self.0.lock().unwrap().on_tick_end(total, exploration_rate)
    }
}

struct EventLog(Arc<Mutex<Vec<String>>>);

impl Observer for EventLog {
    fn on_training_start(&mut self, target: usize) -> gridlearn::Result<()> {
        self.0.lock().unwrap().push(format!("start:{target}"));
        Ok(())
    }

    fn on_training_end(&mut self, total: usize) -> gridlearn::Result<()> {
        self.0.lock().unwrap().push(format!("end:{total}"));
        Ok(())
    }
}

#[test]
fn classic_grid_q_learning_converges() {
    let metrics = Arc::new(Mutex::new(MetricsObserver::new()));
    let mut session = seeded(SessionConfig::default(), 42)
        .with_observer(Box::new(SharedMetrics(Arc::clone(&metrics))));

    assert_eq!(
        session.start().unwrap(),
        StartOutcome::Started { target: 10_000 }
    );
    assert_eq!(drive(&mut session), SchedulerState::Completed);
    assert_eq!(session.total_episodes(), 10_000);
    assert_eq!(session.exploration_rate(), 0.01);

    let q = session.stats(StrategyKind::QLearning);
    assert!(q.win_rate > 0.9, "Q-learning win rate {}", q.win_rate);
    assert!(q.average_reward > convergence_threshold(4));
    assert!(q.converged_at.is_some());

    let naive = session.stats(StrategyKind::Naive);
    assert!(naive.win_rate < q.win_rate - 0.3);
    assert_eq!(session.converged_at(StrategyKind::Naive), None);

    let metrics = metrics.lock().unwrap();
    assert_eq!(metrics.episodes(), 10_000);
    assert!(metrics.ticks() >= 1);
    assert!(
        metrics
            .converged()
            .iter()
            .all(|(kind, _)| *kind != StrategyKind::Naive)
    );

    let rollout = session.greedy_rollout(StrategyKind::QLearning).unwrap();
    assert!(rollout.reached_goal);
    assert_eq!(rollout.final_state, 15);
}

#[test]
fn win_rate_rises_as_exploration_decays() {
    for seed in 0..5 {
        let mut session = seeded(SessionConfig::default(), seed);
        for _ in 0..200 {
            session.run_episode().unwrap();
        }
        let early = session.history(StrategyKind::QLearning).win_rate();
        for _ in 200..3_000 {
            session.run_episode().unwrap();
        }
        let late = session.history(StrategyKind::QLearning).win_rate();
        assert!(early < late, "seed {seed}: early {early} late {late}");

        // Next to the goal, stepping into it beats stepping away.
        let table = session.table(StrategyKind::QLearning);
        assert!(table.get(14, Action::Right) > table.get(14, Action::Left));
        assert!(table.get(14, Action::Right) > table.get(14, Action::Up));
    }
}

#[test]
fn start_after_one_shot_completion_changes_nothing() {
    let mut session = seeded(SessionConfig::default(), 7);
    session.start().unwrap();
    drive(&mut session);
    let table = session.table(StrategyKind::Sarsa).clone();

    assert_eq!(session.start().unwrap(), StartOutcome::AlreadyComplete);
    assert_eq!(session.state(), SchedulerState::Completed);
    assert_eq!(session.tick().unwrap(), SchedulerState::Completed);
    assert_eq!(session.total_episodes(), 10_000);
    assert_eq!(session.table(StrategyKind::Sarsa), &table);
}

#[test]
fn pause_preserves_progress_and_resume_continues() {
    let config = SessionConfig::default()
        .with_mode(TrainingMode::Batch)
        .with_time_slice(Duration::ZERO);
    let mut session = seeded(config, 11);

    session.start().unwrap();
    session.tick().unwrap();
    session.pause().unwrap();
    let paused_at = session.total_episodes();
    let table = session.table(StrategyKind::QLearning).clone();
    assert!(paused_at >= 1 && paused_at < 200);

    assert_eq!(session.tick().unwrap(), SchedulerState::Paused);
    assert_eq!(session.total_episodes(), paused_at);
    assert_eq!(session.table(StrategyKind::QLearning), &table);

    session.resume().unwrap();
    assert_eq!(drive(&mut session), SchedulerState::Completed);
    assert_eq!(session.total_episodes(), 200);
}

#[test]
fn batch_mode_extends_target_per_start() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let config = SessionConfig::default()
        .with_mode(TrainingMode::Batch)
        .with_hyperparameters(HyperParameters::for_grid_size(4).with_episodes_per_batch(50));
    let mut session = seeded(config, 3).with_observer(Box::new(EventLog(Arc::clone(&log))));

    for expected in [50, 100, 150] {
        assert_eq!(
            session.start().unwrap(),
            StartOutcome::Started { target: expected }
        );
        drive(&mut session);
        assert_eq!(session.total_episodes(), expected);
    }

    let events = log.lock().unwrap().clone();
    assert_eq!(
        events,
        vec!["start:50", "end:50", "start:100", "end:100", "start:150", "end:150"]
    );
}

#[test]
fn resize_resets_everything_and_applies_tier_defaults() {
    let mut session = seeded(SessionConfig::default(), 5);
    for _ in 0..300 {
        session.run_episode().unwrap();
    }

    session.resize_grid(10).unwrap();
    assert_eq!(session.total_episodes(), 0);
    assert_eq!(session.exploration_rate(), 1.0);
    assert_eq!(session.state(), SchedulerState::Idle);
    assert!(session.grid().hazards().is_empty());
    assert_eq!(session.table(StrategyKind::QLearning).num_states(), 100);
    assert!(session.table(StrategyKind::QLearning).is_zero());
    assert!(session.history(StrategyKind::Sarsa).is_empty());

    let hp = session.hyperparameters();
    assert_eq!(hp.learning_rate, 0.15);
    assert_eq!(hp.discount_factor, 0.995);
    assert_eq!(hp.exploration_decay, 0.0001);
    assert_eq!(hp.min_exploration_rate, 0.05);
    assert_eq!(session.scheduler().max_episodes(), 20_000);
    assert_eq!(session.scheduler().episodes_per_batch(), 500);
    assert_eq!(session.max_steps(), 300);
}

#[test]
fn hazard_toggle_keeps_learned_values() {
    let mut session = seeded(SessionConfig::default(), 8);
    for _ in 0..100 {
        session.run_episode().unwrap();
    }
    let table = session.table(StrategyKind::QLearning).clone();

    session.toggle_hazard(5).unwrap();
    assert!(!session.grid().is_hazard(5));
    session.toggle_hazard(2).unwrap();
    assert!(session.grid().is_hazard(2));
    assert_eq!(session.table(StrategyKind::QLearning), &table);
    assert_eq!(session.total_episodes(), 100);

    assert!(matches!(
        session.toggle_hazard(15),
        Err(Error::HazardOnEndpoint { .. })
    ));
    session.clear_hazards().unwrap();
    assert!(session.grid().hazards().is_empty());
    session.restore_default_hazards().unwrap();
    assert_eq!(session.grid(), &GridConfig::default());
}

#[test]
fn history_is_bounded_and_convergence_is_sticky() {
    let mut session = seeded(SessionConfig::default(), 21);
    let mut first_marker = None;
    for _ in 0..4_000 {
        session.run_episode().unwrap();
        for kind in StrategyKind::ALL {
            assert!(session.history(kind).len() <= HISTORY_CAPACITY);
        }
        let marker = session.converged_at(StrategyKind::QLearning);
        if first_marker.is_none() {
            first_marker = marker;
        } else {
            assert_eq!(marker, first_marker);
        }
    }
    assert_eq!(session.history(StrategyKind::QLearning).len(), HISTORY_CAPACITY);
}

#[test]
fn seeded_sessions_are_reproducible() {
    let run = || {
        let mut session = seeded(SessionConfig::default(), 99);
        for _ in 0..500 {
            session.run_episode().unwrap();
        }
        // Inspection must not disturb the training sequence.
        session.policy(StrategyKind::Sarsa);
        for _ in 0..100 {
            session.run_episode().unwrap();
        }
        session.summary()
    };
    assert_eq!(run(), run());
}

#[test]
fn reset_restores_initial_state() {
    let config = SessionConfig::default().with_time_slice(Duration::ZERO);
    let mut session = seeded(config, 13);
    session.start().unwrap();
    session.tick().unwrap();
    session.pause().unwrap();

    session.reset();
    assert_eq!(session.state(), SchedulerState::Idle);
    assert_eq!(session.total_episodes(), 0);
    assert_eq!(session.exploration_rate(), 1.0);
    for kind in StrategyKind::ALL {
        assert!(session.table(kind).is_zero());
        assert_eq!(session.stats(kind).wins, 0);
        assert_eq!(session.converged_at(kind), None);
    }
    assert_eq!(
        session.start().unwrap(),
        StartOutcome::Started { target: 10_000 }
    );
}

#[test]
fn jsonl_observer_writes_one_line_per_episode() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("episodes.jsonl");
    let config = SessionConfig::default()
        .with_mode(TrainingMode::Batch)
        .with_hyperparameters(HyperParameters::for_grid_size(4).with_episodes_per_batch(25));
    let mut session =
        seeded(config, 17).with_observer(Box::new(JsonlObserver::new(&path).unwrap()));

    session.start().unwrap();
    drive(&mut session);

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = contents.lines().collect();
    assert_eq!(lines.len(), 25);
    let last: serde_json::Value = serde_json::from_str(lines[24]).unwrap();
    assert_eq!(last["episode"], 25);
    assert!(last["q_learning"]["steps"].as_u64().unwrap() >= 1);
}

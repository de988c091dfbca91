use std::time::Duration;

use slime_defence_core::{Command, EnemyId, Event, Outcome};
use slime_defence_system_wave_scheduler::{
    WaveDefinition, WavePhase, WaveSchedule, WaveScheduler,
};
use slime_defence_world::{self as world, World};

fn tick(scheduler: &mut WaveScheduler, millis: u64) -> Vec<Command> {
    let mut commands = Vec::new();
    scheduler.handle(
        &[Event::TimeAdvanced {
            dt: Duration::from_millis(millis),
        }],
        &mut commands,
    );
    commands
}

fn feed(scheduler: &mut WaveScheduler, events: &[Event]) -> Vec<Command> {
    let mut commands = Vec::new();
    scheduler.handle(events, &mut commands);
    commands
}

fn spawn_command() -> Command {
    Command::SpawnEnemy {
        archetype: "slime".to_owned(),
        path: None,
    }
}

fn spawned(id: u32) -> Event {
    Event::EnemySpawned {
        enemy: EnemyId::new(id),
        archetype: "slime".to_owned(),
        path: "main".to_owned(),
    }
}

#[test]
fn first_spawn_follows_the_start_delay() {
    let mut scheduler = WaveScheduler::new(WaveSchedule::new(vec![WaveDefinition::new(
        "slime", 2, 1.0, 2.0,
    )]));

    let started = feed(&mut scheduler, &[Event::GameStarted]);
    assert_eq!(started, vec![Command::SetCurrentWave { wave: 1 }]);
    assert_eq!(scheduler.phase(), WavePhase::WaitingToStart);

    assert!(tick(&mut scheduler, 1000).is_empty());
    assert!(tick(&mut scheduler, 1000).is_empty());
    assert_eq!(scheduler.phase(), WavePhase::Spawning);

    assert_eq!(tick(&mut scheduler, 500), vec![spawn_command()]);
    assert!(tick(&mut scheduler, 500).is_empty());
    assert_eq!(tick(&mut scheduler, 500), vec![spawn_command()]);
    assert!(tick(&mut scheduler, 5000).is_empty(), "wave exhausted");
    assert_eq!(scheduler.remaining_to_spawn(), 0);
    assert_eq!(scheduler.alive(), 2);
}

#[test]
fn at_most_one_spawn_per_tick() {
    let mut scheduler = WaveScheduler::new(WaveSchedule::new(vec![WaveDefinition::new(
        "slime", 5, 0.5, 0.0,
    )]));
    let _ = feed(&mut scheduler, &[Event::GameStarted]);
    assert!(tick(&mut scheduler, 16).is_empty());

    assert_eq!(tick(&mut scheduler, 10_000), vec![spawn_command()]);
    assert_eq!(tick(&mut scheduler, 10_000), vec![spawn_command()]);
    assert_eq!(scheduler.remaining_to_spawn(), 3);
}

#[test]
fn finite_schedule_ends_in_victory_once_enemies_are_gone() {
    let mut scheduler = WaveScheduler::new(WaveSchedule::new(vec![WaveDefinition::new(
        "slime", 2, 1.0, 0.0,
    )]));
    let _ = feed(&mut scheduler, &[Event::GameStarted]);
    let _ = tick(&mut scheduler, 100);
    assert_eq!(tick(&mut scheduler, 100), vec![spawn_command()]);
    let _ = feed(&mut scheduler, &[spawned(0)]);
    assert_eq!(tick(&mut scheduler, 1000), vec![spawn_command()]);
    let _ = feed(&mut scheduler, &[spawned(1)]);
    assert_eq!(scheduler.status(), "Wave 1: 2 alive, 0 to spawn");

    let _ = feed(
        &mut scheduler,
        &[
            Event::EnemyDied {
                enemy: EnemyId::new(0),
            },
            Event::EnemyDespawned {
                enemy: EnemyId::new(1),
            },
        ],
    );
    assert_eq!(scheduler.phase(), WavePhase::WaveCleared);

    assert_eq!(
        tick(&mut scheduler, 16),
        vec![Command::EndGame {
            outcome: Outcome::Victory
        }]
    );
    assert!(!scheduler.is_active());
}

#[test]
fn each_enemy_is_counted_once() {
    let mut scheduler = WaveScheduler::new(WaveSchedule::new(vec![WaveDefinition::new(
        "slime", 2, 0.5, 0.0,
    )]));
    let _ = feed(&mut scheduler, &[Event::GameStarted]);
    let _ = tick(&mut scheduler, 100);
    let _ = tick(&mut scheduler, 100);
    let _ = feed(&mut scheduler, &[spawned(4)]);

    let enemy = EnemyId::new(4);
    let _ = feed(
        &mut scheduler,
        &[
            Event::EnemyReachedEnd { enemy },
            Event::EnemyDied { enemy },
            Event::EnemyDespawned { enemy },
            Event::EnemyDied {
                enemy: EnemyId::new(99),
            },
        ],
    );
    assert_eq!(scheduler.alive(), 1);
}

#[test]
fn repeating_schedule_grows_past_the_end() {
    let mut schedule =
        WaveSchedule::new(vec![WaveDefinition::new("orc", 2, 1.0, 0.0)]).repeating();
    schedule.growth = 2.0;
    let mut scheduler = WaveScheduler::new(schedule);

    let _ = feed(&mut scheduler, &[Event::GameStarted]);
    assert_eq!(scheduler.alive(), 2);

    scheduler.skip();
    assert_eq!(scheduler.status(), "Wave 1: 0 alive, 0 to spawn");
    let _ = tick(&mut scheduler, 16);
    assert_eq!(scheduler.phase(), WavePhase::WaveCleared);
    assert_eq!(
        tick(&mut scheduler, 16),
        vec![Command::SetCurrentWave { wave: 2 }]
    );
    assert_eq!(scheduler.remaining_to_spawn(), 4);

    scheduler.skip();
    let _ = tick(&mut scheduler, 16);
    let _ = tick(&mut scheduler, 16);
    assert_eq!(scheduler.wave_number(), 3);
    assert_eq!(scheduler.remaining_to_spawn(), 8);
}

#[test]
fn empty_schedule_wins_immediately() {
    let mut scheduler = WaveScheduler::new(WaveSchedule::new(Vec::new()));
    let commands = feed(&mut scheduler, &[Event::GameStarted]);
    assert_eq!(
        commands,
        vec![Command::EndGame {
            outcome: Outcome::Victory
        }]
    );
}

#[test]
fn stop_resets_progress() {
    let mut scheduler = WaveScheduler::default();
    assert_eq!(scheduler.status(), "No wave started");

    let _ = feed(&mut scheduler, &[Event::GameStarted]);
    assert_eq!(scheduler.status(), "Wave 1: 5 alive, 5 to spawn");

    let _ = feed(
        &mut scheduler,
        &[Event::GameEnded {
            outcome: Outcome::Defeat,
        }],
    );
    assert_eq!(scheduler.status(), "No wave started");
    assert!(tick(&mut scheduler, 10_000).is_empty());
}

#[test]
fn rejected_spawns_leave_the_wave() {
    let mut world = World::new();
    let mut scheduler = WaveScheduler::new(WaveSchedule::new(vec![WaveDefinition::new(
        "slime", 1, 1.0, 0.0,
    )]));

    let mut events = Vec::new();
    world::apply(&mut world, Command::StartGame, &mut events);
    let _ = feed(&mut scheduler, &events);
    let _ = tick(&mut scheduler, 100);
    let commands = tick(&mut scheduler, 100);
    assert_eq!(commands, vec![spawn_command()]);

    events.clear();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }
    assert!(matches!(events[0], Event::SpawnRejected { .. }));
    let _ = feed(&mut scheduler, &events);
    assert_eq!(scheduler.alive(), 0);
    assert_eq!(scheduler.phase(), WavePhase::WaveCleared);

    assert_eq!(
        tick(&mut scheduler, 100),
        vec![Command::EndGame {
            outcome: Outcome::Victory
        }]
    );
}

use glam::Vec2;
use slime_defence_core::{Command, EnemyId, Event, TowerId, TowerKind};
use slime_defence_system_tower_targeting::TowerTargeting;
use slime_defence_world::{self as world, query, World};

struct Harness {
    world: World,
    targeting: TowerTargeting,
    events: Vec<Event>,
}

impl Harness {
    fn new() -> Self {
        let mut harness = Self {
            world: World::new(),
            targeting: TowerTargeting::new(),
            events: Vec::new(),
        };
        harness.run(Command::ConfigurePath {
            name: "main".to_owned(),
            waypoints: vec![Vec2::new(0.0, 0.0), Vec2::new(2000.0, 0.0)],
        });
        harness.run(Command::StartGame);
        harness
    }

    /// Applies the command and feeds every resulting event back until quiescent.
    fn run(&mut self, command: Command) {
        let mut pending = vec![command];
        while !pending.is_empty() {
            let mut generated = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut generated);
            }
            self.targeting.handle(&generated, &mut pending);
            self.events.extend(generated);
            self.assert_targets_in_range();
        }
    }

    fn spawn(&mut self) -> EnemyId {
        self.events.clear();
        self.run(Command::SpawnEnemy {
            archetype: "slime".to_owned(),
            path: None,
        });
        self.events
            .iter()
            .find_map(|event| match event {
                Event::EnemySpawned { enemy, .. } => Some(*enemy),
                _ => None,
            })
            .expect("spawn succeeds")
    }

    fn assert_targets_in_range(&self) {
        for tower in query::tower_view(&self.world).iter() {
            if let Some(target) = tower.target {
                assert!(
                    query::enemies_in_range(&self.world, tower.id).contains(&target),
                    "tower {:?} targets {:?} outside its range",
                    tower.id,
                    target
                );
            }
        }
    }
}

#[test]
fn towers_target_first_arrival_and_fall_back_in_arrival_order() {
    let mut harness = Harness::new();
    harness.run(Command::PlaceTower {
        kind: TowerKind::Basic,
        position: Vec2::new(500.0, 0.0),
        range: Some(100.0),
    });
    let tower = TowerId::new(0);

    let first = harness.spawn();
    harness.run(Command::AdvanceEnemy {
        enemy: first,
        distance: 450.0,
    });
    assert_eq!(query::tower_target(&harness.world, tower), Some(first));

    let second = harness.spawn();
    let third = harness.spawn();
    harness.run(Command::AdvanceEnemy {
        enemy: third,
        distance: 420.0,
    });
    harness.run(Command::AdvanceEnemy {
        enemy: second,
        distance: 430.0,
    });
    assert_eq!(query::tower_target(&harness.world, tower), Some(first));

    harness.run(Command::AdvanceEnemy {
        enemy: first,
        distance: 200.0,
    });
    assert_eq!(
        query::tower_target(&harness.world, tower),
        Some(third),
        "earliest remaining arrival becomes the target"
    );

    harness.run(Command::DamageEnemy {
        enemy: third,
        amount: 100,
    });
    assert_eq!(query::tower_target(&harness.world, tower), Some(second));

    harness.run(Command::AdvanceEnemy {
        enemy: second,
        distance: 500.0,
    });
    assert_eq!(query::tower_target(&harness.world, tower), None);
}

#[test]
fn target_changes_are_published_with_null_on_loss() {
    let mut harness = Harness::new();
    harness.run(Command::PlaceTower {
        kind: TowerKind::Basic,
        position: Vec2::new(0.0, 50.0),
        range: None,
    });
    let tower = TowerId::new(0);

    let enemy = harness.spawn();
    assert!(harness.events.contains(&Event::TowerTargetChanged {
        tower,
        target: Some(enemy),
    }));

    harness.events.clear();
    harness.run(Command::DamageEnemy { enemy, amount: 10 });
    let changes: Vec<_> = harness
        .events
        .iter()
        .filter(|event| matches!(event, Event::TowerTargetChanged { .. }))
        .cloned()
        .collect();
    assert_eq!(
        changes,
        vec![Event::TowerTargetChanged {
            tower,
            target: None
        }]
    );
}

#[test]
fn placing_a_tower_over_enemies_acquires_a_target() {
    let mut harness = Harness::new();
    let first = harness.spawn();
    let _second = harness.spawn();

    harness.run(Command::PlaceTower {
        kind: TowerKind::Basic,
        position: Vec2::new(10.0, 10.0),
        range: None,
    });

    let tower = TowerId::new(0);
    assert_eq!(query::tower_target(&harness.world, tower), Some(first));
    assert_eq!(harness.targeting.in_range(tower).len(), 2);
}

#[test]
fn removing_a_tower_stops_tracking() {
    let mut harness = Harness::new();
    harness.run(Command::PlaceTower {
        kind: TowerKind::Basic,
        position: Vec2::ZERO,
        range: None,
    });
    let tower = TowerId::new(0);
    let _enemy = harness.spawn();

    harness.run(Command::RemoveTower { tower });
    assert!(query::tower_view(&harness.world).iter().next().is_none());
    assert_eq!(harness.targeting.target(tower), None);
}

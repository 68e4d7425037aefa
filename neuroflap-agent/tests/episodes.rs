use neuroflap::rng::seeded_rng;
use neuroflap_agent::state::{Obstacle, Position};
use neuroflap_agent::{AgentConfig, AgentController, GameState};

use std::num::NonZeroUsize;

fn controller_with(size: usize, seed: u64) -> AgentController {
    let mut config = AgentConfig::default();
    config.population.size = NonZeroUsize::new(size).unwrap();
    AgentController::with_rng(config, seeded_rng(seed)).unwrap()
}

fn gap_at(x: f32, gap_center: f32) -> Vec<Obstacle> {
    vec![
        Obstacle {
            position: Position::new(x, gap_center - 250.0),
            is_top: true,
            height: 300.0,
            width: 60.0,
        },
        Obstacle {
            position: Position::new(x, gap_center + 250.0),
            is_top: false,
            height: 300.0,
            width: 60.0,
        },
    ]
}

/// A minimal side-scroller: gravity, jumps, and obstacle
/// pairs sliding left, one every 250 units.
struct Game {
    y: f32,
    velocity: f32,
    obstacles: Vec<(f32, f32)>,
    score: u32,
    tick: u32,
}

impl Game {
    const ACTOR_X: f32 = 80.0;
    const HEIGHT: f32 = 800.0;

    fn new() -> Game {
        Game {
            y: 400.0,
            velocity: 0.0,
            obstacles: vec![(400.0, 400.0), (650.0, 300.0), (900.0, 500.0)],
            score: 0,
            tick: 0,
        }
    }

    fn state(&self) -> GameState {
        let obstacles = self
            .obstacles
            .iter()
            .flat_map(|&(x, gap)| gap_at(x, gap))
            .collect();
        GameState::new(Position::new(Self::ACTOR_X, self.y), obstacles).with_score(self.score)
    }

    /// Advances one tick. Returns `false` on collision.
    fn step(&mut self, jump: bool) -> bool {
        self.tick += 1;
        if jump {
            self.velocity = -8.0;
        }
        self.velocity += 0.5;
        self.y += self.velocity;

        for obstacle in &mut self.obstacles {
            obstacle.0 -= 3.0;
        }
        if self.obstacles[0].0 < Self::ACTOR_X - 60.0 {
            self.obstacles.remove(0);
            self.score += 1;
            let gap = 250.0 + (self.tick * 37 % 300) as f32;
            let x = self.obstacles.last().map_or(400.0, |o| o.0) + 250.0;
            self.obstacles.push((x, gap));
        }

        let hit_obstacle = self.obstacles.iter().any(|&(x, gap)| {
            (x - Self::ACTOR_X).abs() < 30.0 && (self.y - gap).abs() > 100.0
        });
        self.y > 0.0 && self.y < Self::HEIGHT && !hit_obstacle
    }
}

#[test]
fn frame_budget_forces_exactly_one_game_over() {
    let mut controller = controller_with(50, 1);
    let state = GameState::new(Position::new(80.0, 400.0), gap_at(300.0, 400.0));
    controller.start_next_genome();

    for frame in 1..=1000 {
        controller.process_game_state(&state);
        assert_eq!(controller.frame_count(), frame);
        assert_eq!(controller.genome_index(), 1);
    }

    assert!(!controller.process_game_state(&state));
    assert_eq!(controller.genome_index(), 2);
    assert_eq!(controller.frame_count(), 0);
    assert_eq!(controller.genomes_evaluated(), 2);

    controller.process_game_state(&state);
    assert_eq!(controller.frame_count(), 1);
    assert_eq!(controller.genome_index(), 2);
}

#[test]
fn zero_score_streak_resets_everything() {
    let mut controller = controller_with(50, 2);
    controller.start_next_genome();

    for _ in 0..9 {
        controller.handle_game_over();
    }
    assert_eq!(controller.generation(), 0);

    // The tenth scoreless genome forces a generation.
    controller.handle_game_over();
    assert_eq!(controller.generation(), 1);
    assert_eq!(controller.genome_index(), 1);

    for _ in 0..4 {
        controller.handle_game_over();
    }
    assert_eq!(controller.zero_score_streak(), 14);
    assert_eq!(controller.generation(), 1);

    controller.handle_game_over();
    assert_eq!(controller.generation(), 0);
    assert_eq!(controller.best_score(), 0);
    assert_eq!(controller.zero_score_streak(), 0);
    assert_eq!(controller.genome_index(), 0);
    assert!(!controller.is_evaluating());
    assert_eq!(controller.population().len(), 50);

    // Play resumes lazily.
    assert!(!controller.process_game_state(&GameState::default()));
    assert!(controller.is_evaluating());
}

#[test]
fn scoring_interrupts_the_streak() {
    let mut controller = controller_with(50, 3);
    controller.start_next_genome();
    for _ in 0..14 {
        controller.handle_game_over();
    }
    controller.update_score(1);
    controller.handle_game_over();
    assert_eq!(controller.zero_score_streak(), 0);
    assert_eq!(controller.best_score(), 1);

    for _ in 0..14 {
        controller.handle_game_over();
    }
    assert_eq!(controller.zero_score_streak(), 14);
    assert_eq!(controller.best_score(), 1);
    assert!(controller.is_evaluating());
}

#[test]
fn forced_evolution_starts_a_new_generation() {
    let mut controller = controller_with(10, 4);
    controller.start_next_genome();
    controller.handle_game_over();
    assert_eq!(controller.genome_index(), 2);

    controller.force_evolve_to_next_generation();
    assert_eq!(controller.generation(), 1);
    assert_eq!(controller.genome_index(), 1);
    assert_eq!(controller.population().len(), 10);
    assert_eq!(controller.frame_count(), 0);
}

#[test]
fn seeded_controllers_are_deterministic() {
    let play = |seed| {
        let mut controller = controller_with(10, seed);
        let mut decisions = vec![];
        for tick in 0..3_000u32 {
            let y = 200.0 + (tick * 13 % 400) as f32;
            let x = 500.0 - (tick % 200) as f32 * 2.0;
            let state =
                GameState::new(Position::new(80.0, y), gap_at(x, 400.0)).with_score(tick / 300);
            decisions.push(controller.process_game_state(&state));
            if tick % 150 == 149 {
                controller.handle_game_over();
            }
        }
        (decisions, controller.telemetry())
    };

    let (decisions1, telemetry1) = play(99);
    let (decisions2, telemetry2) = play(99);
    assert_eq!(decisions1, decisions2);
    assert_eq!(telemetry1, telemetry2);
    assert!(telemetry1.generation >= 1);
}

#[test]
fn long_run_keeps_population_valid() {
    let mut controller = controller_with(20, 5);
    let mut game = Game::new();

    for _ in 0..20_000 {
        let genome_before = controller.genomes_evaluated();
        let jump = controller.process_game_state(&game.state());
        if controller.genomes_evaluated() != genome_before {
            // A new episode started, possibly after a timeout.
            game = Game::new();
            continue;
        }
        if !game.step(jump) {
            controller.handle_game_over();
            game = Game::new();
        }
    }

    let telemetry = controller.telemetry();
    assert!(telemetry.frame_count <= 1000);
    assert_eq!(controller.population().len(), 20);
    for genome in controller.population().genomes() {
        genome.validate().unwrap();
        assert!(genome.fitness().is_finite());
    }
}

use bacteria_core::{
    ActionExecutor, BudgetClass, ChangerError, Direction, ModelError, Opcode, Params, Point,
    RandomSource, UnitRef, WorldStore, DEFAULT_CLON_MASS, MAX_ACTIONS, MAX_PSEUDO_ACTIONS,
};
use bacteria_system_changer::{Changer, Ledger};
use bacteria_world::World;

/// Replays a fixed list of draws, reduced modulo the requested bound.
struct Scripted {
    values: Vec<u32>,
    cursor: usize,
}

impl Scripted {
    fn new(values: Vec<u32>) -> Self {
        Self { values, cursor: 0 }
    }

    fn idle() -> Self {
        Self::new(vec![0])
    }
}

impl RandomSource for Scripted {
    fn random(&mut self, n: u32) -> u32 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        if n == 0 {
            0
        } else {
            value % n
        }
    }
}

struct Scenario {
    world: World,
    rng: Scripted,
    ledger: Ledger,
    program_len: usize,
    move_number: u64,
}

impl Scenario {
    fn new(program_len: usize) -> Self {
        Self {
            world: World::empty(5, 5, 2).expect("valid board"),
            rng: Scripted::idle(),
            ledger: Ledger::new(0),
            program_len,
            move_number: 0,
        }
    }

    fn with_rng(mut self, values: Vec<u32>) -> Self {
        self.rng = Scripted::new(values);
        self
    }

    fn spawn(&mut self, team: usize, x: i32, y: i32, direction: Direction, mass: i32) -> UnitRef {
        self.world
            .create_unit_at(Point::new(x, y), mass, direction, team, 0)
            .expect("free cell")
    }

    /// Runs one move for team 0 and restores budgets afterwards.
    fn play<T>(&mut self, action: impl FnOnce(&mut Changer<'_, World, Scripted>) -> T) -> T {
        let mut changer = Changer::new(
            &mut self.world,
            &mut self.rng,
            &mut self.ledger,
            0,
            self.move_number,
            self.program_len,
        )
        .expect("changer");
        let result = action(&mut changer);
        changer.clear_after_move().expect("clear");
        self.move_number += 1;
        result
    }

    fn position(&self, index: usize) -> Point {
        self.world.attributes_of(0, index).expect("alive").position
    }

    fn mass(&self, index: usize) -> i32 {
        self.world.attributes_of(0, index).expect("alive").mass
    }

    fn direction(&self, index: usize) -> Direction {
        self.world.attributes_of(0, index).expect("alive").direction
    }

    fn instruction(&self, index: usize) -> usize {
        self.world.attributes_of(0, index).expect("alive").instruction
    }
}

#[test]
fn go_at_edge_keeps_position_but_pays() {
    let mut scenario = Scenario::new(1);
    let _ = scenario.spawn(0, 2, 4, Direction::Forward, 5);

    let ended = scenario.play(|changer| {
        changer.go(&Params::none(), 0).expect("go");
        changer.end_of_move(0).expect("index")
    });

    assert!(ended);
    assert_eq!(scenario.position(0), Point::new(2, 4));
    assert_eq!(scenario.mass(0), 4);
}

#[test]
fn walking_into_the_edge_until_starvation() {
    let mut scenario = Scenario::new(1);
    let _ = scenario.spawn(0, 2, 2, Direction::Forward, 5);

    let expected = [
        (Point::new(2, 3), 4),
        (Point::new(2, 4), 3),
        (Point::new(2, 4), 2),
        (Point::new(2, 4), 1),
    ];
    for (position, mass) in expected {
        scenario.play(|changer| changer.go(&Params::none(), 0).expect("go"));
        assert_eq!(scenario.position(0), position);
        assert_eq!(scenario.mass(0), mass);
        assert_eq!(scenario.instruction(0), 0);
    }

    scenario.play(|changer| changer.go(&Params::none(), 0).expect("go"));
    assert_eq!(
        scenario.world.attributes_of(0, 0),
        Err(ModelError::DeadUnit { team: 0, index: 0 })
    );
    assert_eq!(scenario.world.unit_at(Point::new(2, 4)), Ok(None));
}

#[test]
fn go_into_occupied_cell_only_pays_mass() {
    let mut scenario = Scenario::new(1);
    let _ = scenario.spawn(0, 1, 1, Direction::Right, 5);
    let _ = scenario.spawn(1, 2, 1, Direction::Left, 5);

    scenario.play(|changer| changer.go(&Params::none(), 0).expect("go"));

    assert_eq!(scenario.position(0), Point::new(1, 1));
    assert_eq!(scenario.mass(0), 4);
}

#[test]
fn interrupted_eat_resumes_next_move() {
    let mut scenario = Scenario::new(2);
    let _ = scenario.spawn(0, 0, 0, Direction::Left, 5);
    let eat_three = Params::one(3);

    for expected_mass in [6, 7] {
        let ended = scenario.play(|changer| {
            changer.eat(&eat_three, 0).expect("eat");
            changer.end_of_move(0).expect("index")
        });
        assert!(ended, "one action per move exhausts the budget");
        assert_eq!(scenario.mass(0), expected_mass);
        assert_eq!(scenario.instruction(0), 0, "pointer waits for completion");
    }

    scenario.play(|changer| changer.eat(&eat_three, 0).expect("eat"));
    assert_eq!(scenario.mass(0), 8);
    assert_eq!(scenario.instruction(0), 1);
    assert_eq!(scenario.ledger.completed(0), Ok(0));
}

#[test]
fn completed_instruction_wraps_at_program_end() {
    let mut scenario = Scenario::new(2);
    let _ = scenario.spawn(0, 0, 0, Direction::Left, 5);
    scenario
        .world
        .set_instruction(0, 0, 1)
        .expect("alive unit");

    scenario.play(|changer| changer.eat(&Params::none(), 0).expect("eat"));

    assert_eq!(scenario.instruction(0), 0);
    assert_eq!(scenario.mass(0), 6);
}

#[test]
fn special_repeat_count_is_drawn_once_per_instruction() {
    // Draws 2 -> three repetitions; a redraw would yield a single repetition.
    let mut scenario = Scenario::new(3).with_rng(vec![2, 0, 0]);
    let _ = scenario.spawn(0, 0, 0, Direction::Left, 5);

    for _ in 0..2 {
        scenario.play(|changer| changer.eat(&Params::special(), 0).expect("eat"));
        assert_eq!(scenario.instruction(0), 0);
    }
    scenario.play(|changer| changer.eat(&Params::special(), 0).expect("eat"));

    assert_eq!(scenario.instruction(0), 1);
    assert_eq!(scenario.mass(0), 8);
    assert_eq!(scenario.rng.cursor, 1);
}

#[test]
fn invalid_repeat_count_leaves_state_untouched() {
    let mut scenario = Scenario::new(1);
    let _ = scenario.spawn(0, 0, 0, Direction::Left, 5);

    let errors = scenario.play(|changer| {
        vec![
            changer.eat(&Params::one(0), 0),
            changer.go(&Params::one(100), 0),
            changer.end_of_move(0).map(|_| ()),
        ]
    });

    assert_eq!(
        errors[0],
        Err(ChangerError::InvalidOperand {
            opcode: Opcode::Eat,
            value: 0
        })
    );
    assert_eq!(
        errors[1],
        Err(ChangerError::InvalidOperand {
            opcode: Opcode::Go,
            value: 100
        })
    );
    assert_eq!(errors[2], Ok(()));
    assert_eq!(scenario.mass(0), 5);
    assert_eq!(scenario.position(0), Point::new(0, 0));
    assert_eq!(
        scenario.ledger.remaining(BudgetClass::Action, 0),
        Ok(MAX_ACTIONS)
    );
}

#[test]
fn clon_into_occupied_cell_feeds_the_neighbour() {
    let mut scenario = Scenario::new(1);
    let _ = scenario.spawn(0, 2, 2, Direction::Right, 20);
    let _ = scenario.spawn(0, 3, 2, Direction::Left, 5);

    scenario.play(|changer| changer.clon(&Params::none(), 0).expect("clon"));

    assert_eq!(scenario.world.roster_len(0), Ok(2));
    assert_eq!(scenario.mass(0), 10);
    assert_eq!(scenario.mass(1), 5 + DEFAULT_CLON_MASS);
}

#[test]
fn clon_to_zero_mass_still_produces_offspring() {
    let mut scenario = Scenario::new(1).with_rng(vec![3]);
    let _ = scenario.spawn(0, 2, 2, Direction::Forward, 10);

    scenario.play(|changer| changer.clon(&Params::none(), 0).expect("clon"));

    assert_eq!(scenario.world.is_alive(0, 0), Ok(false));
    let offspring = scenario.world.attributes_of(0, 1).expect("offspring");
    assert_eq!(offspring.position, Point::new(2, 3));
    assert_eq!(offspring.mass, DEFAULT_CLON_MASS);
    assert_eq!(offspring.direction, Direction::Backward);
    assert_eq!(offspring.instruction, 0);
    assert_eq!(scenario.world.unit_at(Point::new(2, 2)), Ok(None));
}

#[test]
fn clon_to_zero_against_a_wall_leaves_offspring_in_place() {
    let mut scenario = Scenario::new(1);
    let _ = scenario.spawn(0, 2, 4, Direction::Forward, 10);

    scenario.play(|changer| changer.clon(&Params::none(), 0).expect("clon"));

    assert_eq!(scenario.world.is_alive(0, 0), Ok(false));
    assert_eq!(scenario.world.roster_len(0), Ok(2));
    assert_eq!(
        scenario.world.unit_at(Point::new(2, 4)),
        Ok(Some(UnitRef::new(0, 1)))
    );
    assert_eq!(scenario.mass(1), DEFAULT_CLON_MASS);
    assert_eq!(scenario.position(1), Point::new(2, 4));
}

#[test]
fn clon_below_zero_mass_dies_without_offspring() {
    let mut scenario = Scenario::new(1);
    let _ = scenario.spawn(0, 2, 2, Direction::Forward, 9);

    scenario.play(|changer| changer.clon(&Params::none(), 0).expect("clon"));

    assert_eq!(scenario.world.living_count(0), Ok(0));
    assert_eq!(scenario.world.roster_len(0), Ok(1));
    assert_eq!(scenario.world.unit_at(Point::new(2, 3)), Ok(None));
}

#[test]
fn clon_ignores_operands_and_offspring_joins_next_move() {
    let mut scenario = Scenario::new(2);
    let _ = scenario.spawn(0, 0, 0, Direction::Right, 25);

    let (covered, move_number, program_len) = scenario.play(|changer| {
        changer.clon(&Params::one(7), 0).expect("clon");
        (changer.roster_len(), changer.move_number(), changer.program_len())
    });

    assert_eq!(covered, 1, "offspring has no budget during its birth move");
    assert_eq!((move_number, program_len), (0, 2));
    assert_eq!(scenario.ledger.len(), 2);
    assert_eq!(scenario.instruction(0), 1);
    assert_eq!(scenario.mass(0), 15);
    assert_eq!(scenario.position(1), Point::new(1, 0));
    assert_eq!(
        scenario.ledger.remaining(BudgetClass::PseudoAction, 1),
        Ok(MAX_PSEUDO_ACTIONS)
    );
}

#[test]
fn strike_kills_a_weak_neighbour() {
    let mut scenario = Scenario::new(1);
    let _ = scenario.spawn(0, 2, 2, Direction::Right, 5);
    let _ = scenario.spawn(1, 3, 2, Direction::Left, 3);

    scenario.play(|changer| changer.str(&Params::none(), 0).expect("str"));

    assert_eq!(scenario.mass(0), 4);
    assert_eq!(scenario.world.is_alive(1, 0), Ok(false));
    assert_eq!(scenario.world.unit_at(Point::new(3, 2)), Ok(None));
}

#[test]
fn strike_wounds_a_strong_neighbour() {
    let mut scenario = Scenario::new(1);
    let _ = scenario.spawn(0, 2, 2, Direction::Backward, 5);
    let _ = scenario.spawn(1, 2, 1, Direction::Left, 10);

    scenario.play(|changer| changer.str(&Params::none(), 0).expect("str"));

    let victim = scenario
        .world
        .attributes_at(Point::new(2, 1))
        .expect("victim survives");
    assert_eq!(victim.mass, 7);
}

#[test]
fn strike_at_the_edge_hits_nobody() {
    let mut scenario = Scenario::new(1);
    let _ = scenario.spawn(0, 0, 0, Direction::Left, 5);

    scenario.play(|changer| changer.str(&Params::none(), 0).expect("str"));

    assert_eq!(scenario.mass(0), 4);
}

#[test]
fn rotations_share_one_move_through_pseudo_actions() {
    let mut scenario = Scenario::new(4);
    let _ = scenario.spawn(0, 0, 0, Direction::Forward, 5);

    let (pointers, ended) = scenario.play(|changer| {
        let mut pointers = Vec::new();
        changer.left(&Params::none(), 0).expect("left");
        pointers.push(changer.instruction(0).expect("alive"));
        changer.right(&Params::one(2), 0).expect("right");
        pointers.push(changer.instruction(0).expect("alive"));
        changer.back(&Params::none(), 0).expect("back");
        pointers.push(changer.instruction(0).expect("alive"));
        (pointers, changer.end_of_move(0).expect("index"))
    });

    assert_eq!(pointers, vec![1, 2, 3]);
    assert!(!ended);
    // Forward -> Left -> Forward -> Right -> Left.
    assert_eq!(scenario.direction(0), Direction::Left);
    assert_eq!(scenario.mass(0), 5);
}

#[test]
fn turn_faces_explicit_or_random_direction() {
    let mut scenario = Scenario::new(3).with_rng(vec![1, 3]);
    let _ = scenario.spawn(0, 0, 0, Direction::Left, 5);

    scenario.play(|changer| changer.turn(&Params::one(2), 0).expect("turn"));
    assert_eq!(scenario.direction(0), Direction::Right);

    scenario.play(|changer| changer.turn(&Params::special(), 0).expect("turn"));
    assert_eq!(scenario.direction(0), Direction::Forward);
    assert_eq!(scenario.instruction(0), 2);

    let invalid = scenario.play(|changer| changer.turn(&Params::one(4), 0));
    assert_eq!(
        invalid,
        Err(ChangerError::InvalidOperand {
            opcode: Opcode::Turn,
            value: 4
        })
    );
    assert_eq!(scenario.direction(0), Direction::Forward);
    assert_eq!(scenario.instruction(0), 2);

    scenario.play(|changer| changer.turn(&Params::none(), 0).expect("turn"));
    assert_eq!(scenario.direction(0), Direction::Backward);
    assert_eq!(scenario.instruction(0), 0);
}

#[test]
fn jumps_replace_the_sequential_successor() {
    let mut scenario = Scenario::new(4);
    let _ = scenario.spawn(0, 0, 0, Direction::Left, 5);

    let pointers = scenario.play(|changer| {
        let mut pointers = Vec::new();
        changer.j(&Params::one(3), 0).expect("j");
        pointers.push(changer.instruction(0).expect("alive"));
        changer.jg(&Params::two(4, 2), 0).expect("jg");
        pointers.push(changer.instruction(0).expect("alive"));
        changer.jl(&Params::two(4, 0), 0).expect("jl");
        pointers.push(changer.instruction(0).expect("alive"));
        changer.je(&Params::two(5, 0), 0).expect("je");
        pointers.push(changer.instruction(0).expect("alive"));
        pointers
    });

    // j 3; jg taken to 2; jl not taken so 2 -> 3; je taken to 0.
    assert_eq!(pointers, vec![3, 2, 3, 0]);
}

#[test]
fn jumps_validate_operands_before_spending() {
    let mut scenario = Scenario::new(2);
    let _ = scenario.spawn(0, 0, 0, Direction::Left, 5);

    let results = scenario.play(|changer| {
        let missing = changer.j(&Params::none(), 0);
        let outside = changer.je(&Params::two(5, 2), 0);
        let no_threshold = changer.jl(&Params::none(), 0);
        (missing, outside, no_threshold)
    });

    assert_eq!(
        results.0,
        Err(ChangerError::MissingOperand { opcode: Opcode::J })
    );
    assert_eq!(
        results.1,
        Err(ChangerError::InvalidOperand {
            opcode: Opcode::Je,
            value: 2
        })
    );
    assert_eq!(
        results.2,
        Err(ChangerError::MissingOperand { opcode: Opcode::Jl })
    );
    assert_eq!(scenario.instruction(0), 0);
}

#[test]
fn exhausted_pseudo_budget_ends_the_move() {
    let mut scenario = Scenario::new(1);
    let _ = scenario.spawn(0, 0, 0, Direction::Left, 5);

    let (ended, overflow) = scenario.play(|changer| {
        for _ in 0..MAX_PSEUDO_ACTIONS {
            changer.j(&Params::one(0), 0).expect("j");
        }
        let ended = changer.end_of_move(0).expect("index");
        (ended, changer.left(&Params::none(), 0))
    });

    assert!(ended);
    let error = overflow.expect_err("budget below zero");
    assert!(error.is_fatal());
    assert_eq!(error, ChangerError::TooManyCommands { team: 0, index: 0 });
}

#[test]
fn dead_units_are_never_re_entered() {
    let mut scenario = Scenario::new(1);
    let _ = scenario.spawn(0, 0, 0, Direction::Left, 1);
    scenario.play(|changer| changer.go(&Params::none(), 0).expect("go"));
    let spent = scenario.ledger.remaining(BudgetClass::Action, 0);

    let result = scenario.play(|changer| changer.eat(&Params::none(), 0));

    assert_eq!(
        result,
        Err(ChangerError::World(ModelError::DeadUnit { team: 0, index: 0 }))
    );
    assert_eq!(scenario.ledger.remaining(BudgetClass::Action, 0), spent);
    assert_eq!(scenario.ledger.completed(0), Ok(0));
}

/// Entities: Player, Enemy, Coin, Particle.
/// All positions are tile-cell coordinates, row 0 at the top.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn dx(self) -> i32 {
        match self {
            Facing::Left => -1,
            Facing::Right => 1,
        }
    }

    pub fn flipped(self) -> Facing {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

/// Vertical state of a walking entity.
/// Rising is driven by the jump impulse counter; Falling by gravity.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ActorState {
    OnGround,
    Rising,
    Falling,
}

/// Horizontal movement request (continuous while key held).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveDir {
    Left,
    Right,
}

/// Frame input: movement is level-triggered (held key), jump is
/// edge-triggered (fresh press). Both can fire in the same tick.
#[derive(Clone, Copy, Debug)]
pub struct FrameInput {
    pub movement: Option<MoveDir>,
    pub jump: bool,
}

impl FrameInput {
    #[allow(dead_code)]
    pub fn idle() -> Self {
        FrameInput { movement: None, jump: false }
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub x: usize,
    pub y: usize,
    pub facing: Facing,
    pub state: ActorState,
    pub alive: bool,
    /// Cells of upward travel left in the current jump.
    pub rise_remaining: u32,
    pub move_cooldown: u32,
}

impl Player {
    pub fn new(x: usize, y: usize) -> Self {
        Player {
            x,
            y,
            facing: Facing::Right,
            state: ActorState::OnGround,
            alive: true,
            rise_remaining: 0,
            move_cooldown: 0,
        }
    }
}

/// Number of enemy glyph/color variants the renderer knows about.
/// A skin is picked uniformly at random when the enemy spawns.
pub const ENEMY_SKIN_COUNT: u8 = 3;

#[derive(Clone, Debug)]
pub struct Enemy {
    pub x: usize,
    pub y: usize,
    pub facing: Facing,
    pub state: ActorState,
    pub skin: u8,
    pub move_cooldown: u32,
}

impl Enemy {
    pub fn new(x: usize, y: usize, skin: u8) -> Self {
        Enemy {
            x,
            y,
            facing: Facing::Left,
            state: ActorState::OnGround,
            skin,
            move_cooldown: 0,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Coin {
    pub x: usize,
    pub y: usize,
}

/// Decorative gold speck spawned by the win shower. Falls on the weakened
/// win-scene pull and rests on the bottom row.
#[derive(Clone, Copy, Debug)]
pub struct Particle {
    pub x: usize,
    pub y: usize,
    pub fall_cooldown: u32,
}

/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound.

#[derive(Clone, Debug)]
pub enum GameEvent {
    CoinPicked { x: usize, y: usize },
    AllCoinsCollected,
    PlayerCaught,
    PlayerJumped,
    PlayerFallStart,
}

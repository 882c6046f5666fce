/// Events emitted during a simulation step or an input handler.
/// The presentation layer consumes these for status messages and logging.

use crate::domain::entity::{ChildId, Color, ContainerId, Outcome};
use crate::domain::geometry::TileVec;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    ContainerAttached { id: ContainerId },
    ContainerReleased { id: ContainerId, location: TileVec },
    ContainerAutoMoved { id: ContainerId, location: TileVec },
    ActivationToggled { color: Color, containers: usize },
    PlatePressed { container: ContainerId, item: ChildId, pressed: bool },
    LeverFlipped { container: ContainerId, item: ChildId, on: bool },
    BoxToggled { container: ContainerId, item: ChildId, carried: bool },
    CollectiblePicked { container: ContainerId, item: ChildId, score: u32 },
    SpikeHit { lives: i32, life_lost: bool },
    Travelled { from: ContainerId, to: ContainerId },
    Paused,
    Resumed,
    Completed(Outcome),
}

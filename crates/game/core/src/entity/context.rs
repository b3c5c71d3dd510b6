use crate::entity::command::{Command, CommandBuffer};
use crate::physics::SpatialQuery;
use crate::types::FrameTime;

/// Everything an entity may read or emit during one tick.
pub struct TickContext<'w> {
    pub time: FrameTime,
    /// World size of one grid cell; ranges are expressed in cells.
    pub cell_size: f32,
    pub physics: &'w dyn SpatialQuery,
    pub commands: &'w mut CommandBuffer,
}

impl<'w> TickContext<'w> {
    pub fn new(
        time: FrameTime,
        cell_size: f32,
        physics: &'w dyn SpatialQuery,
        commands: &'w mut CommandBuffer,
    ) -> Self {
        Self {
            time,
            cell_size,
            physics,
            commands,
        }
    }

    #[inline]
    pub fn emit(&mut self, command: Command) {
        self.commands.push(command);
    }
}

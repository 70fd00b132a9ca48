use tracing::debug;

use crate::frame::{from_frame, Frame, Transform};

/// Fixed tool mounted on the robot flange (tool0).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Tool {
    /// Tool center point expressed in tool0 coordinates.
    pub frame: Frame,
}

impl Tool {
    pub fn new(frame: Frame) -> Self {
        Self { frame }
    }

    /// Transformation from tool0 to the tool center point.
    pub fn offset(&self) -> Transform {
        from_frame(&self.frame)
    }
}

/// Converts frames between world and robot-local coordinates, and between
/// the tool0 flange and the tool center point.
///
/// Both directions of each pair are cached and always recomputed together,
/// so a converter never holds a half-updated base or tool.
#[derive(Debug, Clone)]
pub struct FrameConverter {
    base: Frame,
    local_to_world: Transform,
    world_to_local: Transform,

    tool: Option<Tool>,
    tool0_to_tcp: Transform,
    tcp_to_tool0: Transform,
}

impl Default for FrameConverter {
    fn default() -> Self {
        Self::new(Frame::world_xy())
    }
}

impl FrameConverter {
    pub fn new(base: Frame) -> Self {
        let local_to_world = from_frame(&base);
        Self {
            base,
            local_to_world,
            world_to_local: local_to_world.inverse(),
            tool: None,
            tool0_to_tcp: Transform::identity(),
            tcp_to_tool0: Transform::identity(),
        }
    }

    pub fn with_tool(mut self, tool: Tool) -> Self {
        self.attach_tool(tool);
        self
    }

    /// Replaces the robot base frame, given in world coordinates.
    pub fn set_base_frame(&mut self, base: Frame) {
        let local_to_world = from_frame(&base);
        let world_to_local = local_to_world.inverse();
        self.base = base;
        self.local_to_world = local_to_world;
        self.world_to_local = world_to_local;
        debug!(base = %base, "robot base frame set");
    }

    pub fn base_frame(&self) -> &Frame {
        &self.base
    }

    /// Maps robot-local coordinates to world coordinates.
    pub fn local_to_world(&self) -> &Transform {
        &self.local_to_world
    }

    pub fn world_to_local(&self) -> &Transform {
        &self.world_to_local
    }

    /// Re-expresses a frame given in robot-local coordinates in world coordinates.
    pub fn to_world(&self, frame: &Frame) -> Frame {
        frame.transformed_by(&self.local_to_world)
    }

    /// Re-expresses a frame given in world coordinates in robot-local coordinates.
    pub fn to_local(&self, frame: &Frame) -> Frame {
        frame.transformed_by(&self.world_to_local)
    }

    pub fn attach_tool(&mut self, tool: Tool) {
        let tool0_to_tcp = tool.offset();
        self.tcp_to_tool0 = tool0_to_tcp.inverse();
        self.tool0_to_tcp = tool0_to_tcp;
        self.tool = Some(tool);
        debug!(tcp = %tool.frame, "tool attached");
    }

    pub fn detach_tool(&mut self) -> Option<Tool> {
        self.tool0_to_tcp = Transform::identity();
        self.tcp_to_tool0 = Transform::identity();
        self.tool.take()
    }

    pub fn tool(&self) -> Option<&Tool> {
        self.tool.as_ref()
    }

    /// Tool center point for a flange at `tool0`. Identity without a tool.
    pub fn tcp_from_tool0(&self, tool0: &Frame) -> Frame {
        Frame::from_transform(&(from_frame(tool0) * self.tool0_to_tcp))
    }

    /// Flange frame that puts the tool center point at `tcp`. Identity without a tool.
    pub fn tool0_from_tcp(&self, tcp: &Frame) -> Frame {
        Frame::from_transform(&(from_frame(tcp) * self.tcp_to_tool0))
    }
}

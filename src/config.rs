use std::time::Duration;

/// Configuration for the [`Runtime`](crate::runtime::Runtime) frame pump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Frames per second the runtime checks for a pending render.
    ///
    /// Renders only happen when something queued one; an idle application costs
    /// one empty check per frame.
    pub frame_rate: u32,

    /// Whether the runtime queues a render as soon as it is created, so the
    /// first frame mounts the tree without waiting for a commit.
    pub initial_render: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60,
            initial_render: true,
        }
    }
}

impl RuntimeConfig {
    /// Creates a configuration with the given frame rate.
    #[must_use]
    pub const fn new(frame_rate: u32) -> Self {
        Self {
            frame_rate,
            initial_render: true,
        }
    }

    #[must_use]
    pub const fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    #[must_use]
    pub const fn with_initial_render(mut self, initial_render: bool) -> Self {
        self.initial_render = initial_render;
        self
    }

    /// Time between two frames, never shorter than a millisecond. A zero frame
    /// rate is treated as one frame per second.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        let millis = 1000 / u64::from(self.frame_rate.max(1));
        Duration::from_millis(millis.max(1))
    }
}

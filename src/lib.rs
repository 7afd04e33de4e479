pub mod engine;
pub mod field;
pub mod interaction;
pub mod particle;
pub mod render;
pub mod settings;

pub use engine::{
    Engine, EngineState, FixedSurface, FrameScheduler, ManualScheduler, PointerEvent, PointerHandle,
    Surface,
};
pub use field::{Link, ParticleField};
pub use interaction::{HoverState, InteractionController};
pub use particle::{Particle, RenderParams};
pub use render::{Hsl, ImageSink, RenderSink, Rgba};
pub use settings::{resolve, BoundaryError, Bounds, PartialSettings, Settings, UNSET};

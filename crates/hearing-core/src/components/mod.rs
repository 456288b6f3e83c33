//! ECS Components
//!
//! All entity components for listeners, sound emitters, and the two
//! per-listener range controllers.

pub mod attention;
pub mod dampening;
pub mod emitter;
pub mod listener;

pub use attention::*;
pub use dampening::*;
pub use emitter::*;
pub use listener::*;

pub mod frame;

pub use frame::{Bounds, CoordinateFrame, FrameFlags, Orientation};

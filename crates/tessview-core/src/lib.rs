pub mod colorscale;
pub mod config;
pub mod consts;
pub mod encode;
pub mod error;
pub mod geometry;
pub mod illustration;
pub mod panel;
pub mod report;
pub mod scene;
pub mod sequence;

//! Trade Beat library - procedural trading sound with a spectrum scope

pub mod audio;
pub mod cli;
pub mod error;
pub mod frame_loop;
pub mod params;
pub mod recording;
pub mod rendering;
pub mod ticker;
pub mod visual;

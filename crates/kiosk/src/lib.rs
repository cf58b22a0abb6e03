//! Poster Buddy kiosk: rotation controller, keyboard input and terminal
//! rendering.

pub mod config;
pub mod controller;
pub mod input;
pub mod render;

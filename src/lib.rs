pub mod app;
pub mod chart;
pub mod cli;
pub mod color;
pub mod data;
pub mod histogram;
pub mod render;
pub mod state;
pub mod tools;
pub mod ui;

#[cfg(test)]
mod testing;

pub mod board;
pub mod checks;
pub mod controller;
pub mod geometry;
pub mod grader;
pub mod submit;

pub fn version() -> &'static str {
    "0.1.0"
}

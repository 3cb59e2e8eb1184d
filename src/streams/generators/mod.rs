mod sea;

pub use sea::{ConceptSwitch, SeaGenerator};

mod learner_choice;
mod prequential_params;
mod schema;
mod stream_choice;
mod ui_choice;

pub use learner_choice::*;
pub use prequential_params::PrequentialParams;
pub use schema::*;
pub use stream_choice::*;
pub use ui_choice::UIChoice;

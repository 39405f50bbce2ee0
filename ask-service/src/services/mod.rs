pub mod model;
pub mod prompt;
pub mod providers;

pub use model::{ModelHandle, ModelState};
pub use prompt::compose_prompt;

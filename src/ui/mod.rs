//! Terminal shell around the reader core: a search box, the open passage, and
//! the consent / tour / sign-in dialogs.

mod app;
mod forms;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;

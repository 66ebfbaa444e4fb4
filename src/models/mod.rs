mod bucket;
mod console;
mod freeze;
mod project;
mod user;

pub use bucket::*;
pub use console::*;
pub use freeze::*;
pub use project::*;
pub use user::*;

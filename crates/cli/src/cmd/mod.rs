mod bump;
mod refresh;

pub use bump::cmd_bump;
pub use refresh::{RefreshArgs, cmd_refresh};

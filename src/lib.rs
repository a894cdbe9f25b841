//! Fetch the comments of a YouTube video once, or keep a snapshot of the
//! video and its comment threads up to date on a timer.

pub mod app;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod scheduler;
pub mod snapshot;
pub mod writer;

pub use app::App;
pub use config::{Cli, Command};
pub use error::AppError;
pub use fetcher::Fetcher;
pub use scheduler::{OverlapPolicy, Scheduler};
pub use snapshot::{CommentRecord, MediaSnapshot, VideoRecord};
pub use writer::{WriteError, write_json};

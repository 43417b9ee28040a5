mod discover;
mod show;

pub use discover::{DiscoverArgs, discover};
pub use show::{ShowArgs, show};

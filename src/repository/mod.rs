// file: src/repository/mod.rs
// description: Repository operations module exports
// reference: Internal module structure

pub mod github;
pub mod host;
pub mod local;
pub mod walker;

pub use github::GitHubClient;
pub use host::ContentHost;
pub use local::LocalHost;
pub use walker::TreeWalker;

mod client;
mod discovery;
mod gerrit;
mod gitlab;
mod types;

pub use client::QueryClient;
pub use discovery::ProjectDiscovery;
pub use types::{ProjectListing, ProjectRepoMap};

//! Production implementations of Monorail's capability traits: the npm
//! registry client and git release tagging.

pub mod git;
pub mod npm;

pub use git::GitTagger;
pub use npm::NpmRegistry;

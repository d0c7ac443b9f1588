//! Resource operations split by remote resource family
//!
//! Each function follows the same contract: validate required parameters
//! locally (fail fast, before any network traffic), build the resource
//! path and parameter map, and dispatch through a [`Transport`] verb
//! method. Responses pass through unmodified except where noted.
//!
//! [`Transport`]: super::Transport

pub mod cves;
pub mod folders;
pub mod groups;
pub mod manifests;
pub mod reports;

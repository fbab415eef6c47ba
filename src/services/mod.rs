pub mod team_service;

pub use team_service::{TeamError, TeamService};

pub mod team;
pub mod user;

pub use team::{
    NewPlayer, NewTeam, Player, PlayerUpdate, Sport, Team, TeamDetail, TeamUpdate, TeamWithManager,
};
pub use user::User;

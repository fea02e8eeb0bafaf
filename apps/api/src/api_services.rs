mod database;
mod email;
mod invite_purge;
mod policy_reload;
mod state_builder;

pub use database::connect_and_migrate;
pub use invite_purge::spawn_invite_purge;
pub use policy_reload::spawn_policy_reload;
pub use state_builder::build_app_state;

pub mod domains;
pub mod health;
pub mod invites;
pub mod members;
pub mod permissions;
pub mod policies;

#[cfg(test)]
mod test_support;

use std::collections::BTreeSet;

use crate::UserId;

/// Returns whether `user` may lose the owner role without leaving the domain ownerless.
///
/// `owners` is the full set of users currently holding the owner role. The
/// mutation is permitted when another owner remains after it.
#[must_use]
pub fn can_remove_or_demote(owners: &BTreeSet<UserId>, user: UserId) -> bool {
    match owners.len() {
        0 => false,
        1 => !owners.contains(&user),
        _ => true,
    }
}

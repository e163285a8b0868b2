//! Membership and visibility checks shared by the services.

use larder_core::{GroupId, GroupMember, LarderError, LarderResult, Pantry, PantryId, UserId};
use larder_repository::{GroupRepository, PantryRepository};

/// Returns the caller's membership, or NotFound so that non-members cannot
/// probe for group ids.
pub(crate) async fn require_member(
    groups: &dyn GroupRepository,
    group: GroupId,
    user: UserId,
) -> LarderResult<GroupMember> {
    groups
        .find_member(group, user)
        .await?
        .ok_or_else(|| LarderError::not_found("Group", group))
}

/// Like [`require_member`], additionally Forbidden for non-admins.
pub(crate) async fn require_admin(
    groups: &dyn GroupRepository,
    group: GroupId,
    user: UserId,
) -> LarderResult<GroupMember> {
    let member = require_member(groups, group, user).await?;
    if !member.is_admin {
        return Err(LarderError::forbidden("Only group admins can do this"));
    }
    Ok(member)
}

pub(crate) async fn is_member(groups: &dyn GroupRepository, group: GroupId, user: UserId) -> LarderResult<bool> {
    Ok(groups.find_member(group, user).await?.is_some())
}

/// Loads a pantry the caller owns or shares through a group.
pub(crate) async fn load_accessible_pantry(
    pantries: &dyn PantryRepository,
    groups: &dyn GroupRepository,
    pantry: PantryId,
    user: UserId,
) -> LarderResult<Pantry> {
    let found = pantries
        .find_by_id(pantry)
        .await?
        .ok_or_else(|| LarderError::not_found("Pantry", pantry))?;

    if found.is_owned_by(user) {
        return Ok(found);
    }
    match found.group_id {
        Some(group) if is_member(groups, group, user).await? => Ok(found),
        _ => Err(LarderError::not_found("Pantry", pantry)),
    }
}

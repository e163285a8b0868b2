//! Group, membership and invite DTOs.

use crate::dto::UserSummary;
use chrono::{DateTime, Utc};
use larder_core::{GroupId, GroupInvite, GroupMember, UserGroup, UserId, VirtualMember, VirtualMemberId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    #[validate(
        length(min = 1, max = 100, message = "Title must be 1-100 characters"),
        custom(function = "larder_core::rules::not_blank", message = "Title must not be blank")
    )]
    pub title: String,

    #[validate(length(max = 500))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroupRequest {
    #[validate(
        length(min = 1, max = 100, message = "Title must be 1-100 characters"),
        custom(function = "larder_core::rules::not_blank", message = "Title must not be blank")
    )]
    pub title: Option<String>,

    #[validate(length(max = 500))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinGroupRequest {
    #[validate(length(equal = 8, message = "Invite code must be 8 characters"))]
    pub code: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetAdminRequest {
    pub is_admin: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferAdminRequest {
    pub user_id: UserId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMemberRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name must be 1-100 characters"),
        custom(function = "larder_core::rules::not_blank", message = "Name must not be blank")
    )]
    pub name: String,
}

/// A group as seen by one of its members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupResponse {
    pub id: GroupId,
    pub title: String,
    pub description: Option<String>,
    pub created_by: UserId,
    /// Whether the requesting user administers the group.
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GroupResponse {
    #[must_use]
    pub fn new(group: UserGroup, is_admin: bool) -> Self {
        Self {
            id: group.id,
            title: group.title,
            description: group.description,
            created_by: group.created_by,
            is_admin,
            created_at: group.created_at,
            updated_at: group.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupMemberResponse {
    pub user_id: UserId,
    /// Absent if the account no longer exists.
    pub user: Option<UserSummary>,
    pub is_admin: bool,
    pub joined_at: DateTime<Utc>,
}

impl GroupMemberResponse {
    #[must_use]
    pub fn new(member: GroupMember, user: Option<UserSummary>) -> Self {
        Self {
            user_id: member.user_id,
            user,
            is_admin: member.is_admin,
            joined_at: member.joined_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMemberResponse {
    pub id: VirtualMemberId,
    pub group_id: GroupId,
    pub name: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<VirtualMember> for VirtualMemberResponse {
    fn from(member: VirtualMember) -> Self {
        Self {
            id: member.id,
            group_id: member.group_id,
            name: member.name,
            created_by: member.created_by,
            created_at: member.created_at,
            updated_at: member.updated_at,
        }
    }
}

/// A group with its account and virtual members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupDetailsResponse {
    #[serde(flatten)]
    pub group: GroupResponse,
    pub members: Vec<GroupMemberResponse>,
    pub virtual_members: Vec<VirtualMemberResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteResponse {
    pub code: String,
    pub group_id: GroupId,
    pub expires_at: DateTime<Utc>,
}

impl From<GroupInvite> for InviteResponse {
    fn from(invite: GroupInvite) -> Self {
        Self {
            code: invite.code,
            group_id: invite.group_id,
            expires_at: invite.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_request_requires_eight_characters() {
        let request = JoinGroupRequest {
            code: "ABC".to_string(),
        };
        assert!(request.validate().is_err());

        let request = JoinGroupRequest {
            code: "ABCD1234".to_string(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_group_details_flatten() {
        let group = UserGroup::new("Flat 4B".to_string(), None, UserId::new());
        let details = GroupDetailsResponse {
            group: GroupResponse::new(group, true),
            members: Vec::new(),
            virtual_members: Vec::new(),
        };
        let json = serde_json::to_value(details).unwrap();
        assert_eq!(json["title"], "Flat 4B");
        assert_eq!(json["isAdmin"], true);
        assert!(json["virtualMembers"].is_array());
    }
}

//! Group service trait definition.

use crate::dto::{
    CreateGroupRequest, GroupDetailsResponse, GroupMemberResponse, GroupResponse, InviteResponse,
    UpdateGroupRequest, VirtualMemberRequest, VirtualMemberResponse,
};
use async_trait::async_trait;
use larder_core::{GroupId, Interface, LarderResult, UserId, VirtualMemberId};

/// Group service trait.
///
/// Groups are visible to members only. Every group keeps at least one admin
/// while it has members.
#[async_trait]
pub trait GroupService: Interface + Send + Sync {
    /// Creates a group with the caller as its first admin.
    async fn create(&self, user: UserId, request: CreateGroupRequest) -> LarderResult<GroupResponse>;

    async fn list(&self, user: UserId) -> LarderResult<Vec<GroupResponse>>;

    async fn get(&self, user: UserId, id: GroupId) -> LarderResult<GroupDetailsResponse>;

    async fn update(&self, user: UserId, id: GroupId, request: UpdateGroupRequest) -> LarderResult<GroupResponse>;

    async fn delete(&self, user: UserId, id: GroupId) -> LarderResult<()>;

    /// Issues a single-use invite code.
    async fn create_invite(&self, user: UserId, id: GroupId) -> LarderResult<InviteResponse>;

    async fn join(&self, user: UserId, code: &str) -> LarderResult<GroupResponse>;

    /// Leaves a group; the last member leaving deletes it.
    async fn leave(&self, user: UserId, id: GroupId) -> LarderResult<()>;

    async fn set_admin(
        &self,
        user: UserId,
        id: GroupId,
        member: UserId,
        is_admin: bool,
    ) -> LarderResult<GroupMemberResponse>;

    /// Hands admin rights to another member; the caller stops being admin.
    async fn transfer_admin(&self, user: UserId, id: GroupId, target: UserId) -> LarderResult<GroupDetailsResponse>;

    async fn remove_member(&self, user: UserId, id: GroupId, member: UserId) -> LarderResult<()>;

    async fn list_virtual_members(&self, user: UserId, id: GroupId) -> LarderResult<Vec<VirtualMemberResponse>>;

    async fn create_virtual_member(
        &self,
        user: UserId,
        id: GroupId,
        request: VirtualMemberRequest,
    ) -> LarderResult<VirtualMemberResponse>;

    async fn update_virtual_member(
        &self,
        user: UserId,
        id: GroupId,
        member: VirtualMemberId,
        request: VirtualMemberRequest,
    ) -> LarderResult<VirtualMemberResponse>;

    async fn delete_virtual_member(&self, user: UserId, id: GroupId, member: VirtualMemberId) -> LarderResult<()>;
}

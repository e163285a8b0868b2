//! Group service implementation.

use super::access::{require_admin, require_member};
use crate::dto::{
    CreateGroupRequest, GroupDetailsResponse, GroupMemberResponse, GroupResponse, InviteResponse,
    UpdateGroupRequest, UserSummary, VirtualMemberRequest, VirtualMemberResponse,
};
use crate::group_service::GroupService;
use async_trait::async_trait;
use chrono::Utc;
use larder_core::{
    GroupId, GroupInvite, GroupMember, LarderError, LarderResult, UserGroup, UserId, ValidateExt,
    VirtualMember, VirtualMemberId,
};
use larder_repository::{GroupRepository, UserRepository};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

const INVITE_ATTEMPTS: usize = 5;

pub struct GroupServiceImpl {
    groups: Arc<dyn GroupRepository>,
    users: Arc<dyn UserRepository>,
}

fn invite_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GroupInvite::CODE_LENGTH)
        .map(char::from)
        .collect()
}

impl GroupServiceImpl {
    pub fn new(groups: Arc<dyn GroupRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { groups, users }
    }

    async fn load(&self, id: GroupId) -> LarderResult<UserGroup> {
        self.groups
            .find_by_id(id)
            .await?
            .ok_or_else(|| LarderError::not_found("Group", id))
    }

    async fn admin_count(&self, id: GroupId) -> LarderResult<usize> {
        let members = self.groups.find_members(id).await?;
        Ok(members.iter().filter(|m| m.is_admin).count())
    }

    async fn details(&self, group: UserGroup, is_admin: bool) -> LarderResult<GroupDetailsResponse> {
        let members = self.groups.find_members(group.id).await?;
        let ids: Vec<UserId> = members.iter().map(|m| m.user_id).collect();
        let users: HashMap<UserId, UserSummary> = self
            .users
            .find_by_ids(&ids)
            .await?
            .iter()
            .map(|u| (u.id, UserSummary::from(u)))
            .collect();

        let members = members
            .into_iter()
            .map(|m| {
                let user = users.get(&m.user_id).cloned();
                GroupMemberResponse::new(m, user)
            })
            .collect();

        let virtual_members = self
            .groups
            .find_virtual_members(group.id)
            .await?
            .into_iter()
            .map(VirtualMemberResponse::from)
            .collect();

        Ok(GroupDetailsResponse {
            group: GroupResponse::new(group, is_admin),
            members,
            virtual_members,
        })
    }

    async fn virtual_member_of(&self, id: GroupId, member: VirtualMemberId) -> LarderResult<VirtualMember> {
        self.groups
            .find_virtual_member(member)
            .await?
            .filter(|m| m.group_id == id)
            .ok_or_else(|| LarderError::not_found("Virtual member", member))
    }
}

#[async_trait]
impl GroupService for GroupServiceImpl {
    async fn create(&self, user: UserId, request: CreateGroupRequest) -> LarderResult<GroupResponse> {
        debug!("Creating group: {}", request.title);

        request.validate_request()?;

        let title = request.title.trim().to_string();
        if self.groups.exists_by_creator_and_title(user, &title, None).await? {
            return Err(LarderError::Conflict(format!("You already have a group named '{title}'")));
        }

        let group = UserGroup::new(title, request.description, user);
        let saved = self.groups.save(&group).await?;
        self.groups.save_member(&GroupMember::new(saved.id, user, true)).await?;

        info!("Group created: {}", saved.id);
        Ok(GroupResponse::new(saved, true))
    }

    async fn list(&self, user: UserId) -> LarderResult<Vec<GroupResponse>> {
        let groups = self.groups.find_by_member(user).await?;

        let mut responses = Vec::with_capacity(groups.len());
        for group in groups {
            let is_admin = self
                .groups
                .find_member(group.id, user)
                .await?
                .is_some_and(|m| m.is_admin);
            responses.push(GroupResponse::new(group, is_admin));
        }
        Ok(responses)
    }

    async fn get(&self, user: UserId, id: GroupId) -> LarderResult<GroupDetailsResponse> {
        debug!("Getting group: {}", id);

        let member = require_member(self.groups.as_ref(), id, user).await?;
        let group = self.load(id).await?;
        self.details(group, member.is_admin).await
    }

    async fn update(&self, user: UserId, id: GroupId, request: UpdateGroupRequest) -> LarderResult<GroupResponse> {
        request.validate_request()?;

        require_admin(self.groups.as_ref(), id, user).await?;
        let mut group = self.load(id).await?;

        if let Some(title) = request.title {
            let title = title.trim().to_string();
            if self
                .groups
                .exists_by_creator_and_title(group.created_by, &title, Some(id))
                .await?
            {
                return Err(LarderError::Conflict(format!("A group named '{title}' already exists")));
            }
            group.title = title;
        }
        if request.description.is_some() {
            group.description = request.description;
        }
        group.touch();

        let updated = self.groups.update(&group).await?;

        info!("Group updated: {}", id);
        Ok(GroupResponse::new(updated, true))
    }

    async fn delete(&self, user: UserId, id: GroupId) -> LarderResult<()> {
        require_admin(self.groups.as_ref(), id, user).await?;
        self.groups.delete(id).await?;

        info!("Group deleted: {}", id);
        Ok(())
    }

    async fn create_invite(&self, user: UserId, id: GroupId) -> LarderResult<InviteResponse> {
        require_admin(self.groups.as_ref(), id, user).await?;

        for _ in 0..INVITE_ATTEMPTS {
            let invite = GroupInvite::new(invite_code(), id, user);
            match self.groups.save_invite(&invite).await {
                Ok(saved) => {
                    info!(group_id = %id, "Invite created");
                    return Ok(InviteResponse::from(saved));
                }
                Err(LarderError::Conflict(_)) => {
                    warn!(group_id = %id, "Invite code collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }
        Err(LarderError::internal("Could not allocate a unique invite code"))
    }

    async fn join(&self, user: UserId, code: &str) -> LarderResult<GroupResponse> {
        debug!("Joining group with invite code");

        let mut invite = self
            .groups
            .find_invite(code)
            .await?
            .ok_or_else(|| LarderError::not_found("Invite", code))?;

        if invite.is_used() {
            return Err(LarderError::bad_request("Invite code has already been used"));
        }
        if invite.is_expired(Utc::now()) {
            return Err(LarderError::bad_request("Invite code has expired"));
        }
        if self.groups.find_member(invite.group_id, user).await?.is_some() {
            return Err(LarderError::conflict("You are already a member of this group"));
        }

        let group = self.load(invite.group_id).await?;

        invite.mark_used(user);
        self.groups.update_invite(&invite).await?;
        self.groups.save_member(&GroupMember::new(group.id, user, false)).await?;

        info!(group_id = %group.id, user_id = %user, "User joined group");
        Ok(GroupResponse::new(group, false))
    }

    async fn leave(&self, user: UserId, id: GroupId) -> LarderResult<()> {
        let member = require_member(self.groups.as_ref(), id, user).await?;
        let members = self.groups.find_members(id).await?;

        if members.len() == 1 {
            self.groups.delete(id).await?;
            info!(group_id = %id, "Last member left, group deleted");
            return Ok(());
        }

        let admins = members.iter().filter(|m| m.is_admin).count();
        if member.is_admin && admins == 1 {
            return Err(LarderError::bad_request(
                "You are the last admin; transfer admin rights first",
            ));
        }

        self.groups.delete_member(id, user).await?;

        info!(group_id = %id, user_id = %user, "User left group");
        Ok(())
    }

    async fn set_admin(
        &self,
        user: UserId,
        id: GroupId,
        member: UserId,
        is_admin: bool,
    ) -> LarderResult<GroupMemberResponse> {
        require_admin(self.groups.as_ref(), id, user).await?;

        let mut target = self
            .groups
            .find_member(id, member)
            .await?
            .ok_or_else(|| LarderError::not_found("Group member", member))?;

        if target.is_admin && !is_admin && self.admin_count(id).await? == 1 {
            return Err(LarderError::bad_request("A group needs at least one admin"));
        }

        target.is_admin = is_admin;
        let updated = self.groups.update_member(&target).await?;

        let summary = self.users.find_by_id(member).await?.as_ref().map(UserSummary::from);

        info!(group_id = %id, member = %member, is_admin, "Admin flag changed");
        Ok(GroupMemberResponse::new(updated, summary))
    }

    async fn transfer_admin(&self, user: UserId, id: GroupId, target: UserId) -> LarderResult<GroupDetailsResponse> {
        let mut caller = require_admin(self.groups.as_ref(), id, user).await?;

        if target == user {
            return Err(LarderError::bad_request("You already are an admin of this group"));
        }

        let mut new_admin = self
            .groups
            .find_member(id, target)
            .await?
            .ok_or_else(|| LarderError::not_found("Group member", target))?;

        new_admin.is_admin = true;
        self.groups.update_member(&new_admin).await?;
        caller.is_admin = false;
        self.groups.update_member(&caller).await?;

        info!(group_id = %id, from = %user, to = %target, "Admin rights transferred");

        let group = self.load(id).await?;
        self.details(group, false).await
    }

    async fn remove_member(&self, user: UserId, id: GroupId, member: UserId) -> LarderResult<()> {
        require_admin(self.groups.as_ref(), id, user).await?;

        if member == user {
            return Err(LarderError::bad_request("Use leave to remove yourself"));
        }
        if !self.groups.delete_member(id, member).await? {
            return Err(LarderError::not_found("Group member", member));
        }

        info!(group_id = %id, member = %member, "Member removed");
        Ok(())
    }

    async fn list_virtual_members(&self, user: UserId, id: GroupId) -> LarderResult<Vec<VirtualMemberResponse>> {
        require_member(self.groups.as_ref(), id, user).await?;
        let members = self.groups.find_virtual_members(id).await?;
        Ok(members.into_iter().map(VirtualMemberResponse::from).collect())
    }

    async fn create_virtual_member(
        &self,
        user: UserId,
        id: GroupId,
        request: VirtualMemberRequest,
    ) -> LarderResult<VirtualMemberResponse> {
        request.validate_request()?;
        require_admin(self.groups.as_ref(), id, user).await?;

        let member = VirtualMember::new(id, request.name.trim().to_string(), user);
        let saved = self.groups.save_virtual_member(&member).await?;

        info!(group_id = %id, "Virtual member created: {}", saved.id);
        Ok(VirtualMemberResponse::from(saved))
    }

    async fn update_virtual_member(
        &self,
        user: UserId,
        id: GroupId,
        member: VirtualMemberId,
        request: VirtualMemberRequest,
    ) -> LarderResult<VirtualMemberResponse> {
        request.validate_request()?;
        require_admin(self.groups.as_ref(), id, user).await?;

        let mut found = self.virtual_member_of(id, member).await?;
        found.name = request.name.trim().to_string();
        found.touch();

        let updated = self.groups.update_virtual_member(&found).await?;
        Ok(VirtualMemberResponse::from(updated))
    }

    async fn delete_virtual_member(&self, user: UserId, id: GroupId, member: VirtualMemberId) -> LarderResult<()> {
        require_admin(self.groups.as_ref(), id, user).await?;
        self.virtual_member_of(id, member).await?;
        self.groups.delete_virtual_member(member).await?;

        info!(group_id = %id, "Virtual member deleted: {}", member);
        Ok(())
    }
}

impl std::fmt::Debug for GroupServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupServiceImpl").finish_non_exhaustive()
    }
}

//! Group, membership and virtual member controller.

use crate::{
    extractors::{parse_id, AuthenticatedUser, ValidatedJson},
    middleware::HttpCache,
    responses::{created, no_content, ok, ApiResult, AppError, CreatedResult},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use larder_service::{
    CreateGroupRequest, GroupDetailsResponse, GroupMemberResponse, GroupResponse, InviteResponse, JoinGroupRequest,
    SetAdminRequest, TransferAdminRequest, UpdateGroupRequest, VirtualMemberRequest, VirtualMemberResponse,
};

const GROUP_TTL: u64 = 60;

/// Entries whose visibility follows group membership.
const EVICT_JOIN: [&str; 6] = [
    "groups:*",
    "group:*",
    "pantries:*",
    "pantry:*",
    "pantry_items:*",
    "shopping_list:*",
];
const EVICT_MEMBER_CHANGE: [&str; 6] = [
    "groups:*",
    "group:*:id:{id}*",
    "pantries:*",
    "pantry:*",
    "pantry_items:*",
    "shopping_list:*",
];
const EVICT_GROUP_DELETE: [&str; 7] = [
    "groups:*",
    "group:*:id:{id}*",
    "virtual_members:*:id:{id}*",
    "pantries:*",
    "pantry:*",
    "pantry_items:*",
    "shopping_list:*",
];

pub fn router(cache: &HttpCache) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            cache
                .cached(get(list_groups), "groups", GROUP_TTL)
                .merge(cache.evicting(post(create_group), ["groups:*"])),
        )
        .route(
            "/join",
            cache.evicting(post(join_group), EVICT_JOIN),
        )
        .route(
            "/:id",
            cache
                .cached(get(get_group), "group", GROUP_TTL)
                .merge(cache.evicting(patch(update_group), ["groups:*", "group:*:id:{id}*"]))
                .merge(cache.evicting(delete(delete_group), EVICT_GROUP_DELETE)),
        )
        .route("/:id/invites", post(create_invite))
        .route(
            "/:id/leave",
            cache.evicting(post(leave_group), EVICT_MEMBER_CHANGE),
        )
        .route(
            "/:id/transfer-admin",
            cache.evicting(post(transfer_admin), ["groups:*", "group:*:id:{id}*"]),
        )
        .route(
            "/:id/members/:user_id",
            cache
                .evicting(patch(set_admin), ["groups:*", "group:*:id:{id}*"])
                .merge(cache.evicting(delete(remove_member), EVICT_MEMBER_CHANGE)),
        )
        .route(
            "/:id/virtual-members",
            cache
                .cached(get(list_virtual_members), "virtual_members", GROUP_TTL)
                .merge(cache.evicting(
                    post(create_virtual_member),
                    ["virtual_members:*:id:{id}*", "group:*:id:{id}*"],
                )),
        )
        .route(
            "/:id/virtual-members/:member_id",
            cache
                .evicting(
                    patch(update_virtual_member),
                    ["virtual_members:*:id:{id}*", "group:*:id:{id}*"],
                )
                .merge(cache.evicting(
                    delete(delete_virtual_member),
                    ["virtual_members:*:id:{id}*", "group:*:id:{id}*"],
                )),
        )
}

/// Groups the caller belongs to.
#[utoipa::path(
    get,
    path = "/groups",
    tag = "groups",
    responses((status = 200, description = "Groups", body = [GroupResponse])),
    security(("bearer_auth" = []))
)]
pub async fn list_groups(State(state): State<AppState>, user: AuthenticatedUser) -> ApiResult<Vec<GroupResponse>> {
    ok(state.group_service.list(user.id).await?)
}

/// Create a group; the caller becomes its admin.
#[utoipa::path(
    post,
    path = "/groups",
    tag = "groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 201, description = "Group created", body = GroupResponse),
        (status = 409, description = "Caller already has a group with this title")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_group(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreateGroupRequest>,
) -> CreatedResult<GroupResponse> {
    created(state.group_service.create(user.id, request).await?)
}

/// Group with its members.
#[utoipa::path(
    get,
    path = "/groups/{id}",
    tag = "groups",
    params(("id" = String, Path, description = "Group id")),
    responses(
        (status = 200, description = "Group found", body = GroupDetailsResponse),
        (status = 404, description = "Group not found or not a member")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_group(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<GroupDetailsResponse> {
    let id = parse_id(&id, "group")?;
    ok(state.group_service.get(user.id, id).await?)
}

#[utoipa::path(
    patch,
    path = "/groups/{id}",
    tag = "groups",
    params(("id" = String, Path, description = "Group id")),
    request_body = UpdateGroupRequest,
    responses(
        (status = 200, description = "Group updated", body = GroupResponse),
        (status = 403, description = "Not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_group(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateGroupRequest>,
) -> ApiResult<GroupResponse> {
    let id = parse_id(&id, "group")?;
    ok(state.group_service.update(user.id, id, request).await?)
}

#[utoipa::path(
    delete,
    path = "/groups/{id}",
    tag = "groups",
    params(("id" = String, Path, description = "Group id")),
    responses(
        (status = 204, description = "Group deleted"),
        (status = 403, description = "Not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_group(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, "group")?;
    state.group_service.delete(user.id, id).await?;
    Ok(no_content())
}

/// Issue an invite code, valid for seven days.
#[utoipa::path(
    post,
    path = "/groups/{id}/invites",
    tag = "groups",
    params(("id" = String, Path, description = "Group id")),
    responses(
        (status = 201, description = "Invite created", body = InviteResponse),
        (status = 403, description = "Not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_invite(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> CreatedResult<InviteResponse> {
    let id = parse_id(&id, "group")?;
    created(state.group_service.create_invite(user.id, id).await?)
}

/// Join a group with an invite code.
#[utoipa::path(
    post,
    path = "/groups/join",
    tag = "groups",
    request_body = JoinGroupRequest,
    responses(
        (status = 200, description = "Joined", body = GroupResponse),
        (status = 400, description = "Invite used or expired"),
        (status = 404, description = "Unknown invite code"),
        (status = 409, description = "Already a member")
    ),
    security(("bearer_auth" = []))
)]
pub async fn join_group(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<JoinGroupRequest>,
) -> ApiResult<GroupResponse> {
    ok(state.group_service.join(user.id, &request.code).await?)
}

/// Leave a group. The last member leaving deletes it.
#[utoipa::path(
    post,
    path = "/groups/{id}/leave",
    tag = "groups",
    params(("id" = String, Path, description = "Group id")),
    responses(
        (status = 204, description = "Left the group"),
        (status = 400, description = "Last admin must transfer admin rights first")
    ),
    security(("bearer_auth" = []))
)]
pub async fn leave_group(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, "group")?;
    state.group_service.leave(user.id, id).await?;
    Ok(no_content())
}

/// Grant or revoke admin rights.
#[utoipa::path(
    patch,
    path = "/groups/{id}/members/{user_id}",
    tag = "groups",
    params(
        ("id" = String, Path, description = "Group id"),
        ("user_id" = String, Path, description = "Member's user id")
    ),
    request_body = SetAdminRequest,
    responses(
        (status = 200, description = "Membership updated", body = GroupMemberResponse),
        (status = 400, description = "Would leave the group without an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn set_admin(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((id, member)): Path<(String, String)>,
    Json(request): Json<SetAdminRequest>,
) -> ApiResult<GroupMemberResponse> {
    let id = parse_id(&id, "group")?;
    let member = parse_id(&member, "user")?;
    ok(state.group_service.set_admin(user.id, id, member, request.is_admin).await?)
}

/// Remove another member. Use leave to remove yourself.
#[utoipa::path(
    delete,
    path = "/groups/{id}/members/{user_id}",
    tag = "groups",
    params(
        ("id" = String, Path, description = "Group id"),
        ("user_id" = String, Path, description = "Member's user id")
    ),
    responses((status = 204, description = "Member removed")),
    security(("bearer_auth" = []))
)]
pub async fn remove_member(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((id, member)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, "group")?;
    let member = parse_id(&member, "user")?;
    state.group_service.remove_member(user.id, id, member).await?;
    Ok(no_content())
}

/// Hand admin rights to another member.
#[utoipa::path(
    post,
    path = "/groups/{id}/transfer-admin",
    tag = "groups",
    params(("id" = String, Path, description = "Group id")),
    request_body = TransferAdminRequest,
    responses((status = 200, description = "Admin rights transferred", body = GroupDetailsResponse)),
    security(("bearer_auth" = []))
)]
pub async fn transfer_admin(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    Json(request): Json<TransferAdminRequest>,
) -> ApiResult<GroupDetailsResponse> {
    let id = parse_id(&id, "group")?;
    ok(state.group_service.transfer_admin(user.id, id, request.user_id).await?)
}

#[utoipa::path(
    get,
    path = "/groups/{id}/virtual-members",
    tag = "groups",
    params(("id" = String, Path, description = "Group id")),
    responses((status = 200, description = "Virtual members", body = [VirtualMemberResponse])),
    security(("bearer_auth" = []))
)]
pub async fn list_virtual_members(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<Vec<VirtualMemberResponse>> {
    let id = parse_id(&id, "group")?;
    ok(state.group_service.list_virtual_members(user.id, id).await?)
}

#[utoipa::path(
    post,
    path = "/groups/{id}/virtual-members",
    tag = "groups",
    params(("id" = String, Path, description = "Group id")),
    request_body = VirtualMemberRequest,
    responses((status = 201, description = "Virtual member created", body = VirtualMemberResponse)),
    security(("bearer_auth" = []))
)]
pub async fn create_virtual_member(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<VirtualMemberRequest>,
) -> CreatedResult<VirtualMemberResponse> {
    let id = parse_id(&id, "group")?;
    created(state.group_service.create_virtual_member(user.id, id, request).await?)
}

#[utoipa::path(
    patch,
    path = "/groups/{id}/virtual-members/{member_id}",
    tag = "groups",
    params(
        ("id" = String, Path, description = "Group id"),
        ("member_id" = String, Path, description = "Virtual member id")
    ),
    request_body = VirtualMemberRequest,
    responses((status = 200, description = "Virtual member renamed", body = VirtualMemberResponse)),
    security(("bearer_auth" = []))
)]
pub async fn update_virtual_member(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((id, member)): Path<(String, String)>,
    ValidatedJson(request): ValidatedJson<VirtualMemberRequest>,
) -> ApiResult<VirtualMemberResponse> {
    let id = parse_id(&id, "group")?;
    let member = parse_id(&member, "virtual member")?;
    ok(state
        .group_service
        .update_virtual_member(user.id, id, member, request)
        .await?)
}

#[utoipa::path(
    delete,
    path = "/groups/{id}/virtual-members/{member_id}",
    tag = "groups",
    params(
        ("id" = String, Path, description = "Group id"),
        ("member_id" = String, Path, description = "Virtual member id")
    ),
    responses((status = 204, description = "Virtual member deleted")),
    security(("bearer_auth" = []))
)]
pub async fn delete_virtual_member(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((id, member)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, "group")?;
    let member = parse_id(&member, "virtual member")?;
    state.group_service.delete_virtual_member(user.id, id, member).await?;
    Ok(no_content())
}

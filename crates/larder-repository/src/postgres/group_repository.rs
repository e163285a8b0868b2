//! PostgreSQL group repository: groups, memberships, invites and virtual members.

use crate::traits::GroupRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use larder_core::{
    GroupId, GroupInvite, GroupMember, LarderResult, UserGroup, UserId, VirtualMember,
    VirtualMemberId,
};
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

const GROUP_COLUMNS: &str = "id, title, description, created_by, created_at, updated_at";
const MEMBER_COLUMNS: &str = "group_id, user_id, is_admin, joined_at";
const INVITE_COLUMNS: &str = "code, group_id, created_by, expires_at, used_by, used_at, created_at";
const VIRTUAL_MEMBER_COLUMNS: &str = "id, group_id, name, created_by, created_at, updated_at";

#[derive(Clone)]
pub struct PgGroupRepository {
    pool: PgPool,
}

impl PgGroupRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct GroupRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<GroupRow> for UserGroup {
    fn from(row: GroupRow) -> Self {
        Self {
            id: GroupId::from_uuid(row.id),
            title: row.title,
            description: row.description,
            created_by: UserId::from_uuid(row.created_by),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct MemberRow {
    group_id: Uuid,
    user_id: Uuid,
    is_admin: bool,
    joined_at: DateTime<Utc>,
}

impl From<MemberRow> for GroupMember {
    fn from(row: MemberRow) -> Self {
        Self {
            group_id: GroupId::from_uuid(row.group_id),
            user_id: UserId::from_uuid(row.user_id),
            is_admin: row.is_admin,
            joined_at: row.joined_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct InviteRow {
    code: String,
    group_id: Uuid,
    created_by: Uuid,
    expires_at: DateTime<Utc>,
    used_by: Option<Uuid>,
    used_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<InviteRow> for GroupInvite {
    fn from(row: InviteRow) -> Self {
        Self {
            code: row.code,
            group_id: GroupId::from_uuid(row.group_id),
            created_by: UserId::from_uuid(row.created_by),
            expires_at: row.expires_at,
            used_by: row.used_by.map(UserId::from_uuid),
            used_at: row.used_at,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct VirtualMemberRow {
    id: Uuid,
    group_id: Uuid,
    name: String,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<VirtualMemberRow> for VirtualMember {
    fn from(row: VirtualMemberRow) -> Self {
        Self {
            id: VirtualMemberId::from_uuid(row.id),
            group_id: GroupId::from_uuid(row.group_id),
            name: row.name,
            created_by: UserId::from_uuid(row.created_by),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl GroupRepository for PgGroupRepository {
    async fn find_by_id(&self, id: GroupId) -> LarderResult<Option<UserGroup>> {
        let row = sqlx::query_as::<_, GroupRow>(&format!(
            "SELECT {GROUP_COLUMNS} FROM user_groups WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserGroup::from))
    }

    async fn find_by_member(&self, user_id: UserId) -> LarderResult<Vec<UserGroup>> {
        let rows = sqlx::query_as::<_, GroupRow>(
            r#"
            SELECT g.id, g.title, g.description, g.created_by, g.created_at, g.updated_at
            FROM user_groups g
            JOIN group_members m ON m.group_id = g.id
            WHERE m.user_id = $1
            ORDER BY g.title
            "#,
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(UserGroup::from).collect())
    }

    async fn exists_by_creator_and_title(
        &self,
        created_by: UserId,
        title: &str,
        exclude: Option<GroupId>,
    ) -> LarderResult<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM user_groups
                WHERE created_by = $1 AND LOWER(title) = LOWER($2) AND ($3::uuid IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(created_by.into_inner())
        .bind(title)
        .bind(exclude.map(GroupId::into_inner))
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn save(&self, group: &UserGroup) -> LarderResult<UserGroup> {
        debug!("Saving group: {}", group.title);

        let row = sqlx::query_as::<_, GroupRow>(&format!(
            r#"
            INSERT INTO user_groups (id, title, description, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {GROUP_COLUMNS}
            "#
        ))
        .bind(group.id.into_inner())
        .bind(&group.title)
        .bind(&group.description)
        .bind(group.created_by.into_inner())
        .bind(group.created_at)
        .bind(group.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update(&self, group: &UserGroup) -> LarderResult<UserGroup> {
        let row = sqlx::query_as::<_, GroupRow>(&format!(
            r#"
            UPDATE user_groups
            SET title = $2, description = $3, updated_at = $4
            WHERE id = $1
            RETURNING {GROUP_COLUMNS}
            "#
        ))
        .bind(group.id.into_inner())
        .bind(&group.title)
        .bind(&group.description)
        .bind(group.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn delete(&self, id: GroupId) -> LarderResult<bool> {
        debug!("Deleting group: {}", id);

        let result = sqlx::query("DELETE FROM user_groups WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_members(&self, group_id: GroupId) -> LarderResult<Vec<GroupMember>> {
        let rows = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM group_members WHERE group_id = $1 ORDER BY joined_at"
        ))
        .bind(group_id.into_inner())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(GroupMember::from).collect())
    }

    async fn find_member(&self, group_id: GroupId, user_id: UserId) -> LarderResult<Option<GroupMember>> {
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM group_members WHERE group_id = $1 AND user_id = $2"
        ))
        .bind(group_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(GroupMember::from))
    }

    async fn save_member(&self, member: &GroupMember) -> LarderResult<GroupMember> {
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            r#"
            INSERT INTO group_members (group_id, user_id, is_admin, joined_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {MEMBER_COLUMNS}
            "#
        ))
        .bind(member.group_id.into_inner())
        .bind(member.user_id.into_inner())
        .bind(member.is_admin)
        .bind(member.joined_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update_member(&self, member: &GroupMember) -> LarderResult<GroupMember> {
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            r#"
            UPDATE group_members SET is_admin = $3
            WHERE group_id = $1 AND user_id = $2
            RETURNING {MEMBER_COLUMNS}
            "#
        ))
        .bind(member.group_id.into_inner())
        .bind(member.user_id.into_inner())
        .bind(member.is_admin)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn delete_member(&self, group_id: GroupId, user_id: UserId) -> LarderResult<bool> {
        let result = sqlx::query("DELETE FROM group_members WHERE group_id = $1 AND user_id = $2")
            .bind(group_id.into_inner())
            .bind(user_id.into_inner())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_invite(&self, code: &str) -> LarderResult<Option<GroupInvite>> {
        let row = sqlx::query_as::<_, InviteRow>(&format!(
            "SELECT {INVITE_COLUMNS} FROM group_invites WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(GroupInvite::from))
    }

    async fn save_invite(&self, invite: &GroupInvite) -> LarderResult<GroupInvite> {
        let row = sqlx::query_as::<_, InviteRow>(&format!(
            r#"
            INSERT INTO group_invites (code, group_id, created_by, expires_at, used_by, used_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {INVITE_COLUMNS}
            "#
        ))
        .bind(&invite.code)
        .bind(invite.group_id.into_inner())
        .bind(invite.created_by.into_inner())
        .bind(invite.expires_at)
        .bind(invite.used_by.map(UserId::into_inner))
        .bind(invite.used_at)
        .bind(invite.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update_invite(&self, invite: &GroupInvite) -> LarderResult<GroupInvite> {
        let row = sqlx::query_as::<_, InviteRow>(&format!(
            r#"
            UPDATE group_invites SET used_by = $2, used_at = $3
            WHERE code = $1
            RETURNING {INVITE_COLUMNS}
            "#
        ))
        .bind(&invite.code)
        .bind(invite.used_by.map(UserId::into_inner))
        .bind(invite.used_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_virtual_members(&self, group_id: GroupId) -> LarderResult<Vec<VirtualMember>> {
        let rows = sqlx::query_as::<_, VirtualMemberRow>(&format!(
            "SELECT {VIRTUAL_MEMBER_COLUMNS} FROM virtual_members WHERE group_id = $1 ORDER BY name"
        ))
        .bind(group_id.into_inner())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(VirtualMember::from).collect())
    }

    async fn find_virtual_member(&self, id: VirtualMemberId) -> LarderResult<Option<VirtualMember>> {
        let row = sqlx::query_as::<_, VirtualMemberRow>(&format!(
            "SELECT {VIRTUAL_MEMBER_COLUMNS} FROM virtual_members WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(VirtualMember::from))
    }

    async fn save_virtual_member(&self, member: &VirtualMember) -> LarderResult<VirtualMember> {
        let row = sqlx::query_as::<_, VirtualMemberRow>(&format!(
            r#"
            INSERT INTO virtual_members (id, group_id, name, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {VIRTUAL_MEMBER_COLUMNS}
            "#
        ))
        .bind(member.id.into_inner())
        .bind(member.group_id.into_inner())
        .bind(&member.name)
        .bind(member.created_by.into_inner())
        .bind(member.created_at)
        .bind(member.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update_virtual_member(&self, member: &VirtualMember) -> LarderResult<VirtualMember> {
        let row = sqlx::query_as::<_, VirtualMemberRow>(&format!(
            r#"
            UPDATE virtual_members SET name = $2, updated_at = $3
            WHERE id = $1
            RETURNING {VIRTUAL_MEMBER_COLUMNS}
            "#
        ))
        .bind(member.id.into_inner())
        .bind(&member.name)
        .bind(member.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn delete_virtual_member(&self, id: VirtualMemberId) -> LarderResult<bool> {
        let result = sqlx::query("DELETE FROM virtual_members WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

//! User group, membership, invite and virtual member entities.

use crate::{GroupId, UserId, VirtualMemberId};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A household or team sharing pantries and shopping lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserGroup {
    pub id: GroupId,
    pub title: String,
    pub description: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserGroup {
    #[must_use]
    pub fn new(title: String, description: Option<String>, created_by: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: GroupId::new(),
            title,
            description,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Membership of a user in a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    pub group_id: GroupId,
    pub user_id: UserId,
    pub is_admin: bool,
    pub joined_at: DateTime<Utc>,
}

impl GroupMember {
    #[must_use]
    pub fn new(group_id: GroupId, user_id: UserId, is_admin: bool) -> Self {
        Self {
            group_id,
            user_id,
            is_admin,
            joined_at: Utc::now(),
        }
    }
}

/// A single-use code granting membership in a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInvite {
    pub code: String,
    pub group_id: GroupId,
    pub created_by: UserId,
    pub expires_at: DateTime<Utc>,
    pub used_by: Option<UserId>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl GroupInvite {
    pub const CODE_LENGTH: usize = 8;
    pub const VALIDITY_DAYS: i64 = 7;

    #[must_use]
    pub fn new(code: String, group_id: GroupId, created_by: UserId) -> Self {
        let now = Utc::now();
        Self {
            code,
            group_id,
            created_by,
            expires_at: now + Duration::days(Self::VALIDITY_DAYS),
            used_by: None,
            used_at: None,
            created_at: now,
        }
    }

    #[must_use]
    pub fn is_used(&self) -> bool {
        self.used_by.is_some()
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn mark_used(&mut self, by: UserId) {
        self.used_by = Some(by);
        self.used_at = Some(Utc::now());
    }
}

/// A group participant without an account (a child, a guest).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualMember {
    pub id: VirtualMemberId,
    pub group_id: GroupId,
    pub name: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VirtualMember {
    #[must_use]
    pub fn new(group_id: GroupId, name: String, created_by: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: VirtualMemberId::new(),
            group_id,
            name,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

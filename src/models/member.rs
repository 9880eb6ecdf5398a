use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// Role stored as VARCHAR in Members_
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum MemberRole {
    Admin,
    Member,
}

impl MemberRole {
    // An admin can do everything a member can
    pub fn satisfies(self, required: MemberRole) -> bool {
        match required {
            MemberRole::Member => true,
            MemberRole::Admin => self == MemberRole::Admin,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Member {
    pub member_id: i32,
    pub user_id: i32,
    pub workspace_id: i32,
    pub role: MemberRole,
    pub color: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_satisfies_both_roles() {
        assert!(MemberRole::Admin.satisfies(MemberRole::Admin));
        assert!(MemberRole::Admin.satisfies(MemberRole::Member));
    }

    #[test]
    fn member_does_not_satisfy_admin() {
        assert!(MemberRole::Member.satisfies(MemberRole::Member));
        assert!(!MemberRole::Member.satisfies(MemberRole::Admin));
    }

    #[test]
    fn role_uses_uppercase_wire_format() {
        assert_eq!(serde_json::to_string(&MemberRole::Admin).unwrap(), "\"ADMIN\"");
        let role: MemberRole = serde_json::from_str("\"MEMBER\"").unwrap();
        assert_eq!(role, MemberRole::Member);
    }
}

//! 역할 기반 접근 제어 (RBAC).
//!
//! 사용자 역할 및 권한 정의.
//!
//! 역할→권한 매핑은 프로세스 시작 시점에 고정되는 정적 테이블이며
//! 런타임에 변경되지 않습니다. 계정의 유효 권한 집합은 보유한 모든 역할의
//! 권한 합집합에 역할별 `ROLE_<이름>` 태그를 더한 것입니다.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// 사용자 역할.
///
/// 닫힌 집합이며 각 역할은 정적으로 정의된 권한 집합을 가집니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// 관리자 - 전체 리소스에 대한 CRUD 권한
    Admin,
    /// 프로덕트 오너 - 태스크/스프린트/목표 관리
    ProductOwner,
    /// 스크럼 마스터 - 스프린트 운영 및 태스크 조정
    ScrumMaster,
    /// 개발자 - 태스크 수행
    Developer,
    /// 테스터 - 태스크/목표 조회
    Tester,
    /// 이해관계자 - 읽기 전용 조회
    Stakeholder,
}

impl Role {
    /// 역할에 정적으로 부여된 권한 집합 반환.
    pub fn permissions(&self) -> &'static [Permission] {
        use Permission::*;
        match self {
            Role::Admin => &[
                UserRead, UserCreate, UserUpdate, UserDelete,
                TaskRead, TaskCreate, TaskUpdate, TaskDelete,
                SprintRead, SprintCreate, SprintUpdate, SprintDelete,
                GoalRead, GoalCreate, GoalUpdate, GoalDelete,
            ],
            Role::ProductOwner => &[
                TaskRead, TaskCreate, TaskUpdate,
                SprintRead, SprintCreate, SprintUpdate,
                GoalRead, GoalCreate, GoalUpdate,
            ],
            Role::ScrumMaster => &[
                SprintRead, SprintCreate, SprintUpdate,
                TaskRead, TaskUpdate,
                UserRead,
            ],
            Role::Developer => &[TaskRead, TaskUpdate, GoalRead],
            Role::Tester => &[TaskRead, GoalRead],
            Role::Stakeholder => &[GoalRead, SprintRead],
        }
    }

    /// 역할 이름 반환 (저장/전송 형식).
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::ProductOwner => "PRODUCT_OWNER",
            Role::ScrumMaster => "SCRUM_MASTER",
            Role::Developer => "DEVELOPER",
            Role::Tester => "TESTER",
            Role::Stakeholder => "STAKEHOLDER",
        }
    }

    /// 코스 그레인(coarse-grained) 역할 검사용 태그 권한 반환.
    pub fn tag(&self) -> String {
        format!("ROLE_{}", self.as_str())
    }

    /// 문자열에서 역할 파싱.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ADMIN" => Some(Role::Admin),
            "PRODUCT_OWNER" => Some(Role::ProductOwner),
            "SCRUM_MASTER" => Some(Role::ScrumMaster),
            "DEVELOPER" => Some(Role::Developer),
            "TESTER" => Some(Role::Tester),
            "STAKEHOLDER" => Some(Role::Stakeholder),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 시스템 권한.
///
/// `<리소스>:<행위>` 형식의 불변 능력 문자열에 1:1 대응합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    /// 사용자 조회
    UserRead,
    /// 사용자 생성
    UserCreate,
    /// 사용자 수정
    UserUpdate,
    /// 사용자 삭제
    UserDelete,
    /// 태스크 조회
    TaskRead,
    /// 태스크 생성
    TaskCreate,
    /// 태스크 수정
    TaskUpdate,
    /// 태스크 삭제
    TaskDelete,
    /// 스프린트 조회
    SprintRead,
    /// 스프린트 생성
    SprintCreate,
    /// 스프린트 수정
    SprintUpdate,
    /// 스프린트 삭제
    SprintDelete,
    /// 목표 조회
    GoalRead,
    /// 목표 생성
    GoalCreate,
    /// 목표 수정
    GoalUpdate,
    /// 목표 삭제
    GoalDelete,
}

impl Permission {
    /// 권한의 능력 문자열 반환.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::UserRead => "user:read",
            Permission::UserCreate => "user:create",
            Permission::UserUpdate => "user:update",
            Permission::UserDelete => "user:delete",
            Permission::TaskRead => "task:read",
            Permission::TaskCreate => "task:create",
            Permission::TaskUpdate => "task:update",
            Permission::TaskDelete => "task:delete",
            Permission::SprintRead => "sprint:read",
            Permission::SprintCreate => "sprint:create",
            Permission::SprintUpdate => "sprint:update",
            Permission::SprintDelete => "sprint:delete",
            Permission::GoalRead => "goal:read",
            Permission::GoalCreate => "goal:create",
            Permission::GoalUpdate => "goal:update",
            Permission::GoalDelete => "goal:delete",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 역할 집합의 유효 권한(authority) 집합을 계산합니다.
///
/// 순수 함수이며 실패하지 않습니다. 빈 역할 집합은 빈 권한 집합을
/// 반환하며, 이후의 모든 권한 검사는 거부됩니다.
pub fn authorities_of(roles: &[Role]) -> BTreeSet<String> {
    let mut authorities = BTreeSet::new();
    for role in roles {
        for permission in role.permissions() {
            authorities.insert(permission.as_str().to_string());
        }
        authorities.insert(role.tag());
    }
    authorities
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_has_all_crud_permissions() {
        let perms = Role::Admin.permissions();
        assert_eq!(perms.len(), 16);
        assert!(perms.contains(&Permission::UserDelete));
        assert!(perms.contains(&Permission::GoalDelete));
    }

    #[test]
    fn test_developer_permissions_are_narrow() {
        let perms = Role::Developer.permissions();
        assert!(perms.contains(&Permission::TaskRead));
        assert!(perms.contains(&Permission::TaskUpdate));
        assert!(perms.contains(&Permission::GoalRead));
        assert!(!perms.contains(&Permission::TaskCreate));
        assert!(!perms.contains(&Permission::UserRead));
    }

    #[test]
    fn test_authorities_include_role_tag() {
        let authorities = authorities_of(&[Role::Tester]);
        assert!(authorities.contains("ROLE_TESTER"));
        assert!(authorities.contains("task:read"));
        assert!(authorities.contains("goal:read"));
        assert_eq!(authorities.len(), 3);
    }

    #[test]
    fn test_authorities_are_union_over_roles() {
        let authorities = authorities_of(&[Role::Developer, Role::Tester]);
        // 중복 권한(task:read, goal:read)은 한 번만 포함
        assert!(authorities.contains("ROLE_DEVELOPER"));
        assert!(authorities.contains("ROLE_TESTER"));
        assert!(authorities.contains("task:update"));
        assert_eq!(authorities.len(), 5);
    }

    #[test]
    fn test_empty_role_set_yields_empty_authorities() {
        let authorities = authorities_of(&[]);
        assert!(authorities.is_empty());
    }

    #[test]
    fn test_role_parse_and_display() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("PRODUCT_OWNER"), Some(Role::ProductOwner));
        assert_eq!(Role::parse("Scrum_Master"), Some(Role::ScrumMaster));
        assert_eq!(Role::parse("unknown"), None);
        assert_eq!(Role::ScrumMaster.to_string(), "SCRUM_MASTER");
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Role::ProductOwner).unwrap();
        assert_eq!(json, "\"PRODUCT_OWNER\"");

        let parsed: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Role::ProductOwner);
    }
}

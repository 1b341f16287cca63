// src/services/permissions.rs

use std::collections::BTreeMap;

use crate::models::{
    auth::SessionUser,
    rbac::{Role, RoleOption},
    tenancy::UserShopAssignment,
};

// ---
// Tabela única de política de cargos.
// ---
// Tudo que depende do cargo (autorização, opções do seletor, acesso ao
// painel, troca de loja) é lido daqui. Não existe uma segunda lista.
pub struct RolePolicy {
    pub role: Role,
    /// Posição na hierarquia (maior = mais privilégio).
    pub rank: u8,
    pub label: &'static str,
    pub color: &'static str,
    pub assignable: &'static [Role],
    pub dashboard: bool,
    pub switch_shops: bool,
    /// Pode gerenciar membros e cadastros da loja (tecidos, catálogo, notas).
    pub manages_shop: bool,
}

const STAFF_AND_USER: &[Role] = &[
    Role::Salesman,
    Role::Tailor,
    Role::EmbroideryMan,
    Role::StoneMan,
    Role::User,
];

const MANAGER_AND_BELOW: &[Role] = &[
    Role::Manager,
    Role::Salesman,
    Role::Tailor,
    Role::EmbroideryMan,
    Role::StoneMan,
    Role::User,
];

static POLICY: [RolePolicy; 8] = [
    RolePolicy {
        role: Role::SuperAdmin,
        rank: 4,
        label: "Super Administrador",
        color: "purple",
        assignable: &Role::ALL,
        dashboard: true,
        switch_shops: true,
        manages_shop: true,
    },
    RolePolicy {
        role: Role::Admin,
        rank: 3,
        label: "Administrador",
        color: "red",
        assignable: MANAGER_AND_BELOW,
        dashboard: true,
        switch_shops: true,
        manages_shop: true,
    },
    RolePolicy {
        role: Role::Manager,
        rank: 2,
        label: "Gerente",
        color: "blue",
        assignable: STAFF_AND_USER,
        dashboard: true,
        switch_shops: false,
        manages_shop: true,
    },
    RolePolicy {
        role: Role::Salesman,
        rank: 1,
        label: "Vendedor",
        color: "green",
        assignable: &[],
        dashboard: true,
        switch_shops: false,
        manages_shop: false,
    },
    RolePolicy {
        role: Role::Tailor,
        rank: 1,
        label: "Alfaiate",
        color: "orange",
        assignable: &[],
        dashboard: true,
        switch_shops: false,
        manages_shop: false,
    },
    RolePolicy {
        role: Role::EmbroideryMan,
        rank: 1,
        label: "Bordadeiro",
        color: "pink",
        assignable: &[],
        dashboard: true,
        switch_shops: false,
        manages_shop: false,
    },
    RolePolicy {
        role: Role::StoneMan,
        rank: 1,
        label: "Pedrista",
        color: "teal",
        assignable: &[],
        dashboard: true,
        switch_shops: false,
        manages_shop: false,
    },
    RolePolicy {
        role: Role::User,
        rank: 0,
        label: "Usuário",
        color: "gray",
        assignable: &[],
        dashboard: false,
        switch_shops: false,
        manages_shop: false,
    },
];

/// Entrada da tabela. Sem cargo = cargo base (`user`).
pub fn policy(role: Option<Role>) -> &'static RolePolicy {
    let role = role.unwrap_or(Role::User);
    POLICY
        .iter()
        .find(|p| p.role == role)
        .unwrap_or(&POLICY[POLICY.len() - 1])
}

pub fn assignable_roles(role: Option<Role>) -> &'static [Role] {
    policy(role).assignable
}

pub fn can_assign_role(acting: Option<Role>, target: Role) -> bool {
    assignable_roles(acting).contains(&target)
}

pub fn can_access_dashboard(role: Option<Role>) -> bool {
    policy(role).dashboard
}

pub fn can_switch_shops(role: Option<Role>) -> bool {
    policy(role).switch_shops
}

pub fn can_manage_shop(role: Option<Role>) -> bool {
    policy(role).manages_shop
}

/// Opções do seletor de cargos, na ordem da hierarquia.
pub fn role_options(acting: Option<Role>) -> Vec<RoleOption> {
    assignable_roles(acting)
        .iter()
        .map(|role| {
            let p = policy(Some(*role));
            RoleOption {
                value: p.role,
                label: p.label.to_string(),
                color: p.color.to_string(),
            }
        })
        .collect()
}

/// Cargo efetivo: o mais alto entre as atribuições ATIVAS.
pub fn effective_role(assignments: &[UserShopAssignment]) -> Option<Role> {
    assignments
        .iter()
        .filter(|a| a.is_active())
        .map(|a| policy(Some(a.role)))
        .max_by_key(|p| p.rank)
        .map(|p| p.role)
}

/// Cargo por loja: o mais alto entre as atribuições ativas de cada loja.
pub fn shop_roles(assignments: &[UserShopAssignment]) -> BTreeMap<String, Role> {
    let mut roles: BTreeMap<String, Role> = BTreeMap::new();
    for assignment in assignments.iter().filter(|a| a.is_active()) {
        let Some(shop) = assignment.shop_id.as_ref() else { continue };
        roles
            .entry(shop.id().to_string())
            .and_modify(|current| {
                if policy(Some(assignment.role)).rank > policy(Some(*current)).rank {
                    *current = assignment.role;
                }
            })
            .or_insert(assignment.role);
    }
    roles
}

/// Cargo que vale dentro de uma loja. O nível admin vale em todas; os
/// outros cargos só na loja da própria atribuição.
pub fn role_in_shop(user: &SessionUser, shop_id: &str) -> Option<Role> {
    if can_switch_shops(user.role) {
        return user.role;
    }
    user.shop_roles.get(shop_id).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::reference::DocRef, models::rbac::AssignmentStatus};

    fn rank(role: Role) -> u8 {
        policy(Some(role)).rank
    }

    #[test]
    fn every_role_has_exactly_one_policy_entry() {
        for role in Role::ALL {
            assert_eq!(POLICY.iter().filter(|p| p.role == role).count(), 1, "{role}");
        }
    }

    #[test]
    fn no_role_assigns_itself_or_above_except_super_admin() {
        for acting in Role::ALL {
            for target in assignable_roles(Some(acting)) {
                if acting == Role::SuperAdmin {
                    continue;
                }
                assert!(rank(acting) > rank(*target), "{acting} não pode atribuir {target}");
            }
            if acting != Role::SuperAdmin {
                assert!(!can_assign_role(Some(acting), acting));
            }
        }
        assert!(can_assign_role(Some(Role::SuperAdmin), Role::SuperAdmin));
        assert!(can_assign_role(Some(Role::SuperAdmin), Role::Admin));
    }

    #[test]
    fn admin_and_manager_grants() {
        assert!(!can_assign_role(Some(Role::Admin), Role::Admin));
        assert!(!can_assign_role(Some(Role::Admin), Role::SuperAdmin));
        assert!(can_assign_role(Some(Role::Admin), Role::Manager));
        assert!(!can_assign_role(Some(Role::Manager), Role::Manager));
        assert!(can_assign_role(Some(Role::Manager), Role::Tailor));
        assert!(assignable_roles(Some(Role::Salesman)).is_empty());
        assert!(assignable_roles(None).is_empty());
    }

    #[test]
    fn dashboard_excludes_exactly_the_base_role() {
        for role in Role::ALL {
            assert_eq!(can_access_dashboard(Some(role)), role != Role::User, "{role}");
        }
        assert!(!can_access_dashboard(None));
    }

    #[test]
    fn only_admin_tier_switches_shops() {
        for role in Role::ALL {
            let expected = matches!(role, Role::Admin | Role::SuperAdmin);
            assert_eq!(can_switch_shops(Some(role)), expected, "{role}");
        }
    }

    #[test]
    fn role_options_follow_the_authorization_table() {
        for acting in Role::ALL {
            let values: Vec<Role> = role_options(Some(acting)).into_iter().map(|o| o.value).collect();
            assert_eq!(values, assignable_roles(Some(acting)));
        }
        let manager = role_options(Some(Role::Admin));
        assert_eq!(manager[0].label, "Gerente");
    }

    #[test]
    fn effective_role_ignores_inactive_rows() {
        let row = |role, status, shop: Option<&str>| UserShopAssignment {
            id: format!("{role}"),
            user_id: DocRef::new("u1"),
            shop_id: shop.map(DocRef::new),
            role,
            status,
            updated_at: None,
        };

        let rows = vec![
            row(Role::User, AssignmentStatus::Inactive, None),
            row(Role::Admin, AssignmentStatus::Inactive, Some("s1")),
            row(Role::Salesman, AssignmentStatus::Active, Some("s2")),
            row(Role::Manager, AssignmentStatus::Active, Some("s3")),
        ];

        assert_eq!(effective_role(&rows), Some(Role::Manager));
        assert_eq!(effective_role(&rows[..2]), None);
    }

    #[test]
    fn roles_are_resolved_per_shop() {
        let row = |role, status, shop: &str| UserShopAssignment {
            id: format!("{role}-{shop}"),
            user_id: DocRef::new("u1"),
            shop_id: Some(DocRef::new(shop)),
            role,
            status,
            updated_at: None,
        };
        let rows = vec![
            row(Role::Manager, AssignmentStatus::Active, "a"),
            row(Role::Salesman, AssignmentStatus::Active, "b"),
            row(Role::Admin, AssignmentStatus::Inactive, "b"),
        ];

        let roles = shop_roles(&rows);
        assert_eq!(roles.get("a"), Some(&Role::Manager));
        assert_eq!(roles.get("b"), Some(&Role::Salesman));

        let mut user = crate::services::test_support::session_user("u1", effective_role(&rows), &[]);
        user.shop_roles = roles;
        assert_eq!(role_in_shop(&user, "a"), Some(Role::Manager));
        assert_eq!(role_in_shop(&user, "b"), Some(Role::Salesman));
        assert_eq!(role_in_shop(&user, "c"), None);
        assert!(!can_manage_shop(role_in_shop(&user, "b")));

        // Nível admin vale em qualquer loja.
        let admin = crate::services::test_support::session_user("adm", Some(Role::Admin), &["a"]);
        assert_eq!(role_in_shop(&admin, "z"), Some(Role::Admin));
    }
}

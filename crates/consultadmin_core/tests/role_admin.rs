use consultadmin_core::db::open_db_in_memory;
use consultadmin_core::model::outcome::{
    CODE_DUPLICATE_ROLE_NAME, CODE_INVALID_ROLE_NAME, CODE_ROLE_NOT_FOUND,
};
use consultadmin_core::{
    Account, AccountStore, CreateRoleRequest, CredentialHasher, Outcome, OutcomeError, RepoResult,
    Role, RoleAdmin, RoleStore, SqliteAccountStore, SqliteRoleStore, UpdateRoleRequest,
};
use rusqlite::Connection;
use std::collections::HashSet;

fn accounts(conn: &Connection) -> SqliteAccountStore<'_> {
    SqliteAccountStore::with_hasher(conn, CredentialHasher::with_cost(8, 1).unwrap())
}

fn admin(conn: &Connection) -> RoleAdmin<SqliteAccountStore<'_>, SqliteRoleStore<'_>> {
    RoleAdmin::new(accounts(conn), SqliteRoleStore::new(conn))
}

fn seed_role(conn: &Connection, id: &str, name: &str) -> Role {
    let role = Role::with_id(id, name);
    assert!(SqliteRoleStore::new(conn).create(&role).unwrap().succeeded);
    role
}

fn seed_holder(conn: &Connection, id: &str, role_name: &str) -> Account {
    let store = accounts(conn);
    let account = Account::with_id(id, id, format!("{id}@example.com"));
    assert!(store.create(&account, "Password123!").unwrap().succeeded);
    assert!(store.assign_role(&account, role_name).unwrap().succeeded);
    account
}

#[test]
fn create_role_valid_role_returns_success() {
    let conn = open_db_in_memory().unwrap();
    let admin = admin(&conn);

    let outcome = admin
        .create_role(&CreateRoleRequest {
            role_name: "NewRole".to_string(),
        })
        .unwrap();

    assert!(outcome.succeeded);
    let roles = admin.list_roles().unwrap();
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0].name, "NewRole");
}

#[test]
fn create_role_surfaces_store_rejections() {
    let conn = open_db_in_memory().unwrap();
    let admin = admin(&conn);
    seed_role(&conn, "1", "Admin");

    let duplicate = admin
        .create_role(&CreateRoleRequest {
            role_name: "Admin".to_string(),
        })
        .unwrap();
    assert!(!duplicate.succeeded);
    assert!(duplicate.has_code(CODE_DUPLICATE_ROLE_NAME));

    let blank = admin
        .create_role(&CreateRoleRequest {
            role_name: "   ".to_string(),
        })
        .unwrap();
    assert!(!blank.succeeded);
    assert!(blank.has_code(CODE_INVALID_ROLE_NAME));
    assert_eq!(admin.list_roles().unwrap().len(), 1);
}

#[test]
fn role_names_are_unique_ignoring_case() {
    let conn = open_db_in_memory().unwrap();
    let admin = admin(&conn);
    seed_role(&conn, "1", "Admin");
    seed_role(&conn, "2", "Manager");

    let duplicate = admin
        .create_role(&CreateRoleRequest {
            role_name: "admin".to_string(),
        })
        .unwrap();
    assert!(duplicate.has_code(CODE_DUPLICATE_ROLE_NAME));

    let rename = admin
        .update_role(&UpdateRoleRequest {
            role_id: "2".to_string(),
            role_name: "ADMIN".to_string(),
        })
        .unwrap();
    assert!(rename.has_code(CODE_DUPLICATE_ROLE_NAME));

    let recase = admin
        .update_role(&UpdateRoleRequest {
            role_id: "1".to_string(),
            role_name: "ADMIN".to_string(),
        })
        .unwrap();
    assert!(recase.succeeded, "{recase}");

    let names: Vec<String> = admin
        .list_roles()
        .unwrap()
        .into_iter()
        .map(|role| role.name)
        .collect();
    assert_eq!(names, vec!["ADMIN".to_string(), "Manager".to_string()]);
}

#[test]
fn update_role_valid_role_renames_and_keeps_id() {
    let conn = open_db_in_memory().unwrap();
    let admin = admin(&conn);
    seed_role(&conn, "1", "OldRole");

    let outcome = admin
        .update_role(&UpdateRoleRequest {
            role_id: "1".to_string(),
            role_name: "UpdatedRole".to_string(),
        })
        .unwrap();

    assert!(outcome.succeeded);
    let role = admin.get_role_by_id("1").unwrap().unwrap();
    assert_eq!(role.id, "1");
    assert_eq!(role.name, "UpdatedRole");
}

#[test]
fn update_role_to_taken_name_fails() {
    let conn = open_db_in_memory().unwrap();
    let admin = admin(&conn);
    seed_role(&conn, "1", "Admin");
    seed_role(&conn, "2", "Manager");

    let outcome = admin
        .update_role(&UpdateRoleRequest {
            role_id: "2".to_string(),
            role_name: "Admin".to_string(),
        })
        .unwrap();

    assert!(outcome.has_code(CODE_DUPLICATE_ROLE_NAME));
    assert_eq!(admin.get_role_by_id("2").unwrap().unwrap().name, "Manager");
}

#[test]
fn update_role_role_not_found_returns_failure() {
    let conn = open_db_in_memory().unwrap();
    let admin = admin(&conn);

    let outcome = admin
        .update_role(&UpdateRoleRequest {
            role_id: "1".to_string(),
            role_name: "UpdatedRole".to_string(),
        })
        .unwrap();

    assert!(!outcome.succeeded);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].code, CODE_ROLE_NOT_FOUND);
    assert_eq!(outcome.errors[0].description, "Role with ID 1 not found.");
}

#[test]
fn delete_role_detaches_every_holder_then_deletes() {
    let conn = open_db_in_memory().unwrap();
    let admin = admin(&conn);
    seed_role(&conn, "1", "RoleToDelete");
    seed_role(&conn, "2", "Keep");
    let user1 = seed_holder(&conn, "user1", "RoleToDelete");
    let user2 = seed_holder(&conn, "user2", "RoleToDelete");
    assert!(accounts(&conn).assign_role(&user2, "Keep").unwrap().succeeded);

    let outcome = admin.delete_role("1").unwrap();

    assert!(outcome.succeeded, "{outcome}");
    assert!(admin.get_role_by_id("1").unwrap().is_none());
    let store = accounts(&conn);
    assert!(store.get_users_in_role("RoleToDelete").unwrap().is_empty());
    assert!(store.get_roles(&user1).unwrap().is_empty());
    assert_eq!(store.get_roles(&user2).unwrap(), vec!["Keep".to_string()]);
}

#[test]
fn delete_role_without_holders_succeeds() {
    let conn = open_db_in_memory().unwrap();
    let admin = admin(&conn);
    seed_role(&conn, "1", "Unused");

    assert!(admin.delete_role("1").unwrap().succeeded);
    assert!(admin.list_roles().unwrap().is_empty());
}

#[test]
fn delete_role_role_not_found_returns_failure() {
    let conn = open_db_in_memory().unwrap();
    let admin = admin(&conn);

    let outcome = admin.delete_role("1").unwrap();

    assert!(!outcome.succeeded);
    assert_eq!(outcome.errors, vec![OutcomeError::role_not_found("1")]);
}

/// Account store whose membership removal fails for chosen accounts.
struct FlakyAccounts<'conn> {
    inner: SqliteAccountStore<'conn>,
    fail_for: HashSet<String>,
}

impl AccountStore for FlakyAccounts<'_> {
    fn create(&self, account: &Account, credential: &str) -> RepoResult<Outcome> {
        self.inner.create(account, credential)
    }

    fn find_by_id(&self, id: &str) -> RepoResult<Option<Account>> {
        self.inner.find_by_id(id)
    }

    fn update(&self, account: &Account) -> RepoResult<Outcome> {
        self.inner.update(account)
    }

    fn delete(&self, account: &Account) -> RepoResult<Outcome> {
        self.inner.delete(account)
    }

    fn get_roles(&self, account: &Account) -> RepoResult<Vec<String>> {
        self.inner.get_roles(account)
    }

    fn assign_role(&self, account: &Account, role_name: &str) -> RepoResult<Outcome> {
        self.inner.assign_role(account, role_name)
    }

    fn remove_role(&self, account: &Account, role_name: &str) -> RepoResult<Outcome> {
        if self.fail_for.contains(&account.id) {
            return Ok(Outcome::failed_with(OutcomeError::new(
                "StoreUnavailable",
                format!("cannot detach {} right now", account.id),
            )));
        }
        self.inner.remove_role(account, role_name)
    }

    fn get_users_in_role(&self, role_name: &str) -> RepoResult<Vec<Account>> {
        self.inner.get_users_in_role(role_name)
    }
}

#[test]
fn delete_role_continues_past_failed_removal_and_keeps_role() {
    let conn = open_db_in_memory().unwrap();
    seed_role(&conn, "1", "Auditor");
    seed_holder(&conn, "user1", "Auditor");
    seed_holder(&conn, "user2", "Auditor");
    seed_holder(&conn, "user3", "Auditor");

    let admin = RoleAdmin::new(
        FlakyAccounts {
            inner: accounts(&conn),
            fail_for: HashSet::from(["user2".to_string()]),
        },
        SqliteRoleStore::new(&conn),
    );

    let outcome = admin.delete_role("1").unwrap();

    assert!(!outcome.succeeded);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].code, "StoreUnavailable");
    assert!(admin.get_role_by_id("1").unwrap().is_some());

    let remaining: Vec<String> = accounts(&conn)
        .get_users_in_role("Auditor")
        .unwrap()
        .into_iter()
        .map(|account| account.id)
        .collect();
    assert_eq!(remaining, vec!["user2".to_string()]);
}

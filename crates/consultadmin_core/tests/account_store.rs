use consultadmin_core::db::open_db_in_memory;
use consultadmin_core::model::outcome::{
    CODE_CONCURRENCY_FAILURE, CODE_ROLE_IN_USE, CODE_ROLE_NOT_FOUND, CODE_USER_ALREADY_IN_ROLE,
    CODE_USER_HAS_ROLES, CODE_USER_NOT_IN_ROLE,
};
use consultadmin_core::{
    Account, AccountStore, CredentialHasher, Outcome, Role, RoleStore, SqliteAccountStore,
    SqliteRoleStore,
};
use rusqlite::Connection;

fn accounts(conn: &Connection) -> SqliteAccountStore<'_> {
    SqliteAccountStore::with_hasher(conn, CredentialHasher::with_cost(8, 1).unwrap())
}

fn created(conn: &Connection, id: &str) -> Account {
    let account = Account::with_id(id, id, format!("{id}@example.com")).named("Ada", "Smith");
    assert!(accounts(conn).create(&account, "secret").unwrap().succeeded);
    account
}

#[test]
fn membership_assign_and_remove_report_store_rejections() {
    let conn = open_db_in_memory().unwrap();
    let store = accounts(&conn);
    SqliteRoleStore::new(&conn)
        .create(&Role::with_id("r1", "Admin"))
        .unwrap();
    let account = created(&conn, "a1");

    assert!(store.assign_role(&account, "Admin").unwrap().succeeded);
    let again = store.assign_role(&account, "Admin").unwrap();
    assert!(again.has_code(CODE_USER_ALREADY_IN_ROLE));

    let unknown = store.assign_role(&account, "Ghost").unwrap();
    assert!(unknown.has_code(CODE_ROLE_NOT_FOUND));

    assert!(store.remove_role(&account, "Admin").unwrap().succeeded);
    let not_member = store.remove_role(&account, "Admin").unwrap();
    assert!(not_member.has_code(CODE_USER_NOT_IN_ROLE));
}

#[test]
fn stores_refuse_to_delete_while_memberships_exist() {
    let conn = open_db_in_memory().unwrap();
    let store = accounts(&conn);
    let roles = SqliteRoleStore::new(&conn);
    let role = Role::with_id("r1", "Admin");
    roles.create(&role).unwrap();
    let account = created(&conn, "a1");
    store.assign_role(&account, "Admin").unwrap();

    assert!(store.delete(&account).unwrap().has_code(CODE_USER_HAS_ROLES));
    assert!(roles.delete(&role).unwrap().has_code(CODE_ROLE_IN_USE));

    store.remove_role(&account, "Admin").unwrap();
    assert_eq!(store.delete(&account).unwrap(), Outcome::success());
    assert_eq!(roles.delete(&role).unwrap(), Outcome::success());
}

#[test]
fn writes_against_vanished_rows_report_concurrency_failure() {
    let conn = open_db_in_memory().unwrap();
    let store = accounts(&conn);
    let ghost = Account::with_id("ghost", "ghost", "ghost@example.com");

    assert!(store.update(&ghost).unwrap().has_code(CODE_CONCURRENCY_FAILURE));
    assert!(store.delete(&ghost).unwrap().has_code(CODE_CONCURRENCY_FAILURE));

    let roles = SqliteRoleStore::new(&conn);
    let ghost_role = Role::with_id("ghost", "Ghost");
    assert!(roles.update(&ghost_role).unwrap().has_code(CODE_CONCURRENCY_FAILURE));
}

#[test]
fn get_users_in_unknown_role_is_empty() {
    let conn = open_db_in_memory().unwrap();
    created(&conn, "a1");

    assert!(accounts(&conn).get_users_in_role("Nobody").unwrap().is_empty());
}

#[test]
fn outcome_serializes_with_flat_error_entries() {
    let conn = open_db_in_memory().unwrap();
    let roles = SqliteRoleStore::new(&conn);
    roles.create(&Role::with_id("r1", "Admin")).unwrap();

    let outcome = roles.create(&Role::with_id("r2", "Admin")).unwrap();
    let json = serde_json::to_value(&outcome).unwrap();

    assert_eq!(json["succeeded"], serde_json::json!(false));
    assert_eq!(json["errors"][0]["code"], serde_json::json!("DuplicateRoleName"));
    assert_eq!(
        json["errors"][0]["description"],
        serde_json::json!("Role name 'Admin' is already taken.")
    );
}

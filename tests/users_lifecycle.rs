
#[path = "../src/model.rs"]
#[allow(dead_code)]
mod model;

#[path = "../src/codec.rs"]
#[allow(dead_code)]
mod codec;

#[path = "../src/store.rs"]
#[allow(dead_code)]
mod store;

use model::Role;
use store::{Store, UserOpError};
use test_support::temp_dir;

#[test]
fn add_user_assigns_role_prefixed_sequential_ids() {
    let dir = temp_dir("rollbook-users-ids");
    let store = Store::new(&dir).expect("open store");
    let mut users = store.load_users();

    let s1 = store
        .add_user(&mut users, "student1", "pw", Role::Student)
        .expect("add first student");
    assert_eq!(s1.user_id, "S-001");
    assert!(s1.is_active);

    let s2 = store
        .add_user(&mut users, "student2", "pw", Role::Student)
        .expect("add second student");
    assert_eq!(s2.user_id, "S-002");

    let t1 = store
        .add_user(&mut users, "teacher1", "pw", Role::Teacher)
        .expect("add first teacher");
    assert_eq!(t1.user_id, "T-001");

    // The collection was persisted after each add.
    let reloaded = store.load_users();
    assert_eq!(reloaded, users);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn sequence_continues_past_existing_ids() {
    let dir = temp_dir("rollbook-users-seq");
    let store = Store::new(&dir).expect("open store");
    let mut users = store.load_users();

    store
        .add_user(&mut users, "a", "pw", Role::Student)
        .expect("add S-001");
    store
        .add_user(&mut users, "b", "pw", Role::Student)
        .expect("add S-002");
    store
        .delete_user(&mut users, "S-001")
        .expect("delete S-001");

    // Ids are never reused: the next student continues from the highest
    // sequence still present.
    let next = store
        .add_user(&mut users, "c", "pw", Role::Student)
        .expect("add after delete");
    assert_eq!(next.user_id, "S-003");

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn duplicate_username_is_rejected_without_mutation() {
    let dir = temp_dir("rollbook-users-dup");
    let store = Store::new(&dir).expect("open store");
    let mut users = store.load_users();

    store
        .add_user(&mut users, "student1", "pw", Role::Student)
        .expect("add student");
    let before = users.clone();

    let err = store
        .add_user(&mut users, "student1", "other", Role::Student)
        .unwrap_err();
    // Distinct from a persistence failure, and the collection is untouched.
    assert_eq!(err, UserOpError::DuplicateUsername);
    assert_eq!(users, before);
    assert_eq!(store.load_users(), before);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn update_user_changes_username_and_active_flag_only() {
    let dir = temp_dir("rollbook-users-update");
    let store = Store::new(&dir).expect("open store");
    let mut users = store.load_users();

    let added = store
        .add_user(&mut users, "student1", "pw", Role::Student)
        .expect("add student");

    store
        .update_user(&mut users, &added.user_id, Some("renamed"), Some(false))
        .expect("update student");

    let reloaded = store.load_users();
    assert_eq!(reloaded[0].username, "renamed");
    assert!(!reloaded[0].is_active);
    assert_eq!(reloaded[0].user_id, added.user_id);
    assert_eq!(reloaded[0].password, added.password);
    assert_eq!(reloaded[0].role, added.role);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn update_to_a_taken_username_is_rejected() {
    let dir = temp_dir("rollbook-users-update-dup");
    let store = Store::new(&dir).expect("open store");
    let mut users = store.load_users();

    store
        .add_user(&mut users, "student1", "pw", Role::Student)
        .expect("add student1");
    let other = store
        .add_user(&mut users, "student2", "pw", Role::Student)
        .expect("add student2");

    let err = store
        .update_user(&mut users, &other.user_id, Some("student1"), None)
        .unwrap_err();
    assert_eq!(err, UserOpError::DuplicateUsername);
    assert_eq!(users[1].username, "student2");

    // Renaming to its own current name is not a collision.
    store
        .update_user(&mut users, &other.user_id, Some("student2"), Some(true))
        .expect("self rename");

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn unknown_user_operations_fail_cleanly() {
    let dir = temp_dir("rollbook-users-unknown");
    let store = Store::new(&dir).expect("open store");
    let mut users = store.load_users();

    assert_eq!(
        store.update_user(&mut users, "S-999", Some("x"), None),
        Err(UserOpError::UnknownUser)
    );
    assert_eq!(
        store.delete_user(&mut users, "S-999"),
        Err(UserOpError::UnknownUser)
    );

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn delete_user_removes_the_record_and_persists() {
    let dir = temp_dir("rollbook-users-delete");
    let store = Store::new(&dir).expect("open store");
    let mut users = store.load_users();

    let a = store
        .add_user(&mut users, "a", "pw", Role::Student)
        .expect("add a");
    store
        .add_user(&mut users, "b", "pw", Role::Student)
        .expect("add b");

    store.delete_user(&mut users, &a.user_id).expect("delete a");
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].username, "b");
    assert_eq!(store.load_users(), users);

    let _ = std::fs::remove_dir_all(dir);
}

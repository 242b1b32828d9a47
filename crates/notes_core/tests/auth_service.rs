use notes_core::db::open_db_in_memory;
use notes_core::{
    check_password, prepare_account, AuthError, AuthService, Principal, SqliteUserRepository,
    UserRepository,
};
use rusqlite::Connection;
use std::time::Duration;

const PASSWORD: &str = "correct horse battery";

fn service(conn: &Connection) -> AuthService<SqliteUserRepository<'_>> {
    AuthService::new(SqliteUserRepository::try_new(conn).unwrap())
}

fn session_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM sessions;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn sign_up_stores_hashed_password() {
    let conn = open_db_in_memory().unwrap();
    let user = service(&conn).sign_up("Автор", PASSWORD, PASSWORD).unwrap();
    assert_eq!(user.username, "Автор");

    let credentials = SqliteUserRepository::try_new(&conn)
        .unwrap()
        .find_credentials("Автор")
        .unwrap()
        .unwrap();
    assert_eq!(credentials.user, user);
    assert_ne!(credentials.password_hash, PASSWORD);
    assert!(credentials.password_hash.starts_with("$argon2"));
}

#[test]
fn sign_up_rejects_mismatch_short_password_and_duplicates() {
    let conn = open_db_in_memory().unwrap();
    let auth = service(&conn);

    assert!(matches!(
        auth.sign_up("reader", PASSWORD, "something else"),
        Err(AuthError::PasswordMismatch)
    ));
    assert!(matches!(
        auth.sign_up("reader", "short", "short"),
        Err(AuthError::InvalidPassword(_))
    ));
    assert!(matches!(
        auth.sign_up("two words", PASSWORD, PASSWORD),
        Err(AuthError::InvalidUsername(_))
    ));

    auth.sign_up("reader", PASSWORD, PASSWORD).unwrap();
    let err = auth.sign_up("reader", PASSWORD, PASSWORD).unwrap_err();
    assert!(matches!(err, AuthError::UsernameTaken(_)));
    assert!(err.is_user_error());
}

#[test]
fn log_in_then_authenticate_resolves_user() {
    let conn = open_db_in_memory().unwrap();
    let auth = service(&conn);
    let user = auth.create_user("reader", PASSWORD).unwrap();

    let session = auth.log_in("reader", PASSWORD).unwrap();
    assert_eq!(session.user, user);
    assert!(!session.token.is_empty());

    let principal = auth.authenticate(Some(&session.token)).unwrap();
    assert_eq!(principal, Principal::Authenticated(user));
}

#[test]
fn wrong_password_and_unknown_user_fail_identically() {
    let conn = open_db_in_memory().unwrap();
    let auth = service(&conn);
    auth.create_user("reader", PASSWORD).unwrap();

    let wrong_password = auth.log_in("reader", "not the password").unwrap_err();
    let unknown_user = auth.log_in("nobody", PASSWORD).unwrap_err();

    assert!(matches!(wrong_password, AuthError::InvalidCredentials));
    assert!(matches!(unknown_user, AuthError::InvalidCredentials));
    assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    assert_eq!(session_count(&conn), 0);
}

#[test]
fn missing_or_unknown_token_is_anonymous() {
    let conn = open_db_in_memory().unwrap();
    let auth = service(&conn);

    assert_eq!(auth.authenticate(None).unwrap(), Principal::Anonymous);
    assert_eq!(auth.authenticate(Some("")).unwrap(), Principal::Anonymous);
    assert_eq!(
        auth.authenticate(Some("deadbeef")).unwrap(),
        Principal::Anonymous
    );
}

#[test]
fn expired_session_is_anonymous_and_purged() {
    let conn = open_db_in_memory().unwrap();
    let auth = service(&conn);
    let user = auth.create_user("reader", PASSWORD).unwrap();
    SqliteUserRepository::try_new(&conn)
        .unwrap()
        .create_session("stale-token", user.id, 1)
        .unwrap();
    assert_eq!(session_count(&conn), 1);

    assert_eq!(
        auth.authenticate(Some("stale-token")).unwrap(),
        Principal::Anonymous
    );
    assert_eq!(session_count(&conn), 0);
}

#[test]
fn zero_ttl_sessions_never_authenticate() {
    let conn = open_db_in_memory().unwrap();
    let auth = service(&conn).with_session_ttl(Duration::ZERO);
    auth.create_user("reader", PASSWORD).unwrap();

    let session = auth.log_in("reader", PASSWORD).unwrap();
    assert_eq!(
        auth.authenticate(Some(&session.token)).unwrap(),
        Principal::Anonymous
    );
}

#[test]
fn log_out_ends_only_that_session() {
    let conn = open_db_in_memory().unwrap();
    let auth = service(&conn);
    auth.create_user("reader", PASSWORD).unwrap();
    let first = auth.log_in("reader", PASSWORD).unwrap();
    let second = auth.log_in("reader", PASSWORD).unwrap();
    assert_ne!(first.token, second.token);

    auth.log_out(&first.token).unwrap();
    auth.log_out("unknown-token").unwrap();

    assert_eq!(
        auth.authenticate(Some(&first.token)).unwrap(),
        Principal::Anonymous
    );
    assert!(auth
        .authenticate(Some(&second.token))
        .unwrap()
        .is_authenticated());
}

#[test]
fn staged_sign_up_and_log_in_match_the_one_shot_calls() {
    let conn = open_db_in_memory().unwrap();
    let auth = service(&conn);

    let account = prepare_account(" reader ", PASSWORD, PASSWORD).unwrap();
    assert_eq!(account.username, "reader");
    assert!(account.password_hash.starts_with("$argon2"));
    let user = auth.register(&account).unwrap();
    assert!(matches!(
        auth.register(&account),
        Err(AuthError::UsernameTaken(_))
    ));

    let credentials = auth.find_credentials(" reader ").unwrap();
    let checked = check_password(credentials, PASSWORD).unwrap();
    assert_eq!(checked, user);
    let session = auth.start_session(checked).unwrap();
    assert_eq!(
        auth.authenticate(Some(&session.token)).unwrap(),
        Principal::Authenticated(user)
    );

    let unknown = auth.find_credentials("nobody").unwrap();
    assert!(unknown.is_none());
    assert!(matches!(
        check_password(unknown, PASSWORD),
        Err(AuthError::InvalidCredentials)
    ));
}

//! Update check tests: version monotonicity, authorization, token scoping

#[path = "../common/mod.rs"]
mod common;

use common::*;
use gatepost::licensing::{UpdateCheck, UpdateQuery};

fn query<'a>(current_version: &'a str, key: &'a str, site_hash: &'a str) -> UpdateQuery<'a> {
    UpdateQuery {
        slug: TEST_SLUG,
        current_version,
        key,
        site_hash,
    }
}

fn setup_active_site(conn: &mut rusqlite::Connection) -> License {
    let license = create_test_license(conn, "KEY-1", 1, Some(future_timestamp(ONE_YEAR)));
    create_test_activation(conn, &license, "site-a");
    license
}

#[test]
fn test_newer_release_is_offered_with_scoped_token() {
    let mut conn = setup_test_db();
    let license = setup_active_site(&mut conn);
    create_test_release(&conn, TEST_SLUG, "1.1.0", now());

    let at = now();
    let policy = TokenPolicy::default();
    let check = licensing::check_update(&conn, &query("1.0.0", "KEY-1", "site-a"), policy, at).unwrap();

    let UpdateCheck::Available(offer) = check else {
        panic!("expected an update to be offered");
    };
    assert_eq!(offer.release.version, "1.1.0");
    assert_eq!(offer.release.signature.as_deref(), Some("sig-1.1.0"));

    let token = offer.token;
    assert!(token.id.starts_with("gp_tok_"));
    assert_eq!(token.slug, TEST_SLUG);
    assert_eq!(token.version, "1.1.0");
    assert_eq!(token.license_id, license.id);
    assert_eq!(token.site_hash, "site-a");
    assert_eq!(token.expires_at, at + policy.ttl_secs);

    let stored = queries::get_update_token(&conn, &token.id).unwrap();
    assert!(stored.is_some(), "issued token should be persisted");
}

#[test]
fn test_same_version_is_not_offered() {
    let mut conn = setup_test_db();
    setup_active_site(&mut conn);
    create_test_release(&conn, TEST_SLUG, "1.1.0", now());

    let check = licensing::check_update(
        &conn,
        &query("1.1.0", "KEY-1", "site-a"),
        TokenPolicy::default(),
        now(),
    )
    .unwrap();
    assert!(matches!(check, UpdateCheck::NoUpdate));
}

#[test]
fn test_older_release_is_never_offered() {
    let mut conn = setup_test_db();
    setup_active_site(&mut conn);
    create_test_release(&conn, TEST_SLUG, "1.9.0", now());

    let check = licensing::check_update(
        &conn,
        &query("1.10.0", "KEY-1", "site-a"),
        TokenPolicy::default(),
        now(),
    )
    .unwrap();
    assert!(
        matches!(check, UpdateCheck::NoUpdate),
        "1.9.0 is older than 1.10.0 numerically"
    );
}

#[test]
fn test_latest_is_by_creation_time_not_version() {
    let mut conn = setup_test_db();
    setup_active_site(&mut conn);
    // A hotfix for an older line published after the newer release
    create_test_release(&conn, TEST_SLUG, "2.0.0", past_timestamp(2));
    create_test_release(&conn, TEST_SLUG, "1.5.1", past_timestamp(1));

    let check = licensing::check_update(
        &conn,
        &query("1.5.0", "KEY-1", "site-a"),
        TokenPolicy::default(),
        now(),
    )
    .unwrap();

    let UpdateCheck::Available(offer) = check else {
        panic!("expected the most recent release to be offered");
    };
    assert_eq!(offer.release.version, "1.5.1");
}

#[test]
fn test_no_release_for_slug_is_no_update() {
    let mut conn = setup_test_db();
    setup_active_site(&mut conn);
    create_test_release(&conn, "acme/other-plugin", "9.0.0", now());

    let check = licensing::check_update(
        &conn,
        &query("1.0.0", "KEY-1", "site-a"),
        TokenPolicy::default(),
        now(),
    )
    .unwrap();
    assert!(matches!(check, UpdateCheck::NoUpdate));
}

#[test]
fn test_unauthorized_callers_get_no_update_and_no_token() {
    let mut conn = setup_test_db();
    let license = setup_active_site(&mut conn);
    create_test_license(&conn, "KEY-EXPIRED", 1, Some(past_timestamp(1)));
    create_test_release(&conn, TEST_SLUG, "2.0.0", now());

    let cases = [
        ("UNKNOWN", "site-a"),
        ("KEY-EXPIRED", "site-a"),
        ("KEY-1", "site-not-activated"),
    ];
    for (key, site_hash) in cases {
        let check = licensing::check_update(
            &conn,
            &query("1.0.0", key, site_hash),
            TokenPolicy::default(),
            now(),
        )
        .unwrap();
        assert!(
            matches!(check, UpdateCheck::NoUpdate),
            "{}/{} should be told there is no update",
            key,
            site_hash
        );
    }

    licensing::deactivate(&conn, &license.id, "site-a", now()).unwrap();
    let check = licensing::check_update(
        &conn,
        &query("1.0.0", "KEY-1", "site-a"),
        TokenPolicy::default(),
        now(),
    )
    .unwrap();
    assert!(matches!(check, UpdateCheck::NoUpdate));

    let tokens: i64 = conn
        .query_row("SELECT COUNT(*) FROM update_tokens", [], |row| row.get(0))
        .unwrap();
    assert_eq!(tokens, 0, "no token may be issued to an unauthorized caller");
}

#[test]
fn test_each_check_issues_a_fresh_token() {
    let mut conn = setup_test_db();
    setup_active_site(&mut conn);
    create_test_release(&conn, TEST_SLUG, "1.1.0", now());

    let issue = |conn: &rusqlite::Connection| match licensing::check_update(
        conn,
        &query("1.0.0", "KEY-1", "site-a"),
        TokenPolicy::default(),
        now(),
    )
    .unwrap()
    {
        UpdateCheck::Available(offer) => offer.token.id,
        UpdateCheck::NoUpdate => panic!("expected an update"),
    };

    assert_ne!(issue(&conn), issue(&conn));
}

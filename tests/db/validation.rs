//! License validation tests: reason ordering and heartbeat bookkeeping

#[path = "../common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_validate_active_site_is_valid() {
    let mut conn = setup_test_db();
    let expires_at = future_timestamp(ONE_YEAR);
    let license = create_test_license(&conn, "KEY-1", 1, Some(expires_at));
    create_test_activation(&mut conn, &license, "site-a");

    let result = licensing::validate(&conn, "KEY-1", "site-a", None, now()).unwrap();

    assert_eq!(
        result,
        licensing::Validation::Valid {
            plan: "pro".to_string(),
            expires_at: Some(expires_at),
        }
    );
}

#[test]
fn test_validate_unknown_key_is_invalid_key() {
    let conn = setup_test_db();
    let result = licensing::validate(&conn, "NOPE", "site-a", None, now()).unwrap();
    assert_eq!(result, licensing::Validation::Invalid(DenialReason::InvalidKey));
}

#[test]
fn test_validate_non_active_status_is_invalid_key() {
    let mut conn = setup_test_db();
    for (key, status) in [
        ("KEY-S", LicenseStatus::Suspended),
        ("KEY-R", LicenseStatus::Revoked),
        ("KEY-F", LicenseStatus::Refunded),
    ] {
        let license = create_test_license(&conn, key, 1, None);
        create_test_activation(&mut conn, &license, "site-a");
        conn.execute(
            "UPDATE licenses SET status = ?1 WHERE id = ?2",
            rusqlite::params![status.as_ref(), &license.id],
        )
        .unwrap();

        let result = licensing::validate(&conn, key, "site-a", None, now()).unwrap();
        assert_eq!(
            result,
            licensing::Validation::Invalid(DenialReason::InvalidKey),
            "{} license should read as an invalid key",
            status.as_ref()
        );
    }
}

#[test]
fn test_validate_expired_takes_precedence_over_not_activated() {
    let conn = setup_test_db();
    create_test_license(&conn, "KEY-OLD", 1, Some(past_timestamp(1)));

    let result = licensing::validate(&conn, "KEY-OLD", "never-activated", None, now()).unwrap();
    assert_eq!(result, licensing::Validation::Invalid(DenialReason::Expired));
}

#[test]
fn test_validate_expired_license_with_active_site() {
    let mut conn = setup_test_db();
    let license = create_test_license(&conn, "KEY-1", 1, Some(future_timestamp(1)));
    create_test_activation(&mut conn, &license, "site-a");

    let later = future_timestamp(2);
    let result = licensing::validate(&conn, "KEY-1", "site-a", None, later).unwrap();
    assert_eq!(result, licensing::Validation::Invalid(DenialReason::Expired));
}

#[test]
fn test_validate_at_exact_expiry_is_still_valid() {
    let mut conn = setup_test_db();
    let expires_at = future_timestamp(1);
    let license = create_test_license(&conn, "KEY-1", 1, Some(expires_at));
    create_test_activation(&mut conn, &license, "site-a");

    let result = licensing::validate(&conn, "KEY-1", "site-a", None, expires_at).unwrap();
    assert!(matches!(result, licensing::Validation::Valid { .. }));
}

#[test]
fn test_validate_inactive_site_is_not_activated() {
    let mut conn = setup_test_db();
    let license = create_test_license(&conn, "KEY-1", 2, None);
    create_test_activation(&mut conn, &license, "site-a");

    let result = licensing::validate(&conn, "KEY-1", "site-b", None, now()).unwrap();
    assert_eq!(result, licensing::Validation::Invalid(DenialReason::NotActivated));

    licensing::deactivate(&conn, &license.id, "site-a", now()).unwrap();
    let result = licensing::validate(&conn, "KEY-1", "site-a", None, now()).unwrap();
    assert_eq!(
        result,
        licensing::Validation::Invalid(DenialReason::NotActivated),
        "a deactivated site should no longer validate"
    );
}

#[test]
fn test_validate_records_check_time() {
    let mut conn = setup_test_db();
    let license = create_test_license(&conn, "KEY-1", 1, None);
    let activation = create_test_activation(&mut conn, &license, "site-a");
    assert!(activation.last_check_at.is_none());

    let checked_at = future_timestamp(1);
    licensing::validate(&conn, "KEY-1", "site-a", None, checked_at).unwrap();

    let activation = queries::get_activation_by_id(&conn, &activation.id)
        .unwrap()
        .unwrap();
    assert_eq!(activation.last_check_at, Some(checked_at));
}

#[test]
fn test_validate_plugin_version_only_updated_when_supplied() {
    let mut conn = setup_test_db();
    let license = create_test_license(&conn, "KEY-1", 1, None);
    let activation = create_test_activation(&mut conn, &license, "site-a");
    assert_eq!(activation.plugin_version.as_deref(), Some("1.0.0"));

    licensing::validate(&conn, "KEY-1", "site-a", None, now()).unwrap();
    let unchanged = queries::get_activation_by_id(&conn, &activation.id)
        .unwrap()
        .unwrap();
    assert_eq!(
        unchanged.plugin_version.as_deref(),
        Some("1.0.0"),
        "omitting plugin_version must not clear it"
    );

    licensing::validate(&conn, "KEY-1", "site-a", Some("1.2.0"), now()).unwrap();
    let updated = queries::get_activation_by_id(&conn, &activation.id)
        .unwrap()
        .unwrap();
    assert_eq!(updated.plugin_version.as_deref(), Some("1.2.0"));
}

#[test]
fn test_failed_validation_does_not_touch_activation() {
    let mut conn = setup_test_db();
    let license = create_test_license(&conn, "KEY-1", 1, Some(future_timestamp(1)));
    let activation = create_test_activation(&mut conn, &license, "site-a");

    licensing::validate(&conn, "KEY-1", "site-a", Some("9.9.9"), future_timestamp(2)).unwrap();

    let stored = queries::get_activation_by_id(&conn, &activation.id)
        .unwrap()
        .unwrap();
    assert!(stored.last_check_at.is_none());
    assert_eq!(stored.plugin_version.as_deref(), Some("1.0.0"));
}

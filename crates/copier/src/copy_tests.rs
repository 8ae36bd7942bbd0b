//! Copier tests against `MemoryRegistry`.
//!
//! Namespace `a` holds the legacy models, namespace `b` the new ones.

use serde_json::{json, Value};

use crate::{
    copy_model_data, CopyError, CopyOptions, MemoryRegistry, ModelRef, Record, RecordType,
};

fn user() -> ModelRef {
    ModelRef::new("b", "User")
}

fn legacy_profile() -> ModelRef {
    ModelRef::new("a", "LegacyProfile")
}

fn profile() -> ModelRef {
    ModelRef::new("b", "Profile")
}

fn record(pairs: &[(&str, Value)]) -> Record {
    pairs.iter().map(|(k, v)| (*k, v.clone())).collect()
}

/// `a.LegacyProfile` and `b.Profile` both reference `b.User`; the legacy
/// type also carries a `nickname` the new one dropped.
fn registry() -> MemoryRegistry {
    let registry = MemoryRegistry::new()
        .with_model(RecordType::new(user(), "id").scalar("username"))
        .with_model(
            RecordType::new(legacy_profile(), "id")
                .reference("user_id", user())
                .scalar("favorite_city")
                .scalar("nickname"),
        )
        .with_model(
            RecordType::new(profile(), "id")
                .reference("user_id", user())
                .scalar("favorite_city"),
        );

    registry.seed(&user(), record(&[("id", json!(7)), ("username", json!("ada"))]));
    registry.seed(&user(), record(&[("id", json!(8)), ("username", json!("bob"))]));
    registry
}

#[tokio::test]
async fn legacy_profile_is_copied_with_its_user_reference() {
    let registry = registry();
    registry.seed(
        &legacy_profile(),
        record(&[("id", json!(1)), ("user_id", json!(7)), ("favorite_city", json!("Paris"))]),
    );

    let report = copy_model_data(&registry, &legacy_profile(), &profile(), CopyOptions::default())
        .await
        .expect("copy");

    assert_eq!(report.copied, 1);
    let copied = registry.records(&profile());
    assert_eq!(copied.len(), 1);
    assert_eq!(copied[0].get("favorite_city"), Some(&json!("Paris")));
    assert_eq!(copied[0].get("user_id"), Some(&json!(7)));
    assert_eq!(copied[0].get("id"), Some(&json!(1)));
}

#[tokio::test]
async fn destination_grows_by_the_number_of_source_records() {
    let registry = registry();
    registry.seed(&profile(), record(&[("id", json!(100)), ("user_id", json!(8))]));
    for (id, user_id) in [(1, 7), (2, 8), (3, 7)] {
        registry.seed(
            &legacy_profile(),
            record(&[("id", json!(id)), ("user_id", json!(user_id)), ("favorite_city", json!("Oslo"))]),
        );
    }

    copy_model_data(&registry, &legacy_profile(), &profile(), CopyOptions::default())
        .await
        .expect("copy");

    assert_eq!(registry.records(&profile()).len(), 4);
    assert_eq!(registry.save_count(), 3);
    // Source records are left untouched.
    assert_eq!(registry.records(&legacy_profile()).len(), 3);
}

#[tokio::test]
async fn source_only_fields_are_skipped() {
    let registry = registry();
    registry.seed(
        &legacy_profile(),
        record(&[
            ("id", json!(1)),
            ("user_id", json!(7)),
            ("favorite_city", json!("Paris")),
            ("nickname", json!("Lovelace")),
        ]),
    );

    let report = copy_model_data(&registry, &legacy_profile(), &profile(), CopyOptions::default())
        .await
        .expect("copy");

    assert_eq!(report.skipped_fields, vec!["nickname".to_string()]);
    assert_eq!(registry.records(&profile())[0].get("nickname"), None);
}

#[tokio::test]
async fn empty_source_writes_nothing() {
    let registry = registry();

    let report = copy_model_data(&registry, &legacy_profile(), &profile(), CopyOptions::default())
        .await
        .expect("copy");

    assert_eq!(report.copied, 0);
    assert_eq!(registry.save_count(), 0);
}

#[tokio::test]
async fn dangling_reference_aborts_the_copy() {
    let registry = registry();
    registry.seed(
        &legacy_profile(),
        record(&[("id", json!(1)), ("user_id", json!(7)), ("favorite_city", json!("Paris"))]),
    );
    registry.seed(
        &legacy_profile(),
        record(&[("id", json!(2)), ("user_id", json!(99)), ("favorite_city", json!("Lima"))]),
    );
    registry.seed(
        &legacy_profile(),
        record(&[("id", json!(3)), ("user_id", json!(8)), ("favorite_city", json!("Rome"))]),
    );

    let result =
        copy_model_data(&registry, &legacy_profile(), &profile(), CopyOptions::default()).await;

    match result {
        Err(CopyError::DanglingReference { record, field, target, key, .. }) => {
            assert_eq!(record, json!(2));
            assert_eq!(field, "user_id");
            assert_eq!(target, user());
            assert_eq!(key, json!(99));
        }
        other => panic!("expected a dangling reference, got {other:?}"),
    }

    // Abort on first error: the record before the failure was saved, the
    // one after it never ran.
    let copied = registry.records(&profile());
    assert_eq!(copied.len(), 1);
    assert_eq!(copied[0].get("favorite_city"), Some(&json!("Paris")));
}

#[tokio::test]
async fn reference_missing_on_the_destination_is_still_checked() {
    let anonymous = ModelRef::new("b", "AnonymousProfile");
    let registry = registry()
        .with_model(RecordType::new(anonymous.clone(), "id").scalar("favorite_city"));
    registry.seed(
        &legacy_profile(),
        record(&[("id", json!(1)), ("user_id", json!(7)), ("favorite_city", json!("Paris"))]),
    );
    registry.seed(
        &legacy_profile(),
        record(&[("id", json!(2)), ("user_id", json!(99)), ("favorite_city", json!("Lima"))]),
    );

    let result =
        copy_model_data(&registry, &legacy_profile(), &anonymous, CopyOptions::default()).await;

    assert!(matches!(
        result,
        Err(CopyError::DanglingReference { ref field, ref key, .. })
            if field == "user_id" && *key == json!(99)
    ));
    let copied = registry.records(&anonymous);
    assert_eq!(copied.len(), 1);
    assert_eq!(copied[0].get("user_id"), None);
}

#[tokio::test]
async fn null_reference_is_copied_as_null() {
    let registry = registry();
    registry.seed(
        &legacy_profile(),
        record(&[("id", json!(1)), ("user_id", Value::Null), ("favorite_city", json!("Paris"))]),
    );

    copy_model_data(&registry, &legacy_profile(), &profile(), CopyOptions::default())
        .await
        .expect("copy");

    assert_eq!(registry.records(&profile())[0].get("user_id"), Some(&Value::Null));
}

#[tokio::test]
async fn unknown_models_fail_before_any_write() {
    let registry = registry();
    registry.seed(
        &legacy_profile(),
        record(&[("id", json!(1)), ("user_id", json!(7))]),
    );

    let missing = ModelRef::new("b", "Ghost");
    let result = copy_model_data(&registry, &legacy_profile(), &missing, CopyOptions::default()).await;
    assert!(matches!(result, Err(CopyError::Lookup(m)) if m == missing));

    let result = copy_model_data(&registry, &missing, &profile(), CopyOptions::default()).await;
    assert!(matches!(result, Err(CopyError::Lookup(_))));

    assert_eq!(registry.save_count(), 0);
}

#[tokio::test]
async fn unknown_referenced_model_fails_before_any_write() {
    let orphan = ModelRef::new("a", "Orphan");
    let registry = MemoryRegistry::new()
        .with_model(RecordType::new(orphan.clone(), "id").reference("owner_id", ModelRef::new("a", "Owner")))
        .with_model(RecordType::new(ModelRef::new("b", "Orphan"), "id").scalar("owner_id"));
    registry.seed(&orphan, record(&[("id", json!(1)), ("owner_id", json!(1))]));

    let result =
        copy_model_data(&registry, &orphan, &ModelRef::new("b", "Orphan"), CopyOptions::default())
            .await;

    assert!(matches!(result, Err(CopyError::Lookup(m)) if m == ModelRef::new("a", "Owner")));
    assert_eq!(registry.save_count(), 0);
}

#[tokio::test]
async fn type_names_are_case_insensitive() {
    let registry = registry();
    registry.seed(&legacy_profile(), record(&[("id", json!(1)), ("user_id", json!(8))]));

    let report = copy_model_data(
        &registry,
        &ModelRef::new("a", "legacyprofile"),
        &ModelRef::new("b", "PROFILE"),
        CopyOptions::default(),
    )
    .await
    .expect("copy");

    assert_eq!(report.copied, 1);
}

#[tokio::test]
async fn rejected_write_is_reported() {
    let registry = registry();
    registry.seed(&legacy_profile(), record(&[("id", json!(1)), ("user_id", json!(7))]));
    registry.reject_writes(&profile());

    let result =
        copy_model_data(&registry, &legacy_profile(), &profile(), CopyOptions::default()).await;

    assert!(matches!(result, Err(CopyError::Write(_))));
}

#[tokio::test]
async fn rerun_collides_on_preserved_keys() {
    let registry = registry();
    registry.seed(&legacy_profile(), record(&[("id", json!(1)), ("user_id", json!(7))]));

    copy_model_data(&registry, &legacy_profile(), &profile(), CopyOptions::default())
        .await
        .expect("first copy");
    let second =
        copy_model_data(&registry, &legacy_profile(), &profile(), CopyOptions::default()).await;

    assert!(matches!(second, Err(CopyError::Write(_))));
    assert_eq!(registry.records(&profile()).len(), 1);
}

#[tokio::test]
async fn test_run_is_a_no_op_unless_forced() {
    let registry = registry();
    registry.seed(&legacy_profile(), record(&[("id", json!(1)), ("user_id", json!(7))]));

    let guarded = CopyOptions { test_run: true, force_run: false };
    let report = copy_model_data(&registry, &legacy_profile(), &profile(), guarded)
        .await
        .expect("guarded copy");
    assert!(report.skipped_run);
    assert_eq!(registry.save_count(), 0);

    let report =
        copy_model_data(&registry, &legacy_profile(), &profile(), CopyOptions::forced_test_run())
            .await
            .expect("forced copy");
    assert_eq!(report.copied, 1);
}

#[test]
fn guard_runs_outside_tests() {
    assert!(CopyOptions::default().should_run());
    assert!(CopyOptions::forced_test_run().should_run());
    assert!(!CopyOptions { test_run: true, force_run: false }.should_run());
}

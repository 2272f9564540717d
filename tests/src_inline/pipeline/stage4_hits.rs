use super::*;

#[test]
fn test_threshold_boundary_is_kept() {
    let ids = vec!["a", "b", "c"];
    let z = vec![2.5, 2.5 - 1e-12, 3.0];
    let hits = select_hits(&ids, &z, 2.5).unwrap();
    assert_eq!(hits.rows, vec![1, 3]);
    assert_eq!(hits.identities, vec!["a", "c"]);
}

#[test]
fn test_identities_distinct_in_first_encounter_order() {
    let ids = vec!["x", "y", "x", "z", "y"];
    let z = vec![3.0, 1.0, 4.0, 5.0, 2.6];
    let hits = select_hits(&ids, &z, 2.5).unwrap();
    assert_eq!(hits.rows, vec![1, 3, 4, 5]);
    assert_eq!(hits.identities, vec!["x", "z", "y"]);
}

#[test]
fn test_nan_is_never_a_hit() {
    let ids = vec!["a", "b"];
    let z = vec![f64::NAN, f64::NAN];
    let hits = select_hits(&ids, &z, f64::NEG_INFINITY).unwrap();
    assert!(hits.rows.is_empty());
    assert!(hits.identities.is_empty());
}

#[test]
fn test_length_mismatch() {
    assert!(select_hits(&["a"], &[], 2.5).is_err());
}

#[test]
fn test_many_repeated_hits_keep_one_identity_each() {
    let ids: Vec<String> = (0..20_000).map(|i| format!("id_{}", (i * 7) % 500)).collect();
    let z = vec![3.0; ids.len()];
    let hits = select_hits(&ids, &z, 2.5).unwrap();
    assert_eq!(hits.rows.len(), 20_000);
    assert_eq!(hits.identities.len(), 500);
    assert_eq!(hits.identities[0], "id_0");
    assert_eq!(hits.identities[1], "id_7");
    assert_eq!(hits.identities[499], format!("id_{}", (499 * 7) % 500));
}

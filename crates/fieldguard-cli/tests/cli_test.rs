use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use rstest::rstest;

#[test]
fn test_init_and_check() {
    let dir = tempfile::tempdir().unwrap();

    // Init example form
    cargo_bin_cmd!("fieldguard")
        .args(["init", dir.path().to_str().unwrap()])
        .assert()
        .success();

    let form = dir.path().join("form.yaml");
    let record = dir.path().join("record.json");
    assert!(form.exists());
    assert!(record.exists());

    // The example record passes the example form
    let output = cargo_bin_cmd!("fieldguard")
        .args([
            "check",
            "--form",
            form.to_str().unwrap(),
            record.to_str().unwrap(),
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["form"], "signup");
    assert_eq!(report["valid"], true);
    assert_eq!(report["fields"].as_array().unwrap().len(), 7);
}

#[test]
fn test_init_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().to_str().unwrap();

    cargo_bin_cmd!("fieldguard")
        .args(["init", path, "--name", "contact"])
        .assert()
        .success();
    let form = std::fs::read_to_string(dir.path().join("form.yaml")).unwrap();
    assert!(form.starts_with("name: contact"));

    cargo_bin_cmd!("fieldguard")
        .args(["init", path])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    cargo_bin_cmd!("fieldguard")
        .args(["init", path, "--force"])
        .assert()
        .success();
}

#[rstest]
#[case::plain("contact")]
#[case::yaml_special("sign-up: v2 # beta")]
fn test_init_with_name(#[case] name: &str) {
    let dir = tempfile::tempdir().unwrap();
    cargo_bin_cmd!("fieldguard")
        .args(["init", dir.path().to_str().unwrap(), "--name", name])
        .assert()
        .success();

    let output = cargo_bin_cmd!("fieldguard")
        .args([
            "check",
            "--form",
            dir.path().join("form.yaml").to_str().unwrap(),
            dir.path().join("record.json").to_str().unwrap(),
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["form"], name);
    assert_eq!(report["fields"].as_array().unwrap().len(), 7);
}

#[test]
fn test_check_invalid_record_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    cargo_bin_cmd!("fieldguard")
        .args(["init", dir.path().to_str().unwrap()])
        .assert()
        .success();

    let record = dir.path().join("bad.json");
    std::fs::write(
        &record,
        r#"{"username": "a b", "password": "x", "password_confirm": "y", "country": "CA", "postal_code": "12345"}"#,
    )
    .unwrap();

    cargo_bin_cmd!("fieldguard")
        .args([
            "check",
            "--compact",
            "--form",
            dir.path().join("form.yaml").to_str().unwrap(),
            record.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains(r#""valid":false"#))
        .stdout(predicate::str::contains("confirmMatch"))
        .stdout(predicate::str::contains("Postal code is not a valid postal code"));
}

#[test]
fn test_check_reads_stdin() {
    let dir = tempfile::tempdir().unwrap();
    let form = dir.path().join("form.yaml");
    std::fs::write(
        &form,
        "name: tiny\nfields:\n  - name: email\n    validators: [required, email]\n",
    )
    .unwrap();

    cargo_bin_cmd!("fieldguard")
        .args(["check", "--form", form.to_str().unwrap(), "-"])
        .write_stdin(r#"{"email": "bob@example.com"}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""state": "valid""#));
}

#[test]
fn test_check_missing_form() {
    cargo_bin_cmd!("fieldguard")
        .args(["check", "--form", "/nonexistent/form.yaml", "record.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load form"));
}

#[rstest]
#[case::by_keyword("america", "United States")]
#[case::by_code("de", "Germany")]
#[case::by_alias("down under", "Australia")]
fn test_countries_search(#[case] query: &str, #[case] expected: &str) {
    cargo_bin_cmd!("fieldguard")
        .args(["countries", query])
        .assert()
        .success()
        .stdout(predicate::str::contains(expected));
}

#[test]
fn test_countries_json() {
    let output = cargo_bin_cmd!("fieldguard")
        .args(["countries", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let list: Vec<serde_json::Value> = serde_json::from_slice(&output).unwrap();
    assert_eq!(list.len(), 249);
    assert_eq!(list[0]["code"], "AD");
    let flag = |code: &str| {
        list.iter()
            .find(|c| c["code"] == code)
            .map(|c| c["hasPostalCodes"].clone())
    };
    assert_eq!(flag("US"), Some(serde_json::Value::Bool(true)));
    assert_eq!(flag("AE"), Some(serde_json::Value::Bool(false)));
}

#[test]
fn test_countries_marks_missing_postal_codes() {
    cargo_bin_cmd!("fieldguard")
        .args(["countries", "emirates"])
        .assert()
        .success()
        .stdout(predicate::str::contains("+971"))
        .stdout(predicate::str::contains("(no postal codes)"));

    cargo_bin_cmd!("fieldguard")
        .args(["countries", "germany"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(no postal codes)").not());
}

#[test]
fn test_regions() {
    cargo_bin_cmd!("fieldguard")
        .args(["regions", "us"])
        .assert()
        .success()
        .stdout(predicate::str::contains("US-CA"))
        .stdout(predicate::str::contains("California"))
        .stdout(predicate::str::contains("State or Territory"));
}

#[test]
fn test_regions_unknown_country() {
    cargo_bin_cmd!("fieldguard")
        .args(["regions", "ZZ"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown country code"));
}

#[test]
fn test_rules_lists_every_key() {
    let assert = cargo_bin_cmd!("fieldguard").arg("rules").assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    for key in [
        "required",
        "minLength",
        "specialCharRequired",
        "confirmMatch",
        "completeTelephone",
        "postalCode",
    ] {
        assert!(stdout.contains(key), "missing {key}");
    }
    assert!(stdout.contains("This field is required"));

    let linked: Vec<&str> = stdout
        .lines()
        .filter(|line| line.get(21..22) == Some("+"))
        .filter_map(|line| line.split_whitespace().next())
        .collect();
    assert_eq!(
        linked,
        vec!["confirmMatch", "completeTelephone", "possibleTelephone", "postalCode"]
    );
}

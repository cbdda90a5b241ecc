//! Checks the dev CI workflow keeps its build/publish contract.

use std::path::Path;

use serde_yaml::Value;

fn workflow() -> Value {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../.github/workflows/dev.yml");
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("read {}: {e}", path.display()));
    serde_yaml::from_str(&text).unwrap()
}

fn step<'a>(job: &'a Value, uses_prefix: &str) -> &'a Value {
    job["steps"]
        .as_sequence()
        .unwrap()
        .iter()
        .find(|s| {
            s["uses"]
                .as_str()
                .is_some_and(|u| u.starts_with(uses_prefix))
        })
        .unwrap_or_else(|| panic!("no step uses {uses_prefix}"))
}

fn target() -> String {
    workflow()["env"]["TARGET"].as_str().unwrap().to_string()
}

#[test]
fn triggers_on_main_pushes_and_pull_requests() {
    let wf = workflow();
    // `on` stays a string key under YAML 1.2
    let on = &wf["on"];
    for event in ["push", "pull_request"] {
        let branches = on[event]["branches"].as_sequence().unwrap();
        assert_eq!(branches, &vec![Value::from("main")], "{event}");
    }
}

#[test]
fn release_job_needs_build_job() {
    let wf = workflow();
    let release = &wf["jobs"]["dev_build_release"];
    assert_eq!(release["needs"].as_str(), Some("dev_build"));
    assert!(release["if"].as_str().unwrap().contains("push"));
}

#[test]
fn build_step_targets_the_configured_triple() {
    let wf = workflow();
    let build = &wf["jobs"]["dev_build"];
    let run = build["steps"]
        .as_sequence()
        .unwrap()
        .iter()
        .filter_map(|s| s["run"].as_str())
        .find(|r| r.starts_with("cargo build"))
        .unwrap();
    assert!(run.contains("--release"));
    assert!(run.contains("--target ${{ env.TARGET }}"));

    let upload = step(build, "actions/upload-artifact");
    assert_eq!(upload["with"]["name"].as_str(), Some("mudflow"));
    assert_eq!(
        upload["with"]["path"].as_str().unwrap(),
        format!("target/{}/release/mudflow", target())
    );
}

#[test]
fn cache_keys_fall_back_from_specific_to_broad() {
    let wf = workflow();
    let cache = step(&wf["jobs"]["dev_build"], "actions/cache");
    let key = cache["with"]["key"].as_str().unwrap();
    let restore: Vec<&str> = cache["with"]["restore-keys"]
        .as_str()
        .unwrap()
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    assert!(key.contains("hashFiles('**/Cargo.lock')"));
    assert_eq!(restore.len(), 2);
    // each fallback is a strict prefix of the more specific key before it
    assert!(key.starts_with(restore[0]));
    assert!(restore[0].starts_with(restore[1]));
    assert!(restore[0].len() > restore[1].len());
}

#[test]
fn publishes_prerelease_under_dev_tag() {
    let wf = workflow();
    let release = &wf["jobs"]["dev_build_release"];
    let download = step(release, "actions/download-artifact");
    assert_eq!(download["with"]["name"].as_str(), Some("mudflow"));

    let publish = step(release, "marvinpinto/action-automatic-releases");
    let with = &publish["with"];
    assert_eq!(with["automatic_release_tag"].as_str(), Some("dev"));
    assert_eq!(with["prerelease"].as_bool(), Some(true));
    assert_eq!(with["files"].as_str(), Some("mudflow"));
    assert_eq!(
        with["repo_token"].as_str(),
        Some("${{ secrets.GITHUB_TOKEN }}")
    );
}

//! `fieldwork` binary integration tests
//!
//! Exit codes: 0 on success, 1 on any fatal error. Row-level classification
//! failures never change the exit code.

use std::fs;
use std::path::Path;

use anyhow::Result;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::body_string_contains;
use wiremock::matchers::method;
use wiremock::matchers::path;

const SURVEY: &str = "\
Q49,Q57,Q48,Q288R,Q260,W_WEIGHT
10,1,9,3,25,1.0
7,2,6,2,40,1.0
5,2,5,1,63,2.0
-2,1,-1,-5,-4,0.5
";

const QUOTES: &str = "\
text_id,processed_tex
m1,We were magnificent from the first whistle
m2,That was simply not good enough
m3,It is what it is
";

/// `fieldwork` with a clean environment rooted in `cwd`
fn fieldwork(cwd: &Path) -> Result<assert_cmd::Command> {
    let mut cmd = assert_cmd::Command::cargo_bin("fieldwork")?;
    cmd.current_dir(cwd)
        .env_remove("OPENAI_API_KEY")
        .env_remove("FIELDWORK_MODEL")
        .env_remove("FIELDWORK_BASE_URL")
        .env("RUST_LOG", "info");
    Ok(cmd)
}

#[test]
fn readme_writes_markdown_and_json() -> Result<()> {
    let dir = TempDir::new()?;
    fs::create_dir(dir.path().join("data"))?;
    fs::write(dir.path().join("data/WVS_random_subset2000.csv"), SURVEY)?;

    fieldwork(dir.path())?
        .args(["readme", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"share_base\": \"valid_responses\""))
        .stdout(predicate::str::contains("\"respondents\": 4"));

    let readme = fs::read_to_string(dir.path().join("README.md"))?;
    assert!(readme.contains("| Interpersonal trust (Q57)    | 4   | 33 %"));
    assert!(readme.contains("Low 50 % • Mid 25 % • High 25 %"));
    Ok(())
}

#[test]
fn readme_share_base_all_uses_whole_sample() -> Result<()> {
    let dir = TempDir::new()?;
    let input = dir.path().join("survey.csv");
    let output = dir.path().join("OUT.md");
    fs::write(&input, SURVEY)?;

    fieldwork(dir.path())?
        .arg("readme")
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .args(["--share-base", "all", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"share_base\": \"all_respondents\""));

    assert!(output.exists());
    Ok(())
}

#[test]
fn readme_missing_input_exits_1() -> Result<()> {
    let dir = TempDir::new()?;

    fieldwork(dir.path())?
        .args(["readme", "--input", "nope.csv"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to load survey data from nope.csv"))
        .stderr(predicate::str::contains("IO_ERROR"));

    assert!(!dir.path().join("README.md").exists());
    Ok(())
}

#[test]
fn readme_missing_column_exits_1() -> Result<()> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("survey.csv"), "Q49,W_WEIGHT\n5,1.0\n")?;

    fieldwork(dir.path())?
        .args(["readme", "--input", "survey.csv"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Q57"));
    Ok(())
}

#[test]
fn classify_without_api_key_exits_1() -> Result<()> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("interview-texts-only.csv"), QUOTES)?;

    fieldwork(dir.path())?
        .arg("classify")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("OPENAI_API_KEY not set"))
        .stderr(predicate::str::contains("CONFIG_ERROR"));

    assert!(!dir.path().join("manager_sentiment_results.csv").exists());
    Ok(())
}

#[test]
fn classify_missing_text_column_exits_1() -> Result<()> {
    let dir = TempDir::new()?;
    fs::write(
        dir.path().join("interview-texts-only.csv"),
        "text_id,quote\nm1,Fine\n",
    )?;

    fieldwork(dir.path())?
        .env("OPENAI_API_KEY", "sk-test")
        .arg("classify")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("processed_tex"));
    Ok(())
}

#[test]
fn classify_rejects_zero_attempts() -> Result<()> {
    let dir = TempDir::new()?;

    fieldwork(dir.path())?
        .env("OPENAI_API_KEY", "sk-test")
        .args(["classify", "--max-attempts", "0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("max_attempts must be at least 1"));
    Ok(())
}

fn chat_reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    }))
}

#[tokio::test(flavor = "multi_thread")]
async fn classify_end_to_end_against_mock_api() -> Result<()> {
    let server = MockServer::start().await;
    for (statement, reply) in [
        ("magnificent", "2"),
        ("not good enough", "-1"),
        ("It is what it is", "neutral-ish"),
    ] {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_string_contains(statement))
            .respond_with(chat_reply(reply))
            .mount(&server)
            .await;
    }

    let dir = TempDir::new()?;
    fs::write(dir.path().join("interview-texts-only.csv"), QUOTES)?;
    let base_url = format!("{}/v1", server.uri());
    let cwd = dir.path().to_path_buf();

    let assert = tokio::task::spawn_blocking(move || -> Result<_> {
        Ok(fieldwork(&cwd)?
            .env("OPENAI_API_KEY", "sk-test")
            .args(["classify", "--base-url", &base_url, "--concurrency", "2"])
            .assert())
    })
    .await??;

    assert
        .success()
        .stdout(predicate::str::contains("<absent>  1"));

    let results = fs::read_to_string(dir.path().join("manager_sentiment_results.csv"))?;
    assert_eq!(results, "text_id,score\nm1,2\nm2,-1\nm3,\n");

    let log = fs::read_to_string(dir.path().join("classification.log"))?;
    assert!(log.contains("Could not parse integer from reply"));
    assert!(log.contains("Saved results"));
    assert!(log.contains("Score distribution:"));
    assert!(log.contains("   score  count"));
    assert!(log.contains("<absent>  1"));
    Ok(())
}

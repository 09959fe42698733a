use mdc_engine::{NO_EXECUTABLE_COMMANDS, RunContext, run_script, run_script_file};
use mdc_mcp::{EchoToolClient, LaunchConfig};
use serde_json::json;
use tokio_util::sync::CancellationToken;

const LOGIN_SCRIPT: &str = r##"# Login smoke test

Open the login page.

```mcp
{"tool": "browser_navigate", "params": {"url": "https://{{host}}/login"}}
```

A note that is not executed:

```json
{"tool": "ignored"}
```

```mcp
{
  "tool": "browser_type",
  "params": {"selector": "#user", "text": "{{user}}"},
  "optional": true
}
```
"##;

#[tokio::test]
async fn dry_run_executes_blocks_in_order() {
    let context = RunContext::new().with_variable("host", "example.com").with_variable("user", "ada");

    let summary = run_script(LOGIN_SCRIPT, &context, EchoToolClient::new(), &LaunchConfig::default(), CancellationToken::new()).await;

    assert!(summary.success);
    assert_eq!(summary.total, 2);
    assert_eq!(summary.successful, 2);
    assert!(summary.diagnostics.is_empty());

    let first = &summary.results[0];
    assert_eq!(first.tool, "browser_navigate");
    assert_eq!(first.source_line, 5);
    assert_eq!(first.output.as_ref().unwrap()["arguments"]["url"], json!("https://example.com/login"));

    let second = &summary.results[1];
    assert!(second.optional);
    assert_eq!(second.output.as_ref().unwrap()["arguments"]["text"], json!("ada"));
}

#[tokio::test]
async fn missing_variables_are_reported_but_not_fatal() {
    let context = RunContext::new().with_variable("host", "example.com");

    let summary = run_script(LOGIN_SCRIPT, &context, EchoToolClient::new(), &LaunchConfig::default(), CancellationToken::new()).await;

    assert!(summary.success);
    assert_eq!(summary.diagnostics.len(), 1);
    assert!(summary.diagnostics[0].contains("{{user}}"));
    assert_eq!(summary.results[1].output.as_ref().unwrap()["arguments"]["text"], json!("{{user}}"));
}

#[tokio::test]
async fn script_without_blocks_is_unsuccessful() {
    let summary = run_script(
        "# Only prose\n",
        &RunContext::new(),
        EchoToolClient::new(),
        &LaunchConfig::default(),
        CancellationToken::new(),
    )
    .await;

    assert!(!summary.success);
    assert_eq!(summary.total, 0);
    assert_eq!(summary.error.as_deref(), Some(NO_EXECUTABLE_COMMANDS));
    assert_eq!(summary.exit_code(), 1);
}

#[tokio::test]
async fn cancelled_before_start_runs_nothing() {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let summary = run_script(LOGIN_SCRIPT, &RunContext::new(), EchoToolClient::new(), &LaunchConfig::default(), cancel).await;

    assert!(!summary.success);
    assert_eq!(summary.total, 0);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.error.as_deref(), Some(mdc_engine::RUN_CANCELLED));
}

#[tokio::test]
async fn runs_script_from_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let script_path = temp_dir.path().join("login.mdc");
    std::fs::write(&script_path, LOGIN_SCRIPT).unwrap();
    let context = RunContext::new().with_variable("host", "example.com").with_variable("user", "ada");

    let summary = run_script_file(&script_path, &context, EchoToolClient::new(), &LaunchConfig::default(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.total, 2);

    let missing = run_script_file(
        temp_dir.path().join("nope.mdc"),
        &context,
        EchoToolClient::new(),
        &LaunchConfig::default(),
        CancellationToken::new(),
    )
    .await;
    assert!(missing.is_err());
}

#[tokio::test]
async fn summary_serializes_camel_case() {
    let context = RunContext::new().with_variable("host", "example.com").with_variable("user", "ada");
    let summary = run_script(LOGIN_SCRIPT, &context, EchoToolClient::new(), &LaunchConfig::default(), CancellationToken::new()).await;

    let value = serde_json::to_value(&summary).unwrap();
    assert_eq!(value["success"], json!(true));
    assert_eq!(value["total"], json!(2));
    assert!(value.get("totalDurationMs").is_some());
    assert!(value.get("averageDurationMs").is_some());
    assert!(value["results"][0].get("durationMs").is_some());
    assert!(value.get("diagnostics").is_none());
}

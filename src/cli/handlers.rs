use super::commands::{GradeArgs, HealthArgs};
use super::output::{GradedItem, HealthStatus, OutputFormat, OutputFormatter};
use crate::config::{default_model, GraderConfig};
use crate::grading::{GradingOrchestrator, GradingRequest};
use crate::llm::{select_judgment_client, SelectedClient};

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_INVALID_REQUEST: i32 = 2;

/// Requests read from the input, remembering whether it was a single object
#[derive(Debug)]
enum GradeInput {
    Single(GradingRequest),
    Batch(Vec<GradingRequest>),
}

pub async fn handle_grade(args: &GradeArgs) -> i32 {
    match run_grade(args).await {
        Ok(code) => code,
        Err(e) => {
            error!("Grading failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            EXIT_FAILURE
        }
    }
}

async fn run_grade(args: &GradeArgs) -> Result<i32> {
    let config = grade_config(args);
    config.validate().context("Invalid configuration")?;
    debug!("{}", config);

    debug!("Reading request from {}", input_label(args.input.as_ref()));
    let text = read_input(args.input.as_deref())?;
    let input = match parse_input(&text) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Invalid request: {:#}", e);
            return Ok(EXIT_INVALID_REQUEST);
        }
    };

    let client = select_judgment_client(&config).await;
    if let Some(ref selected) = client {
        info!("Judgment provider: {}", selected.description);
    } else {
        info!("No judgment provider available; using the fallback grader");
    }

    let orchestrator = GradingOrchestrator::from_config(&config, client.map(|s| s.client));
    let formatter = OutputFormatter::new(OutputFormat::from(args.format));

    let (output, exit_code) = match input {
        GradeInput::Single(request) => match orchestrator.grade(&request).await {
            Ok(result) => (formatter.format_result(&result)?, EXIT_OK),
            Err(e) => {
                eprintln!("Invalid request: {}", e);
                return Ok(EXIT_INVALID_REQUEST);
            }
        },
        GradeInput::Batch(requests) => {
            info!("Grading {} requests", requests.len());
            let items: Vec<GradedItem> = orchestrator.grade_all(&requests).await;
            let rejected = items.iter().filter(|item| item.is_err()).count();
            let code = if rejected > 0 {
                eprintln!("{} of {} requests were rejected", rejected, items.len());
                EXIT_INVALID_REQUEST
            } else {
                EXIT_OK
            };
            (formatter.format_batch(&items)?, code)
        }
    };

    write_output(&output, args.output.as_deref())?;
    Ok(exit_code)
}

fn grade_config(args: &GradeArgs) -> GraderConfig {
    let mut config = GraderConfig::default();

    if let Some(provider) = args.provider {
        config.provider = provider;
        if args.model.is_none() {
            config.model = default_model(provider).to_string();
        }
    }
    if let Some(ref model) = args.model {
        config.model = model.clone();
    }
    if let Some(timeout) = args.timeout {
        config.request_timeout_secs = timeout;
    }
    if let Some(ref journal) = args.journal {
        config.journal_path = Some(journal.clone());
    }
    if args.fallback_only {
        config.fallback_only = true;
    }

    config
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read request from stdin")?;
            Ok(text)
        }
    }
}

fn parse_input(text: &str) -> Result<GradeInput> {
    let value: Value = serde_json::from_str(text).context("Request is not valid JSON")?;

    if value.is_array() {
        let requests: Vec<GradingRequest> =
            serde_json::from_value(value).context("Request array has an invalid shape")?;
        Ok(GradeInput::Batch(requests))
    } else {
        let request: GradingRequest =
            serde_json::from_value(value).context("Request has an invalid shape")?;
        Ok(GradeInput::Single(request))
    }
}

fn write_output(output: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, format!("{}\n", output))
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            info!("Wrote results to {}", path.display());
        }
        None => println!("{}", output),
    }
    Ok(())
}

pub async fn handle_health(args: &HealthArgs) -> i32 {
    let mut config = GraderConfig::default();
    if let Some(provider) = args.provider {
        config.provider = provider;
        config.model = default_model(provider).to_string();
    }

    let selected = select_judgment_client(&config).await;
    let status = health_status(&config, selected.as_ref());

    let mut results = HashMap::new();
    results.insert(config.provider.as_str().to_string(), status);

    let formatter = OutputFormatter::new(OutputFormat::from(args.format));
    match formatter.format_health(&results) {
        Ok(output) => {
            println!("{}", output);
            EXIT_OK
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_FAILURE
        }
    }
}

fn health_status(config: &GraderConfig, selected: Option<&SelectedClient>) -> HealthStatus {
    let status = match selected {
        Some(selected) => HealthStatus::available(format!("Using {}", selected.description)),
        None if config.fallback_only => {
            HealthStatus::unavailable("Fallback-only mode is enabled".to_string())
        }
        None => HealthStatus::unavailable(format!(
            "No judgment client for {} could be selected",
            config.provider.as_str()
        )),
    };

    let mut settings = config.to_display_map();
    if let Some(model) = selected.and_then(|s| s.client.model_info()) {
        settings.insert("model".to_string(), model);
    }
    let mut entries: Vec<_> = settings.into_iter().collect();
    entries.sort();

    let details = entries
        .iter()
        .map(|(key, value)| format!("{}: {}", key, value))
        .collect::<Vec<_>>()
        .join(", ");
    status.with_details(details)
}

/// Resolves `-` and a missing path the same way `grade` does.
pub fn input_label(path: Option<&PathBuf>) -> String {
    match path {
        Some(p) if p.as_path() != Path::new("-") => p.display().to_string(),
        _ => "<stdin>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::OutputFormatArg;
    use serial_test::serial;
    use tempfile::TempDir;

    const REQUEST: &str = r#"{
        "question": {
            "id": "q-7",
            "subject": "Biology",
            "unit": "Unit 3",
            "topic": "Respiration",
            "prompt": "Answer both parts.",
            "parts": [
                {"id": "p1", "label": "(a)", "question": "Describe glycolysis.", "maxPoints": 2},
                {"id": "p2", "label": "(b)", "question": "Explain chemiosmosis.", "maxPoints": 2}
            ],
            "totalPoints": 4
        },
        "responses": [
            {"partId": "p1", "text": "Glycolysis splits glucose.", "timeSpent": 60, "wordCount": 3}
        ]
    }"#;

    fn grade_args(dir: &TempDir, input: &str) -> GradeArgs {
        let path = dir.path().join("request.json");
        std::fs::write(&path, input).unwrap();
        GradeArgs {
            input: Some(path),
            format: OutputFormatArg::Json,
            fallback_only: true,
            timeout: None,
            provider: None,
            model: None,
            journal: None,
            output: Some(dir.path().join("out.json")),
        }
    }

    #[test]
    fn test_parse_single_and_batch() {
        assert!(matches!(parse_input(REQUEST).unwrap(), GradeInput::Single(_)));

        let batch = format!("[{}, {}]", REQUEST, REQUEST);
        match parse_input(&batch).unwrap() {
            GradeInput::Batch(requests) => assert_eq!(requests.len(), 2),
            other => panic!("Expected batch, got {:?}", other),
        }

        assert!(parse_input("not json").is_err());
    }

    #[test]
    #[serial]
    fn test_cli_overrides_config() {
        let dir = TempDir::new().unwrap();
        let mut args = grade_args(&dir, REQUEST);
        args.provider = Some(genai::adapter::AdapterKind::OpenAI);
        args.timeout = Some(42);

        let config = grade_config(&args);
        assert_eq!(config.provider, genai::adapter::AdapterKind::OpenAI);
        assert_eq!(config.model, default_model(genai::adapter::AdapterKind::OpenAI));
        assert_eq!(config.request_timeout_secs, 42);
        assert!(config.fallback_only);
    }

    #[tokio::test]
    #[serial]
    async fn test_grade_writes_fallback_result() {
        let dir = TempDir::new().unwrap();
        let args = grade_args(&dir, REQUEST);

        assert_eq!(handle_grade(&args).await, EXIT_OK);

        let written = std::fs::read_to_string(dir.path().join("out.json")).unwrap();
        let result: Value = serde_json::from_str(written.trim()).unwrap();
        assert_eq!(result["questionId"], "q-7");
        assert_eq!(result["model"], "fallback");
        assert_eq!(result["maxScore"], 4.0);
    }

    #[tokio::test]
    #[serial]
    async fn test_invalid_request_exit_code() {
        let dir = TempDir::new().unwrap();
        let args = grade_args(&dir, r#"{"responses": []}"#);

        assert_eq!(handle_grade(&args).await, EXIT_INVALID_REQUEST);
    }

    #[tokio::test]
    #[serial]
    async fn test_missing_file_exit_code() {
        let dir = TempDir::new().unwrap();
        let mut args = grade_args(&dir, REQUEST);
        args.input = Some(dir.path().join("missing.json"));

        assert_eq!(handle_grade(&args).await, EXIT_FAILURE);
    }

    #[test]
    #[serial]
    fn test_health_details_list_settings() {
        let config = GraderConfig {
            fallback_only: true,
            model: "qwen2.5:7b".to_string(),
            journal_path: None,
            ..GraderConfig::default()
        };

        let status = health_status(&config, None);

        assert!(!status.available);
        assert_eq!(status.message, "Fallback-only mode is enabled");
        let details = status.details.unwrap();
        assert!(details.contains("fallback_only: true"));
        assert!(details.contains("model: qwen2.5:7b"));
        assert!(!details.contains("journal"));
    }

    #[test]
    #[serial]
    fn test_health_details_use_client_model() {
        let config = GraderConfig {
            fallback_only: false,
            model: "configured-model".to_string(),
            ..GraderConfig::default()
        };
        let selected = SelectedClient {
            client: std::sync::Arc::new(crate::llm::MockLLMClient::new()),
            provider: config.provider,
            description: "mock judgment client".to_string(),
        };

        let status = health_status(&config, Some(&selected));

        assert!(status.available);
        assert_eq!(status.message, "Using mock judgment client");
        let details = status.details.unwrap();
        assert!(details.contains("model: mock-model"));
        assert!(!details.contains("configured-model"));
    }

    #[test]
    fn test_input_label() {
        assert_eq!(input_label(None), "<stdin>");
        assert_eq!(input_label(Some(&PathBuf::from("-"))), "<stdin>");
        assert_eq!(input_label(Some(&PathBuf::from("a.json"))), "a.json");
    }
}

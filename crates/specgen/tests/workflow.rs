use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use specgen::config::ConfigError;
use specgen::problems::{Problem, catalogue};
use specgen::workflow::{append_test_cases, generate_specs};
use specgen::{Session, SessionBuilder};
use specgen_model::{ErrorKind, ModelMessage};
use specgen_test_model::{PresetResponse, TestModelProvider};

/// Hands out one scripted provider per session, recording which agent
/// each session was created for.
struct ScriptedFactory {
    providers: Mutex<VecDeque<TestModelProvider>>,
    agents: Mutex<Vec<String>>,
}

impl ScriptedFactory {
    fn new(providers: impl IntoIterator<Item = TestModelProvider>) -> Self {
        Self {
            providers: Mutex::new(providers.into_iter().collect()),
            agents: Mutex::new(Vec::new()),
        }
    }

    fn create(&self, agent_name: &str) -> Result<Session, ConfigError> {
        self.agents.lock().unwrap().push(agent_name.to_owned());
        let provider = self.providers.lock().unwrap().pop_front().unwrap();
        Ok(SessionBuilder::with_model_provider(provider).build())
    }
}

fn user_input(provider: &TestModelProvider) -> String {
    let requests = provider.requests();
    requests[0]
        .messages
        .iter()
        .find_map(|message| match message {
            ModelMessage::User(text) => Some(text.clone()),
            _ => None,
        })
        .unwrap()
}

#[tokio::test]
async fn test_generate_specs_writes_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("formal_specification")).unwrap();
    let problems = catalogue(dir.path());

    let providers: Vec<_> = problems
        .iter()
        .map(|problem| {
            let command = format!(
                "echo 'assert result is not None' > {}",
                problem.spec_file.display()
            );
            TestModelProvider::with_script([
                PresetResponse::tool_call(
                    "call_1",
                    "bash_command",
                    serde_json::json!({ "command": command }).to_string(),
                ),
                PresetResponse::text("Saved."),
            ])
        })
        .collect();
    let factory = ScriptedFactory::new(providers.clone());

    let reports =
        generate_specs(&|name: &str| factory.create(name), &problems)
            .await
            .unwrap();

    assert_eq!(reports.len(), 2);
    for (report, problem) in reports.iter().zip(&problems) {
        assert_eq!(report.problem_id, problem.id);
        assert_eq!(report.result.as_deref().unwrap(), "Saved.");
        let written = fs::read_to_string(&problem.spec_file).unwrap();
        assert_eq!(written, "assert result is not None\n");
    }
    assert_eq!(
        *factory.agents.lock().unwrap(),
        vec!["reviewer_agent", "reviewer_agent"]
    );
    assert!(
        user_input(&providers[1])
            .contains("def task_func(process_name: str) -> str:")
    );
}

#[tokio::test]
async fn test_failure_does_not_stop_later_problems() {
    let problems = catalogue("/work");
    let first = TestModelProvider::with_script([PresetResponse::failing(
        ErrorKind::Transport,
    )]);
    let second =
        TestModelProvider::with_script([PresetResponse::text("Appended.")]);
    let factory = ScriptedFactory::new([first, second.clone()]);

    let reports =
        append_test_cases(&|name: &str| factory.create(name), &problems)
            .await
            .unwrap();

    assert!(!reports[0].is_success());
    assert!(reports[1].is_success());
    assert_eq!(second.request_count(), 1);
    assert_eq!(
        *factory.agents.lock().unwrap(),
        vec!["test_gen_agent", "test_gen_agent"]
    );
    assert!(user_input(&second).contains(
        "APPEND them to \
         `/work/problems_from_exercise2/test_BigCodeBench_17.py`"
    ));
}

#[tokio::test]
async fn test_config_error_is_fatal() {
    let problems = vec![Problem::new(15, "prompt", Path::new("/work"))];
    let factory = |name: &str| -> Result<Session, ConfigError> {
        Err(ConfigError::MissingModel(name.to_owned()))
    };

    let err = generate_specs(&factory, &problems).await.unwrap_err();
    assert!(matches!(
        err,
        ConfigError::MissingModel(name) if name == "reviewer_agent"
    ));
}

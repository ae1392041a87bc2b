//! The two passes run over the benchmark problems: write a formal
//! specification for each, then append spec-guided tests to each.
//!
//! Every problem gets a fresh session. A run that fails is logged and
//! reported, and the remaining problems still run. Configuration errors
//! abort the whole pass.

use std::fmt::{self, Display};
use std::path::{Path, PathBuf};

use crate::config::{AgentConfig, ConfigError, ConfigFile, Credentials};
use crate::problems::Problem;
use crate::session::{Session, SessionBuilder};

/// Creates a session for a named agent.
pub trait SessionFactory {
    /// Creates a fresh session for `agent_name`.
    fn create_session(&self, agent_name: &str) -> Result<Session, ConfigError>;
}

impl<F> SessionFactory for F
where
    F: Fn(&str) -> Result<Session, ConfigError>,
{
    #[inline]
    fn create_session(&self, agent_name: &str) -> Result<Session, ConfigError> {
        self(agent_name)
    }
}

/// A [`SessionFactory`] backed by the configuration document.
#[derive(Debug)]
pub struct ConfigSessionFactory {
    file: ConfigFile,
    credentials: Credentials,
    model_override: Option<String>,
    max_turns: Option<usize>,
}

impl ConfigSessionFactory {
    /// Creates a factory resolving agents from `file`.
    pub fn new(file: ConfigFile, credentials: Credentials) -> Self {
        Self {
            file,
            credentials,
            model_override: None,
            max_turns: None,
        }
    }

    /// Uses `model` for every agent instead of the configured one.
    pub fn with_model_override<S: Into<String>>(mut self, model: S) -> Self {
        self.model_override = Some(model.into());
        self
    }

    /// Sets the turn budget of every session.
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = Some(max_turns);
        self
    }

    /// Resolves the configuration of an agent.
    pub fn agent_config(
        &self,
        agent_name: &str,
    ) -> Result<AgentConfig, ConfigError> {
        self.file.agent_config(
            agent_name,
            self.model_override.as_deref(),
            &self.credentials,
        )
    }
}

impl SessionFactory for ConfigSessionFactory {
    fn create_session(&self, agent_name: &str) -> Result<Session, ConfigError> {
        let config = self.agent_config(agent_name)?;
        let mut builder = SessionBuilder::from_config(&config);
        if let Some(max_turns) = self.max_turns {
            builder = builder.with_max_turns(max_turns);
        }
        Ok(builder.build())
    }
}

/// One of the workflow passes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Task {
    /// Derive a formal specification from the problem prompt.
    GenerateSpec,
    /// Append spec-guided test cases to the problem's test file.
    AppendTests,
}

impl Task {
    /// Returns the agent that carries out the task.
    pub fn agent_name(self) -> &'static str {
        match self {
            Task::GenerateSpec => "reviewer_agent",
            Task::AppendTests => "test_gen_agent",
        }
    }

    /// Returns the file the task writes to.
    pub fn output_file(self, problem: &Problem) -> &Path {
        match self {
            Task::GenerateSpec => &problem.spec_file,
            Task::AppendTests => &problem.test_file,
        }
    }

    /// Returns the instruction sent to the agent.
    pub fn instruction(self, problem: &Problem) -> String {
        match self {
            Task::GenerateSpec => format!(
                "Here is the problem description and function signature:\n\
                 {prompt}\n\
                 Please generate formal specifications (assertions) \
                 for this function.\n\
                 Ensure the specifications are correct \
                 (no self-reference, no side-effects).\n\
                 Then, SAVE the specifications to `{spec_file}` \
                 using `bash_command`.",
                prompt = problem.prompt,
                spec_file = problem.spec_file.display(),
            ),
            Task::AppendTests => format!(
                "Read the formal specifications from `{spec_file}`.\n\
                 Read the existing test file `{test_file}` \
                 to understand the context.\n\
                 Generate spec-guided test cases \
                 and APPEND them to `{test_file}`.\n\
                 Use `bash_command` to append the code.",
                spec_file = problem.spec_file.display(),
                test_file = problem.test_file.display(),
            ),
        }
    }
}

impl Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::GenerateSpec => f.write_str("spec"),
            Task::AppendTests => f.write_str("tests"),
        }
    }
}

/// What happened to one problem in one pass.
#[derive(Debug)]
pub struct ProblemReport {
    /// The problem identifier.
    pub problem_id: u32,
    /// The pass the report belongs to.
    pub task: Task,
    /// The file the agent was asked to write.
    pub output_file: PathBuf,
    /// The agent's final answer, or why the run failed.
    pub result: Result<String, specgen_core::Error>,
}

impl ProblemReport {
    /// Returns `true` if the run completed.
    #[inline]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Runs one task for one problem on a fresh session.
pub async fn run_problem<F: SessionFactory + ?Sized>(
    factory: &F,
    task: Task,
    problem: &Problem,
) -> Result<ProblemReport, ConfigError> {
    let session = factory.create_session(task.agent_name())?;
    let output_file = task.output_file(problem).to_owned();

    info!("problem {}: generating {task}", problem.id);
    let result = session.run(&task.instruction(problem)).await;
    match &result {
        Ok(_) => info!(
            "problem {}: {task} written to {}",
            problem.id,
            output_file.display()
        ),
        Err(err) => error!("problem {}: {task} failed: {err}", problem.id),
    }

    Ok(ProblemReport {
        problem_id: problem.id,
        task,
        output_file,
        result,
    })
}

/// Runs `task` for every problem, in order.
pub async fn run_task<F: SessionFactory + ?Sized>(
    factory: &F,
    task: Task,
    problems: &[Problem],
) -> Result<Vec<ProblemReport>, ConfigError> {
    let mut reports = Vec::with_capacity(problems.len());
    for problem in problems {
        reports.push(run_problem(factory, task, problem).await?);
    }
    Ok(reports)
}

/// Has `reviewer_agent` write a formal specification for every problem.
#[inline]
pub async fn generate_specs<F: SessionFactory + ?Sized>(
    factory: &F,
    problems: &[Problem],
) -> Result<Vec<ProblemReport>, ConfigError> {
    run_task(factory, Task::GenerateSpec, problems).await
}

/// Has `test_gen_agent` append spec-guided tests for every problem.
#[inline]
pub async fn append_test_cases<F: SessionFactory + ?Sized>(
    factory: &F,
    problems: &[Problem],
) -> Result<Vec<ProblemReport>, ConfigError> {
    run_task(factory, Task::AppendTests, problems).await
}

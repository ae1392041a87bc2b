//! The benchmark problems the workflow runs over.

use std::path::{Path, PathBuf};

/// One benchmark problem and the files the agents work on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Problem {
    /// The BigCodeBench task number.
    pub id: u32,
    /// Function signature and docstring handed to the model.
    pub prompt: String,
    /// Where the generated specification is saved.
    pub spec_file: PathBuf,
    /// The existing test file the generated cases are appended to.
    pub test_file: PathBuf,
}

impl Problem {
    /// Creates a problem whose files follow the repository layout, rooted
    /// at `base_dir`.
    pub fn new<S: Into<String>>(id: u32, prompt: S, base_dir: &Path) -> Self {
        Self {
            id,
            prompt: prompt.into(),
            spec_file: base_dir
                .join("formal_specification")
                .join(format!("problem_{id}_spec.txt")),
            test_file: base_dir
                .join("problems_from_exercise2")
                .join(format!("test_BigCodeBench_{id}.py")),
        }
    }
}

const BIGCODEBENCH_15: &str = include_str!("./problems/bigcodebench_15.py");
const BIGCODEBENCH_17: &str = include_str!("./problems/bigcodebench_17.py");

/// Returns the built-in problems, with paths made absolute against
/// `base_dir`.
pub fn catalogue<P: AsRef<Path>>(base_dir: P) -> Vec<Problem> {
    let base_dir = absolute(base_dir.as_ref());
    vec![
        Problem::new(15, BIGCODEBENCH_15, &base_dir),
        Problem::new(17, BIGCODEBENCH_17, &base_dir),
    ]
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|err| {
        warn!("cannot make {} absolute: {err}", path.display());
        path.to_owned()
    })
}

//! In-memory [`Vcs`] double for unit tests
//!
//! Records every call as `"<operation> <args...>"` and answers from rules.
//! Calls that match no rule succeed with empty output.

use std::cell::{Cell, RefCell};

use super::{ExecOptions, ExecResult, Vcs, command_line};

enum Matcher {
    Prefix(String),
    Contains(String),
}

struct Rule {
    matcher: Matcher,
    responses: Vec<ExecResult>,
    hits: Cell<usize>,
}

impl Rule {
    fn matches(&self, call: &str) -> bool {
        match &self.matcher {
            Matcher::Prefix(prefix) => {
                call == prefix || call.starts_with(&format!("{prefix} "))
            }
            Matcher::Contains(needle) => call.contains(needle.as_str()),
        }
    }

    /// Responses are consumed in order; the last one repeats
    fn next(&self) -> ExecResult {
        let index = self.hits.get().min(self.responses.len() - 1);
        self.hits.set(self.hits.get() + 1);
        self.responses[index].clone()
    }
}

#[derive(Default)]
pub(crate) struct ScriptedGit {
    rules: Vec<Rule>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedGit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer calls starting with `prefix` (matched on whole words)
    pub fn on(self, prefix: &str, result: ExecResult) -> Self {
        self.on_sequence(prefix, vec![result])
    }

    pub fn on_sequence(mut self, prefix: &str, responses: Vec<ExecResult>) -> Self {
        assert!(!responses.is_empty());
        self.rules.push(Rule {
            matcher: Matcher::Prefix(prefix.to_string()),
            responses,
            hits: Cell::new(0),
        });
        self
    }

    /// Answer any call whose rendered form contains `needle`
    pub fn on_containing(mut self, needle: &str, result: ExecResult) -> Self {
        self.rules.push(Rule {
            matcher: Matcher::Contains(needle.to_string()),
            responses: vec![result],
            hits: Cell::new(0),
        });
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Calls whose operation is `operation`
    pub fn calls_of(&self, operation: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call == operation || call.starts_with(&format!("{operation} ")))
            .collect()
    }
}

pub(crate) fn ok(output: &str) -> ExecResult {
    ExecResult::ok("", output)
}

pub(crate) fn fail(error: &str) -> ExecResult {
    ExecResult::failed("", error)
}

impl Vcs for ScriptedGit {
    fn execute(&self, operation: &str, args: &[&str], _options: ExecOptions) -> ExecResult {
        let rendered = command_line("git", operation, args);
        let call = rendered.trim_start_matches("git ").to_string();
        self.calls.borrow_mut().push(call.clone());

        let mut result = self
            .rules
            .iter()
            .find(|rule| rule.matches(&call))
            .map(Rule::next)
            .unwrap_or_else(|| ExecResult::ok("", ""));
        result.command = rendered;
        result
    }
}

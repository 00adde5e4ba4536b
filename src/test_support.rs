//! Stub inspectors, prompters and patchers for unit tests.

use crate::inspect::DependencySource;
use crate::patch::{PatchOutcome, Patcher};
use crate::prompt::{parse_answer, Prompted, Prompter};
use crate::Error;
use camino::{Utf8Path, Utf8PathBuf};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

/// Canned load-command listings keyed by artifact path.
#[derive(Debug, Default)]
pub(crate) struct Listing(HashMap<Utf8PathBuf, Vec<String>>);

impl Listing {
    pub(crate) fn with(mut self, artifact: &str, references: &[&str]) -> Self {
        self.0.insert(
            Utf8PathBuf::from(artifact),
            references.iter().map(|r| r.to_string()).collect(),
        );
        self
    }
}

impl DependencySource for Listing {
    fn load_commands(&self, artifact: &Utf8Path) -> Result<Vec<String>, Error> {
        Ok(self.0.get(artifact).cloned().unwrap_or_default())
    }
}

/// Answers prompts from a script; `"^C"` interrupts.
#[derive(Debug)]
pub(crate) struct Scripted {
    answers: VecDeque<String>,
    pub(crate) asked: Vec<String>,
}

impl Scripted {
    pub(crate) fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            asked: Vec::new(),
        }
    }
}

impl Prompter for Scripted {
    fn decide(&mut self, reference: &str) -> Result<Prompted, Error> {
        self.asked.push(reference.to_string());
        let answer = self
            .answers
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected prompt for {reference}"));
        if answer == "^C" {
            return Ok(Prompted::Interrupted);
        }
        let decision = parse_answer(&answer).unwrap_or_else(|| panic!("bad scripted answer {answer}"));
        Ok(Prompted::Decided(decision))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    SetId(String, String),
    Change(String, String, String),
    AddRpath(String, String),
    Resign(String),
}

/// Records every mutation; the listed file names fail their `-change`.
#[derive(Debug, Default)]
pub(crate) struct Recording {
    pub(crate) calls: RefCell<Vec<Call>>,
    pub(crate) failing_changes: Vec<String>,
}

fn name(path: &Utf8Path) -> String {
    path.file_name().unwrap_or(path.as_str()).to_string()
}

impl Patcher for Recording {
    fn set_id(&self, path: &Utf8Path, id: &str) -> Result<PatchOutcome, Error> {
        self.calls
            .borrow_mut()
            .push(Call::SetId(name(path), id.to_string()));
        Ok(PatchOutcome::Applied)
    }

    fn change_reference(
        &self,
        path: &Utf8Path,
        old: &str,
        new: &str,
    ) -> Result<PatchOutcome, Error> {
        self.calls
            .borrow_mut()
            .push(Call::Change(name(path), old.to_string(), new.to_string()));
        if self.failing_changes.contains(&name(path)) {
            return Err(Error::Tool {
                tool: "install_name_tool",
                path: path.to_owned(),
                stderr: "malformed object".to_string(),
            });
        }
        Ok(PatchOutcome::Applied)
    }

    fn add_rpath(&self, path: &Utf8Path, rpath: &str) -> Result<PatchOutcome, Error> {
        self.calls
            .borrow_mut()
            .push(Call::AddRpath(name(path), rpath.to_string()));
        Ok(PatchOutcome::Applied)
    }

    fn resign(&self, path: &Utf8Path) -> Result<PatchOutcome, Error> {
        self.calls.borrow_mut().push(Call::Resign(name(path)));
        Ok(PatchOutcome::Applied)
    }
}

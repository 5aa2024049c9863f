#![allow(dead_code)]

use anyhow::{Context, Result, anyhow};
use listing_catalog::{
    AgentListing, ChatflowListing, Collection, ListingId, ListingMetadata, ListingSource,
};
use serde_json::Value;
use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

pub fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Sample catalog shipped with the repository.
pub fn sample_catalog() -> PathBuf {
    repo_root().join("data")
}

/// One scripted response. A gated step blocks until its sender fires.
pub struct Step {
    outcome: Result<Value, String>,
    gate: Option<Receiver<()>>,
}

impl Step {
    pub fn ok(value: Value) -> Self {
        Step {
            outcome: Ok(value),
            gate: None,
        }
    }

    pub fn fail(message: &str) -> Self {
        Step {
            outcome: Err(message.to_string()),
            gate: None,
        }
    }

    /// Hold this step until the returned sender is signalled (or dropped).
    pub fn gated(mut self) -> (Self, Sender<()>) {
        let (tx, rx) = mpsc::channel();
        self.gate = Some(rx);
        (self, tx)
    }
}

/// Source that replays queued steps per collection, in call order.
#[derive(Default)]
pub struct ScriptedSource {
    steps: Mutex<BTreeMap<Collection, VecDeque<Step>>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, collection: Collection, step: Step) -> &Self {
        self.steps
            .lock()
            .unwrap()
            .entry(collection)
            .or_default()
            .push_back(step);
        self
    }

    /// Steps still queued for `collection`.
    pub fn pending(&self, collection: Collection) -> usize {
        self.steps
            .lock()
            .unwrap()
            .get(&collection)
            .map_or(0, VecDeque::len)
    }
}

impl ListingSource for ScriptedSource {
    fn fetch(&self, collection: Collection) -> Result<Value> {
        let step = self
            .steps
            .lock()
            .unwrap()
            .get_mut(&collection)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| anyhow!("no scripted response left for {collection}"))?;
        if let Some(gate) = step.gate {
            let _ = gate.recv();
        }
        step.outcome.map_err(|msg| anyhow!(msg))
    }
}

pub fn agent(slug: &str, category: &str) -> AgentListing {
    AgentListing {
        id: ListingId(format!("agent-{slug}")),
        slug: slug.to_string(),
        name: slug.replace('-', " "),
        description: String::new(),
        category: category.to_string(),
        capabilities: Vec::new(),
        metadata: ListingMetadata::default(),
    }
}

pub fn chatflow(slug: &str, category: &str) -> ChatflowListing {
    ChatflowListing {
        id: ListingId(format!("flow-{slug}")),
        slug: slug.to_string(),
        name: slug.replace('-', " "),
        description: String::new(),
        category: category.to_string(),
        metadata: ListingMetadata::default(),
    }
}

pub fn write_catalog(dir: &Path, agents: &Value, chatflows: &Value) -> Result<()> {
    std::fs::write(dir.join("agents.json"), serde_json::to_vec(agents)?)?;
    std::fs::write(dir.join("chatflows.json"), serde_json::to_vec(chatflows)?)?;
    Ok(())
}

/// Path to the compiled `catalog-browse` binary.
pub fn browse_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_catalog-browse"))
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    cmd.env_remove("RUST_LOG");
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    Ok(output)
}

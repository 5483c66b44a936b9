use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// The four operations a plan may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    CreateDirectory,
    CreateFile,
    ModifyFile,
    RunCommand,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        ActionKind::CreateDirectory,
        ActionKind::CreateFile,
        ActionKind::ModifyFile,
        ActionKind::RunCommand,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateDirectory => "create_directory",
            Self::CreateFile => "create_file",
            Self::ModifyFile => "modify_file",
            Self::RunCommand => "run_command",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    /// Whether records of this kind carry a `path` field.
    pub fn has_path(self) -> bool {
        !matches!(self, Self::RunCommand)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the body of a created file comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// Literal file content (may be empty).
    Content(String),
    /// Prompt handed to the text generator to produce the content.
    GeneratePrompt(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepKind {
    CreateDirectory {
        path: String,
    },
    CreateFile {
        path: String,
        source: FileSource,
    },
    ModifyFile {
        path: String,
        modification_prompt: String,
    },
    RunCommand {
        command: String,
    },
}

impl StepKind {
    pub fn action(&self) -> ActionKind {
        match self {
            Self::CreateDirectory { .. } => ActionKind::CreateDirectory,
            Self::CreateFile { .. } => ActionKind::CreateFile,
            Self::ModifyFile { .. } => ActionKind::ModifyFile,
            Self::RunCommand { .. } => ActionKind::RunCommand,
        }
    }

    pub fn path(&self) -> Option<&str> {
        match self {
            Self::CreateDirectory { path }
            | Self::CreateFile { path, .. }
            | Self::ModifyFile { path, .. } => Some(path),
            Self::RunCommand { .. } => None,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Self::CreateDirectory { .. })
    }
}

/// One canonical plan operation with its 1-based sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanStep {
    pub step: usize,
    pub description: String,
    pub kind: StepKind,
}

impl PlanStep {
    pub fn new(step: usize, description: impl Into<String>, kind: StepKind) -> Self {
        Self {
            step,
            description: description.into(),
            kind,
        }
    }

    pub fn action(&self) -> ActionKind {
        self.kind.action()
    }

    pub fn path(&self) -> Option<&str> {
        self.kind.path()
    }
}

// Steps serialize back into the flat record shape they were read from, so a
// canonical plan can be fed to the normalizer again.
impl Serialize for PlanStep {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("step", &self.step)?;
        map.serialize_entry("action", self.action().as_str())?;
        map.serialize_entry("description", &self.description)?;
        match &self.kind {
            StepKind::CreateDirectory { path } => {
                map.serialize_entry("path", path)?;
            }
            StepKind::CreateFile { path, source } => {
                map.serialize_entry("path", path)?;
                match source {
                    FileSource::Content(content) => map.serialize_entry("content", content)?,
                    FileSource::GeneratePrompt(prompt) => {
                        map.serialize_entry("generate_prompt", prompt)?
                    }
                }
            }
            StepKind::ModifyFile {
                path,
                modification_prompt,
            } => {
                map.serialize_entry("path", path)?;
                map.serialize_entry("modification_prompt", modification_prompt)?;
            }
            StepKind::RunCommand { command } => {
                map.serialize_entry("command", command)?;
            }
        }
        map.end()
    }
}

/// Validated, consolidated and renumbered plan.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ExecutionPlan {
    pub description: String,
    pub steps: Vec<PlanStep>,
}

impl ExecutionPlan {
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

//! Workflow graphs as data.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use super::DefinitionError;

const INVOICE_YAML: &str = include_str!("../../workflows/invoice.yaml");
const RECURRING_INVOICE_YAML: &str = include_str!("../../workflows/recurring_invoice.yaml");

/// `from` may be written as a single place or a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for Vec<String> {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(place) => vec![place],
            OneOrMany::Many(places) => places,
        }
    }
}

/// A named edge from one or more places to a single place.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransitionDefinition {
    pub name: String,
    #[serde(deserialize_with = "deserialize_from")]
    pub from: Vec<String>,
    pub to: String,
}

fn deserialize_from<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    OneOrMany::deserialize(deserializer).map(Into::into)
}

/// A state machine graph.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkflowDefinition {
    pub name: String,
    pub initial_place: String,
    pub places: Vec<String>,
    pub transitions: Vec<TransitionDefinition>,
}

impl WorkflowDefinition {
    pub fn from_yaml(yaml: &str) -> Result<Self, DefinitionError> {
        let definition: Self =
            serde_yaml::from_str(yaml).map_err(|e| DefinitionError::Parse(e.to_string()))?;
        definition.validate()?;
        Ok(definition)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DefinitionError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| DefinitionError::FileRead(path.display().to_string(), e.to_string()))?;
        Self::from_yaml(&content)
    }

    /// Graph shipped for standard invoices.
    pub fn invoice() -> Result<Self, DefinitionError> {
        Self::from_yaml(INVOICE_YAML)
    }

    /// Graph shipped for recurring invoices.
    pub fn recurring_invoice() -> Result<Self, DefinitionError> {
        Self::from_yaml(RECURRING_INVOICE_YAML)
    }

    /// Check the graph is a usable state machine: every referenced place is
    /// declared and no place has two edges with the same name.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        let places: HashSet<&str> = self.places.iter().map(String::as_str).collect();
        let unknown = |place: &str| DefinitionError::UnknownPlace {
            workflow: self.name.clone(),
            place: place.to_string(),
        };

        if !places.contains(self.initial_place.as_str()) {
            return Err(unknown(&self.initial_place));
        }

        let mut edges = HashSet::new();
        for transition in &self.transitions {
            if transition.name.is_empty() || transition.from.is_empty() {
                return Err(DefinitionError::EmptyTransition {
                    workflow: self.name.clone(),
                });
            }
            if !places.contains(transition.to.as_str()) {
                return Err(unknown(&transition.to));
            }
            for from in &transition.from {
                if !places.contains(from.as_str()) {
                    return Err(unknown(from));
                }
                if !edges.insert((from.as_str(), transition.name.as_str())) {
                    return Err(DefinitionError::AmbiguousTransition {
                        workflow: self.name.clone(),
                        transition: transition.name.clone(),
                        place: from.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

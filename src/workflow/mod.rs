//! Finite state machines over entity status.
//!
//! A [`StateMachine`] is built from a [`WorkflowDefinition`]: a set of places
//! and named transitions between them. [`StateMachine::apply`] looks up the
//! edge for the subject's current place and either moves the subject or
//! fails without touching it.

mod definition;
mod status;

pub use definition::{TransitionDefinition, WorkflowDefinition};
pub use status::{InvoiceStatus, Transition};

use std::collections::HashMap;

use tracing::{debug, warn};

/// Errors in a workflow graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    #[error("Failed to read workflow file '{0}': {1}")]
    FileRead(String, String),

    #[error("Failed to parse workflow definition: {0}")]
    Parse(String),

    #[error("Workflow '{workflow}' references undeclared place '{place}'")]
    UnknownPlace { workflow: String, place: String },

    #[error("Workflow '{workflow}' has more than one '{transition}' transition from '{place}'")]
    AmbiguousTransition {
        workflow: String,
        transition: String,
        place: String,
    },

    #[error("Workflow '{workflow}' has a transition without a name or source place")]
    EmptyTransition { workflow: String },
}

/// A transition that cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("Transition '{transition}' is not defined in workflow '{workflow}'")]
    Undefined { workflow: String, transition: String },

    #[error("Transition '{transition}' is not enabled in workflow '{workflow}' from place '{place}'")]
    NotEnabled {
        workflow: String,
        transition: String,
        place: String,
    },
}

/// An entity whose status is driven by a state machine.
pub trait Workflowable {
    /// Current place. An empty marking means the subject has not entered
    /// the workflow yet and is treated as the initial place.
    fn marking(&self) -> &str;

    fn set_marking(&mut self, place: &str);
}

/// A validated workflow graph.
#[derive(Debug, Clone)]
pub struct StateMachine {
    definition: WorkflowDefinition,
    // place -> transition -> destination
    edges: HashMap<String, HashMap<String, String>>,
}

impl StateMachine {
    pub fn new(definition: WorkflowDefinition) -> Result<Self, DefinitionError> {
        definition.validate()?;

        let mut edges: HashMap<String, HashMap<String, String>> = HashMap::new();
        for transition in &definition.transitions {
            for from in &transition.from {
                edges
                    .entry(from.clone())
                    .or_default()
                    .insert(transition.name.clone(), transition.to.clone());
            }
        }

        Ok(Self { definition, edges })
    }

    /// Workflow name, used in errors and logs.
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn initial_place(&self) -> &str {
        &self.definition.initial_place
    }

    pub fn definition(&self) -> &WorkflowDefinition {
        &self.definition
    }

    /// Whether `transition` can be applied to `subject` right now.
    pub fn can<S: Workflowable + ?Sized>(&self, subject: &S, transition: impl AsRef<str>) -> bool {
        self.destination(self.current_place(subject), transition.as_ref())
            .is_some()
    }

    /// Transitions enabled from the subject's place, in definition order.
    pub fn enabled_transitions<S: Workflowable + ?Sized>(&self, subject: &S) -> Vec<&str> {
        let place = self.current_place(subject);
        self.definition
            .transitions
            .iter()
            .filter(|t| t.from.iter().any(|from| from == place))
            .map(|t| t.name.as_str())
            .collect()
    }

    /// Move `subject` along `transition`, returning the new place.
    ///
    /// On error the subject's marking is left unchanged.
    pub fn apply<S: Workflowable + ?Sized>(
        &self,
        subject: &mut S,
        transition: impl AsRef<str>,
    ) -> Result<String, TransitionError> {
        let transition = transition.as_ref();
        let from = self.current_place(subject).to_string();

        let Some(to) = self.destination(&from, transition) else {
            let err = if self.is_defined(transition) {
                TransitionError::NotEnabled {
                    workflow: self.name().to_string(),
                    transition: transition.to_string(),
                    place: from,
                }
            } else {
                TransitionError::Undefined {
                    workflow: self.name().to_string(),
                    transition: transition.to_string(),
                }
            };
            warn!(workflow = %self.name(), %transition, error = %err, "transition rejected");
            return Err(err);
        };

        let to = to.to_string();
        subject.set_marking(&to);
        debug!(workflow = %self.name(), %transition, %from, %to, "transition applied");
        Ok(to)
    }

    fn current_place<'a, S: Workflowable + ?Sized>(&'a self, subject: &'a S) -> &'a str {
        let marking = subject.marking();
        if marking.is_empty() {
            self.initial_place()
        } else {
            marking
        }
    }

    fn destination(&self, from: &str, transition: &str) -> Option<&str> {
        self.edges
            .get(from)
            .and_then(|out| out.get(transition))
            .map(String::as_str)
    }

    fn is_defined(&self, transition: &str) -> bool {
        self.definition.transitions.iter().any(|t| t.name == transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Subject {
        status: String,
    }

    impl Workflowable for Subject {
        fn marking(&self) -> &str {
            &self.status
        }

        fn set_marking(&mut self, place: &str) {
            self.status = place.to_string();
        }
    }

    fn at(place: &str) -> Subject {
        Subject {
            status: place.to_string(),
        }
    }

    fn invoice_machine() -> StateMachine {
        StateMachine::new(WorkflowDefinition::invoice().unwrap()).unwrap()
    }

    fn recurring_machine() -> StateMachine {
        StateMachine::new(WorkflowDefinition::recurring_invoice().unwrap()).unwrap()
    }

    #[test]
    fn test_apply_moves_subject() {
        let machine = invoice_machine();
        let mut subject = at("new");
        assert_eq!(machine.apply(&mut subject, Transition::New).unwrap(), "draft");
        assert_eq!(machine.apply(&mut subject, Transition::Accept).unwrap(), "pending");
        assert!(subject.status == InvoiceStatus::Pending);
    }

    #[test]
    fn test_empty_marking_uses_initial_place() {
        let machine = invoice_machine();
        let mut subject = Subject::default();
        assert!(machine.can(&subject, "new"));
        machine.apply(&mut subject, "new").unwrap();
        assert_eq!(subject.status, "draft");
    }

    #[test]
    fn test_not_enabled_leaves_subject_untouched() {
        let machine = invoice_machine();
        let mut subject = at("paid");
        let err = machine.apply(&mut subject, Transition::Accept).unwrap_err();
        assert_eq!(
            err,
            TransitionError::NotEnabled {
                workflow: "invoice".to_string(),
                transition: "accept".to_string(),
                place: "paid".to_string(),
            }
        );
        assert_eq!(subject.status, "paid");
    }

    #[test]
    fn test_undefined_transition() {
        let machine = invoice_machine();
        let mut subject = at("draft");
        let err = machine.apply(&mut subject, Transition::Activate).unwrap_err();
        assert!(matches!(err, TransitionError::Undefined { .. }));
        assert_eq!(subject.status, "draft");
    }

    #[test]
    fn test_recurring_graph_activates_instead_of_accepting() {
        let machine = recurring_machine();
        let mut subject = at("draft");
        assert!(!machine.can(&subject, Transition::Accept));
        assert_eq!(machine.apply(&mut subject, Transition::Activate).unwrap(), "active");
    }

    #[test]
    fn test_enabled_transitions_in_definition_order() {
        let machine = invoice_machine();
        assert_eq!(
            machine.enabled_transitions(&at("pending")),
            vec!["overdue", "pay", "cancel", "archive"]
        );
        assert!(machine.enabled_transitions(&at("nowhere")).is_empty());
    }

    #[test]
    fn test_new_rejects_invalid_definition() {
        let mut definition = WorkflowDefinition::invoice().unwrap();
        definition.initial_place = "limbo".to_string();
        assert!(matches!(
            StateMachine::new(definition),
            Err(DefinitionError::UnknownPlace { .. })
        ));
    }
}

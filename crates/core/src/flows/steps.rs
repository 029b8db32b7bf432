//! Static flow-script data. A script is a finite directed path of steps;
//! every branch ends in either the next step or a terminal action.

/// One prompt/answer exchange in a script.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub prompt: String,
    /// Field name the raw reply is stored under, verbatim, before any
    /// branch is taken.
    pub capture_as: Option<&'static str>,
    /// `None` means the step advances unconditionally on any reply.
    pub on_negative: Option<Branch>,
    pub on_affirmative: Branch,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Branch {
    /// Move to the next step in the script.
    Advance,
    /// End the conversation with a terminal action.
    End(Terminal),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Terminal {
    Say(String),
    /// Run a business search with two previously captured fields.
    Search { term_field: &'static str, location_field: &'static str },
}

#[derive(Clone, Debug, PartialEq)]
pub struct FlowScript {
    steps: Vec<Step>,
}

impl FlowScript {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }
}

/// What the engine wants the hosting session to do next. Effects are plain
/// data; the engine itself performs no I/O.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowEffect {
    /// Send text without expecting a reply.
    Say(String),
    /// Send a question and suspend until the next reply on this session.
    Prompt(String),
    /// Call the business-search service and report its results.
    Search { term: String, location: String },
}

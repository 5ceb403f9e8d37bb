/// Button assumed when the request names none
pub const NEXT_BUTTON: &str = "submit_next";
/// Prefix of progress-bar jump buttons, e.g. `submit_jump_2.1`
pub const PROGRESS_BAR_PREFIX: &str = "submit_jump_";

/// How the request body was encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Multipart,
    Form,
}

/// Value of a request attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribute {
    Text(String),
    Bytes(Vec<u8>),
}

/// One request to the upload step.
///
/// Parameters and attributes keep request order. A parameter name may
/// repeat; lookups by name return the first value.
#[derive(Debug, Clone)]
pub struct StepRequest {
    kind: RequestKind,
    params: Vec<(String, String)>,
    attributes: Vec<(String, Attribute)>,
}

impl StepRequest {
    pub fn new(kind: RequestKind) -> Self {
        Self {
            kind,
            params: Vec::new(),
            attributes: Vec::new(),
        }
    }

    pub fn form() -> Self {
        Self::new(RequestKind::Form)
    }

    pub fn multipart() -> Self {
        Self::new(RequestKind::Multipart)
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_param(name, value);
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: Attribute) -> Self {
        self.push_attribute(name, value);
        self
    }

    pub fn push_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.push((name.into(), value.into()));
    }

    /// Adds or replaces an attribute, keeping the original position.
    pub fn push_attribute(&mut self, name: impl Into<String>, value: Attribute) {
        let name = name.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn is_multipart(&self) -> bool {
        self.kind == RequestKind::Multipart
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn params<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.params
            .iter()
            .filter(move |(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// The pressed button: the first parameter whose name starts with
    /// `submit`, or [`NEXT_BUTTON`].
    pub fn button(&self) -> &str {
        self.params
            .iter()
            .map(|(n, _)| n.as_str())
            .find(|n| n.starts_with("submit"))
            .unwrap_or(NEXT_BUTTON)
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|(n, _)| n.as_str())
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn text_attribute(&self, name: &str) -> Option<&str> {
        match self.attribute(name)? {
            Attribute::Text(text) => Some(text),
            Attribute::Bytes(_) => None,
        }
    }

    pub fn bytes_attribute(&self, name: &str) -> Option<&[u8]> {
        match self.attribute(name)? {
            Attribute::Bytes(bytes) => Some(bytes),
            Attribute::Text(_) => None,
        }
    }
}

/// Current submission and the bitstream being edited in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionInfo {
    pub submission_id: i32,
    pub item_id: i32,
    pub editing_bitstream: Option<i32>,
}

impl SubmissionInfo {
    pub fn new(submission_id: i32, item_id: i32) -> Self {
        Self {
            submission_id,
            item_id,
            editing_bitstream: None,
        }
    }
}

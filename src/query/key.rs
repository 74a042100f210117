use std::fmt;

/// Ordered cache key: resource name followed by parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    resource: String,
    parts: Vec<Option<String>>,
}

impl QueryKey {
    pub fn new(resource: &str) -> Self {
        Self {
            resource: resource.to_string(),
            parts: Vec::new(),
        }
    }

    pub fn with(mut self, part: impl ToString) -> Self {
        self.parts.push(Some(part.to_string()));
        self
    }

    /// Absent parameters still occupy a slot so keys stay positional.
    /// The slot is empty, so no parameter value can collide with it.
    pub fn with_opt(mut self, part: Option<impl ToString>) -> Self {
        self.parts.push(part.map(|p| p.to_string()));
        self
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.resource == prefix.resource && self.parts.starts_with(&prefix.parts)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}", self.resource)?;
        for part in &self.parts {
            write!(f, ", {}", part.as_deref().unwrap_or("-"))?;
        }
        write!(f, "]")
    }
}

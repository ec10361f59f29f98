//! Runtime parameters for one crawl invocation.

/// The fixed key set available to placeholder resolution. Built once per
/// `start` call from caller input and read-only during execution. Values
/// are opaque text; the core does no date or airport-code validation.
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    origin: String,
    destination: String,
    departure_date: String,
    return_date: Option<String>,
}

impl RuntimeContext {
    pub fn new(
        origin: impl Into<String>,
        destination: impl Into<String>,
        departure_date: impl Into<String>,
        return_date: Option<String>,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            departure_date: departure_date.into(),
            return_date,
        }
    }

    /// Resolve a placeholder key. Unknown keys (and an unset return date)
    /// are `None`; the resolver decides what that means.
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "origin" => Some(&self.origin),
            "destination" => Some(&self.destination),
            "departure_date" => Some(&self.departure_date),
            "return_date" => self.return_date.as_deref(),
            _ => None,
        }
    }
}

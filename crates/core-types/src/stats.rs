use std::fmt;

use serde::{Deserialize, Serialize};

/// Counters for a single fill pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub fields_populated: u32,
    pub errors: u32,
}

impl RunStats {
    pub fn record_populated(&mut self) {
        self.fields_populated += 1;
    }

    pub fn record_error(&mut self) {
        self.errors += 1;
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} fields populated, {} errors",
            self.fields_populated, self.errors
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_wire_names() {
        let mut stats = RunStats::default();
        stats.record_populated();
        stats.record_populated();
        stats.record_error();
        assert_eq!(
            serde_json::to_value(stats).unwrap(),
            serde_json::json!({"fields_populated": 2, "errors": 1})
        );
    }
}

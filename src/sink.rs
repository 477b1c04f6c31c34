use serde::Serialize;

/// One extracted directory entry. Field order is the CSV column order.
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    pub name: String,
    pub url: String,
    pub category: String,
    pub description: String,
    pub created_at: String,
}

/// Append-only accumulator for accepted records. Single writer, insertion
/// order preserved, drained once at the end of the run.
#[derive(Debug, Default)]
pub struct RecordSink {
    records: Vec<Record>,
}

impl RecordSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// No-op on `None` so rejected cards can be fed straight through.
    pub fn add(&mut self, record: Option<Record>) {
        if let Some(record) = record {
            self.records.push(record);
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn drain(self) -> Vec<Record> {
        self.records
    }
}

// Stable partition of records by configuration label

use crate::record::RunRecord;
use std::collections::HashMap;

/// Records sharing one configuration label, in input order
#[derive(Debug, Clone)]
pub struct RecordGroup<'a> {
    pub config: &'a str,
    pub records: Vec<&'a RunRecord>,
}

impl<'a> RecordGroup<'a> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record of the group; groups built by `group_by_config` are never empty
    pub fn representative(&self) -> Option<&'a RunRecord> {
        self.records.first().copied()
    }
}

/// Partition records by `config`.
///
/// Groups are ordered by first appearance of their label; records keep their
/// relative order inside each group.
pub fn group_by_config(records: &[RunRecord]) -> Vec<RecordGroup<'_>> {
    let mut groups: Vec<RecordGroup<'_>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let slot = *index.entry(record.config.as_str()).or_insert_with(|| {
            groups.push(RecordGroup {
                config: record.config.as_str(),
                records: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].records.push(record);
    }

    groups
}

//! Linear commit walk
//!
//! Histories are chains in this system (one parent per commit), so the walk
//! follows parent edges from a tip, optionally stopping at an excluded commit
//! (exclusive), which is how push collects what the remote lacks.

use crate::areas::database::Database;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;

pub struct RevList<'d> {
    database: &'d Database,
    cursor: Option<ObjectId>,
    stop_at: Option<ObjectId>,
}

impl<'d> RevList<'d> {
    /// Walk from `tip` back to the root
    pub fn new(database: &'d Database, tip: ObjectId) -> Self {
        RevList {
            database,
            cursor: Some(tip),
            stop_at: None,
        }
    }

    /// Walk from `tip`, stopping before `stop_at`
    pub fn until(database: &'d Database, tip: ObjectId, stop_at: Option<ObjectId>) -> Self {
        RevList {
            database,
            cursor: Some(tip),
            stop_at,
        }
    }
}

impl Iterator for RevList<'_> {
    type Item = anyhow::Result<(ObjectId, Commit)>;

    fn next(&mut self) -> Option<Self::Item> {
        let oid = self.cursor.take()?;
        if Some(&oid) == self.stop_at.as_ref() {
            return None;
        }

        match self.database.parse_commit(&oid) {
            Ok(commit) => {
                self.cursor = commit.parent().cloned();
                Some(Ok((oid, commit)))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

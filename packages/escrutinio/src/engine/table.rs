//! Tabular scan: the preferred DOM reading when the source renders a
//! results table.

use super::numeric;
use super::ExtractStrategy;
use crate::types::{CandidateTally, SnapshotSource};

/// Row reading: first cell is the candidate label; the vote count is the
/// first integer-parseable token scanning the remaining cells right to
/// left (counts sit in the trailing columns, percentages and seat counts
/// in between). A row is kept only when that token is positive and the
/// label is non-empty.
pub struct TableScan;

impl ExtractStrategy for TableScan {
    fn name(&self) -> &'static str {
        "table-scan"
    }

    fn candidates(&self, snapshot: &SnapshotSource) -> Vec<CandidateTally> {
        let SnapshotSource::Dom(dom) = snapshot else {
            return Vec::new();
        };

        let mut out = Vec::new();
        for row in &dom.rows {
            if row.len() < 2 {
                continue;
            }
            let name = row[0].trim();
            if name.is_empty() {
                continue;
            }
            let votes = row[1..]
                .iter()
                .rev()
                .find_map(|cell| numeric::parse_vote_count(cell));
            if let Some(votes) = votes {
                if votes > 0 {
                    out.push(CandidateTally::new(name, votes));
                }
            }
        }
        out
    }
}

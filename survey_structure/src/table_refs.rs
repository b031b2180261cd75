use std::collections::BTreeSet;

use crate::rules::table_reference;
use crate::tree::{Survey, TableRef};

/// The distinct external tables referenced by the questions of a survey, in
/// numerical order.
pub fn collect_table_refs(survey: &Survey) -> Vec<TableRef> {
    let refs: BTreeSet<TableRef> = survey
        .all_questions()
        .filter_map(|q| table_reference(&q.text))
        .collect();
    refs.into_iter().collect()
}

//! Flattens issue relationships into comments.
//!
//! The destination has no notion of typed links between issues, so every
//! link becomes a synthetic comment such as `Depends on: @PSTARTGH-42@PEND`.

use crate::export::{Comment, Issue, RelationshipKind};
use crate::references::ReferenceEncoder;
use tracing::debug;

/// Appends one comment per related key and clears the relationship lists.
///
/// Comments are appended kind by kind in [`RelationshipKind::ALL`] order,
/// keeping source order within a kind. Running this again on the same issue
/// adds nothing.
///
/// # Returns
///
/// The number of comments appended.
pub fn materialize_relationships(issue: &mut Issue, encoder: &ReferenceEncoder) -> usize {
    let relationships = std::mem::take(&mut issue.relationships);
    let before = issue.comments.len();

    for kind in RelationshipKind::ALL {
        let Some(keys) = relationships.get(&kind) else {
            continue;
        };
        for key in keys {
            let body = format!("{}{}", kind.comment_prefix(), encoder.encode(key));
            issue.comments.push(Comment::synthetic(body));
        }
    }

    let added = issue.comments.len() - before;
    if added > 0 {
        debug!(key = %issue.key, comments = added, "Flattened relationships into comments");
    }
    added
}

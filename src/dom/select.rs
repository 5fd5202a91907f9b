//! Tag-path selection
//!
//! `select(node, ["defs", "font", "glyph"])` yields every node reached from
//! `node` by following exactly that chain of child tags. A tag matches a
//! segment when it ends with `}` followed by the segment, so any namespace
//! matches but a name with no namespace never does.
//!
//! Matching is lazy and depth-first in document order. The walk keeps one
//! child iterator per matched level and no visited set.

use super::TreeNode;

/// True when `tag` ends with `}` + `segment`
#[inline]
pub fn tag_matches(tag: &str, segment: &str) -> bool {
    tag.strip_suffix(segment)
        .is_some_and(|head| head.ends_with('}'))
}

/// Start a path walk from `node`.
///
/// With no segments the walk yields `node` itself, once.
pub fn select<N, S>(node: N, segments: &[S]) -> PathMatches<'_, N, S>
where
    N: TreeNode,
    S: AsRef<str>,
{
    if segments.is_empty() {
        PathMatches {
            segments,
            start: Some(node),
            stack: Vec::new(),
        }
    } else {
        PathMatches {
            segments,
            start: None,
            stack: vec![node.children()],
        }
    }
}

/// Iterator returned by [`select`]
pub struct PathMatches<'s, N: TreeNode, S> {
    segments: &'s [S],
    start: Option<N>,
    /// `stack[i]` walks the candidates for `segments[i]`
    stack: Vec<N::Children>,
}

impl<N, S> Iterator for PathMatches<'_, N, S>
where
    N: TreeNode,
    S: AsRef<str>,
{
    type Item = N;

    fn next(&mut self) -> Option<N> {
        if let Some(node) = self.start.take() {
            return Some(node);
        }

        loop {
            let depth = self.stack.len().checked_sub(1)?;
            let Some(child) = self.stack[depth].next() else {
                self.stack.pop();
                continue;
            };

            if !tag_matches(child.tag(), self.segments[depth].as_ref()) {
                continue;
            }
            if depth + 1 == self.segments.len() {
                return Some(child);
            }
            self.stack.push(child.children());
        }
    }
}

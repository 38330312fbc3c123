// src/utils/thread.rs

use std::collections::{HashMap, HashSet};

use crate::models::comment::{Comment, CommentView};

/// Turns the flat comment rows of one article into a reply forest.
///
/// * Roots are comments with no parent, a parent id missing from `comments`,
///   or a parent id equal to their own id. Orphans are never dropped.
/// * Roots and every replies list are ordered by `(created_at, id)` ascending.
/// * `reply_count` counts direct replies only.
/// * `liked` / `disliked` come from membership in the session's id sets.
///
/// Comment ids must be unique. Corrupt parent cycles cannot loop: the
/// earliest comment on each cycle is promoted to a root, so every input
/// comment appears exactly once in the output. Replies that merely hang below
/// a cycle stay under their parent.
pub fn assemble_thread(
    comments: Vec<Comment>,
    liked_ids: &HashSet<String>,
    disliked_ids: &HashSet<String>,
) -> Vec<CommentView> {
    let n = comments.len();

    let index: HashMap<&str, usize> = comments
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id.as_str(), i))
        .collect();

    let mut parent: Vec<Option<usize>> = comments
        .iter()
        .enumerate()
        .map(|(i, c)| {
            c.parent_id
                .as_deref()
                .and_then(|pid| index.get(pid).copied())
                .filter(|&p| p != i)
        })
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut roots = Vec::new();
    for (i, p) in parent.iter().enumerate() {
        match p {
            Some(p) => children[*p].push(i),
            None => roots.push(i),
        }
    }
    let reply_counts: Vec<usize> = children.iter().map(Vec::len).collect();

    let key = |i: usize| (comments[i].created_at, comments[i].id.as_str());

    let mut placed = vec![false; n];
    let mut order = Vec::with_capacity(n);
    place_subtrees(&roots, &children, &mut placed, &mut order);

    // Whatever is still unplaced sits on a parent cycle or hangs below one.
    while order.len() < n {
        let Some(first) = (0..n)
            .filter(|&i| !placed[i])
            .min_by(|&a, &b| key(a).cmp(&key(b)))
        else {
            break;
        };
        let start = cycle_members(first, &parent)
            .into_iter()
            .min_by(|&a, &b| key(a).cmp(&key(b)))
            .unwrap_or(first);
        if let Some(p) = parent[start].take() {
            children[p].retain(|&c| c != start);
        }
        roots.push(start);
        place_subtrees(&[start], &children, &mut placed, &mut order);
    }

    let by_key = |a: &usize, b: &usize| key(*a).cmp(&key(*b));
    roots.sort_by(by_key);
    for replies in &mut children {
        replies.sort_by(by_key);
    }

    // Children come after their parent in `order`, so walking it backwards
    // always finds a node's replies already built.
    let mut pending: Vec<Option<Comment>> = comments.into_iter().map(Some).collect();
    let mut built: Vec<Option<CommentView>> = std::iter::repeat_with(|| None).take(n).collect();
    for &i in order.iter().rev() {
        let replies: Vec<CommentView> = children[i]
            .iter()
            .filter_map(|&c| built[c].take())
            .collect();
        let Some(comment) = pending[i].take() else {
            continue;
        };
        let liked = liked_ids.contains(&comment.id);
        let disliked = disliked_ids.contains(&comment.id);
        built[i] = Some(CommentView {
            comment,
            replies,
            reply_count: reply_counts[i],
            liked,
            disliked,
        });
    }

    roots.iter().filter_map(|&r| built[r].take()).collect()
}

/// Follows parent links from `from` until a node repeats and returns the
/// nodes of the loop it ran into. Replies hanging below the loop are not
/// members.
fn cycle_members(from: usize, parent: &[Option<usize>]) -> Vec<usize> {
    let mut seen = HashSet::new();
    let mut cursor = from;
    while seen.insert(cursor) {
        match parent[cursor] {
            Some(p) => cursor = p,
            None => return vec![cursor],
        }
    }

    let mut members = vec![cursor];
    let mut next = parent[cursor];
    while let Some(p) = next {
        if p == cursor {
            break;
        }
        members.push(p);
        next = parent[p];
    }
    members
}

/// Depth-first walk from `starts`, appending every newly reached node to `order`.
fn place_subtrees(
    starts: &[usize],
    children: &[Vec<usize>],
    placed: &mut [bool],
    order: &mut Vec<usize>,
) {
    let mut stack: Vec<usize> = starts.to_vec();
    while let Some(i) = stack.pop() {
        if placed[i] {
            continue;
        }
        placed[i] = true;
        order.push(i);
        stack.extend(children[i].iter().copied());
    }
}

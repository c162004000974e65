//! Arena-linked lists and merge sort over them
//!
//! Index entries live in `Vec` arenas and keep their slot for their whole
//! lifetime, so an entry is identified by its `u32` arena index. Lists are
//! threaded through the entries with `Option<u32>` successor links; hash
//! bucket chains and per-type candidate lists both use this shape.
//!
//! Sorting rearranges the links in place (no auxiliary array): the list is
//! split with a slow/fast pointer pair, both halves are sorted recursively
//! and merged with a three-way comparison.

use std::cmp::Ordering;

/// An arena entry that can be threaded into a singly linked list.
pub trait Chain {
    fn succ(&self) -> Option<u32>;
    fn set_succ(&mut self, succ: Option<u32>);
}

/// Sort the list starting at `head`, returning the new head.
///
/// The comparison must be a total order consistent with whatever equality
/// the caller deduplicates by; equal elements keep no particular relative
/// position.
pub fn sort<T, F>(arena: &mut [T], head: Option<u32>, cmp: &F) -> Option<u32>
where
    T: Chain,
    F: Fn(&T, &T) -> Ordering,
{
    let first = match head {
        Some(h) => h,
        None => return None,
    };
    if arena[first as usize].succ().is_none() {
        return head;
    }

    // Split in the middle: slow advances one link, fast two.
    let mut slow = first;
    let mut fast = arena[first as usize].succ();
    loop {
        let f1 = match fast {
            Some(f) => f,
            None => break,
        };
        let f2 = match arena[f1 as usize].succ() {
            Some(f) => f,
            None => break,
        };
        fast = arena[f2 as usize].succ();
        if let Some(s) = arena[slow as usize].succ() {
            slow = s;
        }
    }
    let second = arena[slow as usize].succ();
    arena[slow as usize].set_succ(None);

    let left = sort(arena, Some(first), cmp);
    let right = sort(arena, second, cmp);
    merge(arena, left, right, cmp)
}

/// Merge two sorted lists into one (merge sort phase).
fn merge<T, F>(arena: &mut [T], a: Option<u32>, b: Option<u32>, cmp: &F) -> Option<u32>
where
    T: Chain,
    F: Fn(&T, &T) -> Ordering,
{
    let (ha, hb) = match (a, b) {
        (None, _) => return b,
        (_, None) => return a,
        (Some(x), Some(y)) => (x, y),
    };

    // Start the output with the smaller head element.
    let head;
    let mut rest_a;
    let mut rest_b;
    if cmp(&arena[ha as usize], &arena[hb as usize]) == Ordering::Less {
        head = ha;
        rest_a = arena[ha as usize].succ();
        rest_b = Some(hb);
    } else {
        head = hb;
        rest_a = Some(ha);
        rest_b = arena[hb as usize].succ();
    }

    let mut end = head;
    while let (Some(i), Some(j)) = (rest_a, rest_b) {
        if cmp(&arena[i as usize], &arena[j as usize]) == Ordering::Less {
            arena[end as usize].set_succ(Some(i));
            end = i;
            rest_a = arena[i as usize].succ();
        } else {
            arena[end as usize].set_succ(Some(j));
            end = j;
            rest_b = arena[j as usize].succ();
        }
    }
    arena[end as usize].set_succ(if rest_a.is_some() { rest_a } else { rest_b });
    Some(head)
}

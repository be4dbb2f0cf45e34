//! Matches patterns containing an inner `**` on the flat segment view.
//!
//! The pattern head is matched up to its first `**`, the tail back to its last `**`, and each
//! bounded block between two consecutive `**` anchors is located with a windowed scan over the
//! remaining path segments. The leftmost placement wins; no earlier block is revisited.

use log::trace;

use crate::path::{PathContainer, PathSegment};
use crate::pattern::matcher::MatchingContext;
use crate::pattern::segment::SegmentDescriptor;
use crate::pattern::Pattern;

pub(crate) fn match_segments(pattern: &Pattern, ctx: &mut MatchingContext<'_>) -> bool {
    let container = ctx.path;
    if pattern.has_leading_separator() != container.has_leading_separator() {
        return false;
    }

    let patt = pattern.segments();
    let segs: Vec<&PathSegment> = container.segments().collect();
    let case_sensitive = pattern.options().case_sensitive;

    let mut patt_start = 0;
    let mut patt_end = patt.len();
    let mut path_start = 0;
    let mut path_end = segs.len();

    while patt_start < patt_end && path_start < path_end {
        let descriptor = &patt[patt_start];
        if descriptor.is_double_wildcard() {
            break;
        }
        if !bind(descriptor, segs[path_start], case_sensitive, ctx) {
            return false;
        }
        patt_start += 1;
        path_start += 1;
    }

    if path_start == path_end {
        if patt_start == patt_end {
            return finish(pattern, ctx);
        }
        if ctx.prefix {
            return ctx.consume_all();
        }
        if patt_start + 1 == patt_end
            && patt[patt_start].is_single_wildcard()
            && container.has_trailing_separator()
        {
            return ctx.consume_all();
        }
        return only_double_wildcards(&patt[patt_start..patt_end]) && finish(pattern, ctx);
    }

    if patt_start == patt_end {
        return false;
    }
    if ctx.prefix && patt[patt_start].is_double_wildcard() {
        return ctx.consume_all();
    }

    while patt_start < patt_end && path_start < path_end {
        let descriptor = &patt[patt_end - 1];
        if descriptor.is_double_wildcard() {
            break;
        }
        if !bind(descriptor, segs[path_end - 1], case_sensitive, ctx) {
            return false;
        }
        patt_end -= 1;
        path_end -= 1;
    }

    if path_start == path_end {
        return only_double_wildcards(&patt[patt_start..patt_end]) && finish(pattern, ctx);
    }

    // Both patt[patt_start] and patt[patt_end - 1] are `**` from here on.
    while patt_start + 1 < patt_end && path_start < path_end {
        let next = (patt_start + 1..patt_end)
            .find(|&i| patt[i].is_double_wildcard())
            .unwrap_or(patt_end - 1);

        if next == patt_start + 1 {
            patt_start += 1;
            continue;
        }

        let block = &patt[patt_start + 1..next];
        let found = match find_block(block, &segs[path_start..path_end], case_sensitive) {
            Some(offset) => path_start + offset,
            None => return false,
        };

        trace!(
            " located `{}` block at path segment {}",
            block
                .iter()
                .map(SegmentDescriptor::raw)
                .collect::<Vec<_>>()
                .join(container.separator().to_string().as_str()),
            found
        );

        for (descriptor, seg) in block.iter().zip(&segs[found..]) {
            bind(descriptor, seg, case_sensitive, ctx);
        }

        patt_start = next;
        path_start = found + block.len();
    }

    only_double_wildcards(&patt[patt_start..patt_end]) && finish(pattern, ctx)
}

// Scans every placement of `block` over `window`, left to right.
fn find_block(
    block: &[SegmentDescriptor],
    window: &[&PathSegment],
    case_sensitive: bool,
) -> Option<usize> {
    if block.len() > window.len() {
        return None;
    }

    (0..=window.len() - block.len()).find(|&offset| {
        block
            .iter()
            .zip(&window[offset..])
            .all(|(descriptor, seg)| descriptor.match_token(seg.value(), case_sensitive, None))
    })
}

fn bind(
    descriptor: &SegmentDescriptor,
    seg: &PathSegment,
    case_sensitive: bool,
    ctx: &mut MatchingContext<'_>,
) -> bool {
    if !ctx.extract {
        return descriptor.match_token(seg.value(), case_sensitive, None);
    }

    if !descriptor.match_token(seg.value(), case_sensitive, Some(&mut ctx.variables)) {
        return false;
    }
    if let Some(name) = descriptor.capture_names().last() {
        ctx.bind_matrix(name, seg.matrix());
    }
    true
}

fn only_double_wildcards(descriptors: &[SegmentDescriptor]) -> bool {
    descriptors.iter().all(SegmentDescriptor::is_double_wildcard)
}

// Trailing separators must agree unless the pattern ends open with `**`.
fn finish(pattern: &Pattern, ctx: &mut MatchingContext<'_>) -> bool {
    let container: &PathContainer = ctx.path;
    let open_ended = pattern
        .segments()
        .last()
        .map_or(false, SegmentDescriptor::is_double_wildcard);

    let trailing_ok = pattern.has_trailing_separator() == container.has_trailing_separator()
        || (container.has_trailing_separator()
            && pattern.options().match_optional_trailing_separator);

    if !ctx.prefix && !open_ended && !trailing_ok {
        return false;
    }
    ctx.consume_all()
}

use std::collections::BTreeMap;

use crate::composition::model::{Layer, Timeline};
use crate::foundation::time::TimeRange;
use crate::layout::plan::{LayerId, LayoutDiagnostic};

/// A leaf layer reached by flattening, with the context it inherits from its ancestors.
#[derive(Clone, Debug)]
pub(crate) struct FlatLeaf<'a> {
    pub(crate) id: LayerId,
    pub(crate) layer: &'a Layer,
    /// Top-level visual slot the leaf is placed with, if any.
    pub(crate) slot: Option<usize>,
    /// Innermost enclosing group.
    pub(crate) group: Option<LayerId>,
}

/// A top-level entry that takes part in sequential placement.
#[derive(Clone, Debug)]
pub(crate) struct Slot<'a> {
    pub(crate) id: LayerId,
    pub(crate) layer: &'a Layer,
    /// Effective input range (union of children for groups).
    pub(crate) range: TimeRange,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct FlatTimeline<'a> {
    pub(crate) leaves: Vec<FlatLeaf<'a>>,
    pub(crate) slots: Vec<Slot<'a>>,
    /// Non-owning lookup from a group to every leaf below it.
    pub(crate) groups: BTreeMap<LayerId, Vec<LayerId>>,
    pub(crate) group_keys: BTreeMap<LayerId, &'a str>,
    pub(crate) diagnostics: Vec<LayoutDiagnostic>,
}

struct Pending<'a> {
    layer: &'a Layer,
    slot: Option<usize>,
    ancestors: Vec<LayerId>,
}

/// Flatten the layer tree with an explicit stack. Ids are assigned in pre-order, so a
/// group always has a smaller id than anything inside it.
pub(crate) fn flatten(timeline: &Timeline) -> FlatTimeline<'_> {
    let mut out = FlatTimeline::default();
    let mut next_id = 0u32;

    let mut stack = Vec::<Pending<'_>>::new();
    for layer in timeline.layers.iter().rev() {
        stack.push(Pending {
            layer,
            slot: None,
            ancestors: Vec::new(),
        });
    }

    while let Some(Pending {
        layer,
        mut slot,
        ancestors,
    }) = stack.pop()
    {
        let id = LayerId(next_id);
        next_id += 1;

        if ancestors.is_empty()
            && layer.contains_visual()
            && let Some(range) = layer.effective_range()
        {
            slot = Some(out.slots.len());
            out.slots.push(Slot { id, layer, range });
        }

        if layer.is_group() {
            if layer.effective_range().is_none() {
                tracing::warn!(group = %layer.id, "group has no resolvable children");
                out.diagnostics.push(LayoutDiagnostic::UnresolvedGroup {
                    layer: layer.id.clone(),
                });
            }
            out.groups.insert(id, Vec::new());
            out.group_keys.insert(id, layer.id.as_str());

            let mut child_ancestors = ancestors;
            child_ancestors.push(id);
            for child in layer.children().iter().rev() {
                stack.push(Pending {
                    layer: child,
                    slot,
                    ancestors: child_ancestors.clone(),
                });
            }
            continue;
        }

        for g in &ancestors {
            if let Some(members) = out.groups.get_mut(g) {
                members.push(id);
            }
        }
        out.leaves.push(FlatLeaf {
            id,
            layer,
            slot,
            group: ancestors.last().copied(),
        });
    }

    out
}

#[cfg(test)]
#[path = "../../tests/unit/layout/flatten.rs"]
mod tests;

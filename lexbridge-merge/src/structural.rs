//! Schema-driven structural merge of canonical units.

use std::collections::{BTreeMap, BTreeSet};

use lexbridge_canon::{class_name, identifier_key, property_key, Canonicalizer, OBJSUR_TAG};
use lexbridge_schema::PropertyCategory;
use lexbridge_types::{write_element, Element, Node};

use crate::{
    ChangeKind, ConflictKind, ConflictPolicy, MergeChange, MergeConflict, MergeEventListener,
    MergeResult, Side,
};

const WS_ATTR: &str = "ws";

/// Merge context for one unit.
pub(crate) struct Merger<'a, 'l> {
    pub canon: Canonicalizer<'a>,
    pub policy: ConflictPolicy,
    pub listener: &'l mut dyn MergeEventListener,
}

/// Something with a printable form for conflict reports.
pub(crate) trait Describe {
    fn describe(&self) -> String;
}

impl Describe for Element {
    fn describe(&self) -> String {
        write_element(self).trim_end().to_string()
    }
}

impl Describe for String {
    fn describe(&self) -> String {
        self.clone()
    }
}

fn is_object(element: &Element) -> bool {
    element.name != OBJSUR_TAG && identifier_key(element).is_some()
}

fn object_segment(class: &str, object: &Element) -> String {
    match identifier_key(object) {
        Some(guid) => format!("{class}[{guid}]"),
        None => class.to_string(),
    }
}

fn join_path(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{parent}/{segment}")
    }
}

/// Keys in first-seen order across the three versions.
fn key_union<'e, F>(
    ours: &[&'e Element],
    theirs: &[&'e Element],
    ancestor: &[&'e Element],
    key: F,
) -> Vec<String>
where
    F: Fn(&Element) -> String,
{
    let mut seen = BTreeSet::new();
    let mut keys = Vec::new();
    for element in ours.iter().chain(theirs).chain(ancestor) {
        let k = key(*element);
        if seen.insert(k.clone()) {
            keys.push(k);
        }
    }
    keys
}

fn find<'e, F>(elements: &[&'e Element], wanted: &str, key: F) -> Option<&'e Element>
where
    F: Fn(&Element) -> String,
{
    elements.iter().copied().find(|e| key(*e) == wanted)
}

fn children(element: Option<&Element>) -> Vec<&Element> {
    element.map(|e| e.elements().collect()).unwrap_or_default()
}

impl Merger<'_, '_> {
    fn report(&mut self, kind: ChangeKind, side: Side, path: &str) {
        self.listener.change(MergeChange {
            kind,
            side,
            path: path.to_string(),
        });
    }

    fn report_conflict<T: Describe>(
        &mut self,
        kind: ConflictKind,
        path: &str,
        values: (Option<&T>, Option<&T>, Option<&T>),
        winner: Side,
    ) {
        let (ours, theirs, ancestor) = values;
        self.listener.conflict(MergeConflict {
            kind,
            path: path.to_string(),
            ours: ours.map(Describe::describe),
            theirs: theirs.map(Describe::describe),
            ancestor: ancestor.map(Describe::describe),
            winner,
        });
    }

    /// Three-way rule for an optional value.
    ///
    /// Unchanged or identically changed values pass through; a change on one
    /// side wins; changes on both sides conflict.
    pub fn three_way<T: Clone + PartialEq + Describe>(
        &mut self,
        path: &str,
        ours: Option<&T>,
        theirs: Option<&T>,
        ancestor: Option<&T>,
    ) -> Option<T> {
        if ours == theirs {
            return ours.cloned();
        }
        if ours == ancestor {
            self.report(change_kind(ancestor, theirs), Side::Theirs, path);
            return theirs.cloned();
        }
        if theirs == ancestor {
            self.report(change_kind(ancestor, ours), Side::Ours, path);
            return ours.cloned();
        }

        let values = (ours, theirs, ancestor);
        match (ours, theirs) {
            (Some(_), None) => {
                self.report_conflict(ConflictKind::RemovedVsEdited, path, values, Side::Ours);
                ours.cloned()
            }
            (None, Some(_)) => {
                self.report_conflict(ConflictKind::RemovedVsEdited, path, values, Side::Theirs);
                theirs.cloned()
            }
            _ => {
                let kind = if ancestor.is_some() {
                    ConflictKind::BothEdited
                } else {
                    ConflictKind::BothAdded
                };
                let winner = self.policy.winner();
                self.report_conflict(kind, path, values, winner);
                match winner {
                    Side::Ours => ours.cloned(),
                    Side::Theirs => theirs.cloned(),
                }
            }
        }
    }

    /// Merges two versions of one object (flat record or nested element).
    pub fn merge_object(
        &mut self,
        parent: &str,
        ours: &Element,
        theirs: &Element,
        ancestor: Option<&Element>,
    ) -> MergeResult<Element> {
        let class = class_name(ours)?.to_string();
        let path = join_path(parent, &object_segment(&class, ours));

        let mut out = ours.emptied();
        out.attributes = self.merge_attributes(&path, ours, theirs, ancestor);
        out.children.extend(
            ours.children
                .iter()
                .filter(|n| matches!(n, Node::Text(_)))
                .cloned(),
        );

        let (o, t, a) = (children(Some(ours)), children(Some(theirs)), children(ancestor));
        for key in key_union(&o, &t, &a, property_key) {
            let merged = self.merge_property(
                &path,
                &class,
                &key,
                find(&o, &key, property_key),
                find(&t, &key, property_key),
                find(&a, &key, property_key),
            )?;
            if let Some(property) = merged {
                out.children.push(Node::Element(property));
            }
        }
        Ok(out)
    }

    pub fn merge_attributes(
        &mut self,
        path: &str,
        ours: &Element,
        theirs: &Element,
        ancestor: Option<&Element>,
    ) -> Vec<(String, String)> {
        let mut names: Vec<&str> = Vec::new();
        let sources = [Some(ours), Some(theirs), ancestor];
        for element in sources.iter().flatten() {
            for (name, _) in &element.attributes {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }

        let mut out = Vec::new();
        for name in names {
            let get = |e: Option<&Element>| e.and_then(|e| e.attr(name)).map(str::to_string);
            let (o, t, a) = (get(Some(ours)), get(Some(theirs)), get(ancestor));
            let attr_path = format!("{path}/@{name}");
            if let Some(value) = self.three_way(&attr_path, o.as_ref(), t.as_ref(), a.as_ref()) {
                out.push((name.to_string(), value));
            }
        }
        out
    }

    fn merge_property(
        &mut self,
        parent: &str,
        class: &str,
        key: &str,
        ours: Option<&Element>,
        theirs: Option<&Element>,
        ancestor: Option<&Element>,
    ) -> MergeResult<Option<Element>> {
        let Some(sample) = ours.or(theirs).or(ancestor) else {
            return Ok(None);
        };
        let category = self.canon.property_category(class, sample)?;
        let path = join_path(parent, key);

        match (ours, theirs) {
            (Some(o), Some(t)) if o != t => {
                if ancestor.is_none() && !category.has_identified_children() {
                    return Ok(self.three_way(&path, ours, theirs, ancestor));
                }
                self.merge_present(&path, category, o, t, ancestor).map(Some)
            }
            _ => Ok(self.three_way(&path, ours, theirs, ancestor)),
        }
    }

    /// Both sides hold the property with different content.
    fn merge_present(
        &mut self,
        path: &str,
        category: PropertyCategory,
        ours: &Element,
        theirs: &Element,
        ancestor: Option<&Element>,
    ) -> MergeResult<Element> {
        if category.is_multi_alternative() {
            return Ok(self.merge_alternatives(path, ours, theirs, ancestor));
        }
        if category == PropertyCategory::AtomicOwning {
            return self.merge_atomic_owning(path, ours, theirs, ancestor);
        }
        if category.has_identified_children() {
            return self.merge_members(path, category, ours, theirs, ancestor);
        }
        Ok(self.whole(path, ours, theirs, ancestor))
    }

    fn whole(
        &mut self,
        path: &str,
        ours: &Element,
        theirs: &Element,
        ancestor: Option<&Element>,
    ) -> Element {
        self.three_way(path, Some(ours), Some(theirs), ancestor)
            .unwrap_or_else(|| ours.clone())
    }

    fn merge_atomic_owning(
        &mut self,
        path: &str,
        ours: &Element,
        theirs: &Element,
        ancestor: Option<&Element>,
    ) -> MergeResult<Element> {
        let (o, t) = (children(Some(ours)), children(Some(theirs)));
        match (o.as_slice(), t.as_slice()) {
            ([oc], [tc]) if is_object(oc) && identifier_key(oc) == identifier_key(tc) => {
                let ac = ancestor.and_then(|a| {
                    a.elements()
                        .find(|e| identifier_key(e) == identifier_key(oc))
                });
                let merged = self.merge_object(path, oc, tc, ac)?;
                Ok(ours.emptied().with_child(merged))
            }
            _ => Ok(self.whole(path, ours, theirs, ancestor)),
        }
    }

    fn merge_alternatives(
        &mut self,
        path: &str,
        ours: &Element,
        theirs: &Element,
        ancestor: Option<&Element>,
    ) -> Element {
        let (o, t, a) = (children(Some(ours)), children(Some(theirs)), children(ancestor));
        if o.iter().chain(&t).chain(&a).any(|e| e.attr(WS_ATTR).is_none()) {
            return self.whole(path, ours, theirs, ancestor);
        }
        let ws = |e: &Element| e.attr(WS_ATTR).unwrap_or_default().to_string();

        let mut out = ours.emptied();
        for key in key_union(&o, &t, &a, ws) {
            let alt_path = format!("{path}[{WS_ATTR}={key}]");
            let merged = self.three_way(
                &alt_path,
                find(&o, &key, ws),
                find(&t, &key, ws),
                find(&a, &key, ws),
            );
            if let Some(alternative) = merged {
                out.children.push(Node::Element(alternative));
            }
        }
        out
    }

    /// Collections and sequences: membership by identifier, owned objects
    /// merged recursively.
    fn merge_members(
        &mut self,
        path: &str,
        category: PropertyCategory,
        ours: &Element,
        theirs: &Element,
        ancestor: Option<&Element>,
    ) -> MergeResult<Element> {
        let (o, t, a) = (children(Some(ours)), children(Some(theirs)), children(ancestor));
        if o.iter().chain(&t).chain(&a).any(|e| identifier_key(e).is_none()) {
            return Ok(self.whole(path, ours, theirs, ancestor));
        }
        let (o, t, a) = (occurrences(&o), occurrences(&t), occurrences(&a));
        let mut merged = self.merge_keyed(path, &o, &t, &a)?;

        let order = if category.is_sequence() {
            self.order_sequence(path, &key_list(&o), &key_list(&t), &key_list(&a), &merged)
        } else {
            merged.keys().cloned().collect()
        };
        let mut out = ours.emptied();
        for key in order {
            if let Some(member) = merged.remove(&key) {
                out.children.push(Node::Element(member));
            }
        }
        Ok(out)
    }

    /// Merges keyed members; returns survivors by key.
    fn merge_keyed(
        &mut self,
        path: &str,
        ours: &[Keyed<'_>],
        theirs: &[Keyed<'_>],
        ancestor: &[Keyed<'_>],
    ) -> MergeResult<BTreeMap<String, Element>> {
        let mut seen = BTreeSet::new();
        let mut merged = BTreeMap::new();
        for (k, _) in ours.iter().chain(theirs).chain(ancestor) {
            if !seen.insert(k.as_str()) {
                continue;
            }
            let (om, tm, am) = (lookup(ours, k), lookup(theirs, k), lookup(ancestor, k));
            let result = match (om, tm) {
                (Some(x), Some(y)) if x != y && is_object(x) && is_object(y) => {
                    Some(self.merge_object(path, x, y, am)?)
                }
                _ => {
                    let sample = om.or(tm).or(am);
                    let member_path = match sample {
                        Some(s) if is_object(s) => {
                            join_path(path, &object_segment(&s.name, s))
                        }
                        _ => format!("{path}[{k}]"),
                    };
                    self.three_way(&member_path, om, tm, am)
                }
            };
            if let Some(member) = result {
                merged.insert(k.clone(), member);
            }
        }
        Ok(merged)
    }

    /// Final order of a merged sequence.
    ///
    /// Members all three versions share are ordered pair by pair: a pair
    /// either side swapped relative to the ancestor takes the swapped order.
    /// When the combined pairs admit no single order, both sides reordered
    /// the same members differently and the policy side's order wins.
    /// Members the others lack are then placed after their nearest
    /// preceding survivor.
    pub fn order_sequence<V>(
        &mut self,
        path: &str,
        ours: &[String],
        theirs: &[String],
        ancestor: &[String],
        survivors: &BTreeMap<String, V>,
    ) -> Vec<String> {
        let shared: Vec<&String> = ancestor
            .iter()
            .filter(|k| ours.contains(k) && theirs.contains(k))
            .collect();
        let rank = |list: &[String]| -> Vec<usize> {
            shared
                .iter()
                .map(|k| list.iter().position(|x| x == *k).unwrap_or(usize::MAX))
                .collect()
        };
        let (ours_rank, theirs_rank) = (rank(ours), rank(theirs));

        let n = shared.len();
        let mut wins = vec![0usize; n];
        let (mut ours_moved, mut theirs_moved) = (false, false);
        for i in 0..n {
            for j in i + 1..n {
                let ours_swapped = ours_rank[j] < ours_rank[i];
                let theirs_swapped = theirs_rank[j] < theirs_rank[i];
                ours_moved |= ours_swapped;
                theirs_moved |= theirs_swapped;
                if ours_swapped || theirs_swapped {
                    wins[j] += 1;
                } else {
                    wins[i] += 1;
                }
            }
        }
        let mut combined: Vec<usize> = (0..n).collect();
        combined.sort_by(|a, b| wins[*b].cmp(&wins[*a]));
        // the pairs form a total order exactly when the win counts are n-1..0
        let consistent = combined
            .iter()
            .enumerate()
            .all(|(pos, &i)| wins[i] == n - 1 - pos);

        let side_order = |list: &[String]| -> Vec<String> {
            list.iter().filter(|k| shared.contains(k)).cloned().collect()
        };
        let (os, ts) = (side_order(ours), side_order(theirs));

        let lead = if consistent {
            if ours_moved && (!theirs_moved || os != ts) {
                self.report(ChangeKind::Reordered, Side::Ours, path);
            }
            if theirs_moved && (!ours_moved || os != ts) {
                self.report(ChangeKind::Reordered, Side::Theirs, path);
            }
            Side::Ours
        } else {
            let winner = self.policy.winner();
            let text = |l: &[String]| l.join(" ");
            let base: Vec<String> = shared.iter().map(|k| (*k).clone()).collect();
            self.report_conflict(
                ConflictKind::AmbiguousReorder,
                path,
                (Some(&text(&os)), Some(&text(&ts)), Some(&text(&base))),
                winner,
            );
            winner
        };
        let (first, second) = match lead {
            Side::Ours => (ours, theirs),
            Side::Theirs => (theirs, ours),
        };

        let shared_order: Vec<String> = if consistent {
            combined.iter().map(|&i| shared[i].clone()).collect()
        } else {
            side_order(first)
        };
        let mut order: Vec<String> = shared_order
            .into_iter()
            .filter(|k| survivors.contains_key(k))
            .collect();
        for list in [first, second, ancestor] {
            for (i, key) in list.iter().enumerate() {
                if !survivors.contains_key(key) || order.contains(key) {
                    continue;
                }
                let at = list[..i]
                    .iter()
                    .rev()
                    .find_map(|prev| order.iter().position(|k| k == prev))
                    .map_or(0, |p| p + 1);
                order.insert(at, key.clone());
            }
        }
        order
    }
}

/// A member with its merge key.
pub(crate) type Keyed<'e> = (String, &'e Element);

/// Keys members by identifier; a repeated identifier gets `#n` for its
/// n-th repeat, so a sequence may list the same target more than once.
fn occurrences<'e>(members: &[&'e Element]) -> Vec<Keyed<'e>> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    members
        .iter()
        .map(|member| {
            let guid = identifier_key(member).unwrap_or_default();
            let count = counts.entry(guid.clone()).or_default();
            let key = if *count == 0 {
                guid
            } else {
                format!("{guid}#{count}")
            };
            *count += 1;
            (key, *member)
        })
        .collect()
}

fn lookup<'e>(members: &[Keyed<'e>], key: &str) -> Option<&'e Element> {
    members.iter().find(|(k, _)| k == key).map(|(_, e)| *e)
}

fn key_list(members: &[Keyed<'_>]) -> Vec<String> {
    members.iter().map(|(k, _)| k.clone()).collect()
}

fn change_kind<T>(before: Option<&T>, after: Option<&T>) -> ChangeKind {
    match (before, after) {
        (None, _) => ChangeKind::Added,
        (_, None) => ChangeKind::Removed,
        _ => ChangeKind::Edited,
    }
}

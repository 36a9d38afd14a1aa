use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use crate::cidr::{cidr_string, is_subnet_of, network_of};
use crate::types::{Network, Organization, RecordId, RecordKind};
use crate::IpamError;

/// Separator used when joining ancestor names.
pub const NAME_SEPARATOR: &str = " / ";

/// A record that takes part in a parent/child hierarchy.
pub trait TreeRecord {
    const KIND: RecordKind;

    fn id(&self) -> &RecordId;
    fn parent(&self) -> Option<&RecordId>;
    fn name(&self) -> &str;
}

impl TreeRecord for Network {
    const KIND: RecordKind = RecordKind::Network;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn parent(&self) -> Option<&RecordId> {
        self.parent.as_ref()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TreeRecord for Organization {
    const KIND: RecordKind = RecordKind::Organization;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn parent(&self) -> Option<&RecordId> {
        self.parent.as_ref()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Arena of hierarchical records keyed by id, with a child index.
///
/// Inserts are unchecked; callers run [`Forest::check_acyclic`] (or
/// [`Forest::validate_parent`] for networks) before committing.
#[derive(Debug, Clone)]
pub struct Forest<T> {
    nodes: BTreeMap<RecordId, T>,
    children: BTreeMap<RecordId, BTreeSet<RecordId>>,
}

impl<T> Default for Forest<T> {
    fn default() -> Self {
        Forest {
            nodes: BTreeMap::new(),
            children: BTreeMap::new(),
        }
    }
}

impl<T: TreeRecord> Forest<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &RecordId) -> Option<&T> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Records in id order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.nodes.values()
    }

    /// Direct children of a node, in id order
    pub fn children_of(&self, id: &RecordId) -> impl Iterator<Item = &T> {
        self.children
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|child| self.nodes.get(child))
    }

    /// Insert or replace a record, keeping the child index in step.
    pub fn insert(&mut self, record: T) -> Option<T> {
        let id = record.id().clone();
        let previous = self.nodes.remove(&id);
        if let Some(parent) = previous.as_ref().and_then(|p| p.parent()) {
            self.unlink(parent, &id);
        }
        if let Some(parent) = record.parent() {
            self.children
                .entry(parent.clone())
                .or_default()
                .insert(id.clone());
        }
        self.nodes.insert(id, record);
        previous
    }

    /// Remove a record. Its children keep pointing at the removed id until
    /// the caller detaches them.
    pub fn remove(&mut self, id: &RecordId) -> Option<T> {
        let record = self.nodes.remove(id)?;
        if let Some(parent) = record.parent() {
            self.unlink(parent, id);
        }
        Some(record)
    }

    fn unlink(&mut self, parent: &RecordId, child: &RecordId) {
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.remove(child);
            if siblings.is_empty() {
                self.children.remove(parent);
            }
        }
    }

    /// Fail if making `proposed_parent` the parent of `child` would close a loop.
    ///
    /// Walks up from the proposed parent; meeting `child` (or the proposed
    /// parent being `child` itself) is a cycle. A loop that already exists
    /// above the proposed parent is reported as well.
    pub fn check_acyclic(
        &self,
        child: &RecordId,
        proposed_parent: Option<&RecordId>,
    ) -> Result<(), IpamError> {
        let Some(start) = proposed_parent else {
            return Ok(());
        };

        let cycle = || IpamError::Cycle {
            kind: T::KIND,
            id: child.to_string(),
            parent: start.to_string(),
        };

        let mut seen = HashSet::new();
        let mut current = Some(start);
        while let Some(id) = current {
            if id == child || !seen.insert(id) {
                return Err(cycle());
            }
            current = self.nodes.get(id).and_then(|node| node.parent());
        }
        Ok(())
    }

    /// Ancestors of a node, nearest first.
    pub fn ancestors(&self, id: &RecordId) -> Result<Vec<&T>, IpamError> {
        let mut seen = HashSet::from([id]);
        let mut chain = Vec::new();
        let mut current = self.nodes.get(id).and_then(|node| node.parent());
        while let Some(parent_id) = current {
            if !seen.insert(parent_id) {
                return Err(IpamError::CycleDetected {
                    kind: T::KIND,
                    id: id.to_string(),
                });
            }
            let Some(parent) = self.nodes.get(parent_id) else {
                break;
            };
            chain.push(parent);
            current = parent.parent();
        }
        Ok(chain)
    }

    /// The node and every node below it. Unknown ids give an empty set.
    pub fn descendants_of(&self, id: &RecordId) -> BTreeSet<RecordId> {
        let mut found = BTreeSet::new();
        if !self.nodes.contains_key(id) {
            return found;
        }

        let mut queue = VecDeque::from([id.clone()]);
        while let Some(current) = queue.pop_front() {
            if !found.insert(current.clone()) {
                continue;
            }
            if let Some(children) = self.children.get(&current) {
                queue.extend(children.iter().cloned());
            }
        }
        found
    }

    /// Ancestor names joined root first, e.g. "Campus / Building A / Floor 1".
    pub fn complete_name(&self, id: &RecordId) -> Result<String, IpamError> {
        let node = self.nodes.get(id).ok_or_else(|| IpamError::UnknownRecord {
            kind: T::KIND,
            id: id.to_string(),
        })?;

        let mut names: Vec<&str> = self
            .ancestors(id)?
            .into_iter()
            .map(|ancestor| ancestor.name())
            .collect();
        names.reverse();
        names.push(node.name());
        Ok(names.join(NAME_SEPARATOR))
    }
}

impl Forest<Network> {
    /// Check a proposed parent for a network: no cycle, and when both sides
    /// have a CIDR the child must be a subnet of the parent.
    pub fn validate_parent(
        &self,
        child: &Network,
        proposed_parent: Option<&RecordId>,
    ) -> Result<(), IpamError> {
        let Some(parent_id) = proposed_parent else {
            return Ok(());
        };
        self.check_acyclic(&child.id, Some(parent_id))?;

        let parent = self.get(parent_id).ok_or_else(|| IpamError::UnknownRecord {
            kind: RecordKind::Network,
            id: parent_id.to_string(),
        })?;
        validate_containment(child, parent)
    }
}

/// Containment between two network records; skipped unless both have a CIDR.
pub fn validate_containment(child: &Network, parent: &Network) -> Result<(), IpamError> {
    if let (Some(child_net), Some(parent_net)) = (network_of(child)?, network_of(parent)?) {
        if !is_subnet_of(&child_net, &parent_net) {
            return Err(IpamError::Containment {
                child: cidr_string(&child_net),
                parent: cidr_string(&parent_net),
            });
        }
    }
    Ok(())
}

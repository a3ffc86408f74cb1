use slotmap::{SecondaryMap, SlotMap};

use crate::error::{LouvainError, Result};
use crate::types::{vint_range, CommId, Members, VInt};

// Define the community structure.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Community {
    id: CommId,           // Key of this community in the partition.
    vertex_set: Members,  // Member vertices, in insertion order.
}

impl Community {
    fn new(id: CommId) -> Community {
        // Create a new empty community.
        Community {
            id,
            ..Default::default()
        }
    }

    pub fn id(&self) -> CommId {
        self.id
    }

    pub fn members(&self) -> &[VInt] {
        &self.vertex_set
    }

    pub fn size(&self) -> usize {
        self.vertex_set.len()
    }

    fn contains(&self, vertex: VInt) -> bool {
        self.vertex_set.contains(&vertex)
    }

    fn add(&mut self, vertex: VInt) {
        self.vertex_set.push(vertex);
    }

    fn remove(&mut self, vertex: VInt) -> bool {
        // Keep the order of the remaining members.
        match self.vertex_set.iter().position(|&v| v == vertex) {
            Some(pos) => {
                self.vertex_set.remove(pos);
                true
            }
            None => false,
        }
    }
}

/// Assignment of every vertex of one graph level to exactly one community.
///
/// Communities live in a [`SlotMap`]. They are all created up front, so slot order is creation
/// order, and a community that loses its last member is removed for good. A vertex is
/// unassigned only while the local mover evaluates it.
#[derive(Debug, Clone)]
pub struct Partition {
    map: SlotMap<CommId, Community>,
    vertex_community_map: Vec<Option<CommId>>,
}

impl Partition {
    /// Every vertex in its own community, created in vertex order.
    pub fn singletons(vertex_count: usize) -> Partition {
        let mut map = SlotMap::with_capacity_and_key(vertex_count);
        let vertex_community_map = vint_range(vertex_count)
            .map(|vertex| {
                Some(map.insert_with_key(|id| {
                    let mut community = Community::new(id);
                    community.add(vertex);
                    community
                }))
            })
            .collect();
        Partition {
            map,
            vertex_community_map,
        }
    }

    /// Build a partition from explicit groups, created in the order given.
    ///
    /// Vertices listed in no group stay unassigned, so this also describes the state of a
    /// vertex isolated for gain evaluation. Empty groups and vertices listed twice are rejected.
    pub fn from_groups(vertex_count: usize, groups: &[Members]) -> Result<Partition> {
        let mut partition = Partition {
            map: SlotMap::with_capacity_and_key(groups.len()),
            vertex_community_map: vec![None; vertex_count],
        };
        for (index, group) in groups.iter().enumerate() {
            if group.is_empty() {
                return Err(LouvainError::inconsistent(format!("group {} is empty", index)));
            }
            let id = partition.map.insert_with_key(Community::new);
            for &vertex in group {
                match partition.vertex_community_map.get_mut(vertex as usize) {
                    None => {
                        return Err(LouvainError::inconsistent(format!(
                            "vertex {} is out of range for {} vertices",
                            vertex, vertex_count
                        )))
                    }
                    Some(Some(_)) => {
                        return Err(LouvainError::inconsistent(format!(
                            "vertex {} is listed in more than one group, again in group {}",
                            vertex, index
                        )))
                    }
                    Some(slot) => *slot = Some(id),
                }
                partition.map[id].add(vertex);
            }
        }
        Ok(partition)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_community_map.len()
    }

    /// Number of live communities.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    pub fn community_of(&self, vertex: VInt) -> Option<CommId> {
        self.vertex_community_map.get(vertex as usize).copied().flatten()
    }

    #[inline]
    pub fn get(&self, id: CommId) -> Option<&Community> {
        self.map.get(id)
    }

    pub fn is_live(&self, id: CommId) -> bool {
        self.map.contains_key(id)
    }

    pub fn members(&self, id: CommId) -> Option<&[VInt]> {
        self.get(id).map(Community::members)
    }

    pub fn contains(&self, id: CommId, vertex: VInt) -> bool {
        self.get(id).map_or(false, |c| c.contains(vertex))
    }

    /// Live communities in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Community> + '_ {
        self.map.values()
    }

    /// Step one of a move: take `vertex` out of its community. The community stays, even if
    /// empty, until [`Partition::release_if_empty`] is called.
    pub(crate) fn isolate(&mut self, vertex: VInt) -> Result<CommId> {
        let id = self.community_of(vertex).ok_or_else(|| {
            LouvainError::inconsistent(format!("vertex {} is not in any community", vertex))
        })?;
        let community = self.map.get_mut(id).ok_or_else(|| {
            LouvainError::inconsistent(format!("vertex {} points to dead community {:?}", vertex, id))
        })?;
        if !community.remove(vertex) {
            return Err(LouvainError::inconsistent(format!(
                "vertex {} is mapped to community {:?} but not a member of it",
                vertex, id
            )));
        }
        self.vertex_community_map[vertex as usize] = None;
        Ok(id)
    }

    /// Last step of a move: put an isolated `vertex` into community `to`.
    pub(crate) fn commit(&mut self, vertex: VInt, to: CommId) -> Result<()> {
        if let Some(current) = self.community_of(vertex) {
            return Err(LouvainError::inconsistent(format!(
                "vertex {} is already in community {:?}",
                vertex, current
            )));
        }
        let community = self
            .map
            .get_mut(to)
            .ok_or_else(|| LouvainError::inconsistent(format!("community {:?} is not live", to)))?;
        community.add(vertex);
        self.vertex_community_map[vertex as usize] = Some(to);
        Ok(())
    }

    /// Remove community `id` when it has no members left.
    pub(crate) fn release_if_empty(&mut self, id: CommId) -> bool {
        let empty = self.get(id).map_or(false, |c| c.size() == 0);
        if empty {
            self.map.remove(id);
        }
        empty
    }

    /// Check that every vertex sits in exactly one live community and that the communities'
    /// members cover the vertex set without duplicates.
    pub fn validate(&self) -> Result<()> {
        let mut seen = vec![false; self.vertex_count()];
        for (id, community) in self.map.iter() {
            if community.size() == 0 {
                return Err(LouvainError::inconsistent(format!(
                    "community {:?} is empty but live",
                    id
                )));
            }
            for &vertex in community.members() {
                let index = vertex as usize;
                if index >= seen.len() || seen[index] {
                    return Err(LouvainError::inconsistent(format!(
                        "vertex {} appears more than once or is out of range",
                        vertex
                    )));
                }
                seen[index] = true;
                if self.community_of(vertex) != Some(id) {
                    return Err(LouvainError::inconsistent(format!(
                        "vertex {} is a member of {:?} but mapped to {:?}",
                        vertex,
                        id,
                        self.community_of(vertex)
                    )));
                }
            }
        }
        if let Some(missing) = seen.iter().position(|s| !s) {
            return Err(LouvainError::inconsistent(format!(
                "vertex {} is not in any community",
                missing
            )));
        }
        Ok(())
    }

    /// Dense community index of every vertex, numbering live communities `0..len()` in
    /// creation order.
    pub fn dense_assignment(&self) -> Result<Vec<VInt>> {
        let mut dense_ids: SecondaryMap<CommId, VInt> = SecondaryMap::with_capacity(self.map.len());
        for (id, dense) in self.map.keys().zip(vint_range(self.map.len())) {
            dense_ids.insert(id, dense);
        }
        self.vertex_community_map
            .iter()
            .enumerate()
            .map(|(vertex, id)| {
                id.and_then(|id| dense_ids.get(id).copied()).ok_or_else(|| {
                    LouvainError::inconsistent(format!("vertex {} is not in a live community", vertex))
                })
            })
            .collect()
    }

    /// Member lists of the live communities in creation order.
    pub fn into_groups(self) -> Vec<Members> {
        self.map.into_iter().map(|(_, c)| c.vertex_set).collect()
    }
}

#[cfg(test)]
mod test_partition {
    use crate::error::LouvainError;
    use crate::partition::Partition;

    #[test]
    fn test_singletons() {
        let p = Partition::singletons(4);
        assert_eq!(p.len(), 4);
        let c3 = p.community_of(3).unwrap();
        assert_eq!(p.members(c3), Some(&[3][..]));
        assert_eq!(p.get(c3).unwrap().id(), c3);
        assert_ne!(p.community_of(2), Some(c3));
        p.validate().unwrap();
        assert_eq!(p.dense_assignment().unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_move_protocol() {
        let mut p = Partition::singletons(3);
        let c0 = p.community_of(0).unwrap();
        let c1 = p.community_of(1).unwrap();
        assert_eq!(p.isolate(0).unwrap(), c0);
        assert_eq!(p.community_of(0), None);
        // The emptied community stays live until released.
        assert!(p.is_live(c0));
        assert!(p.validate().is_err());

        p.commit(0, c1).unwrap();
        assert!(p.release_if_empty(c0));
        assert!(!p.is_live(c0));
        assert_eq!(p.len(), 2);
        assert_eq!(p.members(c1), Some(&[1, 0][..]));
        p.validate().unwrap();

        // Dense numbering skips the removed community.
        assert_eq!(p.dense_assignment().unwrap(), vec![0, 0, 1]);
        assert_eq!(p.into_groups(), vec![vec![1, 0], vec![2]]);
    }

    #[test]
    fn test_iter_in_creation_order() {
        let mut p = Partition::from_groups(5, &[vec![3], vec![0, 4], vec![1], vec![2]]).unwrap();
        let c1 = p.community_of(1).unwrap();
        let c4 = p.community_of(4).unwrap();
        p.isolate(1).unwrap();
        p.commit(1, c4).unwrap();
        p.release_if_empty(c1);

        let firsts: Vec<u32> = p.iter().map(|c| c.members()[0]).collect();
        assert_eq!(firsts, vec![3, 0, 2]);
        assert_eq!(p.dense_assignment().unwrap(), vec![1, 1, 2, 0, 1]);
    }

    #[test]
    fn test_release_keeps_non_empty() {
        let mut p = Partition::from_groups(3, &[vec![0, 1], vec![2]]).unwrap();
        let c = p.community_of(0).unwrap();
        p.isolate(1).unwrap();
        assert!(!p.release_if_empty(c));
        p.commit(1, c).unwrap();
        assert_eq!(p.members(c), Some(&[0, 1][..]));
    }

    #[test]
    fn test_commit_rejects_dead_or_assigned() {
        let mut p = Partition::singletons(2);
        let c0 = p.community_of(0).unwrap();
        let c1 = p.community_of(1).unwrap();
        p.isolate(0).unwrap();
        p.release_if_empty(c0);
        assert!(matches!(p.commit(0, c0), Err(LouvainError::InconsistentPartition(_))));
        assert!(matches!(p.commit(1, c1), Err(LouvainError::InconsistentPartition(_))));
    }

    #[test]
    fn test_from_groups() {
        let p = Partition::from_groups(4, &[vec![1, 2], vec![3]]).unwrap();
        assert_eq!(p.community_of(0), None);
        let first = p.community_of(2).unwrap();
        let second = p.community_of(3).unwrap();
        assert!(p.contains(first, 1));
        assert!(!p.contains(second, 1));
        assert!(p.validate().is_err());
        assert!(p.dense_assignment().is_err());

        assert!(Partition::from_groups(3, &[vec![0, 1], vec![1, 2]]).is_err());
        assert!(Partition::from_groups(3, &[vec![0], vec![]]).is_err());
        assert!(Partition::from_groups(2, &[vec![5]]).is_err());
    }
}

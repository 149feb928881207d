use super::types::AtomId;

/// User-declared description of one reaction site.
///
/// Anchor and deletion lists are paired by position: `pre_anchors[i]`
/// corresponds to `post_anchors[i]`, and likewise for deletions.
/// Creation atoms exist only after the reaction and have no pre-side
/// counterpart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReactionSpec {
    pub pre_anchors: Vec<AtomId>,
    pub post_anchors: Vec<AtomId>,
    pub pre_deletions: Vec<AtomId>,
    pub post_deletions: Vec<AtomId>,
    pub creations: Vec<AtomId>,
}

impl ReactionSpec {
    pub fn new<I, J>(pre_anchors: I, post_anchors: J) -> Self
    where
        I: IntoIterator,
        I::Item: Into<AtomId>,
        J: IntoIterator,
        J::Item: Into<AtomId>,
    {
        Self {
            pre_anchors: pre_anchors.into_iter().map(Into::into).collect(),
            post_anchors: post_anchors.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_deletions<I, J>(mut self, pre: I, post: J) -> Self
    where
        I: IntoIterator,
        I::Item: Into<AtomId>,
        J: IntoIterator,
        J::Item: Into<AtomId>,
    {
        self.pre_deletions = pre.into_iter().map(Into::into).collect();
        self.post_deletions = post.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_creations<I>(mut self, creations: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<AtomId>,
    {
        self.creations = creations.into_iter().map(Into::into).collect();
        self
    }

    /// Splits a flat list holding pre ids followed by post ids.
    ///
    /// Returns `None` when the list has odd length, since the two halves
    /// could not correspond one to one.
    pub fn split_halves(ids: &[AtomId]) -> Option<(Vec<AtomId>, Vec<AtomId>)> {
        if ids.len() % 2 != 0 {
            return None;
        }
        let (pre, post) = ids.split_at(ids.len() / 2);
        Some((pre.to_vec(), post.to_vec()))
    }

    #[inline]
    pub fn has_deletions(&self) -> bool {
        !self.pre_deletions.is_empty() || !self.post_deletions.is_empty()
    }

    #[inline]
    pub fn has_creations(&self) -> bool {
        !self.creations.is_empty()
    }
}

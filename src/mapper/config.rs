//! Configuration for the reaction mapper.

/// Settings controlling the [`map_reaction`](super::map_reaction) pipeline.
///
/// # Examples
///
/// ```
/// use automap::MapConfig;
///
/// // Standard behaviour: truncate to a minimal template
/// let default = MapConfig::default();
/// assert_eq!(default.max_rounds, 10);
///
/// // Keep the full molecules and abort on one-sided template pairs
/// let custom = MapConfig {
///     truncate: false,
///     strict_partial: true,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapConfig {
    /// Upper bound on reconciliation rounds before giving up.
    pub max_rounds: usize,

    /// Global matching passes attempted inside one reconciliation round.
    pub max_missing_passes: usize,

    /// Whether to reduce the mapping to a minimal template.
    ///
    /// When `false` the full mapping is always emitted with original ids.
    pub truncate: bool,

    /// Whether a pair retained on one side only aborts the computation.
    ///
    /// When `false` such pairs are dropped and reported as
    /// [`MatchEvent::AsymmetricPair`](crate::MatchEvent::AsymmetricPair).
    pub strict_partial: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            max_rounds: 10,
            max_missing_passes: 3,
            truncate: true,
            strict_partial: false,
        }
    }
}

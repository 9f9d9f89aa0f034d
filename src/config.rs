//! Import configuration.

/// Default cap on the number of bones influencing a single vertex.
pub const DEFAULT_MAX_BONES_PER_VERTEX: usize = 4;

/// Options affecting how meshes are converted.
///
/// A single value is shared by every mesh of an import and threaded through explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    /// If extant, all geometry is being fixed to this size, which is appended to mesh names.
    pub fixed_size: Option<i32>,
    /// Keep bone scale in the bind pose instead of removing the inverse bind matrix's scale.
    pub ignore_node_scale: bool,
    /// The largest number of bone influences kept for a single vertex.
    pub max_bones_per_vertex: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            fixed_size: None,
            ignore_node_scale: false,
            max_bones_per_vertex: DEFAULT_MAX_BONES_PER_VERTEX,
        }
    }
}

impl ImportOptions {
    #[inline]
    pub fn with_fixed_size(mut self, size: i32) -> Self {
        self.fixed_size = Some(size);
        self
    }

    #[inline]
    pub fn with_ignore_node_scale(mut self, ignore: bool) -> Self {
        self.ignore_node_scale = ignore;
        self
    }

    /// # Panics
    ///
    /// * `max == 0`
    #[inline]
    pub fn with_max_bones_per_vertex(mut self, max: usize) -> Self {
        assert!(max > 0, "vertices must accept at least one bone influence");
        self.max_bones_per_vertex = max;
        self
    }
}

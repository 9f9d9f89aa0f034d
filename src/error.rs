//! Errors and recoverable diagnostics.

/// Conditions which abort the current mesh's data fill.
///
/// None of these abort an import as a whole: [AppMesh](crate::AppMesh) catches them, records them
/// in its [Diagnostics], and leaves the affected mesh partially or entirely empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("failed to find <controller> element for {0}")]
    MissingController(String),
    #[error("failed to find source geometry for {0}")]
    MissingGeometry(String),
    #[error("unsupported geometry type '<{element}>' for {mesh}")]
    UnsupportedGeometry { element: String, mesh: String },
    #[error("failed to get vertex data for {0}: primitives do not match base geometry")]
    PrimitiveMismatch(String),
    #[error("vertex arrays of {geometry} hold {len} entries; expected at least {expected}")]
    ArrayTooShort {
        geometry: String,
        len: usize,
        expected: usize,
    },
}

impl Error {
    /// Whether this error interrupted work already in progress, rather than preventing it from
    /// starting.
    pub fn is_hard(&self) -> bool {
        matches!(self, Self::PrimitiveMismatch(_) | Self::ArrayTooShort { .. })
    }
}

/// Recoverable problems; the affected data is skipped or repaired deterministically.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Warning {
    #[error("<{element}> element in {geometry} is not supported")]
    UnsupportedPrimitive { element: String, geometry: String },
    #[error("splitting primitive in {0}: too many verts for 16-bit indices")]
    PrimitiveSplit(String),
    #[error("mismatched morph targets ({targets}) and weights ({weights}) in {controller}")]
    MorphWeightMismatch {
        controller: String,
        targets: usize,
        weights: usize,
    },
    #[error("at least one vertex has too many bone weights; limiting to the largest {0} influences")]
    TooManyBoneWeights(usize),
    #[error("failed to find bone '{bone}', defaulting to instance_controller parent node '{node}'")]
    MissingBone { bone: String, node: String },
}

/// Every [Warning] and [Error] raised while converting one mesh, in order of occurrence.
///
/// Recording a diagnostic also emits a [tracing] event for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
    errors: Vec<Error>,
}

impl Diagnostics {
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{warning}");
        self.warnings.push(warning);
    }

    /// Record `warning` unless an identical one was already recorded.
    pub fn warn_once(&mut self, warning: Warning) {
        if !self.warnings.contains(&warning) {
            self.warn(warning);
        }
    }

    pub fn fail(&mut self, error: Error) {
        if error.is_hard() {
            tracing::error!("{error}");
        } else {
            tracing::warn!("{error}");
        }
        self.errors.push(error);
    }

    #[inline]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    #[inline]
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty()
    }
}

//! Morph target blending.

use hedron::{
    primitive::attribute::{Normal, Position, Rgba8, Texcoord},
    VertexArrays,
};
use nalgebra::Matrix4;

use crate::{
    anim::AnimatedFloatList,
    document::{Document, ElementId, MorphMethod, Semantic},
    error::{Error, Warning},
    mesh::{MeshBuffers, MeshContext, MeshGeometry},
    streams::SourceReader,
    vertex::{ensure_len, VertexResolver},
};

/// The weights of a `<morph>`'s targets, which may be animated.
pub(crate) fn morph_weights(doc: &Document, morph_el: ElementId) -> AnimatedFloatList<'_> {
    let source = doc.morph(morph_el).and_then(|morph| {
        let input = morph
            .targets
            .iter()
            .find(|input| input.semantic == Semantic::MorphWeight)?;
        doc.source(doc.find_input_source(morph_el, input)?)
    });
    AnimatedFloatList::new(source)
}

/// The target geometries of a `<morph>`, in order; `None` where a target can't be used.
fn morph_targets(doc: &Document, morph_el: ElementId) -> Vec<Option<MeshGeometry>> {
    let Some(morph) = doc.morph(morph_el) else {
        return Vec::new();
    };
    let source = morph
        .targets
        .iter()
        .find(|input| input.semantic == Semantic::MorphTarget)
        .and_then(|input| doc.source(doc.find_input_source(morph_el, input)?));
    let Some(reader) = source.map(SourceReader::positional) else {
        return Vec::new();
    };
    (0..reader.len())
        .map(|i| {
            let el = doc.resolve_uri(reader.string(i)?)?;
            MeshGeometry::resolve(doc, el, "").ok()
        })
        .collect()
}

/// Copy the last `count` entries of `array`, or nothing if it doesn't hold that many.
fn tail<T: Clone>(array: &[T], count: usize) -> Vec<T> {
    match array.len().checked_sub(count) {
        Some(start) => array[start..].to_vec(),
        None => Vec::new(),
    }
}

/// Add `src` into the entries of `dst` from `start` on, allocating `dst` if needed.
fn accumulate<T: Clone>(
    dst: &mut Vec<T>,
    start: usize,
    src: &[T],
    fill: T,
    f: impl Fn(&mut T, &T),
) {
    if src.is_empty() {
        return;
    }
    for (d, s) in ensure_len(dst, start + src.len(), fill)[start..]
        .iter_mut()
        .zip(src)
    {
        f(d, s);
    }
}

/// Fill one frame of `buffers` with the blend of `morph_el`'s base geometry and its targets at
/// `time`.
///
/// # Errors
///
/// * [Error::MissingGeometry] if the base geometry can't be found
/// * anything [VertexResolver::resolve] raises for the base
///
/// Errors raised for a target are recorded in the mesh's diagnostics instead; the entries the
/// target filled before failing are still blended, and later targets are unaffected.
pub(crate) fn blend_morph(
    cx: &mut MeshContext<'_>,
    morph_el: ElementId,
    buffers: &mut MeshBuffers,
    time: f32,
    transform: Matrix4<f32>,
) -> Result<(), Error> {
    let doc = cx.doc;
    let controller = doc
        .parent(morph_el)
        .and_then(|el| doc.get(el))
        .map_or("", |e| e.display_name());
    let Some(morph) = doc.morph(morph_el) else {
        return Err(Error::MissingGeometry(controller.to_owned()));
    };

    let targets = morph_targets(doc, morph_el);
    let mut weights = morph_weights(doc, morph_el).values_at(time);
    if targets.len() != weights.len() {
        cx.diagnostics.warn_once(Warning::MorphWeightMismatch {
            controller: controller.to_owned(),
            targets: targets.len(),
            weights: weights.len(),
        });
        if weights.len() < targets.len() {
            weights.resize(targets.len(), 0.0);
        }
    }

    let base = doc
        .resolve_uri(&morph.source)
        .filter(|&el| doc.geometry(el).is_some())
        .ok_or_else(|| Error::MissingGeometry(controller.to_owned()))?;
    let base = MeshGeometry::resolve(doc, base, controller)?;

    buffers.build(cx, base);
    let tuples = buffers.tuples.tuples();
    let vertices = &mut buffers.data.vertices;
    let mut resolver = VertexResolver::new(cx, time, transform);
    resolver.resolve(base, tuples, true, vertices)?;

    let count = tuples.len();
    let start = vertices.points.len() - count;

    if morph.method == MorphMethod::Normalized {
        let residual = (1.0 - weights.iter().sum::<f32>()).clamp(0.0, 1.0);
        for p in &mut vertices.points[start..] {
            p.coords *= residual;
        }
        for n in vertices.normals.iter_mut().skip(start) {
            *n *= residual;
        }
        for uv in vertices.uvs[start..].iter_mut() {
            uv.coords *= residual;
        }
        for uv in vertices.uv2s.iter_mut().skip(start) {
            uv.coords *= residual;
        }
        for color in vertices.colors.iter_mut().skip(start) {
            *color *= residual;
        }
    }

    // a target which doesn't match the base still contributes what it filled
    let mut failures = Vec::new();

    for (target, &weight) in targets.iter().zip(&weights) {
        if weight == 0.0 {
            continue;
        }
        let Some(target) = *target else {
            tracing::debug!(controller, "skipping unresolved morph target");
            continue;
        };

        // attributes the target doesn't define fall back to the base
        let mut blended = VertexArrays {
            points: tail(&vertices.points, count),
            normals: tail(&vertices.normals, count),
            colors: tail(&vertices.colors, count),
            uvs: tail(&vertices.uvs, count),
            uv2s: tail(&vertices.uv2s, count),
        };
        if let Err(err) = resolver.resolve(target, tuples, false, &mut blended) {
            failures.push(err);
        }

        accumulate(
            &mut vertices.points,
            start,
            &blended.points,
            Position::origin(),
            |d, s| d.coords += s.coords * weight,
        );
        accumulate(
            &mut vertices.normals,
            start,
            &blended.normals,
            Normal::zeros(),
            |d, s| *d += s * weight,
        );
        accumulate(
            &mut vertices.uvs,
            start,
            &blended.uvs,
            Texcoord::origin(),
            |d, s| d.coords += s.coords * weight,
        );
        accumulate(
            &mut vertices.uv2s,
            start,
            &blended.uv2s,
            Texcoord::origin(),
            |d, s| d.coords += s.coords * weight,
        );
        accumulate(
            &mut vertices.colors,
            start,
            &blended.colors,
            Rgba8::default(),
            |d, s| *d += *s * weight,
        );
    }

    for err in failures {
        cx.diagnostics.fail(err);
    }
    Ok(())
}

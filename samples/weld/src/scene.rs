//! A generated scene: a grid, a raised copy of it blended in by a morph, and a two-bone skin
//! over the morph.

use meshweld::{
    anim::Track,
    document::{
        BindMaterial, Document, ElementId, Geometry, Input, InstanceController,
        InstanceGeometry, Morph, MorphMethod, OffsetInput, Primitive, Skin, Source, Vertices,
        VertexWeights,
    },
    material::EffectExt,
    MeshInstance,
};
use nalgebra::{Matrix4, Vector3};

use crate::cli::Instance;

pub struct GridScene {
    pub doc: Document,
    /// The node the grid is placed under
    pub object: ElementId,
}

impl GridScene {
    pub fn build(cols: u32, rows: u32) -> Self {
        let grid = Grid { cols, rows };
        let mut doc = Document::new();

        let geometries = doc.add_library("library_geometries");
        grid.geometry(&mut doc, geometries, "grid", |_, _| 0.0);
        grid.geometry(&mut doc, geometries, "grid-raised", |u, v| {
            (u * std::f32::consts::TAU).sin() * (v * std::f32::consts::PI).sin()
        });

        let materials = doc.add_library("library_materials");
        doc.add_material(materials, "ground", "Ground", Some(EffectExt::default()));

        let controllers = doc.add_library("library_controllers");
        grid.wave(&mut doc, controllers);
        grid.skin(&mut doc, controllers);

        let nodes = doc.add_library("library_visual_scenes");
        let skeleton = doc.add_node(nodes, Some("skeleton"), "Skeleton", None);
        let root = doc.add_node(skeleton, Some("root"), "Root", Some("root"));
        doc.add_node(root, Some("tip"), "Tip", Some("tip"));
        let object = doc.add_node(nodes, Some("grid-node"), "Grid", None);

        Self { doc, object }
    }

    /// How the grid is instantiated for `instance`.
    pub fn instance(&self, instance: Instance) -> MeshInstance {
        let bind_material = Some(BindMaterial::default().bind("ground", "#ground"));
        match instance {
            Instance::Geometry => MeshInstance::Geometry(InstanceGeometry {
                url: "#grid".to_owned(),
                bind_material,
            }),
            Instance::Morph => MeshInstance::Controller(InstanceController {
                url: "#grid-wave".to_owned(),
                skeletons: Vec::new(),
                bind_material,
            }),
            Instance::Skin => MeshInstance::Controller(InstanceController {
                url: "#grid-skin".to_owned(),
                skeletons: vec!["#skeleton".to_owned()],
                bind_material,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Grid {
    cols: u32,
    rows: u32,
}

impl Grid {
    fn points(&self) -> u32 {
        (self.cols + 1) * (self.rows + 1)
    }

    /// Normalized grid coordinates of every point, row by row.
    fn coords(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        (0..=self.rows).flat_map(move |y| {
            (0..=self.cols).map(move |x| (x as f32 / self.cols as f32, y as f32 / self.rows as f32))
        })
    }

    fn geometry(
        &self,
        doc: &mut Document,
        lib: ElementId,
        id: &str,
        height: impl Fn(f32, f32) -> f32,
    ) {
        let geometry = doc.add_geometry(lib, id, Geometry { double_sided: true });
        let mesh = doc.add_mesh(geometry);

        let positions = format!("{id}-positions");
        let points = self
            .coords()
            .flat_map(|(u, v)| [u * self.cols as f32, v * self.rows as f32, height(u, v)])
            .collect();
        doc.add_source(mesh, &positions, Source::from_floats(points, &["X", "Y", "Z"]));
        let uvs = self.coords().flat_map(|(u, v)| [u, v]).collect();
        doc.add_source(mesh, &format!("{id}-uv"), Source::from_floats(uvs, &["S", "T"]));
        doc.add_source(
            mesh,
            &format!("{id}-normals"),
            Source::from_floats(vec![0.0, 0.0, 1.0], &["X", "Y", "Z"]),
        );
        doc.add_vertices(
            mesh,
            &format!("{id}-vertices"),
            Vertices::new(vec![Input::new("POSITION", format!("#{positions}"))]),
        );

        let stride = self.cols + 1;
        let mut p = Vec::with_capacity((self.cols * self.rows * 12) as usize);
        for y in 0..self.rows {
            for x in 0..self.cols {
                let corner = y * stride + x;
                for point in [corner, corner + 1, corner + stride + 1, corner + stride] {
                    p.extend([point, 0, point]);
                }
            }
        }
        doc.add_primitive(
            mesh,
            Primitive::polylist(vec![4; (self.cols * self.rows) as usize], p)
                .with_material("ground")
                .with_input(OffsetInput::new("VERTEX", format!("#{id}-vertices"), 0))
                .with_input(OffsetInput::new("NORMAL", format!("#{id}-normals"), 1))
                .with_input(OffsetInput::new("TEXCOORD", format!("#{id}-uv"), 2).with_set(0)),
        );
    }

    /// A morph raising the grid over one second.
    fn wave(&self, doc: &mut Document, lib: ElementId) {
        let ctrl = doc.add_controller(lib, "grid-wave");
        let morph = doc.add_morph(
            ctrl,
            Morph::new("#grid", MorphMethod::Normalized)
                .with_target(Input::new("MORPH_TARGET", "#grid-wave-targets"))
                .with_target(Input::new("MORPH_WEIGHT", "#grid-wave-weights")),
        );
        doc.add_source(
            morph,
            "grid-wave-targets",
            Source::from_id_refs(&["grid-raised"], "IDREF"),
        );
        doc.add_source(
            morph,
            "grid-wave-weights",
            Source::from_floats(vec![0.0], &["MORPH_WEIGHT"])
                .with_animation(0, Track::new([(0.0, 0.0), (1.0, 1.0)])),
        );
    }

    /// A skin binding the morph to `root` and `tip`, blending from one to the other along X.
    fn skin(&self, doc: &mut Document, lib: ElementId) {
        let ctrl = doc.add_controller(lib, "grid-skin");
        let mut skin = Skin::new("#grid-wave");
        skin.joints = vec![
            Input::new("JOINT", "#grid-skin-joints"),
            Input::new("INV_BIND_MATRIX", "#grid-skin-bind"),
        ];
        let weights: Vec<f32> = self.coords().flat_map(|(u, _)| [1.0 - u, u]).collect();
        skin.vertex_weights = VertexWeights {
            inputs: vec![
                OffsetInput::new("JOINT", "#grid-skin-joints", 0),
                OffsetInput::new("WEIGHT", "#grid-skin-weights", 1),
            ],
            vcount: vec![2; self.points() as usize],
            v: (0..self.points() as i64)
                .flat_map(|i| [0, 2 * i, 1, 2 * i + 1])
                .collect(),
        };
        let skin = doc.add_skin(ctrl, skin);

        let tip = Matrix4::new_translation(&Vector3::new(-(self.cols as f32), 0.0, 0.0));
        doc.add_source(
            skin,
            "grid-skin-joints",
            Source::from_names(&["root", "tip"], "JOINT"),
        );
        doc.add_source(
            skin,
            "grid-skin-bind",
            Source::from_matrices(&[Matrix4::identity(), tip], "TRANSFORM"),
        );
        doc.add_source(
            skin,
            "grid-skin-weights",
            Source::from_floats(weights, &["WEIGHT"]),
        );
    }
}

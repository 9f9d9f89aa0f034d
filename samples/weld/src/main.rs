use clap::Parser;
use meshweld::{material::MaterialList, scene::AppNode, AppMesh};
use nalgebra::Matrix4;

mod cli;
use cli::*;

mod scene;
use scene::GridScene;

pub fn main() {
    let cli = Cli::parse();
    initialize_tracing(&cli.log_filter, cli.log_format);
    tracing::debug!("{cli:#?}");

    let (cols, rows) = cli.grid;
    let scene = GridScene::build(cols, rows);
    let node = AppNode::new(&scene.doc, scene.object).with_invert_meshes(cli.invert);
    let mut materials = MaterialList::new();
    let mut mesh = AppMesh::new(node, scene.instance(cli.instance), cli.import_options());

    let object_offset = Matrix4::identity();
    for frame in 0..cli.frames {
        let t = match cli.frames {
            1 => 0.0,
            n => frame as f32 / (n - 1) as f32,
        };
        if let Err(e) = mesh.lock_mesh(&scene.doc, &mut materials, t, &object_offset) {
            tracing::error!("failed to convert {}: {e}", mesh.name(true));
            std::process::exit(1);
        }
    }
    let skin = mesh
        .lookup_skin_data(&scene.doc, &object_offset)
        .map(|skin| (skin.bones.len(), skin.weight.len()));

    let data = mesh.data();
    println!("mesh:             {}", mesh.name(true));
    println!("draw primitives:  {}", data.primitives.len());
    println!("triangles:        {}", data.indices.len() / 3);
    println!("vertices / frame: {}", mesh.verts_per_frame());
    println!("frames:           {}", mesh.frame_count());
    println!("materials:        {}", materials.len());
    if let Some((bones, influences)) = skin {
        println!("bones:            {bones}");
        println!("influences:       {influences}");
    }
    let diagnostics = mesh.diagnostics();
    println!(
        "diagnostics:      {} warnings, {} errors",
        diagnostics.warnings().len(),
        diagnostics.errors().len()
    );

    if let Err(e) = data.validate() {
        tracing::error!("converted mesh doesn't fit 16-bit index buffers: {e}");
        std::process::exit(1);
    }
    for prim in &data.primitives {
        if let Ok((base, local)) = data.local_indices::<u16>(prim) {
            tracing::info!(
                start = prim.start,
                triangles = prim.triangle_count(),
                material = ?prim.material,
                base,
                max = local.iter().max().copied().unwrap_or_default(),
                "draw primitive"
            );
        }
    }
}

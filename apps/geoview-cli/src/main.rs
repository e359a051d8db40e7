use anyhow::Context;
use clap::{Parser, Subcommand};
use geoview_common::ViewportSize;
use geoview_input::Action;
use geoview_persist::{JsonFileStore, MemoryStore, PreferenceStore, Preferences};
use geoview_render::HeadlessBackend;
use geoview_viewer::Viewer;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "geoview-cli", about = "Inspect shapes and viewer preferences")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Preference file
    #[arg(long, default_value = "./geoview_prefs.json")]
    prefs: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the shape catalog
    Shapes,
    /// Print mesh statistics for one shape
    Inspect {
        /// Catalog id, e.g. `torusKnot`
        id: String,
    },
    /// Read or write the stored preferences
    Prefs {
        #[command(subcommand)]
        command: PrefsCommand,
    },
    /// Run the viewer headless for a number of frames
    Simulate {
        #[arg(short, long, default_value = geoview_viewer::DEFAULT_SHAPE)]
        shape: String,
        #[arg(short, long, default_value = "60")]
        frames: u64,
        /// Start in wireframe mode
        #[arg(long)]
        wireframe: bool,
        /// Start with auto-rotation paused
        #[arg(long)]
        no_rotate: bool,
    },
}

#[derive(Subcommand)]
enum PrefsCommand {
    /// Print the effective preferences as JSON
    Show,
    /// Update one or both flags
    Set {
        #[arg(long)]
        wireframe: Option<bool>,
        #[arg(long)]
        auto_rotate: Option<bool>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Shapes => {
            for (i, shape) in geoview_geometry::CATALOG.iter().enumerate() {
                println!(
                    "{} {:<10} {:<11} {:<14} {}",
                    i + 1,
                    shape.id,
                    shape.display_name,
                    shape.description,
                    shape.color
                );
            }
        }
        Commands::Inspect { id } => {
            let shape = geoview_geometry::lookup(&id)?;
            let mesh = shape.create();
            println!("{} ({})", shape.display_name, shape.id);
            println!("description: {}", shape.description);
            println!("color: {}", shape.color);
            println!(
                "vertices: {}, triangles: {}, edges: {}",
                mesh.vertex_count(),
                mesh.triangle_count(),
                mesh.edge_indices().len() / 2
            );
            if let Some(bounds) = mesh.bounds() {
                let size = bounds.size();
                println!(
                    "bounds: ({:.2}, {:.2}, {:.2}) .. ({:.2}, {:.2}, {:.2}), size {:.2} x {:.2} x {:.2}",
                    bounds.min.x,
                    bounds.min.y,
                    bounds.min.z,
                    bounds.max.x,
                    bounds.max.y,
                    bounds.max.z,
                    size.x,
                    size.y,
                    size.z
                );
            }
        }
        Commands::Prefs { command } => {
            let mut store = PreferenceStore::new(JsonFileStore::open(&cli.prefs));
            match command {
                PrefsCommand::Show => print_prefs(&store.load()),
                PrefsCommand::Set {
                    wireframe,
                    auto_rotate,
                } => {
                    let mut prefs = store.load();
                    if let Some(v) = wireframe {
                        prefs.wireframe = v;
                    }
                    if let Some(v) = auto_rotate {
                        prefs.auto_rotate = v;
                    }
                    store.save(&prefs).with_context(|| {
                        format!("writing {}", store.storage().path().display())
                    })?;
                    print_prefs(&prefs);
                }
            }
        }
        Commands::Simulate {
            shape,
            frames,
            wireframe,
            no_rotate,
        } => {
            let mut store = PreferenceStore::new(MemoryStore::new());
            store.save(&Preferences {
                wireframe,
                auto_rotate: !no_rotate,
            })?;
            let mut viewer = Viewer::mount(
                HeadlessBackend::new(),
                ViewportSize::FALLBACK,
                store,
                &shape,
            )?;
            tracing::info!(shape = viewer.state().active_shape_id(), frames, "simulating");
            for _ in 0..frames {
                viewer.frame(&());
            }
            let rotation = viewer
                .session()
                .slot()
                .instance()
                .map(|i| i.rotation)
                .unwrap_or_default();
            println!(
                "shape: {}, frames: {}, rotation: ({:.3}, {:.3})",
                viewer.state().active_shape_id(),
                viewer.render_loop().frames(),
                rotation.x,
                rotation.y
            );

            // Cycle through every shape once to confirm nothing accumulates.
            for shape in &geoview_geometry::CATALOG {
                viewer.dispatch(&Action::SelectShape(shape.id));
                viewer.frame(&());
            }
            let backend = viewer.session().backend();
            println!(
                "after cycling: live resources {}, geometries created {}",
                backend.live_resources(),
                backend.geometries_created()
            );

            viewer.unmount();
            tracing::info!(frames = viewer.render_loop().frames(), "simulation finished");
            println!(
                "after unmount: live resources {}",
                viewer.session().backend().live_resources()
            );
        }
    }

    Ok(())
}

fn print_prefs(prefs: &Preferences) {
    let value = serde_json::json!({
        "wireframe": prefs.wireframe,
        "autoRotate": prefs.auto_rotate,
    });
    println!("{value:#}");
}

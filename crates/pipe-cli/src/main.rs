//! pipe CLI - inspect, edit, shoot and mesh pipe solids
//!
//! Pipes are read from and written to JSON documents holding the vertex
//! list; `export`/`import` convert to and from the binary body encoding.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

use pipe_kernel::pipe_kernel_geom::PipeDefinition;
use pipe_kernel::pipe_kernel_math::{Point3, Transform, Vec3};
use pipe_kernel::{PipeSolid, Ray, Scratch, ShotOutcome, TessellationParams};

mod stl;

#[derive(Parser)]
#[command(name = "pipe")]
#[command(about = "Inspect, edit, ray trace and mesh pipe solids", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Describe a pipe
    Describe {
        /// Pipe JSON file
        file: PathBuf,
        /// List every vertex
        #[arg(short, long)]
        verbose: bool,
        /// Multiply lengths by this factor when printing
        #[arg(long, default_value_t = 1.0)]
        mm2local: f64,
    },
    /// Check a pipe for structural problems
    Check {
        /// Pipe JSON file
        file: PathBuf,
    },
    /// Intersect one ray with a pipe and print the hit spans as JSON
    Shoot {
        /// Pipe JSON file
        file: PathBuf,
        /// Ray origin
        #[arg(long, num_args = 3, required = true, allow_negative_numbers = true)]
        origin: Vec<f64>,
        /// Ray direction (need not be unit length)
        #[arg(long, num_args = 3, required = true, allow_negative_numbers = true)]
        dir: Vec<f64>,
    },
    /// Mesh a pipe and write binary STL
    Tessellate {
        /// Pipe JSON file
        file: PathBuf,
        /// Output .stl file
        output: PathBuf,
        /// Absolute surface deviation (0 = unused)
        #[arg(long, default_value_t = 0.0)]
        abs: f64,
        /// Deviation relative to the pipe size (0 = unused)
        #[arg(long, default_value_t = 0.01)]
        rel: f64,
        /// Normal angle in radians (0 = unused)
        #[arg(long, default_value_t = 0.0)]
        norm: f64,
        /// Merge distance
        #[arg(long, default_value_t = 0.0005)]
        dist: f64,
    },
    /// Encode a pipe JSON file as a binary body
    Export {
        /// Pipe JSON file
        input: PathBuf,
        /// Output body file
        output: PathBuf,
        /// Multiply lengths by this factor
        #[arg(long, default_value_t = 1.0)]
        local2mm: f64,
    },
    /// Decode a binary body into a pipe JSON file
    Import {
        /// Input body file
        input: PathBuf,
        /// Output pipe JSON file
        output: PathBuf,
        /// Uniform scale applied to positions and sizes
        #[arg(long, default_value_t = 1.0)]
        scale: f64,
        /// Translation applied after scaling
        #[arg(long, num_args = 3, allow_negative_numbers = true)]
        translate: Option<Vec<f64>>,
    },
    /// Print an attribute (`V#`, `I#`, `O#`, `R#`, `P#`, `N`), or every vertex
    Get {
        /// Pipe JSON file
        file: PathBuf,
        /// Attribute name
        attr: Option<String>,
    },
    /// Edit attributes in place, e.g. `O1=4 "V2=0 0 10"`
    Set {
        /// Pipe JSON file
        file: PathBuf,
        /// `ATTR=VALUE` edits
        #[arg(required = true)]
        edits: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Describe {
            file,
            verbose,
            mm2local,
        } => {
            let solid = load(&file)?;
            print!("{}", solid.describe(verbose, mm2local));
        }
        Commands::Check { file } => check(&file)?,
        Commands::Shoot { file, origin, dir } => shoot(&file, &origin, &dir)?,
        Commands::Tessellate {
            file,
            output,
            abs,
            rel,
            norm,
            dist,
        } => {
            let params = TessellationParams {
                abs,
                rel,
                norm,
                dist,
            };
            tessellate(&file, &output, &params)?;
        }
        Commands::Export {
            input,
            output,
            local2mm,
        } => {
            let solid = load(&input)?;
            let bytes = solid.to_bytes(local2mm)?;
            fs::write(&output, bytes)
                .with_context(|| format!("writing {}", output.display()))?;
            println!("Exported {} vertices to {}", solid.vertices().len(), output.display());
        }
        Commands::Import {
            input,
            output,
            scale,
            translate,
        } => import(&input, &output, scale, translate.as_deref())?,
        Commands::Get { file, attr } => {
            let solid = load(&file)?;
            println!("{}", solid.get(attr.as_deref())?);
        }
        Commands::Set { file, edits } => set(&file, &edits)?,
    }

    Ok(())
}

fn read_definition(path: &Path) -> Result<PipeDefinition> {
    let json =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    PipeDefinition::from_json(&json).with_context(|| format!("parsing {}", path.display()))
}

fn write_definition(path: &Path, definition: &PipeDefinition) -> Result<()> {
    fs::write(path, definition.to_json()?)
        .with_context(|| format!("writing {}", path.display()))
}

fn load(path: &Path) -> Result<PipeSolid> {
    let definition = read_definition(path)?;
    PipeSolid::from_definition(&definition)
        .with_context(|| format!("preparing pipe from {}", path.display()))
}

fn check(path: &Path) -> Result<()> {
    let definition = read_definition(path)?;
    let warnings = pipe_kernel::pipe_kernel_geom::validate(&definition.vertices);
    if warnings.is_empty() {
        let solid = PipeSolid::from_definition(&definition)
            .with_context(|| format!("preparing pipe from {}", path.display()))?;
        let pipe = solid.prepped();
        println!(
            "{}: ok ({} segments, {} bends)",
            path.display(),
            pipe.segments.len(),
            pipe.bend_count()
        );
        return Ok(());
    }
    for warning in &warnings {
        println!("{}: {}", path.display(), warning);
    }
    bail!("{} problem(s) found", warnings.len());
}

fn triple(values: &[f64], what: &str) -> Result<[f64; 3]> {
    match values {
        [x, y, z] => Ok([*x, *y, *z]),
        _ => bail!("{what} needs 3 numbers, got {}", values.len()),
    }
}

fn shoot(path: &Path, origin: &[f64], dir: &[f64]) -> Result<()> {
    let solid = load(path)?;
    let [ox, oy, oz] = triple(origin, "--origin")?;
    let [dx, dy, dz] = triple(dir, "--dir")?;
    let direction = Vec3::new(dx, dy, dz);
    if direction.norm() == 0.0 {
        bail!("--dir must not be zero");
    }

    let ray = Ray::new(Point3::new(ox, oy, oz), direction);
    let outcome = solid.shoot(&ray, &mut Scratch::new());

    let hit = |h: &pipe_kernel::pipe_kernel_raytrace::Hit| {
        json!({
            "distance": h.distance,
            "point": [h.point.x, h.point.y, h.point.z],
            "normal": [h.normal.x, h.normal.y, h.normal.z],
            "segment": h.segment,
            "surface": format!("{:?}", h.surface),
        })
    };
    let report = match &outcome {
        ShotOutcome::Hit(spans) => json!({
            "result": "hit",
            "spans": spans
                .iter()
                .map(|s| json!({ "in": hit(&s.entry), "out": hit(&s.exit) }))
                .collect::<Vec<_>>(),
        }),
        ShotOutcome::Miss => json!({ "result": "miss" }),
        ShotOutcome::Inconsistent(problem) => json!({
            "result": "inconsistent",
            "problem": format!("{problem:?}"),
        }),
    };
    let failures = solid.diagnostics().failure_count();
    if failures > 0 {
        eprintln!("warning: {failures} bend root solve(s) failed");
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn tessellate(path: &Path, output: &Path, params: &TessellationParams) -> Result<()> {
    let solid = load(path)?;
    let mesh = solid.to_triangle_mesh(params);
    if mesh.num_triangles() == 0 {
        bail!("pipe produced no triangles");
    }
    let bytes = stl::export_stl_bytes(&mesh.vertices, &mesh.indices)?;
    fs::write(output, bytes).with_context(|| format!("writing {}", output.display()))?;
    println!(
        "Exported {} triangles ({} vertices) to {}",
        mesh.num_triangles(),
        mesh.num_vertices(),
        output.display()
    );
    Ok(())
}

fn import(input: &Path, output: &Path, scale: f64, translate: Option<&[f64]>) -> Result<()> {
    if scale <= 0.0 || !scale.is_finite() {
        bail!("--scale must be positive, got {scale}");
    }
    // The bottom-right entry holds 1/scale; the codec divides sizes by it.
    let mut scaling = Transform::identity();
    scaling.matrix[(3, 3)] = 1.0 / scale;
    let transform = match translate {
        Some(offset) => {
            let [x, y, z] = triple(offset, "--translate")?;
            Transform::translation(x, y, z).then(&scaling)
        }
        None => scaling,
    };

    let bytes = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    let solid = PipeSolid::from_bytes(&bytes, &transform)
        .with_context(|| format!("decoding {}", input.display()))?;
    write_definition(output, &solid.to_definition())?;
    println!("Imported {} vertices to {}", solid.vertices().len(), output.display());
    Ok(())
}

fn set(path: &Path, edits: &[String]) -> Result<()> {
    let pairs = edits
        .iter()
        .map(|edit| {
            edit.split_once('=')
                .with_context(|| format!("edit {edit:?} is not ATTR=VALUE"))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut solid = load(path)?;
    solid.adjust(&pairs)?;
    write_definition(path, &solid.to_definition())?;
    println!("{}", solid.get(None)?);
    Ok(())
}

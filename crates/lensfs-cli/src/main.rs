use clap::{Args as ClapArgs, Parser, Subcommand};
use lensfs_core::json::{JsonOpts, to_display_json};
use lensfs_core::{Error, OutputStore, PathResolver};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "lensfs",
    about = "Inspect a lens pipeline's directory layout and saved outputs",
    version
)]
struct Cli {
    /// Pipeline root directory
    #[arg(long, global = true, env = "LENSFS_ROOT", default_value = ".")]
    root: PathBuf,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Create settings/, logs/, outputs/ and data/ under the root
    Init,
    /// Print the entity names in lens_list.txt
    Lenses,
    /// Print the resolved paths for an entity
    Paths(PathsArgs),
    /// List saved output keys for an entity
    Keys(EntityArgs),
    /// Print a saved output as JSON
    Show(ShowArgs),
    /// Store a plain JSON document as an output
    Import(ImportArgs),
    /// Zip an entity's saved outputs into outputs/archive/
    Archive(EntityArgs),
}

#[derive(ClapArgs, Debug)]
struct EntityArgs {
    entity: String,
}

#[derive(ClapArgs, Debug)]
struct PathsArgs {
    entity: String,
    /// Band for image/psf paths, e.g. F390W
    #[arg(long)]
    band: Option<String>,
}

#[derive(ClapArgs, Debug)]
struct ShowArgs {
    entity: String,
    key: String,
    /// Print the stored document as-is instead of a summary view
    #[arg(long, default_value_t = false)]
    full: bool,
    /// Expand arrays into nested lists
    #[arg(long, default_value_t = false)]
    expand_arrays: bool,
    /// Max elements shown per sequence or array axis
    #[arg(long, default_value_t = 128)]
    max_array: usize,
    /// Max recursion depth
    #[arg(long, default_value_t = 16)]
    max_depth: usize,
}

#[derive(ClapArgs, Debug)]
struct ImportArgs {
    entity: String,
    key: String,
    /// Input JSON path
    #[arg(long, value_name = "JSON")]
    input: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("lensfs_core=info,lensfs_cli=info")),
        )
        .init();

    let cli = Cli::parse();
    let paths = PathResolver::new(&cli.root);
    tracing::debug!(root = %cli.root.display(), "resolved pipeline root");
    match cli.cmd {
        Cmd::Init => cmd_init(&paths),
        Cmd::Lenses => cmd_lenses(&paths),
        Cmd::Paths(a) => cmd_paths(&paths, a),
        Cmd::Keys(a) => cmd_keys(OutputStore::new(paths), a),
        Cmd::Show(a) => cmd_show(OutputStore::new(paths), a),
        Cmd::Import(a) => cmd_import(OutputStore::new(paths), a),
        Cmd::Archive(a) => cmd_archive(OutputStore::new(paths), a),
    }
}

fn exit_code(e: &Error) -> i32 {
    match e {
        Error::NotFound { .. } | Error::Read { .. } | Error::WriteFailure { .. } => 2,
        Error::CorruptArtifact(_) | Error::PreconditionViolation(_) => 3,
    }
}

fn fail(e: Error) -> ! {
    eprintln!("error: {}", e);
    std::process::exit(exit_code(&e));
}

fn cmd_init(paths: &PathResolver) {
    paths.ensure_layout().unwrap_or_else(|e| fail(e));
    println!("{}", paths.root().display());
}

fn cmd_lenses(paths: &PathResolver) {
    for name in paths.lens_list().unwrap_or_else(|e| fail(e)) {
        println!("{}", name);
    }
}

fn cmd_paths(paths: &PathResolver, args: PathsArgs) {
    let name = args.entity.as_str();
    println!("config\t{}", paths.config_file_path(name).display());
    println!("data\t{}", paths.entity_data_dir(name).display());
    if let Some(band) = args.band.as_deref() {
        println!("image\t{}", paths.image_file_path(name, band).display());
        println!("psf\t{}", paths.psf_file_path(name, band).display());
    }
    println!("logs\t{}", paths.logs_dir().display());
    println!("outputs\t{}", paths.outputs_dir().display());
}

fn cmd_keys(store: OutputStore, args: EntityArgs) {
    for key in store.keys(&args.entity).unwrap_or_else(|e| fail(e)) {
        println!("{}", key);
    }
}

fn cmd_show(store: OutputStore, args: ShowArgs) {
    let value = store
        .load(&args.entity, &args.key)
        .unwrap_or_else(|e| fail(e));
    let out = if args.full {
        lensfs_core::encode(&value).unwrap_or_else(|e| fail(e))
    } else {
        let opts = JsonOpts {
            max_array_elems: args.max_array,
            max_depth: args.max_depth,
            array_summary: !args.expand_arrays,
        };
        to_display_json(&value, opts)
    };
    match serde_json::to_string_pretty(&out) {
        Ok(s) => println!("{}", s),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(3);
        }
    }
}

fn cmd_import(store: OutputStore, args: ImportArgs) {
    let data = std::fs::read_to_string(&args.input).unwrap_or_else(|e| {
        eprintln!("error reading JSON: {}", e);
        std::process::exit(2);
    });
    let doc: serde_json::Value = serde_json::from_str(&data).unwrap_or_else(|e| {
        eprintln!("invalid JSON: {}", e);
        std::process::exit(3);
    });
    let value = lensfs_core::decode(&doc).unwrap_or_else(|e| fail(e));
    let path = store
        .save(&args.entity, &args.key, &value)
        .unwrap_or_else(|e| fail(e));
    println!("{}", path.display());
}

fn cmd_archive(store: OutputStore, args: EntityArgs) {
    let zip = store.archive(&args.entity).unwrap_or_else(|e| fail(e));
    println!("{}", zip.display());
}

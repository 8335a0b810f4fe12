//! # Tripcard CLI
//!
//! Command-line interface for the travel post designer.
//!
//! ## Usage
//!
//! ```bash
//! # List the available layouts
//! tripcard list
//!
//! # Write an HTML preview of the story layout
//! tripcard preview story --set title="Lisbon Weekend" -o preview.html
//!
//! # Export a PNG using content from a JSON file
//! tripcard export square --content trip.json --assets ./public --out-dir out/
//!
//! # Run the editor API
//! tripcard serve --listen 0.0.0.0:3000 --assets ./public
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tripcard::{
    Catalog, ContentFields, Editor, TripcardError,
    export::{Exporter, ImageResolver},
    logging::{self, LogConfig},
    server::{self, ServerConfig},
};

/// Tripcard - Travel package post designer
#[derive(Parser, Debug)]
#[command(name = "tripcard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// JSON catalog replacing the built-in layouts
    #[arg(long, global = true, value_name = "FILE")]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Content options shared by `preview` and `export`.
#[derive(Args, Debug)]
struct ContentArgs {
    /// Layout id (see `tripcard list`)
    layout: String,

    /// JSON file with content fields (missing fields keep sample values)
    #[arg(long, value_name = "FILE")]
    content: Option<PathBuf>,

    /// Set one field, e.g. --set price=1499 (use \n for line breaks)
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    assignments: Vec<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the available layouts
    List,

    /// Render a standalone HTML preview
    Preview {
        #[command(flatten)]
        content: ContentArgs,

        /// Output file (default: stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Origin for root-relative background URLs
        #[arg(long, default_value = "http://localhost:3000")]
        origin: String,
    },

    /// Export a PNG at the layout's export size
    Export {
        #[command(flatten)]
        content: ContentArgs,

        /// Directory for the PNG
        #[arg(long, default_value = ".", value_name = "DIR")]
        out_dir: PathBuf,

        /// Directory holding images/ for root-relative backgrounds
        #[arg(long, value_name = "DIR")]
        assets: Option<PathBuf>,
    },

    /// Run the HTTP editor API
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:3000")]
        listen: String,

        /// Directory holding images/, served at /images
        #[arg(long, value_name = "DIR")]
        assets: Option<PathBuf>,

        /// Public origin for preview URLs (default: http://<listen>)
        #[arg(long)]
        origin: Option<String>,

        /// Host that remote background URLs may be fetched from (repeatable)
        #[arg(long = "allow-image-host", value_name = "HOST")]
        allowed_image_hosts: Vec<String>,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), TripcardError> {
    let cli = Cli::parse();
    logging::init_logging(&LogConfig::from_verbosity(cli.verbose, cli.quiet))?;

    let catalog = match &cli.catalog {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin(),
    };

    match cli.command {
        Commands::List => {
            println!("Available layouts:");
            for layout in catalog.layouts() {
                println!(
                    "  {:<10} {:<10} {}x{}",
                    layout.id,
                    layout.label(),
                    layout.dimensions.width,
                    layout.dimensions.height
                );
            }
            Ok(())
        }

        Commands::Preview {
            content,
            output,
            origin,
        } => {
            let editor = open_editor(catalog, &content)?;
            let html = editor.preview_html(Some(&origin));
            match output {
                Some(path) => {
                    std::fs::write(&path, html)?;
                    println!("Preview written to {}", path.display());
                }
                None => print!("{}", html),
            }
            Ok(())
        }

        Commands::Export {
            content,
            out_dir,
            assets,
        } => {
            let editor = open_editor(catalog, &content)?;
            let snapshot = editor.export_snapshot();
            let exporter = Exporter::new(ImageResolver::new(assets)?);

            let runtime = tokio::runtime::Runtime::new()?;
            let artifact = runtime.block_on(exporter.export(snapshot))?;

            std::fs::create_dir_all(&out_dir)?;
            let path = out_dir.join(&artifact.filename);
            std::fs::write(&path, &artifact.png)?;
            println!(
                "Exported {}x{} PNG to {}",
                artifact.width,
                artifact.height,
                path.display()
            );
            Ok(())
        }

        Commands::Serve {
            listen,
            assets,
            origin,
            allowed_image_hosts,
        } => {
            let config = ServerConfig {
                listen_addr: listen,
                asset_dir: assets,
                public_origin: origin,
                catalog_path: cli.catalog,
                remote_image_hosts: allowed_image_hosts,
            };
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::serve(config))
        }
    }
}

/// Editor on `args.layout` with content from the file and `--set` flags.
fn open_editor(catalog: Catalog, args: &ContentArgs) -> Result<Editor, TripcardError> {
    let mut editor = Editor::with_layout(Arc::new(catalog), &args.layout)?;

    let mut content = match &args.content {
        Some(path) => load_content(path)?,
        None => ContentFields::default(),
    };
    for assignment in &args.assignments {
        content
            .apply_assignment(assignment)
            .map_err(TripcardError::Template)?;
    }
    editor.set_content(content);
    Ok(editor)
}

fn load_content(path: &Path) -> Result<ContentFields, TripcardError> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

//! Shader Cloud - publish and fetch shading materials from the command line

use clap::{Parser, Subcommand};
use log::error;
use shadercloud::config::Settings;
use shadercloud::constants::serialize::ROOT_LABEL;
use shadercloud::material::{Material, MaterialFile};
use shadercloud::{serialize, ExportRequest, HttpCatalogClient, MaterialSync, Result};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "shadercloud", version, about = "Exchange materials with Shader Cloud")]
struct Cli {
    /// Catalog API key (overrides the settings file)
    #[arg(long, env = "SHADERCLOUD_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Publish a material document, updating it if it was published before
    Export {
        file: PathBuf,
        #[arg(long)]
        name: String,
        #[arg(long)]
        category: i64,
        #[arg(long)]
        description: Option<String>,
    },
    /// Download a material into a document, replacing its node tree
    Import { id: i64, file: PathBuf },
    /// List catalog categories
    Categories,
    /// Forget the catalog id of a material document
    Reset { file: PathBuf },
    /// Print the serialized node tree of a material document
    Show { file: PathBuf },
}

fn connect(cli: &Cli) -> Result<MaterialSync<HttpCatalogClient>> {
    let mut settings = Settings::load()?;
    if let Some(key) = &cli.api_key {
        settings.api_key = key.clone();
    }
    let client = HttpCatalogClient::new(&settings)?;
    Ok(MaterialSync::new(client).with_auto_layout(settings.use_arranger))
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Export {
            file,
            name,
            category,
            description,
        } => {
            let sync = connect(cli)?;
            let mut document = MaterialFile::new();
            let mut material = document.load(file)?;
            let request = ExportRequest {
                name: name.clone(),
                description: description.clone(),
                category: Some(*category),
            };
            let id = sync.export(&mut material, &request)?;
            document.save_current(&material)?;
            println!("Material was successfully added to Shader Cloud");
            println!("Shader Cloud ID: {}", id);
        }
        Command::Import { id, file } => {
            let sync = connect(cli)?;
            let mut document = MaterialFile::new();
            let mut material = if file.exists() {
                document.load(file)?
            } else {
                Material::new(format!("Shader Cloud {}", id))
            };
            sync.import(&mut material, *id)?;
            document.save(file, &material)?;
            println!("Material was successfully imported to {}", file.display());
        }
        Command::Categories => {
            let sync = connect(cli)?;
            for category in sync.categories()? {
                println!("{:>5}  {}", category.id, category.name);
            }
        }
        Command::Reset { file } => {
            let mut document = MaterialFile::new();
            let mut material = document.load(file)?;
            match material.clear_remote_id() {
                Some(id) => {
                    document.save_current(&material)?;
                    println!("Forgot Shader Cloud ID {}; the next export creates a new material", id);
                }
                None => println!("Material has no Shader Cloud ID"),
            }
        }
        Command::Show { file } => {
            let material = MaterialFile::new().load(file)?;
            print!("{}", serialize(&material.tree, ROOT_LABEL)?);
            if let Some(id) = material.remote_id() {
                println!("Shader Cloud ID: {}", id);
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

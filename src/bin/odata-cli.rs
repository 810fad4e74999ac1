use clap::{Parser, Subcommand};
use serde_json::Value;
use url::Url;

use odata_router::routing::matcher::PathPrefixMatcher;
use odata_router::routing::{request_left_part, resolve, split_service_root};

#[derive(Parser)]
#[command(name = "odata-cli")]
#[command(about = "Inspect how OData request URIs split into service root and resource path", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the escaped prefix of a path whose unescaped tail is the resource path
    Resolve {
        /// Escaped URI path (no query string)
        uri: String,
        /// Unescaped resource path
        resource_path: String,
    },
    /// Split an absolute request URL below a route prefix
    Split {
        /// Escaped request URL, e.g. http://host/odata/Items?$top=1
        url: String,
        /// Unescaped route prefix
        #[arg(short, long, default_value = "odata")]
        prefix: String,
    },
    /// Ask a running router to resolve a path
    Probe {
        /// Escaped path and query to request, e.g. /odata/Items
        path: String,
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve { uri, resource_path } => match resolve(&uri, &resource_path) {
            Ok(root) => {
                println!("service_root:   {}", root);
                println!("resource_path:  {}", &uri[root.len()..]);
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        Commands::Split { url, prefix } => {
            let url = Url::parse(&url)?;
            let authority = match url.port() {
                Some(port) => format!("{}:{}", url.host_str().unwrap_or_default(), port),
                None => url.host_str().unwrap_or_default().to_string(),
            };

            let Some(resource_path) = PathPrefixMatcher::new(prefix.as_str()).capture(url.path()) else {
                eprintln!("Error: '{}' is not below route prefix '{}'", url.path(), prefix);
                std::process::exit(1);
            };

            let left_part = request_left_part(url.scheme(), &authority, url.path());
            match split_service_root(&left_part, &resource_path, url.query()) {
                Ok(split) => {
                    println!("resource_path:  {}", resource_path);
                    println!("service_root:   {}", split.service_root);
                    println!("path_and_query: {}", split.path_and_query);
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Probe { path, url } => {
            let base = Url::parse(&url)?;
            let target = base.join(&path)?;
            let res = reqwest::get(target).await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: router returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

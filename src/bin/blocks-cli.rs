use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "blocks-cli")]
#[command(about = "Management CLI for rpaas configuration blocks", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Instance whose blocks are managed.
    #[arg(short, long)]
    instance: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configuration blocks
    List,
    /// Create or replace a configuration block
    Update {
        #[arg(short, long)]
        name: String,
        #[command(flatten)]
        content: ContentArgs,
        /// Scope the block to a named server
        #[arg(short, long)]
        server_name: Option<String>,
    },
    /// Delete a configuration block
    Delete {
        name: String,
        #[arg(short, long)]
        server_name: Option<String>,
    },
    /// Manage Lua module blocks
    #[command(subcommand)]
    Lua(LuaCommands),
}

#[derive(Subcommand)]
enum LuaCommands {
    /// List Lua modules
    List,
    /// Create or replace a Lua module
    Update {
        /// Lua module type (e.g. server, worker)
        #[arg(short = 't', long = "type")]
        module_type: String,
        #[command(flatten)]
        content: ContentArgs,
    },
    /// Delete a Lua module
    Delete {
        #[arg(short = 't', long = "type")]
        module_type: String,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct ContentArgs {
    /// Block content
    #[arg(short, long)]
    content: Option<String>,
    /// Read block content from a file
    #[arg(short, long)]
    file: Option<PathBuf>,
}

impl ContentArgs {
    fn read(self) -> std::io::Result<String> {
        match (self.content, self.file) {
            (Some(content), _) => Ok(content),
            (None, Some(path)) => std::fs::read_to_string(path),
            (None, None) => Ok(String::new()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let blocks_url = format!("{}/resources/{}/block", cli.url, cli.instance);
    let lua_url = format!("{}/resources/{}/lua", cli.url, cli.instance);

    match cli.command {
        Commands::List => {
            let res = client.get(&blocks_url).send().await?;
            print_response(res).await?;
        }
        Commands::Update { name, content, server_name } => {
            let mut body = serde_json::json!({ "name": name, "content": content.read()? });
            if let Some(server_name) = server_name {
                body["server_name"] = Value::String(server_name);
            }
            let res = client.post(&blocks_url).json(&body).send().await?;
            print_response(res).await?;
        }
        Commands::Delete { name, server_name } => {
            let mut req = client.delete(format!("{}/{}", blocks_url, name));
            if let Some(server_name) = server_name {
                req = req.query(&[("server_name", server_name)]);
            }
            print_response(req.send().await?).await?;
        }
        Commands::Lua(LuaCommands::List) => {
            let res = client.get(&lua_url).send().await?;
            print_response(res).await?;
        }
        Commands::Lua(LuaCommands::Update { module_type, content }) => {
            let content = content.read()?;
            let res = client
                .post(&lua_url)
                .form(&[("lua_module_type", module_type.as_str()), ("content", content.as_str())])
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Lua(LuaCommands::Delete { module_type }) => {
            let res = client
                .delete(&lua_url)
                .form(&[("lua_module_type", module_type)])
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: block API returned status {}", status);
        if !text.is_empty() {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    if text.is_empty() {
        println!("OK");
        return Ok(());
    }

    let json: Value = serde_json::from_str(&text)?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Operator CLI for the state gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the registered state portals
    States,
    /// Probe one portal through the gateway and report the status
    Check {
        /// Tenant slug, e.g. "lagos"
        slug: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?;

    match cli.command {
        Commands::States => {
            let res = client
                .get(format!("{}/api/states", cli.url))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Check { slug } => {
            let res = client
                .get(format!("{}/state/{}/", cli.url, slug))
                .send()
                .await?;
            let status = res.status();
            println!("{} -> {}", slug, status);
            match status.as_u16() {
                404 => println!("no portal is registered under this slug"),
                502 => println!("the portal's upstream is not responding"),
                _ => {}
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

use bwtfs_client::{ClientConfig, FsClient, TracingProgress};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const MB: f64 = 1024.0 * 1024.0;

#[derive(Parser, Debug)]
#[command(author, version, about = "Command-line client for the BwtFS filesystem service", long_about = None)]
struct Args {
    /// Service address (overrides BWTFS_URL)
    #[arg(short, long)]
    url: Option<String>,

    /// Chunk size in bytes for uploads and download reads (overrides BWTFS_CHUNK_SIZE)
    #[arg(long)]
    chunk_size: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show total, used and free capacity
    Info,
    /// Upload a file and print its access token
    Upload {
        /// File to upload
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Download a file by token
    Download {
        /// Access token
        #[arg(short, long)]
        token: String,
        /// Output path; writes to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete a file by token
    Delete {
        /// Access token
        #[arg(short, long)]
        token: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bwtfs_client=info,bwtfs=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = ClientConfig::from_env();
    if let Some(url) = args.url {
        config.base_url = url;
    }
    if let Some(chunk_size) = args.chunk_size {
        config.chunk_size = chunk_size;
    }

    let client = FsClient::connect(config)?;
    let progress = TracingProgress;

    match args.command {
        Command::Info => {
            let system = client.info().await?;
            println!("Total: {} bytes ({:.2} MB)", system.total, system.total as f64 / MB);
            println!("Used:  {} bytes ({:.2} MB)", system.used(), system.used() as f64 / MB);
            println!("Free:  {} bytes ({:.2} MB)", system.free, system.free as f64 / MB);
        }
        Command::Upload { file } => {
            let token = client.upload(&file, &progress).await?;
            println!("{}", token);
        }
        Command::Download { token, output } => match output {
            Some(path) => {
                client.download(&token, &path, &progress).await?;
            }
            None => {
                let mut stdout = tokio::io::stdout();
                let written = client.download_to(&token, &mut stdout, &progress).await?;
                stdout.flush().await?;
                info!("Wrote {} bytes to stdout", written);
            }
        },
        Command::Delete { token } => {
            client.delete(&token).await?;
            println!("Deleted");
        }
    }

    Ok(())
}

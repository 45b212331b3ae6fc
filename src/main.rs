use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use url::Url;

mod extract;
mod models;
mod store;
mod wiki;

use wiki::{WikiClient, WikiError};

const VALIDATION_MESSAGE: &str = "Please provide a keyword, number of urls and output filename";
const DEFAULT_OUTPUT: &str = "output.json";

#[derive(Debug, Parser)]
#[command(
    name = "wiki-extractor",
    about = "Extract info from Wikipedia and save to json"
)]
struct Cli {
    /// Keyword to search for
    #[arg(long)]
    keyword: Option<String>,
    /// Number of urls to extract
    #[arg(long = "num_urls", allow_negative_numbers = true)]
    num_urls: Option<i64>,
    /// Output filename [default: output.json]
    #[arg(long)]
    output: Option<String>,
    /// MediaWiki api.php endpoint
    #[arg(long, env = "WIKI_EXTRACTOR_API_URL", default_value = wiki::DEFAULT_API_URL)]
    api_url: Url,
}

impl Cli {
    /// Keyword and result count, or `None` when either is missing or empty.
    fn required(&self) -> Option<(&str, i64)> {
        let keyword = self.keyword.as_deref().filter(|k| !k.is_empty())?;
        let num_urls = self.num_urls.filter(|n| *n != 0)?;
        Some((keyword, num_urls))
    }

    /// Output path, falling back to `output.json` when absent or empty.
    fn output(&self) -> PathBuf {
        let output = self.output.as_deref().filter(|o| !o.is_empty());
        PathBuf::from(output.unwrap_or(DEFAULT_OUTPUT))
    }
}

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Wiki(#[from] WikiError),
    #[error("Failed to write {}: {source}", .path.display())]
    Store {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let Some((keyword, num_urls)) = cli.required() else {
        println!("{}", VALIDATION_MESSAGE);
        return ExitCode::FAILURE;
    };

    match run(&cli, keyword, num_urls).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(RunError::Wiki(e @ WikiError::NoResults { .. })) => {
            println!("{}", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, keyword: &str, num_urls: i64) -> Result<(), RunError> {
    let client = WikiClient::new(cli.api_url.clone())?;
    let records = wiki::fetch_data(&client, keyword, num_urls).await?;

    let output = cli.output();
    store::store_data(&records, &output).map_err(|source| RunError::Store { path: output, source })?;

    Ok(())
}

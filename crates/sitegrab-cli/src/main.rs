//! Sitegrab CLI - crawl a site section and convert its pages to Markdown

use clap::{Args, Parser, Subcommand};
use sitegrab::convert::DEFAULT_MODEL;
use sitegrab::{
    join_documents, CanonicalUrl, ConvertOptions, ConverterConfig, Crawler, FetchOptions,
    HttpFetcher, OpenAiConverter, Pipeline,
};
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Log filter used when RUST_LOG is unset
const DEFAULT_LOG_FILTER: &str = "sitegrab=debug";

/// Sitegrab - scoped website crawler with Markdown conversion
#[derive(Parser, Debug)]
#[command(name = "sitegrab")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Write results to a file instead of stdout
    #[arg(long, short, global = true)]
    output: Option<PathBuf>,

    /// Disable logging
    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every URL at or below the seed's directory
    Crawl {
        /// Seed URL
        url: String,

        /// Also follow links to pages in the seed's own directory
        #[arg(long, short)]
        include_same_level: bool,

        /// Pages expanded at once
        #[arg(long, default_value_t = 1)]
        concurrency: usize,

        #[command(flatten)]
        fetch: FetchArgs,
    },
    /// Convert pages to Markdown, in argument order
    Convert {
        /// URLs to convert
        #[arg(required = true)]
        urls: Vec<String>,

        /// Pages converted at once
        #[arg(long, default_value_t = 8)]
        concurrency: usize,

        #[command(flatten)]
        converter: ConverterArgs,

        #[command(flatten)]
        fetch: FetchArgs,
    },
    /// Crawl from a seed, then convert every discovered page (binary files are skipped)
    Harvest {
        /// Seed URL
        url: String,

        /// Also follow links to pages in the seed's own directory
        #[arg(long, short)]
        include_same_level: bool,

        /// Pages expanded at once while crawling
        #[arg(long, default_value_t = 1)]
        crawl_concurrency: usize,

        /// Pages converted at once
        #[arg(long, default_value_t = 8)]
        concurrency: usize,

        #[command(flatten)]
        converter: ConverterArgs,

        #[command(flatten)]
        fetch: FetchArgs,
    },
}

#[derive(Args, Debug)]
struct FetchArgs {
    /// Custom User-Agent
    #[arg(long)]
    user_agent: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Retries for timeouts, connection failures and 5xx responses
    #[arg(long, default_value_t = 0)]
    retries: u32,
}

impl FetchArgs {
    fn options(&self) -> FetchOptions {
        FetchOptions {
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.timeout),
            retries: self.retries,
            ..Default::default()
        }
    }
}

#[derive(Args, Debug)]
struct ConverterArgs {
    /// Model used for conversion
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// API root, e.g. https://api.openai.com/v1
    #[arg(long)]
    api_base: Option<String>,
}

impl ConverterArgs {
    fn config(&self) -> ConverterConfig {
        let mut config = ConverterConfig {
            api_key: self.api_key.clone(),
            ..Default::default()
        }
        .with_model(&self.model);
        if let Some(ref base) = self.api_base {
            config = config.with_api_base(base);
        }
        config
    }
}

#[tokio::main]
async fn main() {
    // OPENAI_API_KEY may live in ./.env; real environment variables win
    load_env_file(None);
    let cli = Cli::parse();

    if !cli.quiet {
        init_logging();
    }

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Load variables from `path`, or from `.env` in the current directory or a parent
fn load_env_file(path: Option<&Path>) -> bool {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path),
        None => dotenvy::dotenv().map(|_| ()),
    };
    loaded.is_ok()
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), sitegrab::Error> {
    let text = match cli.command {
        Commands::Crawl {
            url,
            include_same_level,
            concurrency,
            fetch,
        } => {
            let crawler = build_crawler(include_same_level, concurrency, &fetch)?;
            let urls = crawler.crawl(&url).await?;
            format_url_list(&urls)
        }
        Commands::Convert {
            urls,
            concurrency,
            converter,
            fetch,
        } => {
            let pipeline = build_pipeline(concurrency, &converter, &fetch)?;
            let docs = pipeline.convert_urls(&urls).await?;
            join_documents(&docs)
        }
        Commands::Harvest {
            url,
            include_same_level,
            crawl_concurrency,
            concurrency,
            converter,
            fetch,
        } => {
            // Fail on a missing API key before crawling
            let pipeline = build_pipeline(concurrency, &converter, &fetch)?;
            let crawler = build_crawler(include_same_level, crawl_concurrency, &fetch)?;
            let docs = pipeline.harvest(&crawler, &url).await?;
            join_documents(&docs)
        }
    };

    match cli.output {
        Some(path) => {
            write_file(&path, &text)?;
            tracing::info!(path = %path.display(), "Results written");
        }
        None => writeln_safe(&text),
    }
    Ok(())
}

fn build_crawler(
    include_same_level: bool,
    concurrency: usize,
    fetch: &FetchArgs,
) -> Result<Crawler, sitegrab::Error> {
    let fetcher = HttpFetcher::with_options(fetch.options())?;
    Crawler::builder()
        .include_same_level(include_same_level)
        .concurrency(concurrency)
        .fetcher(Arc::new(fetcher))
        .build()
}

fn build_pipeline(
    concurrency: usize,
    converter: &ConverterArgs,
    fetch: &FetchArgs,
) -> Result<Pipeline, sitegrab::Error> {
    let fetcher = HttpFetcher::with_options(fetch.options())?;
    let converter = OpenAiConverter::new(converter.config())?;
    Ok(Pipeline::new(Arc::new(fetcher), Arc::new(converter))
        .with_options(ConvertOptions { concurrency }))
}

/// One canonical URL per line, sorted
fn format_url_list(urls: &BTreeSet<CanonicalUrl>) -> String {
    urls.iter()
        .map(CanonicalUrl::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}

fn write_file(path: &Path, text: &str) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    writeln!(file, "{}", text)
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitegrab::normalize;

    #[test]
    fn test_format_url_list_sorted() {
        let urls: BTreeSet<CanonicalUrl> = [
            "http://x/docs/b.html",
            "http://x/docs/a.html?q=1",
            "http://x/docs/sub/c.html",
        ]
        .into_iter()
        .map(|u| normalize(u).unwrap())
        .collect();

        assert_eq!(
            format_url_list(&urls),
            "http://x/docs/a.html\nhttp://x/docs/b.html\nhttp://x/docs/sub/c.html"
        );
    }

    #[test]
    fn test_format_url_list_empty() {
        assert_eq!(format_url_list(&BTreeSet::new()), "");
    }

    #[test]
    fn test_parse_crawl() {
        let cli = Cli::try_parse_from([
            "sitegrab",
            "crawl",
            "http://x/docs/index.html",
            "-i",
            "--concurrency",
            "4",
            "-o",
            "urls.txt",
        ])
        .unwrap();

        assert_eq!(cli.output, Some(PathBuf::from("urls.txt")));
        assert!(!cli.quiet);
        match cli.command {
            Commands::Crawl {
                url,
                include_same_level,
                concurrency,
                fetch,
            } => {
                assert_eq!(url, "http://x/docs/index.html");
                assert!(include_same_level);
                assert_eq!(concurrency, 4);
                assert_eq!(fetch.options().timeout, Duration::from_secs(30));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_convert_keeps_argument_order() {
        let cli = Cli::try_parse_from([
            "sitegrab",
            "convert",
            "http://x/b.html",
            "http://x/a.html",
            "--api-key",
            "sk-test",
            "--model",
            "gpt-test",
            "-q",
        ])
        .unwrap();

        assert!(cli.quiet);
        match cli.command {
            Commands::Convert {
                urls, converter, ..
            } => {
                assert_eq!(urls, vec!["http://x/b.html", "http://x/a.html"]);
                let config = converter.config();
                assert_eq!(config.api_key.as_deref(), Some("sk-test"));
                assert_eq!(config.model, "gpt-test");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_convert_requires_a_url() {
        assert!(Cli::try_parse_from(["sitegrab", "convert", "--api-key", "k"]).is_err());
    }

    #[test]
    fn test_converter_args_api_base() {
        let args = ConverterArgs {
            model: DEFAULT_MODEL.to_string(),
            api_key: Some("k".to_string()),
            api_base: Some("http://localhost:9000/v1".to_string()),
        };
        let config = args.config();
        assert_eq!(config.api_base, "http://localhost:9000/v1");
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_fetch_args_options() {
        let args = FetchArgs {
            user_agent: Some("Bot/1.0".to_string()),
            timeout: 5,
            retries: 2,
        };
        let options = args.options();
        assert_eq!(options.user_agent.as_deref(), Some("Bot/1.0"));
        assert_eq!(options.timeout, Duration::from_secs(5));
        assert_eq!(options.retries, 2);
    }

    #[test]
    fn test_load_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "SITEGRAB_TEST_DOTENV_KEY=from-file\nSITEGRAB_TEST_DOTENV_SET=from-file\n",
        )
        .unwrap();
        std::env::set_var("SITEGRAB_TEST_DOTENV_SET", "from-env");

        assert!(load_env_file(Some(&path)));
        assert_eq!(std::env::var("SITEGRAB_TEST_DOTENV_KEY").unwrap(), "from-file");
        assert_eq!(std::env::var("SITEGRAB_TEST_DOTENV_SET").unwrap(), "from-env");
    }

    #[test]
    fn test_load_env_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!load_env_file(Some(&dir.path().join("absent.env"))));
    }

    #[test]
    fn test_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.md");
        write_file(&path, "# One\n\n# Two").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# One\n\n# Two\n");
    }

    #[test]
    fn test_write_file_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.md");
        assert!(write_file(&path, "x").is_err());
    }
}

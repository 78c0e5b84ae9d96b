use clap::{Parser, Subcommand};
use quickdir::{config, fetch, generate, output, repository, sitemap, social};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "quickdir")]
#[command(about = "Static site generator for programmatic SEO directories")]
#[command(long_about = "\
Static site generator for programmatic SEO directories

One JSON repository of items becomes a static directory site: a page per
item, a page per category, an index, a sitemap. A daily post announces one
item on Mastodon.

Layout:

  site.toml                 # Site config (optional; env vars override it)
  data/database.json        # Item repository, rewritten by `fetch`
  src/                      # Assets copied into the build
  ├── css/  js/  images/
  ├── ads.txt
  └── robots.txt            # Optional; generated when absent
  dist/                     # Build output, emptied on every build

Typical schedule:

  quickdir fetch            # weekly: refresh the repository
  quickdir all              # build pages + sitemap
  quickdir post             # daily: announce one item

Run 'quickdir gen-config' to generate a documented site.toml.")]
#[command(version)]
struct Cli {
    /// Site config file
    #[arg(long, default_value = "site.toml", global = true)]
    config: PathBuf,

    /// Item repository (JSON array)
    #[arg(long, default_value = "data/database.json", global = true)]
    database: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Static assets directory
    #[arg(long, default_value = "src", global = true)]
    assets: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download the dataset and rewrite the repository
    Fetch,
    /// Render the HTML site from the repository
    Build,
    /// Write sitemap.xml and robots.txt for the built site
    Sitemap,
    /// Announce today's item on Mastodon
    Post,
    /// Build, then write the sitemap
    All,
    /// Validate config and repository without writing anything
    Check,
    /// Print a stock site.toml with all options documented
    GenConfig,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    init_logging(cli.verbose);
    let site_config = config::load_config(&cli.config)?;
    let today = chrono::Utc::now().date_naive();

    match cli.command {
        Command::Fetch => {
            println!("==> Fetching dataset");
            let outcome = fetch::fetch_and_save(&site_config, &cli.database)?;
            output::print_fetch_output(&outcome, &cli.database);
        }
        Command::Build => {
            build(&cli, &site_config, today)?;
        }
        Command::Sitemap => {
            sitemap_stage(&cli.output, &site_config, today)?;
        }
        Command::Post => {
            println!("==> Posting daily item");
            let items = match repository::load(&cli.database) {
                Ok(items) => items,
                Err(repository::RepositoryError::NotFound(path)) => {
                    log::warn!("Repository not found: {}", path.display());
                    Vec::new()
                }
                Err(e) => return Err(e.into()),
            };
            let post = social::post_daily(&items, &site_config, today);
            output::print_post_output(post.as_ref());
        }
        Command::All => {
            build(&cli, &site_config, today)?;
            sitemap_stage(&cli.output, &site_config, today)?;
            println!("==> Done: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.database.display());
            let items = repository::load(&cli.database)?;
            output::print_check_output(&items, &cli.database, &site_config.directory.item_noun);
            println!("==> Repository is valid");
        }
        // Printed before config loading.
        Command::GenConfig => {}
    }

    Ok(())
}

fn build(
    cli: &Cli,
    site_config: &config::SiteConfig,
    today: chrono::NaiveDate,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("==> Loading {}", cli.database.display());
    let items = repository::load(&cli.database)?;

    println!("==> Generating HTML \u{2192} {}", cli.output.display());
    let report = generate::generate(&items, site_config, today, &cli.output, &cli.assets)?;
    output::print_generate_output(&report, &site_config.directory.item_noun);
    Ok(())
}

fn sitemap_stage(
    output_dir: &Path,
    site_config: &config::SiteConfig,
    today: chrono::NaiveDate,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("==> Writing sitemap");
    let report = sitemap::generate_sitemap(output_dir, site_config, today)?;
    output::print_sitemap_output(report.as_ref());
    Ok(())
}

//! Tooldir command line.
//!
//! Loads a collection from a JSON seed file into an in-memory store and runs
//! the directory core against it.
//!
//! Usage:
//!   tooldir --seed apps.json browse --category PKM --sort top-rated
//!   tooldir --seed apps.json facets
//!   tooldir --seed apps.json submit --name Foo --description "..." --guest --write

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tooldir_cli::{render_entry, render_facets, render_view, save_seed, seeded_store, Submitter};
use tooldir_model::{catalog, Pricing};
use tooldir_query::{CategoryFilter, Criteria, PricingFilter, SortKey};
use tooldir_store::DEFAULT_COLLECTION;
use tooldir_submit::{SubmissionForm, SubmitError};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "tooldir")]
#[command(about = "Browse and submit tools in a Tooldir collection", version)]
struct Args {
    /// JSON seed file holding the collection
    #[arg(long, global = true)]
    seed: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List entries matching the filters
    Browse {
        /// Case-insensitive text matched against name, description and tags
        #[arg(long, default_value = "")]
        search: String,

        /// Category, or "All"
        #[arg(long, default_value = "All")]
        category: CategoryFilter,

        /// Pricing model, or "all"
        #[arg(long, default_value = "all")]
        pricing: PricingFilter,

        /// Required tag; repeat for several
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// newest, oldest, top-rated, most-reviewed, name-asc or name-desc
        #[arg(long, default_value = "newest")]
        sort: SortKey,
    },

    /// Show the categories and tags present in the collection
    Facets {
        /// How many of each to show
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Submit a new entry
    Submit {
        #[arg(long)]
        name: String,

        #[arg(long)]
        description: String,

        /// Website URL
        #[arg(long, default_value = "")]
        url: String,

        /// Note-taking, PKM, Task Management, Whiteboard, Writing, All-in-one
        /// or Other; any other value is accepted with a warning
        #[arg(long, default_value = catalog::DEFAULT_CATEGORY)]
        category: String,

        #[arg(long, default_value = "Free")]
        pricing: Pricing,

        /// Tag; repeat for several
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Continue as a guest
        #[arg(long, conflicts_with = "as_user")]
        guest: bool,

        /// Submit as a signed-in user with this display name
        #[arg(long = "as-user", value_name = "NAME")]
        as_user: Option<String>,

        /// Write the updated collection back to the seed file
        #[arg(long)]
        write: bool,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let store = seeded_store(args.seed.as_deref())?;

    match args.command {
        Command::Browse {
            search,
            category,
            pricing,
            tags,
            sort,
        } => {
            let mut criteria = Criteria::new()
                .with_search(search)
                .with_category(category)
                .with_pricing(pricing)
                .with_sort(sort);
            for tag in tags {
                criteria = criteria.with_tag(tag);
            }
            let view = tooldir_cli::browse(store, &criteria).await?;
            print!("{}", render_view(&view));
        }
        Command::Facets { limit } => {
            let facets = tooldir_cli::facets(store).await?;
            print!("{}", render_facets(&facets, limit));
        }
        Command::Submit {
            name,
            description,
            url,
            category,
            pricing,
            tags,
            guest,
            as_user,
            write,
        } => {
            if write && args.seed.is_none() {
                bail!("--write needs --seed");
            }

            if !category.trim().is_empty() && !catalog::is_listed_category(&category) {
                warn!("Category {category:?} is not one of the listed categories");
            }

            let mut form = SubmissionForm {
                name,
                description,
                website_url: url,
                category,
                pricing,
                ..SubmissionForm::default()
            };
            for tag in &tags {
                form.add_tag(tag);
            }

            let submitter = match (guest, as_user) {
                (_, Some(user)) => Submitter::User(user),
                (true, None) => Submitter::Guest,
                (false, None) => Submitter::Nobody,
            };

            let entry = match tooldir_cli::submit(store.clone(), &form, submitter).await {
                Ok(entry) => entry,
                Err(e) => {
                    if let Some(SubmitError::SessionRequired) = e.downcast_ref::<SubmitError>() {
                        bail!("{e}; pass --guest or --as-user NAME");
                    }
                    return Err(e);
                }
            };
            println!("Submitted {}", entry.id);
            print!("{}", render_entry(&entry));

            if let Some(path) = args.seed.as_deref().filter(|_| write) {
                save_seed(path, &store.documents(DEFAULT_COLLECTION))?;
                info!("Wrote collection back to {}", path.display());
            }
        }
    }

    Ok(())
}

mod cli;
mod error;

use crate::cli::{Cli, Command};
use crate::error::{Error, ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use shelf_catalog::{Database, Repository};
use shelf_config::Config;
use shelf_library::sync::sync_library;
use shelf_library::{Begin, Browser, Downloads, QaService, Reply, Searcher};
use shelf_llm::YandexGpt;
use shelf_storage::BackendHandle;
use shelf_storage::backend::LocalBackend;
use std::process::ExitCode;
use std::sync::Arc;
use time::{Date, OffsetDateTime};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:?}");
            eprintln!("{}", &*e);
            ExitCode::FAILURE
        },
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// Today in the local time zone, or UTC when the offset can't be determined.
fn today() -> Date {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc()).date()
}

/// Maps a service error to the message its category prescribes.
fn service_error(e: shelf_library::error::Error) -> Error {
    let message = e.category().text();
    e.raise(ErrorKind::Service(message))
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    let db = Database::open(&config.database).await.or_raise(|| ErrorKind::Catalog)?;
    let repo = Repository::from(&db);
    let result = dispatch(cli.command, &config, &db, repo).await;
    db.close().await;
    result
}

async fn dispatch(command: Command, config: &Config, db: &Database, repo: Repository) -> Result<()> {
    match command {
        Command::Sync => {
            let backend = open_library(config)?;
            let report = sync_library(&*backend, &repo, &config.storage.genres).await.map_err(service_error)?;
            println!("synced {} files, skipped {}", report.synced, report.skipped);
        },
        Command::Genres => {
            let browser = Browser::new(repo, &config.catalog);
            for genre in browser.genres().await.map_err(service_error)? {
                println!("{}\t{}", genre.id, genre.name);
            }
        },
        Command::Browse { genre_id, page } => {
            let browser = Browser::new(repo, &config.catalog);
            let page = browser.genre_page(genre_id, page).await.map_err(service_error)?;
            if page.books.is_empty() {
                println!("В этом жанре пока нет книг.");
                return Ok(());
            }
            for book in &page.books {
                println!("{}\t{book}", book.id);
            }
            println!("{}/{}", page.page, page.total_pages);
        },
        Command::Search { query, limit, min_score } => {
            let searcher = Searcher::new(repo, &config.search);
            let limit = limit.unwrap_or(config.search.limit);
            let min_score = min_score.unwrap_or(config.search.min_score);
            let books = searcher.rank(&query, limit, min_score).await.map_err(service_error)?;
            if books.is_empty() {
                println!("По запросу «{}» ничего не найдено.", query.trim());
            }
            for book in books {
                println!("{}\t{book}", book.id);
            }
        },
        Command::Files { book_id } => {
            let downloads = Downloads::new(repo, open_library(config)?);
            for file in downloads.files(book_id).await.map_err(service_error)? {
                println!("{}\t{}", file.format, file.path.display());
            }
        },
        Command::Locate { book_id, format } => {
            let downloads = Downloads::new(repo, open_library(config)?);
            let download = downloads.locate(book_id, &format).await.map_err(service_error)?;
            println!("{}\t{}\t{} bytes", download.book_name, download.location.display(), download.size);
        },
        Command::Ask { user, book_id, question } => {
            let completion = YandexGpt::new(&config.llm).or_raise(|| ErrorKind::Llm)?;
            let qa = QaService::new(db, &config.quota, &config.llm, Arc::new(completion));
            let today = today();
            if let Begin::LimitReached { .. } = qa.begin(user, book_id, today).await.map_err(service_error)? {
                println!("{}", shelf_library::MessageCategory::LimitReached.text());
                return Ok(());
            }
            match qa.answer(user, &question, today).await.map_err(service_error)? {
                Reply::Answered(answer) => {
                    println!("{}\n\n{}\n\n{}/{}", answer.book_name, answer.text, answer.used, answer.limit);
                },
                Reply::LimitReached { .. } => {
                    println!("{}", shelf_library::MessageCategory::LimitReached.text());
                },
            }
        },
        Command::Quota { user } => {
            let quota = shelf_catalog::QuotaRepository::new(db, &config.quota);
            let used = quota.count(user, today()).await.or_raise(|| ErrorKind::Catalog)?;
            println!("{used}/{}", quota.daily_limit());
        },
    }
    Ok(())
}

fn open_library(config: &Config) -> Result<BackendHandle> {
    let root = std::path::absolute(&config.storage.root).or_raise(|| ErrorKind::Storage)?;
    let backend = LocalBackend::new("library", root).or_raise(|| ErrorKind::Storage)?;
    Ok(Arc::new(backend))
}

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use corpusdb::indexing::{create_document, delete_document, inverted_index, update_document};
use corpusdb::{DocId, Error, Store};
use serde::Deserialize;
use time::macros::format_description;
use time::Date;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct InputDoc {
    id: u64,
    title: String,
    text: String,
    /// Date as `YYYY-MM-DD`.
    date: String,
    category: String,
}

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Manage a categorized document corpus and its inverted index", long_about = None)]
struct Cli {
    /// Store directory
    #[arg(long, global = true, default_value = "./index")]
    store: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a category
    Category {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        name: String,
    },
    /// List categories
    Categories,
    /// Index a single document
    Add {
        #[arg(long)]
        id: DocId,
        #[arg(long)]
        title: String,
        /// Document date, YYYY-MM-DD
        #[arg(long)]
        date: String,
        #[arg(long)]
        category: String,
        /// Document body given inline
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,
        /// Read the document body from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Re-index a document under the same id
    Update {
        #[arg(long)]
        id: DocId,
        #[arg(long)]
        title: String,
        /// Document date, YYYY-MM-DD
        #[arg(long)]
        date: String,
        #[arg(long)]
        category: String,
        /// Document body given inline
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,
        /// Read the document body from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Delete a document
    Delete {
        #[arg(long)]
        id: DocId,
    },
    /// Ingest documents from JSON/JSONL files or a directory
    Load {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
    },
    /// Print the inverted index
    Index,
    /// Show a stored document as JSON
    Show {
        #[arg(long)]
        id: DocId,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let store = Store::open(&cli.store)?;

    match cli.command {
        Commands::Category { id, name } => {
            store.create_category(id, &name)?;
            tracing::info!(id, name = %name, "category created");
        }
        Commands::Categories => {
            for category in store.categories()? {
                println!("{}\t{}", category.id, category.name);
            }
        }
        Commands::Add {
            id,
            title,
            date,
            category,
            text,
            file,
        } => {
            let body = read_body(text, file)?;
            index_one(&store, id, &body, &title, &date, &category, false)?;
        }
        Commands::Update {
            id,
            title,
            date,
            category,
            text,
            file,
        } => {
            let body = read_body(text, file)?;
            index_one(&store, id, &body, &title, &date, &category, true)?;
        }
        Commands::Delete { id } => {
            delete_document(&store, id)?;
            tracing::info!(doc_id = id, "document deleted");
        }
        Commands::Load { input } => {
            load(&store, &input)?;
        }
        Commands::Index => {
            let index = inverted_index(&store)?;
            let mut terms: Vec<_> = index.iter().collect();
            terms.sort_by(|a, b| a.0.cmp(b.0));
            for (term, documents) in terms {
                println!("{term}: {documents}");
            }
        }
        Commands::Show { id } => match store.document(id)? {
            Some(doc) => println!("{}", serde_json::to_string_pretty(&doc)?),
            None => tracing::warn!(doc_id = id, "document not found"),
        },
    }

    store.flush()?;
    Ok(())
}

fn read_body(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    match (text, file) {
        (Some(text), None) => Ok(text),
        (None, Some(path)) => {
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))
        }
        _ => bail!("provide the document body with --text or --file"),
    }
}

fn parse_date(date: &str) -> Result<Date> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(date, format).with_context(|| format!("invalid date \"{date}\", expected YYYY-MM-DD"))
}

fn index_one(
    store: &Store,
    id: DocId,
    body: &str,
    title: &str,
    date: &str,
    category: &str,
    replace: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let result = if replace {
        update_document(store, id, body, title, date, category)
    } else {
        create_document(store, id, body, title, date, category)
    };
    match result {
        Ok(()) => {
            tracing::info!(doc_id = id, "document indexed");
            Ok(())
        }
        Err(Error::CategoryNotFound(name)) => {
            tracing::warn!(doc_id = id, category = %name, "unknown category, document skipped");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn load(store: &Store, input: &str) -> Result<()> {
    let input_path = Path::new(input);
    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    }

    let mut ingested = 0usize;
    let mut skipped = 0usize;
    for file in files {
        let docs = if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(&file)?
        } else {
            read_json(&file)?
        };
        for doc in docs {
            if ingest_doc(store, doc)? {
                ingested += 1;
            } else {
                skipped += 1;
            }
        }
    }

    tracing::info!(ingested, skipped, "load complete");
    Ok(())
}

fn read_jsonl(file: &Path) -> Result<Vec<InputDoc>> {
    let f = fs::File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let reader = BufReader::new(f);
    let mut docs = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        docs.push(serde_json::from_str(&line)?);
    }
    Ok(docs)
}

fn read_json(file: &Path) -> Result<Vec<InputDoc>> {
    let f = fs::File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let reader = BufReader::new(f);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    let docs = match json {
        serde_json::Value::Array(arr) => arr
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<InputDoc>, _>>()?,
        other => vec![serde_json::from_value(other)?],
    };
    Ok(docs)
}

/// Index one ingested record; reports false when the record was skipped
/// because its category does not exist.
fn ingest_doc(store: &Store, doc: InputDoc) -> Result<bool> {
    let date = parse_date(&doc.date)?;
    match create_document(store, doc.id, &doc.text, &doc.title, date, &doc.category) {
        Ok(()) => Ok(true),
        Err(Error::CategoryNotFound(name)) => {
            tracing::warn!(doc_id = doc.id, category = %name, "unknown category, document skipped");
            Ok(false)
        }
        Err(err) => Err(err.into()),
    }
}

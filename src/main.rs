use std::env;

use clap::Parser;
use simple_log::LogConfigBuilder;
use simple_log::{error, info};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tower_lsp::{LspService, Server};
use trie_dict::dict_lsp::backend::Backend;
use trie_dict::dictionary::{prepare_dictionary, LoadOptions};
use trie_dict::trie::{Trie, DEFAULT_MAX_SUGGESTIONS};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct DictArgs {
    /// Dictionary file or glob pattern, one word per line.
    #[arg(long, default_value = "./dictionary.txt")]
    dictionary: String,
    /// Search for a word, print the result and exit. May be repeated.
    #[arg(long)]
    query: Vec<String>,
    /// Read queries from stdin, one per line.
    #[arg(long)]
    interactive: bool,
    #[arg(long, default_value_t = DEFAULT_MAX_SUGGESTIONS)]
    max_suggestions: usize,
    /// Lowercase dictionary entries before inserting them.
    #[arg(long)]
    lowercase_entries: bool,
    #[arg(long)]
    debug: bool,
}

impl DictArgs {
    fn serves_lsp(&self) -> bool {
        self.query.is_empty() && !self.interactive
    }
}

fn setup_debug_logging() {
    let mut temp_dir = env::temp_dir();
    temp_dir.push("trie-dict.log");
    if let Some(log_path) = temp_dir.to_str() {
        let config = LogConfigBuilder::builder().path(log_path).build();
        if let Err(_e) = simple_log::new(config) {
            error!("fail to setup log {}", log_path);
        }
    }
}

/// CLI modes print results on stdout, so diagnostics go to stderr.
fn setup_console_logging() {
    let result = env_logger::Builder::new()
        .parse_filters("info")
        .parse_env("RUST_LOG")
        .target(env_logger::Target::Stderr)
        .try_init();
    if let Err(_e) = result {
        eprintln!("fail to setup console log");
    }
}

fn render(lines: &[String]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}

fn query_output(trie: &Trie, queries: &[String], max_suggestions: usize) -> String {
    queries
        .iter()
        .map(|query| render(&trie.search_with_limit(query, max_suggestions)))
        .collect()
}

async fn run_interactive<R, W>(
    input: R,
    output: &mut W,
    trie: &Trie,
    max_suggestions: usize,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(input).lines();
    while let Some(query) = lines.next_line().await? {
        let results = trie.search_with_limit(&query, max_suggestions);
        output.write_all(render(&results).as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = DictArgs::parse();

    if args.debug {
        setup_debug_logging();
    } else if !args.serves_lsp() {
        setup_console_logging();
    }

    let mut trie = Trie::new();
    let options = LoadOptions {
        lowercase_entries: args.lowercase_entries,
    };
    prepare_dictionary(&args.dictionary, &mut trie, options);

    if !args.query.is_empty() {
        print!("{}", query_output(&trie, &args.query, args.max_suggestions));
        return;
    }

    if args.interactive {
        let mut stdout = tokio::io::stdout();
        let result = run_interactive(tokio::io::stdin(), &mut stdout, &trie, args.max_suggestions).await;
        if let Err(e) = result {
            error!("{}", e);
            std::process::exit(1);
        }
        return;
    }

    info!("serving {} over stdio", args.dictionary);
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();
    let (service, socket) = LspService::new(|_| Backend::new(trie, args.max_suggestions));
    Server::new(stdin, stdout, socket).serve(service).await;
}

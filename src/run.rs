//! Application run modes: logger init, one-shot commands, interactive session.

use std::io::{self, Write};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::cli::Args;
use crate::core;
use crate::core::apply::apply_suggestion;
use crate::core::config::Config;
use crate::core::debounce::Debouncer;
use crate::core::engine::{Analysis, Analyzer};
use crate::core::matcher::Suggestion;
use crate::core::score::BiasAssessment;
use crate::core::session::Session;
use crate::core::terms::{self, GenderedTermTable};
use crate::core::text;

type RunResult = Result<(), Box<dyn std::error::Error>>;

/// Initialize env_logger. In interactive mode, writes to a file so logs don't interleave with output.
pub fn init_logger(args: &Args) {
    let log_level = args.log_level();
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level));

    if args.is_interactive() {
        let log_path = core::paths::cache_dir().map(|d| d.join(format!("{}.log", core::app::NAME)));
        if let Some(path) = log_path
            && path.parent().is_some_and(|dir| std::fs::create_dir_all(dir).is_ok())
            && let Ok(file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
        {
            logger.target(env_logger::Target::Pipe(Box::new(file)));
        }
    }
    let _ = logger.try_init();
}

/// Environment config with CLI overrides applied.
pub fn load_config(args: &Args) -> Result<Config, core::config::ConfigError> {
    let mut config = core::config::load()?;
    if let Some(strategy) = args.strategy {
        config.strategy = strategy;
    }
    if let Some(semantic) = args.semantic {
        config.semantic = semantic;
    }
    if let Some(model) = &args.model {
        config.model_id = model.clone();
    }
    Ok(config)
}

/// Text argument, or stdin when omitted or `-`.
fn read_text(arg: Option<&str>) -> io::Result<String> {
    match arg {
        Some(t) if t != "-" => Ok(t.to_string()),
        _ => {
            let input = io::read_to_string(io::stdin())?;
            Ok(input.trim_end_matches(['\n', '\r']).to_string())
        }
    }
}

fn build_analyzer(config: &Config) -> Result<Analyzer, core::config::ConfigError> {
    Analyzer::from_config(config, terms::active())
}

/// Human-readable assessment: verdict line, score, then numbered suggestions.
pub fn format_assessment(assessment: &BiasAssessment) -> String {
    let mut out = String::new();
    if assessment.bias_detected() {
        out.push_str("Gender-biased language detected\n");
    } else {
        out.push_str("No gender bias detected\n");
    }
    out.push_str(&format!(
        "Bias score: {:.2} ({})\n",
        assessment.score, assessment.explanation
    ));
    if let Some(semantic) = assessment.semantic_score {
        out.push_str(&format!("Semantic score: {:.2}\n", semantic));
    }
    if assessment.degraded {
        out.push_str(
            "Note: part of the analysis was unavailable; results use the term table only\n",
        );
    }
    if !assessment.suggestions.is_empty() {
        out.push_str("Suggested replacements:\n");
        for (i, s) in assessment.suggestions.iter().enumerate() {
            out.push_str(&format!(
                "  [{}] Replace \"{}\" with \"{}\" (word {})\n",
                i,
                s.original,
                s.replacement,
                s.position + 1
            ));
        }
    }
    out
}

/// `analyze`: one assessment, printed as text or JSON.
pub async fn run_analyze(config: &Config, text: Option<&str>, json: bool) -> RunResult {
    let text = read_text(text)?;
    let analyzer = build_analyzer(config)?;
    let assessment = analyzer.analyze(&text).await;
    if json {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
    } else {
        print!("{}", format_assessment(&assessment));
    }
    Ok(())
}

/// `apply`: rewrite one token. Without `--original` the word currently at the position is used.
pub fn run_apply(
    text: Option<&str>,
    position: usize,
    replacement: &str,
    original: Option<&str>,
) -> RunResult {
    let text = read_text(text)?;
    let original = match original {
        Some(o) => o.to_string(),
        None => text::tokenize(&text)
            .get(position)
            .map(|t| text::normalize_token(t))
            .unwrap_or_default(),
    };
    let suggestion = Suggestion {
        original,
        replacement: replacement.to_string(),
        position,
    };
    let revised = apply_suggestion(&text, &suggestion)?;
    println!("{}", revised);
    Ok(())
}

/// `terms`: list the active table, optionally filtered.
pub fn run_terms(table: &GenderedTermTable, query: Option<&str>) {
    let q = query.unwrap_or("").to_lowercase();
    for e in table.entries() {
        if q.is_empty() || e.term.contains(&q) || e.replacement.to_lowercase().contains(&q) {
            println!("{:<16} -> {}", e.term, e.replacement);
        }
    }
}

/// `set-key`: read the key from stdin and store it with restrictive permissions.
pub fn run_set_key() -> RunResult {
    if io::IsTerminal::is_terminal(&io::stdin()) {
        eprint!("API key: ");
        let _ = io::stderr().flush();
    }
    let mut key = String::new();
    io::stdin().read_line(&mut key)?;
    let path = core::api_key::store_api_key(&key)?;
    println!("API key stored in {}", path.display());
    Ok(())
}

/// `config`: paths, model, strategy, and key status.
pub fn run_show_config(config: &Config) {
    let dir = core::paths::config_dir()
        .map(|d| d.display().to_string())
        .unwrap_or_else(|| "(unavailable)".to_string());
    println!("{} {}", core::app::NAME, core::app::VERSION);
    println!("Config dir:  {}", dir);
    println!(
        "Terms file:  {}",
        terms::user_terms_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(unavailable)".to_string())
    );
    println!("Base URL:    {}", config.base_url);
    println!("Model:       {}", config.model_id);
    println!("Strategy:    {:?}", config.strategy);
    println!("Semantic:    {:?}", config.semantic);
    println!("Debounce:    {} ms", config.debounce.as_millis());
    println!(
        "API key:     {}",
        if config.api_key().is_some() { "set" } else { "not set" }
    );
    if let Some(path) = terms::user_terms_path()
        && let Err(e) = terms::load_table(Some(&path))
    {
        println!("Warning:     {}", e.safe_mode_message());
    }
}

/// One line of interactive input.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Text(String),
    Apply(usize),
    Quit,
    Invalid(String),
}

fn parse_input(line: &str) -> Input {
    let trimmed = line.trim();
    if let Some(rest) = trimmed.strip_prefix(":apply") {
        return match rest.trim().parse() {
            Ok(i) => Input::Apply(i),
            Err(_) => Input::Invalid(format!("usage: :apply N (got '{}')", rest.trim())),
        };
    }
    if trimmed == ":quit" || trimmed == ":q" {
        return Input::Quit;
    }
    Input::Text(line.to_string())
}

/// Issue the ticket before spawning so request order, not task scheduling, decides the winner.
fn spawn_analysis(analyzer: &Arc<Analyzer>, text: String, results: &mpsc::Sender<Analysis>) {
    let ticket = analyzer.tracker().issue();
    let analyzer = Arc::clone(analyzer);
    let results = results.clone();
    tokio::spawn(async move {
        if let Some(analysis) = analyzer.analyze_ticket(&ticket, &text).await {
            let _ = results.send(analysis).await;
        }
    });
}

fn show_accepted(session: &Session) {
    if let Some(assessment) = session.assessment() {
        print!("{}", format_assessment(assessment));
        let _ = io::stdout().flush();
    }
}

/// `watch`: each stdin line replaces the text; analysis runs once input has been quiet
/// for the debounce period. Only the newest analysis is shown.
pub async fn run_watch(config: &Config) -> RunResult {
    let analyzer = Arc::new(build_analyzer(config)?);
    let mut session = Session::new();
    let mut debouncer = Debouncer::new(config.debounce);
    let (results_tx, mut results_rx) = mpsc::channel::<Analysis>(16);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    eprintln!("Type text to analyze. `:apply N` applies suggestion N, `:quit` exits.");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line) {
                    Input::Text(text) => debouncer.push(text),
                    Input::Apply(index) => {
                        if let Some(text) = debouncer.take() {
                            session.set_text(text);
                        }
                        match session.apply(index) {
                            Ok(revised) => {
                                println!("Revised: {}", revised);
                                spawn_analysis(&analyzer, revised.to_string(), &results_tx);
                            }
                            Err(e) => eprintln!("Error: {}", e),
                        }
                    }
                    Input::Quit => break,
                    Input::Invalid(msg) => eprintln!("Error: {}", msg),
                }
            }
            text = debouncer.settled() => {
                session.set_text(text.clone());
                spawn_analysis(&analyzer, text, &results_tx);
            }
            Some(analysis) = results_rx.recv() => {
                if session.accept(analysis) {
                    show_accepted(&session);
                }
            }
        }
    }

    // Flush: analyze whatever text is current if its assessment hasn't been shown yet.
    if let Some(text) = debouncer.take() {
        session.set_text(text);
    }
    if session.assessment().is_none()
        && !session.text().trim().is_empty()
        && let Some(analysis) = analyzer.analyze_latest(session.text()).await
        && session.accept(analysis)
    {
        show_accepted(&session);
    }
    Ok(())
}

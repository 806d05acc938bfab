use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ai_client::{Gemini, OpenAi, StructuredAgent};
use pulse_common::{AiProvider, Category, Config, ProblemId};
use pulse_core::attachments::PreviewRegistry;
use pulse_core::feed::{critical_count, filter_sort};
use pulse_core::radar;
use pulse_core::seed::demo_profile;
use pulse_core::workspace::Analysis;
use pulse_core::{
    CategoryFilter, FeedQuery, ProblemAnalyst, ProblemStore, SortMode, SubmissionWorkspace,
};

#[derive(Parser)]
#[command(name = "pulse", about = "Spot, analyse and track community problems")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List problems, filtered and sorted
    Feed(FeedArgs),
    /// Print radar placement for the filtered list as JSON
    Radar(FeedArgs),
    /// Analyse a new report and publish it
    Report(ReportArgs),
    /// Evaluate a solution and attach it to a problem
    Solve {
        /// Problem id or title fragment
        problem: String,
        /// Solution text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Suggest solution ideas for a problem
    Ideas {
        /// Problem id or title fragment
        problem: String,
    },
}

#[derive(Args)]
struct FeedArgs {
    #[arg(long, default_value = "All")]
    category: CategoryFilter,
    #[arg(long, default_value = "")]
    query: String,
    /// urgency, impact or newest
    #[arg(long, default_value = "urgency")]
    sort: SortMode,
}

impl FeedArgs {
    fn query(&self) -> FeedQuery {
        FeedQuery::new(self.category, self.query.clone(), self.sort)
    }
}

#[derive(Args)]
struct ReportArgs {
    #[arg(long)]
    category: Category,
    /// YYYY-MM-DD, defaults to today
    #[arg(long)]
    date: Option<String>,
    /// Image or PDF evidence; repeatable
    #[arg(long = "attach")]
    attachments: Vec<PathBuf>,
    #[arg(required = true, num_args = 1..)]
    description: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let store = ProblemStore::seeded().shared();

    match cli.command {
        Command::Feed(args) => {
            let store = store.read().await;
            let list = filter_sort(store.records(), &args.query());
            for p in &list {
                let crisis = if p.is_crisis() { "CRISIS" } else { "" };
                println!(
                    "{:<8} urgency {:>5.1} {:<6} impact {:>5.1}  {:<13} {:<11} {}  [{}]",
                    p.severity,
                    p.urgency(),
                    crisis,
                    p.impact_score,
                    p.category,
                    p.lifecycle,
                    p.title,
                    p.id
                );
            }
            let crises = list.iter().filter(|p| p.is_crisis()).count();
            println!(
                "{} problems, {} critical, {} in crisis",
                list.len(),
                critical_count(list.iter().copied()),
                crises
            );
        }
        Command::Radar(args) => {
            let store = store.read().await;
            let points = radar::place(filter_sort(store.records(), &args.query()));
            println!("{}", serde_json::to_string_pretty(&points)?);
        }
        Command::Report(args) => {
            let analyst = ProblemAnalyst::new(agent_from_env()?);
            let registry = PreviewRegistry::new();
            let ws = SubmissionWorkspace::report(registry).with_contributor(demo_profile().name);

            ws.set_category(args.category);
            if let Some(date) = args.date {
                ws.set_date(date);
            }
            ws.set_description(args.description.join(" "));
            for path in &args.attachments {
                let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
                let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
                ws.attach(name, "", bytes)?;
            }

            if let Analysis::Draft(draft) = ws.analyze(&analyst).await? {
                if draft.is_empty() {
                    bail!("No analysis available from the AI service; nothing was published");
                }
            }

            let mut store = store.write().await;
            let id = ws.publish(&mut store)?;
            println!("{}", serde_json::to_string_pretty(&store.get(id))?);
        }
        Command::Solve { problem, text } => {
            let analyst = ProblemAnalyst::new(agent_from_env()?);
            // Read lock only while the workspace snapshots the problem; the
            // AI call runs with the store unlocked.
            let (id, ws) = {
                let store = store.read().await;
                let id = find_problem(&store, &problem)?;
                (id, SubmissionWorkspace::open(&store, Some(id), PreviewRegistry::new()))
            };
            ws.set_description(text.join(" "));

            match ws.analyze(&analyst).await? {
                Analysis::Evaluation(Some(evaluation)) => {
                    println!("{}", serde_json::to_string_pretty(&evaluation)?)
                }
                _ => println!("No evaluation available"),
            }

            let mut store = store.write().await;
            ws.publish(&mut store)?;
            if let Some(p) = store.get(id) {
                info!(problem_id = %id, lifecycle = %p.lifecycle, upvotes = p.upvotes, "Solution recorded");
                println!("{} is now {} with {} upvotes", p.title, p.lifecycle, p.upvotes);
            }
        }
        Command::Ideas { problem } => {
            let analyst = ProblemAnalyst::new(agent_from_env()?);
            let store = store.read().await;
            let id = find_problem(&store, &problem)?;
            if let Some(p) = store.get(id) {
                for idea in analyst.generate_solutions(p).await {
                    println!("- {idea}");
                }
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pulse=info,ai_client=info"));
    let json = std::env::var("PULSE_LOG_JSON").is_ok_and(|v| v == "1");

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn agent_from_env() -> Result<Arc<dyn StructuredAgent>> {
    let config = Config::from_env()?;
    config.log_redacted();

    let agent: Arc<dyn StructuredAgent> = match config.ai_provider {
        AiProvider::Gemini => {
            let mut gemini = Gemini::new(&config.ai_api_key, &config.ai_model).with_timeout(config.ai_timeout);
            if let Some(url) = &config.ai_base_url {
                gemini = gemini.with_base_url(url);
            }
            Arc::new(gemini)
        }
        AiProvider::OpenAi => {
            let mut openai = OpenAi::new(&config.ai_api_key, &config.ai_model).with_timeout(config.ai_timeout);
            if let Some(url) = &config.ai_base_url {
                openai = openai.with_base_url(url);
            }
            Arc::new(openai)
        }
    };
    Ok(agent)
}

/// Resolve an id, or else the first title containing the fragment.
fn find_problem(store: &ProblemStore, target: &str) -> Result<ProblemId> {
    if let Ok(id) = target.parse::<ProblemId>() {
        if store.get(id).is_some() {
            return Ok(id);
        }
    }

    let needle = target.to_lowercase();
    store
        .records()
        .iter()
        .find(|p| p.title.to_lowercase().contains(&needle))
        .map(|p| p.id)
        .with_context(|| format!("No problem matches '{target}'"))
}

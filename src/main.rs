use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hearth::config::HearthConfig;
use hearth::{FamilyMemberDraft, MemoryEngine, Message, DEFAULT_MEMBER_ID};

#[derive(Parser)]
#[command(name = "hearth", version, about = "Per-persona memory engine for AI family assistants")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage family members
    Members {
        #[command(subcommand)]
        action: MemberAction,
    },
    /// Record a user message into memory
    Add {
        /// Message text
        text: String,
        #[arg(long)]
        user: Option<String>,
        #[arg(long, default_value = DEFAULT_MEMBER_ID)]
        member: String,
    },
    /// Search stored memories
    Search {
        query: String,
        #[arg(long)]
        user: Option<String>,
        #[arg(long, default_value = DEFAULT_MEMBER_ID)]
        member: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Ask a question, personalized by stored memories
    Ask {
        prompt: String,
        #[arg(long)]
        user: Option<String>,
        #[arg(long, default_value = DEFAULT_MEMBER_ID)]
        member: String,
    },
    /// Clear a user's raw log and one or all vector stores
    Clear {
        #[arg(long)]
        user: Option<String>,
        /// Clear only this member's vector store; omit to clear all
        #[arg(long)]
        member: Option<String>,
    },
    /// Probe the generation provider's model list
    Check,
}

#[derive(Subcommand)]
enum MemberAction {
    /// List all family members
    List,
    /// Show one family member
    Show { id: String },
    /// Create a family member
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "Assistant")]
        role: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Delete a family member (the default member is protected)
    Remove { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = HearthConfig::load()?;

    let filter = EnvFilter::try_new(&config.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut engine = MemoryEngine::from_config(&config)?;
    engine.init()?;

    let default_user = config.storage.default_user.clone();
    let user_of = |user: Option<String>| user.unwrap_or_else(|| default_user.clone());

    match cli.command {
        Command::Members { action } => match action {
            MemberAction::List => {
                for member in engine.family_members() {
                    println!("{}  {} ({})", member.id, member.name, member.role);
                }
            }
            MemberAction::Show { id } => match engine.family_member(&id) {
                Some(member) => {
                    println!("id:            {}", member.id);
                    println!("name:          {}", member.name);
                    println!("role:          {}", member.role);
                    println!("description:   {}", member.description);
                    println!("created:       {}", member.created_at);
                    println!("last accessed: {}", member.last_accessed);
                }
                None => anyhow::bail!("no family member with id {id}"),
            },
            MemberAction::Add {
                name,
                role,
                description,
            } => {
                let member = engine.add_family_member(FamilyMemberDraft {
                    name: Some(name),
                    role: Some(role),
                    description: Some(description),
                });
                println!("created {} ({})", member.id, member.name);
            }
            MemberAction::Remove { id } => {
                if engine.delete_family_member(&id) {
                    println!("deleted {id}");
                } else {
                    anyhow::bail!("cannot delete {id}: unknown id or protected default member");
                }
            }
        },
        Command::Add { text, user, member } => {
            engine.add(&[Message::user(text)], &user_of(user), &member);
            println!("recorded");
        }
        Command::Search {
            query,
            user,
            member,
            limit,
        } => {
            let limit = limit.unwrap_or(config.retrieval.default_limit);
            let response = engine.search(&query, &user_of(user), limit, &member);
            if response.results.is_empty() {
                println!("no matches");
            }
            for hit in response.results {
                println!("[{:.2}] {}  ({})", hit.relevance, hit.memory, hit.timestamp);
            }
        }
        Command::Ask {
            prompt,
            user,
            member,
        } => {
            let reply = engine
                .generate_with_memory(&prompt, &user_of(user), &member)
                .await?;
            println!("{reply}");
        }
        Command::Clear { user, member } => {
            engine.clear_memories(&user_of(user), member.as_deref());
            println!("cleared");
        }
        Command::Check => {
            engine.test_connection().await?;
            match engine.working_model() {
                Some(model) => println!("connection verified; working model: {model}"),
                None => println!("connection verified"),
            }
        }
    }

    Ok(())
}

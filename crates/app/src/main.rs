use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand, ValueEnum};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use career_core::exams::{self, ExamFilter, ExamLevel};
use career_core::model::{TaskId, UserId};
use services::{
    AiBackendConfig, AppConfig, AppServices, Clock, GoalFitRun, LoadState, QuizFlowError,
    RoadmapError, SprintError, StepOutcome, UserSession,
};

mod render;

#[derive(Parser, Debug)]
#[command(name = "career", version, about = "Career discovery, roadmaps and sprint checklists")]
struct Cli {
    #[arg(long = "log-level", value_name = "LEVEL", env = "CAREER_LOG", default_value = "warn")]
    log_level: String,
    /// Guidance backend base URL; overrides CAREER_AI_BASE_URL.
    #[arg(long = "ai-url", value_name = "URL")]
    ai_url: Option<String>,
    /// Request timeout in seconds; overrides CAREER_AI_TIMEOUT_SECS.
    #[arg(long = "timeout", value_name = "SECS")]
    timeout_secs: Option<u64>,
    /// SQLite URL; overrides CAREER_DB_URL.
    #[arg(long = "db", value_name = "URL")]
    db_url: Option<String>,
    /// Signed-in user; overrides CAREER_USER_ID. Without one nothing is saved.
    #[arg(long = "user", value_name = "ID")]
    user_id: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Take the behavioral discovery quiz.
    Discover,
    /// Check how well a goal stream fits you.
    Goal {
        #[arg(long)]
        stream: Option<String>,
    },
    /// Generate a roadmap for one of your suggested streams.
    Roadmap {
        #[arg(long)]
        stream: Option<String>,
    },
    /// Generate a 12-week sprint from your latest roadmap.
    Sprint,
    /// Show the stored sprint checklist.
    Tasks,
    /// Flip one checklist task.
    Toggle { task_id: String },
    /// Show everything stored for the user.
    Dashboard,
    /// Ping the guidance backend.
    Health,
    /// Browse competitive entrance exams, or the exams common in one state.
    Exams {
        /// Matches exam name or stream, ignoring case.
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        stream: Option<String>,
        #[arg(long, value_enum)]
        level: Option<LevelArg>,
        /// State code or name (e.g. `KA`, `Tamil Nadu`, `national`).
        #[arg(long, conflicts_with_all = ["search", "stream", "level"])]
        state: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LevelArg {
    National,
    State,
}

impl From<LevelArg> for ExamLevel {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::National => Self::National,
            LevelArg::State => Self::State,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    // The exam directory is built in and needs neither storage nor backend.
    if let Command::Exams {
        search,
        stream,
        level,
        state,
    } = &args.command
    {
        return exam_directory(search.clone(), stream.clone(), *level, state.as_deref());
    }

    let config = load_config(&args)?;
    let user = config
        .user_id
        .clone()
        .map_or_else(UserSession::anonymous, UserSession::signed_in);
    info!(
        db_url = %config.db_url,
        ai_url = %config.ai.base_url,
        signed_in = user.is_signed_in(),
        "starting career"
    );

    let services = AppServices::new_sqlite(&config, Clock::system())
        .await
        .context("initialize services")?;
    let theme = ColorfulTheme::default();

    match args.command {
        Command::Discover => discover(&services, &user, &theme).await,
        Command::Goal { stream } => goal_fit(&services, stream, &theme).await,
        Command::Roadmap { stream } => roadmap(&services, &user, stream, &theme).await,
        Command::Sprint => sprint(&services, &user).await,
        Command::Tasks => tasks(&services, &user).await,
        Command::Toggle { task_id } => toggle(&services, &user, TaskId::new(task_id)).await,
        Command::Dashboard => dashboard(&services, &user).await,
        Command::Health => health(&services).await,
        Command::Exams {
            search,
            stream,
            level,
            state,
        } => exam_directory(search, stream, level, state.as_deref()),
    }
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

fn load_config(args: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::from_env().context("read CAREER_* environment")?;

    let timeout = args
        .timeout_secs
        .map(Duration::from_secs)
        .or(config.ai.timeout);
    if let Some(url) = &args.ai_url {
        config.ai = AiBackendConfig::new(url, timeout).context("invalid --ai-url")?;
    } else {
        config.ai.timeout = timeout;
    }
    if let Some(db_url) = &args.db_url {
        config.db_url.clone_from(db_url);
    }
    if let Some(user) = args.user_id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
        config.user_id = Some(UserId::new(user));
    }
    Ok(config)
}

fn require_sign_in(user: &UserSession) -> Result<()> {
    if !user.is_signed_in() {
        bail!("this command needs a user; pass --user or set CAREER_USER_ID");
    }
    Ok(())
}

//
// ─── QUIZZES ───────────────────────────────────────────────────────────────────
//

async fn discover(services: &AppServices, user: &UserSession, theme: &ColorfulTheme) -> Result<()> {
    let flow = services.discover();
    let mut run = flow.start()?;

    while run.result().is_none() {
        let step = run.session().cursor();
        let progress = run.session().progress();
        let question = run
            .session()
            .questions()
            .get(step)
            .context("quiz cursor out of range")?
            .clone();

        let mut items: Vec<String> = question.choices().iter().map(|c| c.label.clone()).collect();
        let other = items.len();
        items.push("Something else (type it)".to_string());
        if step > 0 {
            items.push("Back".to_string());
        }
        let default = run
            .session()
            .answer(step)
            .and_then(|value| question.choices().iter().position(|c| c.value == value))
            .unwrap_or(0);

        let picked = Select::with_theme(theme)
            .with_prompt(format!(
                "[{}/{}] {}",
                progress.position,
                progress.total,
                question.prompt()
            ))
            .items(&items)
            .default(default)
            .interact()?;

        if picked > other {
            run.retreat()?;
            continue;
        }
        if picked == other {
            let text: String = Input::with_theme(theme)
                .with_prompt("Your answer")
                .allow_empty(true)
                .interact_text()?;
            run.set_free_text(text);
        } else {
            run.select_answer(step, question.choices()[picked].value.clone())?;
        }

        match flow.advance(&mut run, user).await {
            Ok(outcome) => debug!(?outcome, "discovery step"),
            Err(QuizFlowError::Blocked(blocked)) => eprintln!("{blocked}"),
            Err(QuizFlowError::Backend(err)) => {
                if !retry_after_failure(&run, theme)? {
                    return Err(err).context("discovery submission failed");
                }
            }
            Err(err) => return Err(err.into()),
        }
    }

    if let Some(profile) = run.result() {
        render::profile(profile);
    }
    if !user.is_signed_in() {
        println!("\nNot signed in: this result was not saved.");
    }
    Ok(())
}

fn retry_after_failure<R>(run: &services::QuizRun<R>, theme: &ColorfulTheme) -> Result<bool> {
    if let Some(message) = run.error_message() {
        eprintln!("{message}");
    }
    Ok(Confirm::with_theme(theme)
        .with_prompt("Your answers are kept. Try again?")
        .default(true)
        .interact()?)
}

async fn goal_fit(
    services: &AppServices,
    stream: Option<String>,
    theme: &ColorfulTheme,
) -> Result<()> {
    let flow = services.goal_fit();
    let stream_id = match stream {
        Some(id) => id,
        None => {
            let streams = flow.streams()?;
            let labels: Vec<String> = streams
                .iter()
                .map(|s| format!("{}: {}", s.title(), s.description))
                .collect();
            let picked = Select::with_theme(theme)
                .with_prompt("Which stream do you want to check?")
                .items(&labels)
                .default(0)
                .interact()?;
            streams[picked].id.to_string()
        }
    };
    let mut run: GoalFitRun = flow.start(&stream_id)?;

    while run.result().is_none() {
        let step = run.session().cursor();
        let progress = run.session().progress();
        let question = run
            .session()
            .questions()
            .get(step)
            .context("quiz cursor out of range")?
            .clone();

        let mut items: Vec<String> = question.choices().iter().map(|c| c.label.clone()).collect();
        if step > 0 {
            items.push("Back".to_string());
        }
        let picked = Select::with_theme(theme)
            .with_prompt(format!(
                "[{}/{}] {}",
                progress.position,
                progress.total,
                question.prompt()
            ))
            .items(&items)
            .default(0)
            .interact()?;

        let Some(choice) = question.choices().get(picked) else {
            run.retreat()?;
            continue;
        };
        match flow.choose(&mut run, &choice.value).await {
            Ok(StepOutcome::Selected) => {
                // Auto-advance is off in a custom config; move on explicitly.
                if let Err(err) = flow.advance(&mut run).await {
                    handle_goal_error(&run, err, theme)?;
                }
            }
            Ok(outcome) => debug!(?outcome, "goal-fit step"),
            Err(err) => handle_goal_error(&run, err, theme)?,
        }
    }

    if let Some(fit) = run.result() {
        render::stream_fit(run.subject(), fit);
    }
    Ok(())
}

fn handle_goal_error(run: &GoalFitRun, err: QuizFlowError, theme: &ColorfulTheme) -> Result<()> {
    match err {
        QuizFlowError::Blocked(blocked) => {
            eprintln!("{blocked}");
            Ok(())
        }
        QuizFlowError::Backend(err) => {
            if retry_after_failure(run, theme)? {
                Ok(())
            } else {
                Err(err).context("goal-fit analysis failed")
            }
        }
        err => Err(err.into()),
    }
}

//
// ─── ROADMAP & SPRINT ──────────────────────────────────────────────────────────
//

async fn roadmap(
    services: &AppServices,
    user: &UserSession,
    stream: Option<String>,
    theme: &ColorfulTheme,
) -> Result<()> {
    require_sign_in(user)?;
    let saved = services
        .discover()
        .latest(user)
        .await?
        .context("no discovery result stored; run `career discover` first")?;

    let stream = match stream {
        Some(stream) => stream,
        None => {
            let names: Vec<&str> = saved.profile.stream_names();
            if names.is_empty() {
                bail!("the stored discovery result suggests no streams");
            }
            let picked = Select::with_theme(theme)
                .with_prompt("Build a roadmap for")
                .items(&names)
                .default(0)
                .interact()?;
            names[picked].to_string()
        }
    };

    let generated = match services
        .roadmaps()
        .generate(user, &saved.profile, Some(stream.as_str()))
        .await
    {
        Ok(generated) => generated,
        Err(RoadmapError::Backend(err)) => {
            eprintln!("{}", err.user_message());
            return Err(err).context("roadmap generation failed");
        }
        Err(err) => return Err(err.into()),
    };

    render::roadmap(&generated.stream, &generated.roadmap);
    match generated.saved_id {
        Some(id) => println!("\nSaved as roadmap #{id}."),
        None => println!("\nRoadmap was not saved."),
    }
    Ok(())
}

async fn sprint(services: &AppServices, user: &UserSession) -> Result<()> {
    require_sign_in(user)?;
    let saved = services
        .discover()
        .latest(user)
        .await?
        .context("no discovery result stored; run `career discover` first")?;
    let latest = services
        .roadmaps()
        .recent(user, 1)
        .await?
        .into_iter()
        .next()
        .context("no roadmap stored; run `career roadmap` first")?;

    let tracker = match services
        .sprints()
        .generate(
            user,
            &latest.stream,
            &latest.roadmap,
            &saved.profile.core_personality_insight,
        )
        .await
    {
        Ok(tracker) => tracker,
        Err(SprintError::Backend(err)) => {
            eprintln!("{}", err.user_message());
            return Err(err).context("sprint generation failed");
        }
        Err(err) => return Err(err.into()),
    };

    if let Some(plan) = tracker.plan() {
        render::checklist(plan, tracker.completed(), &tracker.view());
    }
    Ok(())
}

async fn tasks(services: &AppServices, user: &UserSession) -> Result<()> {
    require_sign_in(user)?;
    let mut tracker = services.sprints().tracker(user);
    tracker.load().await;
    if tracker.state() == LoadState::LoadFailed {
        eprintln!("Progress could not be loaded; showing every task unchecked.");
    }
    let plan = tracker
        .plan()
        .context("no sprint stored; run `career sprint` first")?;
    render::checklist(plan, tracker.completed(), &tracker.view());
    Ok(())
}

async fn toggle(services: &AppServices, user: &UserSession, task: TaskId) -> Result<()> {
    require_sign_in(user)?;
    let mut tracker = services.sprints().tracker(user);
    tracker.load().await;
    if tracker.plan().is_none() {
        bail!("no sprint stored; run `career sprint` first");
    }

    let pending = tracker.toggle(&task)?;
    pending.settled().await;

    let view = tracker.view();
    let mark = if tracker.completed().is_done(&task) { "done" } else { "open" };
    println!(
        "{task} is now {mark} ({}/{} tasks, {}%)",
        view.completed, view.total, view.percent
    );
    if view.is_sprint_complete() {
        println!("Sprint complete!");
    }
    Ok(())
}

async fn dashboard(services: &AppServices, user: &UserSession) -> Result<()> {
    require_sign_in(user)?;
    let dashboard = services.dashboard(user).await?;
    render::dashboard(&dashboard);
    Ok(())
}

async fn health(services: &AppServices) -> Result<()> {
    match services.health().await {
        Ok(status) if status.is_ok() => {
            println!("guidance backend: {}", status.status);
            Ok(())
        }
        Ok(status) => bail!("guidance backend reported `{}`", status.status),
        Err(err) => Err(err).context("guidance backend unreachable"),
    }
}

//
// ─── EXAMS ─────────────────────────────────────────────────────────────────────
//

fn exam_directory(
    search: Option<String>,
    stream: Option<String>,
    level: Option<LevelArg>,
    state: Option<&str>,
) -> Result<()> {
    if let Some(state) = state {
        let Some(region) = exams::find_region(state) else {
            let codes: Vec<&str> = exams::regions().iter().map(|r| r.code).collect();
            bail!("unknown state `{state}`; try one of {}", codes.join(", "));
        };
        render::region(region);
        return Ok(());
    }

    let filter = ExamFilter {
        search,
        stream,
        level: level.map(ExamLevel::from),
    };
    debug!(?filter, "filtering exam directory");
    render::exams(&exams::filter_exams(&filter));
    Ok(())
}

//! Tipsmaster CLI - build a match slate and request a betting system

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::{ColoredString, Colorize};
use dialoguer::{theme::ColorfulTheme, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use tipsmaster::core::DisplayedResult;
use tipsmaster::models::MatchId;
use tipsmaster::projector::{format_chart_value, format_percent, ProbabilityChart, ResultView};
use tipsmaster::{
    AppError, ClientConfig, MatchForm, Outcome, PredictionClient, PredictionConfig, RiskLevel,
    Session, Slate,
};

/// Width of a 100% probability bar
const BAR_WIDTH: usize = 40;
const TEAM_WIDTH: usize = 22;

#[derive(Parser)]
#[command(name = "tipsmaster")]
#[command(author, version, about = "Pool-betting system builder", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Run in interactive mode
    #[arg(short, long)]
    interactive: bool,

    /// Prediction service base URL (overrides TIPSMASTER_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Request timeout in seconds (overrides TIPSMASTER_TIMEOUT_SECS)
    #[arg(long)]
    timeout: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Request a system for a slate of matches
    Predict {
        /// Match as "Home vs Away", optionally followed by "@ 1,X,2" odds (repeatable)
        #[arg(short, long = "match", value_name = "MATCH", required = true)]
        matches: Vec<String>,

        /// Budget in SEK
        #[arg(short, long, default_value = "100")]
        budget: u32,

        /// Risk level: low, medium or high
        #[arg(short, long, default_value = "medium")]
        risk: RiskLevel,

        /// Print the projected result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that the prediction service is reachable
    Health,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &cli.api_url {
        config = config.with_base_url(url.as_str());
    }
    if let Some(timeout) = cli.timeout {
        config = config.with_timeout_secs(timeout);
    }
    let client = PredictionClient::new(config)?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    if cli.interactive {
        print_banner();
        run_interactive(&rt, &client)?;
    } else if let Some(command) = cli.command {
        match command {
            Commands::Predict {
                matches,
                budget,
                risk,
                json,
            } => {
                if !json {
                    print_banner();
                }
                run_predict(&rt, &client, &matches, budget, risk, json)?;
            }
            Commands::Health => {
                print_banner();
                run_health(&rt, &client)?;
            }
        }
    } else {
        print_banner();
        println!("Use --help for usage information or --interactive for interactive mode.");
    }

    Ok(())
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")
}

fn print_banner() {
    println!(
        "{}",
        format!("Tipsmaster CLI v{}", env!("CARGO_PKG_VERSION"))
            .cyan()
            .bold()
    );
    println!();
}

fn run_predict(
    rt: &Runtime,
    client: &PredictionClient,
    lines: &[String],
    budget: u32,
    risk: RiskLevel,
    json: bool,
) -> Result<()> {
    let mut session = Session::new(PredictionConfig::new(budget, risk)?);

    for line in lines {
        let mut form = MatchForm::parse_line(line)?;
        session
            .add_match(&mut form)
            .with_context(|| format!("Invalid match '{}'", line))?;
    }

    if !json {
        print_slate(session.slate());
        println!(
            "{}: budget {} SEK, risk {}",
            "Requesting".green(),
            session.config().budget,
            session.config().risk_level
        );
        println!();
    }

    request_with_spinner(rt, &mut session, client, !json)?;

    let displayed = session
        .displayed()
        .context("Prediction finished without a result")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&displayed.view())?);
    } else {
        print_result(displayed);
    }

    Ok(())
}

fn run_health(rt: &Runtime, client: &PredictionClient) -> Result<()> {
    println!("Checking {}", client.config().health_url());

    match rt.block_on(client.check_health()) {
        Ok(()) => {
            println!("{}", "Prediction service is reachable.".green());
            Ok(())
        }
        Err(e) => {
            println!("{}: {}", "Warning".yellow(), e);
            Err(e.into())
        }
    }
}

fn request_with_spinner(
    rt: &Runtime,
    session: &mut Session,
    client: &PredictionClient,
    show_spinner: bool,
) -> Result<(), AppError> {
    let pb = if show_spinner {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message("Generating predictions...");
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let outcome = rt.block_on(session.predict(client));

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    outcome
}

fn print_slate(slate: &Slate) {
    println!("{}", "Matches:".yellow().bold());
    if slate.is_empty() {
        println!("{}", "(no matches added yet)".dimmed());
        println!();
        return;
    }

    println!(
        "{:>3} {:<w$} {:<w$} {:>6} {:>6} {:>6}",
        "#",
        "Home",
        "Away",
        "1",
        "X",
        "2",
        w = TEAM_WIDTH
    );
    println!("{}", "-".repeat(70));

    for (i, m) in slate.iter().enumerate() {
        println!(
            "{:>3} {:<w$} {:<w$} {:>6} {:>6} {:>6}",
            i + 1,
            truncate_name(&m.home_team, TEAM_WIDTH),
            truncate_name(&m.away_team, TEAM_WIDTH),
            odds_cell(m.odds.home),
            odds_cell(m.odds.draw),
            odds_cell(m.odds.away),
            w = TEAM_WIDTH
        );
    }
    println!();
}

fn print_result(displayed: &DisplayedResult) {
    let view = displayed.view();

    println!("{}", "Result:".yellow().bold());
    println!("  Expected value:  {}", view.expected_value.bold());
    println!("  Win probability: {}", view.win_probability.bold());
    println!(
        "  {}",
        format!(
            "Generated {}",
            displayed.received_at.format("%Y-%m-%d %H:%M:%S UTC")
        )
        .dimmed()
    );
    println!();

    print_system(&view);
    print_chart(&view.chart);
}

fn print_system(view: &ResultView) {
    println!("{}", "Recommended system:".yellow().bold());
    println!(
        "{:>5} {:<w$} {:<w$} {:<8} {:>7} {:>7} {:>7}",
        "Match",
        "Home",
        "Away",
        "Pick",
        "1",
        "X",
        "2",
        w = TEAM_WIDTH
    );
    println!("{}", "-".repeat(84));

    for row in &view.system {
        println!(
            "{:>5} {:<w$} {:<w$} {:<8} {:>7} {:>7} {:>7}",
            row.match_index,
            truncate_name(&row.home_team, TEAM_WIDTH),
            truncate_name(&row.away_team, TEAM_WIDTH),
            row.selection.bold(),
            row.home_probability,
            row.draw_probability,
            row.away_probability,
            w = TEAM_WIDTH
        );

        if let Some(margin) = row.margin {
            println!(
                "{:>7} {}",
                "",
                format!("margin {}", format_percent(margin, 1)).dimmed()
            );
        }

        for value in &row.values {
            let line = format!(
                "{} @ {:.2}  EV {:.3}{}",
                value.outcome,
                value.odds,
                value.expected_return,
                value
                    .implied_probability
                    .map(|q| format!("  market {:.1}%", q * 100.0))
                    .unwrap_or_default()
            );
            let marker = if value.selected { "*" } else { " " };
            if value.is_value {
                println!("{:>7} {}", marker, line.green());
            } else {
                println!("{:>7} {}", marker, line.dimmed());
            }
        }
    }

    let c = &view.coverage;
    println!();
    println!(
        "{} {} singles, {} half covers, {} full covers = {} rows",
        "→".green(),
        c.singles,
        c.half_covers,
        c.full_covers,
        c.rows
    );
    println!();
}

fn print_chart(chart: &ProbabilityChart) {
    println!("{}", "Probabilities per match:".yellow().bold());

    for outcome in Outcome::ALL {
        println!(
            "  {} {}",
            paint_bar(outcome, "██"),
            ProbabilityChart::series_label(outcome)
        );
    }
    println!();

    let series: Vec<(Outcome, Vec<f64>)> = Outcome::ALL
        .iter()
        .map(|outcome| (*outcome, chart.series(*outcome)))
        .collect();

    for (i, label) in chart.labels().into_iter().enumerate() {
        println!("{}", label.bold());
        for (outcome, values) in &series {
            let percent = values.get(i).copied().unwrap_or_default();
            let width = ((percent / 100.0) * BAR_WIDTH as f64)
                .round()
                .clamp(0.0, BAR_WIDTH as f64) as usize;
            println!(
                "  {} {:<w$} {:>5}%",
                outcome,
                paint_bar(*outcome, &"█".repeat(width)),
                format_chart_value(percent),
                w = BAR_WIDTH
            );
        }
    }
    println!();
}

fn paint_bar(outcome: Outcome, bar: &str) -> ColoredString {
    match outcome {
        Outcome::Home => bar.blue(),
        Outcome::Draw => bar.yellow(),
        Outcome::Away => bar.red(),
    }
}

fn run_interactive(rt: &Runtime, client: &PredictionClient) -> Result<()> {
    println!("{}", "Interactive mode".green().bold());
    println!();

    let theme = ColorfulTheme::default();
    let mut session = Session::default();

    if !rt.block_on(session.probe_connectivity(client)) {
        if let Some(warning) = session.warning() {
            println!("{}: {}", "Warning".yellow(), warning);
            println!();
        }
    }

    loop {
        let options = vec![
            "Add match",
            "Edit match",
            "Remove match",
            "Show matches",
            "Settings",
            "Generate predictions",
            "Quit",
        ];

        let selection = Select::with_theme(&theme)
            .with_prompt(format!(
                "{} matches, budget {} SEK, risk {}",
                session.slate().len(),
                session.config().budget,
                session.config().risk_level
            ))
            .items(&options)
            .default(0)
            .interact()?;

        match selection {
            0 => {
                let mut form = prompt_form(&theme, &MatchForm::default())?;
                match session.add_match(&mut form) {
                    Ok(id) => {
                        if let Some(m) = session.slate().get(id) {
                            println!("{}: {}", "Added".green(), m);
                        }
                    }
                    Err(e) => println!("{}: {}", "Error".red(), e),
                }
                println!();
            }
            1 => {
                if let Some(id) = pick_match(&theme, &session, "Edit which match?")? {
                    let initial = session
                        .slate()
                        .get(id)
                        .map(MatchForm::from_match)
                        .unwrap_or_default();
                    let form = prompt_form(&theme, &initial)?;
                    match session.update_match(id, &form) {
                        Ok(true) => println!("{}", "Updated".green()),
                        Ok(false) => println!("{}", "Match no longer on the slate".yellow()),
                        Err(e) => println!("{}: {}", "Error".red(), e),
                    }
                }
                println!();
            }
            2 => {
                if let Some(id) = pick_match(&theme, &session, "Remove which match?")? {
                    if let Some(m) = session.remove_match(id) {
                        println!("{}: {}", "Removed".green(), m);
                    }
                }
                println!();
            }
            3 => {
                println!();
                print_slate(session.slate());
            }
            4 => {
                prompt_settings(&theme, &mut session)?;
                println!();
            }
            5 => {
                println!();
                match request_with_spinner(rt, &mut session, client, true) {
                    Ok(()) => {
                        if let Some(displayed) = session.displayed() {
                            print_result(displayed);
                        }
                    }
                    Err(e) => println!("{}: {}", "Error".red(), e),
                }
            }
            6 => {
                println!("Goodbye!");
                break;
            }
            _ => {}
        }
    }

    Ok(())
}

fn prompt_form(theme: &ColorfulTheme, initial: &MatchForm) -> Result<MatchForm> {
    let text = |prompt: &str, initial: &str| -> Result<String> {
        let value = Input::<String>::with_theme(theme)
            .with_prompt(prompt)
            .with_initial_text(initial)
            .allow_empty(true)
            .interact_text()?;
        Ok(value)
    };

    Ok(MatchForm {
        home_team: text("Home team", &initial.home_team)?,
        away_team: text("Away team", &initial.away_team)?,
        odds_home: text("1 odds (blank to skip)", &initial.odds_home)?,
        odds_draw: text("X odds (blank to skip)", &initial.odds_draw)?,
        odds_away: text("2 odds (blank to skip)", &initial.odds_away)?,
    })
}

fn pick_match(theme: &ColorfulTheme, session: &Session, prompt: &str) -> Result<Option<MatchId>> {
    let slate = session.slate();
    if slate.is_empty() {
        println!("{}", "No matches on the slate.".yellow());
        return Ok(None);
    }

    let mut items: Vec<String> = slate
        .iter()
        .enumerate()
        .map(|(i, m)| format!("{}. {}", i + 1, m))
        .collect();
    items.push("Cancel".to_string());

    let choice = Select::with_theme(theme)
        .with_prompt(prompt)
        .items(&items)
        .default(0)
        .interact()?;

    Ok(slate.list().get(choice).map(|m| m.id))
}

fn prompt_settings(theme: &ColorfulTheme, session: &mut Session) -> Result<()> {
    let budget: u32 = Input::with_theme(theme)
        .with_prompt("Budget (SEK)")
        .default(session.config().budget)
        .interact_text()?;

    if let Err(e) = session.set_budget(budget) {
        println!("{}: {}", "Error".red(), e);
    }

    let current = RiskLevel::ALL
        .iter()
        .position(|r| *r == session.config().risk_level)
        .unwrap_or(1);
    let labels: Vec<&str> = RiskLevel::ALL.iter().map(RiskLevel::as_str).collect();

    let choice = Select::with_theme(theme)
        .with_prompt("Risk level")
        .items(&labels)
        .default(current)
        .interact()?;

    if let Some(risk) = RiskLevel::ALL.get(choice) {
        session.set_risk_level(*risk);
    }

    Ok(())
}

fn odds_cell(odds: Option<f64>) -> String {
    odds.map(|o| format!("{:.2}", o))
        .unwrap_or_else(|| "-".to_string())
}

/// Cut a team name to `width` columns, marking the cut with an ellipsis
fn truncate_name(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        return name.to_string();
    }
    let mut short: String = name.chars().take(width.saturating_sub(1)).collect();
    short.push('…');
    short
}

//! Counterpick CLI - Command-line interface for matchup betting backtests

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use counterpick::backtesting::metrics::{
    analyze_bets_by_odds_range, analyze_by_group, analyze_by_odds_condition, top_by_roi,
    GroupAnalysis,
};
use counterpick::backtesting::report::dataset_table;
use counterpick::backtesting::{
    generate_scenarios, replay, run_league_sweeps, run_sweep, write_outputs, BankrollFloor,
    EngineConfig, Scenario, ScenarioGrid, SweepConfig,
};
use counterpick::data::{load_hero_data, Dataset, DatasetBuilder, DatasetOptions, MatchLog, Metric};

/// Default hero data file (relative to working directory)
const DEFAULT_HERO_DATA: &str = "cs.json";
const DEFAULT_MATCHES: &str = "matches.csv";
const DEFAULT_OUTPUT: &str = "results";

#[derive(Parser)]
#[command(name = "counterpick")]
#[command(author, version, about = "Hero matchup betting backtester", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Hero data file (JSON or `var x = ...;` script layout)
    #[arg(long, env = "COUNTERPICK_HERO_DATA", default_value = DEFAULT_HERO_DATA)]
    hero_data: PathBuf,

    /// Historical match log CSV
    #[arg(long, env = "COUNTERPICK_MATCHES", default_value = DEFAULT_MATCHES)]
    matches: PathBuf,

    /// Keep matches with missing odds (they are skipped per bet instead)
    #[arg(long)]
    keep_missing_odds: bool,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Args, Clone)]
struct EngineArgs {
    /// Starting bankroll
    #[arg(long, default_value = "1000")]
    bankroll: f64,

    /// Maximum single stake
    #[arg(long, default_value = "10000")]
    max_bet: f64,

    /// Bankroll floor: halt (stop at zero) or unbounded
    #[arg(long, default_value = "halt")]
    floor: String,

    /// Skip matches where the opposing side has no odds
    #[arg(long)]
    require_both_odds: bool,
}

impl EngineArgs {
    fn to_config(&self) -> Result<EngineConfig> {
        let floor = match self.floor.to_lowercase().as_str() {
            "halt" | "halt-at-zero" => BankrollFloor::HaltAtZero,
            "unbounded" | "none" => BankrollFloor::Unbounded,
            other => bail!("Unknown bankroll floor '{}' (expected halt or unbounded)", other),
        };
        if self.bankroll <= 0.0 {
            bail!("Bankroll must be positive, got {}", self.bankroll);
        }
        Ok(EngineConfig {
            initial_bankroll: self.bankroll,
            max_bet: self.max_bet,
            floor,
            require_both_odds: self.require_both_odds,
            record_bets: false,
        })
    }
}

#[derive(Args, Clone)]
struct GridArgs {
    /// Scenario grid: standard or odds-cap
    #[arg(long, default_value = "standard")]
    grid: String,

    /// Leave out the 4+4 and 5+5 hero filters
    #[arg(long)]
    no_hero_filters: bool,
}

impl GridArgs {
    fn scenarios(&self) -> Result<Vec<Scenario>> {
        let grid = ScenarioGrid::from_name(&self.grid)
            .ok_or_else(|| anyhow!("Unknown grid '{}' (expected standard or odds-cap)", self.grid))?;
        Ok(generate_scenarios(grid, !self.no_hero_filters))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Sweep every scenario over every threshold and write CSV summaries
    Backtest {
        /// Output directory
        #[arg(short, long, env = "COUNTERPICK_OUTPUT", default_value = DEFAULT_OUTPUT)]
        output: PathBuf,

        /// Comma-separated metrics to sweep (e.g. WR_DELTA,ADV_DELTA)
        #[arg(long, default_value = "WR_DELTA")]
        metrics: String,

        /// Run scenarios on a single thread
        #[arg(long)]
        sequential: bool,

        /// Worker threads for the sweep
        #[arg(long)]
        threads: Option<usize>,

        /// Skip per-league summaries
        #[arg(long)]
        no_leagues: bool,

        /// Number of top rows to show
        #[arg(long, default_value = "10")]
        top: usize,

        #[command(flatten)]
        grid: GridArgs,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Replay one scenario at one threshold and show its bets
    Simulate {
        /// Scenario id (see `scenarios`)
        #[arg(short, long)]
        scenario: String,

        /// Metric to bet on
        #[arg(short, long, default_value = "WR_DELTA")]
        metric: String,

        /// Minimum absolute metric delta
        #[arg(short, long)]
        threshold: f64,

        /// Number of bets to list
        #[arg(long, default_value = "20")]
        show: usize,

        #[command(flatten)]
        grid: GridArgs,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// List scenario ids
    Scenarios {
        #[command(flatten)]
        grid: GridArgs,
    },

    /// Build the derived dataset and print statistics
    Dataset {
        /// Write the derived matches to this CSV
        #[arg(short, long)]
        export: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    println!("{}", "Counterpick CLI v0.3.0".cyan().bold());
    println!();

    let options = DatasetOptions {
        require_odds: !cli.keep_missing_odds,
    };

    match &cli.command {
        Commands::Backtest {
            output,
            metrics,
            sequential,
            threads,
            no_leagues,
            top,
            grid,
            engine,
        } => {
            let dataset = load_dataset(&cli.hero_data, &cli.matches, options)?;
            let config = SweepConfig {
                metrics: parse_metrics(metrics)?,
                parallel: !sequential,
                threads: *threads,
                engine: engine.to_config()?,
            };
            run_backtest(&dataset, &grid.scenarios()?, &config, output, *no_leagues, *top)?;
        }
        Commands::Simulate {
            scenario,
            metric,
            threshold,
            show,
            grid,
            engine,
        } => {
            let dataset = load_dataset(&cli.hero_data, &cli.matches, options)?;
            let metric = Metric::from_label(metric)
                .ok_or_else(|| anyhow!("Unknown metric '{}'", metric))?;
            let scenarios = grid.scenarios()?;
            let scenario = scenarios
                .iter()
                .find(|s| s.id == *scenario)
                .with_context(|| format!("No scenario '{}' in the {} grid", scenario, grid.grid))?;
            run_simulate(&dataset, scenario, metric, *threshold, &engine.to_config()?, *show);
        }
        Commands::Scenarios { grid } => {
            list_scenarios(&grid.scenarios()?);
        }
        Commands::Dataset { export } => {
            let dataset = load_dataset(&cli.hero_data, &cli.matches, options)?;
            show_dataset(&dataset, export.as_deref())?;
        }
    }

    Ok(())
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .context("Invalid progress template")?,
    );
    pb.set_message(message.to_string());
    Ok(pb)
}

fn parse_metrics(list: &str) -> Result<Vec<Metric>> {
    let metrics = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Metric::from_label(s).ok_or_else(|| anyhow!("Unknown metric '{}'", s)))
        .collect::<Result<Vec<_>>>()?;
    if metrics.is_empty() {
        bail!("At least one metric is required");
    }
    Ok(metrics)
}

fn load_dataset(hero_path: &Path, matches_path: &Path, options: DatasetOptions) -> Result<Dataset> {
    let pb = spinner("Loading hero data and match log...")?;

    let heroes = load_hero_data(hero_path)
        .with_context(|| format!("Failed to load hero data from {:?}", hero_path))?;
    let log = MatchLog::load(matches_path)
        .with_context(|| format!("Failed to load match log from {:?}", matches_path))?;
    let dataset = DatasetBuilder::new(&heroes, options).build(log.records());

    pb.finish_and_clear();

    println!(
        "{}: {} heroes, {} of {} matches usable",
        "Loaded".green(),
        heroes.len(),
        dataset.len(),
        dataset.stats.rows_read
    );
    if let Some(date) = heroes.update_time {
        println!("Hero data updated: {}", date);
    }
    println!();

    Ok(dataset)
}

fn run_backtest(
    dataset: &Dataset,
    scenarios: &[Scenario],
    config: &SweepConfig,
    output: &Path,
    no_leagues: bool,
    top: usize,
) -> Result<()> {
    println!("{}", "Running backtest...".green());
    println!("Scenarios: {}", scenarios.len());
    println!(
        "Metrics: {}",
        config
            .metrics
            .iter()
            .map(|m| m.label())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("Starting bankroll: {}", config.engine.initial_bankroll);
    println!("Max bet: {}", config.engine.max_bet);
    println!();

    let pb = ProgressBar::new(scenarios.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );
    pb.set_message("scenarios");

    let sweep = run_sweep(&dataset.matches, scenarios, config, |_| pb.inc(1));
    pb.finish_and_clear();

    let leagues = if no_leagues {
        Vec::new()
    } else {
        let pb = spinner("Sweeping league subsets...")?;
        let leagues = run_league_sweeps(dataset, scenarios, config);
        pb.finish_and_clear();
        leagues
    };

    let written = write_outputs(output, &sweep, &leagues)
        .with_context(|| format!("Failed to write results to {:?}", output))?;
    info!("Backtest complete: {} replays", sweep.replay_count());

    let rows = sweep.rows();

    println!("\n{}", format!("Top {} by ROI:", top).yellow().bold());
    println!(
        "{:<36} {:<10} {:>10} {:>6} {:>8} {:>10} {:>8}",
        "Scenario", "Metric", "Threshold", "Bets", "Win %", "Profit", "ROI"
    );
    println!("{}", "-".repeat(96));
    for row in top_by_roi(&rows, top) {
        let r = &row.result;
        let roi = format!("{:.1}%", r.roi() * 100.0);
        println!(
            "{:<36} {:<10} {:>10} {:>6} {:>7.1}% {:>10.0} {:>8}",
            row.scenario,
            r.metric.label(),
            r.threshold,
            r.bets,
            r.win_pct(),
            r.profit(),
            if r.roi() > 0.0 { roi.green() } else { roi.red() }
        );
    }

    print_group_analysis("Analysis by Strategy Group:", &analyze_by_group(&rows));
    print_group_analysis("Analysis by Odds Condition:", &analyze_by_odds_condition(&rows));

    println!();
    println!(
        "{}: {} scenario tables, {} league summaries",
        "Saved".green(),
        written.scenario_files.len(),
        written.league_files.len()
    );
    println!("Summary: {:?}", written.summary_file);

    Ok(())
}

fn print_group_analysis(title: &str, analysis: &[GroupAnalysis]) {
    println!("\n{}", title.yellow().bold());
    println!(
        "{:<14} {:>6} {:>11} {:>8} {:>10} {:>12}",
        "Group", "Rows", "Profitable", "Bets", "Best ROI", "Best Profit"
    );
    println!("{}", "-".repeat(66));
    for a in analysis {
        println!(
            "{:<14} {:>6} {:>11} {:>8} {:>9.1}% {:>12.0}",
            a.key,
            a.rows,
            a.profitable_rows,
            a.bets,
            a.best_roi * 100.0,
            a.best_profit
        );
    }
}

fn run_simulate(
    dataset: &Dataset,
    scenario: &Scenario,
    metric: Metric,
    threshold: f64,
    engine: &EngineConfig,
    show: usize,
) {
    let config = EngineConfig {
        record_bets: true,
        ..engine.clone()
    };
    let result = replay(&dataset.matches, scenario, metric, threshold, &config);

    println!("\n{}", "=".repeat(60));
    println!("SIMULATION RESULT");
    println!("{}", "=".repeat(60));
    println!("Scenario: {}", scenario.id);
    println!("Strategy group: {}", scenario.strategy_group());
    println!("Odds condition: {}", scenario.odds_condition_label());
    println!("Hero filter: {}", scenario.hero_filter_label());
    println!("Metric: {} >= {}", metric, threshold);
    println!("{}", "-".repeat(60));
    println!("Bets: {} ({} won, {} lost)", result.bets, result.wins, result.losses);
    println!("Win rate: {:.2}%", result.win_pct());
    println!("Total staked: {:.2}", result.total_staked);
    println!("Final bankroll: {:.2}", result.final_bankroll);
    println!("Profit: {:.2}", result.profit());
    println!("ROI: {:.2}%", result.roi() * 100.0);
    println!("Max stake: {:.2}", result.max_stake);
    println!("Max drawdown: {:.2}", result.max_drawdown);
    if result.halted {
        println!("{}", "Bankroll exhausted, betting stopped".red());
    }

    let metrics = result.bet_metrics();
    if metrics.total_bets > 0 {
        println!("{}", "-".repeat(60));
        println!("Average odds: {:.2}", metrics.avg_odds);
        println!("Average stake: {:.2}", metrics.avg_stake);
        println!("Profit factor: {:.2}", metrics.profit_factor);
        println!("Longest losing streak: {}", metrics.longest_losing_streak);
    }
    println!("{}", "=".repeat(60));

    if result.bet_log.is_empty() {
        return;
    }

    println!("\n{}", "Analysis by Odds Range:".yellow().bold());
    println!(
        "{:<14} {:>6} {:>6} {:>10} {:>10} {:>9}",
        "Range", "Bets", "Wins", "Hit Rate", "Profit", "ROI"
    );
    println!("{}", "-".repeat(60));
    for (key, m) in analyze_bets_by_odds_range(&result.bet_log) {
        println!(
            "{:<14} {:>6} {:>6} {:>9.1}% {:>10.2} {:>8.1}%",
            key,
            m.total_bets,
            m.winning_bets,
            m.hit_rate * 100.0,
            m.net_profit,
            m.roi * 100.0
        );
    }

    println!("\n{}", format!("First {} bets:", show).yellow().bold());
    println!(
        "{:>6} {:<20} {:<9} {:>8} {:>6} {:>9} {:>10} {:>10}",
        "Match", "Team", "Label", "Delta", "Odds", "Stake", "Profit", "Bankroll"
    );
    println!("{}", "-".repeat(84));
    for bet in result.bet_log.iter().take(show) {
        let profit = format!("{:.2}", bet.profit);
        println!(
            "{:>6} {:<20} {:<9} {:>8.1} {:>6.2} {:>9.2} {:>10} {:>10.2}",
            bet.match_index,
            bet.team,
            bet.label.as_str(),
            bet.delta,
            bet.odds,
            bet.stake,
            if bet.won { profit.green() } else { profit.red() },
            bet.bankroll_after
        );
    }
}

fn list_scenarios(scenarios: &[Scenario]) {
    println!(
        "{:<36} {:<10} {:<14} {:<6}",
        "Scenario", "Group", "Odds", "Heroes"
    );
    println!("{}", "-".repeat(70));
    for s in scenarios {
        println!(
            "{:<36} {:<10} {:<14} {:<6}",
            s.id,
            s.strategy_group(),
            s.odds_condition_label(),
            s.hero_filter_label()
        );
    }
    println!();
    println!("Total: {} scenarios", scenarios.len());
}

fn show_dataset(dataset: &Dataset, export: Option<&Path>) -> Result<()> {
    let stats = &dataset.stats;

    println!("{}", "Dataset statistics:".yellow().bold());
    println!("{}", "-".repeat(40));
    println!("Rows read: {}", stats.rows_read);
    println!("Kept: {}", stats.kept);
    println!("Dropped (roster size): {}", stats.bad_roster_size);
    println!("Dropped (unknown hero): {}", stats.unknown_hero);
    println!("Dropped (missing odds): {}", stats.missing_odds);
    println!("Unknown winner (never bet): {}", stats.unknown_winner);
    match dataset.favorite_hit_rate() {
        Some(rate) => println!("Favorite hit rate: {:.1}%", rate * 100.0),
        None => println!("Favorite hit rate: n/a"),
    }

    let leagues = dataset.leagues();
    if !leagues.is_empty() {
        println!("\n{}", "Leagues:".yellow().bold());
        for league in &leagues {
            let count = dataset.matches.iter().filter(|m| m.league == *league).count();
            println!("  {:<40} {:>6}", league, count);
        }
    }

    if let Some(path) = export {
        dataset_table(dataset)
            .write(path)
            .with_context(|| format!("Failed to export dataset to {:?}", path))?;
        println!("\n{}: {:?}", "Saved".green(), path);
    }

    Ok(())
}

use std::time::Duration;

use anyhow::anyhow;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use crate::api::news::{DEFAULT_NEWS_API_URL, NewsConfig};
use crate::api::{
    ClassifyResponse, ProfilePayload, ServerConfig, SimulatePayload, build_classify_response,
    profile_from_payload, run_http_server, run_simulation, simulate_request_from_payload,
};
use crate::core::{
    BufferStatus, CoachBook, ExpensePolicy, GigType, PurchaseTiming, ScenarioKind, buffer_status,
    classify_with_policy,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliScenario {
    Purchase,
    WeekOff,
    IncomeDrop,
    NewGig,
}

impl From<CliScenario> for ScenarioKind {
    fn from(value: CliScenario) -> Self {
        match value {
            CliScenario::Purchase => ScenarioKind::Purchase,
            CliScenario::WeekOff => ScenarioKind::WeekOff,
            CliScenario::IncomeDrop => ScenarioKind::IncomeDrop,
            CliScenario::NewGig => ScenarioKind::NewGig,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliTiming {
    Immediate,
    #[value(name = "1week")]
    OneWeek,
    #[value(name = "2weeks")]
    TwoWeeks,
    #[value(name = "1month")]
    OneMonth,
}

impl From<CliTiming> for PurchaseTiming {
    fn from(value: CliTiming) -> Self {
        match value {
            CliTiming::Immediate => PurchaseTiming::Immediate,
            CliTiming::OneWeek => PurchaseTiming::OneWeek,
            CliTiming::TwoWeeks => PurchaseTiming::TwoWeeks,
            CliTiming::OneMonth => PurchaseTiming::OneMonth,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliGigType {
    Rideshare,
    Freelance,
    Delivery,
    Tutoring,
}

impl From<CliGigType> for GigType {
    fn from(value: CliGigType) -> Self {
        match value {
            CliGigType::Rideshare => GigType::Rideshare,
            CliGigType::Freelance => GigType::Freelance,
            CliGigType::Delivery => GigType::Delivery,
            CliGigType::Tutoring => GigType::Tutoring,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "gigcoach",
    about = "Income tier classification and what-if simulation for gig workers"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Classify a profile and print its tier and buffer status.
    Classify(ClassifyArgs),
    /// Print the three outcomes of a what-if scenario.
    Simulate(SimulateArgs),
    /// Ask the coach a question.
    Coach(CoachArgs),
}

#[derive(Args, Debug)]
struct PolicyArgs {
    #[arg(long, default_value_t = 8000, help = "Monthly food estimate in rupees")]
    food_estimate: u64,
    #[arg(long, default_value_t = 3000, help = "Monthly transport estimate in rupees")]
    transport_estimate: u64,
    #[arg(long, default_value_t = 4000, help = "Other monthly essentials in rupees")]
    other_estimate: u64,
}

impl From<&PolicyArgs> for ExpensePolicy {
    fn from(value: &PolicyArgs) -> Self {
        ExpensePolicy {
            food: value.food_estimate,
            transport: value.transport_estimate,
            other: value.other_estimate,
        }
    }
}

#[derive(Args, Debug)]
struct NewsArgs {
    #[arg(long, env = "NEWS_API_URL", default_value = DEFAULT_NEWS_API_URL)]
    news_api_url: String,
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    news_api_key: Option<String>,
    #[arg(
        long,
        env = "NEWS_API_COUNTRY",
        help = "Country filter; marketaux falls back to \"in\""
    )]
    news_country: Option<String>,
    #[arg(long, env = "NEWS_API_FILTER_ENTITIES", default_value = "true")]
    news_filter_entities: String,
    #[arg(long, env = "NEWS_API_LANGUAGE", default_value = "en")]
    news_language: String,
    #[arg(long, default_value_t = 60, help = "Seconds a news response stays cached")]
    news_cache_ttl_secs: u64,
    #[arg(
        long,
        default_value_t = 10,
        help = "Seconds before an upstream news request is abandoned"
    )]
    news_timeout_secs: u64,
}

impl From<NewsArgs> for NewsConfig {
    fn from(value: NewsArgs) -> Self {
        NewsConfig {
            api_url: value.news_api_url,
            api_key: value.news_api_key.filter(|k| !k.trim().is_empty()),
            country: value.news_country.filter(|c| !c.trim().is_empty()),
            filter_entities: value.news_filter_entities,
            language: value.news_language,
            cache_ttl: Duration::from_secs(value.news_cache_ttl_secs),
            timeout: Duration::from_secs(value.news_timeout_secs),
        }
    }
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    #[arg(long, default_value_t = 8080)]
    port: u16,
    #[command(flatten)]
    policy: PolicyArgs,
    #[command(flatten)]
    news: NewsArgs,
}

#[derive(Args, Debug)]
struct ClassifyArgs {
    #[arg(long, default_value = "other")]
    primary_income: String,
    #[arg(long, help = "Lower bound of monthly income")]
    income_min: Option<i64>,
    #[arg(long, help = "Upper bound of monthly income")]
    income_max: Option<i64>,
    #[arg(long, help = "Onboarding bracket such as 15000-30000 or 50000+")]
    monthly_range: Option<String>,
    #[arg(long)]
    rent: Option<i64>,
    #[arg(long)]
    emi: Option<i64>,
    #[arg(long)]
    loans: Option<i64>,
    #[arg(long, help = "Current emergency buffer in rupees")]
    buffer: Option<i64>,
    #[command(flatten)]
    policy: PolicyArgs,
}

#[derive(Args, Debug)]
struct SimulateArgs {
    #[arg(long, value_enum, default_value_t = CliScenario::Purchase)]
    scenario: CliScenario,
    #[arg(long)]
    amount: Option<i64>,
    #[arg(long, value_enum)]
    timing: Option<CliTiming>,
    #[arg(long)]
    weeks: Option<i64>,
    #[arg(long)]
    drop_percent: Option<i64>,
    #[arg(long)]
    months: Option<i64>,
    #[arg(long, value_enum)]
    gig_type: Option<CliGigType>,
    #[arg(long)]
    hours: Option<i64>,
    #[arg(long, help = "Rebase timelines onto this starting buffer")]
    starting_buffer: Option<i64>,
}

#[derive(Args, Debug)]
struct CoachArgs {
    #[arg(help = "Question to ask; omit for the greeting")]
    question: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClassifyReport {
    #[serde(flatten)]
    classification: ClassifyResponse,
    buffer: BufferStatus,
}

fn profile_payload(args: &ClassifyArgs) -> ProfilePayload {
    ProfilePayload {
        primary_income: Some(args.primary_income.clone()),
        income_min: args.income_min,
        income_max: args.income_max,
        monthly_range: args.monthly_range.clone(),
        rent: args.rent,
        emi: args.emi,
        loans: args.loans,
        emergency_buffer_amount: args.buffer,
        ..ProfilePayload::default()
    }
}

fn simulate_payload(args: &SimulateArgs) -> SimulatePayload {
    SimulatePayload {
        scenario: Some(args.scenario.into()),
        amount: args.amount,
        timing: args.timing.map(Into::into),
        weeks: args.weeks,
        drop_percent: args.drop_percent,
        months: args.months,
        gig_type: args.gig_type.map(Into::into),
        hours: args.hours,
        starting_buffer: args.starting_buffer,
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => {
            let config = ServerConfig {
                host: args.host,
                port: args.port,
                policy: ExpensePolicy::from(&args.policy),
                news: args.news.into(),
            };
            run_http_server(config).await?;
        }
        Command::Classify(args) => {
            let profile = profile_from_payload(profile_payload(&args)).map_err(|e| anyhow!(e))?;
            let classification = classify_with_policy(&profile, ExpensePolicy::from(&args.policy))?;
            let buffer = buffer_status(&profile, &classification);
            print_json(&ClassifyReport {
                classification: build_classify_response(classification),
                buffer,
            })?;
        }
        Command::Simulate(args) => {
            let request =
                simulate_request_from_payload(simulate_payload(&args)).map_err(|e| anyhow!(e))?;
            print_json(&run_simulation(&request)?)?;
        }
        Command::Coach(args) => {
            let question = args.question.join(" ");
            let book = CoachBook::default();
            if question.trim().is_empty() {
                print_json(&book.greeting("there"))?;
            } else {
                print_json(book.reply(&question))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{IncomeRange, ScenarioConfig};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments should parse")
    }

    #[test]
    fn serve_defaults() {
        let cli = parse(&["gigcoach", "serve"]);
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.host, "0.0.0.0");
        assert_eq!(args.port, 8080);
        assert_eq!(ExpensePolicy::from(&args.policy), ExpensePolicy::default());
        let news = NewsConfig::from(args.news);
        assert_eq!(news.cache_ttl, Duration::from_secs(60));
        assert_eq!(news.timeout, Duration::from_secs(10));
        assert_eq!(news.language, "en");
    }

    #[test]
    fn classify_flags_build_profile() {
        let cli = parse(&[
            "gigcoach",
            "classify",
            "--monthly-range",
            "15000-30000",
            "--rent",
            "12000",
            "--emi",
            "8000",
            "--loans",
            "3000",
            "--buffer",
            "45000",
        ]);
        let Command::Classify(args) = cli.command else {
            panic!("expected classify");
        };
        let profile = profile_from_payload(profile_payload(&args)).expect("valid profile");
        assert_eq!(
            profile.monthly_income_range,
            Some(IncomeRange {
                min: 15_000,
                max: 30_000
            })
        );
        assert_eq!(profile.emergency_buffer_amount, Some(45_000));
    }

    #[test]
    fn simulate_flags_use_value_enums() {
        let cli = parse(&[
            "gigcoach",
            "simulate",
            "--scenario",
            "new-gig",
            "--gig-type",
            "delivery",
            "--hours",
            "10",
        ]);
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        let request = simulate_request_from_payload(simulate_payload(&args)).expect("valid");
        assert_eq!(
            request.config,
            ScenarioConfig::NewGig {
                gig_type: GigType::Delivery,
                hours: 10
            }
        );
    }

    #[test]
    fn timing_accepts_wire_names() {
        let cli = parse(&["gigcoach", "simulate", "--timing", "2weeks"]);
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.timing, Some(CliTiming::TwoWeeks));
    }

    #[test]
    fn unknown_scenario_is_rejected() {
        assert!(Cli::try_parse_from(["gigcoach", "simulate", "--scenario", "lottery"]).is_err());
    }

    #[test]
    fn coach_joins_question_words() {
        let cli = parse(&["gigcoach", "coach", "Can", "I", "afford", "a", "week", "off?"]);
        let Command::Coach(args) = cli.command else {
            panic!("expected coach");
        };
        let reply = CoachBook::default().reply(&args.question.join(" ")).clone();
        assert!(reply.recommendation.starts_with("You can take a week off"));
    }
}

pub mod news;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Json, Path, Query, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::core::{
    Alert, BufferStatus, Classification, CoachBook, CoachReply, CoreError, ExpensePolicy, GigType,
    IncomeRange, MENTORS, Mentor, Outcome, Profile, PurchaseTiming, QUICK_SUGGESTIONS,
    ScenarioConfig, ScenarioKind, TierInfo, buffer_status, classify_with_policy, demo_signals,
    find_mentor, generate_alerts, mentor_reply, simulate, simulate_from_buffer,
};
use news::{NewsConfig, NewsItem, NewsParams, NewsQuery, NewsService};

/// Onboarding fallbacks used when a profile omits a monthly obligation.
pub const DEFAULT_RENT: u64 = 12_000;
pub const DEFAULT_EMI: u64 = 8_000;
pub const DEFAULT_LOANS: u64 = 3_000;
pub const DEFAULT_PRIMARY_INCOME: &str = "other";
const DEFAULT_COACH_NAME: &str = "Amit";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub policy: ExpensePolicy,
    pub news: NewsConfig,
}

pub struct AppState {
    policy: ExpensePolicy,
    coach: CoachBook,
    news: NewsService,
}

impl AppState {
    pub fn new(policy: ExpensePolicy, news: NewsConfig) -> Result<Self, news::NewsError> {
        Ok(Self {
            policy,
            coach: CoachBook::default(),
            news: NewsService::new(news)?,
        })
    }
}

type SharedState = Arc<AppState>;

#[derive(Copy, Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RangePayload {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfilePayload {
    pub primary_income: Option<String>,
    pub monthly_income_range: Option<RangePayload>,
    pub income_min: Option<i64>,
    pub income_max: Option<i64>,
    pub monthly_range: Option<String>,
    pub rent: Option<i64>,
    pub emi: Option<i64>,
    pub loans: Option<i64>,
    pub emergency_buffer: Option<String>,
    pub emergency_buffer_amount: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulatePayload {
    pub scenario: Option<ScenarioKind>,
    pub amount: Option<i64>,
    pub timing: Option<PurchaseTiming>,
    pub weeks: Option<i64>,
    pub drop_percent: Option<i64>,
    pub months: Option<i64>,
    #[serde(alias = "type")]
    pub gig_type: Option<GigType>,
    pub hours: Option<i64>,
    pub starting_buffer: Option<i64>,
}

#[derive(Debug, PartialEq)]
pub struct SimulateRequest {
    pub kind: ScenarioKind,
    pub config: ScenarioConfig,
    pub starting_buffer: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CoachPayload {
    question: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CoachGreetingParams {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MentorMessagePayload {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyResponse {
    #[serde(flatten)]
    classification: Classification,
    tier_info: TierInfo,
    next_tier: Option<TierInfo>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateResponse {
    scenario: ScenarioKind,
    label: &'static str,
    starting_buffer: Option<u64>,
    outcomes: Vec<Outcome>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardResponse {
    classification: ClassifyResponse,
    buffer: BufferStatus,
    alerts: Vec<Alert>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CoachIntroResponse {
    greeting: CoachReply,
    quick_suggestions: [&'static str; 4],
}

#[derive(Debug, Serialize)]
struct MentorResponse {
    mentor: &'static Mentor,
    greeting: String,
}

#[derive(Debug, Serialize)]
struct MentorMessageResponse {
    role: &'static str,
    text: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewsResponse {
    ok: bool,
    from_cache: bool,
    data: Vec<NewsItem>,
}

#[derive(Debug, Serialize)]
struct NewsErrorResponse {
    ok: bool,
    error: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn non_negative(name: &str, value: i64) -> Result<u64, String> {
    u64::try_from(value).map_err(|_| format!("{name} must be >= 0"))
}

fn small_count(name: &str, value: i64) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("{name} is out of range"))
}

/// Parses an onboarding bracket such as `"15000-30000"`, `"₹5,000-₹15,000"` or `"50000+"`.
pub fn parse_monthly_range(raw: &str) -> Result<IncomeRange, String> {
    let digits = |part: &str| -> Result<u64, String> {
        let cleaned: String = part.chars().filter(char::is_ascii_digit).collect();
        cleaned
            .parse::<u64>()
            .map_err(|_| format!("monthlyRange {raw:?} is not a recognised bracket"))
    };

    match raw.split_once('-') {
        Some((lo, hi)) => Ok(IncomeRange {
            min: digits(lo)?,
            max: digits(hi)?,
        }),
        None => {
            // Open-ended brackets ("50000+") use their floor as the point estimate.
            let floor = digits(raw)?;
            Ok(IncomeRange {
                min: floor,
                max: floor,
            })
        }
    }
}

/// A single reported bound stands in for the missing one.
fn income_bounds(
    (min_name, min): (&str, Option<i64>),
    (max_name, max): (&str, Option<i64>),
) -> Result<IncomeRange, String> {
    let min = min.or(max).unwrap_or_default();
    let max = max.unwrap_or(min);
    Ok(IncomeRange {
        min: non_negative(min_name, min)?,
        max: non_negative(max_name, max)?,
    })
}

pub fn profile_from_payload(payload: ProfilePayload) -> Result<Profile, String> {
    let mut profile = Profile {
        primary_income: DEFAULT_PRIMARY_INCOME.to_string(),
        monthly_income_range: None,
        rent: DEFAULT_RENT,
        emi: DEFAULT_EMI,
        loans: DEFAULT_LOANS,
        emergency_buffer_amount: None,
    };

    if let Some(v) = payload.primary_income.filter(|s| !s.trim().is_empty()) {
        profile.primary_income = v;
    }

    let nested = payload
        .monthly_income_range
        .filter(|range| range.min.is_some() || range.max.is_some());
    if let Some(range) = nested {
        profile.monthly_income_range = Some(income_bounds(
            ("monthlyIncomeRange.min", range.min),
            ("monthlyIncomeRange.max", range.max),
        )?);
    } else if payload.income_min.is_some() || payload.income_max.is_some() {
        profile.monthly_income_range = Some(income_bounds(
            ("incomeMin", payload.income_min),
            ("incomeMax", payload.income_max),
        )?);
    } else if let Some(raw) = payload.monthly_range.filter(|s| !s.trim().is_empty()) {
        profile.monthly_income_range = Some(parse_monthly_range(&raw)?);
    }

    if let Some(v) = payload.rent {
        profile.rent = non_negative("rent", v)?;
    }
    if let Some(v) = payload.emi {
        profile.emi = non_negative("emi", v)?;
    }
    if let Some(v) = payload.loans {
        profile.loans = non_negative("loans", v)?;
    }

    let declined_buffer = payload
        .emergency_buffer
        .as_deref()
        .is_some_and(|s| s.eq_ignore_ascii_case("no"));
    if !declined_buffer {
        if let Some(v) = payload.emergency_buffer_amount {
            profile.emergency_buffer_amount = Some(non_negative("emergencyBufferAmount", v)?);
        }
    }

    Ok(profile)
}

pub fn simulate_request_from_payload(payload: SimulatePayload) -> Result<SimulateRequest, String> {
    let kind = payload.scenario.unwrap_or(ScenarioKind::Purchase);
    let mut config = ScenarioConfig::default_for(kind);

    match &mut config {
        ScenarioConfig::Purchase { amount, timing } => {
            if let Some(v) = payload.amount {
                *amount = non_negative("amount", v)?;
            }
            if let Some(v) = payload.timing {
                *timing = v;
            }
        }
        ScenarioConfig::WeekOff { weeks } => {
            if let Some(v) = payload.weeks {
                *weeks = small_count("weeks", v)?;
            }
        }
        ScenarioConfig::IncomeDrop {
            drop_percent,
            months,
        } => {
            if let Some(v) = payload.drop_percent {
                *drop_percent = small_count("dropPercent", v)?;
            }
            if let Some(v) = payload.months {
                *months = small_count("months", v)?;
            }
        }
        ScenarioConfig::NewGig { gig_type, hours } => {
            if let Some(v) = payload.gig_type {
                *gig_type = v;
            }
            if let Some(v) = payload.hours {
                *hours = small_count("hours", v)?;
            }
        }
    }

    let starting_buffer = payload
        .starting_buffer
        .map(|v| non_negative("startingBuffer", v))
        .transpose()?;

    Ok(SimulateRequest {
        kind,
        config,
        starting_buffer,
    })
}

pub fn build_classify_response(classification: Classification) -> ClassifyResponse {
    let tier = classification.tier;
    ClassifyResponse {
        classification,
        tier_info: tier.into(),
        next_tier: tier.next().map(TierInfo::from),
    }
}

pub fn run_simulation(request: &SimulateRequest) -> Result<SimulateResponse, CoreError> {
    let outcomes = match request.starting_buffer {
        Some(buffer) => simulate_from_buffer(request.kind, &request.config, buffer)?,
        None => simulate(request.kind, &request.config)?,
    };
    tracing::debug!(scenario = ?request.kind, "scenario simulated");
    Ok(SimulateResponse {
        scenario: request.kind,
        label: request.kind.label(),
        starting_buffer: request.starting_buffer,
        outcomes: outcomes.into(),
    })
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/classify",
            get(classify_get_handler).post(classify_post_handler),
        )
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .route("/api/dashboard", post(dashboard_handler))
        .route("/api/coach", get(coach_intro_handler).post(coach_handler))
        .route("/api/mentors", get(mentors_handler))
        .route("/api/mentors/:id", get(mentor_handler))
        .route("/api/mentors/:id/messages", post(mentor_message_handler))
        .route("/api/news", get(news_handler))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_http_server(config: ServerConfig) -> std::io::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    if config.news.api_key.is_none() {
        tracing::warn!("NEWS_API_KEY is not set; /api/news will answer 500");
    }
    let state = AppState::new(config.policy, config.news).map_err(std::io::Error::other)?;
    let state = Arc::new(state);
    let app = build_router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("gigcoach HTTP API listening on http://{addr}");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn classify_get_handler(
    State(state): State<SharedState>,
    Query(payload): Query<ProfilePayload>,
) -> Response {
    classify_handler_impl(&state, payload)
}

async fn classify_post_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ProfilePayload>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(payload)) => classify_handler_impl(&state, payload),
        Err(rejection) => rejection_response(&rejection),
    }
}

fn classify_handler_impl(state: &AppState, payload: ProfilePayload) -> Response {
    let profile = match profile_from_payload(payload) {
        Ok(profile) => profile,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    match classify_with_policy(&profile, state.policy) {
        Ok(classification) => {
            tracing::debug!(
                tier = classification.tier.level(),
                ratio = classification.ratio,
                "profile classified"
            );
            json_response(StatusCode::OK, build_classify_response(classification))
        }
        Err(e) => core_error_response(&e),
    }
}

async fn simulate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_handler_impl(payload)
}

async fn simulate_post_handler(payload: Result<Json<SimulatePayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => simulate_handler_impl(payload),
        Err(rejection) => rejection_response(&rejection),
    }
}

fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let request = match simulate_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    match run_simulation(&request) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(e) => core_error_response(&e),
    }
}

async fn dashboard_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ProfilePayload>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(&rejection),
    };
    let profile = match profile_from_payload(payload) {
        Ok(profile) => profile,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    let classification = match classify_with_policy(&profile, state.policy) {
        Ok(classification) => classification,
        Err(e) => return core_error_response(&e),
    };

    let buffer = buffer_status(&profile, &classification);
    let alerts = generate_alerts(classification.tier, &demo_signals());
    json_response(
        StatusCode::OK,
        DashboardResponse {
            classification: build_classify_response(classification),
            buffer,
            alerts,
        },
    )
}

async fn coach_intro_handler(
    State(state): State<SharedState>,
    Query(params): Query<CoachGreetingParams>,
) -> Response {
    let name = params
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_COACH_NAME.to_string());
    json_response(
        StatusCode::OK,
        CoachIntroResponse {
            greeting: state.coach.greeting(&name),
            quick_suggestions: QUICK_SUGGESTIONS,
        },
    )
}

async fn coach_handler(
    State(state): State<SharedState>,
    payload: Result<Json<CoachPayload>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(&rejection),
    };
    if payload.question.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "question must not be empty");
    }
    json_response(StatusCode::OK, state.coach.reply(&payload.question))
}

async fn mentors_handler() -> Response {
    json_response(StatusCode::OK, &MENTORS)
}

async fn mentor_handler(Path(id): Path<String>) -> Response {
    match find_mentor(&id) {
        Some(mentor) => json_response(
            StatusCode::OK,
            MentorResponse {
                mentor,
                greeting: mentor.greeting(),
            },
        ),
        None => error_response(StatusCode::NOT_FOUND, &format!("unknown mentor {id}")),
    }
}

async fn mentor_message_handler(
    Path(id): Path<String>,
    payload: Result<Json<MentorMessagePayload>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(&rejection),
    };
    if payload.text.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "text must not be empty");
    }
    json_response(
        StatusCode::OK,
        MentorMessageResponse {
            role: "expert",
            text: mentor_reply(&id),
        },
    )
}

async fn news_handler(
    State(state): State<SharedState>,
    Query(params): Query<NewsParams>,
) -> Response {
    let result = match NewsQuery::try_from(params) {
        Ok(query) => state.news.lookup(&query).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(lookup) => json_response(
            StatusCode::OK,
            NewsResponse {
                ok: true,
                from_cache: lookup.from_cache,
                data: lookup.items,
            },
        ),
        Err(e) => {
            let status = e.status_code();
            if status.is_server_error() {
                tracing::warn!(error = %e, "news lookup failed");
            }
            json_response(
                status,
                NewsErrorResponse {
                    ok: false,
                    error: e.to_string(),
                },
            )
        }
    }
}

fn core_error_response(err: &CoreError) -> Response {
    let status = match err {
        CoreError::InvalidProfile(_) | CoreError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
        CoreError::DivisionByZero => StatusCode::UNPROCESSABLE_ENTITY,
        CoreError::BrokenLadder { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, &err.to_string())
}

fn rejection_response(rejection: &JsonRejection) -> Response {
    error_response(StatusCode::BAD_REQUEST, &rejection.body_text())
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionSourceKind {
    Database,
    Remote,
}

impl std::str::FromStr for QuestionSourceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "database" | "db" => Ok(Self::Database),
            "remote" => Ok(Self::Remote),
            other => Err(format!("unknown question source '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub public_rps: u32,
    pub max_quiz_questions: usize,
    pub question_source: QuestionSourceKind,
    pub ai_service_url: Option<String>,
    pub cors_origin: Option<String>,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let (question_source, ai_service_url) = resolve_question_source(
            env::var("QUESTION_SOURCE").ok().as_deref(),
            env::var("AI_SERVICE_URL").ok(),
        )?;

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            database_max_connections: get_env_parse_or("DATABASE_MAX_CONNECTIONS", 10)?,
            jwt_secret: get_env("JWT_SECRET")?,
            public_rps: get_env_parse("PUBLIC_RPS")?,
            max_quiz_questions: get_env_parse_or("MAX_QUIZ_QUESTIONS", 10)?,
            question_source,
            ai_service_url,
            cors_origin: env::var("CORS_ORIGIN").ok().filter(|o| !o.is_empty()),
        })
    }
}

/// Picks the question source; the remote one needs the AI service URL.
fn resolve_question_source(
    source: Option<&str>,
    ai_service_url: Option<String>,
) -> Result<(QuestionSourceKind, Option<String>)> {
    let question_source = match source {
        Some(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for QUESTION_SOURCE: {}", e)))?,
        None => QuestionSourceKind::Database,
    };
    let ai_service_url = ai_service_url
        .map(|u| u.trim().trim_end_matches('/').to_string())
        .filter(|u| !u.is_empty());

    if question_source == QuestionSourceKind::Remote && ai_service_url.is_none() {
        return Err(Error::Config(
            "AI_SERVICE_URL is required when QUESTION_SOURCE=remote".to_string(),
        ));
    }
    Ok((question_source, ai_service_url))
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse<T>(name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get_env(name)?;
    raw.parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(_) => get_env_parse(name),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}

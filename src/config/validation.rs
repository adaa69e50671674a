use crate::config::types::{BrowserConfig, Config, CrawlerConfig, HttpConfig, LimitsConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_http_config(&config.http)?;
    validate_browser_config(&config.browser)?;
    validate_crawler_config(&config.crawler)?;
    validate_limits_config(&config.limits)?;
    Ok(())
}

/// Validates static fetch configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    validate_user_agent("http.user-agent", &config.user_agent)?;
    validate_timeout("http.robots-timeout-secs", config.robots_timeout_secs)?;
    validate_timeout("http.fetch-timeout-secs", config.fetch_timeout_secs)?;
    Ok(())
}

/// Validates headless browser configuration
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    validate_user_agent("browser.user-agent", &config.user_agent)?;
    validate_timeout("browser.page-load-timeout-secs", config.page_load_timeout_secs)?;
    validate_timeout("browser.dom-wait-secs", config.dom_wait_secs)?;

    // A zero settle delay is allowed: it simply captures right after DOM-ready

    if config.window_width == 0 || config.window_height == 0 {
        return Err(ConfigError::Validation(format!(
            "browser window size must be non-zero, got {}x{}",
            config.window_width, config.window_height
        )));
    }

    if let Some(executable) = &config.executable {
        if executable.trim().is_empty() {
            return Err(ConfigError::Validation(
                "browser.executable cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates crawl orchestration configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 16 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-fetches must be between 1 and 16, got {}",
            config.max_concurrent_fetches
        )));
    }

    if config.default_linked_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "default-linked-pages must be >= 1, got {}",
            config.default_linked_pages
        )));
    }

    Ok(())
}

/// Validates default extraction limits
fn validate_limits_config(config: &LimitsConfig) -> Result<(), ConfigError> {
    let limits = [
        ("headings", config.headings),
        ("links", config.links),
        ("paragraphs", config.paragraphs),
        ("images", config.images),
        ("videos", config.videos),
    ];

    for (name, value) in limits {
        if value < 1 {
            return Err(ConfigError::Validation(format!(
                "limits.{} must be >= 1, got {}",
                name, value
            )));
        }
    }

    Ok(())
}

fn validate_timeout(key: &str, secs: u64) -> Result<(), ConfigError> {
    if secs < 1 {
        return Err(ConfigError::Validation(format!(
            "{} must be >= 1 second, got {}",
            key, secs
        )));
    }
    Ok(())
}

fn validate_user_agent(key: &str, user_agent: &str) -> Result<(), ConfigError> {
    if user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", key)));
    }

    if user_agent.chars().any(|c| c.is_control()) {
        return Err(ConfigError::Validation(format!(
            "{} must not contain control characters",
            key
        )));
    }

    Ok(())
}

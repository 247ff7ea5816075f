#![forbid(unsafe_code)]

//! Navigation and contact-delivery configuration.
//!
//! Defaults match the site's navigation bar: an 80px fixed bar, sections that
//! count as reached within 100px of the viewport top, a backdrop that appears
//! after 50px of scrolling, and 800ms ease-in-out-quart link scrolling.
//!
//! Values can be overridden from the environment at the page boundary. Each
//! loader takes a lookup function so tests never touch the process environment.
//!
//! | variable                        | field                  |
//! |---------------------------------|------------------------|
//! | `PAGENAV_ACTIVATION_THRESHOLD`  | `activation_threshold` |
//! | `PAGENAV_SCROLLED_THRESHOLD`    | `scrolled_threshold`   |
//! | `PAGENAV_NAV_OFFSET`            | `nav_offset`           |
//! | `PAGENAV_SCROLL_DURATION_MS`    | `scroll_duration`      |
//! | `PAGENAV_EASING`                | `easing`               |
//! | `PAGENAV_REVEAL_AMOUNT`         | `reveal_amount`        |

use core::time::Duration;

use pagenav_core::animation::EasingKind;

pub const ENV_ACTIVATION_THRESHOLD: &str = "PAGENAV_ACTIVATION_THRESHOLD";
pub const ENV_SCROLLED_THRESHOLD: &str = "PAGENAV_SCROLLED_THRESHOLD";
pub const ENV_NAV_OFFSET: &str = "PAGENAV_NAV_OFFSET";
pub const ENV_SCROLL_DURATION_MS: &str = "PAGENAV_SCROLL_DURATION_MS";
pub const ENV_EASING: &str = "PAGENAV_EASING";
pub const ENV_REVEAL_AMOUNT: &str = "PAGENAV_REVEAL_AMOUNT";

pub const ENV_EMAIL_SERVICE_ID: &str = "PAGENAV_EMAIL_SERVICE_ID";
pub const ENV_EMAIL_TEMPLATE_ID: &str = "PAGENAV_EMAIL_TEMPLATE_ID";
pub const ENV_EMAIL_PUBLIC_KEY: &str = "PAGENAV_EMAIL_PUBLIC_KEY";
pub const ENV_EMAIL_TO: &str = "PAGENAV_EMAIL_TO";

/// How long the contact form shows its "sent" state before resetting.
pub const SUBMITTED_DISPLAY: Duration = Duration::from_millis(3000);

/// A malformed configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// Variable name.
    pub name: &'static str,
    /// The rejected value.
    pub value: String,
    /// What was expected.
    pub expected: &'static str,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}={:?} is invalid: expected {}",
            self.name, self.value, self.expected
        )
    }
}

impl std::error::Error for ConfigError {}

/// Navigation tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct NavConfig {
    /// A section becomes active once its top edge is within this many pixels
    /// of the viewport top.
    pub activation_threshold: f64,
    /// `is_scrolled` turns on once the scroll offset exceeds this.
    pub scrolled_threshold: f64,
    /// Height of the fixed navigation bar; link scrolling stops this far above
    /// the target section.
    pub nav_offset: f64,
    /// Duration of link-driven scrolling.
    pub scroll_duration: Duration,
    /// Easing curve of link-driven scrolling.
    pub easing: EasingKind,
    /// Visible fraction that reveals a section.
    pub reveal_amount: f64,
    /// Per-section visible fractions that replace `reveal_amount`.
    pub reveal_overrides: Vec<(String, f64)>,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            activation_threshold: 100.0,
            scrolled_threshold: 50.0,
            nav_offset: 80.0,
            scroll_duration: Duration::from_millis(800),
            easing: EasingKind::EaseInOutQuart,
            reveal_amount: 0.2,
            reveal_overrides: vec![("about".to_string(), 0.1)],
        }
    }
}

impl NavConfig {
    /// Set the activation threshold (builder).
    #[must_use]
    pub fn activation_threshold(mut self, px: f64) -> Self {
        self.activation_threshold = px;
        self
    }

    /// Set the scrolled-backdrop threshold (builder).
    #[must_use]
    pub fn scrolled_threshold(mut self, px: f64) -> Self {
        self.scrolled_threshold = px;
        self
    }

    /// Set the navigation bar offset (builder).
    #[must_use]
    pub fn nav_offset(mut self, px: f64) -> Self {
        self.nav_offset = px;
        self
    }

    /// Set the link-scroll duration (builder).
    #[must_use]
    pub fn scroll_duration(mut self, duration: Duration) -> Self {
        self.scroll_duration = duration;
        self
    }

    /// Set the link-scroll easing (builder).
    #[must_use]
    pub fn easing(mut self, easing: EasingKind) -> Self {
        self.easing = easing;
        self
    }

    /// Set the reveal visibility fraction (builder).
    #[must_use]
    pub fn reveal_amount(mut self, amount: f64) -> Self {
        self.reveal_amount = amount;
        self
    }

    /// Reveal section `id` at `amount` instead of `reveal_amount` (builder).
    #[must_use]
    pub fn reveal_amount_for(mut self, id: impl Into<String>, amount: f64) -> Self {
        let id = id.into();
        self.reveal_overrides.retain(|(key, _)| *key != id);
        self.reveal_overrides.push((id, amount));
        self
    }

    /// Visible fraction that reveals section `id`.
    #[must_use]
    pub fn reveal_amount_of(&self, id: &str) -> f64 {
        self.reveal_overrides
            .iter()
            .find(|(key, _)| key == id)
            .map_or(self.reveal_amount, |(_, amount)| *amount)
    }

    /// Defaults overridden by `PAGENAV_*` process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(px) = lookup_f64(&lookup, ENV_ACTIVATION_THRESHOLD)? {
            config.activation_threshold = px;
        }
        if let Some(px) = lookup_f64(&lookup, ENV_SCROLLED_THRESHOLD)? {
            config.scrolled_threshold = px;
        }
        if let Some(px) = lookup_f64(&lookup, ENV_NAV_OFFSET)? {
            config.nav_offset = px;
        }
        if let Some(ms) = lookup_string(&lookup, ENV_SCROLL_DURATION_MS) {
            let ms = ms.parse::<u64>().map_err(|_| ConfigError {
                name: ENV_SCROLL_DURATION_MS,
                value: ms.clone(),
                expected: "a whole number of milliseconds",
            })?;
            config.scroll_duration = Duration::from_millis(ms);
        }
        if let Some(name) = lookup_string(&lookup, ENV_EASING) {
            config.easing = EasingKind::parse(&name).ok_or(ConfigError {
                name: ENV_EASING,
                value: name.clone(),
                expected: "an easing name such as ease_in_out_quart",
            })?;
        }
        if let Some(amount) = lookup_f64(&lookup, ENV_REVEAL_AMOUNT)? {
            if !(0.0..=1.0).contains(&amount) {
                return Err(ConfigError {
                    name: ENV_REVEAL_AMOUNT,
                    value: amount.to_string(),
                    expected: "a fraction between 0 and 1",
                });
            }
            config.reveal_amount = amount;
        }
        Ok(config)
    }
}

/// Outbound message delivery settings for the contact form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContactConfig {
    /// Delivery service id.
    pub service_id: String,
    /// Message template id.
    pub template_id: String,
    /// Public key identifying the sender account.
    pub public_key: String,
    /// Recipient address.
    pub to_email: String,
}

impl ContactConfig {
    /// Read the `PAGENAV_EMAIL_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the `PAGENAV_EMAIL_*` variables through `lookup`. Missing values
    /// stay empty; [`ContactConfig::missing`] reports them.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            service_id: lookup_string(&lookup, ENV_EMAIL_SERVICE_ID).unwrap_or_default(),
            template_id: lookup_string(&lookup, ENV_EMAIL_TEMPLATE_ID).unwrap_or_default(),
            public_key: lookup_string(&lookup, ENV_EMAIL_PUBLIC_KEY).unwrap_or_default(),
            to_email: lookup_string(&lookup, ENV_EMAIL_TO).unwrap_or_default(),
        }
    }

    /// The first required variable that is unset, if any.
    #[must_use]
    pub fn missing(&self) -> Option<&'static str> {
        [
            (ENV_EMAIL_SERVICE_ID, &self.service_id),
            (ENV_EMAIL_TEMPLATE_ID, &self.template_id),
            (ENV_EMAIL_PUBLIC_KEY, &self.public_key),
            (ENV_EMAIL_TO, &self.to_email),
        ]
        .into_iter()
        .find(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
    }
}

fn lookup_string<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn lookup_f64<F>(lookup: &F, name: &'static str) -> Result<Option<f64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup_string(lookup, name) else {
        return Ok(None);
    };
    match value.parse::<f64>() {
        Ok(px) if px.is_finite() => Ok(Some(px)),
        _ => Err(ConfigError {
            name,
            value,
            expected: "a finite number",
        }),
    }
}

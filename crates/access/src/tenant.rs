//! Tenants and the tenant registry.

use chrono::{DateTime, Utc};
use civic_core::config::Secret;
use civic_core::{AppError, AppResult, TenantConfig};
use serde::Serialize;
use std::collections::BTreeMap;

/// Inclusive activation window. A missing bound is open on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActiveWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl ActiveWindow {
    /// Build a window, rejecting `start > end`. Returns `None` when both
    /// bounds are absent.
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> AppResult<Option<Self>> {
        match (start, end) {
            (None, None) => Ok(None),
            (Some(s), Some(e)) if s > e => Err(AppError::Config(format!(
                "activation window starts after it ends ({} > {})",
                s.to_rfc3339(),
                e.to_rfc3339()
            ))),
            _ => Ok(Some(Self { start, end })),
        }
    }

    /// True when `now` lies in `[start, end]`.
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| now >= start) && self.end.map_or(true, |end| now <= end)
    }
}

/// A validated tenant ("city").
#[derive(Debug, Clone)]
pub struct Tenant {
    key: String,
    persona_name: String,
    token: Secret,
    window: Option<ActiveWindow>,
}

impl Tenant {
    /// Build a tenant.
    ///
    /// The key is canonicalized to lower case and doubles as the corpus
    /// directory name, so it is restricted to ASCII letters, digits, `-` and
    /// `_`. The token and persona name must be non-empty.
    pub fn new(
        key: &str,
        persona_name: impl Into<String>,
        token: Secret,
        window: Option<ActiveWindow>,
    ) -> AppResult<Self> {
        let key = key.trim();
        if key.is_empty() {
            return Err(AppError::Config("tenant key cannot be empty".to_string()));
        }
        if !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(AppError::Config(format!(
                "tenant key '{}' may only contain letters, digits, '-' and '_'",
                key
            )));
        }

        let persona_name = persona_name.into();
        if persona_name.trim().is_empty() {
            return Err(AppError::Config(format!(
                "tenant '{}' has no personaName",
                key
            )));
        }

        if token.is_empty() {
            return Err(AppError::Config(format!("tenant '{}' has no token", key)));
        }

        Ok(Self {
            key: key.to_ascii_lowercase(),
            persona_name: persona_name.trim().to_string(),
            token,
            window,
        })
    }

    /// Build a tenant from its config.yaml entry.
    pub fn from_config(key: &str, config: &TenantConfig) -> AppResult<Self> {
        let window = ActiveWindow::new(config.window_start, config.window_end)
            .map_err(|e| AppError::Config(format!("tenant '{}': {}", key, e)))?;
        Self::new(key, config.persona_name.clone(), config.token.clone(), window)
    }

    /// Canonical (lower-case) key.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn persona_name(&self) -> &str {
        &self.persona_name
    }

    pub fn window(&self) -> Option<&ActiveWindow> {
        self.window.as_ref()
    }

    pub(crate) fn token(&self) -> &Secret {
        &self.token
    }

    /// True when the tenant has no window or `now` falls inside it.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.window.map_or(true, |w| w.contains(now))
    }
}

/// Immutable set of tenants, looked up case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct TenantRegistry {
    tenants: BTreeMap<String, Tenant>,
}

impl TenantRegistry {
    /// Build a registry, rejecting keys that collide once lower-cased.
    pub fn new(tenants: impl IntoIterator<Item = Tenant>) -> AppResult<Self> {
        let mut map = BTreeMap::new();
        for tenant in tenants {
            let key = tenant.key().to_string();
            if map.insert(key.clone(), tenant).is_some() {
                return Err(AppError::Config(format!(
                    "tenant '{}' is configured more than once",
                    key
                )));
            }
        }
        Ok(Self { tenants: map })
    }

    /// Validate every tenant in the configuration.
    pub fn from_config(tenants: &BTreeMap<String, TenantConfig>) -> AppResult<Self> {
        let tenants = tenants
            .iter()
            .map(|(key, config)| Tenant::from_config(key, config))
            .collect::<AppResult<Vec<_>>>()?;

        tracing::debug!("Loaded {} tenants", tenants.len());
        Self::new(tenants)
    }

    /// Case-insensitive exact lookup.
    pub fn resolve(&self, key: &str) -> Option<&Tenant> {
        self.tenants.get(&key.to_lowercase())
    }

    /// Tenants in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Tenant> {
        self.tenants.values()
    }

    pub fn len(&self) -> usize {
        self.tenants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn tenant(key: &str) -> Tenant {
        Tenant::new(key, "Sparky", Secret::new("tok"), None).unwrap()
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let window = ActiveWindow::new(Some(at(2026, 1, 1)), Some(at(2026, 6, 1)))
            .unwrap()
            .unwrap();

        assert!(window.contains(at(2026, 1, 1)));
        assert!(window.contains(at(2026, 6, 1)));
        assert!(!window.contains(at(2025, 12, 31)));
        assert!(!window.contains(at(2026, 6, 2)));
    }

    #[test]
    fn test_half_open_windows() {
        let from = ActiveWindow::new(Some(at(2026, 1, 1)), None).unwrap().unwrap();
        assert!(from.contains(at(2099, 1, 1)));
        assert!(!from.contains(at(2025, 1, 1)));

        let until = ActiveWindow::new(None, Some(at(2026, 1, 1))).unwrap().unwrap();
        assert!(until.contains(at(1999, 1, 1)));
        assert!(!until.contains(at(2026, 1, 2)));
    }

    #[test]
    fn test_inverted_window_rejected() {
        assert!(ActiveWindow::new(Some(at(2026, 6, 1)), Some(at(2026, 1, 1))).is_err());
        assert!(ActiveWindow::new(None, None).unwrap().is_none());
    }

    #[test]
    fn test_tenant_requires_token() {
        let err = Tenant::new("springfield", "Sparky", Secret::default(), None).unwrap_err();
        assert!(err.to_string().contains("no token"));
    }

    #[test]
    fn test_tenant_key_is_canonicalized_and_restricted() {
        assert_eq!(tenant("Springfield").key(), "springfield");
        assert!(Tenant::new("../etc", "X", Secret::new("t"), None).is_err());
        assert!(Tenant::new("  ", "X", Secret::new("t"), None).is_err());
    }

    #[test]
    fn test_registry_lookup_is_case_insensitive() {
        let registry = TenantRegistry::new(vec![tenant("Springfield"), tenant("shelbyville")]).unwrap();

        assert_eq!(registry.resolve("SPRINGFIELD").unwrap().key(), "springfield");
        assert!(registry.resolve("shelbyville").is_some());
        assert!(registry.resolve("springfield ").is_none());
        assert!(registry.resolve("ogdenville").is_none());
    }

    #[test]
    fn test_registry_rejects_case_duplicates() {
        assert!(TenantRegistry::new(vec![tenant("Springfield"), tenant("springfield")]).is_err());
    }

    #[test]
    fn test_from_config_validates_each_tenant() {
        let mut configs = BTreeMap::new();
        configs.insert(
            "springfield".to_string(),
            TenantConfig {
                persona_name: "Sparky".to_string(),
                token: Secret::new("tok"),
                window_start: None,
                window_end: None,
            },
        );
        assert_eq!(TenantRegistry::from_config(&configs).unwrap().len(), 1);

        configs.insert(
            "ogdenville".to_string(),
            TenantConfig {
                persona_name: "Oggy".to_string(),
                token: Secret::default(),
                window_start: None,
                window_end: None,
            },
        );
        assert!(TenantRegistry::from_config(&configs).is_err());
    }
}

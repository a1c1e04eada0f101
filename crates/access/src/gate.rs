//! The access gate.

use crate::switch::AccessSwitch;
use crate::tenant::TenantRegistry;
use chrono::{DateTime, Utc};
use civic_core::config::Secret;
use civic_core::{AppConfig, AppError, AppResult};
use serde::Serialize;

/// What a successful check hands downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatePass {
    /// Canonical tenant key (also the corpus directory name)
    pub tenant_key: String,

    /// Persona the assistant speaks as for this tenant
    pub persona_name: String,
}

/// Authorizes requests against the tenant registry and the kill switch.
#[derive(Debug, Clone)]
pub struct AccessGate {
    tenants: TenantRegistry,
    switch: AccessSwitch,
    operator_credential: Option<Secret>,
}

impl AccessGate {
    pub fn new(
        tenants: TenantRegistry,
        switch: AccessSwitch,
        operator_credential: Option<Secret>,
    ) -> Self {
        if operator_credential.as_ref().map_or(true, Secret::is_empty) {
            tracing::warn!("No operator credential configured; runtime access cannot be toggled");
        }

        Self {
            tenants,
            switch,
            operator_credential: operator_credential.filter(|c| !c.is_empty()),
        }
    }

    /// Build the gate from loaded configuration, validating every tenant.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let tenants = TenantRegistry::from_config(&config.tenants)?;
        let switch = AccessSwitch::new(config.access.enabled);
        Ok(Self::new(tenants, switch, config.operator_credential.clone()))
    }

    pub fn tenants(&self) -> &TenantRegistry {
        &self.tenants
    }

    /// Read-only handle on the kill switch.
    pub fn switch(&self) -> &AccessSwitch {
        &self.switch
    }

    /// Decide whether a request may proceed.
    ///
    /// # Errors
    /// - `UnknownTenant` when no tenant matches `tenant_key`
    /// - `ServiceSuspended` when runtime access is off, or `now` is outside
    ///   the tenant's window
    /// - `InvalidToken` when the token is absent, empty or wrong
    pub fn check(
        &self,
        tenant_key: &str,
        presented_token: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<GatePass> {
        let tenant = self.tenants.resolve(tenant_key).ok_or_else(|| {
            tracing::info!(tenant = tenant_key, "Access denied: unknown tenant");
            AppError::UnknownTenant(tenant_key.to_string())
        })?;

        if !self.switch.is_enabled() {
            tracing::info!(tenant = tenant.key(), "Access denied: runtime access disabled");
            return Err(AppError::ServiceSuspended);
        }

        let token_ok = presented_token
            .filter(|t| !t.is_empty())
            .is_some_and(|t| constant_time_eq(t, tenant.token().expose()));
        if !token_ok {
            tracing::info!(tenant = tenant.key(), "Access denied: invalid token");
            return Err(AppError::InvalidToken);
        }

        if !tenant.is_active_at(now) {
            tracing::info!(
                tenant = tenant.key(),
                now = %now.to_rfc3339(),
                "Access denied: outside activation window"
            );
            return Err(AppError::ServiceSuspended);
        }

        Ok(GatePass {
            tenant_key: tenant.key().to_string(),
            persona_name: tenant.persona_name().to_string(),
        })
    }

    /// Operator action: set runtime access for every tenant.
    ///
    /// Returns the resulting state.
    pub fn set_access(&self, operator_credential: &str, enabled: bool) -> AppResult<bool> {
        let authorized = self
            .operator_credential
            .as_ref()
            .is_some_and(|expected| constant_time_eq(operator_credential, expected.expose()));

        if !authorized {
            tracing::warn!("Rejected runtime access toggle: bad operator credential");
            return Err(AppError::OperatorUnauthorized);
        }

        self.switch.set(enabled);
        tracing::info!(enabled, "Runtime access toggled by operator");
        Ok(enabled)
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff: u8 = 0;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes()) {
        diff |= x ^ y;
    }
    diff == 0
}

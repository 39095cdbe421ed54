//! Input guardrails
//!
//! A guardrail inspects raw user text before an agent acts on it. Each built-in
//! guardrail is a case-insensitive substring deny-list; the first phrase found
//! blocks the request with a fixed reason.

use std::sync::Arc;
use tracing::debug;

/// Outcome of a guardrail check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardrailOutcome {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl GuardrailOutcome {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Anything that can veto user input
pub trait Guardrail: Send + Sync {
    fn name(&self) -> &str;
    fn check(&self, input: &str) -> GuardrailOutcome;
}

/// Which built-in deny-list a guardrail uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardrailKind {
    Finance,
    Hr,
    Security,
}

impl GuardrailKind {
    fn phrases(self) -> &'static [&'static str] {
        match self {
            Self::Finance => &[
                "transfer all",
                "maximum amount",
                "bypass approval",
                "override limit",
            ],
            Self::Hr => &[
                "salary",
                "personal",
                "ssn",
                "social security",
                "health",
                "medical",
            ],
            Self::Security => &[
                "admin access",
                "override security",
                "full access",
                "system privileges",
            ],
        }
    }

    fn reason(self) -> &'static str {
        match self {
            Self::Finance => "Potentially suspicious financial request detected",
            Self::Hr => {
                "Request may involve sensitive personal information, requires additional authorization"
            }
            Self::Security => "Request may involve security-sensitive operations",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Finance => "finance",
            Self::Hr => "hr",
            Self::Security => "security",
        }
    }
}

/// Deny-list guardrail over a fixed phrase table
#[derive(Debug, Clone)]
pub struct DenyListGuardrail {
    kind: GuardrailKind,
}

impl DenyListGuardrail {
    pub fn new(kind: GuardrailKind) -> Self {
        Self { kind }
    }

    pub fn finance() -> Self {
        Self::new(GuardrailKind::Finance)
    }

    pub fn hr() -> Self {
        Self::new(GuardrailKind::Hr)
    }

    pub fn security() -> Self {
        Self::new(GuardrailKind::Security)
    }
}

impl Guardrail for DenyListGuardrail {
    fn name(&self) -> &str {
        self.kind.label()
    }

    fn check(&self, input: &str) -> GuardrailOutcome {
        let lowered = input.to_lowercase();
        match self.kind.phrases().iter().find(|p| lowered.contains(*p)) {
            Some(phrase) => {
                debug!("Guardrail '{}' matched phrase '{}'", self.name(), phrase);
                GuardrailOutcome::deny(self.kind.reason())
            }
            None => GuardrailOutcome::allow(),
        }
    }
}

/// Ordered collection of guardrails combined with logical AND
#[derive(Clone, Default)]
pub struct GuardrailSet {
    guardrails: Vec<Arc<dyn Guardrail>>,
}

impl GuardrailSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, guardrail: impl Guardrail + 'static) -> Self {
        self.guardrails.push(Arc::new(guardrail));
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.guardrails.iter().map(|g| g.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.guardrails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guardrails.is_empty()
    }

    /// First failing guardrail wins; an empty set allows everything.
    pub fn check(&self, input: &str) -> GuardrailOutcome {
        self.guardrails
            .iter()
            .map(|g| g.check(input))
            .find(|outcome| !outcome.allowed)
            .unwrap_or_else(GuardrailOutcome::allow)
    }
}

impl std::fmt::Debug for GuardrailSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

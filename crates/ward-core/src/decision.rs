//! Policy decisions and command risk classes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The governance outcome for a proposed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Run without further ceremony.
    Allow,
    /// Run, but the caller must record a justification in the audit trail.
    AllowWithJustification,
    /// A human must approve before the command runs.
    RequireApproval,
    /// Never run.
    Deny,
}

impl Decision {
    /// Stable wire string for this decision.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::AllowWithJustification => "allow_with_justification",
            Self::RequireApproval => "require_approval",
            Self::Deny => "deny",
        }
    }

    /// Check whether this decision blocks execution until a human signs off.
    #[must_use]
    pub fn needs_human(self) -> bool {
        matches!(self, Self::RequireApproval)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "allow" => Ok(Self::Allow),
            "allow_with_justification" => Ok(Self::AllowWithJustification),
            "require_approval" => Ok(Self::RequireApproval),
            "deny" => Ok(Self::Deny),
            other => Err(format!("unknown decision {other:?}")),
        }
    }
}

/// Severity tier assigned to a command by the classifier.
///
/// Tier order is fixed: a command matching both a class3 and a class0
/// pattern is class3. The most severe match always wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskClass {
    /// Read-only inspection commands.
    Class0Safe,
    /// Local, reversible write operations.
    Class1ControlledWrite,
    /// Network-mutating, service-lifecycle, or package-installing commands.
    Class2Sensitive,
    /// Destructive or privilege-escalating commands.
    Class3Critical,
}

impl RiskClass {
    /// Stable wire string for this class.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Class0Safe => "class0_safe",
            Self::Class1ControlledWrite => "class1_controlled_write",
            Self::Class2Sensitive => "class2_sensitive",
            Self::Class3Critical => "class3_critical",
        }
    }

    /// The base decision for this class, before any rule overlay.
    ///
    /// This is a total function; rules may override it but nothing may
    /// leave a class without a decision.
    #[must_use]
    pub fn default_decision(self) -> Decision {
        match self {
            Self::Class0Safe => Decision::Allow,
            Self::Class1ControlledWrite => Decision::AllowWithJustification,
            Self::Class2Sensitive => Decision::RequireApproval,
            Self::Class3Critical => Decision::Deny,
        }
    }
}

impl fmt::Display for RiskClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "class0_safe" => Ok(Self::Class0Safe),
            "class1_controlled_write" => Ok(Self::Class1ControlledWrite),
            "class2_sensitive" => Ok(Self::Class2Sensitive),
            "class3_critical" => Ok(Self::Class3Critical),
            other => Err(format!("unknown risk class {other:?}")),
        }
    }
}

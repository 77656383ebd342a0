use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Wire spelling of the unlimited sentinel.
pub const UNLIMITED: &str = "Ilimitado";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LimitParseError {
    #[error("plan limit must be a positive integer, got {0}")]
    NotPositive(i64),
    #[error("plan limit must be a positive integer or \"Ilimitado\", got {0:?}")]
    Invalid(String),
}

/// Maximum number of resources a plan allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanLimit {
    Limited(u32),
    Unlimited,
}

impl PlanLimit {
    pub fn is_unlimited(&self) -> bool {
        matches!(self, Self::Unlimited)
    }

    /// `true` while `current` is below the limit.
    pub fn allows(&self, current: u32) -> bool {
        match self {
            Self::Unlimited => true,
            Self::Limited(max) => current < *max,
        }
    }

    /// Slots left after `current`, `None` when unlimited.
    pub fn remaining(&self, current: u32) -> Option<u32> {
        match self {
            Self::Unlimited => None,
            Self::Limited(max) => Some(max.saturating_sub(current)),
        }
    }

    fn from_integer(value: i64) -> Result<Self, LimitParseError> {
        if value <= 0 {
            return Err(LimitParseError::NotPositive(value));
        }
        u32::try_from(value)
            .map(Self::Limited)
            .map_err(|_| LimitParseError::Invalid(value.to_string()))
    }
}

impl fmt::Display for PlanLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limited(max) => write!(f, "{}", max),
            Self::Unlimited => f.write_str(UNLIMITED),
        }
    }
}

impl FromStr for PlanLimit {
    type Err = LimitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(UNLIMITED) || s.eq_ignore_ascii_case("unlimited") {
            return Ok(Self::Unlimited);
        }
        // Only digits are accepted; "Ilimitado" must never become a number.
        let value = s
            .parse::<i64>()
            .map_err(|_| LimitParseError::Invalid(s.to_string()))?;
        Self::from_integer(value)
    }
}

impl Serialize for PlanLimit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Limited(max) => serializer.serialize_u32(*max),
            Self::Unlimited => serializer.serialize_str(UNLIMITED),
        }
    }
}

struct PlanLimitVisitor;

impl<'de> Visitor<'de> for PlanLimitVisitor {
    type Value = PlanLimit;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a positive integer or \"{}\"", UNLIMITED)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<PlanLimit, E> {
        PlanLimit::from_integer(value).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<PlanLimit, E> {
        let value = i64::try_from(value).map_err(|_| E::custom("plan limit out of range"))?;
        self.visit_i64(value)
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<PlanLimit, E> {
        if value.fract() != 0.0 {
            return Err(E::custom(LimitParseError::Invalid(value.to_string())));
        }
        self.visit_i64(value as i64)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<PlanLimit, E> {
        value.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for PlanLimit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PlanLimitVisitor)
    }
}

/// Plan identifier. Tenant data stores use both numeric and textual ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PlanId(pub String);

impl PlanId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlanId {
    fn from(value: &str) -> Self {
        Self(value.trim().to_string())
    }
}

impl From<u64> for PlanId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for PlanId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => PlanId::from(n),
            RawId::Text(s) => PlanId::from(s.as_str()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    #[default]
    Activo,
    Inactivo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: PlanId,
    pub nombre: String,
    #[serde(default)]
    pub precio: f64,
    pub limite_usuarios: PlanLimit,
    pub limite_propiedades: PlanLimit,
    #[serde(default)]
    pub estado: PlanStatus,
}

impl Plan {
    pub fn limit_for(&self, resource: super::Resource) -> PlanLimit {
        match resource {
            super::Resource::Users => self.limite_usuarios,
            super::Resource::Properties => self.limite_propiedades,
        }
    }
}

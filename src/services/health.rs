use std::fmt;

/// Service health status
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceHealth {
    Healthy,

    /// Running, but the last operation failed or is overdue
    Degraded(String),

    /// Not able to do its job at all
    Unhealthy(String),
}

impl ServiceHealth {
    pub fn is_healthy(&self) -> bool {
        matches!(self, ServiceHealth::Healthy)
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ServiceHealth::Degraded(_))
    }

    pub fn is_unhealthy(&self) -> bool {
        matches!(self, ServiceHealth::Unhealthy(_))
    }
}

impl fmt::Display for ServiceHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceHealth::Healthy => write!(f, "healthy"),
            ServiceHealth::Degraded(reason) => write!(f, "degraded ({})", reason),
            ServiceHealth::Unhealthy(reason) => write!(f, "unhealthy ({})", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ServiceHealth::Healthy.to_string(), "healthy");
        let degraded = ServiceHealth::Degraded("last price error".to_string());
        assert!(degraded.is_degraded());
        assert_eq!(degraded.to_string(), "degraded (last price error)");
    }
}

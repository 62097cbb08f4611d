use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Outcome label for a processed gateway notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    Accepted,
    Rejected,
    FailedStatus,
}

impl NotificationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationOutcome::Accepted => "accepted",
            NotificationOutcome::Rejected => "rejected",
            NotificationOutcome::FailedStatus => "failed_status",
        }
    }
}

#[derive(Clone)]
pub struct GatewayMetrics {
    pub registry: Registry,
    pub links_built: IntCounter,
    pub notifications: IntCounterVec,
    pub upstream_failures: IntCounter,
}

impl GatewayMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let links_built = IntCounter::new(
            "prodamus_links_built_total",
            "Signed payment links produced",
        )?;
        let notifications = IntCounterVec::new(
            Opts::new(
                "prodamus_notifications_total",
                "Gateway notifications grouped by outcome",
            ),
            &["result"],
        )?;
        let upstream_failures = IntCounter::new(
            "prodamus_upstream_failures_total",
            "Failed calls to the legacy invoice API",
        )?;
        registry.register(Box::new(links_built.clone()))?;
        registry.register(Box::new(notifications.clone()))?;
        registry.register(Box::new(upstream_failures.clone()))?;
        Ok(Self { registry, links_built, notifications, upstream_failures })
    }

    pub fn record_notification(&self, outcome: NotificationOutcome) {
        self.notifications.with_label_values(&[outcome.as_str()]).inc();
    }

    /// Prometheus text exposition of every registered metric.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

use cardiomon_common::types::Alert;
use serde::{Deserialize, Serialize};

/// Delivery priority attached to an alert description, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
            Priority::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            _ => Err(format!("unknown priority: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Annotation {
    Priority(Priority),
    Repeated(u32),
}

/// Builds an augmented description for an alert without touching the alert.
///
/// Annotations are appended in the order they are added.
///
/// # Examples
///
/// ```
/// use cardiomon_common::types::Alert;
/// use cardiomon_notify::decorator::{AlertDecoration, Priority};
///
/// let alert = Alert::new(4, "Low Saturation Alert", 1_000);
/// let decorated = AlertDecoration::new(&alert)
///     .priority(Priority::High)
///     .repeated(3)
///     .decorate();
/// assert_eq!(
///     decorated.description,
///     "Low Saturation Alert - Priority: high (Repeated 3 times)"
/// );
/// assert_eq!(decorated.alert, alert);
/// ```
#[derive(Debug, Clone)]
pub struct AlertDecoration<'a> {
    alert: &'a Alert,
    annotations: Vec<Annotation>,
}

impl<'a> AlertDecoration<'a> {
    pub fn new(alert: &'a Alert) -> Self {
        Self {
            alert,
            annotations: Vec::new(),
        }
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.annotations.push(Annotation::Priority(priority));
        self
    }

    pub fn repeated(mut self, count: u32) -> Self {
        self.annotations.push(Annotation::Repeated(count));
        self
    }

    pub fn describe(&self) -> String {
        let mut description = self.alert.condition.clone();
        for annotation in &self.annotations {
            match annotation {
                Annotation::Priority(p) => description.push_str(&format!(" - Priority: {p}")),
                Annotation::Repeated(n) => description.push_str(&format!(" (Repeated {n} times)")),
            }
        }
        description
    }

    pub fn decorate(self) -> DecoratedAlert {
        let description = self.describe();
        // last annotation of each kind wins, matching the outermost layer
        let priority = self.annotations.iter().rev().find_map(|a| match a {
            Annotation::Priority(p) => Some(*p),
            Annotation::Repeated(_) => None,
        });
        let repeat_count = self.annotations.iter().rev().find_map(|a| match a {
            Annotation::Repeated(n) => Some(*n),
            Annotation::Priority(_) => None,
        });
        DecoratedAlert {
            alert: self.alert.clone(),
            priority,
            repeat_count,
            description,
        }
    }
}

/// An alert paired with the description a channel should deliver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecoratedAlert {
    pub alert: Alert,
    pub priority: Option<Priority>,
    pub repeat_count: Option<u32>,
    pub description: String,
}

impl DecoratedAlert {
    pub fn plain(alert: &Alert) -> Self {
        AlertDecoration::new(alert).decorate()
    }
}

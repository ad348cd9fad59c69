use serde::{Deserialize, Serialize};

/// Percentage added each time the timeline advances.
pub const PROGRESS_PER_STEP: u8 = 25;

const STEPS: [(&str, &str, &str); 5] = [
    ("Order Confirmed", "We receive your order details", "Today, 10:00 AM"),
    ("Processing", "Preparing your appliance for delivery", "Today, 10:30 AM"),
    ("Quality Check", "Final inspection and packaging", "Today, 11:30 AM"),
    ("On the Way", "Out for delivery to your location", "Tomorrow, 9:00 AM"),
    ("Delivered", "At your doorstep within 2 days", "Tomorrow, 2:00 PM"),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Completed,
    Pending,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineStep {
    pub step: u8,
    pub title: String,
    pub description: String,
    pub time: String,
    pub status: StepStatus,
}

/// Delivery progress shown after an order is confirmed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryTimeline {
    pub current_step: u8,
    pub progress: u8,
}

impl Default for DeliveryTimeline {
    fn default() -> Self {
        Self::started()
    }
}

impl DeliveryTimeline {
    /// The first step is complete as soon as the order is confirmed.
    pub fn started() -> Self {
        Self { current_step: 1, progress: 0 }
    }

    /// Moves one step forward. Returns `false` once progress is at 100%.
    pub fn advance(&mut self) -> bool {
        if self.is_complete() {
            return false;
        }
        self.progress += PROGRESS_PER_STEP;
        self.current_step = self.progress / PROGRESS_PER_STEP;
        true
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= 100
    }

    pub fn steps(&self) -> Vec<TimelineStep> {
        STEPS
            .iter()
            .zip(1u8..)
            .map(|(&(title, description, time), step)| {
                let completed = match step {
                    1 => true,
                    5 => self.is_complete(),
                    _ => self.current_step >= step,
                };
                TimelineStep {
                    step,
                    title: title.to_string(),
                    description: description.to_string(),
                    time: time.to_string(),
                    status: if completed { StepStatus::Completed } else { StepStatus::Pending },
                }
            })
            .collect()
    }
}

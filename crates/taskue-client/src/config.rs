use std::time::Duration;

/// Configuration for a [`Taskue`](crate::Taskue) client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
  /// Delay between status checks in `wait_workflow` / `wait_task`.
  pub poll_interval: Duration,
  /// Page size used when the caller does not pick one.
  pub default_page_size: usize,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      poll_interval: Duration::from_secs(1),
      default_page_size: 25,
    }
  }
}

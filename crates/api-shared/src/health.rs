use crate::HealthRes;

/// Health service shared by the REST server and the runner
///
/// Reports liveness together with whether the analysis pipeline is configured.
#[derive(Clone)]
pub struct HealthService;

impl HealthService {
    /// Health snapshot for the current process
    ///
    /// # Returns
    /// A `HealthRes` with status `healthy`; the process answering is the liveness signal.
    pub fn check_health(configured: bool) -> HealthRes {
        HealthRes {
            status: "healthy".into(),
            configured,
        }
    }
}

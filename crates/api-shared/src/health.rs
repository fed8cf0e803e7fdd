use crate::HealthRes;

/// Health check shared by the REST router and the main binary.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// The helper has no external dependencies to probe, so it is healthy once it serves.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "PACS helper is alive".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_ok() {
        let res = HealthService::check_health();
        assert!(res.ok);
        assert!(res.message.contains("alive"));
    }
}

//! Status service (spec §4.10): health dashboard with letter grading,
//! critical-problem listing, and per-host health analysis.

use std::sync::Arc;

use serde::Serialize;

use crate::rest::CheckmkClient;
use crate::rest::models::Service;
use crate::rest::models::ServiceState;
use crate::services::ServiceResult;
use crate::services::from_result;

#[derive(Debug, Clone, Serialize)]
pub struct HealthDashboard {
    pub total_services: usize,
    pub ok: usize,
    pub warn: usize,
    pub crit: usize,
    pub unknown: usize,
    pub percent_ok: f64,
    pub grade: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProblemCategory {
    pub category: &'static str,
    pub services: Vec<Service>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HostHealth {
    pub host_name: String,
    pub total_services: usize,
    pub problem_services: usize,
    pub grade: &'static str,
}

/// A+..F letter grade derived from percent-OK (spec §4.10).
fn grade_for(percent_ok: f64) -> &'static str {
    match percent_ok {
        p if p >= 99.5 => "A+",
        p if p >= 97.0 => "A",
        p if p >= 93.0 => "B",
        p if p >= 85.0 => "C",
        p if p >= 70.0 => "D",
        _ => "F",
    }
}

fn categorize(service: &Service) -> &'static str {
    let lower = service.description.to_lowercase();
    if lower.contains("interface") || lower.contains("network") || lower.contains("ping") {
        "network"
    } else if lower.contains("disk") || lower.contains("filesystem") {
        "disk"
    } else if lower.contains("cpu") || lower.contains("load") || lower.contains("memory") {
        "performance"
    } else if lower.contains("tcp") || lower.contains("http") || lower.contains("connection") {
        "connectivity"
    } else {
        "monitoring"
    }
}

pub struct StatusService {
    client: Arc<CheckmkClient>,
}

impl StatusService {
    pub fn new(client: Arc<CheckmkClient>) -> Self {
        Self { client }
    }

    pub async fn health_dashboard(&self) -> ServiceResult<HealthDashboard> {
        let services = match self.client.list_all_services(None).await {
            Ok(services) => services,
            Err(err) => return from_result(Err(err)),
        };
        let total = services.len();
        let ok = services.iter().filter(|s| s.state == ServiceState::Ok).count();
        let warn = services.iter().filter(|s| s.state == ServiceState::Warn).count();
        let crit = services.iter().filter(|s| s.state == ServiceState::Crit).count();
        let unknown = services.iter().filter(|s| s.state == ServiceState::Unknown).count();
        let percent_ok = if total == 0 { 100.0 } else { (ok as f64 / total as f64) * 100.0 };

        ServiceResult::ok(HealthDashboard {
            total_services: total,
            ok,
            warn,
            crit,
            unknown,
            percent_ok,
            grade: grade_for(percent_ok),
        })
    }

    pub async fn critical_problems(&self) -> ServiceResult<Vec<ProblemCategory>> {
        let services = match self.client.list_all_services(None).await {
            Ok(services) => services,
            Err(err) => return from_result(Err(err)),
        };
        let critical: Vec<Service> = services
            .into_iter()
            .filter(|s| matches!(s.state, ServiceState::Crit | ServiceState::Warn))
            .collect();

        let categories = ["network", "disk", "performance", "connectivity", "monitoring"];
        let grouped: Vec<ProblemCategory> = categories
            .iter()
            .map(|&category| ProblemCategory {
                category,
                services: critical.iter().filter(|s| categorize(s) == category).cloned().collect(),
            })
            .filter(|group| !group.services.is_empty())
            .collect();

        ServiceResult::ok(grouped)
    }

    pub async fn analyze_host_health(&self, host_name: &str) -> ServiceResult<HostHealth> {
        let services = match self.client.list_host_services(host_name).await {
            Ok(services) => services,
            Err(err) => return from_result(Err(err)),
        };
        let total = services.len();
        let problems = services
            .iter()
            .filter(|s| matches!(s.state, ServiceState::Crit | ServiceState::Warn | ServiceState::Unknown))
            .count();
        let percent_ok = if total == 0 { 100.0 } else { ((total - problems) as f64 / total as f64) * 100.0 };

        ServiceResult::ok(HostHealth {
            host_name: host_name.to_string(),
            total_services: total,
            problem_services: problems,
            grade: grade_for(percent_ok),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grades_boundaries() {
        assert_eq!(grade_for(100.0), "A+");
        assert_eq!(grade_for(97.5), "A");
        assert_eq!(grade_for(90.0), "B");
        assert_eq!(grade_for(80.0), "C");
        assert_eq!(grade_for(75.0), "D");
        assert_eq!(grade_for(10.0), "F");
    }
}

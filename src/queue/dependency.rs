use std::collections::HashMap;

use crate::models::job::{JobId, JobRecord, JobStatus};

/// A job's dependency set is satisfied when every referenced id resolves
/// to a job in `completed` status. A missing id counts as unsatisfied:
/// the dependent waits until cancelled rather than erroring.
pub fn dependencies_satisfied(job: &JobRecord, jobs: &HashMap<JobId, JobRecord>) -> bool {
    job.dependencies.iter().all(|dep| {
        jobs.get(dep)
            .map(|d| d.status == JobStatus::Completed)
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueueConfig;
    use crate::models::job::EnqueueOptions;

    fn job(deps: Vec<JobId>) -> JobRecord {
        JobRecord::new(
            "image_generation",
            serde_json::json!({}),
            EnqueueOptions {
                dependencies: deps,
                ..Default::default()
            },
            &QueueConfig::default(),
        )
    }

    #[test]
    fn empty_dependency_set_is_satisfied() {
        assert!(dependencies_satisfied(&job(vec![]), &HashMap::new()));
    }

    #[test]
    fn incomplete_dependency_blocks() {
        let dep = job(vec![]);
        let dependent = job(vec![dep.id.clone()]);

        let mut jobs = HashMap::new();
        jobs.insert(dep.id.clone(), dep.clone());
        assert!(!dependencies_satisfied(&dependent, &jobs));

        let mut completed = dep;
        completed.status = JobStatus::Completed;
        jobs.insert(completed.id.clone(), completed);
        assert!(dependencies_satisfied(&dependent, &jobs));
    }

    #[test]
    fn missing_dependency_counts_as_unsatisfied() {
        let dependent = job(vec!["deadbeefdeadbeefdeadbeefdeadbeef".to_string()]);
        assert!(!dependencies_satisfied(&dependent, &HashMap::new()));
    }
}

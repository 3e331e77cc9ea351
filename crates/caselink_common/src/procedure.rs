//! Text summary of a procedure test result.

use crate::types::ProcedureTestResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureSummary {
    pub ok: bool,
    /// `Year 10/10 | MSA 9/10`, absent when the service sent no coverage
    pub coverage: Option<String>,
    /// Notes joined with `; `, absent when there are none
    pub notes: Option<String>,
    /// Failure reported by the service (missing CSV, unmapped columns)
    pub error: Option<String>,
    pub missing: Option<String>,
    pub sampled: Option<u64>,
}

impl ProcedureSummary {
    pub fn from_result(result: &ProcedureTestResult) -> Self {
        let coverage = result.coverage.as_ref().map(|_| {
            result
                .coverage_entries()
                .iter()
                .map(|(label, achieved, total)| format!("{} {}/{}", label, achieved, total))
                .collect::<Vec<_>>()
                .join(" | ")
        });

        let notes = result
            .notes
            .as_ref()
            .filter(|n| !n.is_empty())
            .map(|n| n.join("; "));

        let missing = (!result.missing.is_empty()).then(|| result.missing.join(", "));

        Self {
            ok: result.ok,
            coverage,
            notes,
            error: result.error.clone(),
            missing,
            sampled: result.total_sampled,
        }
    }

    /// `true` / `false`, as the panel prints it
    pub fn verdict(&self) -> &'static str {
        if self.ok {
            "true"
        } else {
            "false"
        }
    }

    /// Every populated line, labelled
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Procedure test: {}", self.verdict())];
        if let Some(n) = self.sampled {
            lines.push(format!("Sampled: {} rows", n));
        }
        if let Some(error) = &self.error {
            lines.push(format!("Error: {}", error));
        }
        if let Some(missing) = &self.missing {
            lines.push(format!("Missing: {}", missing));
        }
        if let Some(coverage) = &self.coverage {
            lines.push(format!("Coverage: {}", coverage));
        }
        if let Some(notes) = &self.notes {
            lines.push(format!("Notes: {}", notes));
        }
        lines
    }
}
